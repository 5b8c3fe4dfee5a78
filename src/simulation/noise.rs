use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    pub additive: Option<AdditiveNoiseConfig>,
    pub spikes: Option<SpikeNoiseConfig>,
    pub dropout: Option<DropoutConfig>,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_gaussian(mut self, std_dev: f64) -> Self {
        self.additive = Some(AdditiveNoiseConfig { std_dev });
        self
    }

    pub fn with_spikes(mut self, probability: f64, amplitude: f64) -> Self {
        self.spikes = Some(SpikeNoiseConfig {
            probability,
            amplitude,
        });
        self
    }

    pub fn with_dropout(mut self, probability: f64) -> Self {
        self.dropout = Some(DropoutConfig { probability });
        self
    }
}

/// Zero-mean Gaussian detector noise
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AdditiveNoiseConfig {
    pub std_dev: f64,
}

/// Single-scan positive spikes
#[derive(Clone, Debug, serde::Deserialize)]
pub struct SpikeNoiseConfig {
    /// Chance of a spike on each scan
    pub probability: f64,
    pub amplitude: f64,
}

/// Scans recorded without a data point
#[derive(Clone, Debug, serde::Deserialize)]
pub struct DropoutConfig {
    pub probability: f64,
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

fn apply_additive_noise(signal: &mut [f64], config: &AdditiveNoiseConfig, rng: &mut ChaCha8Rng) {
    let Ok(normal) = Normal::new(0.0, config.std_dev) else {
        log::warn!("ignoring additive noise with std_dev {}", config.std_dev);
        return;
    };

    for sample in signal.iter_mut() {
        *sample += normal.sample(rng);
    }
}

fn apply_spikes(signal: &mut [f64], config: &SpikeNoiseConfig, rng: &mut ChaCha8Rng) {
    for sample in signal.iter_mut() {
        if rng.random::<f64>() < config.probability {
            *sample += config.amplitude;
        }
    }
}

/// Add the configured noise to `clean_signal`
///
/// Intensities are clamped at zero; scans hit by a dropout carry no data
/// point and come back as `None`.
pub fn apply_noise(clean_signal: &[f64], config: &NoiseConfig) -> Vec<Option<f64>> {
    let mut signal = clean_signal.to_vec();
    let mut rng = create_rng(config.seed);

    if let Some(ref additive_config) = config.additive {
        apply_additive_noise(&mut signal, additive_config, &mut rng);
    }

    if let Some(ref spike_config) = config.spikes {
        apply_spikes(&mut signal, spike_config, &mut rng);
    }

    let dropout = config.dropout.as_ref().map_or(0.0, |d| d.probability);
    signal
        .into_iter()
        .map(|v| {
            if dropout > 0.0 && rng.random::<f64>() < dropout {
                None
            } else {
                Some(v.max(0.0))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean() -> Vec<f64> {
        (0..500).map(|i| 100.0 + (i as f64 * 0.05).sin() * 50.0).collect()
    }

    #[test]
    fn test_additive_noise_changes_signal() {
        let clean = clean();
        let config = NoiseConfig::default().with_seed(42).with_gaussian(5.0);

        let noisy = apply_noise(&clean, &config);

        assert_eq!(clean.len(), noisy.len());
        assert!(noisy.iter().all(|v| v.is_some()));
        assert!(noisy.iter().zip(&clean).any(|(n, c)| n.unwrap() != *c));
    }

    #[test]
    fn test_seeded_rng_reproducibility() {
        let clean = clean();
        let config = NoiseConfig::default()
            .with_seed(12345)
            .with_gaussian(5.0)
            .with_dropout(0.1);

        assert_eq!(apply_noise(&clean, &config), apply_noise(&clean, &config));
    }

    #[test]
    fn test_noise_never_negative() {
        let clean = vec![0.0; 200];
        let config = NoiseConfig::default().with_seed(7).with_gaussian(10.0);

        let noisy = apply_noise(&clean, &config);
        assert!(noisy.iter().all(|v| v.unwrap() >= 0.0));
    }

    #[test]
    fn test_dropout_removes_scans() {
        let clean = clean();
        let config = NoiseConfig::default().with_seed(3).with_dropout(0.2);

        let noisy = apply_noise(&clean, &config);
        let missing = noisy.iter().filter(|v| v.is_none()).count();
        assert!(missing > 50 && missing < 150, "missing {}", missing);
    }

    #[test]
    fn test_spikes_only_add() {
        let clean = clean();
        let config = NoiseConfig::default().with_seed(11).with_spikes(0.05, 1000.0);

        let noisy = apply_noise(&clean, &config);
        let spikes = noisy
            .iter()
            .zip(&clean)
            .filter(|(n, c)| n.unwrap() > **c + 999.0)
            .count();
        assert!(spikes > 0);
        assert!(noisy.iter().zip(&clean).all(|(n, c)| n.unwrap() >= *c));
    }

    #[test]
    fn test_no_noise_is_identity() {
        let clean = clean();
        let noisy = apply_noise(&clean, &NoiseConfig::default());
        assert!(noisy.iter().zip(&clean).all(|(n, c)| n == &Some(*c)));
    }
}
