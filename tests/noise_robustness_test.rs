mod test_signals;

use sgpeaks::resolve;
use sgpeaks::simulation::NoiseConfig;

const SEEDS: u64 = 20;

#[test]
fn test_single_peak_under_gaussian_noise() {
    for seed in 0..SEEDS {
        let noise = NoiseConfig::default().with_seed(seed).with_gaussian(20.0);
        let chromatogram = test_signals::single_peak(&noise);

        let peaks = resolve(&chromatogram, 5000.0, 0.05, 0.5).unwrap();

        assert_eq!(peaks.len(), 1, "seed {}: {:?}", seed, peaks);
        let error = (peaks[0].retention_time - 2.0).abs();
        assert!(error <= 0.03, "seed {}: apex at RT {}", seed, peaks[0].retention_time);
    }
}

#[test]
fn test_three_peaks_under_gaussian_noise() {
    for seed in 0..SEEDS {
        let noise = NoiseConfig::default().with_seed(seed).with_gaussian(10.0);
        let chromatogram = test_signals::three_peaks(&noise);

        let peaks = resolve(&chromatogram, 1000.0, 0.05, 0.5).unwrap();

        // Flank fragments may survive, but every true apex is reported once
        for expected_rt in [1.0, 2.0, 3.0] {
            let hits = peaks
                .iter()
                .filter(|p| (p.retention_time - expected_rt).abs() <= 0.02)
                .count();
            assert_eq!(hits, 1, "seed {}: RT {}: {:?}", seed, expected_rt, peaks);
        }
        assert!(peaks.len() <= 5, "seed {}: {} peaks", seed, peaks.len());
        for pair in peaks.windows(2) {
            assert!(pair[0].end_index < pair[1].start_index);
        }
    }
}

#[test]
fn test_dropouts_never_enter_peaks() {
    for seed in 0..SEEDS {
        let noise = NoiseConfig::default()
            .with_seed(seed)
            .with_gaussian(20.0)
            .with_dropout(0.05);
        let chromatogram = test_signals::single_peak(&noise);

        let peaks = resolve(&chromatogram, 100.0, 0.02, 0.5).unwrap();

        for peak in &peaks {
            assert!(chromatogram.has_data(peak.start_index));
            assert!(chromatogram.has_data(peak.end_index));
            assert!(peak.data_points.iter().all(|p| chromatogram.has_data(p.index)));
        }
        for pair in peaks.windows(2) {
            assert!(pair[0].end_index < pair[1].start_index);
        }
    }
}

#[test]
fn test_spikes_do_not_hide_peak() {
    for seed in 0..SEEDS {
        let noise = NoiseConfig::default()
            .with_seed(seed)
            .with_gaussian(20.0)
            .with_spikes(0.01, 500.0);
        let chromatogram = test_signals::single_peak(&noise);

        let peaks = resolve(&chromatogram, 5000.0, 0.05, 0.5).unwrap();

        assert!(
            peaks
                .iter()
                .any(|p| (p.retention_time - 2.0).abs() <= 0.05),
            "seed {}: {:?}",
            seed,
            peaks
        );
    }
}
