mod test_signals;

use approx::assert_abs_diff_eq;
use sgpeaks::config::{PeakFillingConfig, ResolverConfig};
use sgpeaks::simulation::NoiseConfig;
use sgpeaks::{Chromatogram, ChromatogramData, PeakError, PeakResolver, SavitzkyGolayResolver, resolve};

fn assert_peak_invariants(chromatogram: &Chromatogram, peaks: &[sgpeaks::ResolvedPeak]) {
    for peak in peaks {
        assert!(peak.start_index <= peak.apex_index, "{:?}", peak);
        assert!(peak.apex_index <= peak.end_index, "{:?}", peak);
        assert!(peak.end_index < chromatogram.len());
        assert!(chromatogram.has_data(peak.apex_index));
        if !peak.filled {
            assert_eq!(Some(peak.height), chromatogram.intensity(peak.apex_index));
        }
    }
    for pair in peaks.windows(2) {
        assert!(pair[0].start_index < pair[1].start_index);
        assert!(!pair[0].overlaps(&pair[1]), "{:?} / {:?}", pair[0], pair[1]);
    }
}

#[test]
fn test_clean_single_peak() {
    let chromatogram = test_signals::single_peak(&NoiseConfig::default());
    let peaks = resolve(&chromatogram, 5000.0, 0.05, 0.5).unwrap();

    assert_eq!(peaks.len(), 1);
    assert_eq!(peaks[0].apex_index, 200);
    assert_abs_diff_eq!(peaks[0].retention_time, 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(peaks[0].height, 10050.0, epsilon = 1e-6);
    assert_peak_invariants(&chromatogram, &peaks);
}

#[test]
fn test_clean_shoulder_splits_into_two_peaks() {
    let chromatogram = test_signals::shoulder(&NoiseConfig::default());
    let peaks = resolve(&chromatogram, 500.0, 0.05, 0.5).unwrap();

    assert_eq!(peaks.len(), 2);
    assert_eq!(peaks[0].apex_index, 180);
    assert_eq!(peaks[1].apex_index, 205);
    assert_eq!(peaks[0].end_index + 1, peaks[1].start_index);
    assert_peak_invariants(&chromatogram, &peaks);
}

#[test]
fn test_background_only_yields_nothing() {
    let signal = test_signals::signal(500.0);
    let noise = NoiseConfig::default().with_seed(9).with_gaussian(5.0);
    let chromatogram = sgpeaks::simulation::generate_chromatogram(&signal, &noise).unwrap();

    assert!(SavitzkyGolayResolver::is_background(&chromatogram));
    assert!(resolve(&chromatogram, 10.0, 0.01, 0.5).unwrap().is_empty());
}

#[test]
fn test_resolve_is_deterministic() {
    let noise = NoiseConfig::default().with_seed(77).with_gaussian(10.0);
    let chromatogram = test_signals::three_peaks(&noise);

    let first = resolve(&chromatogram, 1000.0, 0.05, 0.5).unwrap();
    let second = resolve(&chromatogram, 1000.0, 0.05, 0.5).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_min_height_is_monotonic() {
    let noise = NoiseConfig::default().with_seed(5).with_gaussian(10.0);
    let chromatogram = test_signals::three_peaks(&noise);

    let low = resolve(&chromatogram, 1000.0, 0.05, 0.5).unwrap();
    let high = resolve(&chromatogram, 4000.0, 0.05, 0.5).unwrap();

    assert!(high.len() < low.len());
    for peak in &high {
        assert!(peak.height >= 4000.0);
        assert!(low.contains(peak));
    }
    let expected: Vec<_> = low.iter().filter(|p| p.height >= 4000.0).cloned().collect();
    assert_eq!(high, expected);
}

#[test]
fn test_filling_keeps_peaks_disjoint() {
    let config = ResolverConfig::new(500.0, 0.05, 0.5).with_filling(PeakFillingConfig {
        excess_level: 0.05,
        resolution: 100.0,
    });
    let resolver = SavitzkyGolayResolver::new(config).unwrap();
    let chromatogram = test_signals::shoulder(&NoiseConfig::default());

    let peaks = resolver.resolve(&chromatogram).unwrap();

    assert_eq!(peaks.len(), 2);
    assert!(peaks[0].filled);
    assert_abs_diff_eq!(
        peaks[0].height,
        chromatogram.intensity(peaks[0].apex_index).unwrap(),
        epsilon = 1e-9
    );
    assert_peak_invariants(&chromatogram, &peaks);
}

#[test]
fn test_json_input_with_gaps() {
    let json = r#"{
        "source": "gapped",
        "scans": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        "retention_times": [0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0],
        "intensities": [0.0, 10.0, 100.0, 500.0, 900.0, null, 900.0, 500.0, 100.0, 10.0, 0.0]
    }"#;
    let data: ChromatogramData = serde_json::from_str(json).unwrap();
    let chromatogram = data.into_chromatogram().unwrap();

    assert_eq!(chromatogram.source(), Some("gapped"));
    assert!(!chromatogram.has_data(5));

    let peaks = resolve(&chromatogram, 10.0, 0.01, 0.5).unwrap();
    assert_peak_invariants(&chromatogram, &peaks);
    for peak in &peaks {
        assert!(peak.data_points.iter().all(|p| p.index != 5));
    }
}

#[test]
fn test_malformed_json_input() {
    let json = r#"{"scans": [1, 2], "retention_times": [0.2, 0.1], "intensities": [1.0, 2.0]}"#;
    let data: ChromatogramData = serde_json::from_str(json).unwrap();

    assert!(matches!(
        data.into_chromatogram(),
        Err(PeakError::MalformedInput(_))
    ));
}

#[test]
fn test_config_from_toml() {
    let config = ResolverConfig::from_toml_str(
        r#"
        min_peak_height = 5000.0
        derivative_threshold_level = 0.6

        [filling]
        excess_level = 0.1
        "#,
    )
    .unwrap();

    assert_abs_diff_eq!(config.min_peak_height, 5000.0);
    assert_abs_diff_eq!(config.min_peak_duration, 0.05);
    assert!(config.filling_peaks());

    let chromatogram = test_signals::single_peak(&NoiseConfig::default());
    let peaks = SavitzkyGolayResolver::new(config)
        .unwrap()
        .resolve(&chromatogram)
        .unwrap();
    assert_eq!(peaks.len(), 1);
}
