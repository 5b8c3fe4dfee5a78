//! Peak boundary scanner
//!
//! A single pass over the second derivative of a chromatogram. A Gaussian-like
//! elution event shows up as a positive lobe (rising flank), a negative lobe
//! (apex region) and a second positive lobe (falling flank), so a peak is
//! delimited by counting zero crossings of the derivative.
//!
//! ## Transition table
//!
//! Evaluated once per index `i >= 1`, comparing `d[i-1]` and `d[i]`, in this
//! order:
//!
//! | event                                   | condition                 | effect                                        |
//! |-----------------------------------------|---------------------------|-----------------------------------------------|
//! | negative to positive crossing           | `crossings == 2`, passed  | `TrackingFirstPeak` -> `TrackingOverlap`      |
//! | negative to positive crossing           | `crossings == 2`, !passed | abandon buffer, -> `Idle`, `crossings = 0`    |
//! | any crossing                            | `crossings == 3`          | first peak closes (emitted at end of step)    |
//! | any crossing                            | always                    | `passed = false`; `crossings += 1` unless Idle |
//! | `abs(d[i]) > threshold`                 | always                    | `passed = true`                               |
//! | `abs(d[i]) > threshold`, `d[i] > 0`     | `Idle`                    | -> `TrackingFirstPeak`, `crossings = 1`       |
//! | accumulate                              | first peak active         | push `i` to the peak buffer                   |
//! | accumulate, scan has no data            | peak buffer non-empty     | first peak terminates, `crossings = 0`        |
//! | accumulate                              | `TrackingOverlap`         | push `i` to the overlap buffer                |
//! | first peak closed or terminated         | peak buffer non-empty     | emit candidate                                |
//! | first peak closed or terminated         | `TrackingOverlap`         | overlap -> peak buffer, `crossings = 2`       |
//!
//! At the end of the sequence a non-empty peak buffer is emitted; an open
//! overlap buffer is dropped.
//!
//! While both buffers are open the same scans land in each of them. On
//! promotion the shared scans are split at their lowest intensity (leftmost
//! on ties): the emitted peak keeps the valley scan and everything before
//! it, the promoted peak starts right after it. Candidates therefore never
//! share a scan and each peak's area stops at the valley between them.

use std::mem;

/// Scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Waiting for the derivative to rise above the noise threshold
    Idle,
    /// Accumulating scans of a peak
    TrackingFirstPeak,
    /// A second (shoulder) peak started while the first is still closing
    TrackingOverlap,
}

/// Scan indices of one peak candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePeak {
    /// Buffered scan indices, ascending; scans without data are never buffered
    pub indices: Vec<usize>,
    /// Index of the most negative second derivative between the two
    /// inflection crossings, if one was seen
    pub derivative_apex: Option<usize>,
}

/// Running minimum of the second derivative (leftmost on ties)
#[derive(Debug, Clone, Copy)]
struct ApexTracker {
    index: Option<usize>,
    value: f64,
}

impl ApexTracker {
    fn new() -> Self {
        Self {
            index: None,
            value: 0.0,
        }
    }

    fn update(&mut self, index: usize, value: f64) {
        if value < self.value {
            self.value = value;
            self.index = Some(index);
        }
    }
}

/// Finite-state machine assembling peak candidates from a derivative series
pub struct BoundaryScanner {
    threshold: f64,
    state: ScanState,
    crossings: u32,
    passed_threshold: bool,
    apex: ApexTracker,
    peak_buffer: Vec<usize>,
    /// Scan index and intensity of every overlap scan
    overlap_buffer: Vec<(usize, f64)>,
    candidates: Vec<CandidatePeak>,
}

impl BoundaryScanner {
    /// Create a scanner for the given noise threshold
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            state: ScanState::Idle,
            crossings: 0,
            passed_threshold: false,
            apex: ApexTracker::new(),
            peak_buffer: Vec::new(),
            overlap_buffer: Vec::new(),
            candidates: Vec::new(),
        }
    }

    /// Run the scanner over a whole derivative series
    ///
    /// # Arguments
    /// * `derivative` - Second derivative of the chromatogram intensities
    /// * `threshold` - Noise threshold on the derivative magnitude
    /// * `intensity` - Intensity of the scan at an index, `None` without data
    pub fn scan<F>(derivative: &[f64], threshold: f64, intensity: F) -> Vec<CandidatePeak>
    where
        F: Fn(usize) -> Option<f64>,
    {
        let mut scanner = Self::new(threshold);
        for (i, pair) in derivative.windows(2).enumerate() {
            scanner.step(i + 1, pair[0], pair[1], intensity(i + 1));
        }
        scanner.finish()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Zero crossings counted since tracking began
    pub fn crossings(&self) -> u32 {
        self.crossings
    }

    /// Candidates emitted so far
    pub fn candidates(&self) -> &[CandidatePeak] {
        &self.candidates
    }

    /// Advance the machine by one index
    ///
    /// # Arguments
    /// * `index` - Position of `current` in the series
    /// * `previous` - Derivative at `index - 1`
    /// * `current` - Derivative at `index`
    /// * `intensity` - Intensity of scan `index`, `None` when it has no data point
    pub fn step(&mut self, index: usize, previous: f64, current: f64, intensity: Option<f64>) {
        let has_data = intensity.is_some();
        if self.crossings == 2 {
            self.apex.update(index, current);
        }

        let mut closed = false;
        if (previous < 0.0 && current > 0.0) || (previous > 0.0 && current < 0.0) {
            closed = self.on_zero_crossing(index, previous, current);
        }

        if current.abs() > self.threshold {
            self.passed_threshold = true;
            if self.state == ScanState::Idle && self.crossings == 0 && current > 0.0 {
                log::trace!("index {}: peak tracking starts", index);
                self.state = ScanState::TrackingFirstPeak;
                self.crossings = 1;
            }
        }

        let mut terminated = false;
        if !closed && self.state != ScanState::Idle {
            if has_data {
                self.peak_buffer.push(index);
            } else if !self.peak_buffer.is_empty() {
                log::trace!("index {}: missing scan ends peak", index);
                terminated = true;
            }
        }
        if self.state == ScanState::TrackingOverlap
            && let Some(value) = intensity
        {
            self.overlap_buffer.push((index, value));
        }

        if closed || terminated {
            self.end_first_peak(closed);
        }
    }

    /// Emit the open peak buffer and return all candidates
    pub fn finish(mut self) -> Vec<CandidatePeak> {
        if !self.peak_buffer.is_empty() {
            self.emit();
        }
        self.candidates
    }

    fn on_zero_crossing(&mut self, index: usize, previous: f64, current: f64) -> bool {
        if previous < 0.0 && current > 0.0 && self.crossings == 2 {
            if self.passed_threshold {
                log::trace!("index {}: overlapping peak begins", index);
                self.state = ScanState::TrackingOverlap;
            } else {
                log::trace!("index {}: apex below threshold, candidate abandoned", index);
                self.peak_buffer.clear();
                self.apex = ApexTracker::new();
                self.crossings = 0;
                self.state = ScanState::Idle;
            }
        }

        let closed = self.crossings == 3;
        self.passed_threshold = false;
        if self.state != ScanState::Idle {
            self.crossings += 1;
        }
        closed
    }

    fn end_first_peak(&mut self, closed: bool) {
        let last_claimed = self.peak_buffer.last().copied();
        if !self.peak_buffer.is_empty() {
            self.emit();
        }

        let promote = self.state == ScanState::TrackingOverlap
            && (closed || !self.overlap_buffer.is_empty());
        if promote {
            let overlap = mem::take(&mut self.overlap_buffer);
            self.peak_buffer = match last_claimed {
                Some(end) => {
                    let cut = self.split_at_valley(&overlap, end);
                    overlap
                        .into_iter()
                        .map(|(i, _)| i)
                        .filter(|&i| i > cut)
                        .collect()
                }
                None => overlap.into_iter().map(|(i, _)| i).collect(),
            };
            self.state = ScanState::TrackingFirstPeak;
            self.crossings = 2;
            self.passed_threshold = false;
        } else {
            self.overlap_buffer.clear();
            self.state = ScanState::Idle;
            self.crossings = 0;
        }
    }

    /// Trim the just emitted candidate at the lowest shared scan and return
    /// the last index it keeps
    fn split_at_valley(&mut self, overlap: &[(usize, f64)], end: usize) -> usize {
        let valley = overlap
            .iter()
            .filter(|(i, _)| *i <= end)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|&(i, _)| i);
        let Some(valley) = valley else {
            return end;
        };

        if let Some(emitted) = self.candidates.last_mut() {
            emitted.indices.retain(|&i| i <= valley);
            emitted.derivative_apex = emitted.derivative_apex.filter(|&apex| apex <= valley);
        }
        log::trace!("shared scans split at valley {}", valley);
        valley
    }

    fn emit(&mut self) {
        let indices = mem::take(&mut self.peak_buffer);
        log::trace!(
            "candidate peak {}..={}",
            indices.first().copied().unwrap_or_default(),
            indices.last().copied().unwrap_or_default()
        );
        self.candidates.push(CandidatePeak {
            indices,
            derivative_apex: self.apex.index,
        });
        self.apex = ApexTracker::new();
    }
}
