//! Fan chromatograms out to a pool of resolver threads
//!
//! Jobs travel to the workers over a bounded channel and every finished job
//! comes back as a [`ResolveEvent`] on an unbounded channel, so workers never
//! block on a caller that is slow to drain results.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

use crate::chromatogram::Chromatogram;
use crate::error::{PeakError, Result};
use crate::peak::ResolvedPeak;
use crate::resolver::PeakResolver;

/// Jobs queued per worker before `submit` blocks
const QUEUE_DEPTH_PER_WORKER: usize = 4;

struct ResolveJob {
    id: usize,
    chromatogram: Chromatogram,
}

/// Completion of one submitted chromatogram
#[derive(Debug)]
pub struct ResolveEvent {
    /// Submission index, starting at 0
    pub job_id: usize,
    /// Source label of the chromatogram, if it had one
    pub source: Option<String>,
    pub result: Result<Vec<ResolvedPeak>>,
}

/// Fixed-size pool of threads running a shared resolver
pub struct BatchResolver {
    job_tx: Option<Sender<ResolveJob>>,
    event_rx: Receiver<ResolveEvent>,
    workers: Vec<thread::JoinHandle<()>>,
    submitted: usize,
}

impl BatchResolver {
    /// Start `workers` threads sharing `resolver`
    pub fn new(resolver: Arc<dyn PeakResolver>, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(PeakError::InvalidParameter(
                "batch needs at least one worker".to_string(),
            ));
        }

        let (job_tx, job_rx) = bounded::<ResolveJob>(workers * QUEUE_DEPTH_PER_WORKER);
        let (event_tx, event_rx) = unbounded::<ResolveEvent>();

        let handles = (0..workers)
            .map(|worker| {
                let resolver = Arc::clone(&resolver);
                let job_rx = job_rx.clone();
                let event_tx = event_tx.clone();
                thread::spawn(move || run_worker(worker, resolver, job_rx, event_tx))
            })
            .collect();

        log::debug!("started {} {} workers", workers, resolver.name());

        Ok(Self {
            job_tx: Some(job_tx),
            event_rx,
            workers: handles,
            submitted: 0,
        })
    }

    /// Queue a chromatogram and return its job id
    pub fn submit(&mut self, chromatogram: Chromatogram) -> Result<usize> {
        let id = self.submitted;
        let job_tx = self
            .job_tx
            .as_ref()
            .ok_or_else(|| PeakError::Computation("batch is already closed".to_string()))?;
        job_tx
            .send(ResolveJob { id, chromatogram })
            .map_err(|_| PeakError::Computation("all batch workers have stopped".to_string()))?;
        self.submitted += 1;
        Ok(id)
    }

    /// Number of jobs submitted so far
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Completion events in the order the workers finish them
    pub fn events(&self) -> &Receiver<ResolveEvent> {
        &self.event_rx
    }

    /// Stop accepting jobs, wait for the workers and return the events not
    /// yet received, ordered by job id
    pub fn finish(mut self) -> Vec<ResolveEvent> {
        self.job_tx = None;

        // The loop ends once every worker has dropped its event sender
        let mut events: Vec<ResolveEvent> = self.event_rx.iter().collect();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::warn!("batch worker panicked");
            }
        }
        events.sort_by_key(|event| event.job_id);
        events
    }
}

fn run_worker(
    worker: usize,
    resolver: Arc<dyn PeakResolver>,
    job_rx: Receiver<ResolveJob>,
    event_tx: Sender<ResolveEvent>,
) {
    for job in job_rx {
        let source = job.chromatogram.source().map(str::to_string);
        let result = resolver.resolve(&job.chromatogram);
        match &result {
            Ok(peaks) => log::debug!(
                "worker {}: job {} resolved {} peaks",
                worker,
                job.id,
                peaks.len()
            ),
            Err(e) => log::warn!(
                "worker {}: job {} ({}) failed: {}",
                worker,
                job.id,
                source.as_deref().unwrap_or("unnamed"),
                e
            ),
        }

        let event = ResolveEvent {
            job_id: job.id,
            source,
            result,
        };
        if event_tx.send(event).is_err() {
            break;
        }
    }
}

/// Resolve every chromatogram on `workers` threads, results in input order
pub fn resolve_all(
    resolver: Arc<dyn PeakResolver>,
    chromatograms: Vec<Chromatogram>,
    workers: usize,
) -> Result<Vec<ResolveEvent>> {
    let mut batch = BatchResolver::new(resolver, workers)?;
    for chromatogram in chromatograms {
        batch.submit(chromatogram)?;
    }
    Ok(batch.finish())
}
