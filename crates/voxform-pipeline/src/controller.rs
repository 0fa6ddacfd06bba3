//! Foreground-facing job controller.

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::job::{Action, JobId, JobPayload, JobResponse};
use crate::worker::{WorkerEvent, WorkerHandle};

/// Callback invoked exactly once with a job's terminal response.
pub type JobCallback = Box<dyn FnOnce(JobResponse) + Send>;

/// Submits jobs to the background worker and routes each terminal
/// response to its callback.
///
/// Submission is non-blocking; results are delivered when the foreground
/// calls [`poll`](Self::poll) (or [`poll_blocking`](Self::poll_blocking)).
/// At most one job per action slot may be in flight: the in-flight set
/// is checked on the submission path, and responses are correlated back
/// by job id, so every submitted job gets exactly one callback.
pub struct JobController {
    worker: WorkerHandle,
    next_id: u64,
    in_flight: HashSet<Action>,
    callbacks: HashMap<JobId, JobCallback>,
    on_progress: Option<Box<dyn FnMut(JobId, f32)>>,
}

impl JobController {
    /// Create a controller with its own worker thread
    pub fn new() -> Self {
        Self {
            worker: WorkerHandle::spawn(),
            next_id: 0,
            in_flight: HashSet::new(),
            callbacks: HashMap::new(),
            on_progress: None,
        }
    }

    /// Observe per-job progress fractions
    pub fn set_progress_observer(&mut self, observer: impl FnMut(JobId, f32) + 'static) {
        self.on_progress = Some(Box::new(observer));
    }

    /// Whether the action has a job queued or running
    pub fn is_busy(&self, action: Action) -> bool {
        self.in_flight.contains(&action)
    }

    /// Number of jobs currently in flight
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Submit a job; returns its id immediately.
    ///
    /// Fails with [`PipelineError::SlotBusy`] when the payload's action
    /// already has a job in flight.
    pub fn submit(&mut self, payload: JobPayload, callback: JobCallback) -> Result<JobId> {
        let action = payload.action();
        if !self.in_flight.insert(action) {
            return Err(PipelineError::SlotBusy(action));
        }

        let id = JobId(self.next_id);
        self.next_id += 1;

        if self.worker.submit(id, payload).is_err() {
            self.in_flight.remove(&action);
            return Err(PipelineError::WorkerClosed);
        }

        debug!(%action, id = id.0, "job submitted");
        self.callbacks.insert(id, callback);
        Ok(id)
    }

    /// Drain completed responses and invoke their callbacks
    /// (non-blocking). Returns the number of terminal responses
    /// delivered.
    pub fn poll(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.worker.try_recv() {
            delivered += usize::from(self.handle_event(event));
        }
        delivered
    }

    /// Block until at least one worker event arrives, then drain.
    ///
    /// Returns the number of terminal responses delivered; returns
    /// immediately with 0 when nothing is in flight.
    pub fn poll_blocking(&mut self) -> usize {
        if self.in_flight.is_empty() {
            return 0;
        }
        let mut delivered = 0;
        if let Some(event) = self.worker.recv() {
            delivered += usize::from(self.handle_event(event));
        }
        delivered + self.poll()
    }

    /// Returns true when the event was a terminal response.
    fn handle_event(&mut self, event: WorkerEvent) -> bool {
        match event {
            WorkerEvent::Progress { id, fraction } => {
                if let Some(observer) = &mut self.on_progress {
                    observer(id, fraction);
                }
                false
            }
            WorkerEvent::Finished(response) => {
                self.in_flight.remove(&response.action);
                debug!(action = %response.action, id = response.id.0, "job finished");
                // The callback is removed before invocation, so a second
                // delivery for the same id is impossible
                match self.callbacks.remove(&response.id) {
                    Some(callback) => {
                        callback(response);
                        true
                    }
                    None => false,
                }
            }
        }
    }
}

impl Default for JobController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{ImportParams, JobOutcome};
    use std::path::PathBuf;
    use std::sync::mpsc;

    fn import_payload(path: &str) -> JobPayload {
        JobPayload::Import(ImportParams {
            filepath: PathBuf::from(path),
        })
    }

    #[test]
    fn second_submission_on_busy_slot_is_rejected() {
        let mut controller = JobController::new();
        let (tx, _rx) = mpsc::channel();

        let tx1 = tx.clone();
        controller
            .submit(
                import_payload("missing.obj"),
                Box::new(move |r| tx1.send(r.id).unwrap()),
            )
            .unwrap();

        let result = controller.submit(import_payload("missing.obj"), Box::new(|_| {}));
        assert!(matches!(result, Err(PipelineError::SlotBusy(Action::Import))));
    }

    #[test]
    fn exactly_one_callback_per_job() {
        let mut controller = JobController::new();
        let (tx, rx) = mpsc::channel();

        // A nonexistent file fails with a known error, which still
        // produces exactly one terminal callback
        let id = controller
            .submit(
                import_payload("does_not_exist.obj"),
                Box::new(move |response| {
                    assert!(matches!(response.outcome, JobOutcome::KnownError { .. }));
                    tx.send(response.id).unwrap();
                }),
            )
            .unwrap();

        let mut delivered = 0;
        for _ in 0..100 {
            delivered += controller.poll_blocking();
            if delivered > 0 {
                break;
            }
        }
        assert_eq!(delivered, 1);
        assert_eq!(rx.recv().unwrap(), id);
        assert!(rx.try_recv().is_err());
        assert!(!controller.is_busy(Action::Import));

        // Nothing further arrives for this job
        assert_eq!(controller.poll(), 0);
    }

    #[test]
    fn slot_frees_after_terminal_state_and_accepts_again() {
        let mut controller = JobController::new();
        let (tx, rx) = mpsc::channel();

        let tx1 = tx.clone();
        controller
            .submit(
                import_payload("missing_a.obj"),
                Box::new(move |_| tx1.send(1u8).unwrap()),
            )
            .unwrap();
        while controller.is_busy(Action::Import) {
            controller.poll_blocking();
        }
        rx.recv().unwrap();

        // Same slot accepts a new job after the previous one terminated
        controller
            .submit(
                import_payload("missing_b.obj"),
                Box::new(move |_| tx.send(2u8).unwrap()),
            )
            .unwrap();
        while controller.is_busy(Action::Import) {
            controller.poll_blocking();
        }
        assert_eq!(rx.recv().unwrap(), 2);
    }
}
