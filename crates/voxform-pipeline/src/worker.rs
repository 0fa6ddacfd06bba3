//! Background worker thread executing pipeline jobs.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{error, warn};

use crate::job::{JobId, JobOutcome, JobPayload, JobResponse};
use crate::session::Session;
use crate::status::{ProgressReporter, StatusHandler};

/// Work request sent to the worker thread.
#[derive(Debug)]
pub(crate) enum WorkRequest {
    /// Execute a job.
    Run { id: JobId, payload: JobPayload },
    /// Signal the worker thread to shut down.
    Shutdown,
}

/// Event emitted by the worker thread.
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    /// Fractional progress of the running job.
    Progress { id: JobId, fraction: f32 },
    /// Terminal response for a job.
    Finished(JobResponse),
}

/// Handle to the background pipeline worker thread.
///
/// Jobs are processed strictly one at a time in submission order; the
/// worker owns the [`Session`] state, so no stage data is ever shared
/// across threads.
pub(crate) struct WorkerHandle {
    request_tx: Sender<WorkRequest>,
    event_rx: Receiver<WorkerEvent>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Spawn the worker thread.
    pub(crate) fn spawn() -> Self {
        let (request_tx, request_rx) = channel::bounded::<WorkRequest>(16);
        let (event_tx, event_rx) = channel::bounded::<WorkerEvent>(256);

        let thread = thread::Builder::new()
            .name("pipeline-worker".to_string())
            .spawn(move || {
                Self::worker_loop(request_rx, event_tx);
            })
            .expect("Failed to spawn pipeline worker thread");

        Self {
            request_tx,
            event_rx,
            thread: Some(thread),
        }
    }

    /// Main worker loop - blocks waiting for requests and processes them.
    fn worker_loop(request_rx: Receiver<WorkRequest>, event_tx: Sender<WorkerEvent>) {
        let mut session = Session::new();
        loop {
            match request_rx.recv() {
                Ok(WorkRequest::Run { id, payload }) => {
                    let response = execute_job(&mut session, id, &payload, &event_tx);
                    if event_tx.send(WorkerEvent::Finished(response)).is_err() {
                        // Receiver dropped, exit loop
                        return;
                    }
                }
                Ok(WorkRequest::Shutdown) | Err(_) => {
                    // Shutdown requested or channel disconnected
                    return;
                }
            }
        }
    }

    /// Submit a job to the worker (non-blocking).
    pub(crate) fn submit(&self, id: JobId, payload: JobPayload) -> Result<(), ()> {
        self.request_tx
            .try_send(WorkRequest::Run { id, payload })
            .map_err(|_| ())
    }

    /// Try to receive the next worker event (non-blocking).
    pub(crate) fn try_recv(&self) -> Option<WorkerEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Block until the next worker event arrives.
    pub(crate) fn recv(&self) -> Option<WorkerEvent> {
        self.event_rx.recv().ok()
    }

    /// Shutdown the worker thread and wait for it to finish.
    fn shutdown(&mut self) {
        // Send shutdown signal (ignore errors - channel might be closed)
        let _ = self.request_tx.send(WorkRequest::Shutdown);

        // Wait for thread to finish
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Run one job against the session, mapping typed errors to known
/// failures and panics to unknown failures. Status is collected fresh
/// for each stage.
fn execute_job(
    session: &mut Session,
    id: JobId,
    payload: &JobPayload,
    event_tx: &Sender<WorkerEvent>,
) -> JobResponse {
    let action = payload.action();
    let mut status = StatusHandler::new();

    let progress = {
        let event_tx = event_tx.clone();
        ProgressReporter::new(move |fraction| {
            // Progress is advisory; drop it when the channel is full
            let _ = event_tx.try_send(WorkerEvent::Progress { id, fraction });
        })
    };

    // A panicking stage may leave the session partially updated; the
    // worker loop itself must survive, and the next import resets state.
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        session.execute(payload, &mut status, &progress)
    }));

    let outcome = match result {
        Ok(Ok(result)) => JobOutcome::Success(result),
        Ok(Err(e)) => {
            warn!(%action, error = %e, "job failed");
            JobOutcome::KnownError {
                message: e.to_string(),
            }
        }
        Err(panic_payload) => {
            let detail = panic_message(panic_payload.as_ref());
            error!(%action, detail, "job panicked");
            JobOutcome::UnknownError
        }
    };

    JobResponse {
        id,
        action,
        outcome,
        status_messages: status.drain(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<opaque panic payload>")
}
