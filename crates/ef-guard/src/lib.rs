//! Hard wall-clock bounding for solver runs.
//!
//! The solvers poll their own deadline at iteration boundaries, which is
//! only the cooperative half of time bounding: a run stuck inside one
//! long factorization never reaches the next poll. [`run_with_deadline`]
//! adds the hard half. The job runs on its own worker thread and sends
//! its result over a channel; the caller waits on the channel with a
//! timeout and abandons workers that miss it.
//!
//! An abandoned worker keeps running in the background until its job
//! finishes, then its result is dropped with the disconnected channel.
//! That leaks a thread for the remainder of the job, which is the
//! accepted cost of a hard timeout without process isolation.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Outcome of a guarded job.
#[derive(Debug)]
pub enum GuardOutcome<T> {
    /// The job finished in time with a value.
    Completed(T),
    /// The job finished in time but reported an error, or panicked.
    Failed { error: String },
    /// The deadline passed first; the worker was abandoned.
    TimedOut,
}

impl<T> GuardOutcome<T> {
    /// Status label recorded alongside benchmark measurements.
    pub fn status(&self) -> &'static str {
        match self {
            GuardOutcome::Completed(_) => "ok",
            GuardOutcome::Failed { .. } => "error",
            GuardOutcome::TimedOut => "timeout",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, GuardOutcome::Completed(_))
    }

    /// The completed value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            GuardOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// Run `job` on a worker thread, waiting at most `deadline` for it.
///
/// `label` names the job in log output. The worker is joined whenever it
/// reports back in time, so no thread outlives a non-timeout outcome.
pub fn run_with_deadline<T, E, F>(deadline: Duration, label: &str, job: F) -> GuardOutcome<T>
where
    T: Send + 'static,
    E: std::fmt::Display + Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let result = job().map_err(|e| e.to_string());
        let _ = tx.send(result);
    });

    match rx.recv_timeout(deadline) {
        Ok(Ok(value)) => {
            let _ = handle.join();
            GuardOutcome::Completed(value)
        }
        Ok(Err(error)) => {
            let _ = handle.join();
            GuardOutcome::Failed { error }
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!(
                label,
                deadline_s = deadline.as_secs_f64(),
                "job exceeded deadline, abandoning worker"
            );
            drop(handle);
            GuardOutcome::TimedOut
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            // The sender was dropped without a message: the job panicked
            // before reaching the send.
            let error = match handle.join() {
                Err(payload) => {
                    if let Some(msg) = payload.downcast_ref::<&str>() {
                        format!("worker panicked: {msg}")
                    } else if let Some(msg) = payload.downcast_ref::<String>() {
                        format!("worker panicked: {msg}")
                    } else {
                        "worker panicked".to_string()
                    }
                }
                Ok(()) => "worker exited without reporting a result".to_string(),
            };
            GuardOutcome::Failed { error }
        }
    }
}
