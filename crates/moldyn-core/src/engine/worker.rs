//! Background task handles.
//!
//! A task runs on its own OS thread and polls a [`CancellationToken`] between
//! units of work. Requesting a stop never interrupts a unit in progress;
//! [`TaskHandle::stop_and_join`] blocks until the task has observed the request
//! and returned.

use super::error::EngineError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Cooperative stop flag shared between a task and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Fraction of work completed by a task, in `[0, 1]`.
///
/// Stored as `f32` bits so readers never block the task.
#[derive(Debug, Clone, Default)]
pub struct Completion(Arc<AtomicU32>);

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, fraction: f32) {
        self.0
            .store(fraction.clamp(0.0, 1.0).to_bits(), Ordering::Release);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn is_done(&self) -> bool {
        self.get() >= 1.0
    }
}

/// Owner side of a background thread.
///
/// Dropping the handle requests a stop and waits for the thread to exit.
#[derive(Debug)]
pub struct TaskHandle<T: Send + 'static> {
    name: &'static str,
    token: CancellationToken,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Starts `task` on a new named thread.
    pub fn spawn<F>(name: &'static str, task: F) -> Result<Self, EngineError>
    where
        F: FnOnce(CancellationToken) -> T + Send + 'static,
    {
        let token = CancellationToken::new();
        let running = Arc::new(AtomicBool::new(true));

        let thread = {
            let token = token.clone();
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name(name.to_string())
                .spawn(move || {
                    let _guard = RunningGuard(running);
                    task(token)
                })
                .map_err(|source| EngineError::TaskSpawn { name, source })?
        };
        debug!(task = name, "Spawned background task");

        Ok(Self {
            name,
            token,
            running,
            thread: Some(thread),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Asks the task to stop after its current unit of work.
    pub fn request_stop(&self) {
        self.token.cancel();
    }

    /// Waits for the task to finish on its own.
    pub fn join(mut self) -> Result<T, EngineError> {
        self.join_inner()
    }

    pub fn stop_and_join(mut self) -> Result<T, EngineError> {
        self.request_stop();
        self.join_inner()
    }

    fn join_inner(&mut self) -> Result<T, EngineError> {
        let thread = self
            .thread
            .take()
            .ok_or(EngineError::TaskPanicked(self.name))?;
        thread.join().map_err(|_| {
            error!(task = self.name, "Background task panicked");
            EngineError::TaskPanicked(self.name)
        })
    }
}

impl<T: Send + 'static> Drop for TaskHandle<T> {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.request_stop();
            let _ = self.join_inner();
        }
    }
}

/// Clears the running flag however the task exits, including by panic.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn stop_and_join_lets_current_unit_finish() {
        let units = Arc::new(AtomicUsize::new(0));
        let handle = {
            let units = Arc::clone(&units);
            TaskHandle::spawn("counter", move |token| {
                while !token.is_cancelled() {
                    thread::sleep(Duration::from_millis(1));
                    units.fetch_add(1, Ordering::SeqCst);
                }
                units.load(Ordering::SeqCst)
            })
            .unwrap()
        };

        thread::sleep(Duration::from_millis(10));
        let finished_units = handle.stop_and_join().unwrap();
        assert_eq!(finished_units, units.load(Ordering::SeqCst));
    }

    #[test]
    fn join_returns_task_result_and_clears_running_flag() {
        let handle = TaskHandle::spawn("answer", |_| 42).unwrap();
        let running = Arc::clone(&handle.running);
        assert_eq!(handle.join().unwrap(), 42);
        assert!(!running.load(Ordering::Acquire));
    }

    #[test]
    fn panicking_task_is_reported_not_propagated() {
        let handle = TaskHandle::<()>::spawn("boom", |_| panic!("task failure")).unwrap();
        assert!(matches!(handle.join(), Err(EngineError::TaskPanicked("boom"))));
    }

    #[test]
    fn dropping_handle_stops_the_task() {
        let token_seen = Arc::new(AtomicBool::new(false));
        {
            let token_seen = Arc::clone(&token_seen);
            let _handle = TaskHandle::spawn("looper", move |token| {
                while !token.is_cancelled() {
                    thread::sleep(Duration::from_millis(1));
                }
                token_seen.store(true, Ordering::SeqCst);
            })
            .unwrap();
        }
        assert!(token_seen.load(Ordering::SeqCst));
    }

    #[test]
    fn completion_clamps_and_reports_done() {
        let completion = Completion::new();
        assert_eq!(completion.get(), 0.0);
        completion.set(0.5);
        assert_eq!(completion.get(), 0.5);
        completion.set(3.0);
        assert!(completion.is_done());
    }
}
