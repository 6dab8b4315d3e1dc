//! Spinner shown while a lifecycle operation runs.
//!
//! The operation runs on a blocking worker thread and owns the state it
//! mutates for the duration. The foreground task only animates the spinner,
//! so the operation itself never depends on the terminal.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

const TICK: Duration = Duration::from_millis(100);

/// What the spinner says while running, and the line printed on success.
pub struct Status<T> {
    running: String,
    completed: Box<dyn FnOnce(&T) -> String>,
}

impl<T> Status<T> {
    pub fn new(
        running: impl Into<String>,
        completed: impl FnOnce(&T) -> String + 'static,
    ) -> Self {
        Self {
            running: running.into(),
            completed: Box::new(completed),
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("progress bar template is a valid static string"),
    );
    bar.set_message(message.to_string());
    bar
}

/// Run `op` against `state` in the background while a spinner ticks.
///
/// `state` is handed back together with the result whatever the outcome, so
/// the caller can persist partial progress. Ctrl-C removes the spinner but
/// does not cancel `op`; we still wait for it to finish. On success the
/// completion line goes to stdout. A panic inside `op` is resumed here.
pub async fn with_status<S, T, E, F>(status: Status<T>, state: S, op: F) -> (S, Result<T, E>)
where
    S: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce(&mut S) -> Result<T, E> + Send + 'static,
{
    let bar = spinner(&status.running);
    let mut worker = tokio::task::spawn_blocking(move || {
        let mut state = state;
        let result = op(&mut state);
        (state, result)
    });

    let mut ticker = tokio::time::interval(TICK);
    let mut detached = false;
    let joined = loop {
        tokio::select! {
            joined = &mut worker => break joined,
            _ = ticker.tick(), if !detached => bar.tick(),
            signal = tokio::signal::ctrl_c(), if !detached => {
                detached = true;
                bar.finish_and_clear();
                match signal {
                    Ok(()) => debug!("interrupted, waiting for the operation to finish"),
                    Err(e) => debug!(error = %e, "ctrl-c handler unavailable"),
                }
            }
        }
    };
    bar.finish_and_clear();

    let (state, result) = match joined {
        Ok(outcome) => outcome,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => unreachable!("blocking operation was cancelled: {e}"),
    };
    if let Ok(value) = &result {
        println!("{}", (status.completed)(value));
    }
    (state, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_with_status_returns_state_and_value() {
        let status = Status::new("Counting", |n: &usize| format!("Counted {n}"));
        let (state, result) = with_status(status, vec![1, 2, 3], |items: &mut Vec<i32>| {
            items.push(4);
            Ok::<_, String>(items.len())
        })
        .await;
        assert_eq!(state, vec![1, 2, 3, 4]);
        assert_eq!(result, Ok(4));
    }

    #[tokio::test]
    async fn test_with_status_hands_back_state_on_error() {
        let printed = Arc::new(AtomicBool::new(false));
        let flag = printed.clone();
        let status = Status::new("Failing", move |_: &()| {
            flag.store(true, Ordering::SeqCst);
            String::new()
        });
        let (state, result) = with_status(status, 1u32, |n: &mut u32| {
            *n += 1;
            Err::<(), _>("boom".to_string())
        })
        .await;
        assert_eq!(state, 2);
        assert_eq!(result, Err("boom".to_string()));
        assert!(!printed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_with_status_waits_for_slow_operation() {
        let status = Status::new("Sleeping", |_: &()| "Slept".to_string());
        let (_, result) = with_status(status, (), |_: &mut ()| {
            std::thread::sleep(Duration::from_millis(350));
            Ok::<_, String>(())
        })
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    #[should_panic(expected = "operation exploded")]
    async fn test_with_status_resumes_panics() {
        let status = Status::new("Exploding", |_: &()| String::new());
        let _ = with_status(status, (), |_: &mut ()| -> Result<(), String> {
            panic!("operation exploded")
        })
        .await;
    }
}
