//! Debounce and throttle timers for input controls.
//!
//! Both run on the tokio runtime and belong to the control that created
//! them: dropping the timer cancels whatever call is still waiting.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

type AsyncCallback<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

/// Trailing-edge debounce.
///
/// Each call restarts the wait; when it elapses without another call the
/// callback runs once with the last value. A callback that has started runs
/// to completion even if new calls arrive.
pub struct Debouncer<T> {
    wait: Duration,
    callback: AsyncCallback<T>,
    pending: Mutex<Option<CancellationToken>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(wait: Duration, callback: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            wait,
            callback: Arc::new(move |value| -> BoxFuture<'static, ()> {
                Box::pin(callback(value))
            }),
            pending: Mutex::new(None),
        }
    }

    /// Schedule the callback. Must be called from within a tokio runtime.
    pub fn call(&self, value: T) {
        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().unwrap().replace(token.clone()) {
            previous.cancel();
        }

        let wait = self.wait;
        let callback = self.callback.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(wait) => {}
            }
            callback(value).await;
        });
    }

    /// Drop the waiting call, if any.
    pub fn cancel(&self) {
        if let Some(pending) = self.pending.lock().unwrap().take() {
            pending.cancel();
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(token) = pending.take() {
                token.cancel();
            }
        }
    }
}

struct ThrottleState<T> {
    last_invoked: Option<Instant>,
    pending: Option<T>,
    trailing: Option<CancellationToken>,
}

/// Leading and trailing edge throttle.
///
/// The first call in a window runs immediately. Later calls in the same
/// window are collapsed into one trailing call with the latest value.
pub struct Throttler<T> {
    wait: Duration,
    callback: Arc<dyn Fn(T) + Send + Sync>,
    state: Arc<Mutex<ThrottleState<T>>>,
}

impl<T: Send + 'static> Throttler<T> {
    pub fn new<F>(wait: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            wait,
            callback: Arc::new(callback),
            state: Arc::new(Mutex::new(ThrottleState {
                last_invoked: None,
                pending: None,
                trailing: None,
            })),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn call(&self, value: T) {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap();

        let window_open = state
            .last_invoked
            .map_or(true, |last| now.duration_since(last) >= self.wait);
        if window_open && state.trailing.is_none() {
            state.last_invoked = Some(now);
            drop(state);
            (self.callback)(value);
            return;
        }

        state.pending = Some(value);
        if state.trailing.is_some() {
            return;
        }

        let token = CancellationToken::new();
        state.trailing = Some(token.clone());
        let fire_at = state.last_invoked.map_or(now, |last| last + self.wait);
        drop(state);

        let shared = self.state.clone();
        let callback = self.callback.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep_until(fire_at) => {}
            }
            let value = {
                let mut state = shared.lock().unwrap();
                state.trailing = None;
                state.last_invoked = Some(Instant::now());
                state.pending.take()
            };
            if let Some(value) = value {
                callback(value);
            }
        });
    }

    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap();
        state.pending = None;
        if let Some(token) = state.trailing.take() {
            token.cancel();
        }
    }
}

impl<T> Drop for Throttler<T> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(token) = state.trailing.take() {
                token.cancel();
            }
        }
    }
}
