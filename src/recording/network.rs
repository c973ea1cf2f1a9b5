//! Network interception.
//!
//! The page's two network primitives (fetch-like and XHR-like) are modeled
//! as swappable function handles. While a session records, both are replaced
//! with wrappers that delegate to the originals and record every settled
//! call; `uninstall` puts the original handles back pointer-identically.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::{CapturedResponse, NetworkFailure, NetworkRequest, NetworkResponse};
use crate::recording::clock::Clock;

pub type NetworkResult = Result<NetworkResponse, NetworkFailure>;

/// One of the page's network entry points.
pub type NetworkPrimitive = Arc<dyn Fn(&NetworkRequest) -> NetworkResult + Send + Sync>;

/// The page's network surface, owned by the host. The recorder patches it for
/// the duration of a session.
#[derive(Clone)]
pub struct PageNetwork {
    pub fetch: NetworkPrimitive,
    pub xhr: NetworkPrimitive,
}

impl PageNetwork {
    pub fn new(fetch: NetworkPrimitive, xhr: NetworkPrimitive) -> Self {
        Self { fetch, xhr }
    }
}

#[derive(Debug, Default)]
struct TapState {
    responses: Vec<CapturedResponse>,
    paused: bool,
    last_user_action_ms: Option<i64>,
    idle_deadline_ms: Option<i64>,
}

/// Records traffic through the patched primitives and detects network idle
/// after recent user activity.
pub struct NetworkMonitor {
    clock: Arc<dyn Clock>,
    idle_threshold_ms: i64,
    staleness_window_ms: i64,
    state: Arc<Mutex<TapState>>,
    originals: Option<(NetworkPrimitive, NetworkPrimitive)>,
}

impl NetworkMonitor {
    pub fn new(clock: Arc<dyn Clock>, idle_threshold_ms: i64, staleness_window_ms: i64) -> Self {
        Self {
            clock,
            idle_threshold_ms,
            staleness_window_ms,
            state: Arc::new(Mutex::new(TapState::default())),
            originals: None,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.originals.is_some()
    }

    /// Patch both primitives. A second install without an uninstall would
    /// double-patch, so it is refused.
    pub fn install(&mut self, page: &mut PageNetwork) {
        if self.originals.is_some() {
            tracing::warn!("network monitor already installed, skipping");
            return;
        }
        let fetch_original = Arc::clone(&page.fetch);
        let xhr_original = Arc::clone(&page.xhr);
        page.fetch = self.wrap(Arc::clone(&fetch_original));
        page.xhr = self.wrap(Arc::clone(&xhr_original));
        self.originals = Some((fetch_original, xhr_original));
        tracing::debug!("network primitives patched");
    }

    /// Restore both primitives to their pre-install identity and drop all
    /// captured state.
    pub fn uninstall(&mut self, page: &mut PageNetwork) {
        let Some((fetch_original, xhr_original)) = self.originals.take() else {
            return;
        };
        page.fetch = fetch_original;
        page.xhr = xhr_original;
        let mut state = self.state.lock();
        state.responses.clear();
        state.idle_deadline_ms = None;
        state.last_user_action_ms = None;
        state.paused = false;
        tracing::debug!("network primitives restored");
    }

    fn wrap(&self, original: NetworkPrimitive) -> NetworkPrimitive {
        let state = Arc::clone(&self.state);
        let clock = Arc::clone(&self.clock);
        let idle_threshold = self.idle_threshold_ms;
        let staleness_window = self.staleness_window_ms;
        Arc::new(move |request: &NetworkRequest| {
            {
                // A request starting pushes out an armed idle deadline.
                let mut state = state.lock();
                if !state.paused && state.idle_deadline_ms.is_some() {
                    state.idle_deadline_ms = Some(clock.now_ms() + idle_threshold);
                }
            }
            let outcome = (original)(request);
            let now = clock.now_ms();
            let mut state = state.lock();
            if !state.paused {
                let status = match &outcome {
                    Ok(response) => response.status,
                    Err(_) => 0,
                };
                state.responses.push(CapturedResponse {
                    url: request.url.clone(),
                    method: request.method.clone(),
                    status,
                });
                let recent = state
                    .last_user_action_ms
                    .map(|t| now - t <= staleness_window)
                    .unwrap_or(false);
                if recent || state.idle_deadline_ms.is_some() {
                    state.idle_deadline_ms = Some(now + idle_threshold);
                }
            }
            outcome
        })
    }

    pub fn set_paused(&self, paused: bool) {
        self.state.lock().paused = paused;
    }

    /// Record the timestamp of the most recent user-originated step.
    pub fn note_user_action(&self, now_ms: i64) {
        self.state.lock().last_user_action_ms = Some(now_ms);
    }

    /// True exactly once when the armed idle deadline has passed.
    pub fn poll_idle(&self, now_ms: i64) -> bool {
        let mut state = self.state.lock();
        match state.idle_deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                state.idle_deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    pub fn responses(&self) -> Vec<CapturedResponse> {
        self.state.lock().responses.clone()
    }
}
