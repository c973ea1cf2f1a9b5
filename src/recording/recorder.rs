//! The recording state machine and event interceptor.
//!
//! Raw page events come in (typed, or as JSON payloads from the page
//! bridge); ordered [`RecordedStep`]s come out. Debouncing, deduplication and
//! the network/mutation side channels all live here. Timers are deadlines
//! compared against the injected clock; `poll` flushes whatever expired.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use crate::dom::{DomNode, NodeId, PageDom};
use crate::error::Result;
use crate::label::LabelResolver;
use crate::models::{
    PageEvent, RawEvent, RecordedStep, RecordingSession, SessionStatus, StepType,
};
use crate::recording::clock::{Clock, SystemClock};
use crate::recording::debounce::DebounceMap;
use crate::recording::mutation::MutationWatcher;
use crate::recording::network::{NetworkMonitor, PageNetwork};
use crate::selector::SelectorResolver;

/// Keystrokes into the same field within this window collapse into one step.
pub const INPUT_DEBOUNCE_MS: i64 = 500;
pub const MUTATION_DEBOUNCE_MS: i64 = 500;
/// No request activity for this long after recent user action means idle.
pub const NETWORK_IDLE_MS: i64 = 500;
/// Requests settling later than this after the last user step are treated as
/// background traffic and never produce an idle wait.
pub const USER_ACTION_STALENESS_MS: i64 = 10_000;
pub const DEFAULT_WAIT_TIMEOUT_MS: i64 = 5_000;
/// A form submit within this window of a submit-button click is the same
/// submission and is not recorded twice.
const SUBMIT_SUPPRESS_WINDOW_MS: i64 = 1_000;
/// Elements inside the recorder's own UI carry this attribute (directly or on
/// an ancestor) and are never recorded.
pub const UI_CONTAINER_ATTR: &str = "data-pagescribe-ui";

const RECORDED_KEYS: [&str; 3] = ["Enter", "Tab", "Escape"];
const CLICK_LABEL_MAX: usize = 60;

pub type StepCallback = Box<dyn FnMut(&RecordedStep, usize) + Send>;

/// Editable fields of an existing step.
#[derive(Debug, Clone, Default)]
pub struct StepEdit {
    pub value: Option<String>,
    pub wait_timeout: Option<i64>,
}

#[derive(Debug, Clone)]
struct PendingFill {
    target: NodeId,
    value: String,
}

pub struct Recorder {
    dom: PageDom,
    clock: Arc<dyn Clock>,
    selectors: SelectorResolver,
    labels: LabelResolver,
    monitor: NetworkMonitor,
    watcher: MutationWatcher,
    network: Arc<Mutex<PageNetwork>>,
    session: Option<RecordingSession>,
    fills: DebounceMap<PendingFill>,
    fill_steps: HashMap<String, usize>,
    select_steps: HashMap<String, usize>,
    last_submit_click_ms: Option<i64>,
    on_step_added: Option<StepCallback>,
    on_step_updated: Option<StepCallback>,
}

impl Recorder {
    pub fn new(dom: PageDom, network: Arc<Mutex<PageNetwork>>) -> Self {
        Self::with_clock(dom, network, Arc::new(SystemClock))
    }

    pub fn with_clock(dom: PageDom, network: Arc<Mutex<PageNetwork>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            monitor: NetworkMonitor::new(
                Arc::clone(&clock),
                NETWORK_IDLE_MS,
                USER_ACTION_STALENESS_MS,
            ),
            watcher: MutationWatcher::new(MUTATION_DEBOUNCE_MS, DEFAULT_WAIT_TIMEOUT_MS),
            fills: DebounceMap::new(INPUT_DEBOUNCE_MS),
            dom,
            clock,
            selectors: SelectorResolver::new(),
            labels: LabelResolver::new(),
            network,
            session: None,
            fill_steps: HashMap::new(),
            select_steps: HashMap::new(),
            last_submit_click_ms: None,
            on_step_added: None,
            on_step_updated: None,
        }
    }

    pub fn dom(&self) -> &PageDom {
        &self.dom
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    pub fn steps(&self) -> &[RecordedStep] {
        self.session
            .as_ref()
            .map(|s| s.steps.as_slice())
            .unwrap_or(&[])
    }

    pub fn status(&self) -> SessionStatus {
        self.session
            .as_ref()
            .map(|s| s.status)
            .unwrap_or(SessionStatus::Idle)
    }

    /// Subscribe to step appends. Passing `None` clears the subscriber.
    pub fn set_on_step_added(&mut self, callback: Option<StepCallback>) {
        self.on_step_added = callback;
    }

    /// Subscribe to in-place step mutations. Passing `None` clears the
    /// subscriber.
    pub fn set_on_step_updated(&mut self, callback: Option<StepCallback>) {
        self.on_step_updated = callback;
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Begin a new session at the DOM's current URL. An active session is
    /// stopped first so global patches are never stacked.
    pub fn start(&mut self) -> RecordingSession {
        if self.session.as_ref().map(|s| s.is_active()).unwrap_or(false) {
            tracing::info!("active session found, stopping it before start");
            self.stop();
        }
        self.reset_transients();
        let now = self.clock.now_ms();
        let mut session = RecordingSession::new(&self.dom.url);
        session.steps.push(RecordedStep::navigate(&self.dom.url, now));
        let snapshot = session.clone();
        self.session = Some(session);
        {
            let mut page = self.network.lock();
            self.monitor.install(&mut page);
        }
        self.monitor.set_paused(false);
        self.monitor.note_user_action(now);
        self.notify_added(0);
        tracing::info!(url = %self.dom.url, id = %snapshot.id, "recording started");
        snapshot
    }

    /// Valid only while recording; otherwise `None` and no state change.
    pub fn pause(&mut self) -> Option<SessionStatus> {
        let session = self.session.as_mut()?;
        if session.status != SessionStatus::Recording {
            return None;
        }
        session.status = SessionStatus::Paused;
        self.monitor.set_paused(true);
        tracing::info!("recording paused");
        Some(SessionStatus::Paused)
    }

    /// Valid only while paused; otherwise `None` and no state change.
    pub fn resume(&mut self) -> Option<SessionStatus> {
        let session = self.session.as_mut()?;
        if session.status != SessionStatus::Paused {
            return None;
        }
        session.status = SessionStatus::Recording;
        self.monitor.set_paused(false);
        tracing::info!("recording resumed");
        Some(SessionStatus::Recording)
    }

    /// Finalize the active session. Steps stay available for export; every
    /// patched global is restored and every pending timer cancelled. `None`
    /// when nothing is active.
    pub fn stop(&mut self) -> Option<RecordingSession> {
        if !self.session.as_ref().map(|s| s.is_active()).unwrap_or(false) {
            return None;
        }
        self.fills.clear();
        self.watcher.reset();
        self.fill_steps.clear();
        self.select_steps.clear();
        self.last_submit_click_ms = None;
        let responses = self.monitor.responses();
        {
            let mut page = self.network.lock();
            self.monitor.uninstall(&mut page);
        }
        let session = self.session.as_mut()?;
        session.status = SessionStatus::Stopped;
        session.stopped_at = Some(Utc::now());
        session.responses = responses;
        tracing::info!(steps = session.steps.len(), "recording stopped");
        Some(session.clone())
    }

    /// Hard reset to no session at all. Safe to call with nothing active.
    pub fn clear_session(&mut self) {
        if self.monitor.is_installed() {
            let mut page = self.network.lock();
            self.monitor.uninstall(&mut page);
        }
        self.session = None;
        self.reset_transients();
        tracing::info!("session cleared");
    }

    fn reset_transients(&mut self) {
        self.fills.clear();
        self.watcher.reset();
        self.fill_steps.clear();
        self.select_steps.clear();
        self.last_submit_click_ms = None;
    }

    // ------------------------------------------------------------------
    // Step editing and manual insertion
    // ------------------------------------------------------------------

    /// Push an arbitrary step (e.g. an assertion authored in a UI). No-op
    /// without an active session.
    pub fn insert_step(&mut self, step: RecordedStep) -> bool {
        if !self.session_active() {
            return false;
        }
        self.push_step(step).is_some()
    }

    /// Remove a step from the active session. `false` on a stopped/absent
    /// session or an out-of-range index.
    pub fn remove_step(&mut self, index: usize) -> bool {
        if !self.session_active() {
            return false;
        }
        let removed = {
            let Some(session) = self.session.as_mut() else { return false };
            if index >= session.steps.len() {
                return false;
            }
            session.steps.remove(index)
        };
        shift_indices(&mut self.fill_steps, index);
        shift_indices(&mut self.select_steps, index);
        self.notify_updated_with(&removed, index);
        true
    }

    /// Edit a step's value and/or wait timeout in place. `false` on a
    /// stopped/absent session or an out-of-range index.
    pub fn update_step(&mut self, index: usize, edit: StepEdit) -> bool {
        if !self.session_active() {
            return false;
        }
        {
            let Some(session) = self.session.as_mut() else { return false };
            let Some(step) = session.steps.get_mut(index) else { return false };
            if let Some(value) = edit.value {
                step.value = Some(value);
            }
            if let Some(timeout) = edit.wait_timeout {
                step.wait_timeout = Some(timeout);
            }
        }
        self.notify_updated(index);
        true
    }

    // ------------------------------------------------------------------
    // DOM feed
    // ------------------------------------------------------------------

    /// Attach a node to the DOM mirror, feeding the mutation watcher while
    /// recording.
    pub fn attach_node(&mut self, parent: NodeId, node: DomNode) -> NodeId {
        let id = self.dom.attach(parent, node);
        if self.status() == SessionStatus::Recording {
            let now = self.clock.now_ms();
            self.watcher
                .node_attached(&self.dom, id, &self.selectors, &self.labels, now);
        }
        id
    }

    /// Detach a node from the DOM mirror, feeding the mutation watcher while
    /// recording.
    pub fn detach_node(&mut self, id: NodeId) {
        if self.status() == SessionStatus::Recording {
            let now = self.clock.now_ms();
            self.watcher.node_detached(&self.dom, id, now);
        }
        self.dom.detach(id);
    }

    // ------------------------------------------------------------------
    // Event intake
    // ------------------------------------------------------------------

    /// Handle a raw JSON payload from the page bridge. Unknown event types
    /// are skipped; malformed JSON is a typed error the host may log.
    pub fn handle_payload(&mut self, payload: &str) -> Result<()> {
        let raw: RawEvent = serde_json::from_str(payload)?;
        match raw.into_event() {
            Some(event) => self.handle_event(event),
            None => tracing::debug!("unrecognized event payload, skipping"),
        }
        Ok(())
    }

    /// Handle a typed page event. A no-op unless the session is recording.
    pub fn handle_event(&mut self, event: PageEvent) {
        self.poll();
        if self.status() != SessionStatus::Recording {
            return;
        }
        let now = self.clock.now_ms();
        match event {
            PageEvent::Input { target, value } => self.on_input(target, value, now),
            PageEvent::Change { target, value, checked } => {
                self.on_change(target, value, checked, now)
            }
            PageEvent::Click { target } => self.on_click(target, now),
            PageEvent::Submit { target } => self.on_submit(target, now),
            PageEvent::KeyDown { key } => self.on_key(&key, now),
            PageEvent::PageUnload { url } => self.on_unload(url, now),
            PageEvent::HashChange { url } | PageEvent::PopState { url } => {
                self.on_history_change(url, now)
            }
        }
    }

    /// Flush every expired deadline: debounced fills, mutation batches and
    /// the network-idle timer. Steps land in the order their debounced effect
    /// finalized.
    pub fn poll(&mut self) {
        if self.status() != SessionStatus::Recording {
            return;
        }
        let now = self.clock.now_ms();
        for (selector, pending) in self.fills.take_expired(now) {
            self.commit_fill(selector, pending, now);
        }
        for step in self.watcher.take_expired(now) {
            self.push_step(step);
        }
        if self.monitor.poll_idle(now) {
            self.push_step(RecordedStep::wait_for_network_idle(DEFAULT_WAIT_TIMEOUT_MS, now));
        }
    }

    // ------------------------------------------------------------------
    // Event handlers
    // ------------------------------------------------------------------

    fn on_input(&mut self, target: NodeId, value: String, now: i64) {
        if self.in_recorder_ui(target) {
            return;
        }
        let Some(node) = self.dom.node(target).cloned() else { return };
        if node.tag == "select" {
            self.record_select(target, value, now);
        } else if node.is_text_input() {
            let selector = self.selectors.resolve(&self.dom, target);
            self.fills.schedule(&selector, PendingFill { target, value }, now);
        }
    }

    fn on_change(&mut self, target: NodeId, value: String, checked: Option<bool>, now: i64) {
        if self.in_recorder_ui(target) {
            return;
        }
        let Some(node) = self.dom.node(target).cloned() else { return };
        if node.tag == "select" {
            self.record_select(target, value, now);
        } else if node.is_checkbox() {
            let selector = self.selectors.resolve(&self.dom, target);
            let label = self.labels.resolve(&self.dom, target);
            let step = if checked.unwrap_or(false) {
                RecordedStep::check(&selector, None, label, now)
            } else {
                RecordedStep::uncheck(&selector, label, now)
            };
            self.monitor.note_user_action(now);
            self.push_step(step);
        } else if node.is_radio() {
            if checked == Some(false) {
                return;
            }
            let selector = self.selectors.resolve(&self.dom, target);
            let label = self.labels.resolve(&self.dom, target);
            self.monitor.note_user_action(now);
            self.push_step(RecordedStep::check(&selector, Some(value), label, now));
        } else if node.is_text_input() {
            let selector = self.selectors.resolve(&self.dom, target);
            self.fills.schedule(&selector, PendingFill { target, value }, now);
        }
    }

    fn on_click(&mut self, target: NodeId, now: i64) {
        if self.in_recorder_ui(target) {
            return;
        }
        let Some(node) = self.dom.node(target).cloned() else { return };
        // Form fields are handled through the input/change paths. Note this
        // covers input[type=submit]: only button elements produce a submit
        // step from a click.
        if node.is_form_field() {
            return;
        }
        let selector = self.selectors.resolve(&self.dom, target);
        let label = self.click_label(target);
        self.monitor.note_user_action(now);
        if node.is_submit_button() {
            self.last_submit_click_ms = Some(now);
            self.push_step(RecordedStep::submit(Some(selector), None, label, now));
        } else {
            let smart = self.selectors.smart_selectors(&self.dom, target);
            self.push_step(RecordedStep::click(&selector, label, smart, now));
        }
    }

    fn on_submit(&mut self, target: NodeId, now: i64) {
        if self.in_recorder_ui(target) {
            return;
        }
        let Some(node) = self.dom.node(target).cloned() else { return };
        if node.tag != "form" {
            return;
        }
        if let Some(click_ms) = self.last_submit_click_ms {
            if now - click_ms <= SUBMIT_SUPPRESS_WINDOW_MS {
                tracing::debug!("form submit follows submit-button click, suppressing");
                return;
            }
        }
        let selector = self.selectors.resolve(&self.dom, target);
        let action_url = node.get_attr("action").map(|a| a.to_string());
        self.monitor.note_user_action(now);
        self.push_step(RecordedStep::submit(Some(selector), action_url, None, now));
    }

    fn on_key(&mut self, key: &str, now: i64) {
        if !RECORDED_KEYS.contains(&key) {
            return;
        }
        self.monitor.note_user_action(now);
        self.push_step(RecordedStep::press_key(key, now));
    }

    fn on_unload(&mut self, url: String, now: i64) {
        self.dom.url = url.clone();
        self.monitor.note_user_action(now);
        self.push_step(RecordedStep::navigate(&url, now));
    }

    fn on_history_change(&mut self, url: String, now: i64) {
        self.dom.url = url.clone();
        self.push_step(RecordedStep::wait_for_url(&url, DEFAULT_WAIT_TIMEOUT_MS, now));
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn commit_fill(&mut self, selector: String, pending: PendingFill, now: i64) {
        self.monitor.note_user_action(now);
        if let Some(&index) = self.fill_steps.get(&selector) {
            let updated = {
                let Some(session) = self.session.as_mut() else { return };
                match session.steps.get_mut(index) {
                    Some(step) if step.step_type == StepType::Fill => {
                        step.value = Some(pending.value.clone());
                        step.timestamp = now;
                        true
                    }
                    _ => false,
                }
            };
            if updated {
                tracing::debug!(%selector, "coalesced repeat input into existing fill step");
                self.notify_updated(index);
                return;
            }
            self.fill_steps.remove(&selector);
        }
        let label = self.labels.resolve(&self.dom, pending.target);
        let smart = self.selectors.smart_selectors(&self.dom, pending.target);
        let step = RecordedStep::fill(&selector, &pending.value, label, smart, now);
        if let Some(index) = self.push_step(step) {
            self.fill_steps.insert(selector, index);
        }
    }

    fn record_select(&mut self, target: NodeId, value: String, now: i64) {
        let selector = self.selectors.resolve(&self.dom, target);
        self.monitor.note_user_action(now);
        if let Some(&index) = self.select_steps.get(&selector) {
            let updated = {
                let Some(session) = self.session.as_mut() else { return };
                match session.steps.get_mut(index) {
                    Some(step) if step.step_type == StepType::Select => {
                        step.value = Some(value.clone());
                        step.timestamp = now;
                        true
                    }
                    _ => false,
                }
            };
            if updated {
                tracing::debug!(%selector, "updated existing select step in place");
                self.notify_updated(index);
                return;
            }
            self.select_steps.remove(&selector);
        }
        let label = self.labels.resolve(&self.dom, target);
        let smart = self.selectors.smart_selectors(&self.dom, target);
        let step = RecordedStep::select(&selector, &value, label, smart, now);
        if let Some(index) = self.push_step(step) {
            self.select_steps.insert(selector, index);
        }
    }

    fn click_label(&self, target: NodeId) -> Option<String> {
        let text = self.dom.text_content(target);
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            return Some(truncate(trimmed, CLICK_LABEL_MAX));
        }
        self.labels.resolve(&self.dom, target)
    }

    fn in_recorder_ui(&self, target: NodeId) -> bool {
        std::iter::once(target)
            .chain(self.dom.ancestors(target))
            .any(|id| {
                self.dom
                    .node(id)
                    .map(|n| n.get_attr(UI_CONTAINER_ATTR).is_some())
                    .unwrap_or(false)
            })
    }

    fn session_active(&self) -> bool {
        self.session.as_ref().map(|s| s.is_active()).unwrap_or(false)
    }

    fn push_step(&mut self, step: RecordedStep) -> Option<usize> {
        let index = {
            let session = self.session.as_mut()?;
            session.steps.push(step);
            session.steps.len() - 1
        };
        self.notify_added(index);
        Some(index)
    }

    fn notify_added(&mut self, index: usize) {
        let step = self
            .session
            .as_ref()
            .and_then(|s| s.steps.get(index))
            .cloned();
        if let (Some(callback), Some(step)) = (self.on_step_added.as_mut(), step) {
            callback(&step, index);
        }
    }

    fn notify_updated(&mut self, index: usize) {
        let step = self
            .session
            .as_ref()
            .and_then(|s| s.steps.get(index))
            .cloned();
        if let Some(step) = step {
            self.notify_updated_with(&step, index);
        }
    }

    fn notify_updated_with(&mut self, step: &RecordedStep, index: usize) {
        if let Some(callback) = self.on_step_updated.as_mut() {
            callback(step, index);
        }
    }
}

fn shift_indices(map: &mut HashMap<String, usize>, removed: usize) {
    map.retain(|_, index| *index != removed);
    for index in map.values_mut() {
        if *index > removed {
            *index -= 1;
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect::<String>() + "..."
    }
}
