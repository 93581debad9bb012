//! The Reactor owns all pane state and reacts to commands and host
//! notifications.
//!
//! Work that has to wait for the host to settle is queued as [`Task`]s on a
//! deadline queue. A task only ever schedules its own successor, so the steps
//! of a sequence run strictly in order.

mod events;
mod handoff;
mod managers;
mod replay;

#[cfg(test)]
mod tests;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

pub use self::events::command::CommandEventHandler;
pub use self::events::focus::FocusEventHandler;
use self::handoff::{Handoff, RestoreView};
pub use self::managers::focus_guard::{FocusGuard, GraceExpiry, GuardState};
pub use self::replay::{Action, Script, Step, ViewSpec, WindowSpec, replay};
use crate::actor;
use crate::common::config::Config;
use crate::layout_engine::{LayoutError, WindowLayout};
use crate::model::PaneSnapshotStore;
use crate::model::server::{GuardData, StateData, WindowData};
use crate::sys::host::{Host, Notification, ViewId, WindowId};
use crate::sys::timer::Timers;

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

/// Status bar key used for the maximized label.
pub const STATUS_KEY: &str = "maxpane";

/// Window-scoped commands a user can bind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::IntoStaticStr)]
#[serde(tag = "name", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaneCommand {
    ToggleMaximize,
    Maximize {
        #[serde(default)]
        skip_saving: bool,
    },
    Unmaximize,
    DistributeLayout,
    ShiftPaneFocus,
    UnshiftPaneFocus,
}

#[derive(Clone, Debug)]
pub enum Event {
    Command(WindowId, PaneCommand),
    /// The host is about to run a window command, e.g. `focus_group`.
    WindowCommand(WindowId, String),
    ViewActivated(ViewId),
    WindowClosed(WindowId),
    ConfigUpdated(Config),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PaneError {
    #[error("cannot maximize a window with only {groups} pane(s)")]
    SinglePane { groups: usize },
    #[error("{0} is already maximized; unmaximizing instead")]
    AlreadyMaximized(WindowId),
    #[error("no saved layout for {0}")]
    NoSavedLayout(WindowId),
    #[error("unknown {0}")]
    UnknownWindow(WindowId),
    #[error("unknown {0}")]
    UnknownView(ViewId),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Clone)]
pub(crate) enum Task {
    UnmaximizeForSwitch { window: WindowId, generation: u64 },
    RemaximizeForSwitch { window: WindowId, generation: u64 },
    ReleaseGuard { generation: u64 },
    GuardWatchdog { generation: u64 },
    ExpireSwitchGrace,
    Handoff(Handoff),
    RestoreView(RestoreView),
}

pub struct Reactor<H> {
    pub(crate) host: H,
    pub(crate) config: Config,
    pub(crate) snapshots: PaneSnapshotStore,
    pub(crate) focus_guard: FocusGuard,
    timers: Timers<Task>,
    sequences_started: u64,
}

impl<H: Host> Reactor<H> {
    pub fn new(host: H, config: Config) -> Self {
        Reactor {
            host,
            config,
            snapshots: PaneSnapshotStore::new(),
            focus_guard: FocusGuard::new(),
            timers: Timers::new(),
            sequences_started: 0,
        }
    }

    pub fn host(&self) -> &H { &self.host }

    /// Direct access to the host, for driving it the way a user would. Call
    /// [`Self::pump`] afterwards so queued notifications are handled.
    pub fn host_mut(&mut self) -> &mut H { &mut self.host }

    pub fn config(&self) -> &Config { &self.config }

    pub fn snapshots(&self) -> &PaneSnapshotStore { &self.snapshots }

    pub fn focus_guard(&self) -> &FocusGuard { &self.focus_guard }

    pub fn now(&self) -> Duration { self.timers.now() }

    pub fn pending_tasks(&self) -> usize { self.timers.len() }

    /// Number of corrective focus sequences started so far.
    pub fn sequences_started(&self) -> u64 { self.sequences_started }

    pub async fn run(mut self, mut events: Receiver) -> Self {
        let start = tokio::time::Instant::now();
        loop {
            let deadline = self.timers.next_deadline();
            tokio::select! {
                _ = tokio::time::sleep_until(start + deadline.unwrap_or_default()), if deadline.is_some() => {
                    self.advance_to(start.elapsed());
                }
                maybe = events.recv() => {
                    let Some((span, event)) = maybe else { break };
                    let _guard = span.enter();
                    self.advance_to(start.elapsed());
                    self.handle_event(event);
                }
            }
        }
        // Let running sequences finish so the guard is never left held.
        while let Some(deadline) = self.timers.next_deadline() {
            tokio::time::sleep_until(start + deadline).await;
            self.advance_to(start.elapsed());
        }
        self
    }

    #[instrument(name = "reactor::handle_event", skip(self), fields(event = ?event))]
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Command(window, cmd) => CommandEventHandler::handle_command(self, window, cmd),
            Event::WindowCommand(window, name) => {
                FocusEventHandler::handle_window_command(self, window, &name)
            }
            Event::ViewActivated(view) => FocusEventHandler::handle_view_activated(self, view),
            Event::WindowClosed(window) => {
                if self.snapshots.forget(window).is_some() {
                    debug!(%window, "forgot pane state of closed window");
                }
            }
            Event::ConfigUpdated(config) => self.config = config,
        }
        self.pump();
    }

    /// Runs every task due at or before `now`, then moves the clock there.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some(task) = self.timers.pop_due(now) {
            self.run_task(task);
            self.pump();
        }
        self.timers.advance(now);
    }

    /// Hands queued host notifications to their handlers, including any
    /// raised while handling them.
    pub fn pump(&mut self) {
        loop {
            let notifications = self.host.take_notifications();
            if notifications.is_empty() {
                break;
            }
            for notification in notifications {
                match notification {
                    Notification::ViewActivated(view) => {
                        FocusEventHandler::handle_view_activated(self, view)
                    }
                }
            }
        }
    }

    pub(crate) fn schedule(&mut self, delay: Duration, task: Task) {
        let due = self.timers.schedule(delay, task);
        trace!(?due, "scheduled task");
    }

    pub(crate) fn begin_sequence(&mut self) -> Option<u64> {
        let generation = self.focus_guard.begin_fixing()?;
        self.sequences_started += 1;
        let timeout = self.config.settings.timing.guard_timeout;
        self.schedule(timeout, Task::GuardWatchdog { generation });
        Some(generation)
    }

    pub(crate) fn finish_sequence(&mut self, generation: u64) -> bool {
        let now = self.timers.now();
        self.focus_guard.finish_fixing(generation, now)
    }

    pub(crate) fn arm_switch_grace(&mut self, grace: Duration) {
        let deadline = self.focus_guard.arm_switch_grace(self.timers.now(), grace);
        debug!(?deadline, "pane switching allowed");
        self.schedule(grace, Task::ExpireSwitchGrace);
    }

    fn run_task(&mut self, task: Task) {
        trace!(?task, now = ?self.timers.now(), "running task");
        match task {
            Task::UnmaximizeForSwitch { window, generation } => {
                FocusEventHandler::handle_unmaximize_step(self, window, generation)
            }
            Task::RemaximizeForSwitch { window, generation } => {
                FocusEventHandler::handle_remaximize_step(self, window, generation)
            }
            Task::ReleaseGuard { generation } => {
                self.finish_sequence(generation);
            }
            Task::GuardWatchdog { generation } => {
                if self.finish_sequence(generation) {
                    warn!(generation, "focus sequence timed out, releasing guard");
                }
            }
            Task::ExpireSwitchGrace => {
                let now = self.timers.now();
                if self.focus_guard.expire_switch_grace(now) == GraceExpiry::Expired {
                    debug!("pane switching grace expired");
                }
            }
            Task::Handoff(handoff) => handoff.step(self),
            Task::RestoreView(restore) => restore.step(self),
        }
    }

    /// Assigns `layout` and puts focus back on the group that had it.
    ///
    /// Hosts may move focus while a layout is assigned. Focus notifications
    /// raised in between are delivered while the guard is held, so they are
    /// dropped.
    pub(crate) fn apply_layout(&mut self, window: WindowId, layout: &WindowLayout) {
        let active_group = self.host.active_group(window);
        self.focus_guard.begin_apply();
        self.host.set_layout(window, layout);
        if let Some(group) = active_group {
            self.host.focus_group(window, group);
        }
        self.pump();
        self.focus_guard.end_apply();
    }

    pub(crate) fn report(&mut self, error: &PaneError) {
        warn!(%error, "pane command failed");
        self.host.status_message(&format!("MaxPane: {error}"));
    }

    pub fn state_data(&self) -> StateData {
        let windows = self
            .host
            .windows()
            .into_iter()
            .map(|id| {
                let snapshot = self.snapshots.get(id);
                let layout = self.host.layout(id);
                WindowData {
                    id,
                    is_maximized: snapshot.is_some_and(|s| s.is_maximized),
                    maximized_group: snapshot.and_then(|s| s.maximized_group),
                    active_group: self.host.active_group(id),
                    active_view: self.host.active_view(id),
                    looks_maximized: layout.as_ref().is_some_and(WindowLayout::looks_maximized),
                    layout,
                    saved_layout: snapshot.and_then(|s| s.saved_layout.clone()),
                }
            })
            .collect();
        StateData {
            now: self.timers.now(),
            pending_tasks: self.timers.len(),
            guard: GuardData {
                fixing_layout: self.focus_guard.is_fixing_layout(),
                can_switch_pane: self.focus_guard.can_switch_pane(),
                disable_timeout: self.focus_guard.disable_timeout(),
                switch_grace_until: self.focus_guard.switch_grace_until(),
                sequences_started: self.sequences_started,
            },
            windows,
        }
    }

    pub fn serialize_state(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.state_data())
    }
}
