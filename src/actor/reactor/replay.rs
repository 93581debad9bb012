//! Scripted sessions against the headless editor.
//!
//! A script describes the starting windows and a list of timed user actions.
//! Time is virtual: the reactor's timers fire exactly at their deadlines
//! between steps, so a replay is deterministic.

use std::time::Duration;

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use tracing::{debug, info_span};

use crate::actor::reactor::{Event, PaneCommand, Reactor};
use crate::common::config::Config;
use crate::layout_engine::WindowLayout;
use crate::sys::headless::HeadlessEditor;
use crate::sys::host::{Host, WindowId};

/// How long to keep running timers after the last step.
const SETTLE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// `is_loading` polls answered `true` by every newly opened view.
    #[serde(default)]
    pub load_polls: u32,
    pub windows: Vec<WindowSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowSpec {
    pub layout: WindowLayout,
    #[serde(default)]
    pub views: Vec<ViewSpec>,
    #[serde(default)]
    pub active_group: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewSpec {
    pub group: usize,
    pub file: String,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Milliseconds since the start of the session.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default)]
    pub at: Duration,
    #[serde(flatten)]
    pub action: Action,
}

/// Windows are referred to by their position in [`Script::windows`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Command {
        #[serde(default)]
        window: usize,
        command: PaneCommand,
    },
    /// A host window command, e.g. `jump_back`, announced to the reactor.
    WindowCommand {
        #[serde(default)]
        window: usize,
        name: String,
    },
    /// The host's `focus_group` command.
    FocusGroup {
        #[serde(default)]
        window: usize,
        group: usize,
    },
    /// A file opened into a group without any pane command, like a
    /// double-click on a search result.
    OpenFile {
        #[serde(default)]
        window: usize,
        group: usize,
        file: String,
        #[serde(default)]
        row: usize,
        #[serde(default)]
        col: usize,
    },
    CloseWindow {
        #[serde(default)]
        window: usize,
    },
}

impl Action {
    fn window(&self) -> usize {
        match self {
            Action::Command { window, .. }
            | Action::WindowCommand { window, .. }
            | Action::FocusGroup { window, .. }
            | Action::OpenFile { window, .. }
            | Action::CloseWindow { window } => *window,
        }
    }
}

/// Runs `script` to completion and returns the reactor for inspection.
pub fn replay(script: &Script, config: Config) -> anyhow::Result<Reactor<HeadlessEditor>> {
    let mut editor = HeadlessEditor::new();
    editor.load_polls = script.load_polls;

    let mut windows: Vec<WindowId> = Vec::with_capacity(script.windows.len());
    for (index, spec) in script.windows.iter().enumerate() {
        spec.layout.validate().with_context(|| format!("layout of window {index}"))?;
        let files: Vec<(usize, &str)> =
            spec.views.iter().map(|v| (v.group, v.file.as_str())).collect();
        let id = editor.add_window(spec.layout.clone(), &files);
        editor.focus_group(id, spec.active_group);
        windows.push(id);
    }
    editor.take_notifications();

    let mut reactor = Reactor::new(editor, config);
    let mut steps: Vec<&Step> = script.steps.iter().collect();
    steps.sort_by_key(|step| step.at);

    for step in steps {
        reactor.advance_to(step.at);
        let index = step.action.window();
        let window = *windows
            .get(index)
            .ok_or_else(|| anyhow!("step at {:?} refers to unknown window {index}", step.at))?;
        let span = info_span!("replay::step", at = ?step.at, %window);
        let _guard = span.enter();
        debug!(action = ?step.action);

        match &step.action {
            Action::Command { command, .. } => {
                reactor.handle_event(Event::Command(window, *command));
            }
            Action::WindowCommand { name, .. } => {
                reactor.handle_event(Event::WindowCommand(window, name.clone()));
            }
            Action::FocusGroup { group, .. } => {
                reactor.handle_event(Event::WindowCommand(window, "focus_group".to_string()));
                reactor.host_mut().focus_group(window, *group);
                reactor.pump();
            }
            Action::OpenFile { group, file, row, col, .. } => {
                reactor
                    .host_mut()
                    .open_in_group(window, *group, file, *row, *col)
                    .ok_or_else(|| anyhow!("cannot open {file} in group {group}"))?;
                reactor.pump();
            }
            Action::CloseWindow { .. } => {
                reactor.host_mut().close_window(window);
                reactor.handle_event(Event::WindowClosed(window));
            }
        }
    }

    let end = reactor.now() + SETTLE;
    reactor.advance_to(end);
    Ok(reactor)
}
