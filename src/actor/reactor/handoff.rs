//! Keeping a maximized pane in front when the host opens a file elsewhere.
//!
//! Some hosts open a file into another group (for example from a search
//! results panel) and lose its scroll position and tab order when the view is
//! reopened. Instead of switching the maximized pane we clone the new view
//! into the maximized group and then re-anchor the clone. Each step waits for
//! the host to finish the previous one.

use tracing::{debug, trace};

use crate::actor::reactor::{CommandEventHandler, PaneError, Reactor, Task};
use crate::sys::host::{Host, Region, ViewId, WindowId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HandoffStage {
    SetIndex,
    Focus,
    CopySelection,
}

/// Moves a clone of `source` into `target_group` right after that group's
/// active view.
#[derive(Clone, Debug)]
pub(crate) struct Handoff {
    window: WindowId,
    generation: u64,
    source: ViewId,
    clone: ViewId,
    target_group: usize,
    target_index: usize,
    stage: HandoffStage,
}

impl Handoff {
    pub(crate) fn start<H: Host>(
        reactor: &mut Reactor<H>,
        window: WindowId,
        generation: u64,
        source: ViewId,
        target_group: usize,
    ) -> Result<(), PaneError> {
        let target_index = reactor
            .host
            .active_view_in_group(window, target_group)
            .and_then(|anchor| reactor.host.view_index(anchor))
            .map_or(0, |(_, index)| index + 1);

        reactor.focus_guard.set_disable_timeout(true);
        let clone = reactor.host.clone_view(source).ok_or(PaneError::UnknownView(source))?;
        debug!(%source, %clone, target_group, target_index, "cloned view for handoff");

        let delay = reactor.config.settings.timing.handoff_index_delay;
        reactor.schedule(
            delay,
            Task::Handoff(Handoff {
                window,
                generation,
                source,
                clone,
                target_group,
                target_index,
                stage: HandoffStage::SetIndex,
            }),
        );
        Ok(())
    }

    pub(crate) fn step<H: Host>(mut self, reactor: &mut Reactor<H>) {
        if !reactor.focus_guard.is_current(self.generation) {
            debug!(stage = ?self.stage, "handoff abandoned, guard was released");
            return;
        }
        trace!(stage = ?self.stage, clone = %self.clone, "handoff step");
        let timing = reactor.config.settings.timing.clone();
        match self.stage {
            HandoffStage::SetIndex => {
                reactor.host.set_view_index(self.clone, self.target_group, self.target_index);
                self.stage = HandoffStage::Focus;
                reactor.schedule(timing.handoff_focus_delay, Task::Handoff(self));
            }
            HandoffStage::Focus => {
                reactor.host.focus_view(self.clone);
                CommandEventHandler::refresh_status(reactor, self.window);
                self.stage = HandoffStage::CopySelection;
                reactor.schedule(timing.handoff_selection_delay, Task::Handoff(self));
            }
            HandoffStage::CopySelection => {
                let selection = reactor.host.selection(self.source);
                let viewport = reactor.host.viewport_position(self.source);
                reactor.host.set_selection(self.clone, &selection);
                reactor.host.set_viewport_position(self.clone, viewport);
                let release = Task::ReleaseGuard { generation: self.generation };
                RestoreView::start(reactor, self.clone, self.window, self.generation, release);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum RestoreStage {
    WaitLoaded,
    OpenAt(Captured),
    RestoreIndex(Captured),
    Nudge(Captured),
    RestoreSelection(Captured),
}

#[derive(Clone, Debug)]
pub(crate) struct Captured {
    file: Option<String>,
    row: usize,
    col: usize,
    group: usize,
    index: usize,
    selection: Vec<Region>,
}

/// Re-anchors a view whose scroll position and tab order the host reset:
/// waits until it has loaded, reopens it at its caret with the tab moved to
/// the front, puts the tab back, nudges the caret so the host refreshes its
/// viewport, and finally restores the exact selection. `then` runs last.
///
/// Runs under the guard of `generation` and stops once that guard is gone.
#[derive(Clone, Debug)]
pub(crate) struct RestoreView {
    view: ViewId,
    window: WindowId,
    generation: u64,
    stage: RestoreStage,
    then: Option<Box<Task>>,
}

impl RestoreView {
    pub(crate) fn start<H: Host>(
        reactor: &mut Reactor<H>,
        view: ViewId,
        window: WindowId,
        generation: u64,
        then: Task,
    ) {
        RestoreView {
            view,
            window,
            generation,
            stage: RestoreStage::WaitLoaded,
            then: Some(Box::new(then)),
        }
        .step(reactor);
    }

    pub(crate) fn step<H: Host>(mut self, reactor: &mut Reactor<H>) {
        if !reactor.focus_guard.is_current(self.generation) {
            debug!(view = %self.view, "view restore abandoned, guard was released");
            return;
        }
        let delay = reactor.config.settings.timing.restore_step_delay;
        let stage = std::mem::replace(&mut self.stage, RestoreStage::WaitLoaded);
        match stage {
            RestoreStage::WaitLoaded => {
                if reactor.host.is_loading(self.view) {
                    let poll = reactor.config.settings.timing.loading_poll;
                    trace!(view = %self.view, "still loading");
                    reactor.schedule(poll, Task::RestoreView(self));
                    return;
                }
                let Some(captured) = self.capture(reactor) else {
                    debug!(view = %self.view, "view went away before it could be restored");
                    self.finish(reactor);
                    return;
                };
                reactor.host.set_view_index(self.view, captured.group, 0);
                self.stage = RestoreStage::OpenAt(captured);
                reactor.schedule(delay, Task::RestoreView(self));
            }
            RestoreStage::OpenAt(captured) => {
                if let Some(file) = &captured.file {
                    reactor.host.open_file_at(self.window, file, captured.row, captured.col);
                }
                self.stage = RestoreStage::RestoreIndex(captured);
                reactor.schedule(delay, Task::RestoreView(self));
            }
            RestoreStage::RestoreIndex(captured) => {
                reactor.host.set_view_index(self.view, captured.group, captured.index);
                self.stage = RestoreStage::Nudge(captured);
                reactor.schedule(delay, Task::RestoreView(self));
            }
            RestoreStage::Nudge(captured) => {
                reactor.host.move_caret_lines(self.view, false);
                reactor.host.move_caret_lines(self.view, true);
                self.stage = RestoreStage::RestoreSelection(captured);
                reactor.schedule(delay, Task::RestoreView(self));
            }
            RestoreStage::RestoreSelection(captured) => {
                reactor.host.set_selection(self.view, &captured.selection);
                self.finish(reactor);
            }
        }
    }

    fn capture<H: Host>(&self, reactor: &Reactor<H>) -> Option<Captured> {
        let (group, index) = reactor.host.view_index(self.view)?;
        let selection = reactor.host.selection(self.view);
        let first = selection.first().map_or(0, Region::begin);
        let (row, col) = reactor.host.rowcol(self.view, first);
        Some(Captured {
            file: reactor.host.file_name(self.view),
            row,
            col,
            group,
            index,
            selection,
        })
    }

    fn finish<H: Host>(self, reactor: &mut Reactor<H>) {
        if let Some(then) = self.then {
            reactor.run_task(*then);
        }
    }
}
