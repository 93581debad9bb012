use tracing::{debug, trace, warn};

use crate::actor::reactor::handoff::Handoff;
use crate::actor::reactor::{CommandEventHandler, PaneError, Reactor, Task};
use crate::sys::host::{Host, ViewId, WindowId};

pub struct FocusEventHandler;

impl FocusEventHandler {
    /// Keeps a maximized window showing whatever group just received focus.
    ///
    /// Our own corrective steps move focus too, so while a sequence runs every
    /// activation is dropped. That is what stops the handler from recursing
    /// into itself.
    pub fn handle_view_activated<H: Host>(reactor: &mut Reactor<H>, view: ViewId) {
        if reactor.focus_guard.is_fixing_layout() {
            trace!(%view, "activation ignored while fixing layout");
            return;
        }
        let Some(window) = reactor.host.view_window(view) else { return };
        if !reactor.snapshots.is_maximized(window) {
            return;
        }
        let Some(maximized_group) = reactor.snapshots.maximized_group(window) else {
            return;
        };
        let Some(active_group) = reactor.host.active_group(window) else { return };
        if active_group == maximized_group {
            return;
        }
        let Some(generation) = reactor.begin_sequence() else { return };

        if reactor.focus_guard.can_switch_pane() || !reactor.config.settings.clone_workaround {
            debug!(%window, from = maximized_group, to = active_group, "switching maximized pane");
            let delay = reactor.config.settings.timing.fix_delay;
            reactor.schedule(delay, Task::UnmaximizeForSwitch { window, generation });
        } else {
            debug!(%window, %view, group = maximized_group, "keeping maximized pane, cloning view");
            if let Err(e) = Handoff::start(reactor, window, generation, view, maximized_group) {
                warn!(%e, "could not clone view into maximized pane");
                reactor.finish_sequence(generation);
            }
        }
    }

    /// Called before the host runs a window command. Commands that stand for
    /// a deliberate pane switch open the grace window.
    pub fn handle_window_command<H: Host>(reactor: &mut Reactor<H>, window: WindowId, name: &str) {
        if let Some(grace) = reactor.config.switch_grace_for(name) {
            trace!(%window, command = name, ?grace, "intentional pane switch");
            reactor.arm_switch_grace(grace);
        }
    }

    pub(crate) fn handle_unmaximize_step<H: Host>(
        reactor: &mut Reactor<H>,
        window: WindowId,
        generation: u64,
    ) {
        if !reactor.focus_guard.is_current(generation) {
            return;
        }
        if let Err(e) = CommandEventHandler::unmaximize(reactor, window) {
            Self::abort(reactor, generation, &e);
            return;
        }
        let delay = reactor.config.settings.timing.fix_delay;
        reactor.schedule(delay, Task::RemaximizeForSwitch { window, generation });
    }

    pub(crate) fn handle_remaximize_step<H: Host>(
        reactor: &mut Reactor<H>,
        window: WindowId,
        generation: u64,
    ) {
        if !reactor.focus_guard.is_current(generation) {
            return;
        }
        if let Err(e) = CommandEventHandler::maximize(reactor, window, false) {
            Self::abort(reactor, generation, &e);
            return;
        }
        let delay = reactor.config.settings.timing.fix_delay;
        reactor.schedule(delay, Task::ReleaseGuard { generation });
    }

    fn abort<H: Host>(reactor: &mut Reactor<H>, generation: u64, error: &PaneError) {
        reactor.report(error);
        reactor.finish_sequence(generation);
    }
}
