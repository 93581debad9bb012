use tracing::{debug, info};

use crate::actor::reactor::{PaneCommand, PaneError, Reactor, STATUS_KEY};
use crate::layout_engine::FocusDirection;
use crate::sys::host::{Host, WindowId};

pub struct CommandEventHandler;

impl CommandEventHandler {
    pub fn handle_command<H: Host>(reactor: &mut Reactor<H>, window: WindowId, cmd: PaneCommand) {
        let name: &'static str = cmd.into();
        info!(%window, command = name);
        let result = match cmd {
            PaneCommand::ToggleMaximize => Self::toggle(reactor, window),
            PaneCommand::Maximize { skip_saving } => Self::maximize(reactor, window, skip_saving),
            PaneCommand::Unmaximize => Self::unmaximize(reactor, window),
            PaneCommand::DistributeLayout => Self::distribute(reactor, window),
            PaneCommand::ShiftPaneFocus => Self::shift_focus(reactor, window, FocusDirection::Next),
            PaneCommand::UnshiftPaneFocus => {
                Self::shift_focus(reactor, window, FocusDirection::Prev)
            }
        };
        if let Err(e) = result {
            reactor.report(&e);
        }
    }

    /// Whether `window` should be treated as maximized: either we maximized
    /// it, or nothing is saved and its layout has collapsed onto one group.
    pub fn is_maximized<H: Host>(reactor: &Reactor<H>, window: WindowId) -> bool {
        if reactor.snapshots.is_maximized(window) {
            return true;
        }
        !reactor.snapshots.has(window)
            && reactor.host.layout(window).is_some_and(|layout| layout.looks_maximized())
    }

    pub fn toggle<H: Host>(reactor: &mut Reactor<H>, window: WindowId) -> Result<(), PaneError> {
        if Self::is_maximized(reactor, window) {
            return Self::unmaximize(reactor, window);
        }
        match reactor.host.num_groups(window) {
            0 => Err(PaneError::UnknownWindow(window)),
            1 => Err(PaneError::SinglePane { groups: 1 }),
            _ => Self::maximize(reactor, window, false),
        }
    }

    /// Collapses the grid onto the active group.
    ///
    /// Maximizing twice would overwrite the saved layout with the collapsed
    /// one, so a second maximize unmaximizes and reports
    /// [`PaneError::AlreadyMaximized`] instead. `skip_saving` bypasses both
    /// the check and the snapshot.
    pub fn maximize<H: Host>(
        reactor: &mut Reactor<H>,
        window: WindowId,
        skip_saving: bool,
    ) -> Result<(), PaneError> {
        if !skip_saving && (reactor.snapshots.is_maximized(window) || reactor.snapshots.has(window))
        {
            Self::unmaximize(reactor, window)?;
            return Err(PaneError::AlreadyMaximized(window));
        }

        let layout = reactor.host.layout(window).ok_or(PaneError::UnknownWindow(window))?;
        let active_group =
            reactor.host.active_group(window).ok_or(PaneError::UnknownWindow(window))?;
        let maximized = layout.maximized(active_group)?;
        debug!(%window, active_group, cols = ?maximized.cols, rows = ?maximized.rows, "maximizing");

        if !skip_saving {
            reactor.snapshots.save(window, layout, active_group);
        }
        reactor.snapshots.set_maximized(window, true);
        reactor.apply_layout(window, &maximized);
        Self::refresh_status(reactor, window);
        Ok(())
    }

    /// Puts back the saved layout. Without one, a layout that still looks
    /// maximized is spread out evenly so no group stays hidden.
    pub fn unmaximize<H: Host>(
        reactor: &mut Reactor<H>,
        window: WindowId,
    ) -> Result<(), PaneError> {
        reactor.snapshots.clear_maximized(window);
        Self::clear_status(reactor, window);

        if reactor.snapshots.has(window) {
            let layout =
                reactor.snapshots.restore(window).ok_or(PaneError::NoSavedLayout(window))?;
            debug!(%window, cols = ?layout.cols, rows = ?layout.rows, "restoring layout");
            reactor.apply_layout(window, &layout);
        } else if reactor.host.layout(window).is_some_and(|layout| layout.looks_maximized()) {
            debug!(%window, "no saved layout but window looks maximized");
            Self::distribute(reactor, window)?;
        }
        Ok(())
    }

    pub fn distribute<H: Host>(
        reactor: &mut Reactor<H>,
        window: WindowId,
    ) -> Result<(), PaneError> {
        let layout = reactor.host.layout(window).ok_or(PaneError::UnknownWindow(window))?;
        reactor.apply_layout(window, &layout.distributed());
        Ok(())
    }

    /// Focuses the next (or previous) group. Counts as a deliberate pane
    /// switch, so a maximized window follows focus to the new group.
    pub fn shift_focus<H: Host>(
        reactor: &mut Reactor<H>,
        window: WindowId,
        direction: FocusDirection,
    ) -> Result<(), PaneError> {
        let groups = reactor.host.num_groups(window);
        let active = reactor.host.active_group(window).ok_or(PaneError::UnknownWindow(window))?;
        let target = direction.step(active, groups);
        if target == active {
            return Ok(());
        }
        let grace = reactor.config.settings.timing.switch_grace;
        reactor.arm_switch_grace(grace);
        reactor.host.focus_group(window, target);
        Ok(())
    }

    /// Moves the status label to the active view of the maximized window.
    pub(crate) fn refresh_status<H: Host>(reactor: &mut Reactor<H>, window: WindowId) {
        if reactor.config.settings.status_label.is_empty() {
            return;
        }
        let view = reactor.host.active_view(window);
        let previous = reactor.snapshots.set_status_view(window, view);
        if let Some(previous) = previous
            && Some(previous) != view
        {
            reactor.host.set_status(previous, STATUS_KEY, None);
        }
        if let Some(view) = view {
            let label = reactor.config.settings.status_label.clone();
            reactor.host.set_status(view, STATUS_KEY, Some(&label));
        }
    }

    fn clear_status<H: Host>(reactor: &mut Reactor<H>, window: WindowId) {
        if let Some(view) = reactor.snapshots.set_status_view(window, None) {
            reactor.host.set_status(view, STATUS_KEY, None);
        }
    }
}
