use std::time::Duration;

/// Whether the reactor is in the middle of correcting a window's layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    Idle,
    /// A corrective sequence is running. Only the task carrying the same
    /// `generation` (or the watchdog armed with it) may end it.
    FixingLayout { generation: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraceExpiry {
    /// No grace window was armed.
    Inactive,
    /// The window was extended; a later expiry task owns it now.
    Pending,
    /// Expiry is suspended while a sequence runs. It is settled when the
    /// sequence finishes.
    Deferred,
    Expired,
}

/// Keeps focus notifications caused by our own layout changes from being
/// acted upon, and tracks whether a focus change right now stands for a
/// deliberate pane switch.
///
/// Two independent things suppress focus handling: a running corrective
/// sequence ([`GuardState::FixingLayout`]), and a synchronous layout
/// assignment in progress (see [`FocusGuard::begin_apply`]).
#[derive(Debug)]
pub struct FocusGuard {
    state: GuardState,
    applying: u32,
    generation: u64,
    can_switch_pane: bool,
    switch_grace_until: Option<Duration>,
    disable_timeout: bool,
}

impl Default for FocusGuard {
    fn default() -> Self { Self::new() }
}

impl FocusGuard {
    pub fn new() -> Self {
        FocusGuard {
            state: GuardState::Idle,
            applying: 0,
            generation: 0,
            can_switch_pane: false,
            switch_grace_until: None,
            disable_timeout: false,
        }
    }

    pub fn state(&self) -> GuardState { self.state }

    pub fn is_fixing_layout(&self) -> bool {
        self.applying > 0 || matches!(self.state, GuardState::FixingLayout { .. })
    }

    /// Enters `FixingLayout`, returning the generation that must be passed
    /// back to [`Self::finish_fixing`]. `None` if a sequence is already
    /// running.
    pub fn begin_fixing(&mut self) -> Option<u64> {
        if self.is_fixing_layout() {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        self.state = GuardState::FixingLayout { generation: self.generation };
        Some(self.generation)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.state == GuardState::FixingLayout { generation }
    }

    /// Returns to `Idle` if `generation` is still the running sequence.
    /// Stale generations are ignored so that a late watchdog cannot end a
    /// newer sequence.
    pub fn finish_fixing(&mut self, generation: u64, now: Duration) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.state = GuardState::Idle;
        if std::mem::take(&mut self.disable_timeout)
            && self.switch_grace_until.is_some_and(|until| until <= now)
        {
            self.can_switch_pane = false;
            self.switch_grace_until = None;
        }
        true
    }

    pub fn begin_apply(&mut self) { self.applying += 1; }

    pub fn end_apply(&mut self) { self.applying = self.applying.saturating_sub(1); }

    /// Allows pane switches until `now + grace`. Returns the deadline at which
    /// [`Self::expire_switch_grace`] should run.
    pub fn arm_switch_grace(&mut self, now: Duration, grace: Duration) -> Duration {
        let deadline = now + grace;
        let until = self.switch_grace_until.map_or(deadline, |until| until.max(deadline));
        self.can_switch_pane = true;
        self.switch_grace_until = Some(until);
        deadline
    }

    pub fn can_switch_pane(&self) -> bool { self.can_switch_pane }

    pub fn switch_grace_until(&self) -> Option<Duration> { self.switch_grace_until }

    pub fn expire_switch_grace(&mut self, now: Duration) -> GraceExpiry {
        if !self.can_switch_pane {
            return GraceExpiry::Inactive;
        }
        if self.switch_grace_until.is_some_and(|until| until > now) {
            return GraceExpiry::Pending;
        }
        if self.disable_timeout {
            return GraceExpiry::Deferred;
        }
        self.can_switch_pane = false;
        self.switch_grace_until = None;
        GraceExpiry::Expired
    }

    pub fn disable_timeout(&self) -> bool { self.disable_timeout }

    pub fn set_disable_timeout(&mut self, disabled: bool) { self.disable_timeout = disabled; }
}
