use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

use crate::layout_engine::WindowLayout;
use crate::sys::host::{ViewId, WindowId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowData {
    pub id: WindowId,
    pub is_maximized: bool,
    pub maximized_group: Option<usize>,
    pub active_group: Option<usize>,
    pub active_view: Option<ViewId>,
    pub layout: Option<WindowLayout>,
    pub saved_layout: Option<WindowLayout>,
    /// Whether the live layout has collapsed onto one group.
    pub looks_maximized: bool,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardData {
    pub fixing_layout: bool,
    pub can_switch_pane: bool,
    pub disable_timeout: bool,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    pub switch_grace_until: Option<std::time::Duration>,
    /// Corrective focus sequences started since the reactor was created.
    pub sequences_started: u64,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateData {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub now: std::time::Duration,
    pub pending_tasks: usize,
    pub guard: GuardData,
    pub windows: Vec<WindowData>,
}
