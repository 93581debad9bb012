use crate::common::collections::HashMap;
use crate::common::collections::hash_map::Entry;
use crate::layout_engine::WindowLayout;
use crate::sys::host::{ViewId, WindowId};

/// What we remember about a window while one of its groups is maximized.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaneSnapshot {
    /// Layout to put back on unmaximize. Absent when the maximize skipped
    /// saving or the record was lost.
    pub saved_layout: Option<WindowLayout>,
    pub maximized_group: Option<usize>,
    pub is_maximized: bool,
    /// View that carries the maximized status label.
    pub status_view: Option<ViewId>,
}

/// Per-window pane state, keyed by window identity. Lives as long as the
/// reactor; nothing is written to disk.
#[derive(Clone, Debug, Default)]
pub struct PaneSnapshotStore(HashMap<WindowId, PaneSnapshot>);

impl PaneSnapshotStore {
    pub fn new() -> Self { Self::default() }

    /// Records the layout to restore and the group being maximized,
    /// overwriting whatever was saved before.
    pub fn save(&mut self, window: WindowId, layout: WindowLayout, active_group: usize) {
        match self.0.entry(window) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.saved_layout = Some(layout);
                record.maximized_group = Some(active_group);
            }
            Entry::Vacant(entry) => {
                entry.insert(PaneSnapshot {
                    saved_layout: Some(layout),
                    maximized_group: Some(active_group),
                    ..PaneSnapshot::default()
                });
            }
        }
    }

    pub fn has(&self, window: WindowId) -> bool {
        self.0.get(&window).is_some_and(|record| record.saved_layout.is_some())
    }

    /// Takes the saved layout out of the record. Check [`Self::has`] first.
    pub fn restore(&mut self, window: WindowId) -> Option<WindowLayout> {
        self.0.get_mut(&window).and_then(|record| record.saved_layout.take())
    }

    pub fn get(&self, window: WindowId) -> Option<&PaneSnapshot> { self.0.get(&window) }

    pub fn is_maximized(&self, window: WindowId) -> bool {
        self.0.get(&window).is_some_and(|record| record.is_maximized)
    }

    pub fn maximized_group(&self, window: WindowId) -> Option<usize> {
        self.0.get(&window).and_then(|record| record.maximized_group)
    }

    pub fn set_maximized(&mut self, window: WindowId, maximized: bool) {
        self.0.entry(window).or_default().is_maximized = maximized;
    }

    pub fn set_status_view(&mut self, window: WindowId, view: Option<ViewId>) -> Option<ViewId> {
        std::mem::replace(&mut self.0.entry(window).or_default().status_view, view)
    }

    /// Clears the maximized flag and group, leaving any saved layout.
    pub fn clear_maximized(&mut self, window: WindowId) {
        if let Some(record) = self.0.get_mut(&window) {
            record.is_maximized = false;
            record.maximized_group = None;
        }
    }

    pub fn forget(&mut self, window: WindowId) -> Option<PaneSnapshot> { self.0.remove(&window) }
}
