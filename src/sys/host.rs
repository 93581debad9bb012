//! The editor surface the pane logic runs against.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout_engine::WindowLayout;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "window#{}", self.0) }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "view#{}", self.0) }
}

/// A selection range between two text points. `b` is the caret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub a: usize,
    pub b: usize,
}

impl Region {
    pub fn caret(point: usize) -> Self { Region { a: point, b: point } }

    pub fn begin(&self) -> usize { self.a.min(self.b) }
}

/// Scroll offset of a view, in layout units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
}

/// Notifications the host raises while it is being driven.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    /// A view gained input focus.
    ViewActivated(ViewId),
}

/// Window, group and view operations of the editor.
///
/// Lookups on unknown ids return `None` or an empty value; mutations on
/// unknown ids are ignored. Hosts queue [`Notification`]s while they are
/// mutated and hand them over through [`Host::take_notifications`].
pub trait Host {
    fn windows(&self) -> Vec<WindowId>;

    fn layout(&self, window: WindowId) -> Option<WindowLayout>;

    /// Replaces the grid. Hosts are allowed to move focus to another group
    /// as a side effect.
    fn set_layout(&mut self, window: WindowId, layout: &WindowLayout);

    fn num_groups(&self, window: WindowId) -> usize;

    fn active_group(&self, window: WindowId) -> Option<usize>;

    fn focus_group(&mut self, window: WindowId, group: usize);

    fn active_view(&self, window: WindowId) -> Option<ViewId>;

    fn active_view_in_group(&self, window: WindowId, group: usize) -> Option<ViewId>;

    fn focus_view(&mut self, view: ViewId);

    fn view_window(&self, view: ViewId) -> Option<WindowId>;

    /// Group and tab position of `view`.
    fn view_index(&self, view: ViewId) -> Option<(usize, usize)>;

    fn set_view_index(&mut self, view: ViewId, group: usize, index: usize);

    fn file_name(&self, view: ViewId) -> Option<String>;

    fn is_loading(&self, view: ViewId) -> bool;

    /// Opens `file` in the active group with the caret at `row:col`, reusing
    /// an existing view of the file in that group.
    fn open_file_at(&mut self, window: WindowId, file: &str, row: usize, col: usize)
    -> Option<ViewId>;

    /// Clones `view` into a new view placed last in the same group.
    fn clone_view(&mut self, view: ViewId) -> Option<ViewId>;

    fn selection(&self, view: ViewId) -> Vec<Region>;

    fn set_selection(&mut self, view: ViewId, regions: &[Region]);

    fn rowcol(&self, view: ViewId, point: usize) -> (usize, usize);

    fn viewport_position(&self, view: ViewId) -> Viewport;

    fn set_viewport_position(&mut self, view: ViewId, position: Viewport);

    /// Moves every caret one line up (`forward == false`) or down.
    fn move_caret_lines(&mut self, view: ViewId, forward: bool);

    fn set_status(&mut self, view: ViewId, key: &str, value: Option<&str>);

    /// Shows a short message to the user.
    fn status_message(&mut self, message: &str);

    fn take_notifications(&mut self) -> Vec<Notification>;
}
