//! In-memory editor used by replays and tests.
//!
//! It reproduces the host behaviour the pane logic has to cope with: assigning
//! a layout moves focus to the first group, freshly opened views report
//! themselves as loading for a few polls, and every focus change queues a
//! [`Notification::ViewActivated`].

use std::cell::Cell as Counter;

use crate::common::collections::BTreeMap;
use crate::layout_engine::WindowLayout;
use crate::sys::host::{Host, Notification, Region, ViewId, Viewport, WindowId};

/// Text points per line in the headless buffer model.
pub const LINE_WIDTH: usize = 1000;
/// Viewport height of one line.
pub const LINE_HEIGHT: f64 = 20.0;

#[derive(Debug)]
struct HeadlessWindow {
    layout: WindowLayout,
    groups: Vec<Vec<ViewId>>,
    selected: Vec<Option<ViewId>>,
    active_group: usize,
}

#[derive(Debug)]
struct HeadlessView {
    window: WindowId,
    file: Option<String>,
    selection: Vec<Region>,
    viewport: Viewport,
    loading_polls: Counter<u32>,
    status: BTreeMap<String, String>,
    caret_moves: u32,
}

#[derive(Debug)]
pub struct HeadlessEditor {
    windows: BTreeMap<WindowId, HeadlessWindow>,
    views: BTreeMap<ViewId, HeadlessView>,
    next_id: u32,
    notifications: Vec<Notification>,
    messages: Vec<String>,
    /// Mimic hosts that focus the first group whenever a layout is assigned.
    pub reset_focus_on_set_layout: bool,
    /// How many `is_loading` polls a freshly opened or cloned view answers
    /// `true` to.
    pub load_polls: u32,
}

impl Default for HeadlessEditor {
    fn default() -> Self { Self::new() }
}

impl HeadlessEditor {
    pub fn new() -> Self {
        HeadlessEditor {
            windows: BTreeMap::new(),
            views: BTreeMap::new(),
            next_id: 0,
            notifications: Vec::new(),
            messages: Vec::new(),
            reset_focus_on_set_layout: true,
            load_polls: 0,
        }
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Creates a window with `layout` and one view per entry of `files`,
    /// `(group, file)`. Focus starts in group 0.
    pub fn add_window(&mut self, layout: WindowLayout, files: &[(usize, &str)]) -> WindowId {
        let id = WindowId(self.next_id());
        let groups = layout.num_groups().max(1);
        self.windows.insert(id, HeadlessWindow {
            layout,
            groups: vec![Vec::new(); groups],
            selected: vec![None; groups],
            active_group: 0,
        });
        for &(group, file) in files {
            self.add_view(id, group, file);
        }
        id
    }

    /// Adds a loaded view at the end of `group` and selects it there without
    /// moving window focus.
    pub fn add_view(&mut self, window: WindowId, group: usize, file: &str) -> Option<ViewId> {
        let id = ViewId(self.next_id());
        let w = self.windows.get_mut(&window)?;
        let tabs = w.groups.get_mut(group)?;
        tabs.push(id);
        w.selected[group] = Some(id);
        self.views.insert(id, HeadlessView::new(window, Some(file.to_string())));
        Some(id)
    }

    pub fn close_window(&mut self, window: WindowId) {
        if self.windows.remove(&window).is_some() {
            self.views.retain(|_, v| v.window != window);
        }
    }

    /// What a user double-clicking a search result does: open `file` in
    /// `group` and focus it.
    pub fn open_in_group(
        &mut self,
        window: WindowId,
        group: usize,
        file: &str,
        row: usize,
        col: usize,
    ) -> Option<ViewId> {
        let w = self.windows.get_mut(&window)?;
        if group >= w.groups.len() {
            return None;
        }
        // Focus lands directly on the opened view, with no activation for
        // whatever the group showed before.
        w.active_group = group;
        self.open_file_at(window, file, row, col)
    }

    pub fn views_in_group(&self, window: WindowId, group: usize) -> Vec<ViewId> {
        self.windows
            .get(&window)
            .and_then(|w| w.groups.get(group))
            .cloned()
            .unwrap_or_default()
    }

    pub fn status(&self, view: ViewId, key: &str) -> Option<&str> {
        self.views.get(&view).and_then(|v| v.status.get(key)).map(String::as_str)
    }

    pub fn messages(&self) -> &[String] { &self.messages }

    pub fn caret_moves(&self, view: ViewId) -> u32 {
        self.views.get(&view).map(|v| v.caret_moves).unwrap_or(0)
    }

    fn activate(&mut self, window: WindowId, group: usize, view: Option<ViewId>) {
        let before = self.active_view(window);
        let Some(w) = self.windows.get_mut(&window) else { return };
        if group >= w.groups.len() {
            return;
        }
        w.active_group = group;
        if view.is_some() {
            w.selected[group] = view;
        }
        let after = self.active_view(window);
        if let Some(view) = after
            && after != before
        {
            self.notifications.push(Notification::ViewActivated(view));
        }
    }

    fn detach(&mut self, view: ViewId) -> Option<(WindowId, usize, usize)> {
        let window = self.views.get(&view)?.window;
        let w = self.windows.get_mut(&window)?;
        let (group, index) = locate(w, view)?;
        w.groups[group].remove(index);
        if w.selected[group] == Some(view) {
            let tabs = &w.groups[group];
            w.selected[group] = tabs.get(index.saturating_sub(1)).or(tabs.first()).copied();
        }
        Some((window, group, index))
    }
}

impl HeadlessView {
    fn new(window: WindowId, file: Option<String>) -> Self {
        HeadlessView {
            window,
            file,
            selection: vec![Region::caret(0)],
            viewport: Viewport::default(),
            loading_polls: Counter::new(0),
            status: BTreeMap::new(),
            caret_moves: 0,
        }
    }
}

fn locate(window: &HeadlessWindow, view: ViewId) -> Option<(usize, usize)> {
    window.groups.iter().enumerate().find_map(|(group, tabs)| {
        tabs.iter().position(|&v| v == view).map(|index| (group, index))
    })
}

impl Host for HeadlessEditor {
    fn windows(&self) -> Vec<WindowId> { self.windows.keys().copied().collect() }

    fn layout(&self, window: WindowId) -> Option<WindowLayout> {
        self.windows.get(&window).map(|w| w.layout.clone())
    }

    fn set_layout(&mut self, window: WindowId, layout: &WindowLayout) {
        let Some(w) = self.windows.get_mut(&window) else { return };
        let groups = layout.num_groups().max(1);
        if groups < w.groups.len() {
            let orphaned: Vec<ViewId> = w.groups.drain(groups..).flatten().collect();
            w.selected.truncate(groups);
            let last = groups - 1;
            w.groups[last].extend(orphaned);
            if w.selected[last].is_none() {
                w.selected[last] = w.groups[last].first().copied();
            }
            w.active_group = w.active_group.min(last);
        } else {
            w.groups.resize(groups, Vec::new());
            w.selected.resize(groups, None);
        }
        w.layout = layout.clone();
        if self.reset_focus_on_set_layout {
            self.activate(window, 0, None);
        }
    }

    fn num_groups(&self, window: WindowId) -> usize {
        self.windows.get(&window).map(|w| w.groups.len()).unwrap_or(0)
    }

    fn active_group(&self, window: WindowId) -> Option<usize> {
        self.windows.get(&window).map(|w| w.active_group)
    }

    fn focus_group(&mut self, window: WindowId, group: usize) {
        self.activate(window, group, None);
    }

    fn active_view(&self, window: WindowId) -> Option<ViewId> {
        let w = self.windows.get(&window)?;
        w.selected.get(w.active_group).copied().flatten()
    }

    fn active_view_in_group(&self, window: WindowId, group: usize) -> Option<ViewId> {
        self.windows.get(&window)?.selected.get(group).copied().flatten()
    }

    fn focus_view(&mut self, view: ViewId) {
        let Some(window) = self.view_window(view) else { return };
        if let Some((group, _)) = self.view_index(view) {
            self.activate(window, group, Some(view));
        }
    }

    fn view_window(&self, view: ViewId) -> Option<WindowId> { self.views.get(&view).map(|v| v.window) }

    fn view_index(&self, view: ViewId) -> Option<(usize, usize)> {
        let window = self.views.get(&view)?.window;
        locate(self.windows.get(&window)?, view)
    }

    fn set_view_index(&mut self, view: ViewId, group: usize, index: usize) {
        let Some(window) = self.view_window(view) else { return };
        if group >= self.num_groups(window) {
            return;
        }
        let was_active = self.active_view(window) == Some(view);
        let Some(_) = self.detach(view) else { return };
        let Some(w) = self.windows.get_mut(&window) else { return };
        let tabs = &mut w.groups[group];
        let index = index.min(tabs.len());
        tabs.insert(index, view);
        if was_active {
            self.activate(window, group, Some(view));
        } else if w.selected[group].is_none() {
            w.selected[group] = Some(view);
        }
    }

    fn file_name(&self, view: ViewId) -> Option<String> {
        self.views.get(&view).and_then(|v| v.file.clone())
    }

    fn is_loading(&self, view: ViewId) -> bool {
        let Some(v) = self.views.get(&view) else { return false };
        let polls = v.loading_polls.get();
        if polls == 0 {
            return false;
        }
        v.loading_polls.set(polls - 1);
        true
    }

    fn open_file_at(
        &mut self,
        window: WindowId,
        file: &str,
        row: usize,
        col: usize,
    ) -> Option<ViewId> {
        let group = self.active_group(window)?;
        let existing = self
            .views_in_group(window, group)
            .into_iter()
            .find(|v| self.views.get(v).and_then(|v| v.file.as_deref()) == Some(file));
        let view = match existing {
            Some(view) => view,
            None => {
                let view = ViewId(self.next_id());
                let state = HeadlessView::new(window, Some(file.to_string()));
                state.loading_polls.set(self.load_polls);
                self.views.insert(view, state);
                self.windows.get_mut(&window)?.groups[group].push(view);
                view
            }
        };
        if let Some(v) = self.views.get_mut(&view) {
            v.selection = vec![Region::caret(row * LINE_WIDTH + col)];
            v.viewport = Viewport { x: 0.0, y: row as f64 * LINE_HEIGHT };
        }
        self.activate(window, group, Some(view));
        Some(view)
    }

    fn clone_view(&mut self, view: ViewId) -> Option<ViewId> {
        let source = self.views.get(&view)?;
        let window = source.window;
        let mut clone = HeadlessView::new(window, source.file.clone());
        clone.selection = source.selection.clone();
        clone.viewport = source.viewport;
        clone.loading_polls.set(self.load_polls);
        let (group, _) = self.view_index(view)?;
        let id = ViewId(self.next_id());
        self.views.insert(id, clone);
        self.windows.get_mut(&window)?.groups[group].push(id);
        self.activate(window, group, Some(id));
        Some(id)
    }

    fn selection(&self, view: ViewId) -> Vec<Region> {
        self.views.get(&view).map(|v| v.selection.clone()).unwrap_or_default()
    }

    fn set_selection(&mut self, view: ViewId, regions: &[Region]) {
        if let Some(v) = self.views.get_mut(&view) {
            v.selection = regions.to_vec();
        }
    }

    fn rowcol(&self, _view: ViewId, point: usize) -> (usize, usize) {
        (point / LINE_WIDTH, point % LINE_WIDTH)
    }

    fn viewport_position(&self, view: ViewId) -> Viewport {
        self.views.get(&view).map(|v| v.viewport).unwrap_or_default()
    }

    fn set_viewport_position(&mut self, view: ViewId, position: Viewport) {
        if let Some(v) = self.views.get_mut(&view) {
            v.viewport = position;
        }
    }

    fn move_caret_lines(&mut self, view: ViewId, forward: bool) {
        let Some(v) = self.views.get_mut(&view) else { return };
        for region in &mut v.selection {
            let point = if forward {
                region.b + LINE_WIDTH
            } else {
                region.b.saturating_sub(LINE_WIDTH)
            };
            *region = Region::caret(point);
        }
        v.caret_moves += 1;
    }

    fn set_status(&mut self, view: ViewId, key: &str, value: Option<&str>) {
        let Some(v) = self.views.get_mut(&view) else { return };
        match value {
            Some(value) => {
                v.status.insert(key.to_string(), value.to_string());
            }
            None => {
                v.status.remove(key);
            }
        }
    }

    fn status_message(&mut self, message: &str) { self.messages.push(message.to_string()); }

    fn take_notifications(&mut self) -> Vec<Notification> { std::mem::take(&mut self.notifications) }
}
