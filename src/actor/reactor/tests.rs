use std::time::Duration;

use pretty_assertions::assert_eq;
use test_log::test;

use super::*;
use crate::layout_engine::Cell;
use crate::sys::headless::{HeadlessEditor, LINE_WIDTH};
use crate::sys::host::Region;

fn ms(n: u64) -> Duration { Duration::from_millis(n) }

struct Harness {
    reactor: Reactor<HeadlessEditor>,
    window: WindowId,
}

impl Harness {
    fn new(layout: WindowLayout) -> Self { Self::with_config(layout, Config::default()) }

    fn with_config(layout: WindowLayout, config: Config) -> Self {
        let mut editor = HeadlessEditor::new();
        let files: Vec<(usize, String)> =
            (0..layout.num_groups()).map(|g| (g, format!("file{g}.rs"))).collect();
        let files: Vec<(usize, &str)> = files.iter().map(|(g, f)| (*g, f.as_str())).collect();
        let window = editor.add_window(layout, &files);
        editor.take_notifications();
        Harness { reactor: Reactor::new(editor, config), window }
    }

    fn command(&mut self, cmd: PaneCommand) {
        self.reactor.handle_event(Event::Command(self.window, cmd));
    }

    fn focus_group(&mut self, group: usize) {
        self.reactor.host_mut().focus_group(self.window, group);
        self.reactor.pump();
    }

    /// The host's own `focus_group` command: announced, then executed.
    fn user_focus_group(&mut self, group: usize) {
        self.reactor.handle_event(Event::WindowCommand(self.window, "focus_group".into()));
        self.focus_group(group);
    }

    fn advance(&mut self, by: Duration) {
        let now = self.reactor.now() + by;
        self.reactor.advance_to(now);
    }

    fn layout(&self) -> WindowLayout { self.reactor.host().layout(self.window).unwrap() }

    fn active_group(&self) -> usize { self.reactor.host().active_group(self.window).unwrap() }

    fn view_in_group(&self, group: usize) -> ViewId {
        self.reactor.host().active_view_in_group(self.window, group).unwrap()
    }
}

#[test]
fn maximize_and_restore_exact_layout() {
    let original = WindowLayout {
        cols: vec![0.0, 0.3, 0.8, 1.0],
        rows: vec![0.0, 1.0],
        cells: vec![Cell::new(0, 0, 1, 1), Cell::new(1, 0, 2, 1), Cell::new(2, 0, 3, 1)],
    };
    let mut h = Harness::new(original.clone());
    h.focus_group(1);

    h.command(PaneCommand::ToggleMaximize);
    assert_eq!(h.layout().cols, vec![0.0, 0.0, 1.0, 1.0]);
    assert_eq!(h.layout().rows, vec![0.0, 1.0]);
    assert_eq!(h.active_group(), 1);
    assert!(h.reactor.snapshots().is_maximized(h.window));
    assert_eq!(h.reactor.snapshots().maximized_group(h.window), Some(1));
    assert_eq!(h.reactor.sequences_started(), 0);

    h.command(PaneCommand::ToggleMaximize);
    assert_eq!(h.layout(), original);
    assert_eq!(h.active_group(), 1);
    assert!(!h.reactor.snapshots().has(h.window));
    assert!(!h.reactor.focus_guard().is_fixing_layout());
}

#[test]
fn maximizing_rows_collapses_rows() {
    let mut h = Harness::new(WindowLayout::rows(2));
    h.command(PaneCommand::ToggleMaximize);
    assert_eq!(h.layout().cols, vec![0.0, 1.0]);
    assert_eq!(h.layout().rows, vec![0.0, 1.0, 1.0]);
}

#[test]
fn single_pane_toggle_reports_and_changes_nothing() {
    let mut h = Harness::new(WindowLayout::single());
    h.command(PaneCommand::ToggleMaximize);
    assert_eq!(h.layout(), WindowLayout::single());
    assert!(!h.reactor.snapshots().is_maximized(h.window));
    let messages = h.reactor.host().messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("only 1 pane"), "{messages:?}");
}

#[test]
fn double_maximize_keeps_first_snapshot() {
    let mut h = Harness::new(WindowLayout::columns(2));
    h.command(PaneCommand::Maximize { skip_saving: false });
    h.command(PaneCommand::Maximize { skip_saving: false });
    assert_eq!(h.layout(), WindowLayout::columns(2));
    assert!(!h.reactor.snapshots().is_maximized(h.window));
    let message = &h.reactor.host().messages()[0];
    assert!(message.ends_with("is already maximized; unmaximizing instead"), "{message}");
}

#[test]
fn skip_saving_leaves_nothing_to_restore() {
    let mut h = Harness::new(WindowLayout::columns(3));
    h.command(PaneCommand::Maximize { skip_saving: true });
    assert!(h.layout().looks_maximized());
    assert!(h.reactor.snapshots().is_maximized(h.window));
    assert!(!h.reactor.snapshots().has(h.window));
    assert_eq!(h.reactor.snapshots().maximized_group(h.window), None);

    h.command(PaneCommand::Unmaximize);
    assert_eq!(h.layout().cols, vec![0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);
}

#[test]
fn collapsed_layout_without_snapshot_is_redistributed() {
    let collapsed = WindowLayout {
        cols: vec![0.0, 0.0, 1.0],
        rows: vec![0.0, 1.0],
        cells: vec![Cell::new(0, 0, 1, 1), Cell::new(1, 0, 2, 1)],
    };
    let mut h = Harness::new(collapsed);
    h.command(PaneCommand::ToggleMaximize);
    assert_eq!(h.layout(), WindowLayout::columns(2));
    assert!(h.reactor.host().messages().is_empty());
}

#[test]
fn distribute_evens_out_splits() {
    let mut h = Harness::new(WindowLayout {
        cols: vec![0.0, 0.9, 1.0],
        rows: vec![0.0, 0.2, 1.0],
        cells: vec![Cell::new(0, 0, 1, 2), Cell::new(1, 0, 2, 1), Cell::new(1, 1, 2, 2)],
    });
    h.focus_group(2);
    h.command(PaneCommand::DistributeLayout);
    assert_eq!(h.layout().cols, vec![0.0, 0.5, 1.0]);
    assert_eq!(h.layout().rows, vec![0.0, 0.5, 1.0]);
    assert_eq!(h.active_group(), 2);
}

#[test]
fn intentional_switch_follows_focus() {
    let mut h = Harness::new(WindowLayout::columns(2));
    h.command(PaneCommand::ToggleMaximize);
    assert_eq!(h.layout().cols, vec![0.0, 1.0, 1.0]);

    h.user_focus_group(1);
    assert!(h.reactor.focus_guard().is_fixing_layout());
    assert_eq!(h.reactor.sequences_started(), 1);

    h.advance(ms(1000));
    assert_eq!(h.layout().cols, vec![0.0, 0.0, 1.0]);
    assert_eq!(h.active_group(), 1);
    assert_eq!(h.reactor.snapshots().maximized_group(h.window), Some(1));
    assert!(!h.reactor.focus_guard().is_fixing_layout());

    h.command(PaneCommand::ToggleMaximize);
    assert_eq!(h.layout(), WindowLayout::columns(2));
    assert_eq!(h.active_group(), 1);
}

#[test]
fn shift_pane_focus_switches_maximized_group() {
    let mut h = Harness::new(WindowLayout::columns(3));
    h.command(PaneCommand::ToggleMaximize);

    h.command(PaneCommand::UnshiftPaneFocus);
    h.advance(ms(1000));
    assert_eq!(h.active_group(), 2);
    assert_eq!(h.reactor.snapshots().maximized_group(h.window), Some(2));
    assert!(h.layout().looks_maximized());

    h.command(PaneCommand::ShiftPaneFocus);
    h.advance(ms(1000));
    assert_eq!(h.active_group(), 0);
    assert_eq!(h.reactor.snapshots().maximized_group(h.window), Some(0));
    assert_eq!(h.reactor.sequences_started(), 2);
}

#[test]
fn activation_storm_starts_one_sequence() {
    let mut h = Harness::new(WindowLayout::columns(3));
    h.command(PaneCommand::ToggleMaximize);
    h.user_focus_group(1);
    for group in [2, 0, 1, 2, 1] {
        h.focus_group(group);
        let view = h.view_in_group(group);
        h.reactor.handle_event(Event::ViewActivated(view));
    }
    assert_eq!(h.reactor.sequences_started(), 1);

    h.advance(ms(5000));
    assert!(!h.reactor.focus_guard().is_fixing_layout());
    assert_eq!(h.reactor.sequences_started(), 1);
    assert_eq!(h.reactor.snapshots().maximized_group(h.window), Some(1));
}

#[test]
fn unmaximized_window_ignores_focus() {
    let mut h = Harness::new(WindowLayout::columns(2));
    h.user_focus_group(1);
    h.advance(ms(5000));
    assert_eq!(h.layout(), WindowLayout::columns(2));
    assert_eq!(h.reactor.sequences_started(), 0);
    assert_eq!(h.reactor.pending_tasks(), 0);
}

#[test]
fn file_opened_into_hidden_group_is_cloned_into_maximized_group() {
    let mut h = Harness::new(WindowLayout::columns(2));
    h.reactor.host_mut().load_polls = 2;
    let anchor = h.view_in_group(0);
    h.command(PaneCommand::ToggleMaximize);

    let row = 42;
    let opened = h.reactor.host_mut().open_in_group(h.window, 1, "search_hit.rs", row, 7).unwrap();
    h.reactor.pump();
    assert_eq!(h.reactor.sequences_started(), 1);
    assert!(h.reactor.focus_guard().disable_timeout());

    h.advance(ms(5000));
    let host = h.reactor.host();
    let group0 = host.views_in_group(h.window, 0);
    assert_eq!(group0.len(), 2);
    assert_eq!(group0[0], anchor);
    let clone = group0[1];
    assert_ne!(clone, opened);
    assert_eq!(host.file_name(clone).as_deref(), Some("search_hit.rs"));
    assert_eq!(host.active_view(h.window), Some(clone));
    assert_eq!(host.selection(clone), vec![Region::caret(row * LINE_WIDTH + 7)]);
    assert_eq!(host.caret_moves(clone), 2);
    assert_eq!(host.status(clone, STATUS_KEY), Some("MAXIMIZED"));
    assert_eq!(host.views_in_group(h.window, 1).last(), Some(&opened));

    assert_eq!(h.layout().cols, vec![0.0, 1.0, 1.0]);
    assert_eq!(h.reactor.snapshots().maximized_group(h.window), Some(0));
    assert!(!h.reactor.focus_guard().is_fixing_layout());
    assert!(!h.reactor.focus_guard().disable_timeout());
}

#[test]
fn restore_waits_until_clone_has_loaded() {
    let mut h = Harness::new(WindowLayout::columns(2));
    h.reactor.host_mut().load_polls = 3;
    let anchor = h.view_in_group(0);
    h.command(PaneCommand::ToggleMaximize);
    h.reactor.host_mut().open_in_group(h.window, 1, "slow.rs", 8, 0).unwrap();
    h.reactor.pump();

    // Copying the selection at 350ms starts the restore; the clone answers
    // three polls as loading, so nothing moves before 650ms.
    h.advance(ms(640));
    let group0 = h.reactor.host().views_in_group(h.window, 0);
    assert_eq!(group0.len(), 2);
    assert_eq!(group0[0], anchor);
    let clone = group0[1];
    assert_eq!(h.reactor.host().caret_moves(clone), 0);
    assert!(h.reactor.focus_guard().is_fixing_layout());

    h.advance(ms(10));
    assert_eq!(h.reactor.host().views_in_group(h.window, 0), vec![clone, anchor]);

    h.advance(ms(5000));
    assert_eq!(h.reactor.host().views_in_group(h.window, 0), vec![anchor, clone]);
    assert_eq!(h.reactor.host().caret_moves(clone), 2);
    assert_eq!(h.reactor.host().selection(clone), vec![Region::caret(8 * LINE_WIDTH)]);
    assert!(!h.reactor.focus_guard().is_fixing_layout());
}

#[test]
fn restore_stops_once_watchdog_releases_guard() {
    let mut config = Config::default();
    config.settings.timing.restore_step_delay = ms(1000);
    let mut h = Harness::with_config(WindowLayout::columns(2), config);
    let anchor = h.view_in_group(0);
    h.command(PaneCommand::ToggleMaximize);
    h.reactor.host_mut().open_in_group(h.window, 1, "late.rs", 3, 0).unwrap();
    h.reactor.pump();

    h.advance(ms(3000));
    assert!(!h.reactor.focus_guard().is_fixing_layout());
    assert!(!h.reactor.focus_guard().disable_timeout());

    h.advance(ms(10_000));
    let group0 = h.reactor.host().views_in_group(h.window, 0);
    assert_eq!(group0[0], anchor);
    assert_eq!(h.reactor.host().caret_moves(group0[1]), 0);
    assert_eq!(h.reactor.sequences_started(), 1);
    assert_eq!(h.reactor.pending_tasks(), 0);
}

#[test]
fn without_clone_workaround_opened_file_switches_panes() {
    let mut config = Config::default();
    config.settings.clone_workaround = false;
    let mut h = Harness::with_config(WindowLayout::columns(2), config);
    h.command(PaneCommand::ToggleMaximize);

    let opened = h.reactor.host_mut().open_in_group(h.window, 1, "other.rs", 0, 0).unwrap();
    h.reactor.pump();
    h.advance(ms(5000));

    assert_eq!(h.layout().cols, vec![0.0, 0.0, 1.0]);
    assert_eq!(h.active_group(), 1);
    assert_eq!(h.reactor.host().active_view(h.window), Some(opened));
    assert_eq!(h.reactor.host().views_in_group(h.window, 0).len(), 1);
}

#[test]
fn watchdog_releases_stuck_guard() {
    let mut config = Config::default();
    config.settings.timing.fix_delay = ms(10_000);
    let mut h = Harness::with_config(WindowLayout::columns(2), config);
    h.command(PaneCommand::ToggleMaximize);
    h.user_focus_group(1);
    assert!(h.reactor.focus_guard().is_fixing_layout());

    h.advance(ms(2999));
    assert!(h.reactor.focus_guard().is_fixing_layout());
    h.advance(ms(1));
    assert!(!h.reactor.focus_guard().is_fixing_layout());

    // The late step belongs to the abandoned sequence and must not run.
    h.advance(ms(20_000));
    assert_eq!(h.layout().cols, vec![0.0, 1.0, 1.0]);
    assert_eq!(h.reactor.snapshots().maximized_group(h.window), Some(0));
    assert_eq!(h.reactor.pending_tasks(), 0);
}

#[test]
fn grace_window_expires() {
    let mut h = Harness::new(WindowLayout::columns(2));
    h.reactor.handle_event(Event::WindowCommand(h.window, "jump_back".into()));
    assert!(h.reactor.focus_guard().can_switch_pane());
    h.advance(ms(1999));
    assert!(h.reactor.focus_guard().can_switch_pane());
    h.advance(ms(1));
    assert!(!h.reactor.focus_guard().can_switch_pane());

    h.reactor.handle_event(Event::WindowCommand(h.window, "prompt_select_workspace".into()));
    h.advance(ms(9999));
    assert!(h.reactor.focus_guard().can_switch_pane());
    h.advance(ms(1));
    assert!(!h.reactor.focus_guard().can_switch_pane());

    h.reactor.handle_event(Event::WindowCommand(h.window, "save".into()));
    assert!(!h.reactor.focus_guard().can_switch_pane());
}

#[test]
fn unintended_focus_after_grace_is_cloned_not_switched() {
    let mut h = Harness::new(WindowLayout::columns(2));
    h.command(PaneCommand::ToggleMaximize);
    h.reactor.handle_event(Event::WindowCommand(h.window, "focus_group".into()));
    h.advance(ms(2500));

    h.focus_group(1);
    h.advance(ms(5000));
    assert_eq!(h.reactor.snapshots().maximized_group(h.window), Some(0));
    assert_eq!(h.active_group(), 0);
    assert_eq!(h.reactor.host().views_in_group(h.window, 0).len(), 2);
}

#[test]
fn status_label_follows_maximized_view() {
    let mut h = Harness::new(WindowLayout::columns(2));
    let first = h.view_in_group(0);
    let second = h.view_in_group(1);
    h.command(PaneCommand::ToggleMaximize);
    assert_eq!(h.reactor.host().status(first, STATUS_KEY), Some("MAXIMIZED"));

    h.user_focus_group(1);
    h.advance(ms(1000));
    assert_eq!(h.reactor.host().status(first, STATUS_KEY), None);
    assert_eq!(h.reactor.host().status(second, STATUS_KEY), Some("MAXIMIZED"));

    h.command(PaneCommand::ToggleMaximize);
    assert_eq!(h.reactor.host().status(second, STATUS_KEY), None);
}

#[test]
fn empty_status_label_is_not_shown() {
    let mut config = Config::default();
    config.settings.status_label.clear();
    let mut h = Harness::with_config(WindowLayout::columns(2), config);
    let first = h.view_in_group(0);
    h.command(PaneCommand::ToggleMaximize);
    assert_eq!(h.reactor.host().status(first, STATUS_KEY), None);
}

#[test]
fn closed_window_is_forgotten() {
    let mut h = Harness::new(WindowLayout::columns(2));
    h.command(PaneCommand::ToggleMaximize);
    assert!(h.reactor.snapshots().get(h.window).is_some());

    h.reactor.host_mut().close_window(h.window);
    h.reactor.handle_event(Event::WindowClosed(h.window));
    assert_eq!(h.reactor.snapshots().get(h.window), None);
    assert!(h.reactor.state_data().windows.is_empty());
}

#[test]
fn config_update_takes_effect() {
    let mut h = Harness::new(WindowLayout::columns(2));
    let mut config = Config::default();
    config.intentional_commands.clear();
    h.reactor.handle_event(Event::ConfigUpdated(config));
    h.reactor.handle_event(Event::WindowCommand(h.window, "focus_group".into()));
    assert!(!h.reactor.focus_guard().can_switch_pane());
}

#[test]
fn state_dump_reflects_windows_and_guard() {
    let mut h = Harness::new(WindowLayout::columns(2));
    h.command(PaneCommand::ToggleMaximize);
    h.user_focus_group(1);

    let state = h.reactor.state_data();
    assert!(state.guard.fixing_layout);
    assert!(state.guard.can_switch_pane);
    assert_eq!(state.guard.switch_grace_until, Some(ms(2000)));
    assert_eq!(state.guard.sequences_started, 1);
    assert_eq!(state.windows.len(), 1);
    let window = &state.windows[0];
    assert!(window.is_maximized);
    assert!(window.looks_maximized);
    assert_eq!(window.maximized_group, Some(0));
    assert_eq!(window.active_group, Some(1));
    assert_eq!(window.saved_layout, Some(WindowLayout::columns(2)));

    let json: serde_json::Value = serde_json::from_str(&h.reactor.serialize_state().unwrap()).unwrap();
    assert_eq!(json["guard"]["switch_grace_until"], 2000);
    assert_eq!(json["windows"][0]["layout"]["cols"], serde_json::json!([0.0, 1.0, 1.0]));
}

#[tokio::test(start_paused = true)]
async fn run_loop_fires_timers_in_real_time() {
    let mut h = Harness::new(WindowLayout::columns(2));
    let window = h.window;
    h.command(PaneCommand::ToggleMaximize);
    h.reactor.handle_event(Event::WindowCommand(window, "focus_group".into()));
    h.focus_group(1);

    let (tx, rx) = actor::channel();
    let user = async move {
        tokio::time::sleep(ms(1000)).await;
        tx.send(Event::Command(window, PaneCommand::DistributeLayout));
    };
    let (reactor, ()) = tokio::join!(h.reactor.run(rx), user);
    assert_eq!(reactor.snapshots().maximized_group(window), Some(1));
    assert_eq!(reactor.host().layout(window), Some(WindowLayout::columns(2)));
    assert!(!reactor.focus_guard().is_fixing_layout());
    assert_eq!(reactor.pending_tasks(), 0);
}

#[tokio::test(start_paused = true)]
async fn run_loop_finishes_sequences_after_channel_closes() {
    let mut h = Harness::new(WindowLayout::columns(2));
    let window = h.window;
    h.command(PaneCommand::ToggleMaximize);
    h.user_focus_group(1);
    assert!(h.reactor.focus_guard().is_fixing_layout());

    let (tx, rx) = actor::channel::<Event>();
    drop(tx);
    let reactor = h.reactor.run(rx).await;
    assert!(!reactor.focus_guard().is_fixing_layout());
    assert_eq!(reactor.snapshots().maximized_group(window), Some(1));
    assert_eq!(reactor.pending_tasks(), 0);
}
