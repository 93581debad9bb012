//! Pane maximization for grid-split editor windows.
//!
//! The [`actor::reactor::Reactor`] owns every piece of mutable state: the
//! per-window [`model::snapshot_store::PaneSnapshotStore`], the focus guard and
//! the timer queue that sequences deferred corrective steps. The editor itself
//! is reached only through the [`sys::host::Host`] trait.

pub mod actor;
pub mod common;
pub mod layout_engine;
pub mod model;
pub mod sys;
