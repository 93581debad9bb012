pub mod server;
pub mod snapshot_store;
pub use snapshot_store::{PaneSnapshot, PaneSnapshotStore};
