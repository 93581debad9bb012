mod direction;
mod grid;

pub use direction::FocusDirection;
pub use grid::{Cell, LayoutError, WindowLayout, distribute};
