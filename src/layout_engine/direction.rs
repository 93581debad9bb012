use serde::{Deserialize, Serialize};

/// Direction for cycling focus through a window's groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusDirection {
    Next,
    Prev,
}

impl FocusDirection {
    /// The group after (or before) `i` among `len` groups, wrapping around.
    pub fn step(self, i: usize, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        match self {
            FocusDirection::Next => (i + 1) % len,
            FocusDirection::Prev => (i + len - 1) % len,
        }
    }
}
