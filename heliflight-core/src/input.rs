use serde::{Deserialize, Serialize};

/// Keys held during the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub ascend: bool,
    pub left: bool,
    pub right: bool,
    pub descend: bool,
}

impl InputSnapshot {
    pub const NONE: InputSnapshot = InputSnapshot {
        ascend: false,
        left: false,
        right: false,
        descend: false,
    };

    pub fn ascend() -> Self {
        Self {
            ascend: true,
            ..Self::NONE
        }
    }

    pub fn descend() -> Self {
        Self {
            descend: true,
            ..Self::NONE
        }
    }

    pub fn with_right(mut self) -> Self {
        self.right = true;
        self
    }

    pub fn with_left(mut self) -> Self {
        self.left = true;
        self
    }

    /// -1 for left, 1 for right, 0 when neither or both are held.
    pub fn horizontal_direction(&self) -> i8 {
        match (self.left, self.right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}
