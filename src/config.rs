#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How many entities a leaf stores before it splits.
pub const DEFAULT_SUBDIVIDE_THRESHOLD: usize = 3;

/// Construction-time tuning for a [`Quadtree`](crate::Quadtree).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct QuadtreeConfig {
    /// A leaf holding more than this many entities subdivides. The limit is
    /// soft: a node splits once, and entities that fit no quadrant keep piling
    /// up at it afterwards.
    pub subdivide_threshold: usize,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            subdivide_threshold: DEFAULT_SUBDIVIDE_THRESHOLD,
        }
    }
}

impl QuadtreeConfig {
    pub fn with_subdivide_threshold(mut self, threshold: usize) -> Self {
        self.subdivide_threshold = threshold;
        self
    }
}
