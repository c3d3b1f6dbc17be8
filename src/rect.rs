#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge, widened so rectangles near `i32::MAX` do not wrap.
    #[inline]
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    #[inline]
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// True when every point of `other` lies inside or on the edge of `self`.
    #[inline]
    pub fn contains(&self, other: &Rect) -> bool {
        self.x <= other.x
            && other.right() <= self.right()
            && self.y <= other.y
            && other.bottom() <= self.bottom()
    }

    /// True when the two rectangles overlap or share an edge.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        other.x as i64 <= self.right()
            && other.right() >= self.x as i64
            && other.y as i64 <= self.bottom()
            && other.bottom() >= self.y as i64
    }

    /// The four quadrants in top-left, top-right, bottom-left, bottom-right
    /// order. Halves are truncated, so odd sizes leave a one unit strip on the
    /// right and bottom that no quadrant covers.
    pub fn quadrants(&self) -> [Rect; 4] {
        let hw = self.width / 2;
        let hh = self.height / 2;
        [
            Rect::new(self.x, self.y, hw, hh),
            Rect::new(self.x.saturating_add(hw), self.y, hw, hh),
            Rect::new(self.x, self.y.saturating_add(hh), hw, hh),
            Rect::new(self.x.saturating_add(hw), self.y.saturating_add(hh), hw, hh),
        ]
    }
}

/// Anything the tree can store: it only ever looks at the rectangle.
pub trait Bounded {
    fn rect(&self) -> Rect;
}

impl Bounded for Rect {
    fn rect(&self) -> Rect {
        *self
    }
}

impl<T: Bounded + ?Sized> Bounded for &T {
    fn rect(&self) -> Rect {
        (**self).rect()
    }
}
