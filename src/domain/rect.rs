/// Axis-aligned rectangle in world units.
///
/// World space is the 800×600 play field: x grows right, y grows down.
/// Platforms, traps and the goal are placed once; the player's box is
/// moved every tick through the edge setters.

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> f32 { self.x }
    #[inline]
    pub fn right(&self) -> f32 { self.x + self.w }
    #[inline]
    pub fn top(&self) -> f32 { self.y }
    #[inline]
    pub fn bottom(&self) -> f32 { self.y + self.h }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    // ── Edge setters: move the box, never resize it ──

    pub fn set_left(&mut self, v: f32) { self.x = v; }
    pub fn set_right(&mut self, v: f32) { self.x = v - self.w; }
    pub fn set_top(&mut self, v: f32) { self.y = v; }
    pub fn set_bottom(&mut self, v: f32) { self.y = v - self.h; }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Strict overlap test. Rectangles that only share an edge do not
    /// overlap, and an empty rectangle overlaps nothing.
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}
