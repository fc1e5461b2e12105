//! Layout-relative geometry primitives.
//!
//! All rectangles are expressed in layout coordinates (the compositor's
//! global output space), with integer pixel units. Pointer positions are
//! sub-pixel and use `f64`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// A rectangle with non-positive extent covers no pixels.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let r = Rect::new(x, y, right - x, bottom - y);
        if r.is_degenerate() { None } else { Some(r) }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64
            && px < self.right() as f64
            && py >= self.y as f64
            && py < self.bottom() as f64
    }

    /// Nearest point inside the rectangle to `(px, py)`.
    pub fn constrain(&self, px: f64, py: f64) -> (f64, f64) {
        let max_x = (self.right() - 1).max(self.x) as f64;
        let max_y = (self.bottom() - 1).max(self.y) as f64;
        (px.clamp(self.x as f64, max_x), py.clamp(self.y as f64, max_y))
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// A set of points expressed as a union of rectangles, in the style of a
/// pixman region. An empty region contains no points at all, which is how a
/// fully locked pointer is represented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    pub fn new() -> Self {
        Region { rects: Vec::new() }
    }

    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Region::new();
        region.add(rect);
        region
    }

    /// Degenerate rectangles are dropped rather than stored.
    pub fn add(&mut self, rect: Rect) {
        if !rect.is_degenerate() {
            self.rects.push(rect);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        self.rects.iter().any(|r| r.contains(px, py))
    }

    /// Nearest point inside the region, or `None` if the region is empty.
    pub fn constrain(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        self.rects
            .iter()
            .map(|r| r.constrain(px, py))
            .min_by(|a, b| {
                let da = (a.0 - px).powi(2) + (a.1 - py).powi(2);
                let db = (b.0 - px).powi(2) + (b.1 - py).powi(2);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    pub fn intersect(&self, other: &Region) -> Region {
        let mut out = Region::new();
        for a in &self.rects {
            for b in &other.rects {
                if let Some(r) = a.intersection(b) {
                    out.add(r);
                }
            }
        }
        out
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Region {
        Region {
            rects: self.rects.iter().map(|r| r.translated(dx, dy)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn intersection_clips_to_overlap() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 60, 100, 100);
        assert_eq!(a.intersection(&b), Some(Rect::new(50, 60, 50, 40)));
    }

    #[test]
    fn intersection_of_disjoint_rects_is_none() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 0, 10, 10);
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn constrain_returns_nearest_interior_point() {
        let r = Rect::new(10, 10, 20, 20);
        assert_eq!(r.constrain(0.0, 0.0), (10.0, 10.0));
        assert_eq!(r.constrain(100.0, 15.0), (29.0, 15.0));
        assert_eq!(r.constrain(15.0, 15.0), (15.0, 15.0));
    }

    #[test]
    fn empty_region_contains_nothing() {
        let region = Region::new();
        assert!(!region.contains(0.0, 0.0));
        assert_eq!(region.constrain(0.0, 0.0), None);
    }

    #[test]
    fn region_constrain_picks_closest_rect() {
        let mut region = Region::new();
        region.add(Rect::new(0, 0, 10, 10));
        region.add(Rect::new(100, 0, 10, 10));
        assert_eq!(region.constrain(90.0, 5.0), Some((100.0, 5.0)));
        assert_eq!(region.constrain(20.0, 5.0), Some((9.0, 5.0)));
    }

    #[test]
    fn region_intersect_is_pairwise() {
        let a = Region::from_rect(Rect::new(0, 0, 100, 100));
        let mut b = Region::new();
        b.add(Rect::new(-10, -10, 20, 20));
        b.add(Rect::new(90, 90, 20, 20));
        let out = a.intersect(&b);
        assert_eq!(out.rects(), &[Rect::new(0, 0, 10, 10), Rect::new(90, 90, 10, 10)]);
    }

    #[test]
    fn degenerate_rects_are_not_added() {
        let mut region = Region::new();
        region.add(Rect::new(0, 0, 0, 10));
        region.add(Rect::new(0, 0, 10, -5));
        assert!(region.is_empty());
    }
}
