//! Monocle placement: every tiled surface gets the full usable area. The
//! topmost visible surface wins on screen; stacking is the arranger's job.

use super::LayoutParams;
use crate::sys::geometry::Rect;

pub fn place(params: &LayoutParams, n: usize) -> Vec<Rect> {
    vec![params.usable; n]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::Orientation;

    #[test]
    fn every_surface_covers_the_usable_area() {
        let params = LayoutParams {
            usable: Rect::new(5, 30, 1270, 670),
            mfact: 0.55,
            nmaster: 1,
            orientation: Orientation::Horizontal,
            gap: 8,
        };
        let rects = place(&params, 3);
        assert_eq!(rects, vec![params.usable; 3]);
    }
}
