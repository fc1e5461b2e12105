//! Master-stack placement.
//!
//! The first `nmaster` surfaces in tiling order share the master area; the
//! rest share the stack. Extents along the split axis use successive integer
//! division, so rounding remainders are absorbed by later slots and the
//! region is always partitioned exactly.

use super::{LayoutParams, Orientation};
use crate::sys::geometry::Rect;

pub fn place(params: &LayoutParams, n: usize) -> Vec<Rect> {
    match params.orientation {
        Orientation::Horizontal => place_horizontal(params, n as i32),
        Orientation::Vertical => place_vertical(params, n as i32),
    }
}

fn place_horizontal(params: &LayoutParams, n: i32) -> Vec<Rect> {
    let usable = params.usable;
    let nmaster = params.nmaster as i32;
    let gap = params.gap;
    let master_width = if n > nmaster {
        if nmaster > 0 {
            (usable.width as f32 * params.mfact) as i32
        } else {
            0
        }
    } else {
        usable.width
    };

    let mut rects = Vec::with_capacity(n as usize);
    let mut master_off = 0;
    let mut stack_off = 0;
    for i in 0..n {
        if i < nmaster {
            let h = (usable.height - master_off) / (n.min(nmaster) - i);
            rects.push(Rect::new(
                usable.x + gap,
                usable.y + master_off + gap,
                master_width - 2 * gap,
                h - 2 * gap,
            ));
            master_off += h;
        } else {
            let h = (usable.height - stack_off) / (n - i);
            rects.push(Rect::new(
                usable.x + master_width + gap,
                usable.y + stack_off + gap,
                usable.width - master_width - 2 * gap,
                h - 2 * gap,
            ));
            stack_off += h;
        }
    }
    rects
}

fn place_vertical(params: &LayoutParams, n: i32) -> Vec<Rect> {
    let usable = params.usable;
    let nmaster = params.nmaster as i32;
    let gap = params.gap;
    let master_height = if n > nmaster {
        if nmaster > 0 {
            (usable.height as f32 * params.mfact) as i32
        } else {
            0
        }
    } else {
        usable.height
    };

    let mut rects = Vec::with_capacity(n as usize);
    let mut master_off = 0;
    let mut stack_off = 0;
    for i in 0..n {
        if i < nmaster {
            let w = (usable.width - master_off) / (n.min(nmaster) - i);
            rects.push(Rect::new(
                usable.x + master_off + gap,
                usable.y + gap,
                w - 2 * gap,
                master_height - 2 * gap,
            ));
            master_off += w;
        } else {
            let w = (usable.width - stack_off) / (n - i);
            rects.push(Rect::new(
                usable.x + stack_off + gap,
                usable.y + master_height + gap,
                w - 2 * gap,
                usable.height - master_height - 2 * gap,
            ));
            stack_off += w;
        }
    }
    rects
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn params(mfact: f32, nmaster: u32, orientation: Orientation, gap: i32) -> LayoutParams {
        LayoutParams {
            usable: Rect::new(0, 0, 1200, 800),
            mfact,
            nmaster,
            orientation,
            gap,
        }
    }

    #[test]
    fn one_master_two_stack_splits_at_mfact() {
        let p = params(0.6, 1, Orientation::Horizontal, 0);
        let rects = place(&p, 3);
        assert_eq!(rects[0], Rect::new(0, 0, 720, 800));
        assert_eq!(rects[1], Rect::new(720, 0, 480, 400));
        assert_eq!(rects[2], Rect::new(720, 400, 480, 400));
    }

    #[test]
    fn master_takes_full_area_when_no_stack() {
        let p = params(0.6, 2, Orientation::Horizontal, 0);
        let rects = place(&p, 2);
        assert_eq!(rects[0], Rect::new(0, 0, 1200, 400));
        assert_eq!(rects[1], Rect::new(0, 400, 1200, 400));
    }

    #[test]
    fn zero_nmaster_gives_everything_to_the_stack() {
        let p = params(0.6, 0, Orientation::Horizontal, 0);
        let rects = place(&p, 2);
        assert_eq!(rects[0], Rect::new(0, 0, 1200, 400));
        assert_eq!(rects[1], Rect::new(0, 400, 1200, 400));
    }

    #[test]
    fn split_axis_extents_partition_each_region() {
        let p = params(0.55, 2, Orientation::Horizontal, 0);
        let rects = place(&p, 7);
        let master_total: i32 = rects[..2].iter().map(|r| r.height).sum();
        let stack_total: i32 = rects[2..].iter().map(|r| r.height).sum();
        assert_eq!(master_total, 800);
        assert_eq!(stack_total, 800);
        // Rectangles in a region are contiguous and non-overlapping.
        for pair in rects[2..].windows(2) {
            assert_eq!(pair[0].bottom(), pair[1].y);
        }
    }

    #[test]
    fn odd_extents_are_absorbed_by_successive_division() {
        let p = LayoutParams {
            usable: Rect::new(0, 0, 1200, 799),
            mfact: 0.5,
            nmaster: 0,
            orientation: Orientation::Horizontal,
            gap: 0,
        };
        let rects = place(&p, 3);
        let total: i32 = rects.iter().map(|r| r.height).sum();
        assert_eq!(total, 799);
        assert_eq!(rects.iter().map(|r| r.height).collect::<Vec<_>>(), vec![266, 266, 267]);
    }

    #[test]
    fn vertical_orientation_is_the_transpose() {
        let p = params(0.6, 1, Orientation::Vertical, 0);
        let rects = place(&p, 3);
        assert_eq!(rects[0], Rect::new(0, 0, 1200, 480));
        assert_eq!(rects[1], Rect::new(0, 480, 600, 320));
        assert_eq!(rects[2], Rect::new(600, 480, 600, 320));
    }

    #[test]
    fn gap_insets_every_rectangle() {
        let p = params(0.5, 1, Orientation::Horizontal, 10);
        let rects = place(&p, 2);
        assert_eq!(rects[0], Rect::new(10, 10, 580, 780));
        assert_eq!(rects[1], Rect::new(610, 10, 580, 780));
    }
}
