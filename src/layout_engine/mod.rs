//! Tiling layout computation.
//!
//! Layouts are pure functions from a usable area and per-monitor tiling
//! parameters to one rectangle per tiled surface, in tiling order. Running a
//! layout twice with the same inputs yields the same rectangles; all
//! statefulness (orderings, flags, pending resizes) lives in the arranger.

pub mod master_stack;
pub mod monocle;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::sys::geometry::Rect;

/// Direction of the master/stack split. Horizontal puts the master column on
/// the left; vertical is the transposed case with the master row on top.
/// This is a per-monitor property, not a per-layout one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    #[strum(serialize = "[]=")]
    MasterStack,
    #[strum(serialize = "[M]")]
    Monocle,
}

/// Inputs for one tiling pass over a single monitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub usable: Rect,
    pub mfact: f32,
    pub nmaster: u32,
    pub orientation: Orientation,
    pub gap: i32,
}

/// Compute rectangles for `n` tiled surfaces under the given layout. The
/// result has exactly `n` entries, matched positionally against the visible
/// tiled surfaces in tiling order.
pub fn compute_layout(layout: Layout, params: &LayoutParams, n: usize) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    match layout {
        Layout::MasterStack => master_stack::place(params, n),
        Layout::Monocle => monocle::place(params, n),
    }
}
