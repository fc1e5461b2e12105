//! Pointer constraint objects.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::model::surface::SurfaceId;
use crate::sys::geometry::Region;

new_key_type! {
    pub struct ConstraintId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintMode {
    /// Pointer does not move on screen at all; only relative deltas reach
    /// the surface.
    Locked,
    /// Pointer moves freely inside the region and is clamped at its edge.
    Confined,
}

/// A region a surface asked the pointer to be held within while focused.
/// At most one constraint is active globally at any time.
#[derive(Debug, Clone)]
pub struct PointerConstraint {
    pub surface: SurfaceId,
    pub mode: ConstraintMode,
    /// Declared region in surface-local coordinates; empty means "use the
    /// surface's input region".
    pub declared: Region,
    /// Surface-local position to warp to when the constraint deactivates.
    pub cursor_hint: Option<(f64, f64)>,
    pub active: bool,
}

impl PointerConstraint {
    pub fn new(surface: SurfaceId, mode: ConstraintMode, declared: Region) -> Self {
        PointerConstraint {
            surface,
            mode,
            declared,
            cursor_hint: None,
            active: false,
        }
    }
}
