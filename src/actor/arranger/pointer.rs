//! Pointer motion and constraint enforcement.
//!
//! At most one constraint is active at a time, always the one belonging to
//! the keyboard-focused surface. Lock mode pins the on-screen cursor in
//! place; confine mode clamps it to the constraint region. Regions are
//! declared surface-local and evaluated in layout coordinates against the
//! surface's content box.

use tracing::{debug, trace};

use crate::model::constraint::{ConstraintId, ConstraintMode};
use crate::sys::compositor::Compositor;
use crate::sys::geometry::{Rect, Region};
use crate::sys::seat::Seat;

use super::Arranger;

impl<C: Compositor, S: Seat> Arranger<C, S> {
    /// Relative pointer motion from the seat.
    pub(crate) fn pointer_motion(&mut self, dx: f64, dy: f64) {
        self.seat.notify_activity();
        let (px, py) = self.seat.pointer_position();
        let proposed = (px + dx, py + dy);
        let Some(cid) = self.active_constraint else {
            self.seat.warp_pointer(proposed.0, proposed.1);
            return;
        };
        let Some(constraint) = self.constraints.get(cid) else {
            self.active_constraint = None;
            self.seat.warp_pointer(proposed.0, proposed.1);
            return;
        };
        match constraint.mode {
            // the cursor does not move; the surface still receives the
            // relative delta from the runtime
            ConstraintMode::Locked => {}
            ConstraintMode::Confined => {
                let region = self
                    .constraint_region(cid)
                    .filter(|r| !r.is_empty())
                    .or_else(|| self.constraint_fallback_region(cid));
                let Some(region) = region else {
                    return;
                };
                let (nx, ny) = if region.contains(proposed.0, proposed.1) {
                    proposed
                } else {
                    match region.constrain(proposed.0, proposed.1) {
                        Some(p) => p,
                        None => (px, py),
                    }
                };
                self.seat.warp_pointer(nx, ny);
            }
        }
    }

    /// The constraint's region in layout coordinates: the declared region
    /// intersected with the surface's input region, or the input region
    /// alone when nothing was declared.
    fn constraint_region(&self, cid: ConstraintId) -> Option<Region> {
        let c = self.constraints.get(cid)?;
        let s = self.surfaces.get(c.surface)?;
        let bw = s.border_width;
        let (ox, oy) = (s.geom.x + bw, s.geom.y + bw);
        let base = s.effective_input_region().translated(ox, oy);
        let region = if c.declared.is_empty() {
            base
        } else {
            c.declared.translated(ox, oy).intersect(&base)
        };
        Some(region)
    }

    /// When the effective region degenerates to nothing, a confined pointer
    /// falls back to the surface's content box.
    fn constraint_fallback_region(&self, cid: ConstraintId) -> Option<Region> {
        let c = self.constraints.get(cid)?;
        let s = self.surfaces.get(c.surface)?;
        let bw = s.border_width;
        Some(Region::from_rect(Rect::new(
            s.geom.x + bw,
            s.geom.y + bw,
            s.geom.width - 2 * bw,
            s.geom.height - 2 * bw,
        )))
    }

    /// Re-bind the active constraint to the keyboard-focused surface.
    pub(crate) fn update_constraint_focus(&mut self) {
        let focused = match self.seat.keyboard_focus() {
            crate::sys::seat::KeyboardFocus::Surface(s) => Some(s),
            _ => None,
        };
        let candidate = focused.and_then(|sid| {
            self.constraints
                .iter()
                .find(|(_, c)| c.surface == sid)
                .map(|(id, _)| id)
        });
        if self.active_constraint == candidate {
            return;
        }
        if let Some(old) = self.active_constraint {
            self.deactivate_constraint(old, true);
        }
        if let Some(cid) = candidate {
            if let Some(c) = self.constraints.get_mut(cid) {
                c.active = true;
            }
            self.active_constraint = Some(cid);
            debug!(?cid, "pointer constraint activated");
            self.compositor.set_constraint_active(cid, true);
            // the pull-in warp waits for the surface's next commit, so the
            // client sees its acked geometry before the cursor jumps
        }
    }

    /// Deactivate a constraint, optionally warping to its cursor hint so the
    /// visible cursor reappears where the client last drew its own.
    pub(crate) fn deactivate_constraint(&mut self, cid: ConstraintId, warp_to_hint: bool) {
        let Some(c) = self.constraints.get_mut(cid) else {
            if self.active_constraint == Some(cid) {
                self.active_constraint = None;
            }
            return;
        };
        let was_active = c.active;
        c.active = false;
        let hint = c.cursor_hint;
        let surface = c.surface;
        if self.active_constraint == Some(cid) {
            self.active_constraint = None;
        }
        if !was_active {
            return;
        }
        debug!(?cid, "pointer constraint deactivated");
        self.compositor.set_constraint_active(cid, false);
        if warp_to_hint
            && let Some((hx, hy)) = hint
            && let Some(s) = self.surfaces.get(surface)
        {
            let bw = s.border_width;
            let (lx, ly) = ((s.geom.x + bw) as f64 + hx, (s.geom.y + bw) as f64 + hy);
            self.seat.warp_pointer(lx, ly);
            self.seat.notify_pointer_warp(surface, hx, hy);
        }
    }

    /// Pull the cursor inside the active constraint's region if geometry or
    /// region changes left it outside.
    pub(crate) fn check_constraint_region(&mut self) {
        let Some(cid) = self.active_constraint else {
            return;
        };
        let Some(region) = self.constraint_region(cid).filter(|r| !r.is_empty()) else {
            return;
        };
        let (px, py) = self.seat.pointer_position();
        if region.contains(px, py) {
            return;
        }
        if let Some((nx, ny)) = region.constrain(px, py) {
            trace!(from = ?(px, py), to = ?(nx, ny), "cursor pulled into constraint region");
            self.seat.warp_pointer_closest(nx, ny);
        }
    }

    pub(crate) fn handle_constraint_destroyed(&mut self, cid: ConstraintId) {
        self.deactivate_constraint(cid, true);
        self.constraints.remove(cid);
    }

    pub(crate) fn handle_constraint_region_set(&mut self, cid: ConstraintId, region: Region) {
        let Some(c) = self.constraints.get_mut(cid) else {
            return;
        };
        c.declared = region;
        if self.active_constraint == Some(cid) {
            self.check_constraint_region();
        }
    }

    pub(crate) fn handle_cursor_hint(&mut self, cid: ConstraintId, x: f64, y: f64) {
        if let Some(c) = self.constraints.get_mut(cid) {
            c.cursor_hint = Some((x, y));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::actor::arranger::{Arranger, Event};
    use crate::common::config::Config;
    use crate::model::constraint::ConstraintMode;
    use crate::model::surface::{SurfaceDesc, SurfaceId, SurfaceKind};
    use crate::sys::compositor::{CompositorRequest, RecordingCompositor};
    use crate::sys::geometry::{Rect, Region};
    use crate::sys::seat::{RecordingSeat, SeatRequest};

    type TestArranger = Arranger<RecordingCompositor, RecordingSeat>;

    fn engine_with_surface() -> (TestArranger, SurfaceId) {
        let config = Config {
            bar_height: 0,
            border_width: 0,
            ..Config::default()
        };
        let mut a = Arranger::new(config, RecordingCompositor::new(), RecordingSeat::new());
        a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let id = a.create_surface(SurfaceDesc {
            kind: SurfaceKind::Toplevel,
            app_id: "game".into(),
            title: "game".into(),
            geom: Rect::new(0, 0, 400, 300),
        });
        a.dispatch(Event::SurfaceMapped(id));
        (a, id)
    }

    #[test]
    fn locked_constraint_rejects_all_motion() {
        let (mut a, id) = engine_with_surface();
        a.seat.position = (100.0, 100.0);
        a.create_constraint(id, ConstraintMode::Locked, Region::new())
            .expect("constraint");
        a.seat.clear();
        a.dispatch(Event::PointerMotion { dx: 50.0, dy: -20.0 });
        assert_eq!(a.seat.position, (100.0, 100.0));
        assert!(a.seat.requests.is_empty());
    }

    #[test]
    fn confined_constraint_clamps_to_the_region() {
        let (mut a, id) = engine_with_surface();
        // the surface tiles to the full usable area (1200x800)
        a.seat.position = (600.0, 400.0);
        let mut region = Region::new();
        region.add(Rect::new(0, 0, 200, 200));
        a.create_constraint(id, ConstraintMode::Confined, region)
            .expect("constraint");
        a.dispatch(Event::PointerMotion { dx: 1000.0, dy: 0.0 });
        // clamped to the region's right edge, not the proposed position
        assert!(a.seat.position.0 <= 200.0);
        a.dispatch(Event::PointerMotion { dx: -5.0, dy: -5.0 });
        let inside = a.seat.position;
        assert!(inside.0 < 200.0 && inside.1 < 200.0);
    }

    #[test]
    fn activation_warp_waits_for_the_next_commit() {
        let (mut a, id) = engine_with_surface();
        a.seat.position = (1100.0, 700.0);
        let mut region = Region::new();
        region.add(Rect::new(0, 0, 100, 100));
        a.create_constraint(id, ConstraintMode::Confined, region)
            .expect("constraint");
        // no warp until the surface commits
        assert_eq!(a.seat.position, (1100.0, 700.0));
        a.dispatch(Event::SurfaceCommitted {
            surface: id,
            size: (1200, 800),
            ack: None,
        });
        assert!(a
            .seat
            .requests
            .iter()
            .any(|r| matches!(r, SeatRequest::WarpPointerClosest(_, _))));
        assert!(a.seat.position.0 <= 100.0 && a.seat.position.1 <= 100.0);
    }

    #[test]
    fn losing_focus_deactivates_and_warps_to_the_hint() {
        let (mut a, id) = engine_with_surface();
        let cid = a
            .create_constraint(id, ConstraintMode::Locked, Region::new())
            .expect("constraint");
        a.dispatch(Event::CursorHintSet(cid, 10.0, 20.0));
        assert!(a.constraints[cid].active);
        a.focus(None, false);
        assert!(!a.constraints[cid].active);
        assert_eq!(a.seat.position, (10.0, 20.0));
        assert!(a
            .seat
            .requests
            .contains(&SeatRequest::NotifyPointerWarp(id, 10.0, 20.0)));
        assert!(a
            .compositor
            .requests
            .contains(&CompositorRequest::SetConstraintActive(cid, false)));
    }

    #[test]
    fn destroyed_constraint_frees_the_pointer() {
        let (mut a, id) = engine_with_surface();
        let cid = a
            .create_constraint(id, ConstraintMode::Locked, Region::new())
            .expect("constraint");
        a.seat.position = (50.0, 50.0);
        a.dispatch(Event::ConstraintDestroyed(cid));
        a.dispatch(Event::PointerMotion { dx: 10.0, dy: 10.0 });
        assert_eq!(a.seat.position, (60.0, 60.0));
        assert!(a.constraints.get(cid).is_none());
    }

    #[test]
    fn region_shrink_pulls_the_cursor_back_in() {
        let (mut a, id) = engine_with_surface();
        a.seat.position = (500.0, 400.0);
        let cid = a
            .create_constraint(id, ConstraintMode::Confined, Region::new())
            .expect("constraint");
        let mut small = Region::new();
        small.add(Rect::new(0, 0, 50, 50));
        a.dispatch(Event::ConstraintRegionSet(cid, small));
        assert!(a.seat.position.0 <= 50.0 && a.seat.position.1 <= 50.0);
    }
}
