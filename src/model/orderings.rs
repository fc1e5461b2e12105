//! The three global surface orderings.
//!
//! Tiling order feeds the layouts and the rotate/zoom commands; focus-recency
//! order picks fallback focus targets; z-order is the stacking the compositor
//! renders. They are independent sequences over the same arena, mutated only
//! through the explicit operations here.

use crate::model::surface::SurfaceId;

#[derive(Debug, Default)]
pub struct Orderings {
    /// Insertion-ordered; head is the master position.
    tiling: Vec<SurfaceId>,
    /// Most-recently-focused first.
    focus: Vec<SurfaceId>,
    /// Front-to-back stacking.
    z: Vec<SurfaceId>,
}

impl Orderings {
    /// Register a newly mapped surface: appended to tiling order, raised to
    /// the front of z-order. Focus order is only entered via
    /// [`Orderings::promote_focus`].
    pub fn insert(&mut self, id: SurfaceId) {
        debug_assert!(!self.tiling.contains(&id));
        self.tiling.push(id);
        self.z.insert(0, id);
    }

    pub fn remove(&mut self, id: SurfaceId) {
        self.tiling.retain(|&s| s != id);
        self.focus.retain(|&s| s != id);
        self.z.retain(|&s| s != id);
    }

    pub fn tiling(&self) -> &[SurfaceId] {
        &self.tiling
    }

    pub fn focus(&self) -> &[SurfaceId] {
        &self.focus
    }

    pub fn z_front_to_back(&self) -> &[SurfaceId] {
        &self.z
    }

    /// Move to the front of focus-recency order, inserting if absent.
    pub fn promote_focus(&mut self, id: SurfaceId) {
        self.focus.retain(|&s| s != id);
        self.focus.insert(0, id);
    }

    /// Raise to the top of z-order without touching the other orderings.
    pub fn raise(&mut self, id: SurfaceId) {
        self.z.retain(|&s| s != id);
        self.z.insert(0, id);
    }

    pub fn lower(&mut self, id: SurfaceId) {
        self.z.retain(|&s| s != id);
        self.z.push(id);
    }

    /// Move a surface to the head of tiling order (the master slot).
    pub fn promote_tiling(&mut self, id: SurfaceId) {
        self.tiling.retain(|&s| s != id);
        self.tiling.insert(0, id);
    }

    /// Rotate the given subset of surfaces by one position within their own
    /// tiling-order slots, leaving every other surface in place. `eligible`
    /// must be a subsequence of tiling order.
    pub fn rotate_tiling(&mut self, eligible: &[SurfaceId], backwards: bool) {
        if eligible.len() < 2 {
            return;
        }
        let slots: Vec<usize> = self
            .tiling
            .iter()
            .enumerate()
            .filter(|(_, id)| eligible.contains(id))
            .map(|(i, _)| i)
            .collect();
        let mut rotated: Vec<SurfaceId> = slots.iter().map(|&i| self.tiling[i]).collect();
        if backwards {
            rotated.rotate_right(1);
        } else {
            rotated.rotate_left(1);
        }
        for (slot, id) in slots.into_iter().zip(rotated) {
            self.tiling[slot] = id;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use slotmap::SlotMap;

    use super::*;

    fn ids(n: usize) -> Vec<SurfaceId> {
        let mut arena: SlotMap<SurfaceId, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    #[test]
    fn raise_does_not_disturb_tiling_or_focus() {
        let ids = ids(3);
        let mut o = Orderings::default();
        for &id in &ids {
            o.insert(id);
            o.promote_focus(id);
        }
        let tiling_before = o.tiling().to_vec();
        let focus_before = o.focus().to_vec();
        o.raise(ids[0]);
        assert_eq!(o.z_front_to_back()[0], ids[0]);
        assert_eq!(o.tiling(), &tiling_before[..]);
        assert_eq!(o.focus(), &focus_before[..]);
    }

    #[test]
    fn promote_focus_moves_to_front() {
        let ids = ids(3);
        let mut o = Orderings::default();
        for &id in &ids {
            o.insert(id);
            o.promote_focus(id);
        }
        assert_eq!(o.focus(), &[ids[2], ids[1], ids[0]]);
        o.promote_focus(ids[0]);
        assert_eq!(o.focus(), &[ids[0], ids[2], ids[1]]);
    }

    #[test]
    fn rotate_skips_ineligible_slots() {
        let ids = ids(4);
        let mut o = Orderings::default();
        for &id in &ids {
            o.insert(id);
        }
        // Leave ids[1] out of the rotation; it must keep its slot.
        let eligible = vec![ids[0], ids[2], ids[3]];
        o.rotate_tiling(&eligible, false);
        assert_eq!(o.tiling(), &[ids[2], ids[1], ids[3], ids[0]]);
        o.rotate_tiling(&eligible, true);
        assert_eq!(o.tiling(), &[ids[0], ids[1], ids[2], ids[3]]);
    }

    #[test]
    fn rotate_of_single_surface_is_a_noop() {
        let ids = ids(2);
        let mut o = Orderings::default();
        for &id in &ids {
            o.insert(id);
        }
        o.rotate_tiling(&ids[..1], false);
        assert_eq!(o.tiling(), &ids[..]);
    }

    #[test]
    fn remove_clears_all_orderings() {
        let ids = ids(2);
        let mut o = Orderings::default();
        for &id in &ids {
            o.insert(id);
            o.promote_focus(id);
        }
        o.remove(ids[0]);
        assert_eq!(o.tiling(), &[ids[1]]);
        assert_eq!(o.focus(), &[ids[1]]);
        assert_eq!(o.z_front_to_back(), &[ids[1]]);
    }
}
