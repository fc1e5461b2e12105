//! Per-monitor arrangement state.

use slotmap::new_key_type;

use crate::layout_engine::{Layout, Orientation};
use crate::model::tags::TagMask;
use crate::sys::geometry::Rect;

new_key_type! {
    pub struct MonitorId;
}

/// One output known to the engine. `area` is the full layout-relative output
/// extent; `usable` is what remains after the status-bar strip and panel
/// exclusive zones are carved out.
#[derive(Debug, Clone)]
pub struct Monitor {
    pub name: String,
    pub enabled: bool,
    pub area: Rect,
    pub usable: Rect,
    /// Current and previous tag selection; `seltags` indexes the live one.
    pub tagset: [TagMask; 2],
    pub seltags: usize,
    /// Active layout slot pair, switched by `sellt`.
    pub layouts: [Layout; 2],
    pub sellt: usize,
    pub mfact: f32,
    pub nmaster: u32,
    pub orientation: Orientation,
    /// Something on this monitor moved since the last frame; suppresses one
    /// scene commit so clients can catch up with their resize requests.
    pub moved: bool,
}

impl Monitor {
    pub fn new(
        name: String,
        area: Rect,
        tag_count: u32,
        mfact: f32,
        nmaster: u32,
        orientation: Orientation,
    ) -> Self {
        Monitor {
            name,
            enabled: true,
            area,
            usable: area,
            tagset: [TagMask::single(0); 2],
            seltags: 0,
            layouts: [Layout::MasterStack, Layout::Monocle],
            sellt: 0,
            mfact,
            nmaster,
            orientation,
            moved: false,
        }
        .with_valid_tags(tag_count)
    }

    fn with_valid_tags(mut self, tag_count: u32) -> Self {
        let valid = TagMask::all(tag_count);
        for set in &mut self.tagset {
            *set = set.clamped(valid);
        }
        self
    }

    pub fn tags(&self) -> TagMask {
        self.tagset[self.seltags]
    }

    pub fn layout(&self) -> Layout {
        self.layouts[self.sellt]
    }

    /// Switch the visible tagset. Flips to the previous-selection slot and,
    /// when `tags` is non-empty, overwrites it. Returns false when the
    /// request equals the current view.
    pub fn view(&mut self, tags: TagMask) -> bool {
        if tags == self.tags() {
            return false;
        }
        self.seltags ^= 1;
        if !tags.is_empty() {
            self.tagset[self.seltags] = tags;
        }
        true
    }

    /// XOR tags into the visible tagset; refuses to empty the view.
    pub fn toggle_view(&mut self, tags: TagMask) -> bool {
        let next = self.tags().toggle(tags);
        if next.is_empty() {
            return false;
        }
        self.tagset[self.seltags] = next;
        true
    }

    /// Adjust or set the master-area factor. Arguments below 1.0 are deltas;
    /// 1.0 and above set the factor to `arg - 1.0`. Results outside
    /// [0.1, 0.9] leave the factor unchanged.
    pub fn set_master_factor(&mut self, arg: f32) -> bool {
        let f = if arg < 1.0 { arg + self.mfact } else { arg - 1.0 };
        if !(0.1..=0.9).contains(&f) {
            return false;
        }
        self.mfact = f;
        true
    }

    pub fn adjust_nmaster(&mut self, delta: i32) {
        self.nmaster = (self.nmaster as i32 + delta).max(0) as u32;
    }
}
