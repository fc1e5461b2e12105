//! Managed surface records.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::model::monitor::{Monitor, MonitorId};
use crate::model::tags::TagMask;
use crate::sys::compositor::Serial;
use crate::sys::geometry::{Rect, Region};

new_key_type! {
    pub struct SurfaceId;
}

/// What protocol family a surface arrived through. Shared state lives in
/// [`ManagedSurface`]; the kind only changes capability dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// A toplevel of the primary shell protocol.
    Toplevel,
    /// A legacy-compatibility window the engine manages like a toplevel.
    LegacyManaged,
    /// A legacy override-redirect window: positioned by the client, never
    /// tiled, never keyboard-focused by the engine.
    LegacyUnmanaged,
}

impl SurfaceKind {
    pub fn is_unmanaged(self) -> bool {
        matches!(self, SurfaceKind::LegacyUnmanaged)
    }

    pub fn accepts_focus(self) -> bool {
        !self.is_unmanaged()
    }
}

/// Outstanding resize request issued to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingResize {
    serial: Serial,
    size: (i32, i32),
}

/// Correlation state for asynchronous resizes. A surface is settled when no
/// request is outstanding; acknowledgments for superseded serials are stale
/// and discarded.
#[derive(Debug, Clone, Default)]
pub struct ResizeState {
    pending: Option<PendingResize>,
    last_acked: Option<Serial>,
}

impl ResizeState {
    pub fn issue(&mut self, serial: Serial, size: (i32, i32)) {
        self.pending = Some(PendingResize { serial, size });
    }

    pub fn settled(&self) -> bool {
        self.pending.is_none()
    }

    /// Returns true if the acknowledgment settled the surface; stale serials
    /// return false and change nothing.
    pub fn ack(&mut self, serial: Serial) -> bool {
        match self.pending {
            Some(p) if p.serial == serial => {
                self.pending = None;
                self.last_acked = Some(serial);
                true
            }
            _ => false,
        }
    }

    /// A commit reporting exactly the requested content size also settles.
    pub fn commit_size(&mut self, size: (i32, i32)) -> bool {
        match self.pending {
            Some(p) if p.size == size => {
                self.pending = None;
                self.last_acked = Some(p.serial);
                true
            }
            _ => false,
        }
    }
}

/// Description supplied by protocol glue when a surface object is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceDesc {
    pub kind: SurfaceKind,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub title: String,
    pub geom: Rect,
}

/// A client surface under this engine's control. Geometry is
/// layout-relative and border-inclusive.
#[derive(Debug, Clone)]
pub struct ManagedSurface {
    pub kind: SurfaceKind,
    pub app_id: String,
    pub title: String,
    pub geom: Rect,
    pub prev_geom: Rect,
    pub monitor: Option<MonitorId>,
    pub tags: TagMask,
    pub border_width: i32,
    pub floating: bool,
    pub urgent: bool,
    pub fullscreen: bool,
    pub hidden: bool,
    pub mapped: bool,
    pub focused: bool,
    pub inhibits_idle: bool,
    /// Surface-local input-accepting region; `None` means the full extent.
    pub input_region: Option<Region>,
    pub resize: ResizeState,
}

impl ManagedSurface {
    pub fn new(desc: SurfaceDesc, border_width: i32) -> Self {
        ManagedSurface {
            kind: desc.kind,
            app_id: desc.app_id,
            title: desc.title,
            geom: desc.geom,
            prev_geom: desc.geom,
            monitor: None,
            tags: TagMask::default(),
            border_width,
            floating: false,
            urgent: false,
            fullscreen: false,
            hidden: false,
            mapped: false,
            focused: false,
            inhibits_idle: false,
            input_region: None,
            resize: ResizeState::default(),
        }
    }

    /// Effective visibility on a monitor: owned by it, monitor enabled, tag
    /// masks intersect, not hidden.
    pub fn visible_on(&self, id: MonitorId, monitor: &Monitor) -> bool {
        self.monitor == Some(id)
            && monitor.enabled
            && self.tags.intersects(monitor.tags())
            && !self.hidden
    }

    /// Surface-local input region, defaulting to the full content extent.
    pub fn effective_input_region(&self) -> Region {
        match &self.input_region {
            Some(region) => region.clone(),
            None => Region::from_rect(Rect::new(0, 0, self.geom.width, self.geom.height)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ack_settles_only_the_matching_serial() {
        let mut r = ResizeState::default();
        r.issue(7, (100, 100));
        assert!(!r.settled());
        assert!(!r.ack(6));
        assert!(!r.settled());
        assert!(r.ack(7));
        assert!(r.settled());
        // A later stale ack changes nothing.
        assert!(!r.ack(7));
    }

    #[test]
    fn superseded_request_ignores_the_old_serial() {
        let mut r = ResizeState::default();
        r.issue(1, (100, 100));
        r.issue(2, (200, 150));
        assert!(!r.ack(1));
        assert!(!r.settled());
        assert!(r.ack(2));
    }

    #[test]
    fn exact_size_commit_settles() {
        let mut r = ResizeState::default();
        r.issue(3, (640, 480));
        assert!(!r.commit_size((640, 400)));
        assert!(r.commit_size((640, 480)));
        assert!(r.settled());
    }

    #[test]
    fn unmanaged_kind_never_accepts_focus() {
        assert!(SurfaceKind::LegacyUnmanaged.is_unmanaged());
        assert!(!SurfaceKind::LegacyUnmanaged.accepts_focus());
        assert!(SurfaceKind::Toplevel.accepts_focus());
        assert!(SurfaceKind::LegacyManaged.accepts_focus());
    }

    #[test]
    fn default_input_region_covers_the_content() {
        let desc = SurfaceDesc {
            kind: SurfaceKind::Toplevel,
            app_id: "term".into(),
            title: "sh".into(),
            geom: Rect::new(40, 50, 300, 200),
        };
        let s = ManagedSurface::new(desc, 1);
        let region = s.effective_input_region();
        assert_eq!(region.rects(), &[Rect::new(0, 0, 300, 200)]);
    }
}
