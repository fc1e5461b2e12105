//! The compositor-runtime collaborator.
//!
//! The arrangement engine never touches the scene graph or the wire
//! protocol directly; it issues narrow requests through this trait and the
//! runtime glue carries them out. [`RecordingCompositor`] is the headless
//! implementation used by tests and trace replay.

use crate::model::constraint::ConstraintId;
use crate::model::monitor::MonitorId;
use crate::model::panel::PanelId;
use crate::model::surface::SurfaceId;
use crate::sys::geometry::Rect;

/// Correlation serial for an in-flight resize request.
pub type Serial = u32;

pub trait Compositor {
    /// Position the surface's scene node, layout-relative.
    fn position_surface(&mut self, surface: SurfaceId, x: i32, y: i32);

    /// Request a content-size change; the returned serial correlates the
    /// request with its acknowledgment.
    fn request_size(&mut self, surface: SurfaceId, width: i32, height: i32) -> Serial;

    /// Preferred content size reported by the client, if any.
    fn preferred_size(&self, surface: SurfaceId) -> Option<(i32, i32)>;

    fn set_surface_enabled(&mut self, surface: SurfaceId, enabled: bool);
    fn raise_to_top(&mut self, surface: SurfaceId);
    fn lower_to_bottom(&mut self, surface: SurfaceId);

    /// Visual activation signaling toward the client.
    fn set_activated(&mut self, surface: SurfaceId, active: bool);
    fn set_fullscreen(&mut self, surface: SurfaceId, fullscreen: bool);
    fn send_close(&mut self, surface: SurfaceId);

    /// Forward the output's frame-completion signal to a surface that is
    /// still settling a resize.
    fn send_frame_done(&mut self, surface: SurfaceId);

    /// Commit the output's scene for presentation.
    fn commit_output(&mut self, monitor: MonitorId);

    fn configure_panel(&mut self, panel: PanelId, geom: Rect);

    /// Destroy a panel's protocol object (protocol-violation recovery).
    fn destroy_panel(&mut self, panel: PanelId);

    /// Announce (de)activation of a pointer constraint to its owner.
    fn set_constraint_active(&mut self, constraint: ConstraintId, active: bool);
}

/// Every request the engine can issue, recorded verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum CompositorRequest {
    PositionSurface(SurfaceId, i32, i32),
    RequestSize(SurfaceId, i32, i32, Serial),
    SetSurfaceEnabled(SurfaceId, bool),
    RaiseToTop(SurfaceId),
    LowerToBottom(SurfaceId),
    SetActivated(SurfaceId, bool),
    SetFullscreen(SurfaceId, bool),
    SendClose(SurfaceId),
    SendFrameDone(SurfaceId),
    CommitOutput(MonitorId),
    ConfigurePanel(PanelId, Rect),
    DestroyPanel(PanelId),
    SetConstraintActive(ConstraintId, bool),
}

/// Records requests and hands out monotonically increasing serials.
#[derive(Debug, Default)]
pub struct RecordingCompositor {
    pub requests: Vec<CompositorRequest>,
    pub preferred: crate::common::collections::HashMap<SurfaceId, (i32, i32)>,
    next_serial: Serial,
}

impl RecordingCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    /// Last serial issued for the surface, if a resize was requested.
    pub fn last_serial_for(&self, surface: SurfaceId) -> Option<Serial> {
        self.requests.iter().rev().find_map(|r| match r {
            CompositorRequest::RequestSize(s, _, _, serial) if *s == surface => Some(*serial),
            _ => None,
        })
    }
}

impl Compositor for RecordingCompositor {
    fn position_surface(&mut self, surface: SurfaceId, x: i32, y: i32) {
        self.requests.push(CompositorRequest::PositionSurface(surface, x, y));
    }

    fn request_size(&mut self, surface: SurfaceId, width: i32, height: i32) -> Serial {
        self.next_serial += 1;
        self.requests
            .push(CompositorRequest::RequestSize(surface, width, height, self.next_serial));
        self.next_serial
    }

    fn preferred_size(&self, surface: SurfaceId) -> Option<(i32, i32)> {
        self.preferred.get(&surface).copied()
    }

    fn set_surface_enabled(&mut self, surface: SurfaceId, enabled: bool) {
        self.requests.push(CompositorRequest::SetSurfaceEnabled(surface, enabled));
    }

    fn raise_to_top(&mut self, surface: SurfaceId) {
        self.requests.push(CompositorRequest::RaiseToTop(surface));
    }

    fn lower_to_bottom(&mut self, surface: SurfaceId) {
        self.requests.push(CompositorRequest::LowerToBottom(surface));
    }

    fn set_activated(&mut self, surface: SurfaceId, active: bool) {
        self.requests.push(CompositorRequest::SetActivated(surface, active));
    }

    fn set_fullscreen(&mut self, surface: SurfaceId, fullscreen: bool) {
        self.requests.push(CompositorRequest::SetFullscreen(surface, fullscreen));
    }

    fn send_close(&mut self, surface: SurfaceId) {
        self.requests.push(CompositorRequest::SendClose(surface));
    }

    fn send_frame_done(&mut self, surface: SurfaceId) {
        self.requests.push(CompositorRequest::SendFrameDone(surface));
    }

    fn commit_output(&mut self, monitor: MonitorId) {
        self.requests.push(CompositorRequest::CommitOutput(monitor));
    }

    fn configure_panel(&mut self, panel: PanelId, geom: Rect) {
        self.requests.push(CompositorRequest::ConfigurePanel(panel, geom));
    }

    fn destroy_panel(&mut self, panel: PanelId) {
        self.requests.push(CompositorRequest::DestroyPanel(panel));
    }

    fn set_constraint_active(&mut self, constraint: ConstraintId, active: bool) {
        self.requests.push(CompositorRequest::SetConstraintActive(constraint, active));
    }
}
