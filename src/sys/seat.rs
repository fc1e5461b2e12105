//! The seat/input collaborator.

use crate::model::panel::PanelId;
use crate::model::surface::SurfaceId;

/// Where the seat's keyboard focus currently rests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyboardFocus {
    #[default]
    None,
    Surface(SurfaceId),
    Panel(PanelId),
}

pub trait Seat {
    /// Current pointer position in layout coordinates.
    fn pointer_position(&self) -> (f64, f64);

    /// Move the pointer to an absolute layout position.
    fn warp_pointer(&mut self, x: f64, y: f64);

    /// Move the pointer to the nearest valid position to the given one.
    fn warp_pointer_closest(&mut self, x: f64, y: f64);

    /// Tell a surface the pointer warped, so its relative-motion stream
    /// stays consistent. Coordinates are surface-local.
    fn notify_pointer_warp(&mut self, surface: SurfaceId, sx: f64, sy: f64);

    fn keyboard_focus(&self) -> KeyboardFocus;
    fn keyboard_enter_surface(&mut self, surface: SurfaceId);
    fn keyboard_enter_panel(&mut self, panel: PanelId);
    fn clear_keyboard_focus(&mut self);

    /// Enable or suppress idle tracking (inhibitor support).
    fn set_idle_enabled(&mut self, enabled: bool);

    /// Report user activity for idle tracking.
    fn notify_activity(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeatRequest {
    WarpPointer(f64, f64),
    WarpPointerClosest(f64, f64),
    NotifyPointerWarp(SurfaceId, f64, f64),
    KeyboardEnterSurface(SurfaceId),
    KeyboardEnterPanel(PanelId),
    ClearKeyboardFocus,
    SetIdleEnabled(bool),
}

/// Headless seat that tracks pointer position and keyboard focus locally.
#[derive(Debug, Default)]
pub struct RecordingSeat {
    pub requests: Vec<SeatRequest>,
    pub position: (f64, f64),
    pub focus: KeyboardFocus,
    pub idle_enabled: bool,
}

impl RecordingSeat {
    pub fn new() -> Self {
        RecordingSeat {
            idle_enabled: true,
            ..Default::default()
        }
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

impl Seat for RecordingSeat {
    fn pointer_position(&self) -> (f64, f64) {
        self.position
    }

    fn warp_pointer(&mut self, x: f64, y: f64) {
        self.position = (x, y);
        self.requests.push(SeatRequest::WarpPointer(x, y));
    }

    fn warp_pointer_closest(&mut self, x: f64, y: f64) {
        self.position = (x, y);
        self.requests.push(SeatRequest::WarpPointerClosest(x, y));
    }

    fn notify_pointer_warp(&mut self, surface: SurfaceId, sx: f64, sy: f64) {
        self.requests.push(SeatRequest::NotifyPointerWarp(surface, sx, sy));
    }

    fn keyboard_focus(&self) -> KeyboardFocus {
        self.focus
    }

    fn keyboard_enter_surface(&mut self, surface: SurfaceId) {
        self.focus = KeyboardFocus::Surface(surface);
        self.requests.push(SeatRequest::KeyboardEnterSurface(surface));
    }

    fn keyboard_enter_panel(&mut self, panel: PanelId) {
        self.focus = KeyboardFocus::Panel(panel);
        self.requests.push(SeatRequest::KeyboardEnterPanel(panel));
    }

    fn clear_keyboard_focus(&mut self) {
        self.focus = KeyboardFocus::None;
        self.requests.push(SeatRequest::ClearKeyboardFocus);
    }

    fn set_idle_enabled(&mut self, enabled: bool) {
        self.idle_enabled = enabled;
        self.requests.push(SeatRequest::SetIdleEnabled(enabled));
    }

    fn notify_activity(&mut self) {}
}
