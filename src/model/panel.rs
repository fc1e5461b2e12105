//! Anchored panel surfaces (status bars, docks, launchers).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::model::monitor::MonitorId;
use crate::sys::geometry::Rect;

new_key_type! {
    pub struct PanelId;
}

bitflags! {
    /// Edges a panel is anchored to. Anchoring both edges of an axis with a
    /// zero desired size means "stretch along that axis".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Anchor: u8 {
        const TOP = 1;
        const BOTTOM = 2;
        const LEFT = 4;
        const RIGHT = 8;
    }
}

impl Anchor {
    pub const BOTH_HORIZ: Anchor = Anchor::LEFT.union(Anchor::RIGHT);
    pub const BOTH_VERT: Anchor = Anchor::TOP.union(Anchor::BOTTOM);
}

/// Shell stacking layer a panel lives on. Arrangement walks these from the
/// most overlay-like down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellLayer {
    Background,
    Bottom,
    Top,
    Overlay,
}

impl ShellLayer {
    pub const TOP_DOWN: [ShellLayer; 4] = [
        ShellLayer::Overlay,
        ShellLayer::Top,
        ShellLayer::Bottom,
        ShellLayer::Background,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub right: i32,
    #[serde(default)]
    pub bottom: i32,
    #[serde(default)]
    pub left: i32,
}

/// Committed state for a panel, supplied by protocol glue at creation and on
/// every commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelDesc {
    pub monitor: MonitorId,
    pub layer: ShellLayer,
    pub anchor: Anchor,
    /// Positive: reserve this many pixels from the anchored edge. Zero: no
    /// reservation. Negative one: size against the full monitor area and
    /// ignore other panels' reservations.
    #[serde(default)]
    pub exclusive_zone: i32,
    /// Requested size; zero on an axis means "fill" when double-anchored.
    #[serde(default)]
    pub desired_width: i32,
    #[serde(default)]
    pub desired_height: i32,
    #[serde(default)]
    pub margin: Margins,
    #[serde(default)]
    pub keyboard_interactive: bool,
}

#[derive(Debug, Clone)]
pub struct PanelSurface {
    pub monitor: MonitorId,
    pub layer: ShellLayer,
    pub anchor: Anchor,
    pub exclusive_zone: i32,
    pub desired_width: i32,
    pub desired_height: i32,
    pub margin: Margins,
    pub keyboard_interactive: bool,
    pub mapped: bool,
    pub geom: Rect,
}

impl PanelSurface {
    pub fn new(desc: PanelDesc) -> Self {
        PanelSurface {
            monitor: desc.monitor,
            layer: desc.layer,
            anchor: desc.anchor,
            exclusive_zone: desc.exclusive_zone,
            desired_width: desc.desired_width,
            desired_height: desc.desired_height,
            margin: desc.margin,
            keyboard_interactive: desc.keyboard_interactive,
            mapped: false,
            geom: Rect::default(),
        }
    }

    pub fn update(&mut self, desc: PanelDesc) {
        self.layer = desc.layer;
        self.anchor = desc.anchor;
        self.exclusive_zone = desc.exclusive_zone;
        self.desired_width = desc.desired_width;
        self.desired_height = desc.desired_height;
        self.margin = desc.margin;
        self.keyboard_interactive = desc.keyboard_interactive;
    }

    pub fn reserves_space(&self) -> bool {
        self.exclusive_zone > 0
    }
}
