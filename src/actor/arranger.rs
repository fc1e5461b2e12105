//! The arrangement engine.
//!
//! One [`Arranger`] owns all window-management state: the monitor, surface,
//! panel, and constraint arenas, the three global orderings, and the seat
//! focus policy. It consumes [`Event`]s from the compositor glue on a single
//! thread and answers with requests through the [`Compositor`] and [`Seat`]
//! traits. Nothing in here blocks; every handler runs to completion before
//! the next event is dispatched.

mod panels;
mod pointer;
mod status;

pub use status::{StatusFact, StatusLine};

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::common::collections::HashSet;
use crate::common::config::Config;
use crate::layout_engine::{Layout, LayoutParams, compute_layout};
use crate::model::constraint::{ConstraintId, ConstraintMode, PointerConstraint};
use crate::model::monitor::{Monitor, MonitorId};
use crate::model::orderings::Orderings;
use crate::model::panel::{PanelDesc, PanelId, PanelSurface, ShellLayer};
use crate::model::surface::{ManagedSurface, SurfaceDesc, SurfaceId};
use crate::model::tags::TagMask;
use crate::sys::compositor::{Compositor, Serial};
use crate::sys::geometry::{Rect, Region};
use crate::sys::seat::{KeyboardFocus, Seat};

#[derive(Debug, Error)]
pub enum ArrangeError {
    #[error("surface is not registered with the engine")]
    UnknownSurface,
    #[error("surface already has a pointer constraint")]
    ConstraintExists,
}

/// Direction argument for the cycling commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackDirection {
    Forward,
    Backward,
}

/// User-initiated operations, normally bound to keys by the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    View(TagMask),
    ToggleView(TagMask),
    Tag(TagMask),
    ToggleTag(TagMask),
    CycleFocus(StackDirection),
    Zoom,
    RotateStack(StackDirection),
    SetMasterFactor(f32),
    IncMasterCount(i32),
    NextLayout,
    SetLayout(Layout),
    ToggleFloating,
    ToggleFullscreen,
    /// `true` hides the focused surface; `false` reveals every hidden
    /// surface on the selected monitor.
    SetHidden(bool),
    FocusMonitor(StackDirection),
    TagMonitor(StackDirection),
    CloseFocused,
}

/// Everything the runtime can tell the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// New layout-relative extents for one or more outputs.
    OutputLayoutChanged(Vec<(MonitorId, Rect)>),
    OutputToggled(MonitorId, bool),
    OutputRemoved(MonitorId),
    FrameCompleted(MonitorId),
    SurfaceMapped(SurfaceId),
    SurfaceUnmapped(SurfaceId),
    SurfaceCommitted {
        surface: SurfaceId,
        size: (i32, i32),
        ack: Option<Serial>,
    },
    SurfaceTitleChanged(SurfaceId, String),
    /// A client asked for attention (activation protocol).
    ActivationRequested(SurfaceId),
    FullscreenRequested(SurfaceId, bool),
    IdleInhibitorChanged(SurfaceId, bool),
    PanelMapped(PanelId),
    PanelUnmapped(PanelId),
    PanelDestroyed(PanelId),
    PanelCommitted(PanelId, PanelDesc),
    PointerMotion { dx: f64, dy: f64 },
    ConstraintDestroyed(ConstraintId),
    ConstraintRegionSet(ConstraintId, Region),
    CursorHintSet(ConstraintId, f64, f64),
    Command(Command),
}

pub struct Arranger<C: Compositor, S: Seat> {
    pub config: Config,
    pub compositor: C,
    pub seat: S,
    pub monitors: SlotMap<MonitorId, Monitor>,
    /// Monitor creation order; fallback selection walks this.
    pub monitor_order: Vec<MonitorId>,
    pub surfaces: SlotMap<SurfaceId, ManagedSurface>,
    pub panels: SlotMap<PanelId, PanelSurface>,
    /// Panel map order within each shell layer.
    pub panel_order: Vec<PanelId>,
    pub constraints: SlotMap<ConstraintId, PointerConstraint>,
    pub orderings: Orderings,
    pub selmon: Option<MonitorId>,
    /// Keyboard-interactive panel currently holding the keyboard.
    exclusive_focus: Option<PanelId>,
    active_constraint: Option<ConstraintId>,
    status: Option<Sender<StatusLine>>,
}

impl<C: Compositor, S: Seat> Arranger<C, S> {
    pub fn new(config: Config, compositor: C, seat: S) -> Self {
        Arranger {
            config,
            compositor,
            seat,
            monitors: SlotMap::with_key(),
            monitor_order: Vec::new(),
            surfaces: SlotMap::with_key(),
            panels: SlotMap::with_key(),
            panel_order: Vec::new(),
            constraints: SlotMap::with_key(),
            orderings: Orderings::default(),
            selmon: None,
            exclusive_focus: None,
            active_constraint: None,
            status: None,
        }
    }

    /// Drain the event channel until every sender is gone.
    pub fn run(&mut self, events: Receiver<Event>) {
        info!("arrangement engine running");
        while let Ok(event) = events.recv() {
            self.dispatch(event);
        }
        info!("event channel closed, shutting down");
    }

    pub fn dispatch(&mut self, event: Event) {
        trace!(?event, "dispatch");
        match event {
            Event::OutputLayoutChanged(updates) => self.handle_output_layout(updates),
            Event::OutputToggled(monitor, enabled) => self.handle_output_toggled(monitor, enabled),
            Event::OutputRemoved(monitor) => self.close_monitor(monitor),
            Event::FrameCompleted(monitor) => self.handle_frame_completed(monitor),
            Event::SurfaceMapped(surface) => self.handle_surface_mapped(surface),
            Event::SurfaceUnmapped(surface) => self.handle_surface_unmapped(surface),
            Event::SurfaceCommitted { surface, size, ack } => {
                self.handle_surface_committed(surface, size, ack)
            }
            Event::SurfaceTitleChanged(surface, title) => self.handle_title_changed(surface, title),
            Event::ActivationRequested(surface) => self.handle_activation_requested(surface),
            Event::FullscreenRequested(surface, fullscreen) => {
                self.handle_fullscreen_requested(surface, fullscreen)
            }
            Event::IdleInhibitorChanged(surface, inhibits) => {
                self.handle_idle_inhibitor(surface, inhibits)
            }
            Event::PanelMapped(panel) => self.handle_panel_mapped(panel),
            Event::PanelUnmapped(panel) => self.handle_panel_unmapped(panel),
            Event::PanelDestroyed(panel) => self.handle_panel_destroyed(panel),
            Event::PanelCommitted(panel, desc) => self.handle_panel_committed(panel, desc),
            Event::PointerMotion { dx, dy } => self.pointer_motion(dx, dy),
            Event::ConstraintDestroyed(constraint) => self.handle_constraint_destroyed(constraint),
            Event::ConstraintRegionSet(constraint, region) => {
                self.handle_constraint_region_set(constraint, region)
            }
            Event::CursorHintSet(constraint, x, y) => self.handle_cursor_hint(constraint, x, y),
            Event::Command(command) => self.command(command),
        }
    }

    // ---- object registration -------------------------------------------

    pub fn create_monitor(&mut self, name: impl Into<String>, area: Rect) -> MonitorId {
        let monitor = Monitor::new(
            name.into(),
            area,
            self.config.tag_count,
            self.config.mfact,
            self.config.nmaster,
            self.config.orientation,
        );
        info!(name = %monitor.name, ?area, "monitor added");
        let id = self.monitors.insert(monitor);
        self.monitor_order.push(id);
        if self.selmon.is_none() {
            self.selmon = Some(id);
        }
        self.arrange_panels(id);
        self.arrange(id);
        self.adopt_orphans();
        self.print_status();
        id
    }

    /// Hand surfaces that lost their monitor to the selected one, keeping
    /// their tags where they have any.
    fn adopt_orphans(&mut self) {
        let Some(sel) = self.selmon else {
            return;
        };
        let orphans: Vec<SurfaceId> = self
            .surfaces
            .iter()
            .filter(|(_, s)| s.monitor.is_none() && s.mapped && !s.kind.is_unmanaged())
            .map(|(id, _)| id)
            .collect();
        for id in orphans {
            let tags = self.surfaces.get(id).map(|s| s.tags).unwrap_or_default();
            self.set_monitor(id, Some(sel), tags);
        }
    }

    /// Register a surface object. It takes no part in arrangement until its
    /// [`Event::SurfaceMapped`] arrives.
    pub fn create_surface(&mut self, desc: SurfaceDesc) -> SurfaceId {
        self.surfaces
            .insert(ManagedSurface::new(desc, self.config.border_width))
    }

    pub fn create_panel(&mut self, desc: PanelDesc) -> PanelId {
        let id = self.panels.insert(PanelSurface::new(desc));
        self.panel_order.push(id);
        id
    }

    /// Register a pointer constraint for a surface. A surface can hold at
    /// most one; the protocol treats a second as an error.
    pub fn create_constraint(
        &mut self,
        surface: SurfaceId,
        mode: ConstraintMode,
        declared: Region,
    ) -> Result<ConstraintId, ArrangeError> {
        if !self.surfaces.contains_key(surface) {
            return Err(ArrangeError::UnknownSurface);
        }
        if self.constraints.values().any(|c| c.surface == surface) {
            return Err(ArrangeError::ConstraintExists);
        }
        let id = self
            .constraints
            .insert(PointerConstraint::new(surface, mode, declared));
        self.update_constraint_focus();
        Ok(id)
    }

    // ---- geometry ------------------------------------------------------

    /// Bounding box of all enabled outputs.
    fn layout_extent(&self) -> Rect {
        let mut areas = self.monitors.values().filter(|m| m.enabled).map(|m| m.area);
        let Some(first) = areas.next() else {
            return Rect::default();
        };
        areas.fold(first, |acc, r| {
            let x = acc.x.min(r.x);
            let y = acc.y.min(r.y);
            let right = acc.right().max(r.right());
            let bottom = acc.bottom().max(r.bottom());
            Rect::new(x, y, right - x, bottom - y)
        })
    }

    /// Apply sizing bounds and push the result to the client. `interact`
    /// bounds against the whole layout instead of the owning monitor, for
    /// interactive moves across outputs.
    pub fn resize(&mut self, id: SurfaceId, geo: Rect, interact: bool) {
        let Some(s) = self.surfaces.get(id) else {
            return;
        };
        let bw = s.border_width;
        let bbox = if interact {
            self.layout_extent()
        } else {
            match s.monitor.and_then(|m| self.monitors.get(m)) {
                Some(m) if s.fullscreen => m.area,
                Some(m) => m.usable,
                None => geo,
            }
        };
        let mut geo = geo;
        geo.width = geo.width.max(1 + 2 * bw);
        geo.height = geo.height.max(1 + 2 * bw);
        apply_bounds(&mut geo, bbox);

        let old = s.geom;
        let monitor = s.monitor;
        let content = (geo.width - 2 * bw, geo.height - 2 * bw);
        let old_content = (old.width - 2 * bw, old.height - 2 * bw);
        if let Some(s) = self.surfaces.get_mut(id) {
            s.geom = geo;
        }
        self.compositor.position_surface(id, geo.x, geo.y);
        if content != old_content {
            let serial = self.compositor.request_size(id, content.0, content.1);
            if let Some(s) = self.surfaces.get_mut(id) {
                s.resize.issue(serial, content);
            }
        }
        if let Some(m) = monitor.and_then(|m| self.monitors.get_mut(m)) {
            m.moved = true;
        }
    }

    /// Run one tiling pass over a monitor: sync scene visibility, place the
    /// fullscreen surface if there is one, otherwise tile.
    pub fn arrange(&mut self, mid: MonitorId) {
        let Some(monitor) = self.monitors.get(mid) else {
            return;
        };
        let enabled = monitor.enabled;
        let area = monitor.area;
        let layout = monitor.layout();
        let params = LayoutParams {
            usable: monitor.usable,
            mfact: monitor.mfact,
            nmaster: monitor.nmaster,
            orientation: monitor.orientation,
            gap: self.config.gap,
        };
        let owned: Vec<(SurfaceId, bool)> = self
            .surfaces
            .iter()
            .filter(|(_, s)| s.monitor == Some(mid) && s.mapped)
            .map(|(id, s)| (id, s.visible_on(mid, monitor)))
            .collect();
        for &(id, vis) in &owned {
            self.compositor.set_surface_enabled(id, vis);
        }
        if !enabled {
            return;
        }
        let visible: HashSet<SurfaceId> =
            owned.iter().filter(|(_, v)| *v).map(|(id, _)| *id).collect();

        // a visible fullscreen surface owns the whole output; the tiling
        // pass refuses to run underneath it
        let fullscreen = self
            .orderings
            .z_front_to_back()
            .iter()
            .copied()
            .find(|id| {
                visible.contains(id) && self.surfaces.get(*id).is_some_and(|s| s.fullscreen)
            });
        if let Some(fs) = fullscreen {
            if self.surfaces.get(fs).is_some_and(|s| s.geom != area) {
                self.resize(fs, area, false);
            }
            self.check_constraint_region();
            return;
        }

        let tiled: Vec<SurfaceId> = self
            .orderings
            .tiling()
            .iter()
            .copied()
            .filter(|id| visible.contains(id))
            .filter(|&id| self.surfaces.get(id).is_some_and(|s| !s.floating))
            .collect();
        let rects = compute_layout(layout, &params, tiled.len());
        for (id, rect) in tiled.into_iter().zip(rects) {
            if self.surfaces.get(id).is_some_and(|s| s.geom != rect) {
                self.resize(id, rect, false);
            }
        }
        self.check_constraint_region();
    }

    // ---- focus ---------------------------------------------------------

    fn focused_surface(&self) -> Option<SurfaceId> {
        match self.seat.keyboard_focus() {
            KeyboardFocus::Surface(s) => Some(s),
            _ => None,
        }
    }

    fn visible(&self, id: SurfaceId, mid: MonitorId) -> bool {
        let Some(monitor) = self.monitors.get(mid) else {
            return false;
        };
        self.surfaces
            .get(id)
            .is_some_and(|s| s.mapped && s.visible_on(mid, monitor))
    }

    /// Most recently focused surface still visible on the monitor.
    pub fn focus_top(&self, mid: MonitorId) -> Option<SurfaceId> {
        let monitor = self.monitors.get(mid)?;
        self.orderings.focus().iter().copied().find(|&id| {
            self.surfaces
                .get(id)
                .is_some_and(|s| s.mapped && s.kind.accepts_focus() && s.visible_on(mid, monitor))
        })
    }

    /// Move keyboard focus. `lift` also raises the surface in z-order. An
    /// exclusive keyboard-interactive panel keeps the keyboard for itself.
    pub fn focus(&mut self, target: Option<SurfaceId>, lift: bool) {
        let target = target.filter(|&id| {
            self.surfaces
                .get(id)
                .is_some_and(|s| s.mapped && s.kind.accepts_focus())
        });
        if let Some(id) = target
            && lift
        {
            self.orderings.raise(id);
            self.compositor.raise_to_top(id);
        }
        let old = self.seat.keyboard_focus();
        if let Some(id) = target
            && old == KeyboardFocus::Surface(id)
        {
            return;
        }
        if let Some(id) = target {
            self.orderings.promote_focus(id);
            if let Some(s) = self.surfaces.get_mut(id) {
                s.urgent = false;
                s.focused = true;
                if let Some(mid) = s.monitor {
                    self.selmon = Some(mid);
                }
            }
        }
        if let Some(panel) = self.exclusive_focus
            && self.panels.get(panel).is_some_and(|p| {
                p.mapped
                    && p.keyboard_interactive
                    && matches!(p.layer, ShellLayer::Top | ShellLayer::Overlay)
            })
        {
            // the panel holds the keyboard; focus order was still updated
            return;
        }
        if let KeyboardFocus::Surface(old_id) = old
            && target != Some(old_id)
        {
            if let Some(s) = self.surfaces.get_mut(old_id) {
                s.focused = false;
            }
            self.compositor.set_activated(old_id, false);
        }
        match target {
            Some(id) => {
                self.seat.keyboard_enter_surface(id);
                self.compositor.set_activated(id, true);
            }
            None => self.seat.clear_keyboard_focus(),
        }
        self.update_constraint_focus();
        self.refresh_idle_inhibitors();
    }

    fn refocus_top(&mut self) {
        let top = self.selmon.and_then(|m| self.focus_top(m));
        self.focus(top, true);
    }

    // ---- commands ------------------------------------------------------

    pub fn command(&mut self, command: Command) {
        debug!(?command, "command");
        match command {
            Command::View(tags) => self.view(tags),
            Command::ToggleView(tags) => self.toggle_view(tags),
            Command::Tag(tags) => self.tag(tags),
            Command::ToggleTag(tags) => self.toggle_tag(tags),
            Command::CycleFocus(dir) => self.cycle_focus(dir),
            Command::Zoom => self.zoom(),
            Command::RotateStack(dir) => self.rotate_stack(dir),
            Command::SetMasterFactor(arg) => self.set_master_factor(arg),
            Command::IncMasterCount(delta) => self.inc_master_count(delta),
            Command::NextLayout => self.next_layout(),
            Command::SetLayout(layout) => self.set_layout(layout),
            Command::ToggleFloating => self.toggle_floating(),
            Command::ToggleFullscreen => self.toggle_fullscreen(),
            Command::SetHidden(hidden) => self.set_hidden(hidden),
            Command::FocusMonitor(dir) => self.focus_monitor(dir),
            Command::TagMonitor(dir) => self.tag_monitor(dir),
            Command::CloseFocused => self.close_focused(),
        }
    }

    fn view(&mut self, tags: TagMask) {
        let Some(mid) = self.selmon else {
            return;
        };
        let tags = tags.clamped(self.config.valid_tags());
        let changed = self.monitors.get_mut(mid).is_some_and(|m| m.view(tags));
        if !changed {
            return;
        }
        let top = self.focus_top(mid);
        self.focus(top, true);
        self.arrange(mid);
        self.print_status();
    }

    fn toggle_view(&mut self, tags: TagMask) {
        let Some(mid) = self.selmon else {
            return;
        };
        let tags = tags.clamped(self.config.valid_tags());
        let changed = self
            .monitors
            .get_mut(mid)
            .is_some_and(|m| m.toggle_view(tags));
        if !changed {
            return;
        }
        let top = self.focus_top(mid);
        self.focus(top, true);
        self.arrange(mid);
        self.print_status();
    }

    fn tag(&mut self, tags: TagMask) {
        let tags = tags.clamped(self.config.valid_tags());
        if tags.is_empty() {
            return;
        }
        let Some(id) = self.focused_surface() else {
            return;
        };
        let Some(s) = self.surfaces.get_mut(id) else {
            return;
        };
        s.tags = tags;
        let mid = s.monitor;
        self.refocus_top();
        if let Some(mid) = mid {
            self.arrange(mid);
        }
        self.print_status();
    }

    fn toggle_tag(&mut self, tags: TagMask) {
        let tags = tags.clamped(self.config.valid_tags());
        let Some(id) = self.focused_surface() else {
            return;
        };
        let Some(s) = self.surfaces.get_mut(id) else {
            return;
        };
        let next = s.tags.toggle(tags);
        if next.is_empty() {
            return;
        }
        s.tags = next;
        let mid = s.monitor;
        self.refocus_top();
        if let Some(mid) = mid {
            self.arrange(mid);
        }
        self.print_status();
    }

    fn cycle_focus(&mut self, dir: StackDirection) {
        let Some(mid) = self.selmon else {
            return;
        };
        let Some(sel) = self.focused_surface() else {
            return;
        };
        if self.config.lock_fullscreen
            && self.surfaces.get(sel).is_some_and(|s| s.fullscreen)
        {
            return;
        }
        let order = self.orderings.tiling().to_vec();
        let Some(pos) = order.iter().position(|&s| s == sel) else {
            return;
        };
        let n = order.len();
        let next = (1..n)
            .map(|k| match dir {
                StackDirection::Forward => order[(pos + k) % n],
                StackDirection::Backward => order[(pos + n - k) % n],
            })
            .find(|&id| self.visible(id, mid));
        if let Some(id) = next {
            self.focus(Some(id), true);
            self.print_status();
        }
    }

    /// Swap the focused tiled surface with the master slot.
    fn zoom(&mut self) {
        let Some(mid) = self.selmon else {
            return;
        };
        let Some(sel) = self.focused_surface() else {
            return;
        };
        if self
            .surfaces
            .get(sel)
            .is_some_and(|s| s.floating || s.fullscreen)
        {
            return;
        }
        let tiled: Vec<SurfaceId> = self.tiled_in_order(mid);
        let Some(&master) = tiled.first() else {
            return;
        };
        let target = if master == sel {
            tiled.get(1).copied()
        } else {
            Some(sel)
        };
        let Some(target) = target else {
            return;
        };
        self.orderings.promote_tiling(target);
        self.focus(Some(target), true);
        self.arrange(mid);
        self.print_status();
    }

    fn rotate_stack(&mut self, dir: StackDirection) {
        let Some(mid) = self.selmon else {
            return;
        };
        let eligible = self.tiled_in_order(mid);
        self.orderings
            .rotate_tiling(&eligible, matches!(dir, StackDirection::Backward));
        self.arrange(mid);
    }

    /// Visible tiled surfaces on the monitor, in tiling order.
    fn tiled_in_order(&self, mid: MonitorId) -> Vec<SurfaceId> {
        self.orderings
            .tiling()
            .iter()
            .copied()
            .filter(|&id| {
                self.visible(id, mid)
                    && self
                        .surfaces
                        .get(id)
                        .is_some_and(|s| !s.floating && !s.fullscreen)
            })
            .collect()
    }

    fn set_master_factor(&mut self, arg: f32) {
        let Some(mid) = self.selmon else {
            return;
        };
        let changed = self
            .monitors
            .get_mut(mid)
            .is_some_and(|m| m.set_master_factor(arg));
        if changed {
            self.arrange(mid);
        }
    }

    fn inc_master_count(&mut self, delta: i32) {
        let Some(mid) = self.selmon else {
            return;
        };
        if let Some(m) = self.monitors.get_mut(mid) {
            m.adjust_nmaster(delta);
        }
        self.arrange(mid);
    }

    fn next_layout(&mut self) {
        let Some(mid) = self.selmon else {
            return;
        };
        if let Some(m) = self.monitors.get_mut(mid) {
            m.sellt ^= 1;
        }
        self.arrange(mid);
        self.print_status();
    }

    fn set_layout(&mut self, layout: Layout) {
        let Some(mid) = self.selmon else {
            return;
        };
        if let Some(m) = self.monitors.get_mut(mid) {
            if m.layout() != layout {
                m.sellt ^= 1;
                m.layouts[m.sellt] = layout;
            }
        }
        self.arrange(mid);
        self.print_status();
    }

    fn toggle_floating(&mut self) {
        let Some(id) = self.focused_surface() else {
            return;
        };
        let Some(s) = self.surfaces.get_mut(id) else {
            return;
        };
        if s.fullscreen {
            return;
        }
        s.floating = !s.floating;
        let floating = s.floating;
        let mid = s.monitor;
        if !floating {
            // tiled surfaces stack below floating ones
            self.orderings.lower(id);
            self.compositor.lower_to_bottom(id);
        }
        if let Some(mid) = mid {
            self.arrange(mid);
        }
        self.print_status();
    }

    fn toggle_fullscreen(&mut self) {
        let Some(id) = self.focused_surface() else {
            return;
        };
        let fullscreen = self.surfaces.get(id).is_some_and(|s| s.fullscreen);
        self.apply_fullscreen(id, !fullscreen);
    }

    fn set_hidden(&mut self, hidden: bool) {
        let Some(mid) = self.selmon else {
            return;
        };
        if hidden {
            let Some(id) = self.focused_surface() else {
                return;
            };
            if let Some(s) = self.surfaces.get_mut(id) {
                if s.hidden {
                    return;
                }
                s.hidden = true;
            }
            self.arrange(mid);
            let top = self.focus_top(mid);
            self.focus(top, true);
        } else {
            let revealed: Vec<SurfaceId> = self
                .surfaces
                .iter()
                .filter(|(_, s)| s.monitor == Some(mid) && s.hidden)
                .map(|(id, _)| id)
                .collect();
            if revealed.is_empty() {
                return;
            }
            for id in revealed {
                if let Some(s) = self.surfaces.get_mut(id) {
                    s.hidden = false;
                }
            }
            self.arrange(mid);
        }
        self.print_status();
    }

    fn monitor_in_direction(&self, dir: StackDirection) -> Option<MonitorId> {
        let enabled: Vec<MonitorId> = self
            .monitor_order
            .iter()
            .copied()
            .filter(|&m| self.monitors.get(m).is_some_and(|mm| mm.enabled))
            .collect();
        let cur = self.selmon?;
        let pos = enabled.iter().position(|&m| m == cur)?;
        let n = enabled.len();
        Some(match dir {
            StackDirection::Forward => enabled[(pos + 1) % n],
            StackDirection::Backward => enabled[(pos + n - 1) % n],
        })
    }

    fn focus_monitor(&mut self, dir: StackDirection) {
        let Some(next) = self.monitor_in_direction(dir) else {
            return;
        };
        if Some(next) == self.selmon {
            return;
        }
        self.selmon = Some(next);
        let top = self.focus_top(next);
        self.focus(top, true);
        self.print_status();
    }

    fn tag_monitor(&mut self, dir: StackDirection) {
        let Some(sel) = self.focused_surface() else {
            return;
        };
        let Some(next) = self.monitor_in_direction(dir) else {
            return;
        };
        self.set_monitor(sel, Some(next), TagMask::default());
    }

    fn close_focused(&mut self) {
        if let Some(id) = self.focused_surface() {
            self.compositor.send_close(id);
        }
    }

    // ---- surface lifecycle ---------------------------------------------

    fn handle_surface_mapped(&mut self, id: SurfaceId) {
        let Some(s) = self.surfaces.get_mut(id) else {
            warn!(?id, "map event for unknown surface");
            return;
        };
        if s.mapped {
            return;
        }
        s.mapped = true;
        if s.kind.is_unmanaged() {
            let geom = s.geom;
            self.compositor.position_surface(id, geom.x, geom.y);
            self.compositor.raise_to_top(id);
            return;
        }
        self.orderings.insert(id);
        let (app_id, title) = (s.app_id.clone(), s.title.clone());
        let rule = self.config.rule_for(&app_id, &title);
        if rule.floating && let Some(s) = self.surfaces.get_mut(id) {
            s.floating = true;
        }
        let target = rule
            .monitor
            .and_then(|i| self.monitor_order.get(i).copied())
            .or(self.selmon);
        self.set_monitor(id, target, rule.tags);
        if self.surfaces.get(id).is_some_and(|s| s.floating)
            && let Some(geom) = self.initial_floating_geom(id, rule.geometry)
        {
            self.resize(id, geom, false);
        }
        debug!(?id, %app_id, %title, "surface mapped");
        self.focus(Some(id), true);
        self.print_status();
    }

    /// First geometry of a floating surface: the rule geometry if one
    /// matched, otherwise the preferred size centered in the usable area.
    fn initial_floating_geom(&self, id: SurfaceId, rule_geom: Option<Rect>) -> Option<Rect> {
        let s = self.surfaces.get(id)?;
        let usable = self.monitors.get(s.monitor?)?.usable;
        if let Some(g) = rule_geom {
            return Some(g.translated(usable.x, usable.y));
        }
        let bw = s.border_width;
        let (w, h) = match self.compositor.preferred_size(id) {
            Some((w, h)) => (w + 2 * bw, h + 2 * bw),
            None => (s.geom.width, s.geom.height),
        };
        Some(Rect::new(
            usable.x + (usable.width - w) / 2,
            usable.y + (usable.height - h) / 2,
            w,
            h,
        ))
    }

    fn handle_surface_unmapped(&mut self, id: SurfaceId) {
        let Some(s) = self.surfaces.get(id) else {
            return;
        };
        let mid = s.monitor;
        let unmanaged = s.kind.is_unmanaged();
        if let Some(cid) = self.active_constraint
            && self.constraints.get(cid).is_some_and(|c| c.surface == id)
        {
            // owner is going away; no hint warp possible
            self.deactivate_constraint(cid, false);
        }
        self.orderings.remove(id);
        self.surfaces.remove(id);
        self.constraints.retain(|_, c| c.surface != id);
        debug!(?id, "surface unmapped");
        if unmanaged {
            return;
        }
        if let Some(mid) = mid {
            self.arrange(mid);
        }
        self.refocus_top();
        self.print_status();
    }

    fn handle_surface_committed(&mut self, id: SurfaceId, size: (i32, i32), ack: Option<Serial>) {
        let Some(s) = self.surfaces.get_mut(id) else {
            return;
        };
        let settled = match ack {
            Some(serial) => s.resize.ack(serial),
            None => s.resize.commit_size(size),
        };
        if s.floating && s.mapped {
            // floating clients may resize themselves
            let bw = s.border_width;
            s.geom.width = size.0 + 2 * bw;
            s.geom.height = size.1 + 2 * bw;
        }
        if settled {
            trace!(?id, ?size, "resize settled");
        }
        if self
            .active_constraint
            .and_then(|c| self.constraints.get(c))
            .is_some_and(|c| c.surface == id)
        {
            self.check_constraint_region();
        }
    }

    fn handle_title_changed(&mut self, id: SurfaceId, title: String) {
        let Some(s) = self.surfaces.get_mut(id) else {
            return;
        };
        s.title = title;
        if self.focused_surface() == Some(id) {
            self.print_status();
        }
    }

    fn handle_activation_requested(&mut self, id: SurfaceId) {
        if self.focused_surface() == Some(id) {
            return;
        }
        let Some(s) = self.surfaces.get_mut(id) else {
            return;
        };
        if !s.mapped || !s.kind.accepts_focus() {
            return;
        }
        s.urgent = true;
        self.print_status();
    }

    fn handle_fullscreen_requested(&mut self, id: SurfaceId, fullscreen: bool) {
        let Some(s) = self.surfaces.get_mut(id) else {
            return;
        };
        if !s.mapped {
            // honored once the surface maps
            s.fullscreen = fullscreen;
            return;
        }
        self.apply_fullscreen(id, fullscreen);
    }

    fn apply_fullscreen(&mut self, id: SurfaceId, fullscreen: bool) {
        let Some(s) = self.surfaces.get(id) else {
            return;
        };
        let Some(mid) = s.monitor else {
            return;
        };
        let Some(area) = self.monitors.get(mid).map(|m| m.area) else {
            return;
        };
        if let Some(s) = self.surfaces.get_mut(id) {
            s.fullscreen = fullscreen;
            if fullscreen {
                s.prev_geom = s.geom;
                s.border_width = 0;
            } else {
                s.border_width = self.config.border_width;
            }
        }
        self.compositor.set_fullscreen(id, fullscreen);
        if fullscreen {
            self.resize(id, area, false);
            self.orderings.raise(id);
            self.compositor.raise_to_top(id);
        } else {
            let prev = self.surfaces.get(id).map(|s| s.prev_geom).unwrap_or(area);
            self.resize(id, prev, false);
        }
        self.arrange(mid);
        self.print_status();
    }

    fn handle_idle_inhibitor(&mut self, id: SurfaceId, inhibits: bool) {
        if let Some(s) = self.surfaces.get_mut(id) {
            s.inhibits_idle = inhibits;
        }
        self.refresh_idle_inhibitors();
    }

    /// Idle tracking stays enabled unless some visible surface holds an
    /// inhibitor.
    pub(crate) fn refresh_idle_inhibitors(&mut self) {
        let inhibited = self.surfaces.iter().any(|(_, s)| {
            s.inhibits_idle
                && s.mapped
                && s.monitor
                    .and_then(|mid| self.monitors.get(mid).map(|m| (mid, m)))
                    .is_some_and(|(mid, m)| s.visible_on(mid, m))
        });
        self.seat.set_idle_enabled(!inhibited);
    }

    // ---- monitor lifecycle ---------------------------------------------

    /// Reassign a surface to another monitor. Empty `tags` adopts the
    /// target's current tagset; non-empty tags are kept as given.
    pub fn set_monitor(&mut self, id: SurfaceId, target: Option<MonitorId>, tags: TagMask) {
        let Some(old) = self.surfaces.get(id).map(|s| s.monitor) else {
            return;
        };
        if old == target {
            return;
        }
        if let Some(s) = self.surfaces.get_mut(id) {
            s.monitor = target;
        }
        if let Some(o) = old {
            self.compositor.set_surface_enabled(id, false);
            self.arrange(o);
        }
        if let Some(t) = target {
            let mtags = self.monitors.get(t).map(|m| m.tags()).unwrap_or_default();
            if let Some(s) = self.surfaces.get_mut(id) {
                s.tags = if tags.is_empty() { mtags } else { tags };
                // carry the current geometry across the transfer; fullscreen
                // surfaces keep their saved restore target
                if !s.fullscreen {
                    s.prev_geom = s.geom;
                }
            }
            // re-applies fullscreen state and clamps into the new output
            let fullscreen = self.surfaces.get(id).is_some_and(|s| s.fullscreen);
            self.apply_fullscreen(id, fullscreen);
            self.arrange(t);
        }
        self.refocus_top();
        self.print_status();
    }

    fn handle_output_layout(&mut self, updates: Vec<(MonitorId, Rect)>) {
        for (mid, area) in updates {
            let Some(m) = self.monitors.get_mut(mid) else {
                continue;
            };
            if m.area == area {
                continue;
            }
            info!(name = %m.name, ?area, "output geometry changed");
            m.area = area;
            self.arrange_panels(mid);
            self.arrange(mid);
        }
        self.print_status();
    }

    fn handle_output_toggled(&mut self, mid: MonitorId, enabled: bool) {
        let Some(m) = self.monitors.get_mut(mid) else {
            return;
        };
        if m.enabled == enabled {
            return;
        }
        m.enabled = enabled;
        info!(name = %m.name, enabled, "output toggled");
        if enabled {
            self.arrange_panels(mid);
            if self.selmon.is_none() {
                self.selmon = Some(mid);
            }
            self.adopt_orphans();
        } else if self.selmon == Some(mid) {
            self.selmon = self
                .monitor_order
                .iter()
                .copied()
                .find(|&o| o != mid && self.monitors.get(o).is_some_and(|m| m.enabled));
        }
        self.arrange(mid);
        self.refocus_top();
        self.refresh_idle_inhibitors();
        self.print_status();
    }

    /// An output disappeared: hand its surfaces to the next enabled monitor
    /// in creation order, keeping their tags, and pull stranded floating
    /// surfaces back into the remaining layout.
    fn close_monitor(&mut self, mid: MonitorId) {
        let Some(m) = self.monitors.get(mid) else {
            return;
        };
        let name = m.name.clone();
        let removed_width = m.area.width;

        let dead_panels: Vec<PanelId> = self
            .panels
            .iter()
            .filter(|(_, p)| p.monitor == mid)
            .map(|(id, _)| id)
            .collect();
        for pid in dead_panels {
            self.remove_panel_record(pid);
        }

        let fallback = self
            .monitor_order
            .iter()
            .copied()
            .find(|&o| o != mid && self.monitors.get(o).is_some_and(|m| m.enabled));

        let orphans: Vec<SurfaceId> = self
            .surfaces
            .iter()
            .filter(|(_, s)| s.monitor == Some(mid))
            .map(|(id, _)| id)
            .collect();
        for id in orphans {
            let tags = self.surfaces.get(id).map(|s| s.tags).unwrap_or_default();
            self.set_monitor(id, fallback, tags);
        }

        self.monitors.remove(mid);
        self.monitor_order.retain(|&o| o != mid);
        if self.selmon == Some(mid) {
            self.selmon = fallback;
        }

        // floating surfaces can be stranded past the shrunk layout edge
        let extent = self.layout_extent();
        let stranded: Vec<SurfaceId> = self
            .surfaces
            .iter()
            .filter(|(_, s)| s.floating && s.geom.x >= extent.right())
            .map(|(id, _)| id)
            .collect();
        for id in stranded {
            if let Some(geom) = self.surfaces.get(id).map(|s| s.geom) {
                self.resize(id, geom.translated(-removed_width, 0), false);
            }
        }

        info!(name = %name, "monitor removed");
        self.refresh_exclusive_focus();
        self.refocus_top();
        self.print_status();
    }

    /// Frame pacing: while a tiling pass is still settling, hold back the
    /// scene commit and keep the affected clients rendering instead.
    fn handle_frame_completed(&mut self, mid: MonitorId) {
        let Some(monitor) = self.monitors.get(mid) else {
            return;
        };
        if !monitor.enabled {
            return;
        }
        let unsettled: Vec<SurfaceId> = self
            .surfaces
            .iter()
            .filter(|(_, s)| s.mapped && s.visible_on(mid, monitor) && !s.resize.settled())
            .map(|(id, _)| id)
            .collect();
        if monitor.moved && !unsettled.is_empty() {
            for id in unsettled {
                self.compositor.send_frame_done(id);
            }
            return;
        }
        self.compositor.commit_output(mid);
        if let Some(m) = self.monitors.get_mut(mid) {
            m.moved = false;
        }
    }
}

/// Keep at least part of the rectangle inside the bounding box.
fn apply_bounds(geo: &mut Rect, bbox: Rect) {
    if bbox.is_degenerate() {
        return;
    }
    if geo.x >= bbox.right() {
        geo.x = bbox.right() - geo.width;
    }
    if geo.y >= bbox.bottom() {
        geo.y = bbox.bottom() - geo.height;
    }
    if geo.right() <= bbox.x {
        geo.x = bbox.x;
    }
    if geo.bottom() <= bbox.y {
        geo.y = bbox.y;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::model::panel::{Anchor, Margins, ShellLayer};
    use crate::model::surface::SurfaceKind;
    use crate::sys::compositor::{CompositorRequest, RecordingCompositor};
    use crate::sys::seat::RecordingSeat;

    type TestArranger = Arranger<RecordingCompositor, RecordingSeat>;

    fn engine() -> TestArranger {
        let config = Config {
            bar_height: 0,
            border_width: 0,
            gap: 0,
            ..Config::default()
        };
        Arranger::new(config, RecordingCompositor::new(), RecordingSeat::new())
    }

    fn map_surface(a: &mut TestArranger, title: &str) -> SurfaceId {
        let id = a.create_surface(SurfaceDesc {
            kind: SurfaceKind::Toplevel,
            app_id: "test".into(),
            title: title.into(),
            geom: Rect::new(0, 0, 400, 300),
        });
        a.dispatch(Event::SurfaceMapped(id));
        id
    }

    fn panel_desc(monitor: MonitorId) -> PanelDesc {
        PanelDesc {
            monitor,
            layer: ShellLayer::Top,
            anchor: Anchor::TOP | Anchor::LEFT | Anchor::RIGHT,
            exclusive_zone: 30,
            desired_width: 0,
            desired_height: 30,
            margin: Margins::default(),
            keyboard_interactive: false,
        }
    }

    fn geom(a: &TestArranger, id: SurfaceId) -> Rect {
        a.surfaces[id].geom
    }

    #[test]
    fn exclusive_top_panel_carves_the_usable_area() {
        let mut a = engine();
        let mon = a.create_monitor("HDMI-A-1", Rect::new(0, 0, 1280, 720));
        let panel = a.create_panel(panel_desc(mon));
        a.dispatch(Event::PanelMapped(panel));
        assert_eq!(a.monitors[mon].usable, Rect::new(0, 30, 1280, 690));
        assert_eq!(a.panels[panel].geom, Rect::new(0, 0, 1280, 30));
    }

    #[test]
    fn master_stack_places_three_surfaces() {
        let mut a = engine();
        let mon = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        a.monitors[mon].mfact = 0.6;
        let s1 = map_surface(&mut a, "one");
        let s2 = map_surface(&mut a, "two");
        let s3 = map_surface(&mut a, "three");
        assert_eq!(geom(&a, s1), Rect::new(0, 0, 720, 800));
        assert_eq!(geom(&a, s2), Rect::new(720, 0, 480, 400));
        assert_eq!(geom(&a, s3), Rect::new(720, 400, 480, 400));
    }

    #[test]
    fn new_surface_takes_keyboard_focus() {
        let mut a = engine();
        a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        assert_eq!(a.seat.focus, KeyboardFocus::Surface(s1));
        let s2 = map_surface(&mut a, "two");
        assert_eq!(a.seat.focus, KeyboardFocus::Surface(s2));
        assert_eq!(a.orderings.focus()[0], s2);
    }

    #[test]
    fn cycle_focus_with_one_surface_is_a_noop() {
        let mut a = engine();
        a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        a.seat.clear();
        a.dispatch(Event::Command(Command::CycleFocus(StackDirection::Forward)));
        assert_eq!(a.seat.focus, KeyboardFocus::Surface(s1));
        assert!(a.seat.requests.is_empty());
    }

    #[test]
    fn cycle_focus_wraps_and_skips_invisible() {
        let mut a = engine();
        a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        let s2 = map_surface(&mut a, "two");
        let s3 = map_surface(&mut a, "three");
        a.surfaces[s2].hidden = true;
        a.focus(Some(s1), false);
        a.dispatch(Event::Command(Command::CycleFocus(StackDirection::Forward)));
        assert_eq!(a.seat.focus, KeyboardFocus::Surface(s3));
        a.dispatch(Event::Command(Command::CycleFocus(StackDirection::Forward)));
        assert_eq!(a.seat.focus, KeyboardFocus::Surface(s1));
    }

    #[test]
    fn zoom_promotes_the_focused_surface_to_master() {
        let mut a = engine();
        let mon = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        let s2 = map_surface(&mut a, "two");
        a.focus(Some(s2), false);
        a.dispatch(Event::Command(Command::Zoom));
        assert_eq!(a.orderings.tiling()[0], s2);
        // zooming the master swaps in the next tiled surface
        a.dispatch(Event::Command(Command::Zoom));
        assert_eq!(a.orderings.tiling()[0], s1);
        let usable = a.monitors[mon].usable;
        assert_eq!(geom(&a, s1).x, usable.x);
    }

    #[test]
    fn fullscreen_suppresses_the_tiling_pass() {
        let mut a = engine();
        let mon = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        let s2 = map_surface(&mut a, "two");
        a.focus(Some(s1), false);
        a.dispatch(Event::Command(Command::ToggleFullscreen));
        assert_eq!(geom(&a, s1), Rect::new(0, 0, 1200, 800));
        let before = geom(&a, s2);
        a.arrange(mon);
        assert_eq!(geom(&a, s2), before);
        a.dispatch(Event::Command(Command::ToggleFullscreen));
        assert!(!a.surfaces[s1].fullscreen);
        assert_eq!(geom(&a, s2), Rect::new(660, 0, 540, 800));
    }

    #[test]
    fn stale_resize_ack_does_not_settle() {
        let mut a = engine();
        let mon = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        let stale = a.compositor.last_serial_for(s1).expect("first resize");
        // the second map retiles s1 and supersedes the first serial
        map_surface(&mut a, "two");
        a.dispatch(Event::SurfaceCommitted {
            surface: s1,
            size: (0, 0),
            ack: Some(stale),
        });
        assert!(!a.surfaces[s1].resize.settled());
        a.compositor.clear();
        a.dispatch(Event::FrameCompleted(mon));
        assert!(a
            .compositor
            .requests
            .iter()
            .any(|r| matches!(r, CompositorRequest::SendFrameDone(_))));
        assert!(!a
            .compositor
            .requests
            .iter()
            .any(|r| matches!(r, CompositorRequest::CommitOutput(_))));
    }

    #[test]
    fn settled_monitor_commits_on_frame() {
        let mut a = engine();
        let mon = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        let serial = a.compositor.last_serial_for(s1).expect("resize issued");
        a.dispatch(Event::SurfaceCommitted {
            surface: s1,
            size: (0, 0),
            ack: Some(serial),
        });
        a.compositor.clear();
        a.dispatch(Event::FrameCompleted(mon));
        assert_eq!(a.compositor.requests, vec![CompositorRequest::CommitOutput(mon)]);
        assert!(!a.monitors[mon].moved);
    }

    #[test]
    fn removing_a_monitor_reassigns_surfaces_with_tags() {
        let mut a = engine();
        let m1 = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let m2 = a.create_monitor("DP-2", Rect::new(1200, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        a.surfaces[s1].tags = TagMask::single(4);
        a.dispatch(Event::OutputRemoved(m1));
        assert_eq!(a.surfaces[s1].monitor, Some(m2));
        assert_eq!(a.surfaces[s1].tags, TagMask::single(4));
        assert_eq!(a.selmon, Some(m2));
        assert!(a.monitors.get(m1).is_none());
    }

    #[test]
    fn orphaned_surfaces_are_adopted_when_a_monitor_returns() {
        let mut a = engine();
        let m1 = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        a.surfaces[s1].tags = TagMask::single(4);
        a.dispatch(Event::OutputRemoved(m1));
        assert_eq!(a.surfaces[s1].monitor, None);
        let m2 = a.create_monitor("DP-2", Rect::new(0, 0, 1280, 720));
        assert_eq!(a.surfaces[s1].monitor, Some(m2));
        assert_eq!(a.surfaces[s1].tags, TagMask::single(4));
    }

    #[test]
    fn view_switches_tagsets_and_refocuses() {
        let mut a = engine();
        a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        a.dispatch(Event::Command(Command::View(TagMask::single(2))));
        assert_eq!(a.seat.focus, KeyboardFocus::None);
        let s2 = map_surface(&mut a, "two");
        assert_eq!(a.surfaces[s2].tags, TagMask::single(2));
        // back to the previous view
        a.dispatch(Event::Command(Command::View(TagMask::new(0))));
        assert_eq!(a.seat.focus, KeyboardFocus::Surface(s1));
    }

    #[test]
    fn tag_moves_surface_out_of_the_current_view() {
        let mut a = engine();
        let mon = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        let s2 = map_surface(&mut a, "two");
        a.dispatch(Event::Command(Command::Tag(TagMask::single(3))));
        assert_eq!(a.surfaces[s2].tags, TagMask::single(3));
        assert_eq!(a.seat.focus, KeyboardFocus::Surface(s1));
        // the remaining surface takes the full usable area
        assert_eq!(geom(&a, s1), a.monitors[mon].usable);
    }

    #[test]
    fn keyboard_interactive_panel_steals_and_returns_focus() {
        let mut a = engine();
        let mon = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        let panel = a.create_panel(PanelDesc {
            layer: ShellLayer::Overlay,
            anchor: Anchor::TOP | Anchor::LEFT | Anchor::RIGHT,
            exclusive_zone: 0,
            desired_height: 40,
            keyboard_interactive: true,
            ..panel_desc(mon)
        });
        a.dispatch(Event::PanelMapped(panel));
        assert_eq!(a.seat.focus, KeyboardFocus::Panel(panel));
        // surface focus requests are deferred while the panel holds the keyboard
        a.focus(Some(s1), false);
        assert_eq!(a.seat.focus, KeyboardFocus::Panel(panel));
        a.dispatch(Event::PanelUnmapped(panel));
        assert_eq!(a.seat.focus, KeyboardFocus::Surface(s1));
    }

    #[test]
    fn monocle_stacks_everything_on_the_usable_area() {
        let mut a = engine();
        let mon = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        let s2 = map_surface(&mut a, "two");
        a.dispatch(Event::Command(Command::NextLayout));
        let usable = a.monitors[mon].usable;
        assert_eq!(geom(&a, s1), usable);
        assert_eq!(geom(&a, s2), usable);
    }

    #[test]
    fn rotate_stack_shifts_tiling_order() {
        let mut a = engine();
        a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        let s2 = map_surface(&mut a, "two");
        let s3 = map_surface(&mut a, "three");
        a.dispatch(Event::Command(Command::RotateStack(StackDirection::Forward)));
        assert_eq!(a.orderings.tiling(), &[s2, s3, s1]);
        a.dispatch(Event::Command(Command::RotateStack(StackDirection::Backward)));
        assert_eq!(a.orderings.tiling(), &[s1, s2, s3]);
    }

    #[test]
    fn usable_area_stays_within_the_output() {
        let mut a = engine();
        let mon = a.create_monitor("DP-1", Rect::new(100, 50, 1280, 720));
        for (anchor, zone) in [
            (Anchor::TOP | Anchor::LEFT | Anchor::RIGHT, 30),
            (Anchor::BOTTOM, 24),
            (Anchor::LEFT, 64),
        ] {
            let p = a.create_panel(PanelDesc {
                anchor,
                exclusive_zone: zone,
                desired_width: 64,
                desired_height: 30,
                ..panel_desc(mon)
            });
            a.dispatch(Event::PanelMapped(p));
        }
        let m = &a.monitors[mon];
        assert_eq!(
            m.usable.intersection(&m.area),
            Some(m.usable),
            "usable must be contained in the output area"
        );
        assert_eq!(m.usable, Rect::new(164, 80, 1216, 666));
    }

    #[test]
    fn degenerate_panel_is_destroyed() {
        let mut a = engine();
        let mon = a.create_monitor("DP-1", Rect::new(0, 0, 1280, 720));
        let p = a.create_panel(PanelDesc {
            desired_height: 0,
            exclusive_zone: 0,
            anchor: Anchor::TOP,
            ..panel_desc(mon)
        });
        a.dispatch(Event::PanelMapped(p));
        assert!(a.panels.get(p).is_none());
        assert!(a
            .compositor
            .requests
            .contains(&CompositorRequest::DestroyPanel(p)));
    }

    #[test]
    fn hidden_surface_leaves_the_tiling_pass() {
        let mut a = engine();
        let mon = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        let s2 = map_surface(&mut a, "two");
        a.focus(Some(s2), false);
        a.dispatch(Event::Command(Command::SetHidden(true)));
        assert!(a.surfaces[s2].hidden);
        assert_eq!(a.seat.focus, KeyboardFocus::Surface(s1));
        assert_eq!(geom(&a, s1), a.monitors[mon].usable);
        a.dispatch(Event::Command(Command::SetHidden(false)));
        assert!(!a.surfaces[s2].hidden);
    }

    #[test]
    fn focus_monitor_cycles_enabled_monitors() {
        let mut a = engine();
        let m1 = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let m2 = a.create_monitor("DP-2", Rect::new(1200, 0, 1200, 800));
        assert_eq!(a.selmon, Some(m1));
        a.dispatch(Event::Command(Command::FocusMonitor(StackDirection::Forward)));
        assert_eq!(a.selmon, Some(m2));
        a.dispatch(Event::Command(Command::FocusMonitor(StackDirection::Forward)));
        assert_eq!(a.selmon, Some(m1));
    }

    #[test]
    fn tag_monitor_moves_surface_and_adopts_target_tagset() {
        let mut a = engine();
        a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let m2 = a.create_monitor("DP-2", Rect::new(1200, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        a.monitors[m2].view(TagMask::single(5));
        a.dispatch(Event::Command(Command::TagMonitor(StackDirection::Forward)));
        assert_eq!(a.surfaces[s1].monitor, Some(m2));
        assert_eq!(a.surfaces[s1].tags, TagMask::single(5));
        // bounded into the new output
        assert!(a.surfaces[s1].geom.x >= 1200);
    }

    #[test]
    fn floating_geometry_survives_a_monitor_transfer() {
        let mut a = engine();
        a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let m2 = a.create_monitor("DP-2", Rect::new(1200, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        a.dispatch(Event::Command(Command::ToggleFloating));
        a.dispatch(Event::SurfaceCommitted {
            surface: s1,
            size: (600, 500),
            ack: None,
        });
        assert_eq!(geom(&a, s1).width, 600);
        a.dispatch(Event::Command(Command::TagMonitor(StackDirection::Forward)));
        assert_eq!(a.surfaces[s1].monitor, Some(m2));
        assert_eq!((geom(&a, s1).width, geom(&a, s1).height), (600, 500));
    }

    #[test]
    fn close_focused_sends_a_close_request() {
        let mut a = engine();
        a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        a.dispatch(Event::Command(Command::CloseFocused));
        assert!(a
            .compositor
            .requests
            .contains(&CompositorRequest::SendClose(s1)));
    }

    #[test]
    fn unmap_refocuses_the_next_surface() {
        let mut a = engine();
        let mon = a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        let s2 = map_surface(&mut a, "two");
        a.dispatch(Event::SurfaceUnmapped(s2));
        assert_eq!(a.seat.focus, KeyboardFocus::Surface(s1));
        assert_eq!(geom(&a, s1), a.monitors[mon].usable);
        assert!(a.surfaces.get(s2).is_none());
    }

    #[test]
    fn urgency_is_set_and_cleared_by_focus() {
        let mut a = engine();
        a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        map_surface(&mut a, "two");
        a.dispatch(Event::ActivationRequested(s1));
        assert!(a.surfaces[s1].urgent);
        a.focus(Some(s1), true);
        assert!(!a.surfaces[s1].urgent);
    }

    #[test]
    fn idle_inhibition_follows_visibility() {
        let mut a = engine();
        a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        a.dispatch(Event::IdleInhibitorChanged(s1, true));
        assert!(!a.seat.idle_enabled);
        // moving the surface out of view releases the inhibition
        a.dispatch(Event::Command(Command::Tag(TagMask::single(6))));
        a.refresh_idle_inhibitors();
        assert!(a.seat.idle_enabled);
    }

    #[test]
    fn duplicate_constraint_for_a_surface_is_rejected() {
        let mut a = engine();
        a.create_monitor("DP-1", Rect::new(0, 0, 1200, 800));
        let s1 = map_surface(&mut a, "one");
        a.create_constraint(s1, ConstraintMode::Confined, Region::new())
            .expect("first constraint");
        let err = a
            .create_constraint(s1, ConstraintMode::Locked, Region::new())
            .expect_err("second constraint");
        assert!(matches!(err, ArrangeError::ConstraintExists));
    }
}
