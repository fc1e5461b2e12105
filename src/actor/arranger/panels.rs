//! Panel placement and exclusive-zone accounting.

use tracing::{debug, warn};

use crate::model::monitor::MonitorId;
use crate::model::panel::{Anchor, Margins, PanelDesc, PanelId, PanelSurface, ShellLayer};
use crate::sys::compositor::Compositor;
use crate::sys::geometry::Rect;
use crate::sys::seat::{KeyboardFocus, Seat};

use super::Arranger;

impl<C: Compositor, S: Seat> Arranger<C, S> {
    /// Usable area before any panel reservations: the output minus the
    /// built-in status-bar strip at the top.
    pub(crate) fn initial_usable(&self, area: Rect) -> Rect {
        let bar = self.config.bar_height.clamp(0, area.height);
        Rect::new(area.x, area.y + bar, area.width, area.height - bar)
    }

    /// Recompute every panel geometry on a monitor and the usable area they
    /// leave behind. Space-reserving panels are placed first, walking the
    /// shell layers from the most overlay-like down and carving each
    /// reservation out of the remaining usable area. Non-reserving panels
    /// are then placed inside whatever is left.
    pub(crate) fn arrange_panels(&mut self, mid: MonitorId) {
        let Some(monitor) = self.monitors.get(mid) else {
            return;
        };
        if !monitor.enabled {
            return;
        }
        let area = monitor.area;
        let mut usable = self.initial_usable(area);
        let order = self.panel_order.clone();
        let mut dead: Vec<PanelId> = Vec::new();

        for layer in ShellLayer::TOP_DOWN {
            for &pid in &order {
                let Some(panel) = self.panels.get(pid) else {
                    continue;
                };
                if panel.monitor != mid
                    || panel.layer != layer
                    || !panel.mapped
                    || !panel.reserves_space()
                {
                    continue;
                }
                let geom = place_panel(panel, usable);
                if geom.is_degenerate() {
                    dead.push(pid);
                    continue;
                }
                apply_exclusive(&mut usable, panel.anchor, panel.exclusive_zone, panel.margin);
                self.configure_panel_geom(pid, geom);
            }
        }

        let usable_changed = self.monitors.get(mid).is_some_and(|m| m.usable != usable);
        if usable_changed {
            debug!(?mid, ?usable, "usable area changed");
            if let Some(m) = self.monitors.get_mut(mid) {
                m.usable = usable;
            }
            self.arrange(mid);
        }

        for layer in ShellLayer::TOP_DOWN {
            for &pid in &order {
                let Some(panel) = self.panels.get(pid) else {
                    continue;
                };
                if panel.monitor != mid
                    || panel.layer != layer
                    || !panel.mapped
                    || panel.reserves_space()
                {
                    continue;
                }
                // a negative reservation opts out of other panels' zones
                let bounds = if panel.exclusive_zone < 0 { area } else { usable };
                let geom = place_panel(panel, bounds);
                if geom.is_degenerate() {
                    dead.push(pid);
                    continue;
                }
                self.configure_panel_geom(pid, geom);
            }
        }

        for pid in dead {
            warn!(?pid, "panel committed a degenerate geometry, destroying it");
            self.compositor.destroy_panel(pid);
            self.remove_panel_record(pid);
        }
        self.refresh_exclusive_focus();
    }

    fn configure_panel_geom(&mut self, pid: PanelId, geom: Rect) {
        let Some(p) = self.panels.get_mut(pid) else {
            return;
        };
        if p.geom == geom {
            return;
        }
        p.geom = geom;
        self.compositor.configure_panel(pid, geom);
    }

    // exclusive_focus is left alone here; refresh_exclusive_focus notices
    // the stale id and hands the keyboard back
    pub(crate) fn remove_panel_record(&mut self, pid: PanelId) {
        self.panels.remove(pid);
        self.panel_order.retain(|&p| p != pid);
    }

    /// Hand the keyboard to the topmost mapped keyboard-interactive panel on
    /// the overlay or top layer, or give it back to the surfaces when none
    /// remains.
    pub(crate) fn refresh_exclusive_focus(&mut self) {
        let grab = [ShellLayer::Overlay, ShellLayer::Top].iter().find_map(|&layer| {
            self.panel_order.iter().rev().copied().find(|&pid| {
                self.panels.get(pid).is_some_and(|p| {
                    p.mapped
                        && p.keyboard_interactive
                        && p.layer == layer
                        && self.monitors.get(p.monitor).is_some_and(|m| m.enabled)
                })
            })
        });
        match grab {
            Some(pid) => {
                if self.exclusive_focus != Some(pid) {
                    self.focus(None, false);
                    self.exclusive_focus = Some(pid);
                    self.seat.keyboard_enter_panel(pid);
                } else if self.seat.keyboard_focus() != KeyboardFocus::Panel(pid) {
                    self.seat.keyboard_enter_panel(pid);
                }
            }
            None => {
                if self.exclusive_focus.take().is_some() {
                    let top = self.selmon.and_then(|m| self.focus_top(m));
                    self.focus(top, true);
                }
            }
        }
    }

    // ---- panel events --------------------------------------------------

    pub(crate) fn handle_panel_mapped(&mut self, pid: PanelId) {
        let Some(p) = self.panels.get_mut(pid) else {
            warn!(?pid, "map event for unknown panel");
            return;
        };
        p.mapped = true;
        let mid = p.monitor;
        self.arrange_panels(mid);
    }

    pub(crate) fn handle_panel_unmapped(&mut self, pid: PanelId) {
        let Some(p) = self.panels.get_mut(pid) else {
            return;
        };
        p.mapped = false;
        let mid = p.monitor;
        self.arrange_panels(mid);
    }

    pub(crate) fn handle_panel_destroyed(&mut self, pid: PanelId) {
        let Some(p) = self.panels.get(pid) else {
            return;
        };
        let mid = p.monitor;
        self.remove_panel_record(pid);
        self.arrange_panels(mid);
    }

    pub(crate) fn handle_panel_committed(&mut self, pid: PanelId, desc: PanelDesc) {
        let Some(p) = self.panels.get_mut(pid) else {
            return;
        };
        p.update(desc);
        let mid = p.monitor;
        self.arrange_panels(mid);
    }
}

/// Compute a panel's geometry within the given bounds from its anchors,
/// desired size, and margins. Double-anchoring an axis with a zero desired
/// size stretches along it; double-anchoring with an explicit size centers.
fn place_panel(panel: &PanelSurface, bounds: Rect) -> Rect {
    let a = panel.anchor;
    let m = panel.margin;
    let avail_w = bounds.width - m.left - m.right;
    let avail_h = bounds.height - m.top - m.bottom;
    let w = if a.contains(Anchor::BOTH_HORIZ) && panel.desired_width == 0 {
        avail_w
    } else {
        panel.desired_width
    };
    let h = if a.contains(Anchor::BOTH_VERT) && panel.desired_height == 0 {
        avail_h
    } else {
        panel.desired_height
    };
    let x = if a.contains(Anchor::BOTH_HORIZ) {
        bounds.x + m.left + (avail_w - w) / 2
    } else if a.contains(Anchor::LEFT) {
        bounds.x + m.left
    } else if a.contains(Anchor::RIGHT) {
        bounds.right() - m.right - w
    } else {
        // margins only bind to anchored edges
        bounds.x + (bounds.width - w) / 2
    };
    let y = if a.contains(Anchor::BOTH_VERT) {
        bounds.y + m.top + (avail_h - h) / 2
    } else if a.contains(Anchor::TOP) {
        bounds.y + m.top
    } else if a.contains(Anchor::BOTTOM) {
        bounds.bottom() - m.bottom - h
    } else {
        bounds.y + (bounds.height - h) / 2
    };
    Rect::new(x, y, w, h)
}

/// Carve a panel's reservation out of the usable area. A reservation binds
/// to an edge only when the panel is anchored to exactly that edge, alone or
/// together with both perpendicular edges; the first matching edge wins.
fn apply_exclusive(usable: &mut Rect, anchor: Anchor, zone: i32, margin: Margins) {
    if zone <= 0 {
        return;
    }
    let amount = zone + margin.top;
    if (anchor == Anchor::TOP || anchor == Anchor::TOP | Anchor::BOTH_HORIZ) && amount > 0 {
        usable.y += amount;
        usable.height -= amount;
        return;
    }
    let amount = zone + margin.bottom;
    if (anchor == Anchor::BOTTOM || anchor == Anchor::BOTTOM | Anchor::BOTH_HORIZ) && amount > 0 {
        usable.height -= amount;
        return;
    }
    let amount = zone + margin.left;
    if (anchor == Anchor::LEFT || anchor == Anchor::LEFT | Anchor::BOTH_VERT) && amount > 0 {
        usable.x += amount;
        usable.width -= amount;
        return;
    }
    let amount = zone + margin.right;
    if (anchor == Anchor::RIGHT || anchor == Anchor::RIGHT | Anchor::BOTH_VERT) && amount > 0 {
        usable.width -= amount;
    }
}
