//! Status feed for external bars and scripts.
//!
//! Each state change emits a batch of per-monitor facts over a channel; the
//! `Display` form is one line per fact, `<monitor> <kind> <values...>`, in
//! the style of a wm status pipe.

use std::fmt;

use crossbeam_channel::{Receiver, unbounded};
use tracing::trace;

use crate::sys::compositor::Compositor;
use crate::sys::seat::{KeyboardFocus, Seat};

use super::Arranger;

#[derive(Debug, Clone, PartialEq)]
pub enum StatusFact {
    /// Title of the focused surface, empty when none.
    Title(String),
    Fullscreen(Option<bool>),
    Floating(Option<bool>),
    /// Whether this is the selected monitor.
    Selmon(bool),
    /// Tag bitmasks: occupied by any surface, selected for viewing, held by
    /// the focused surface, and urgent.
    Tags {
        occupied: u32,
        selected: u32,
        focused: u32,
        urgent: u32,
    },
    Layout(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub monitor: String,
    pub fact: StatusFact,
}

fn flag(v: Option<bool>) -> &'static str {
    match v {
        Some(true) => "1",
        Some(false) => "0",
        None => "",
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fact {
            StatusFact::Title(title) => write!(f, "{} title {}", self.monitor, title),
            StatusFact::Fullscreen(v) => write!(f, "{} fullscreen {}", self.monitor, flag(*v)),
            StatusFact::Floating(v) => write!(f, "{} floating {}", self.monitor, flag(*v)),
            StatusFact::Selmon(v) => write!(f, "{} selmon {}", self.monitor, u8::from(*v)),
            StatusFact::Tags {
                occupied,
                selected,
                focused,
                urgent,
            } => write!(
                f,
                "{} tags {} {} {} {}",
                self.monitor, occupied, selected, focused, urgent
            ),
            StatusFact::Layout(symbol) => write!(f, "{} layout {}", self.monitor, symbol),
        }
    }
}

impl<C: Compositor, S: Seat> Arranger<C, S> {
    /// Open the status feed. Only one receiver is supported; a dropped
    /// receiver silently closes the feed.
    pub fn status_channel(&mut self) -> Receiver<StatusLine> {
        let (tx, rx) = unbounded();
        self.status = Some(tx);
        rx
    }

    /// Emit the full set of facts for every monitor, in monitor order.
    pub(crate) fn print_status(&mut self) {
        let Some(tx) = self.status.clone() else {
            return;
        };
        for &mid in &self.monitor_order.clone() {
            let Some(m) = self.monitors.get(mid) else {
                continue;
            };
            let name = m.name.clone();
            let selected = m.tags().bits();
            let layout = m.layout().to_string();
            let selmon = self.selmon == Some(mid);

            let sel = match self.seat.keyboard_focus() {
                KeyboardFocus::Surface(s)
                    if self.surfaces.get(s).is_some_and(|c| c.monitor == Some(mid)) =>
                {
                    Some(s)
                }
                _ => None,
            };
            let mut occupied = 0u32;
            let mut urgent = 0u32;
            for (_, s) in self
                .surfaces
                .iter()
                .filter(|(_, s)| s.monitor == Some(mid) && s.mapped)
            {
                occupied |= s.tags.bits();
                if s.urgent {
                    urgent |= s.tags.bits();
                }
            }
            let (title, fullscreen, floating, focused) =
                match sel.and_then(|s| self.surfaces.get(s)) {
                    Some(s) => (
                        s.title.clone(),
                        Some(s.fullscreen),
                        Some(s.floating),
                        s.tags.bits(),
                    ),
                    None => (String::new(), None, None, 0),
                };

            let facts = [
                StatusFact::Title(title),
                StatusFact::Fullscreen(fullscreen),
                StatusFact::Floating(floating),
                StatusFact::Selmon(selmon),
                StatusFact::Tags {
                    occupied,
                    selected,
                    focused,
                    urgent,
                },
                StatusFact::Layout(layout),
            ];
            for fact in facts {
                let line = StatusLine {
                    monitor: name.clone(),
                    fact,
                };
                trace!(%line, "status");
                if tx.send(line).is_err() {
                    self.status = None;
                    return;
                }
            }
        }
    }
}
