//! Headless trace replay.
//!
//! A trace is a JSON-lines file of [`TraceStep`]s. Replaying one drives a
//! fresh [`Arranger`] over the recording collaborators and prints every
//! status line it emits, which makes arrangement behavior reproducible from
//! a bug report without a compositor session.

use std::io::BufRead;
use std::path::Path;

use anyhow::Context;
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::actor::arranger::{Arranger, Command, Event, StatusLine};
use crate::common::config::Config;
use crate::model::monitor::MonitorId;
use crate::model::panel::{Anchor, Margins, PanelDesc, PanelId, ShellLayer};
use crate::model::surface::{SurfaceDesc, SurfaceId};
use crate::sys::compositor::RecordingCompositor;
use crate::sys::geometry::Rect;
use crate::sys::seat::RecordingSeat;

/// One line of a trace file. Objects are referred to by creation index, so
/// traces can be written by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TraceStep {
    AddMonitor {
        name: String,
        area: Rect,
    },
    ResizeMonitor {
        monitor: usize,
        area: Rect,
    },
    ToggleMonitor {
        monitor: usize,
        enabled: bool,
    },
    RemoveMonitor {
        monitor: usize,
    },
    MapSurface {
        desc: SurfaceDesc,
    },
    UnmapSurface {
        surface: usize,
    },
    /// Commit with the given content size; `ack_latest` acknowledges the
    /// most recent resize serial issued to the surface.
    CommitSurface {
        surface: usize,
        width: i32,
        height: i32,
        #[serde(default)]
        ack_latest: bool,
    },
    AddPanel {
        monitor: usize,
        layer: ShellLayer,
        anchor: Anchor,
        #[serde(default)]
        exclusive_zone: i32,
        #[serde(default)]
        width: i32,
        #[serde(default)]
        height: i32,
        #[serde(default)]
        margin: Margins,
        #[serde(default)]
        keyboard_interactive: bool,
    },
    RemovePanel {
        panel: usize,
    },
    FrameCompleted {
        monitor: usize,
    },
    Motion {
        dx: f64,
        dy: f64,
    },
    Command {
        command: Command,
    },
}

pub struct Player {
    pub arranger: Arranger<RecordingCompositor, RecordingSeat>,
    status: Receiver<StatusLine>,
    monitors: Vec<MonitorId>,
    surfaces: Vec<SurfaceId>,
    panels: Vec<PanelId>,
}

impl Player {
    pub fn new(config: Config) -> Self {
        let mut arranger = Arranger::new(config, RecordingCompositor::new(), RecordingSeat::new());
        let status = arranger.status_channel();
        Player {
            arranger,
            status,
            monitors: Vec::new(),
            surfaces: Vec::new(),
            panels: Vec::new(),
        }
    }

    fn monitor(&self, index: usize) -> anyhow::Result<MonitorId> {
        self.monitors
            .get(index)
            .copied()
            .with_context(|| format!("monitor index {index} out of range"))
    }

    fn surface(&self, index: usize) -> anyhow::Result<SurfaceId> {
        self.surfaces
            .get(index)
            .copied()
            .with_context(|| format!("surface index {index} out of range"))
    }

    fn panel(&self, index: usize) -> anyhow::Result<PanelId> {
        self.panels
            .get(index)
            .copied()
            .with_context(|| format!("panel index {index} out of range"))
    }

    pub fn step(&mut self, step: TraceStep) -> anyhow::Result<()> {
        match step {
            TraceStep::AddMonitor { name, area } => {
                let id = self.arranger.create_monitor(name, area);
                self.monitors.push(id);
            }
            TraceStep::ResizeMonitor { monitor, area } => {
                let mid = self.monitor(monitor)?;
                self.arranger
                    .dispatch(Event::OutputLayoutChanged(vec![(mid, area)]));
            }
            TraceStep::ToggleMonitor { monitor, enabled } => {
                let mid = self.monitor(monitor)?;
                self.arranger.dispatch(Event::OutputToggled(mid, enabled));
            }
            TraceStep::RemoveMonitor { monitor } => {
                let mid = self.monitor(monitor)?;
                self.arranger.dispatch(Event::OutputRemoved(mid));
            }
            TraceStep::MapSurface { desc } => {
                let id = self.arranger.create_surface(desc);
                self.surfaces.push(id);
                self.arranger.dispatch(Event::SurfaceMapped(id));
            }
            TraceStep::UnmapSurface { surface } => {
                let id = self.surface(surface)?;
                self.arranger.dispatch(Event::SurfaceUnmapped(id));
            }
            TraceStep::CommitSurface {
                surface,
                width,
                height,
                ack_latest,
            } => {
                let id = self.surface(surface)?;
                let ack = if ack_latest {
                    self.arranger.compositor.last_serial_for(id)
                } else {
                    None
                };
                self.arranger.dispatch(Event::SurfaceCommitted {
                    surface: id,
                    size: (width, height),
                    ack,
                });
            }
            TraceStep::AddPanel {
                monitor,
                layer,
                anchor,
                exclusive_zone,
                width,
                height,
                margin,
                keyboard_interactive,
            } => {
                let mid = self.monitor(monitor)?;
                let id = self.arranger.create_panel(PanelDesc {
                    monitor: mid,
                    layer,
                    anchor,
                    exclusive_zone,
                    desired_width: width,
                    desired_height: height,
                    margin,
                    keyboard_interactive,
                });
                self.panels.push(id);
                self.arranger.dispatch(Event::PanelMapped(id));
            }
            TraceStep::RemovePanel { panel } => {
                let id = self.panel(panel)?;
                self.arranger.dispatch(Event::PanelDestroyed(id));
            }
            TraceStep::FrameCompleted { monitor } => {
                let mid = self.monitor(monitor)?;
                self.arranger.dispatch(Event::FrameCompleted(mid));
            }
            TraceStep::Motion { dx, dy } => {
                self.arranger.dispatch(Event::PointerMotion { dx, dy });
            }
            TraceStep::Command { command } => {
                self.arranger.dispatch(Event::Command(command));
            }
        }
        Ok(())
    }

    /// Status lines emitted since the last drain.
    pub fn drain_status(&mut self) -> Vec<StatusLine> {
        self.status.try_iter().collect()
    }
}

/// Replay a trace file, printing status output to stdout.
pub fn run_file(path: &Path, config: Config) -> anyhow::Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open trace {}", path.display()))?;
    let reader = std::io::BufReader::new(file);
    let mut player = Player::new(config);
    let mut steps = 0usize;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step: TraceStep = serde_json::from_str(trimmed)
            .with_context(|| format!("bad trace step on line {}", lineno + 1))?;
        player.step(step)?;
        steps += 1;
        for status in player.drain_status() {
            println!("{status}");
        }
    }
    info!(steps, "trace replayed");
    Ok(())
}
