//! Engine configuration and window rules.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::layout_engine::Orientation;
use crate::model::tags::{MAX_TAGS, TagMask};
use crate::sys::geometry::Rect;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A first-map rule: matched against a surface's application id and title,
/// both by substring. Empty patterns match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    pub app_id: Option<String>,
    pub title: Option<String>,
    /// Tag bits to assign; zero leaves the monitor's current tagset.
    pub tags: u32,
    pub floating: bool,
    /// Target monitor index in monitor-list order.
    pub monitor: Option<usize>,
    /// Explicit floating geometry, monitor-relative.
    pub geometry: Option<Rect>,
}

/// The outcome of rule matching for one surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleMatch {
    pub tags: TagMask,
    pub floating: bool,
    pub monitor: Option<usize>,
    pub geometry: Option<Rect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pixels kept between tiled surfaces and the usable-area edge.
    pub gap: i32,
    /// Fixed strip reserved for the status bar at the top of every monitor.
    pub bar_height: i32,
    pub border_width: i32,
    pub mfact: f32,
    pub nmaster: u32,
    pub orientation: Orientation,
    pub tag_count: u32,
    /// Refuse to cycle focus away from a fullscreen surface.
    pub lock_fullscreen: bool,
    pub rules: Vec<Rule>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gap: 0,
            bar_height: 30,
            border_width: 1,
            mfact: 0.55,
            nmaster: 1,
            orientation: Orientation::Horizontal,
            tag_count: 9,
            lock_fullscreen: true,
            rules: Vec::new(),
        }
    }
}

impl Config {
    /// Load from the given path, or the default location, or fall back to
    /// defaults when no file exists.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Config::default().sanitized()),
            },
        };
        let raw = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&raw)?;
        Ok(config.sanitized())
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("strata").join("config.toml"))
    }

    /// Clamp out-of-range values rather than failing startup.
    pub fn sanitized(mut self) -> Config {
        if self.tag_count == 0 || self.tag_count > MAX_TAGS {
            warn!(tag_count = self.tag_count, "tag_count out of range, clamping");
            self.tag_count = self.tag_count.clamp(1, MAX_TAGS);
        }
        if !(0.1..=0.9).contains(&self.mfact) {
            warn!(mfact = self.mfact, "mfact out of range, using default");
            self.mfact = 0.55;
        }
        if self.gap < 0 {
            self.gap = 0;
        }
        if self.bar_height < 0 {
            self.bar_height = 0;
        }
        self
    }

    pub fn valid_tags(&self) -> TagMask {
        TagMask::all(self.tag_count)
    }

    /// Pure rule matching, applied once per surface at first map. Later
    /// rules override floating/monitor/geometry; tag bits accumulate.
    pub fn rule_for(&self, app_id: &str, title: &str) -> RuleMatch {
        let mut out = RuleMatch::default();
        for rule in &self.rules {
            let title_ok = rule.title.as_deref().is_none_or(|t| title.contains(t));
            let app_ok = rule.app_id.as_deref().is_none_or(|a| app_id.contains(a));
            if !(title_ok && app_ok) {
                continue;
            }
            out.tags = out.tags.union(TagMask::new(rule.tags));
            out.floating = rule.floating;
            if rule.monitor.is_some() {
                out.monitor = rule.monitor;
            }
            if rule.geometry.is_some() {
                out.geometry = rule.geometry;
            }
        }
        out.tags = out.tags.clamped(self.valid_tags());
        out
    }
}
