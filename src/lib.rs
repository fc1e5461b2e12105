//! Policy layer of a tiling window manager.
//!
//! This crate decides where every managed surface goes: monitor assignment,
//! workspace tags, panel exclusion zones, tiling layouts, focus and stacking
//! order, and pointer confinement. The compositor runtime that owns the
//! scene graph, protocol marshalling, and rendering is an external
//! collaborator reached through the narrow traits in [`sys`].

pub mod actor;
pub mod common;
pub mod layout_engine;
pub mod model;
pub mod sys;
