//! Core algorithms – fold geometry, page partitions, and the turn engine.
//!
//! Nothing in this module depends on any TUI or rendering crate.
//! The UI reaches in through the [`render::RenderSink`] trait and owns
//! everything on the drawing side of it.

pub mod animation;
pub mod calc;
pub mod collection;
pub mod flip;
pub mod geom;
pub mod page;
pub mod render;
pub mod settings;
