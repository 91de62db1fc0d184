//! Opacity: the core of a desktop browser shell.
//!
//! Covers the cross-window tab drag protocol and the per-tab navigation state
//! machine. Rendering is left to a [`surface::RenderingSurface`] implementation
//! supplied by the presentation layer.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod services;
pub mod surface;
pub mod types;
