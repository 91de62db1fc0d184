// Opacity shared type definitions
// Each submodule defines types used across the application.

pub mod bookmark;
pub mod certificate;
pub mod errors;
pub mod history;
pub mod navigation;
pub mod privacy;
pub mod settings;
pub mod tab;
pub mod window;
