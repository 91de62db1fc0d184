// Opacity services
// Engines the owner drives: navigation, certificates, page metadata, content
// blocking, settings, localization and persistence.

pub mod certificate_validator;
pub mod content_blocker;
pub mod error_classifier;
pub mod favicon_loader;
pub mod localization_engine;
pub mod metadata_joiner;
pub mod navigation_controller;
pub mod persistence;
pub mod settings_engine;
