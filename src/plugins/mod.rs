//! Admin and reporting subsystems around the moderation store.

pub mod filters;
pub mod modlog;
pub mod settings;
pub mod stats;
pub mod warnings;
