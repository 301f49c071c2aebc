//! Domain layer: harness steps, reports and probe rendering
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod probe;

pub use entities::*;
pub use error::DomainError;
pub use probe::{drive_folder_id, render_probe, scratch_target_name, ProbeSource};
