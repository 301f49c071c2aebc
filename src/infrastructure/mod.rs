//! Infrastructure layer: process and filesystem boundaries, DI container

pub mod di;
pub mod error;
pub mod traits;

pub use error::InfraError;
