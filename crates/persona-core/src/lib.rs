pub mod config;
pub mod error;
pub mod persona;
pub mod repository;

// Re-export common error type
pub use error::PersonaError;
