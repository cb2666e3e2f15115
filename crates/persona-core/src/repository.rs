//! Repository trait re-exports.
//!
//! This module provides centralized access to all repository traits.

// Re-export PersonaRepository from persona module
pub use crate::persona::PersonaRepository;
