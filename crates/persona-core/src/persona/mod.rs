//! Persona domain module.
//!
//! This module contains the persona domain model, request types, the
//! repository interface, and the system template presets.
//!
//! # Module Structure
//!
//! - `model`: Core persona domain models (`Persona`, `PersonaKind`, `PersonaSource`)
//! - `repository`: Repository trait for template and instance persistence
//! - `request`: Request models and field validation
//! - `preset`: Default system templates
//!
//! # Usage
//!
//! ```ignore
//! use persona_core::persona::{Persona, PersonaRepository, get_default_templates};
//! ```

mod model;
mod preset;
mod repository;
pub mod request;

// Re-export public API
pub use model::{
    Persona, PersonaConfig, PersonaKind, PersonaSource, now_rfc3339, sort_by_creation,
};
pub use preset::{find_default_template, get_default_templates, is_default_template_id};
pub use repository::{INSTANCE_ENTITY, PersonaRepository, TEMPLATE_ENTITY};
pub use request::{CreateTemplateRequest, UpdateInstanceRequest};
