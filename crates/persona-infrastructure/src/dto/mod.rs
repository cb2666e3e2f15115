//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned schema for persisting data.
//! They are private to the infrastructure layer and handle the evolution
//! of the storage format over time.
//!
//! ## Schema Versioning (Semantic Versioning)
//!
//! - **MAJOR (X.0.0)**: Breaking changes (field removal, type changes)
//! - **MINOR (1.X.0)**: Backward-compatible additions (new optional fields)
//!
//! ### Persona Version History
//! - **1.0.0**: Templates only, string-based ID, no configuration
//! - **1.1.0**: `kind`, `template_id`, `user_id` for instances; `config` mapping

mod persona;

pub use persona::{
    PERSONA_ENTITY, PersonaDTO, PersonaKindDTO, PersonaSourceDTO, PersonaV1_0_0, PersonaV1_1_0,
    create_persona_migrator,
};
