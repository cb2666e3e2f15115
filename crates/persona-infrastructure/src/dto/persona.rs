//! Persona DTOs and migrations

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use persona_core::persona::{Persona, PersonaConfig, PersonaKind, PersonaSource};

/// Represents the source of a persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PersonaSourceDTO {
    System,
    #[default]
    User,
}

/// Persisted persona role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaKindDTO {
    #[default]
    Template,
    Instance,
}

/// V1.0.0: Initial persona schema. Only templates existed, without configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct PersonaV1_0_0 {
    /// Unique persona identifier.
    pub id: String,
    /// Display name of the persona.
    pub name: String,
    /// Role or title of the persona.
    pub role: String,
    /// Background description of the persona.
    pub background: String,
    /// Communication style of the persona.
    pub communication_style: String,
    /// Source of the persona (System or User).
    #[serde(default)]
    pub source: PersonaSourceDTO,
    /// Creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: String,
    /// Last modification timestamp (RFC 3339).
    #[serde(default)]
    pub updated_at: String,
}

/// V1.1.0: Adds instances (`kind`, `template_id`, `user_id`) and `config`.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
pub struct PersonaV1_1_0 {
    /// Unique persona identifier (UUID format).
    pub id: String,
    /// Display name of the persona.
    pub name: String,
    /// Role or title of the persona.
    pub role: String,
    /// Background description of the persona.
    pub background: String,
    /// Communication style of the persona.
    pub communication_style: String,
    /// Configuration mapping.
    #[serde(default)]
    pub config: PersonaConfig,
    /// Template or instance.
    #[serde(default)]
    pub kind: PersonaKindDTO,
    /// Template an instance was created from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Owner of an instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Source of the persona (System or User).
    #[serde(default)]
    pub source: PersonaSourceDTO,
    /// Creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: String,
    /// Last modification timestamp (RFC 3339).
    #[serde(default)]
    pub updated_at: String,
}

/// Type alias for the latest persona version.
pub type PersonaDTO = PersonaV1_1_0;

// ============================================================================
// Migration implementations
// ============================================================================

/// Generates a deterministic UUID from a persona name.
fn generate_uuid_from_name(name: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

fn normalize_id(id: String, name: &str) -> String {
    if Uuid::parse_str(&id).is_ok() {
        id
    } else {
        generate_uuid_from_name(name)
    }
}

/// Migration from PersonaV1_0_0 to PersonaV1_1_0.
impl MigratesTo<PersonaV1_1_0> for PersonaV1_0_0 {
    fn migrate(self) -> PersonaV1_1_0 {
        PersonaV1_1_0 {
            id: normalize_id(self.id, &self.name),
            name: self.name,
            role: self.role,
            background: self.background,
            communication_style: self.communication_style,
            config: PersonaConfig::new(),
            kind: PersonaKindDTO::Template,
            template_id: None,
            user_id: None,
            source: self.source,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl From<PersonaSourceDTO> for PersonaSource {
    fn from(dto: PersonaSourceDTO) -> Self {
        match dto {
            PersonaSourceDTO::System => PersonaSource::System,
            PersonaSourceDTO::User => PersonaSource::User,
        }
    }
}

impl From<PersonaSource> for PersonaSourceDTO {
    fn from(source: PersonaSource) -> Self {
        match source {
            PersonaSource::System => PersonaSourceDTO::System,
            PersonaSource::User => PersonaSourceDTO::User,
        }
    }
}

/// Convert PersonaV1_1_0 DTO to domain model.
///
/// An instance record missing its owner or template is read back as a template.
impl IntoDomain<Persona> for PersonaV1_1_0 {
    fn into_domain(self) -> Persona {
        let kind = match (self.kind, self.template_id, self.user_id) {
            (PersonaKindDTO::Instance, Some(template_id), Some(user_id))
                if !template_id.is_empty() && !user_id.is_empty() =>
            {
                PersonaKind::Instance {
                    template_id,
                    user_id,
                }
            }
            _ => PersonaKind::Template,
        };

        // Legacy files may carry no timestamps at all.
        let updated_at = if self.updated_at.is_empty() {
            self.created_at.clone()
        } else {
            self.updated_at
        };

        Persona {
            id: normalize_id(self.id, &self.name),
            name: self.name,
            role: self.role,
            background: self.background,
            communication_style: self.communication_style,
            config: self.config,
            kind,
            source: self.source.into(),
            created_at: self.created_at,
            updated_at,
        }
    }
}

/// Convert domain model to PersonaV1_1_0 DTO for persistence.
impl FromDomain<Persona> for PersonaV1_1_0 {
    fn from_domain(persona: Persona) -> Self {
        let (kind, template_id, user_id) = match persona.kind {
            PersonaKind::Template => (PersonaKindDTO::Template, None, None),
            PersonaKind::Instance {
                template_id,
                user_id,
            } => (PersonaKindDTO::Instance, Some(template_id), Some(user_id)),
        };

        PersonaV1_1_0 {
            id: persona.id,
            name: persona.name,
            role: persona.role,
            background: persona.background,
            communication_style: persona.communication_style,
            config: persona.config,
            kind,
            template_id,
            user_id,
            source: persona.source.into(),
            created_at: persona.created_at,
            updated_at: persona.updated_at,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Entity name under which persona records are registered.
pub const PERSONA_ENTITY: &str = "persona";

/// Creates and configures a Migrator instance for Persona entities.
///
/// # Migration Path
///
/// - V1.0.0 → V1.1.0: Marks legacy records as templates with an empty config
/// - V1.1.0 → Persona: Converts DTO to domain model
///
/// # Example
///
/// ```ignore
/// let migrator = create_persona_migrator();
/// let persona: Persona = migrator.load_flat_from("persona", json_value)?;
/// ```
pub fn create_persona_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    // Register migration path: V1.0.0 -> V1.1.0 -> Persona
    let persona_path = version_migrate::Migrator::define(PERSONA_ENTITY)
        .from::<PersonaV1_0_0>()
        .step::<PersonaV1_1_0>()
        .into_with_save::<Persona>();

    migrator
        .register(persona_path)
        .expect("Failed to register persona migration path");

    migrator
}
