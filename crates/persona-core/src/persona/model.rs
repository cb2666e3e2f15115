//! Persona domain model.
//!
//! A persona is either a reusable *template* or an *instance* created from a
//! template on behalf of a user. Both roles share the same shape so that an
//! instance can be handed to anything that consumes personas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Configuration mapping carried by templates (defaults) and instances.
pub type PersonaConfig = BTreeMap<String, serde_json::Value>;

/// Represents the source of a persona (system-provided or user-created).
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersonaSource {
    /// System-provided default templates (read-only)
    System,
    /// User-created personas
    #[default]
    User,
}

/// The role a persona plays in the repository.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PersonaKind {
    /// A reusable definition that instances are created from.
    #[default]
    Template,
    /// A persona created from a template and owned by a user.
    Instance {
        /// Id of the template this instance was created from
        template_id: String,
        /// Owner of the instance
        user_id: String,
    },
}

/// A persona representing an AI agent with specific characteristics and expertise.
///
/// Each persona has a UUID identifier that is unique within its role:
/// templates and instances live in separate keyspaces.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Persona {
    /// Unique identifier (UUID format)
    pub id: String,
    /// Display name of the persona
    pub name: String,
    /// Role or title describing the persona's expertise
    pub role: String,
    /// Background description of the persona's capabilities
    pub background: String,
    /// Communication style characteristics
    pub communication_style: String,
    /// Free-form configuration (defaults on templates, effective values on instances)
    #[serde(default)]
    pub config: PersonaConfig,
    /// Template or instance
    #[serde(default)]
    pub kind: PersonaKind,
    /// Source of the persona (System or User)
    #[serde(default)]
    pub source: PersonaSource,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last modification timestamp (RFC 3339)
    pub updated_at: String,
}

impl Persona {
    /// Returns true if this persona is a template.
    pub fn is_template(&self) -> bool {
        matches!(self.kind, PersonaKind::Template)
    }

    /// Returns true if this persona is an instance.
    pub fn is_instance(&self) -> bool {
        matches!(self.kind, PersonaKind::Instance { .. })
    }

    /// Owner of an instance, `None` for templates.
    pub fn user_id(&self) -> Option<&str> {
        match &self.kind {
            PersonaKind::Instance { user_id, .. } => Some(user_id),
            PersonaKind::Template => None,
        }
    }

    /// Template an instance was created from, `None` for templates.
    pub fn template_id(&self) -> Option<&str> {
        match &self.kind {
            PersonaKind::Instance { template_id, .. } => Some(template_id),
            PersonaKind::Template => None,
        }
    }

    /// Returns true if this persona is a read-only system template.
    pub fn is_system(&self) -> bool {
        self.source == PersonaSource::System
    }

    /// Builds a new instance of this template for `user_id`.
    ///
    /// The instance gets a fresh UUID and copies the template's descriptive
    /// fields and default configuration.
    pub fn instantiate(&self, user_id: &str, name: &str, now: &str) -> Persona {
        Persona {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            role: self.role.clone(),
            background: self.background.clone(),
            communication_style: self.communication_style.clone(),
            config: self.config.clone(),
            kind: PersonaKind::Instance {
                template_id: self.id.clone(),
                user_id: user_id.to_string(),
            },
            source: PersonaSource::User,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

/// Current time as an RFC 3339 string, the timestamp format used by personas.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Orders personas by creation time, then by id.
pub fn sort_by_creation(personas: &mut [Persona]) {
    personas.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
