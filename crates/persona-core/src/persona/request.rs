//! Persona creation and update request models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Persona, PersonaConfig, PersonaKind, PersonaSource, now_rfc3339};
use crate::error::{PersonaError, Result};

/// Minimum trimmed length of `background` and `communication_style`.
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// Validates the descriptive fields shared by every persona.
pub fn validate_fields(
    name: &str,
    role: &str,
    background: &str,
    communication_style: &str,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PersonaError::validation(
            "Name is required and cannot be empty",
        ));
    }

    if role.trim().is_empty() {
        return Err(PersonaError::validation(
            "Role is required and cannot be empty",
        ));
    }

    if background.trim().chars().count() < MIN_DESCRIPTION_LEN {
        return Err(PersonaError::validation(format!(
            "Background must be at least {} characters long",
            MIN_DESCRIPTION_LEN
        )));
    }

    if communication_style.trim().chars().count() < MIN_DESCRIPTION_LEN {
        return Err(PersonaError::validation(format!(
            "Communication style must be at least {} characters long",
            MIN_DESCRIPTION_LEN
        )));
    }

    Ok(())
}

/// Validates a persona value handed to a template operation.
pub fn validate_template(persona: &Persona) -> Result<()> {
    if !persona.is_template() {
        return Err(PersonaError::validation(format!(
            "Persona '{}' is an instance, expected a template",
            persona.id
        )));
    }
    validate_fields(
        &persona.name,
        &persona.role,
        &persona.background,
        &persona.communication_style,
    )
}

/// Request to create a new template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    /// Display name (required)
    pub name: String,

    /// Role or title (required)
    pub role: String,

    /// Background description (required, min 10 chars)
    pub background: String,

    /// Communication style (required, min 10 chars)
    pub communication_style: String,

    /// Default configuration copied into every instance
    #[serde(default)]
    pub config: PersonaConfig,
}

impl CreateTemplateRequest {
    /// Validate the request and return errors if any.
    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.name,
            &self.role,
            &self.background,
            &self.communication_style,
        )
    }

    /// Convert this request into a template, always generating a new UUID.
    pub fn into_template(self) -> Persona {
        let now = now_rfc3339();

        Persona {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            role: self.role,
            background: self.background,
            communication_style: self.communication_style,
            config: self.config,
            kind: PersonaKind::Template,
            source: PersonaSource::User,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Partial update of an instance. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInstanceRequest {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Replacement configuration mapping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<PersonaConfig>,
}

impl UpdateInstanceRequest {
    /// Validate the request and return errors if any.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(PersonaError::validation("Instance name cannot be empty"));
            }
        }
        Ok(())
    }

    /// Applies the provided fields to `instance` and refreshes `updated_at`.
    pub fn apply(self, instance: &mut Persona) {
        if let Some(name) = self.name {
            instance.name = name.trim().to_string();
        }
        if let Some(config) = self.config {
            instance.config = config;
        }
        instance.updated_at = now_rfc3339();
    }
}

/// Validates the arguments of `create_instance_from_template`.
pub fn validate_instance_args(template_id: &str, user_id: &str, name: &str) -> Result<()> {
    if template_id.trim().is_empty() {
        return Err(PersonaError::validation("Template id cannot be empty"));
    }
    if user_id.trim().is_empty() {
        return Err(PersonaError::validation("User id cannot be empty"));
    }
    if name.trim().is_empty() {
        return Err(PersonaError::validation("Instance name cannot be empty"));
    }
    Ok(())
}
