//! Persona repository trait.
//!
//! Defines the interface for template and instance persistence operations.

use super::model::{Persona, PersonaConfig};
use crate::error::Result;

/// Entity name used in errors raised by template operations.
pub const TEMPLATE_ENTITY: &str = "template";

/// Entity name used in errors raised by instance operations.
pub const INSTANCE_ENTITY: &str = "instance";

/// An abstract repository for managing persona templates and instances.
///
/// This trait defines the contract for persisting and retrieving personas,
/// decoupling the application's core logic from the specific storage mechanism
/// (e.g., a directory of files, an in-memory map, a database).
///
/// Every call is an async operation; dropping the returned future cancels it.
///
/// # Implementation Notes
///
/// Implementations must:
/// - Expose system templates (see `get_default_templates`) as read-only
/// - Keep templates and instances in separate id spaces
/// - Serialise read-modify-write sequences so concurrent callers cannot
///   interleave a uniqueness check and a write
#[async_trait::async_trait]
pub trait PersonaRepository: Send + Sync {
    /// Stores a new template.
    ///
    /// An empty `id` is replaced by a fresh UUID. Creation and update
    /// timestamps are set to the current time.
    ///
    /// # Returns
    ///
    /// - `Ok(Persona)`: The stored template
    /// - `Err(PersonaError::AlreadyExists)`: A template with this id exists
    /// - `Err(PersonaError::Validation)`: The value is not a valid user template
    async fn create_template(&self, template: Persona) -> Result<Persona>;

    /// Retrieves a template by id, system templates included.
    ///
    /// # Returns
    ///
    /// - `Ok(Persona)`: The template
    /// - `Err(PersonaError::NotFound)`: No template with this id
    async fn get_template_by_id(&self, id: &str) -> Result<Persona>;

    /// Lists every template: system templates first, then user templates by
    /// creation time.
    async fn list_templates(&self) -> Result<Vec<Persona>>;

    /// Replaces the descriptive fields and configuration of a stored template.
    ///
    /// `created_at`, `kind` and `source` are preserved from the stored value.
    ///
    /// # Returns
    ///
    /// - `Ok(Persona)`: The updated template
    /// - `Err(PersonaError::NotFound)`: No template with this id
    /// - `Err(PersonaError::ReadOnly)`: The id belongs to a system template
    async fn update_template(&self, template: Persona) -> Result<Persona>;

    /// Deletes a user template. Instances created from it are kept.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Template deleted
    /// - `Err(PersonaError::NotFound)`: No template with this id
    /// - `Err(PersonaError::ReadOnly)`: The id belongs to a system template
    async fn delete_template(&self, id: &str) -> Result<()>;

    /// Creates an instance of `template_id` owned by `user_id`.
    ///
    /// # Returns
    ///
    /// - `Ok(Persona)`: The new instance
    /// - `Err(PersonaError::NotFound)`: No template with this id
    /// - `Err(PersonaError::Validation)`: Blank user id or name
    async fn create_instance_from_template(
        &self,
        template_id: &str,
        user_id: &str,
        name: &str,
    ) -> Result<Persona>;

    /// Retrieves an instance by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Persona)`: The instance
    /// - `Err(PersonaError::NotFound)`: No instance with this id
    async fn get_instance_by_id(&self, id: &str) -> Result<Persona>;

    /// Lists the instances owned by `user_id`, oldest first.
    async fn list_instances(&self, user_id: &str) -> Result<Vec<Persona>>;

    /// Updates an instance's name and/or configuration.
    ///
    /// `None` arguments leave the field untouched; `Some(config)` replaces the
    /// whole mapping.
    ///
    /// # Returns
    ///
    /// - `Ok(Persona)`: The updated instance
    /// - `Err(PersonaError::NotFound)`: No instance with this id
    /// - `Err(PersonaError::Validation)`: Blank new name
    async fn update_instance(
        &self,
        id: &str,
        name: Option<String>,
        config: Option<PersonaConfig>,
    ) -> Result<Persona>;

    /// Deletes an instance.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Instance deleted
    /// - `Err(PersonaError::NotFound)`: No instance with this id
    async fn delete_instance(&self, id: &str) -> Result<()>;
}
