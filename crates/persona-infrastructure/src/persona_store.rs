//! Shared repository semantics on top of a keyed persona store.
//!
//! Storage backends only know how to load, save, and delete personas in two
//! keyspaces. Everything the `PersonaRepository` contract adds on top of that
//! (system templates, validation, uniqueness, timestamps, ordering) lives here
//! so that every backend behaves the same way.

use async_trait::async_trait;
use persona_core::error::{PersonaError, Result};
use persona_core::persona::request::{validate_instance_args, validate_template};
use persona_core::persona::{
    INSTANCE_ENTITY, Persona, PersonaConfig, PersonaKind, TEMPLATE_ENTITY, UpdateInstanceRequest,
    find_default_template, get_default_templates, is_default_template_id, now_rfc3339,
    sort_by_creation,
};
use tokio::sync::Mutex;
use uuid::Uuid;

/// The two id spaces a store keeps apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyspace {
    Templates,
    Instances,
}

impl Keyspace {
    /// Entity name used in errors and logs.
    pub fn entity_name(self) -> &'static str {
        match self {
            Keyspace::Templates => TEMPLATE_ENTITY,
            Keyspace::Instances => INSTANCE_ENTITY,
        }
    }

    /// Whether `persona` has the kind this keyspace holds.
    pub fn admits(self, persona: &Persona) -> bool {
        match self {
            Keyspace::Templates => persona.is_template(),
            Keyspace::Instances => persona.is_instance(),
        }
    }
}

/// Minimal keyed storage used by the repository implementations.
#[async_trait]
pub trait PersonaStore: Send + Sync {
    /// Lock serialising read-modify-write sequences.
    fn write_lock(&self) -> &Mutex<()>;

    /// Loads one persona, `None` if absent.
    async fn find(&self, keyspace: Keyspace, id: &str) -> Result<Option<Persona>>;

    /// Inserts or replaces a persona.
    async fn put(&self, keyspace: Keyspace, persona: &Persona) -> Result<()>;

    /// Removes a persona that is known to exist.
    async fn remove(&self, keyspace: Keyspace, id: &str) -> Result<()>;

    /// Loads every persona in the keyspace, in no particular order.
    ///
    /// Never called while `write_lock` is held.
    async fn find_all(&self, keyspace: Keyspace) -> Result<Vec<Persona>>;
}

/// Looks up `id`, treating ids that could never have been stored as absent.
async fn lookup<S: PersonaStore + ?Sized>(
    store: &S,
    keyspace: Keyspace,
    id: &str,
) -> Result<Option<Persona>> {
    if Uuid::parse_str(id).is_err() {
        return Ok(None);
    }
    store.find(keyspace, id).await
}

async fn require<S: PersonaStore + ?Sized>(
    store: &S,
    keyspace: Keyspace,
    id: &str,
) -> Result<Persona> {
    lookup(store, keyspace, id)
        .await?
        .ok_or_else(|| PersonaError::not_found(keyspace.entity_name(), id))
}

pub(crate) async fn create_template<S: PersonaStore + ?Sized>(
    store: &S,
    mut template: Persona,
) -> Result<Persona> {
    validate_template(&template)?;
    if template.is_system() {
        return Err(PersonaError::validation(
            "System templates cannot be created",
        ));
    }

    if template.id.trim().is_empty() {
        template.id = Uuid::new_v4().to_string();
    } else if Uuid::parse_str(&template.id).is_err() {
        return Err(PersonaError::validation(format!(
            "Template id '{}' is not a valid UUID",
            template.id
        )));
    }

    let _guard = store.write_lock().lock().await;

    if is_default_template_id(&template.id)
        || store
            .find(Keyspace::Templates, &template.id)
            .await?
            .is_some()
    {
        return Err(PersonaError::already_exists(TEMPLATE_ENTITY, template.id));
    }

    let now = now_rfc3339();
    template.created_at = now.clone();
    template.updated_at = now;

    store.put(Keyspace::Templates, &template).await?;
    tracing::info!(
        template_id = %template.id,
        name = %template.name,
        "Created persona template"
    );
    Ok(template)
}

pub(crate) async fn get_template_by_id<S: PersonaStore + ?Sized>(
    store: &S,
    id: &str,
) -> Result<Persona> {
    if let Some(system_template) = find_default_template(id) {
        return Ok(system_template);
    }
    let template = require(store, Keyspace::Templates, id).await?;
    tracing::debug!(template_id = %id, "Loaded persona template");
    Ok(template)
}

pub(crate) async fn list_templates<S: PersonaStore + ?Sized>(store: &S) -> Result<Vec<Persona>> {
    let mut user_templates = store.find_all(Keyspace::Templates).await?;
    sort_by_creation(&mut user_templates);

    let mut templates = get_default_templates();
    templates.extend(user_templates);
    tracing::debug!(count = templates.len(), "Listed persona templates");
    Ok(templates)
}

pub(crate) async fn update_template<S: PersonaStore + ?Sized>(
    store: &S,
    template: Persona,
) -> Result<Persona> {
    if is_default_template_id(&template.id) {
        return Err(PersonaError::read_only(format!(
            "System template '{}' cannot be modified",
            template.id
        )));
    }
    validate_template(&template)?;

    let _guard = store.write_lock().lock().await;
    let existing = require(store, Keyspace::Templates, &template.id).await?;

    let updated = Persona {
        kind: PersonaKind::Template,
        source: existing.source,
        created_at: existing.created_at,
        updated_at: now_rfc3339(),
        ..template
    };

    store.put(Keyspace::Templates, &updated).await?;
    tracing::info!(template_id = %updated.id, "Updated persona template");
    Ok(updated)
}

pub(crate) async fn delete_template<S: PersonaStore + ?Sized>(store: &S, id: &str) -> Result<()> {
    if is_default_template_id(id) {
        return Err(PersonaError::read_only(format!(
            "System template '{}' cannot be deleted",
            id
        )));
    }

    let _guard = store.write_lock().lock().await;
    require(store, Keyspace::Templates, id).await?;
    store.remove(Keyspace::Templates, id).await?;
    tracing::info!(template_id = %id, "Deleted persona template");
    Ok(())
}

pub(crate) async fn create_instance_from_template<S: PersonaStore + ?Sized>(
    store: &S,
    template_id: &str,
    user_id: &str,
    name: &str,
) -> Result<Persona> {
    validate_instance_args(template_id, user_id, name)?;

    let _guard = store.write_lock().lock().await;
    let template = match find_default_template(template_id) {
        Some(system_template) => system_template,
        None => require(store, Keyspace::Templates, template_id).await?,
    };

    let instance = template.instantiate(user_id.trim(), name, &now_rfc3339());
    store.put(Keyspace::Instances, &instance).await?;
    tracing::info!(
        instance_id = %instance.id,
        template_id = %template.id,
        user_id = %user_id.trim(),
        "Created persona instance"
    );
    Ok(instance)
}

pub(crate) async fn get_instance_by_id<S: PersonaStore + ?Sized>(
    store: &S,
    id: &str,
) -> Result<Persona> {
    let instance = require(store, Keyspace::Instances, id).await?;
    tracing::debug!(instance_id = %id, "Loaded persona instance");
    Ok(instance)
}

pub(crate) async fn list_instances<S: PersonaStore + ?Sized>(
    store: &S,
    user_id: &str,
) -> Result<Vec<Persona>> {
    let user_id = user_id.trim();
    let mut instances: Vec<Persona> = store
        .find_all(Keyspace::Instances)
        .await?
        .into_iter()
        .filter(|instance| instance.user_id() == Some(user_id))
        .collect();
    sort_by_creation(&mut instances);
    tracing::debug!(user_id = %user_id, count = instances.len(), "Listed persona instances");
    Ok(instances)
}

pub(crate) async fn update_instance<S: PersonaStore + ?Sized>(
    store: &S,
    id: &str,
    name: Option<String>,
    config: Option<PersonaConfig>,
) -> Result<Persona> {
    let request = UpdateInstanceRequest { name, config };
    request.validate()?;

    let _guard = store.write_lock().lock().await;
    let mut instance = require(store, Keyspace::Instances, id).await?;
    request.apply(&mut instance);

    store.put(Keyspace::Instances, &instance).await?;
    tracing::info!(instance_id = %id, "Updated persona instance");
    Ok(instance)
}

pub(crate) async fn delete_instance<S: PersonaStore + ?Sized>(store: &S, id: &str) -> Result<()> {
    let _guard = store.write_lock().lock().await;
    require(store, Keyspace::Instances, id).await?;
    store.remove(Keyspace::Instances, id).await?;
    tracing::info!(instance_id = %id, "Deleted persona instance");
    Ok(())
}
