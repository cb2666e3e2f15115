//! AsyncDirStorage-based PersonaRepository implementation
//!
//! Benefits:
//! - Schema migrations applied on load via version-migrate
//! - Atomic writes (tmp file + rename) handled by the storage
//! - Fully async I/O (no spawn_blocking)
//! - 1 persona = 1 file, named after the persona id

use crate::dto::{PERSONA_ENTITY, create_persona_migrator};
use crate::paths::{INSTANCES_DIR, PersonaPaths, TEMPLATES_DIR};
use crate::persona_store::{self, Keyspace, PersonaStore};
use async_trait::async_trait;
use persona_core::error::{PersonaError, Result};
use persona_core::persona::{Persona, PersonaConfig, PersonaRepository};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use version_migrate::{
    AppPaths, AsyncDirStorage, DirStorageStrategy, FilenameEncoding, FormatStrategy,
};

/// AsyncDirStorage-based persona repository.
///
/// Directory structure:
/// ```text
/// base_dir/
/// ├── templates/
/// │   ├── <uuid-1>.json
/// │   └── <uuid-2>.json
/// └── instances/
///     └── <uuid-3>.json
/// ```
///
/// JSON is used instead of TOML because instance configuration may hold
/// values TOML cannot represent (e.g. `null`).
///
/// Records stored under a key other than their id (legacy non-UUID ids are
/// replaced on load) are moved to `<id>.json` when the repository is opened
/// and whenever a listing encounters one.
pub struct AsyncDirPersonaRepository {
    templates: AsyncDirStorage,
    instances: AsyncDirStorage,
    base_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl AsyncDirPersonaRepository {
    /// Creates a new AsyncDirPersonaRepository rooted at `base_dir`, or at the
    /// platform data directory when `None`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The data directory cannot be determined
    /// - Directory creation fails
    /// - AsyncDirStorage initialization fails
    pub async fn new(base_dir: Option<&Path>) -> Result<Self> {
        let persona_paths = PersonaPaths::new(base_dir);
        let base_dir = persona_paths
            .data_dir()
            .map_err(|e| PersonaError::io(format!("Failed to resolve data directory: {}", e)))?;

        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| PersonaError::io(format!("Failed to create base directory: {}", e)))?;

        let app_paths = persona_paths
            .storage_paths()
            .map_err(|e| PersonaError::io(e.to_string()))?;
        let templates = Self::create_storage(&app_paths, TEMPLATES_DIR).await?;
        let instances = Self::create_storage(&app_paths, INSTANCES_DIR).await?;

        tracing::debug!(base_dir = %base_dir.display(), "Opened persona storage");

        let repository = Self {
            templates,
            instances,
            base_dir,
            write_lock: Mutex::new(()),
        };
        repository.rekey_legacy_records().await;
        Ok(repository)
    }

    async fn create_storage(paths: &AppPaths, dir_name: &str) -> Result<AsyncDirStorage> {
        // Setup storage strategy: JSON format, Direct filename encoding (ids are UUIDs)
        let strategy = DirStorageStrategy::default()
            .with_format(FormatStrategy::Json)
            .with_filename_encoding(FilenameEncoding::Direct);

        AsyncDirStorage::new(paths.clone(), dir_name, create_persona_migrator(), strategy)
            .await
            .map_err(|e| PersonaError::io(format!("Failed to create {} storage: {}", dir_name, e)))
    }

    /// Returns the base directory holding `templates/` and `instances/`.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn storage(&self, keyspace: Keyspace) -> &AsyncDirStorage {
        match keyspace {
            Keyspace::Templates => &self.templates,
            Keyspace::Instances => &self.instances,
        }
    }

    /// Moves every record whose file name differs from its id.
    async fn rekey_legacy_records(&self) {
        for keyspace in [Keyspace::Templates, Keyspace::Instances] {
            if let Err(e) = self.find_all(keyspace).await {
                tracing::warn!(
                    entity = keyspace.entity_name(),
                    error = %e,
                    "Failed to scan persona records"
                );
            }
        }
    }

    /// Re-saves a record loaded from `key` under its own id.
    ///
    /// Returns whether the record is now stored under its id. A different
    /// record already owning that id wins and the legacy file is left alone.
    async fn rekey(&self, keyspace: Keyspace, key: &str, persona: &Persona) -> Result<bool> {
        let storage = self.storage(keyspace);
        let _guard = self.write_lock.lock().await;

        if !storage.exists(key).await? {
            // Moved by a concurrent listing.
            return Ok(storage.exists(&persona.id).await?);
        }
        if storage.exists(&persona.id).await? {
            tracing::warn!(
                entity = keyspace.entity_name(),
                key = %key,
                id = %persona.id,
                "Persona id already taken, ignoring legacy record"
            );
            return Ok(false);
        }

        storage.save(PERSONA_ENTITY, &persona.id, persona).await?;
        storage.delete(key).await?;
        tracing::info!(
            entity = keyspace.entity_name(),
            key = %key,
            id = %persona.id,
            "Moved legacy persona record to its id"
        );
        Ok(true)
    }
}

#[async_trait]
impl PersonaStore for AsyncDirPersonaRepository {
    fn write_lock(&self) -> &Mutex<()> {
        &self.write_lock
    }

    async fn find(&self, keyspace: Keyspace, id: &str) -> Result<Option<Persona>> {
        let storage = self.storage(keyspace);
        if !storage.exists(id).await? {
            return Ok(None);
        }

        let persona = storage.load::<Persona>(PERSONA_ENTITY, id).await?;
        if persona.id != id || !keyspace.admits(&persona) {
            tracing::warn!(
                entity = keyspace.entity_name(),
                key = %id,
                id = %persona.id,
                kind = ?persona.kind,
                "Ignoring persona record that does not belong under this key"
            );
            return Ok(None);
        }
        Ok(Some(persona))
    }

    async fn put(&self, keyspace: Keyspace, persona: &Persona) -> Result<()> {
        self.storage(keyspace)
            .save(PERSONA_ENTITY, &persona.id, persona)
            .await?;
        Ok(())
    }

    async fn remove(&self, keyspace: Keyspace, id: &str) -> Result<()> {
        self.storage(keyspace).delete(id).await?;
        Ok(())
    }

    async fn find_all(&self, keyspace: Keyspace) -> Result<Vec<Persona>> {
        let all = self
            .storage(keyspace)
            .load_all::<Persona>(PERSONA_ENTITY)
            .await?;

        let mut personas = Vec::with_capacity(all.len());
        for (key, persona) in all {
            if !keyspace.admits(&persona) {
                tracing::warn!(
                    entity = keyspace.entity_name(),
                    key = %key,
                    kind = ?persona.kind,
                    "Ignoring persona record of the wrong kind"
                );
                continue;
            }
            if key != persona.id && !self.rekey(keyspace, &key, &persona).await? {
                continue;
            }
            personas.push(persona);
        }
        Ok(personas)
    }
}

#[async_trait]
impl PersonaRepository for AsyncDirPersonaRepository {
    async fn create_template(&self, template: Persona) -> Result<Persona> {
        persona_store::create_template(self, template).await
    }

    async fn get_template_by_id(&self, id: &str) -> Result<Persona> {
        persona_store::get_template_by_id(self, id).await
    }

    async fn list_templates(&self) -> Result<Vec<Persona>> {
        persona_store::list_templates(self).await
    }

    async fn update_template(&self, template: Persona) -> Result<Persona> {
        persona_store::update_template(self, template).await
    }

    async fn delete_template(&self, id: &str) -> Result<()> {
        persona_store::delete_template(self, id).await
    }

    async fn create_instance_from_template(
        &self,
        template_id: &str,
        user_id: &str,
        name: &str,
    ) -> Result<Persona> {
        persona_store::create_instance_from_template(self, template_id, user_id, name).await
    }

    async fn get_instance_by_id(&self, id: &str) -> Result<Persona> {
        persona_store::get_instance_by_id(self, id).await
    }

    async fn list_instances(&self, user_id: &str) -> Result<Vec<Persona>> {
        persona_store::list_instances(self, user_id).await
    }

    async fn update_instance(
        &self,
        id: &str,
        name: Option<String>,
        config: Option<PersonaConfig>,
    ) -> Result<Persona> {
        persona_store::update_instance(self, id, name, config).await
    }

    async fn delete_instance(&self, id: &str) -> Result<()> {
        persona_store::delete_instance(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::persona::{CreateTemplateRequest, get_default_templates};
    use serde_json::json;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn write_record(dir: &Path, key: &str, value: serde_json::Value) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(
            dir.join(format!("{}.json", key)),
            serde_json::to_string_pretty(&value).unwrap(),
        )
        .unwrap();
    }

    fn legacy_template() -> serde_json::Value {
        json!({
            "version": "1.0.0",
            "id": "legacy-id",
            "name": "Legacy Scholar",
            "role": "Researcher",
            "background": "Imported from the first release",
            "communication_style": "Formal and precise wording",
            "source": "User",
            "created_at": "2024-01-01T00:00:00.000000Z"
        })
    }

    fn legacy_template_id() -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, b"Legacy Scholar").to_string()
    }

    fn request(name: &str) -> CreateTemplateRequest {
        CreateTemplateRequest {
            name: name.to_string(),
            role: "Architect".to_string(),
            background: "Designs storage layers for desktop apps".to_string(),
            communication_style: "Diagrams first, prose second".to_string(),
            config: PersonaConfig::from([("temperature".to_string(), serde_json::json!(0.3))]),
        }
    }

    #[tokio::test]
    async fn test_empty_repository_lists_only_system_templates() {
        let temp_dir = TempDir::new().unwrap();
        let repo = AsyncDirPersonaRepository::new(Some(temp_dir.path()))
            .await
            .unwrap();

        let templates = repo.list_templates().await.unwrap();
        assert_eq!(templates.len(), get_default_templates().len());
        assert!(templates.iter().all(|t| t.is_system()));
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let (template, instance) = {
            let repo = AsyncDirPersonaRepository::new(Some(temp_dir.path()))
                .await
                .unwrap();
            let template = repo
                .create_template(request("Architect").into_template())
                .await
                .unwrap();
            let instance = repo
                .create_instance_from_template(&template.id, "user-1", "My Architect")
                .await
                .unwrap();
            (template, instance)
        };

        let reopened = AsyncDirPersonaRepository::new(Some(temp_dir.path()))
            .await
            .unwrap();
        assert_eq!(
            reopened.get_template_by_id(&template.id).await.unwrap(),
            template
        );
        assert_eq!(
            reopened.get_instance_by_id(&instance.id).await.unwrap(),
            instance
        );
        assert_eq!(reopened.list_instances("user-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_instance_config_with_null_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let repo = AsyncDirPersonaRepository::new(Some(temp_dir.path()))
            .await
            .unwrap();

        let template = repo
            .create_template(request("Architect").into_template())
            .await
            .unwrap();
        let instance = repo
            .create_instance_from_template(&template.id, "user-1", "Nullable")
            .await
            .unwrap();

        let config = PersonaConfig::from([
            ("stop".to_string(), serde_json::Value::Null),
            ("nested".to_string(), serde_json::json!({ "depth": [1, 2, 3] })),
        ]);
        repo.update_instance(&instance.id, None, Some(config.clone()))
            .await
            .unwrap();

        let loaded = repo.get_instance_by_id(&instance.id).await.unwrap();
        assert_eq!(loaded.config, config);
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let repo = AsyncDirPersonaRepository::new(Some(temp_dir.path()))
            .await
            .unwrap();

        let template = repo
            .create_template(request("Short-lived").into_template())
            .await
            .unwrap();
        repo.delete_template(&template.id).await.unwrap();

        assert!(
            repo.get_template_by_id(&template.id)
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(
            repo.delete_template(&template.id)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_files_live_under_persona_paths() {
        let temp_dir = TempDir::new().unwrap();
        let repo = AsyncDirPersonaRepository::new(Some(temp_dir.path()))
            .await
            .unwrap();

        let template = repo
            .create_template(request("Layout").into_template())
            .await
            .unwrap();
        let instance = repo
            .create_instance_from_template(&template.id, "user-1", "Placed")
            .await
            .unwrap();

        let paths = PersonaPaths::new(Some(temp_dir.path()));
        assert_eq!(repo.base_dir(), paths.data_dir().unwrap());
        assert!(
            paths
                .templates_dir()
                .unwrap()
                .join(format!("{}.json", template.id))
                .is_file()
        );
        assert!(
            paths
                .instances_dir()
                .unwrap()
                .join(format!("{}.json", instance.id))
                .is_file()
        );
        assert!(!temp_dir.path().join("data").exists());
    }

    #[tokio::test]
    async fn test_legacy_record_is_rekeyed_on_open() {
        let temp_dir = TempDir::new().unwrap();
        let templates_dir = temp_dir.path().join(TEMPLATES_DIR);
        write_record(&templates_dir, "legacy-id", legacy_template());

        let repo = AsyncDirPersonaRepository::new(Some(temp_dir.path()))
            .await
            .unwrap();
        let id = legacy_template_id();

        assert!(!templates_dir.join("legacy-id.json").exists());
        assert!(templates_dir.join(format!("{}.json", id)).is_file());

        let template = repo.get_template_by_id(&id).await.unwrap();
        assert_eq!(template.name, "Legacy Scholar");
        assert!(template.is_template());
        assert!(template.config.is_empty());

        let mut edit = template.clone();
        edit.role = "Archivist".to_string();
        let updated = repo.update_template(edit).await.unwrap();
        assert_eq!(updated.role, "Archivist");
        assert_eq!(updated.created_at, "2024-01-01T00:00:00.000000Z");

        let instance = repo
            .create_instance_from_template(&id, "user-1", "Old friend")
            .await
            .unwrap();
        assert_eq!(instance.template_id(), Some(id.as_str()));

        repo.delete_template(&id).await.unwrap();
        assert!(repo.get_template_by_id(&id).await.unwrap_err().is_not_found());
        assert!(!templates_dir.join(format!("{}.json", id)).exists());
    }

    #[tokio::test]
    async fn test_legacy_record_added_while_open_is_rekeyed_by_listing() {
        let temp_dir = TempDir::new().unwrap();
        let repo = AsyncDirPersonaRepository::new(Some(temp_dir.path()))
            .await
            .unwrap();
        write_record(
            &temp_dir.path().join(TEMPLATES_DIR),
            "legacy-id",
            legacy_template(),
        );

        let id = legacy_template_id();
        let listed = repo.list_templates().await.unwrap();
        assert!(listed.iter().any(|t| t.id == id));

        assert_eq!(repo.get_template_by_id(&id).await.unwrap().id, id);
        repo.delete_template(&id).await.unwrap();
        assert_eq!(
            repo.list_templates().await.unwrap().len(),
            get_default_templates().len()
        );
    }

    #[tokio::test]
    async fn test_records_of_the_wrong_kind_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let repo = AsyncDirPersonaRepository::new(Some(temp_dir.path()))
            .await
            .unwrap();

        // Instance without an owner loads as a template.
        let ownerless = Uuid::new_v4().to_string();
        write_record(
            &temp_dir.path().join(INSTANCES_DIR),
            &ownerless,
            json!({
                "version": "1.1.0",
                "id": ownerless,
                "name": "Ownerless",
                "role": "Tester",
                "background": "Written without a user id",
                "communication_style": "Terse and factual",
                "kind": "instance",
                "template_id": get_default_templates()[0].id,
                "source": "User",
                "created_at": "2025-01-01T00:00:00.000000Z",
                "updated_at": "2025-01-01T00:00:00.000000Z"
            }),
        );

        // Complete instance misplaced among templates.
        let misplaced = Uuid::new_v4().to_string();
        write_record(
            &temp_dir.path().join(TEMPLATES_DIR),
            &misplaced,
            json!({
                "version": "1.1.0",
                "id": misplaced,
                "name": "Misplaced",
                "role": "Tester",
                "background": "Stored in the wrong directory",
                "communication_style": "Terse and factual",
                "kind": "instance",
                "template_id": get_default_templates()[0].id,
                "user_id": "user-1",
                "source": "User",
                "created_at": "2025-01-01T00:00:00.000000Z",
                "updated_at": "2025-01-01T00:00:00.000000Z"
            }),
        );

        assert!(
            repo.get_instance_by_id(&ownerless)
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(
            repo.get_template_by_id(&misplaced)
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert_eq!(
            repo.list_templates().await.unwrap().len(),
            get_default_templates().len()
        );
        assert!(repo.list_instances("user-1").await.unwrap().is_empty());
    }
}
