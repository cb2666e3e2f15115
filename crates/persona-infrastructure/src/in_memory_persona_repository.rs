//! In-memory PersonaRepository implementation.
//!
//! Nothing is persisted. Used by tests and by the CLI's ephemeral mode.

use crate::persona_store::{self, Keyspace, PersonaStore};
use async_trait::async_trait;
use persona_core::error::Result;
use persona_core::persona::{Persona, PersonaConfig, PersonaRepository};
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};

/// Persona repository backed by two in-process maps.
#[derive(Default)]
pub struct InMemoryPersonaRepository {
    templates: RwLock<HashMap<String, Persona>>,
    instances: RwLock<HashMap<String, Persona>>,
    write_lock: Mutex<()>,
}

impl InMemoryPersonaRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, keyspace: Keyspace) -> &RwLock<HashMap<String, Persona>> {
        match keyspace {
            Keyspace::Templates => &self.templates,
            Keyspace::Instances => &self.instances,
        }
    }
}

#[async_trait]
impl PersonaStore for InMemoryPersonaRepository {
    fn write_lock(&self) -> &Mutex<()> {
        &self.write_lock
    }

    async fn find(&self, keyspace: Keyspace, id: &str) -> Result<Option<Persona>> {
        let map = self.map(keyspace).read().await;
        Ok(map.get(id).cloned())
    }

    async fn put(&self, keyspace: Keyspace, persona: &Persona) -> Result<()> {
        let mut map = self.map(keyspace).write().await;
        map.insert(persona.id.clone(), persona.clone());
        Ok(())
    }

    async fn remove(&self, keyspace: Keyspace, id: &str) -> Result<()> {
        let mut map = self.map(keyspace).write().await;
        map.remove(id);
        Ok(())
    }

    async fn find_all(&self, keyspace: Keyspace) -> Result<Vec<Persona>> {
        let map = self.map(keyspace).read().await;
        Ok(map.values().cloned().collect())
    }
}

#[async_trait]
impl PersonaRepository for InMemoryPersonaRepository {
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
    use persona_core::persona::CreateTemplateRequest;
    use std::sync::Arc;

    fn request(name: &str) -> CreateTemplateRequest {
        CreateTemplateRequest {
            name: name.to_string(),
            role: "Tester".to_string(),
            background: "Writes and runs test plans".to_string(),
            communication_style: "Short, factual sentences".to_string(),
            config: PersonaConfig::new(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_template() {
        let repo = InMemoryPersonaRepository::new();
        let created = repo
            .create_template(request("Tester").into_template())
            .await
            .unwrap();

        let found = repo.get_template_by_id(&created.id).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_same_id_admit_one() {
        let repo = Arc::new(InMemoryPersonaRepository::new());
        let template = request("Racer").into_template();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = repo.clone();
            let template = template.clone();
            handles.push(tokio::spawn(async move {
                repo.create_template(template).await
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) if e.is_already_exists() => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn test_non_uuid_lookup_is_not_found() {
        let repo = InMemoryPersonaRepository::new();
        let err = repo.get_instance_by_id("../etc/passwd").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
