use super::{parse_config_json, print_json};
use anyhow::{Context, Result};
use clap::Subcommand;
use persona_core::persona::PersonaRepository;

#[derive(Subcommand, Debug)]
pub enum InstanceAction {
    /// Create an instance of a template for a user
    Create {
        /// Template id
        #[arg(long = "template", value_name = "ID")]
        template_id: String,
        /// Owning user
        #[arg(long = "user", value_name = "USER")]
        user_id: String,
        #[arg(long)]
        name: String,
    },
    /// Show one instance
    Get { id: String },
    /// List the instances owned by a user
    List {
        #[arg(long = "user", value_name = "USER")]
        user_id: String,
    },
    /// Rename an instance or replace its configuration
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// Replacement configuration as a JSON object
        #[arg(long, value_name = "JSON")]
        config: Option<String>,
    },
    /// Delete an instance
    Delete { id: String },
}

pub async fn run(action: InstanceAction, repository: &dyn PersonaRepository) -> Result<()> {
    match action {
        InstanceAction::Create {
            template_id,
            user_id,
            name,
        } => {
            let instance = repository
                .create_instance_from_template(&template_id, &user_id, &name)
                .await
                .with_context(|| format!("Failed to create instance of template {}", template_id))?;
            print_json(&instance)
        }
        InstanceAction::Get { id } => {
            let instance = repository
                .get_instance_by_id(&id)
                .await
                .with_context(|| format!("Failed to get instance {}", id))?;
            print_json(&instance)
        }
        InstanceAction::List { user_id } => {
            let instances = repository
                .list_instances(&user_id)
                .await
                .with_context(|| format!("Failed to list instances of {}", user_id))?;
            print_json(&instances)
        }
        InstanceAction::Update { id, name, config } => {
            let config = config.as_deref().map(parse_config_json).transpose()?;
            let updated = repository
                .update_instance(&id, name, config)
                .await
                .with_context(|| format!("Failed to update instance {}", id))?;
            print_json(&updated)
        }
        InstanceAction::Delete { id } => {
            repository
                .delete_instance(&id)
                .await
                .with_context(|| format!("Failed to delete instance {}", id))?;
            tracing::info!(instance_id = %id, "Instance deleted");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::persona::get_default_templates;
    use persona_infrastructure::InMemoryPersonaRepository;

    #[tokio::test]
    async fn test_instance_lifecycle_through_commands() {
        let repository = InMemoryPersonaRepository::new();
        let template_id = get_default_templates()[0].id.clone();

        run(
            InstanceAction::Create {
                template_id,
                user_id: "alice".to_string(),
                name: "Alice's Mai".to_string(),
            },
            &repository,
        )
        .await
        .unwrap();

        let instance = repository.list_instances("alice").await.unwrap().remove(0);

        run(
            InstanceAction::Update {
                id: instance.id.clone(),
                name: None,
                config: Some(r#"{"voice": "calm"}"#.to_string()),
            },
            &repository,
        )
        .await
        .unwrap();
        let updated = repository.get_instance_by_id(&instance.id).await.unwrap();
        assert_eq!(updated.name, "Alice's Mai");
        assert_eq!(updated.config["voice"], serde_json::json!("calm"));

        run(InstanceAction::Delete { id: instance.id.clone() }, &repository)
            .await
            .unwrap();
        assert!(repository.list_instances("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_instance_fails() {
        let repository = InMemoryPersonaRepository::new();
        let err = run(
            InstanceAction::Get {
                id: "6b1f1c4e-0000-4000-8000-000000000000".to_string(),
            },
            &repository,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Failed to get instance"));
    }
}
