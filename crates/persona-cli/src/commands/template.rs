use super::{parse_config_json, print_json};
use anyhow::{Context, Result};
use clap::Subcommand;
use persona_core::persona::{CreateTemplateRequest, Persona, PersonaConfig, PersonaRepository};

#[derive(Subcommand, Debug)]
pub enum TemplateAction {
    /// Create a user template
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        background: String,
        /// Communication style
        #[arg(long)]
        style: String,
        /// Default configuration as a JSON object
        #[arg(long, value_name = "JSON")]
        config: Option<String>,
    },
    /// Show one template (system or user)
    Get { id: String },
    /// List system templates followed by user templates
    List,
    /// Edit a user template; omitted fields keep their value
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        background: Option<String>,
        #[arg(long)]
        style: Option<String>,
        /// Replacement configuration as a JSON object
        #[arg(long, value_name = "JSON")]
        config: Option<String>,
    },
    /// Delete a user template
    Delete { id: String },
}

/// Fields `template update` may change.
#[derive(Debug, Default)]
struct TemplateEdit {
    name: Option<String>,
    role: Option<String>,
    background: Option<String>,
    communication_style: Option<String>,
    config: Option<PersonaConfig>,
}

impl TemplateEdit {
    fn apply(self, template: &mut Persona) {
        if let Some(name) = self.name {
            template.name = name;
        }
        if let Some(role) = self.role {
            template.role = role;
        }
        if let Some(background) = self.background {
            template.background = background;
        }
        if let Some(style) = self.communication_style {
            template.communication_style = style;
        }
        if let Some(config) = self.config {
            template.config = config;
        }
    }
}

pub async fn run(action: TemplateAction, repository: &dyn PersonaRepository) -> Result<()> {
    match action {
        TemplateAction::Create {
            name,
            role,
            background,
            style,
            config,
        } => {
            let request = CreateTemplateRequest {
                name,
                role,
                background,
                communication_style: style,
                config: config
                    .as_deref()
                    .map(parse_config_json)
                    .transpose()?
                    .unwrap_or_default(),
            };
            request.validate()?;
            let created = repository
                .create_template(request.into_template())
                .await
                .context("Failed to create template")?;
            print_json(&created)
        }
        TemplateAction::Get { id } => {
            let template = repository
                .get_template_by_id(&id)
                .await
                .with_context(|| format!("Failed to get template {}", id))?;
            print_json(&template)
        }
        TemplateAction::List => {
            let templates = repository
                .list_templates()
                .await
                .context("Failed to list templates")?;
            print_json(&templates)
        }
        TemplateAction::Update {
            id,
            name,
            role,
            background,
            style,
            config,
        } => {
            let edit = TemplateEdit {
                name,
                role,
                background,
                communication_style: style,
                config: config.as_deref().map(parse_config_json).transpose()?,
            };
            let mut template = repository
                .get_template_by_id(&id)
                .await
                .with_context(|| format!("Failed to get template {}", id))?;
            edit.apply(&mut template);

            let updated = repository
                .update_template(template)
                .await
                .with_context(|| format!("Failed to update template {}", id))?;
            print_json(&updated)
        }
        TemplateAction::Delete { id } => {
            repository
                .delete_template(&id)
                .await
                .with_context(|| format!("Failed to delete template {}", id))?;
            tracing::info!(template_id = %id, "Template deleted");
            Ok(())
        }
    }
}
