//! Default template presets.
//!
//! Provides system-defined templates that are available to all users.

use super::model::{Persona, PersonaConfig, PersonaKind, PersonaSource};

/// UUID for the Mai template (deterministic UUID v5 from "Mai")
const MAI_UUID: &str = "8c6f3e4a-7b2d-5f1e-9a3c-4d8b6e2f1a5c";

/// UUID for the Yui template (deterministic UUID v5 from "Yui")
const YUI_UUID: &str = "2a9f5c3b-1e7d-5a4f-8b2c-6d3e9f1a7b4c";

const PRESET_TIMESTAMP: &str = "2025-01-01T00:00:00.000000Z";

/// Returns the system templates shipped with every store.
///
/// - **Mai**: UX engineer focused on user experience and clarity
/// - **Yui**: principal engineer focused on architecture and technical accuracy
pub fn get_default_templates() -> Vec<Persona> {
    vec![
        Persona {
            id: MAI_UUID.to_string(),
            name: "Mai".to_string(),
            role: "World-Class UX Engineer".to_string(),
            background: "Acts as a product partner: uncovers true intent, clarifies scope, and guides decisions with the rigor of a top-tier product owner.".to_string(),
            communication_style: "Friendly, approachable, and empathetic. Prioritizes clear, concise explanations for the user.".to_string(),
            config: PersonaConfig::new(),
            kind: PersonaKind::Template,
            source: PersonaSource::System,
            created_at: PRESET_TIMESTAMP.to_string(),
            updated_at: PRESET_TIMESTAMP.to_string(),
        },
        Persona {
            id: YUI_UUID.to_string(),
            name: "Yui".to_string(),
            role: "World-Class Pro Engineer".to_string(),
            background: "Serves as a principal engineer: extracts precise requirements, leads architecture design, and evaluates technical risks.".to_string(),
            communication_style: "Professional, precise, and detail-oriented. Prioritizes technical accuracy and best practices.".to_string(),
            config: PersonaConfig::new(),
            kind: PersonaKind::Template,
            source: PersonaSource::System,
            created_at: PRESET_TIMESTAMP.to_string(),
            updated_at: PRESET_TIMESTAMP.to_string(),
        },
    ]
}

/// Looks up a system template by id.
pub fn find_default_template(id: &str) -> Option<Persona> {
    get_default_templates().into_iter().find(|p| p.id == id)
}

/// Returns true if `id` belongs to a system template.
pub fn is_default_template_id(id: &str) -> bool {
    id == MAI_UUID || id == YUI_UUID
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::request::validate_template;

    #[test]
    fn test_default_templates_are_valid_system_templates() {
        let templates = get_default_templates();
        assert_eq!(templates.len(), 2);
        for template in &templates {
            assert!(template.is_system());
            assert!(is_default_template_id(&template.id));
            assert!(validate_template(template).is_ok());
            assert!(uuid::Uuid::parse_str(&template.id).is_ok());
        }
    }

    #[test]
    fn test_find_default_template() {
        assert_eq!(find_default_template(YUI_UUID).unwrap().name, "Yui");
        assert!(find_default_template("missing").is_none());
    }
}
