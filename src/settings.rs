//! Per-user session settings sent along with every chat request.
//!
//! Field names follow the server's JSON schema (camelCase).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Credentials and platform of the network devices the assistant operates on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    pub username: String,
    pub password: String,
    pub device_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_password: Option<String>,
}

impl NetworkSettings {
    /// Username, password and device type are all filled in.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty() && !self.device_type.is_empty()
    }
}

/// A natural-language backend together with the values of its settings fields.
///
/// The server publishes each language with its field labels; the client
/// fills in a value per label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSettings {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl LanguageSettings {
    /// A language is selected and every one of its fields has a value.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && self.fields.values().all(|value| !value.is_empty())
    }

    /// Labels of fields that still have no value.
    pub fn missing_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(label, _)| label.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSettings {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub enabled: bool,
}

/// Message aliases, label to replacement value.
pub type Aliases = BTreeMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_settings_wire_names() {
        let settings = NetworkSettings {
            username: "admin".into(),
            password: "secret".into(),
            device_type: "cisco_ios".into(),
            enable_password: None,
        };
        let json = serde_json::to_value(&settings).unwrap();

        assert_eq!(json["deviceType"], "cisco_ios");
        assert!(json.get("enablePassword").is_none());
    }

    #[test]
    fn test_network_settings_completeness() {
        let mut settings = NetworkSettings::default();
        assert!(!settings.is_complete());

        settings.username = "admin".into();
        settings.password = "secret".into();
        settings.device_type = "juniper_junos".into();
        assert!(settings.is_complete());
    }

    #[test]
    fn test_language_missing_fields() {
        let mut language = LanguageSettings {
            name: "Open AI".into(),
            description: String::new(),
            fields: BTreeMap::from([("API Key".to_string(), String::new())]),
        };
        assert!(!language.is_complete());
        assert_eq!(language.missing_fields(), vec!["API Key"]);

        language.fields.insert("API Key".into(), "sk-test".into());
        assert!(language.is_complete());
    }

    #[test]
    fn test_language_without_fields_is_complete() {
        let language = LanguageSettings {
            name: "Echo".into(),
            ..Default::default()
        };
        assert!(language.is_complete());
    }
}
