use super::{ApiClient, ApiError};
use crate::settings::LanguageSettings;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceOptions {
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageSettingsList {
    pub settings: Vec<LanguageSettings>,
}

impl ApiClient {
    /// Device types the server can connect to (`cisco_ios`, `juniper_junos`, ...).
    pub async fn device_types(&self) -> Result<Vec<String>, ApiError> {
        let list: DeviceOptions = self.get("/settings/deviceTypes").await?;
        Ok(list.options)
    }

    /// Language model templates, each with empty `fields` to fill in.
    pub async fn languages(&self) -> Result<Vec<LanguageSettings>, ApiError> {
        let list: LanguageSettingsList = self.get("/settings/languages").await?;
        Ok(list.settings)
    }
}
