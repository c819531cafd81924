use super::{ApiClient, ApiError};
use crate::auth::AuthServerInformation;

impl ApiClient {
    /// SSO server the NetGPT server trusts.
    pub async fn server_information(&self) -> Result<AuthServerInformation, ApiError> {
        self.get("/security/server").await
    }
}
