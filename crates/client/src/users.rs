//! Registration and login.

use api_types::user::{Credentials, LoginResponse};

use crate::{ApiClient, error::Result, session::SessionUser};

impl ApiClient {
    pub async fn register(&self, credentials: &Credentials) -> Result<()> {
        tracing::debug!(user_name = %credentials.user_name, "registering user");
        let request = self
            .http()
            .post(self.url("/api/users/register"))
            .json(credentials);
        self.send(request).await?;
        tracing::info!(user_name = %credentials.user_name, "user registered");
        Ok(())
    }

    /// Logs in and replaces the current session with the new one.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionUser> {
        tracing::debug!(user_name = %credentials.user_name, "attempting login");
        let request = self
            .http()
            .post(self.url("/api/users/login"))
            .json(credentials);
        let response: LoginResponse = self.send_record(request).await?;
        self.session().establish(response)
    }

    pub fn logout(&self) -> Result<()> {
        self.session().logout()
    }
}
