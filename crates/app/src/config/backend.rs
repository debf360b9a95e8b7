//! Backend Config

use std::time::Duration;

use clap::Args;
use homefix::profiles::{Session, UserId};

use crate::gateway::RestGatewayConfig;

/// Remote backend settings.
#[derive(Debug, Clone, Args)]
pub struct BackendConfig {
    /// Backend project URL
    #[arg(
        long,
        env = "HOMEFIX_BACKEND_URL",
        default_value = "http://localhost:54321",
        global = true
    )]
    pub backend_url: String,

    /// Public anonymous API key
    #[arg(
        long,
        env = "HOMEFIX_ANON_KEY",
        default_value = "",
        hide_env_values = true,
        global = true
    )]
    pub anon_key: String,

    /// Access token of the signed-in user
    #[arg(long, env = "HOMEFIX_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub access_token: Option<String>,

    /// Id of the signed-in user
    #[arg(long, env = "HOMEFIX_USER_ID", global = true)]
    pub user_id: Option<String>,

    /// Email of the signed-in user
    #[arg(long, env = "HOMEFIX_USER_EMAIL", global = true)]
    pub user_email: Option<String>,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "HOMEFIX_REQUEST_TIMEOUT_SECONDS",
        default_value_t = 10u64,
        global = true
    )]
    pub request_timeout_seconds: u64,
}

impl BackendConfig {
    /// Gateway settings.
    #[must_use]
    pub fn gateway(&self) -> RestGatewayConfig {
        RestGatewayConfig {
            url: self.backend_url.clone(),
            anon_key: self.anon_key.clone(),
            timeout: Duration::from_secs(self.request_timeout_seconds),
        }
    }

    /// The session described by the token and user id, when both are set.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        let token = self.access_token.as_deref().filter(|t| !t.trim().is_empty())?;
        let user_id = self.user_id.as_deref().filter(|id| !id.trim().is_empty())?;

        let mut session = Session::new(UserId::new(user_id), token);
        session.email.clone_from(&self.user_email);

        Some(session)
    }
}
