//! HTTP gateway to the hosted row API.

use std::time::Duration;

use async_trait::async_trait;
use homefix::profiles::Session;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};

use crate::gateway::{Collection, GatewayError, Query, RemoteGateway, Row, classify_failure};

/// Where the backend lives and how to identify this client to it.
#[derive(Debug, Clone)]
pub struct RestGatewayConfig {
    /// Project URL, e.g. `"https://project.supabase.co"`.
    pub url: String,

    /// Public anonymous API key.
    pub anon_key: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// [`RemoteGateway`] over the backend's REST interface.
#[derive(Debug)]
pub struct RestGateway {
    config: RestGatewayConfig,
    http: Client,
    session: RwLock<Option<Session>>,
}

impl RestGateway {
    /// Build a gateway with no session.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(config: RestGatewayConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config,
            http,
            session: RwLock::new(None),
        })
    }

    /// Attach a session obtained by a sign-in flow.
    #[must_use]
    pub fn with_session(self, session: Option<Session>) -> Self {
        *self.session.write() = session;
        self
    }

    /// Replace the current session.
    pub fn set_session(&self, session: Option<Session>) {
        *self.session.write() = session;
    }

    fn url(&self, collection: Collection) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            collection.name()
        )
    }

    fn authorised(&self, request: RequestBuilder) -> Result<RequestBuilder, GatewayError> {
        let session = self.session().ok_or(GatewayError::NotAuthenticated)?;

        Ok(request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(session.access_token)
            .header("Prefer", "return=representation"))
    }

    async fn send(
        &self,
        collection: Collection,
        request: RequestBuilder,
    ) -> Result<Vec<Row>, GatewayError> {
        let response = request.send().await?;

        rows(collection, response).await
    }
}

async fn rows(collection: Collection, response: Response) -> Result<Vec<Row>, GatewayError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let error = classify_failure(status.as_u16(), &body);

        warn!(%collection, status = status.as_u16(), %error, "remote call rejected");

        return Err(error);
    }

    let body = response.text().await?;

    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&body)
        .map_err(|error| GatewayError::Unknown(format!("unexpected response body: {error}")))
}

#[async_trait]
impl RemoteGateway for RestGateway {
    fn session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    async fn select(&self, collection: Collection, query: Query) -> Result<Vec<Row>, GatewayError> {
        debug!(%collection, ?query, "select");

        let request = self
            .authorised(self.http.get(self.url(collection)))?
            .query(&[("select", "*")])
            .query(&query.to_params());

        self.send(collection, request).await
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<Vec<Row>, GatewayError> {
        debug!(%collection, "insert");

        let request = self
            .authorised(self.http.post(self.url(collection)))?
            .json(&row);

        self.send(collection, request).await
    }

    async fn update(
        &self,
        collection: Collection,
        query: Query,
        patch: Value,
    ) -> Result<Vec<Row>, GatewayError> {
        debug!(%collection, ?query, "update");

        if query.is_unfiltered() {
            return Err(GatewayError::Unknown(format!(
                "refusing to update every row of {collection}"
            )));
        }

        let request = self
            .authorised(self.http.patch(self.url(collection)))?
            .query(&query.to_params())
            .json(&patch);

        self.send(collection, request).await
    }

    async fn delete(&self, collection: Collection, query: Query) -> Result<Vec<Row>, GatewayError> {
        debug!(%collection, ?query, "delete");

        if query.is_unfiltered() {
            return Err(GatewayError::Unknown(format!(
                "refusing to delete every row of {collection}"
            )));
        }

        let request = self
            .authorised(self.http.delete(self.url(collection)))?
            .query(&query.to_params());

        self.send(collection, request).await
    }
}

#[cfg(test)]
mod tests {
    use homefix::profiles::UserId;
    use testresult::TestResult;

    use super::*;

    fn gateway() -> Result<RestGateway, reqwest::Error> {
        RestGateway::new(RestGatewayConfig {
            url: "http://127.0.0.1:9/".to_string(),
            anon_key: "anon".to_string(),
            timeout: Duration::from_millis(200),
        })
    }

    #[test]
    fn collection_url_joins_rest_prefix() -> TestResult {
        assert_eq!(
            gateway()?.url(Collection::Bookings),
            "http://127.0.0.1:9/rest/v1/bookings"
        );

        Ok(())
    }

    #[tokio::test]
    async fn no_session_fails_before_any_request() -> TestResult {
        let result = gateway()?
            .select(Collection::Addresses, Query::new())
            .await;

        assert_eq!(result, Err(GatewayError::NotAuthenticated));

        Ok(())
    }

    #[tokio::test]
    async fn unfiltered_delete_is_refused() -> TestResult {
        let gateway =
            gateway()?.with_session(Some(Session::new(UserId::new("u-1"), "token")));

        let result = gateway.delete(Collection::Addresses, Query::new()).await;

        assert!(
            matches!(result, Err(GatewayError::Unknown(_))),
            "expected Unknown, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn session_can_be_replaced() -> TestResult {
        let gateway = gateway()?;

        gateway.set_session(Some(Session::new(UserId::new("u-1"), "token")));
        assert!(gateway.session().is_some(), "session attached");

        gateway.set_session(None);
        assert!(gateway.session().is_none(), "session cleared");

        Ok(())
    }
}
