//! Remote data gateway
//!
//! The hosted backend exposes each collection as rows over HTTP. Callers go
//! through [`RemoteGateway`] so the stores can be exercised against a mock.

use std::fmt::{Display, Formatter, Result as FmtResult};

use async_trait::async_trait;
use homefix::profiles::Session;
use mockall::automock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

pub mod errors;
pub mod records;
mod rest;

pub use errors::{GatewayError, classify_failure};
pub use rest::{RestGateway, RestGatewayConfig};

/// One row as returned by the backend.
pub type Row = Map<String, Value>;

/// Remote collections this client reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Saved addresses, keyed by `user_id`.
    Addresses,

    /// Bookings, keyed by `user_id` and `provider_id`.
    Bookings,

    /// Catalog overrides.
    Services,

    /// Provider details for users who became providers.
    ProviderProfiles,

    /// User profiles.
    Profiles,
}

impl Collection {
    /// Name of the collection on the backend.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Addresses => "addresses",
            Self::Bookings => "bookings",
            Self::Services => "services",
            Self::ProviderProfiles => "provider_profiles",
            Self::Profiles => "profiles",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

/// Equality filters and a row limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<(String, String)>,
    limit: Option<usize>,
}

impl Query {
    /// Match every row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows where `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Display) -> Self {
        self.filters.push((column.into(), value.to_string()));
        self
    }

    /// Return at most `limit` rows.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether no filter is set.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.filters.is_empty()
    }

    /// Query-string parameters in the backend's filter syntax.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|(column, value)| (column.clone(), format!("eq.{value}")))
            .collect();

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }
}

#[automock]
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// The current session, if signed in.
    fn session(&self) -> Option<Session>;

    /// Read rows matching `query`.
    async fn select(&self, collection: Collection, query: Query) -> Result<Vec<Row>, GatewayError>;

    /// Insert one row and return it as stored.
    async fn insert(&self, collection: Collection, row: Value) -> Result<Vec<Row>, GatewayError>;

    /// Patch rows matching `query` and return them as stored.
    async fn update(
        &self,
        collection: Collection,
        query: Query,
        patch: Value,
    ) -> Result<Vec<Row>, GatewayError>;

    /// Delete rows matching `query` and return what was removed.
    async fn delete(&self, collection: Collection, query: Query) -> Result<Vec<Row>, GatewayError>;
}

/// Decode rows, skipping (and logging) any that do not fit `T`.
pub fn decode_rows<T: DeserializeOwned>(collection: Collection, rows: Vec<Row>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(Value::Object(row)) {
            Ok(decoded) => Some(decoded),
            Err(error) => {
                warn!(%collection, %error, "skipping undecodable row");
                None
            }
        })
        .collect()
}

/// Decode the first row that fits `T`.
pub fn decode_first<T: DeserializeOwned>(collection: Collection, rows: Vec<Row>) -> Option<T> {
    decode_rows(collection, rows).into_iter().next()
}
