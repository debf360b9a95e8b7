//! Catalog service.

use std::sync::Arc;

use async_trait::async_trait;
use homefix::catalog::{Catalog, ServiceCategory, ServiceId, ServiceSnapshot};
use mockall::automock;
use tracing::debug;

use crate::gateway::{Collection, Query, RemoteGateway, decode_first, records::ServiceRow};

/// The built-in catalog, with per-service overrides from the backend.
#[derive(Clone)]
pub struct RemoteCatalogService {
    catalog: Catalog,
    gateway: Arc<dyn RemoteGateway>,
}

impl RemoteCatalogService {
    #[must_use]
    pub fn new(catalog: Catalog, gateway: Arc<dyn RemoteGateway>) -> Self {
        Self { catalog, gateway }
    }
}

#[async_trait]
impl CatalogService for RemoteCatalogService {
    fn categories(&self) -> Vec<ServiceCategory> {
        self.catalog.categories().to_vec()
    }

    fn category(&self, id: &str) -> Option<ServiceCategory> {
        self.catalog.category(id).cloned()
    }

    fn search(&self, term: &str) -> Vec<ServiceSnapshot> {
        self.catalog.search(term).into_iter().cloned().collect()
    }

    async fn service(&self, id: ServiceId) -> Option<ServiceSnapshot> {
        let mut service = self.catalog.service(&id)?.clone();

        match self
            .gateway
            .select(Collection::Services, Query::new().eq("id", &id).limit(1))
            .await
        {
            Ok(rows) => {
                if let Some(row) = decode_first::<ServiceRow>(Collection::Services, rows) {
                    debug!(%id, "applying remote service overrides");
                    service.apply_override(row.overrides);
                }
            }
            Err(error) => debug!(%id, %error, "using built-in service details"),
        }

        Some(service)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Every category with its services.
    fn categories(&self) -> Vec<ServiceCategory>;

    /// One category by id.
    fn category(&self, id: &str) -> Option<ServiceCategory>;

    /// Services whose name or category mention `term`.
    fn search(&self, term: &str) -> Vec<ServiceSnapshot>;

    /// One service, preferring remote details over the built-in ones.
    ///
    /// Only services in the built-in catalog are known; remote rows can
    /// change their fields but not add new services.
    async fn service(&self, id: ServiceId) -> Option<ServiceSnapshot>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        gateway::{GatewayError, MockRemoteGateway},
        test::row,
    };

    use super::*;

    fn catalog(gateway: MockRemoteGateway) -> RemoteCatalogService {
        RemoteCatalogService::new(Catalog::builtin(), Arc::new(gateway))
    }

    #[tokio::test]
    async fn remote_row_overrides_selected_fields() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_select()
            .withf(|collection, query| {
                *collection == Collection::Services
                    && *query == Query::new().eq("id", "202").limit(1)
            })
            .returning(|_, _| Ok(vec![row(json!({"id": 202, "price": 749, "name": "Tap Fix"}))]));

        let service = catalog(gateway).service(ServiceId::new("202")).await;

        assert_eq!(service.as_ref().map(|s| s.price), Some(749));
        assert_eq!(service.as_ref().map(|s| s.name.as_str()), Some("Tap Fix"));
        assert_eq!(service.map(|s| s.category), Some("Home Repair & Maintenance".to_string()));
    }

    #[tokio::test]
    async fn remote_failure_uses_builtin_details() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_select()
            .returning(|_, _| Err(GatewayError::Unknown("offline".to_string())));

        let service = catalog(gateway).service(ServiceId::new("101")).await;

        assert_eq!(service.map(|s| s.price), Some(499));
    }

    #[tokio::test]
    async fn unknown_service_skips_the_backend() {
        let service = catalog(MockRemoteGateway::new())
            .service(ServiceId::new("999"))
            .await;

        assert!(service.is_none(), "expected no service");
    }

    #[test]
    fn search_and_categories_come_from_the_builtin_catalog() {
        let catalog = catalog(MockRemoteGateway::new());

        assert_eq!(catalog.categories().len(), 4);
        assert_eq!(catalog.search("tech").len(), 3);
        assert_eq!(
            catalog.category("1").map(|category| category.name),
            Some("Automobile & Roadside Assistance".to_string())
        );
        assert!(catalog.category("9").is_none(), "expected no category 9");
    }
}
