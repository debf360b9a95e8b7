//! App Context

use std::sync::Arc;

use homefix::catalog::Catalog;
use thiserror::Error;
use tracing::debug;

use crate::{
    config::AppConfig,
    domain::{
        addresses::{AddressesService, SyncedAddressesService},
        bookings::BookingStore,
        cart::CartStore,
        catalog::{CatalogService, RemoteCatalogService},
        checkout::{CheckoutService, SagaCheckoutService},
        profiles::{ProfilesService, RemoteProfilesService},
    },
    gateway::{RemoteGateway, RestGateway},
    storage::{LocalStorage, StorageError},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to open local storage")]
    Storage(#[source] StorageError),

    #[error("failed to build HTTP client")]
    Http(#[source] reqwest::Error),
}

/// Every store and service, wired to one gateway and one storage adapter.
#[derive(Clone)]
pub struct AppContext {
    pub storage: Arc<LocalStorage>,
    pub gateway: Arc<dyn RemoteGateway>,
    pub cart: Arc<CartStore>,
    pub bookings: Arc<BookingStore>,
    pub addresses: Arc<dyn AddressesService>,
    pub catalog: Arc<dyn CatalogService>,
    pub profiles: Arc<dyn ProfilesService>,
    pub checkout: Arc<dyn CheckoutService>,
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the data directory cannot be opened or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let storage = LocalStorage::on_disk(&config.storage.data_dir, config.storage.storage_quota)
            .map_err(AppInitError::Storage)?;

        let gateway = RestGateway::new(config.backend.gateway())
            .map_err(AppInitError::Http)?
            .with_session(config.backend.session());

        debug!(
            data_dir = %config.storage.data_dir.display(),
            signed_in = gateway.session().is_some(),
            "initialised app context"
        );

        Ok(Self::new(Arc::new(gateway), Arc::new(storage)))
    }

    /// Wire the stores and services around `gateway` and `storage`.
    #[must_use]
    pub fn new(gateway: Arc<dyn RemoteGateway>, storage: Arc<LocalStorage>) -> Self {
        let cart = Arc::new(CartStore::load(storage.clone()));
        let bookings = Arc::new(BookingStore::load(storage.clone()));

        Self {
            addresses: Arc::new(SyncedAddressesService::new(
                gateway.clone(),
                storage.clone(),
            )),
            catalog: Arc::new(RemoteCatalogService::new(
                Catalog::builtin(),
                gateway.clone(),
            )),
            profiles: Arc::new(RemoteProfilesService::new(
                gateway.clone(),
                storage.clone(),
            )),
            checkout: Arc::new(SagaCheckoutService::new(
                cart.clone(),
                bookings.clone(),
                gateway.clone(),
                storage.clone(),
            )),
            cart,
            bookings,
            gateway,
            storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test::{TestContext, service};

    use super::*;

    #[test]
    fn services_share_the_same_stores() {
        let ctx = TestContext::new();
        let app = AppContext::new(Arc::new(TestContext::signed_out_gateway()), ctx.storage.clone());

        app.cart.add(service("301"));

        assert_eq!(app.checkout.quote(0).subtotal, 999);
    }

    #[test]
    fn state_is_reloaded_from_disk() {
        let ctx = TestContext::new();
        let first = AppContext::new(Arc::new(TestContext::signed_out_gateway()), ctx.storage.clone());
        first.cart.add(service("101"));

        let second = AppContext::new(Arc::new(TestContext::signed_out_gateway()), ctx.restarted());

        assert_eq!(second.cart.total_price(), 499);
    }
}
