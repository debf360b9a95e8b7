//! Address book service.

use std::sync::Arc;

use async_trait::async_trait;
use homefix::{
    addresses::{Address, AddressId, NewAddress, ValidAddress},
    profiles::Session,
    provenance::{Provenance, ResolvedAddresses, resolve_addresses},
};
use jiff::Timestamp;
use mockall::automock;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    domain::addresses::{errors::AddressError, models::SavedAddress},
    gateway::{
        Collection, GatewayError, Query, RemoteGateway, Row, decode_first, decode_rows,
        records::{AddressRow, AddressWrite},
    },
    storage::{LocalStorage, keys},
};

/// Addresses reconciled across memory, session, remote and durable sources.
#[derive(Clone)]
pub struct SyncedAddressesService {
    gateway: Arc<dyn RemoteGateway>,
    storage: Arc<LocalStorage>,
}

impl SyncedAddressesService {
    #[must_use]
    pub fn new(gateway: Arc<dyn RemoteGateway>, storage: Arc<LocalStorage>) -> Self {
        Self { gateway, storage }
    }

    async fn fetch_remote(&self) -> Vec<Address> {
        let Some(session) = self.gateway.session() else {
            return Vec::new();
        };

        match self
            .gateway
            .select(
                Collection::Addresses,
                Query::new().eq("user_id", &session.user_id),
            )
            .await
        {
            Ok(rows) => decode_rows::<AddressRow>(Collection::Addresses, rows)
                .into_iter()
                .filter_map(|row| {
                    row.into_address()
                        .inspect_err(|error| warn!(%error, "skipping remote address"))
                        .ok()
                })
                .collect(),
            Err(error) => {
                debug!(%error, "remote addresses unavailable");
                Vec::new()
            }
        }
    }

    fn saved_on_device(&self) -> Vec<Address> {
        self.storage
            .read_durable::<Vec<Value>>(keys::USER_ADDRESSES)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect()
    }

    fn save_locally(
        &self,
        valid: ValidAddress,
        reason: Option<GatewayError>,
    ) -> Result<SavedAddress, AddressError> {
        let mut saved = self.saved_on_device();

        let now = Timestamp::now();
        let mut id = AddressId::local(now);

        if saved.iter().any(|address| address.id == id) {
            id = AddressId::local_with_token(now, &mut rand::thread_rng());
        }

        let address = valid.with_id(id);
        saved.push(address.clone());

        let in_session = self.storage.write_session(keys::LATEST_ADDRESS, &address);
        let on_device = self.storage.write_durable(keys::USER_ADDRESSES, &saved);

        if !in_session && !on_device {
            return Err(AddressError::NotSaved(
                reason.unwrap_or(GatewayError::NotAuthenticated),
            ));
        }

        info!(id = %address.id, in_session, on_device, "saved address on this device");

        Ok(SavedAddress::Local { address, reason })
    }

    /// Keep a copy of a remotely saved address on this device.
    fn remember(&self, address: &Address) {
        let mut saved = self.saved_on_device();
        saved.retain(|saved| saved.id != address.id);
        saved.push(address.clone());

        self.storage.write_durable(keys::USER_ADDRESSES, &saved);
    }

    /// Replace `address` wherever this device holds a copy, returning
    /// whether one was found.
    fn replace_locally(&self, address: &Address) -> bool {
        let mut found = false;

        let mut saved = self.saved_on_device();

        if let Some(slot) = saved.iter_mut().find(|saved| saved.id == address.id) {
            slot.clone_from(address);
            found = self.storage.write_durable(keys::USER_ADDRESSES, &saved);
        }

        if self.latest().is_some_and(|latest| latest.id == address.id) {
            found |= self.storage.write_session(keys::LATEST_ADDRESS, address);
        }

        found
    }

    /// Patch the user's row, returning `None` when the backend has no such row.
    async fn update_remote(
        &self,
        session: &Session,
        id: &AddressId,
        valid: &ValidAddress,
    ) -> Result<Option<Address>, GatewayError> {
        let body = Self::write_body(session, valid)?;

        let rows = self
            .gateway
            .update(
                Collection::Addresses,
                Query::new().eq("id", id).eq("user_id", &session.user_id),
                body,
            )
            .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        first_address(rows).map(Some)
    }

    fn write_body(user: &Session, valid: &ValidAddress) -> Result<Value, GatewayError> {
        serde_json::to_value(AddressWrite::new(&user.user_id, valid))
            .map_err(|error| GatewayError::Unknown(error.to_string()))
    }
}

fn first_address(rows: Vec<Row>) -> Result<Address, GatewayError> {
    decode_first::<AddressRow>(Collection::Addresses, rows)
        .ok_or_else(|| GatewayError::Unknown("no address row returned".to_string()))?
        .into_address()
        .map_err(|error| GatewayError::Unknown(error.to_string()))
}

#[async_trait]
impl AddressesService for SyncedAddressesService {
    async fn load(&self, memory: Vec<Address>) -> ResolvedAddresses {
        let session: Vec<Address> = self.latest().into_iter().collect();
        let remote = self.fetch_remote().await;
        let durable = self.saved_on_device();

        let resolved = resolve_addresses(vec![
            (Provenance::Memory, memory),
            (Provenance::Session, session),
            (Provenance::Remote, remote),
            (Provenance::Durable, durable),
        ]);

        debug!(
            provenance = ?resolved.provenance,
            count = resolved.addresses.len(),
            "resolved addresses"
        );

        resolved
    }

    async fn create(&self, address: NewAddress) -> Result<SavedAddress, AddressError> {
        let valid = address.validate()?;

        let Some(session) = self.gateway.session() else {
            return self.save_locally(valid, Some(GatewayError::NotAuthenticated));
        };

        let inserted = match Self::write_body(&session, &valid) {
            Ok(body) => self
                .gateway
                .insert(Collection::Addresses, body)
                .await
                .and_then(first_address),
            Err(error) => Err(error),
        };

        match inserted {
            Ok(address) => {
                self.storage.write_session(keys::LATEST_ADDRESS, &address);
                self.remember(&address);
                info!(id = %address.id, "saved address remotely");

                Ok(SavedAddress::Remote(address))
            }
            Err(reason) => {
                if reason.falls_back_locally() {
                    warn!(%reason, "remote address save failed, keeping it on this device");
                } else {
                    warn!(%reason, "access policy rejected address, keeping it on this device");
                }

                self.save_locally(valid, Some(reason))
            }
        }
    }

    async fn update(
        &self,
        id: AddressId,
        address: NewAddress,
    ) -> Result<SavedAddress, AddressError> {
        let valid = address.validate()?;

        if id.is_local() {
            let address = valid.with_id(id.clone());

            return if self.replace_locally(&address) {
                Ok(SavedAddress::Local {
                    address,
                    reason: None,
                })
            } else {
                Err(AddressError::NotFound(id))
            };
        }

        let remote = match self.gateway.session() {
            Some(session) => self.update_remote(&session, &id, &valid).await,
            None => Err(GatewayError::NotAuthenticated),
        };

        match remote {
            Ok(Some(updated)) => {
                self.replace_locally(&updated);

                Ok(SavedAddress::Remote(updated))
            }
            Ok(None) => {
                let address = valid.with_id(id.clone());

                if self.replace_locally(&address) {
                    Ok(SavedAddress::Local {
                        address,
                        reason: None,
                    })
                } else {
                    Err(AddressError::NotFound(id))
                }
            }
            Err(reason) => {
                warn!(%id, %reason, "remote address update failed, updating this device");

                let address = valid.with_id(id);

                if self.replace_locally(&address) {
                    Ok(SavedAddress::Local {
                        address,
                        reason: Some(reason),
                    })
                } else {
                    Err(AddressError::Remote(reason))
                }
            }
        }
    }

    async fn delete(&self, id: AddressId) -> Result<(), AddressError> {
        let mut removed = false;
        let mut remote_error = None;

        if !id.is_local() {
            match self.gateway.session() {
                Some(session) => match self
                    .gateway
                    .delete(
                        Collection::Addresses,
                        Query::new()
                            .eq("id", &id)
                            .eq("user_id", &session.user_id),
                    )
                    .await
                {
                    Ok(rows) => removed = !rows.is_empty(),
                    Err(error) => {
                        warn!(%id, %error, "remote address delete failed");
                        remote_error = Some(error);
                    }
                },
                None => remote_error = Some(GatewayError::NotAuthenticated),
            }
        }

        let mut saved = self.saved_on_device();
        let before = saved.len();
        saved.retain(|address| address.id != id);

        if saved.len() != before {
            self.storage.write_durable(keys::USER_ADDRESSES, &saved);
            removed = true;
        }

        if self.latest().is_some_and(|latest| latest.id == id) {
            self.storage.remove_session(keys::LATEST_ADDRESS);
            removed = true;
        }

        match (removed, remote_error) {
            (true, _) => Ok(()),
            (false, Some(error)) => Err(AddressError::Remote(error)),
            (false, None) => Err(AddressError::NotFound(id)),
        }
    }

    fn latest(&self) -> Option<Address> {
        self.storage.read_session(keys::LATEST_ADDRESS)
    }
}

#[automock]
#[async_trait]
pub trait AddressesService: Send + Sync {
    /// Read every source and adopt the one with the most addresses.
    ///
    /// `memory` is what the caller already holds, e.g. the cached profile's
    /// addresses. Remote failures count as an empty source.
    async fn load(&self, memory: Vec<Address>) -> ResolvedAddresses;

    /// Validate and save a new address, remotely when possible.
    ///
    /// Any remote failure, including a missing session, falls back to this
    /// device. The address also becomes the session's latest address.
    async fn create(&self, address: NewAddress) -> Result<SavedAddress, AddressError>;

    /// Validate and replace an existing address.
    async fn update(
        &self,
        id: AddressId,
        address: NewAddress,
    ) -> Result<SavedAddress, AddressError>;

    /// Delete an address remotely and from this device.
    async fn delete(&self, id: AddressId) -> Result<(), AddressError>;

    /// The address created most recently in this session.
    fn latest(&self) -> Option<Address>;
}
