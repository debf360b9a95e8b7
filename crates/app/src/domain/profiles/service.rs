//! Profile service.

use std::sync::Arc;

use async_trait::async_trait;
use homefix::profiles::{Session, UserProfile};
use mockall::automock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::{
    domain::profiles::errors::ProfileError,
    gateway::{
        Collection, GatewayError, Query, RemoteGateway, decode_first,
        records::{ProfileInsert, ProfileRow, ProviderProfileInsert},
    },
    storage::{LocalStorage, keys},
};

/// Profiles fetched from the backend and cached on this device.
#[derive(Clone)]
pub struct RemoteProfilesService {
    gateway: Arc<dyn RemoteGateway>,
    storage: Arc<LocalStorage>,
}

impl RemoteProfilesService {
    #[must_use]
    pub fn new(gateway: Arc<dyn RemoteGateway>, storage: Arc<LocalStorage>) -> Self {
        Self { gateway, storage }
    }

    fn cached_for(&self, session: &Session) -> Option<UserProfile> {
        self.cached().filter(|cached| cached.id == session.user_id)
    }

    async fn fetch_or_create(&self, session: &Session) -> UserProfile {
        let query = Query::new().eq("id", &session.user_id).limit(1);

        match self.gateway.select(Collection::Profiles, query).await {
            Ok(rows) => match decode_first::<ProfileRow>(Collection::Profiles, rows) {
                Some(row) => row.into_profile(session),
                None => {
                    let profile = UserProfile::from_session(session);
                    self.create_remote(&profile).await;
                    profile
                }
            },
            Err(error) => {
                warn!(%error, "profile unavailable, using session details");
                UserProfile::from_session(session)
            }
        }
    }

    async fn create_remote(&self, profile: &UserProfile) {
        let body = match serde_json::to_value(ProfileInsert::from(profile)) {
            Ok(body) => body,
            Err(error) => {
                warn!(%error, "failed to encode profile");
                return;
            }
        };

        match self.gateway.insert(Collection::Profiles, body).await {
            Ok(_) => info!(id = %profile.id, "created profile"),
            Err(error) => warn!(id = %profile.id, %error, "failed to create profile"),
        }
    }

    async fn has_provider_profile(&self, session: &Session) -> Result<bool, GatewayError> {
        let rows = self
            .gateway
            .select(
                Collection::ProviderProfiles,
                Query::new().eq("id", &session.user_id).limit(1),
            )
            .await?;

        Ok(!rows.is_empty())
    }

    /// Apply a remote write, treating policy rejections and missing tables as
    /// a reason to continue locally.
    async fn write_or_degrade(
        &self,
        what: &str,
        write: impl Future<Output = Result<(), GatewayError>>,
    ) -> Result<(), ProfileError> {
        match write.await {
            Ok(()) => Ok(()),
            Err(error @ (GatewayError::PermissionDenied(_) | GatewayError::SchemaUnavailable)) => {
                warn!(%error, "{what} rejected remotely, continuing on this device");
                Ok(())
            }
            Err(error) => Err(error.into()),
        }
    }

    fn cache(&self, profile: &UserProfile) {
        self.storage.write_durable(keys::USER, profile);
    }
}

#[async_trait]
impl ProfilesService for RemoteProfilesService {
    async fn load(&self) -> Option<UserProfile> {
        let session = self.gateway.session()?;

        let mut profile = self.fetch_or_create(&session).await;

        match self.has_provider_profile(&session).await {
            Ok(true) => profile.promote(),
            Ok(false) => {}
            Err(error) => debug!(%error, "provider profile unavailable"),
        }

        if let Some(cached) = self.cached_for(&session) {
            if cached.is_provider() {
                profile.promote();
            }

            if profile.addresses.is_empty() {
                profile.addresses = cached.addresses;
            }
        }

        self.cache(&profile);

        Some(profile)
    }

    async fn become_provider(&self) -> Result<UserProfile, ProfileError> {
        let session = self.gateway.session().ok_or(ProfileError::NotSignedIn)?;

        let mut profile = self
            .cached_for(&session)
            .unwrap_or_else(|| UserProfile::from_session(&session));

        if profile.is_provider() {
            return Ok(profile);
        }

        self.write_or_degrade("role change", async {
            self.gateway
                .update(
                    Collection::Profiles,
                    Query::new().eq("id", &session.user_id),
                    json!({ "role": "provider" }),
                )
                .await
                .map(drop)
        })
        .await?;

        if !self.has_provider_profile(&session).await.unwrap_or(false) {
            let body = serde_json::to_value(ProviderProfileInsert {
                id: &session.user_id,
                business_name: &profile.full_name,
                description: "",
            })
            .map_err(|error| GatewayError::Unknown(error.to_string()))?;

            self.write_or_degrade("provider profile", async {
                self.gateway
                    .insert(Collection::ProviderProfiles, body)
                    .await
                    .map(drop)
            })
            .await?;
        }

        profile.promote();
        self.cache(&profile);

        info!(id = %profile.id, "user is now a provider");

        Ok(profile)
    }

    fn cached(&self) -> Option<UserProfile> {
        self.storage.read_durable(keys::USER)
    }
}

#[automock]
#[async_trait]
pub trait ProfilesService: Send + Sync {
    /// Load the signed-in user's profile and cache it.
    ///
    /// Never fails: a missing remote profile is created from the session,
    /// and any remote failure falls back to session details. Returns `None`
    /// when signed out.
    async fn load(&self) -> Option<UserProfile>;

    /// Turn the signed-in customer into a provider.
    ///
    /// The promotion is kept on this device when an access policy or a
    /// missing table rejects the remote write.
    async fn become_provider(&self) -> Result<UserProfile, ProfileError>;

    /// The profile cached on this device.
    fn cached(&self) -> Option<UserProfile>;
}
