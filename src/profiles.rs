//! Users, roles and sessions

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{addresses::Address, ids::TypedId};

/// User identifier.
pub type UserId = TypedId<UserProfile>;

/// What a user can do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Books services.
    #[default]
    Customer,

    /// Offers services.
    Provider,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Customer => "customer",
            Self::Provider => "provider",
        })
    }
}

/// Identity and role of a signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    pub id: UserId,

    /// Customer or provider.
    #[serde(default)]
    pub role: Role,

    /// Display name.
    pub full_name: String,

    /// Email address.
    #[serde(default)]
    pub email: String,

    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// Addresses already known for this user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
}

impl UserProfile {
    /// Build a profile from whatever the session knows about the user.
    ///
    /// The name falls back from `full_name` to `name` to the email local part
    /// and finally to "User".
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let meta = |key: &str| {
            session
                .metadata
                .get(key)
                .and_then(Value::as_str)
                .filter(|value| !value.trim().is_empty())
        };

        let email = session.email.clone().unwrap_or_default();

        let full_name = meta("full_name")
            .or_else(|| meta("name"))
            .map(str::to_string)
            .or_else(|| {
                email
                    .split('@')
                    .next()
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "User".to_string());

        let role = match meta("role") {
            Some("provider") => Role::Provider,
            _ => Role::Customer,
        };

        Self {
            id: session.user_id.clone(),
            role,
            full_name,
            email,
            phone: None,
            avatar_url: None,
            addresses: Vec::new(),
        }
    }

    /// Whether the user is a provider.
    #[must_use]
    pub fn is_provider(&self) -> bool {
        self.role == Role::Provider
    }

    /// Promote to provider. There is no way back.
    pub fn promote(&mut self) {
        self.role = Role::Provider;
    }
}

/// An authenticated backend session, obtained by a sign-in flow elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Signed-in user.
    pub user_id: UserId,

    /// Bearer token for the row API.
    pub access_token: String,

    /// Email, when the identity provider shares one.
    pub email: Option<String>,

    /// Free-form user metadata from sign-up.
    pub metadata: Map<String, Value>,
}

impl Session {
    /// A session with no email or metadata.
    pub fn new(user_id: UserId, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            access_token: access_token.into(),
            email: None,
            metadata: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn name_falls_back_through_metadata_then_email() {
        let mut session = Session::new(UserId::new("u-1"), "token");
        session.email = Some("asha@example.com".to_string());

        assert_eq!(UserProfile::from_session(&session).full_name, "asha");

        session.metadata.insert("name".to_string(), json!("Asha K"));
        assert_eq!(UserProfile::from_session(&session).full_name, "Asha K");

        session
            .metadata
            .insert("full_name".to_string(), json!("Asha Kulkarni"));
        assert_eq!(
            UserProfile::from_session(&session).full_name,
            "Asha Kulkarni"
        );
    }

    #[test]
    fn anonymous_session_is_called_user() {
        let session = Session::new(UserId::new("u-1"), "token");
        let profile = UserProfile::from_session(&session);

        assert_eq!(profile.full_name, "User");
        assert_eq!(profile.role, Role::Customer);
    }

    #[test]
    fn role_comes_from_metadata() {
        let mut session = Session::new(UserId::new("u-1"), "token");
        session.metadata.insert("role".to_string(), json!("provider"));

        assert!(UserProfile::from_session(&session).is_provider());
    }

    #[test]
    fn promotion_is_one_way() {
        let session = Session::new(UserId::new("u-1"), "token");
        let mut profile = UserProfile::from_session(&session);

        profile.promote();
        profile.promote();

        assert!(profile.is_provider());
    }
}
