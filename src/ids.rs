//! Typed identifiers

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use jiff::Timestamp;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prefix carried by identifiers minted on this device rather than by the backend.
pub const LOCAL_ID_PREFIX: &str = "local-";

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 7;

/// An opaque string identifier tagged with the entity it names.
///
/// Identifiers are either assigned by the backend or synthesized locally with
/// a `local-` prefix.
pub struct TypedId<T>(String, PhantomData<fn() -> T>);

impl<T> TypedId<T> {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into(), PhantomData)
    }

    /// Mint a `local-<unix millis>` identifier.
    #[must_use]
    pub fn local(now: Timestamp) -> Self {
        Self::new(format!("{LOCAL_ID_PREFIX}{}", now.as_millisecond()))
    }

    /// Mint a `local-<unix millis>-<token>` identifier with a random base36 token.
    pub fn local_with_token<R: Rng + ?Sized>(now: Timestamp, rng: &mut R) -> Self {
        let token: String = (0..TOKEN_LEN)
            .map(|_| {
                let index = rng.gen_range(0..TOKEN_ALPHABET.len());

                TOKEN_ALPHABET.get(index).copied().map_or('0', char::from)
            })
            .collect();

        Self::new(format!(
            "{LOCAL_ID_PREFIX}{}-{token}",
            now.as_millisecond()
        ))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether this identifier was synthesized on this device.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_ID_PREFIX)
    }

    /// Whether the identifier is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// ASCII case-insensitive comparison.
    #[must_use]
    pub fn eq_ignore_case(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl<T> Clone for TypedId<T> {
    fn clone(&self) -> Self {
        Self::new(self.0.clone())
    }
}

impl<T> Debug for TypedId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl<T> Display for TypedId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for TypedId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for TypedId<T> {}

impl<T> Hash for TypedId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> PartialOrd for TypedId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TypedId<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> From<&str> for TypedId<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T> From<String> for TypedId<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T> AsRef<str> for TypedId<T> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<T> Serialize for TypedId<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de, T> Deserialize<'de> for TypedId<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use testresult::TestResult;

    use super::*;

    struct Thing;

    type ThingId = TypedId<Thing>;

    #[test]
    fn local_id_uses_millis() -> TestResult {
        let now = Timestamp::from_millisecond(1_714_000_000_123)?;
        let id = ThingId::local(now);

        assert_eq!(id.as_str(), "local-1714000000123");
        assert!(id.is_local());

        Ok(())
    }

    #[test]
    fn local_id_with_token_has_three_parts() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = ThingId::local_with_token(Timestamp::now(), &mut rng);

        let mut parts = id.as_str().splitn(3, '-');

        assert_eq!(parts.next(), Some("local"));
        assert!(
            parts
                .next()
                .is_some_and(|millis| millis.chars().all(|c| c.is_ascii_digit())),
            "second segment should be digits: {id}"
        );
        assert!(
            parts.next().is_some_and(|token| token.len() == TOKEN_LEN
                && token
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())),
            "third segment should be a base36 token: {id}"
        );
    }

    #[test]
    fn server_ids_are_not_local() {
        assert!(!ThingId::new("8c1f0e6a").is_local());
    }

    #[test]
    fn case_insensitive_comparison() {
        assert!(ThingId::new("User-ABC").eq_ignore_case(&ThingId::new("user-abc")));
        assert_ne!(ThingId::new("User-ABC"), ThingId::new("user-abc"));
    }

    #[test]
    fn serializes_as_plain_string() -> TestResult {
        let id = ThingId::new("abc");

        assert_eq!(serde_json::to_string(&id)?, "\"abc\"");
        assert_eq!(serde_json::from_str::<ThingId>("\"abc\"")?, id);

        Ok(())
    }
}
