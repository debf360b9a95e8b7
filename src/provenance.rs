//! Address source resolution
//!
//! Addresses can come from four places at once. Rather than letting the last
//! source checked win, [`resolve_addresses`] picks one source by a fixed rule:
//! the source holding the most addresses wins, and ties go to the source with
//! the higher [`Provenance`] priority. Sources are never merged.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::addresses::{Address, AddressId};

/// Where a list of addresses was obtained from, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Already held in memory by the signed-in user's context.
    Memory,

    /// The session-scoped "most recently added" slot.
    Session,

    /// The remote backend.
    Remote,

    /// The durable local list.
    Durable,
}

impl Provenance {
    /// Lower is preferred on ties.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Memory => 0,
            Self::Session => 1,
            Self::Remote => 2,
            Self::Durable => 3,
        }
    }

    /// Whether the data came from this device rather than the backend.
    #[must_use]
    pub const fn is_local(self) -> bool {
        !matches!(self, Self::Remote)
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Session => "session",
            Self::Remote => "remote",
            Self::Durable => "durable",
        })
    }
}

/// The adopted address list and where it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedAddresses {
    /// Addresses from the winning source.
    pub addresses: Vec<Address>,

    /// The winning source, `None` when every source was empty.
    pub provenance: Option<Provenance>,
}

impl ResolvedAddresses {
    /// The address a form should preselect.
    ///
    /// The just-created address wins when the adopted list contains it,
    /// otherwise the first address.
    #[must_use]
    pub fn preferred(&self, latest: Option<&AddressId>) -> Option<&Address> {
        latest
            .and_then(|id| self.addresses.iter().find(|address| &address.id == id))
            .or_else(|| self.addresses.first())
    }

    /// Find an address by id.
    #[must_use]
    pub fn get(&self, id: &AddressId) -> Option<&Address> {
        self.addresses.iter().find(|address| &address.id == id)
    }

    /// Whether no source yielded anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Pick one address source: highest cardinality wins, ties broken by priority.
#[must_use]
pub fn resolve_addresses(sources: Vec<(Provenance, Vec<Address>)>) -> ResolvedAddresses {
    sources
        .into_iter()
        .filter(|(_, addresses)| !addresses.is_empty())
        .min_by(|(a_source, a), (b_source, b)| {
            b.len()
                .cmp(&a.len())
                .then_with(|| a_source.priority().cmp(&b_source.priority()))
        })
        .map(|(provenance, addresses)| ResolvedAddresses {
            addresses,
            provenance: Some(provenance),
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::addresses::{AddressType, Pincode};

    use super::*;

    fn address(id: &str) -> Address {
        Address {
            id: AddressId::new(id),
            kind: AddressType::Home,
            address: format!("{id} Main Street"),
            city: "Mumbai".to_string(),
            pincode: Pincode::parse("400001").unwrap_or_else(|_| unreachable!()),
            latitude: None,
            longitude: None,
        }
    }

    fn addresses(ids: &[&str]) -> Vec<Address> {
        ids.iter().map(|id| address(id)).collect()
    }

    #[test]
    fn empty_sources_resolve_to_nothing() {
        let resolved = resolve_addresses(vec![
            (Provenance::Memory, Vec::new()),
            (Provenance::Remote, Vec::new()),
        ]);

        assert!(resolved.is_empty());
        assert_eq!(resolved.provenance, None);
    }

    #[test]
    fn largest_source_wins() {
        let resolved = resolve_addresses(vec![
            (Provenance::Memory, addresses(&["a"])),
            (Provenance::Session, addresses(&["local-1"])),
            (Provenance::Remote, addresses(&["a", "b"])),
            (Provenance::Durable, addresses(&["a", "b", "local-1"])),
        ]);

        assert_eq!(resolved.provenance, Some(Provenance::Durable));
        assert_eq!(resolved.addresses.len(), 3);
    }

    #[test]
    fn ties_go_to_higher_priority_regardless_of_order() {
        let resolved = resolve_addresses(vec![
            (Provenance::Durable, addresses(&["x", "y"])),
            (Provenance::Remote, addresses(&["a", "b"])),
        ]);

        assert_eq!(resolved.provenance, Some(Provenance::Remote));
        assert_eq!(resolved.addresses.first().map(|a| a.id.as_str()), Some("a"));
    }

    #[test]
    fn sources_are_not_merged() {
        let resolved = resolve_addresses(vec![
            (Provenance::Remote, addresses(&["a", "b"])),
            (Provenance::Session, addresses(&["local-9"])),
        ]);

        assert!(resolved.get(&AddressId::new("local-9")).is_none());
    }

    #[test]
    fn preferred_favours_latest_when_present() {
        let resolved = resolve_addresses(vec![(
            Provenance::Durable,
            addresses(&["a", "local-2"]),
        )]);

        let latest = AddressId::new("local-2");
        let missing = AddressId::new("local-3");

        assert_eq!(
            resolved.preferred(Some(&latest)).map(|a| a.id.as_str()),
            Some("local-2")
        );
        assert_eq!(
            resolved.preferred(Some(&missing)).map(|a| a.id.as_str()),
            Some("a")
        );
        assert_eq!(resolved.preferred(None).map(|a| a.id.as_str()), Some("a"));
    }
}
