//! Address service models.

use homefix::addresses::Address;

use crate::gateway::GatewayError;

/// Where a saved address ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum SavedAddress {
    /// Stored by the backend, with its server id.
    Remote(Address),

    /// Stored or changed on this device only.
    ///
    /// `reason` is the remote failure that caused the fallback, or `None`
    /// when the address never existed remotely.
    Local {
        address: Address,
        reason: Option<GatewayError>,
    },
}

impl SavedAddress {
    /// The saved address.
    #[must_use]
    pub fn address(&self) -> &Address {
        match self {
            Self::Remote(address) | Self::Local { address, .. } => address,
        }
    }

    /// Take the saved address.
    #[must_use]
    pub fn into_address(self) -> Address {
        match self {
            Self::Remote(address) | Self::Local { address, .. } => address,
        }
    }

    /// Whether the save fell back to this device.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }

    /// Whether an access policy caused the fallback.
    #[must_use]
    pub fn denied_by_policy(&self) -> bool {
        matches!(
            self,
            Self::Local {
                reason: Some(reason),
                ..
            } if reason.is_permission_denied()
        )
    }
}
