//! Storage keys shared with earlier releases of the app.

/// Durable: serialized cart lines.
pub const CART: &str = "cart";

/// Durable: serialized bookings.
pub const BOOKINGS: &str = "bookings";

/// Durable: addresses saved on this device.
pub const USER_ADDRESSES: &str = "userAddresses";

/// Session: the address created most recently.
pub const LATEST_ADDRESS: &str = "latestAddress";

/// Durable: cached profile of the signed-in user.
pub const USER: &str = "user";
