//! Test Helpers

use homefix::{
    addresses::{Address, AddressId, AddressType, NewAddress, Pincode},
    catalog::{Catalog, ServiceId, ServiceSnapshot},
    profiles::{Session, UserId},
};
use serde_json::Value;

use crate::gateway::Row;

pub(crate) const USER_ID: &str = "user-1";

pub(crate) fn session() -> Session {
    let mut session = Session::new(UserId::new(USER_ID), "access-token");
    session.email = Some("asha@example.com".to_string());
    session
}

pub(crate) fn service(id: &str) -> ServiceSnapshot {
    Catalog::builtin()
        .service(&ServiceId::new(id))
        .cloned()
        .expect("service should exist in the builtin catalog")
}

pub(crate) fn address(id: &str, city: &str) -> Address {
    Address {
        id: AddressId::new(id),
        kind: AddressType::Home,
        address: "123 Main Street".to_string(),
        city: city.to_string(),
        pincode: Pincode::parse("400001").expect("pincode should be valid"),
        latitude: None,
        longitude: None,
    }
}

pub(crate) fn address_form(city: &str, pincode: &str) -> NewAddress {
    NewAddress {
        kind: AddressType::Home,
        address: "123 Main Street".to_string(),
        city: city.to_string(),
        pincode: pincode.to_string(),
        latitude: None,
        longitude: None,
    }
}

pub(crate) fn row(value: Value) -> Row {
    value.as_object().cloned().expect("row should be a JSON object")
}
