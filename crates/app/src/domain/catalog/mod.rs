//! Catalog

pub mod service;

pub use service::*;
