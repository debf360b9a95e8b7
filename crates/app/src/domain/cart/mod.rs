//! Cart

mod store;

pub use store::CartStore;
