//! Homefix client state layer: local persistence, the remote gateway, and the
//! stores and services that reconcile them.

pub mod config;
pub mod context;
pub mod domain;
pub mod gateway;
pub mod observability;
pub mod storage;

#[cfg(test)]
mod test;
