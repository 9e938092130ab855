//! Shared ZCL identity surface
//!
//! This crate provides the cluster/attribute identifiers, status codes, and
//! endpoint descriptors that the transition engine is keyed on.

pub mod cluster;
pub mod endpoint;

pub use cluster::ZclStatus;
pub use endpoint::{DeviceContext, DeviceError, Endpoint, MAX_ENDPOINTS};
