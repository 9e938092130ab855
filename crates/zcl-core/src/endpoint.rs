//! Endpoint descriptors and the per-device endpoint registry

use crate::cluster;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of endpoints a device context can hold
pub const MAX_ENDPOINTS: usize = 8;

/// Errors from endpoint registration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DeviceError {
    /// Endpoint id outside the valid 1..=240 range
    #[error("Invalid endpoint id: {0}")]
    InvalidEndpointId(u8),

    /// Endpoint id already registered
    #[error("Duplicate endpoint id: {0}")]
    DuplicateEndpoint(u8),

    /// Device context is full
    #[error("Device context is full")]
    TooManyEndpoints,
}

/// A device endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    /// Endpoint ID (1-240)
    pub id: u8,
    /// Profile ID (e.g., 0x0104 for Home Automation)
    pub profile_id: u16,
    /// Device ID within the profile
    pub device_id: u16,
    /// Input (server) clusters
    pub in_clusters: Vec<u16>,
    /// Output (client) clusters
    pub out_clusters: Vec<u16>,
}

impl Endpoint {
    /// Create an endpoint with no clusters
    #[must_use]
    pub fn new(id: u8, profile_id: u16, device_id: u16) -> Self {
        Self {
            id,
            profile_id,
            device_id,
            in_clusters: Vec::new(),
            out_clusters: Vec::new(),
        }
    }

    /// Check if endpoint has a specific cluster
    #[must_use]
    pub fn has_cluster(&self, cluster_id: u16) -> bool {
        self.in_clusters.contains(&cluster_id) || self.out_clusters.contains(&cluster_id)
    }

    /// Check if this endpoint can ramp its level
    #[must_use]
    pub fn is_dimmable(&self) -> bool {
        self.has_cluster(cluster::id::LEVEL_CONTROL)
    }

    /// Check if this endpoint can ramp color attributes
    #[must_use]
    pub fn is_color_capable(&self) -> bool {
        self.has_cluster(cluster::id::COLOR_CONTROL)
    }
}

/// The device's endpoint registry
///
/// Built once at application wiring time. The registration order is fixed for
/// the lifetime of the context; the transition engine derives stable slot ids
/// from each endpoint's position here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceContext {
    endpoints: Vec<Endpoint>,
}

impl DeviceContext {
    /// Create an empty device context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint
    pub fn register(&mut self, endpoint: Endpoint) -> Result<(), DeviceError> {
        if endpoint.id == 0 || endpoint.id > 240 {
            return Err(DeviceError::InvalidEndpointId(endpoint.id));
        }
        if self.endpoints.iter().any(|e| e.id == endpoint.id) {
            return Err(DeviceError::DuplicateEndpoint(endpoint.id));
        }
        if self.endpoints.len() >= MAX_ENDPOINTS {
            return Err(DeviceError::TooManyEndpoints);
        }
        self.endpoints.push(endpoint);
        Ok(())
    }

    /// Get an endpoint by id
    #[must_use]
    pub fn get(&self, endpoint_id: u8) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.id == endpoint_id)
    }

    /// Position of an endpoint in the registration order
    #[must_use]
    pub fn index_of(&self, endpoint_id: u8) -> Option<usize> {
        self.endpoints.iter().position(|e| e.id == endpoint_id)
    }

    /// All registered endpoints, in registration order
    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Number of registered endpoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Check whether no endpoints are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
