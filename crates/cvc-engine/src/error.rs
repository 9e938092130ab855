//! Error types for the transition engine

use crate::model::TransitionInput;
use std::fmt;
use thiserror::Error;

/// Errors returned when a transition cannot be started
///
/// Every variant hands the original [`TransitionInput`] back, so the caller
/// keeps ownership of its correlation handle. No slot is consumed and no
/// callback will fire for a rejected start.
#[derive(Error)]
pub enum StartError<H> {
    /// A transition time of zero is invalid
    #[error("transition time of zero is invalid")]
    InvalidTransitionTime(TransitionInput<H>),

    /// Every slot in the endpoint's partition is occupied
    #[error("no free transition slot on endpoint {}", .0.endpoint)]
    NoFreeSlot(TransitionInput<H>),

    /// The endpoint is not part of the device context
    #[error("endpoint {} is not registered", .0.endpoint)]
    UnknownEndpoint(TransitionInput<H>),
}

impl<H> StartError<H> {
    /// Reclaim the rejected input
    #[must_use]
    pub fn into_input(self) -> TransitionInput<H> {
        match self {
            StartError::InvalidTransitionTime(input)
            | StartError::NoFreeSlot(input)
            | StartError::UnknownEndpoint(input) => input,
        }
    }
}

impl<H> fmt::Debug for StartError<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::InvalidTransitionTime(input) => {
                f.debug_tuple("InvalidTransitionTime").field(input).finish()
            }
            StartError::NoFreeSlot(input) => f.debug_tuple("NoFreeSlot").field(input).finish(),
            StartError::UnknownEndpoint(input) => {
                f.debug_tuple("UnknownEndpoint").field(input).finish()
            }
        }
    }
}
