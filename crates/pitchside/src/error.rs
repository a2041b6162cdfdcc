//! Unified error type for Pitchside.

use pitchside_protocol::ProtocolError;
use pitchside_registry::RegistryError;
use pitchside_router::RouterError;
use pitchside_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `pitchside` crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PitchsideError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, missing field).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A roster error (duplicate, not found).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A router error (not joined, router stopped).
    #[error(transparent)]
    Router(#[from] RouterError),
}
