use mc_protocol::PacketState;
use thiserror::Error;

use crate::crypto::EncryptionError;

/// Errors surfaced to callers of the client workflow (`§7` of the protocol
/// design). Codec-level errors (`mc_protocol::DecodeError`) and connection
/// errors are both fatal for the connection -- once the byte stream has
/// desynchronized, or the socket is gone, there's no safe way to keep using
/// it.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("protocol decode error: {0}")]
    Decode(#[from] mc_protocol::DecodeError),

    #[error("protocol encode error: {0}")]
    Encode(#[from] mc_protocol::EncodeError),

    #[error("encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    #[error("operation requires state {expected:?}, connection is in {actual:?}")]
    WrongState {
        expected: PacketState,
        actual: PacketState,
    },

    #[error(
        "compression was activated before encryption; the canonical ordering is \
         encryption first, then compression"
    )]
    OutOfOrderActivation,

    #[error("expected a {expected} packet but the registry resolved a different type")]
    UnexpectedPacket { expected: &'static str },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("connection closed")]
    Disconnected,

    #[error("timed out waiting for a packet")]
    Timeout,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
