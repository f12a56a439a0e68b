//! Wire codec, packet schemas, and framing for the Minecraft Java Edition
//! protocol.
//!
//! This crate owns everything that is purely a function of bytes: the
//! primitive type lexicon ([`varint`]/[`primitive`]), the `Encode`/`Decode`
//! traits a packet schema is built from, the `Packet` trait binding a schema
//! to `(id, state, side)`, and the framing/compression/encryption pipeline
//! ([`encode`]/[`decode`]) that turns a byte stream into discrete packet
//! frames. Connection lifecycle, login, and dispatch live in the `mc-client`
//! crate, which is built on top of this one.

extern crate self as mc_protocol;

pub mod bounded;
pub mod decode;
pub mod encode;
mod error;
pub mod primitive;
pub mod registry;
pub mod varint;

pub mod packets;

use std::io::Write;

pub use bounded::Bounded;
pub use error::{DecodeError, EncodeError};
pub use primitive::{Angle, ByteArray, Position, RemainingBytes};
pub use varint::{VarInt, VarLong};

use derive_more::{From, Into};
// Re-exported under the same identifiers as the traits below: derive macros
// and traits live in separate namespaces, so `#[derive(Encode, Decode,
// Packet)]` and `impl Encode for ...` never collide.
pub use mc_protocol_macros::{Decode, Encode, Packet};

/// A Rust type that can be written as the body of a packet, or as the value
/// of one of that body's fields.
pub trait Encode {
    fn encode(&self, w: &mut impl Write) -> Result<(), EncodeError>;
}

/// A Rust type that can be read from a packet body (or field) given a
/// byte slice. Decoding never borrows into `Self` -- every packet schema
/// holds owned data -- which keeps the derive macro free of lifetime
/// plumbing at the cost of a copy per string/byte-array field.
pub trait Decode: Sized {
    fn decode(r: &mut &[u8]) -> Result<Self, DecodeError>;
}

/// The side a packet is intended for.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PacketSide {
    /// Server -> client.
    Clientbound,
    /// Client -> server.
    Serverbound,
}

/// The connection state that determines which packet-id table applies.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PacketState {
    Handshaking,
    Status,
    Login,
    Play,
}

/// Types considered to be Minecraft packets.
///
/// In serialized form a packet begins with a [`VarInt`] packet ID followed
/// by the body. [`Encode`]/[`Decode`] implementations on `Self` only cover
/// the body; the ID is handled by [`Packet::encode_with_id`] and by the
/// framing/registry layer on decode.
pub trait Packet: std::fmt::Debug {
    const ID: i32;
    const NAME: &'static str;
    const SIDE: PacketSide;
    const STATE: PacketState;

    fn encode_with_id(&self, w: &mut impl Write) -> Result<(), EncodeError>
    where
        Self: Encode,
    {
        VarInt(Self::ID).encode(w)?;
        self.encode(w)
    }
}

/// How large an encoded packet body must be before the encoder/decoder
/// treats compression as mandatory. Values `>= 0` activate compression;
/// negative values (including [`CompressionThreshold::DISABLED`]) disable
/// it.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, From, Into)]
pub struct CompressionThreshold(pub i32);

impl CompressionThreshold {
    pub const DISABLED: Self = Self(-1);
}

impl Default for CompressionThreshold {
    fn default() -> Self {
        Self::DISABLED
    }
}

impl CompressionThreshold {
    pub fn is_enabled(self) -> bool {
        self.0 >= 0
    }
}
