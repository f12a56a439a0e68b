//! Lookup: `(state, id)` -> decoder, for clientbound packets the client
//! knows how to decode.
//!
//! Per the source implementation's own design note, this is *not* global
//! mutable state populated at import time -- it's built explicitly by
//! [`PacketRegistry::standard`] and owned by whoever needs it (the
//! `mc-client` crate's `Client`), rather than being process-wide.

use std::collections::HashMap;
use std::fmt;

use crate::decode::PacketFrame;
use crate::packets::login::{
    EncryptionRequestS2c, LoginDisconnectS2c, LoginSuccessS2c, SetCompressionS2c,
};
use crate::packets::status::{PongResponseS2c, StatusResponseS2c};
use crate::{DecodeError, Packet, PacketState};

/// A decoded clientbound packet of any kind the registry knows about.
/// Unknown `(state, id)` pairs never produce one of these -- the frame is
/// simply discarded by the caller (see [`PacketRegistry::lookup`]).
#[derive(Clone, Debug)]
pub enum ClientboundPacket {
    StatusResponse(StatusResponseS2c),
    PongResponse(PongResponseS2c),
    SetCompression(SetCompressionS2c),
    EncryptionRequest(EncryptionRequestS2c),
    LoginSuccess(LoginSuccessS2c),
    LoginDisconnect(LoginDisconnectS2c),
}

impl ClientboundPacket {
    /// The `(state, id)` key this variant was decoded under -- the same key
    /// the dispatcher uses to match pending waiters.
    pub fn key(&self) -> (PacketState, i32) {
        match self {
            Self::StatusResponse(_) => (PacketState::Status, StatusResponseS2c::ID),
            Self::PongResponse(_) => (PacketState::Status, PongResponseS2c::ID),
            Self::SetCompression(_) => (PacketState::Login, SetCompressionS2c::ID),
            Self::EncryptionRequest(_) => (PacketState::Login, EncryptionRequestS2c::ID),
            Self::LoginSuccess(_) => (PacketState::Login, LoginSuccessS2c::ID),
            Self::LoginDisconnect(_) => (PacketState::Login, LoginDisconnectS2c::ID),
        }
    }
}

macro_rules! try_from_variant {
    ($variant:ident, $ty:ty) => {
        impl TryFrom<ClientboundPacket> for $ty {
            type Error = ClientboundPacket;

            fn try_from(pkt: ClientboundPacket) -> Result<Self, Self::Error> {
                match pkt {
                    ClientboundPacket::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }
    };
}

try_from_variant!(StatusResponse, StatusResponseS2c);
try_from_variant!(PongResponse, PongResponseS2c);
try_from_variant!(SetCompression, SetCompressionS2c);
try_from_variant!(EncryptionRequest, EncryptionRequestS2c);
try_from_variant!(LoginSuccess, LoginSuccessS2c);
try_from_variant!(LoginDisconnect, LoginDisconnectS2c);

type DecodeFn = Box<dyn Fn(&PacketFrame) -> Result<ClientboundPacket, DecodeError> + Send + Sync>;

/// Maps `(state, id)` to a function that decodes a raw frame into a
/// [`ClientboundPacket`]. Built once per client and consulted on every
/// inbound frame.
pub struct PacketRegistry {
    decoders: HashMap<(PacketState, i32), DecodeFn>,
}

impl fmt::Debug for PacketRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketRegistry")
            .field("registered", &self.decoders.len())
            .finish()
    }
}

impl PacketRegistry {
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Registers the decoder for clientbound packet `P`. Panics if the
    /// `(state, id)` slot is already taken -- per the schema invariant, at
    /// most one schema may claim a given `(state, direction, id)`, and a
    /// duplicate registration is a programmer error caught at startup, not
    /// something to paper over at runtime.
    pub fn register<P>(&mut self, wrap: fn(P) -> ClientboundPacket)
    where
        P: Packet + crate::Decode + 'static,
    {
        let key = (P::STATE, P::ID);
        let decoder: DecodeFn = Box::new(move |frame: &PacketFrame| Ok(wrap(frame.decode::<P>()?)));

        if self.decoders.insert(key, decoder).is_some() {
            panic!(
                "duplicate packet registration for state={:?} id={}",
                key.0, key.1
            );
        }
    }

    /// The registry pre-populated with every clientbound packet this crate
    /// knows how to decode across `status` and `login`.
    pub fn standard() -> Self {
        let mut reg = Self::new();
        reg.register::<StatusResponseS2c>(ClientboundPacket::StatusResponse);
        reg.register::<PongResponseS2c>(ClientboundPacket::PongResponse);
        reg.register::<SetCompressionS2c>(ClientboundPacket::SetCompression);
        reg.register::<EncryptionRequestS2c>(ClientboundPacket::EncryptionRequest);
        reg.register::<LoginSuccessS2c>(ClientboundPacket::LoginSuccess);
        reg.register::<LoginDisconnectS2c>(ClientboundPacket::LoginDisconnect);
        reg
    }

    /// Looks up and decodes a frame. `None` means "unknown packet for this
    /// state" -- a non-fatal event the caller should discard and may log.
    pub fn lookup(
        &self,
        state: PacketState,
        frame: &PacketFrame,
    ) -> Result<Option<ClientboundPacket>, DecodeError> {
        match self.decoders.get(&(state, frame.id)) {
            Some(decode) => decode(frame).map(Some),
            None => Ok(None),
        }
    }
}

impl Default for PacketRegistry {
    fn default() -> Self {
        Self::new()
    }
}
