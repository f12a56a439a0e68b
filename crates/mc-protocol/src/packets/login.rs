use crate::{Bounded, ByteArray, Decode, Encode, Packet, PacketSide, PacketState, VarInt};
use uuid::Uuid;

/// Sent by the client to begin the login sequence.
#[derive(Clone, Debug, Encode, Decode, Packet)]
#[packet(id = 0, state = PacketState::Login, side = PacketSide::Serverbound)]
pub struct LoginStartC2s {
    pub name: Bounded<3, 16>,
}

/// Sent by the server to disconnect the client before login completes.
#[derive(Clone, Debug, Encode, Decode, Packet)]
#[packet(id = 0, state = PacketState::Login, side = PacketSide::Clientbound)]
pub struct LoginDisconnectS2c {
    pub reason: String,
}

/// The online-mode encryption challenge.
#[derive(Clone, Debug, Encode, Decode, Packet)]
#[packet(id = 1, state = PacketState::Login, side = PacketSide::Clientbound)]
pub struct EncryptionRequestS2c {
    pub server_id: String,
    pub public_key: ByteArray,
    pub verify_token: ByteArray,
}

/// The client's response to [`EncryptionRequestS2c`].
#[derive(Clone, Debug, Encode, Decode, Packet)]
#[packet(id = 1, state = PacketState::Login, side = PacketSide::Serverbound)]
pub struct EncryptionResponseC2s {
    pub shared_secret: ByteArray,
    pub verify_token: ByteArray,
}

/// Transitions the connection to `play`.
#[derive(Clone, Debug, Encode, Decode, Packet)]
#[packet(id = 2, state = PacketState::Login, side = PacketSide::Clientbound)]
pub struct LoginSuccessS2c {
    pub uuid: Uuid,
    pub username: Bounded<0, 16>,
}

/// Adjusts the mandatory-compression threshold for the rest of the
/// connection. Not a state transition.
#[derive(Copy, Clone, Debug, Encode, Decode, Packet)]
#[packet(id = 3, state = PacketState::Login, side = PacketSide::Clientbound)]
pub struct SetCompressionS2c {
    pub threshold: VarInt,
}
