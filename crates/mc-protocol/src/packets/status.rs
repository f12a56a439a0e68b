use crate::{Decode, Encode, Packet, PacketSide, PacketState};

#[derive(Copy, Clone, Debug, Encode, Decode, Packet)]
#[packet(id = 0, state = PacketState::Status, side = PacketSide::Serverbound)]
pub struct StatusRequestC2s;

#[derive(Clone, Debug, Encode, Decode, Packet)]
#[packet(id = 0, state = PacketState::Status, side = PacketSide::Clientbound)]
pub struct StatusResponseS2c {
    pub json: String,
}

#[derive(Copy, Clone, Debug, Encode, Decode, Packet)]
#[packet(id = 1, state = PacketState::Status, side = PacketSide::Serverbound)]
pub struct PingRequestC2s {
    pub payload: i64,
}

#[derive(Copy, Clone, Debug, Encode, Decode, Packet)]
#[packet(id = 1, state = PacketState::Status, side = PacketSide::Clientbound)]
pub struct PongResponseS2c {
    pub payload: i64,
}
