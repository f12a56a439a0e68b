use crate::{Bounded, Decode, Encode, Packet, PacketSide, PacketState, VarInt};

/// Which state the server should move the connection into after the
/// handshake. There is no acknowledgement packet -- the client assumes the
/// new state immediately after sending this.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NextState {
    Status,
    Login,
}

impl From<NextState> for VarInt {
    fn from(state: NextState) -> Self {
        VarInt(match state {
            NextState::Status => 1,
            NextState::Login => 2,
        })
    }
}

impl Encode for NextState {
    fn encode(&self, w: &mut impl std::io::Write) -> Result<(), crate::EncodeError> {
        VarInt::from(*self).encode(w)
    }
}

impl Decode for NextState {
    fn decode(r: &mut &[u8]) -> Result<Self, crate::DecodeError> {
        let VarInt(value) = VarInt::decode(r)?;
        Ok(match value {
            2 => NextState::Login,
            _ => NextState::Status,
        })
    }
}

#[derive(Clone, Debug, Encode, Decode, Packet)]
#[packet(id = 0, state = PacketState::Handshaking, side = PacketSide::Serverbound)]
pub struct HandshakeC2s {
    pub protocol_version: VarInt,
    pub server_address: Bounded<0, 255>,
    pub server_port: u16,
    pub next_state: NextState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_body_bytes() {
        let pkt = HandshakeC2s {
            protocol_version: VarInt(754),
            server_address: Bounded::new("localhost").unwrap(),
            server_port: 25565,
            next_state: NextState::Login,
        };
        let mut body = Vec::new();
        pkt.encode_with_id(&mut body).unwrap();

        let mut expected = vec![0x00]; // packet id varint
        VarInt(754).encode(&mut expected).unwrap();
        "localhost".to_string().encode(&mut expected).unwrap();
        expected.extend_from_slice(&25565u16.to_be_bytes());
        VarInt(2).encode(&mut expected).unwrap();

        assert_eq!(body, expected);
    }
}
