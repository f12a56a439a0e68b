//! Owns the transport and the framing/registry/dispatcher trio that turns
//! raw bytes into dispatched packets, and back.
//!
//! All synchronous framing work (§5: "must not suspend") happens inside
//! [`Connection::pump`]; the only suspension points are socket reads and
//! writes themselves.

use bytes::BytesMut;
use mc_protocol::decode::PacketDecoder;
use mc_protocol::encode::PacketEncoder;
use mc_protocol::registry::{ClientboundPacket, PacketRegistry};
use mc_protocol::{Packet, PacketState};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::trace;

use crate::error::ClientError;

/// Read chunk size for the socket -> decoder pipe. Matches the inbound
/// buffer's fixed capacity described in §4.D; the decoder itself grows its
/// `BytesMut` as needed rather than enforcing this as a hard cap.
const READ_CHUNK: usize = 256 * 1024;

pub struct Connection {
    socket: TcpStream,
    encoder: PacketEncoder,
    decoder: PacketDecoder,
    registry: PacketRegistry,
    state: PacketState,
    online: bool,
    encryption_enabled: bool,
}

impl Connection {
    pub async fn connect(host: &str, port: u16) -> Result<Self, ClientError> {
        let socket = TcpStream::connect((host, port)).await?;
        socket.set_nodelay(true)?;
        Ok(Self {
            socket,
            encoder: PacketEncoder::new(),
            decoder: PacketDecoder::new(),
            registry: PacketRegistry::standard(),
            state: PacketState::Handshaking,
            online: false,
            encryption_enabled: false,
        })
    }

    pub fn state(&self) -> PacketState {
        self.state
    }

    pub fn set_state(&mut self, state: PacketState) {
        self.state = state;
    }

    /// Marks this connection as an online-mode login, which is the only
    /// case where the encryption-before-compression ordering (§4.E
    /// supplement) can actually be violated -- an offline connection never
    /// enables encryption at all.
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    /// Encodes and writes `packet` to the socket immediately. Packet
    /// writes are atomic at the framing boundary (§5): nothing else may
    /// write to the encoder's buffer between append and flush.
    pub async fn send<P>(&mut self, packet: &P) -> Result<(), ClientError>
    where
        P: Packet + mc_protocol::Encode,
    {
        if P::STATE != self.state {
            return Err(ClientError::WrongState {
                expected: P::STATE,
                actual: self.state,
            });
        }
        self.encoder.append_packet(packet)?;
        let bytes = self.encoder.take();
        self.socket.write_all(&bytes).await?;
        Ok(())
    }

    /// Enables AES/CFB8 on both the encoder and decoder. Must only be
    /// called after the `EncryptionResponse` bytes have already been
    /// written in plaintext (§4.E step 7).
    pub fn enable_encryption(&mut self, key: &[u8; 16]) {
        self.encoder.enable_encryption(key);
        self.decoder.enable_encryption(key);
        self.encryption_enabled = true;
    }

    fn set_compression(&mut self, threshold: mc_protocol::CompressionThreshold) -> Result<(), ClientError> {
        if self.online && threshold.is_enabled() && !self.encryption_enabled {
            return Err(ClientError::OutOfOrderActivation);
        }
        self.encoder.set_compression(threshold);
        self.decoder.set_compression(threshold);
        Ok(())
    }

    /// Reads from the socket until one registered packet has been decoded,
    /// applies its mandatory side effects (`SetCompression`, the
    /// `login`->`play` transition on `LoginSuccess`), and returns it.
    /// Unregistered `(state, id)` pairs are discarded and reading
    /// continues. The caller is responsible for dispatching the returned
    /// packet to waiters -- side effects must land first, per §4.F and
    /// §5's ordering guarantee, which this method guarantees by applying
    /// them before returning.
    pub async fn pump(&mut self) -> Result<ClientboundPacket, ClientError> {
        loop {
            while let Some(frame) = self.decoder.try_next_packet()? {
                let Some(packet) = self.registry.lookup(self.state, &frame)? else {
                    trace!(state = ?self.state, id = frame.id, "unregistered packet, discarding");
                    continue;
                };
                self.apply_side_effects(&packet)?;
                return Ok(packet);
            }

            let mut chunk = BytesMut::zeroed(READ_CHUNK);
            let n = self.socket.read(&mut chunk).await?;
            if n == 0 {
                return Err(ClientError::Disconnected);
            }
            chunk.truncate(n);
            self.decoder.queue_bytes(chunk);
        }
    }

    fn apply_side_effects(&mut self, packet: &ClientboundPacket) -> Result<(), ClientError> {
        if let ClientboundPacket::SetCompression(set) = packet {
            self.set_compression(mc_protocol::CompressionThreshold(set.threshold.0))?;
        }
        if let ClientboundPacket::LoginSuccess(_) = packet {
            self.state = PacketState::Play;
        }
        Ok(())
    }
}
