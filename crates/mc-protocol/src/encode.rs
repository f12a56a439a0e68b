//! Outbound framing: packet body -> (compression envelope) -> length prefix
//! -> (encryption). Order matters -- see the module-level note on
//! [`PacketDecoder`](crate::decode::PacketDecoder) for why encryption must
//! wrap compression, which must wrap framing.

use bytes::{BufMut, BytesMut};
use tracing::trace;

#[cfg(feature = "compression")]
use std::io::Write as _;

use crate::varint::write_varint;
use crate::{CompressionThreshold, Encode, EncodeError, Packet};

#[cfg(feature = "encryption")]
type Cipher = cfb8::Encryptor<aes::Aes128>;

/// Builds up a buffer of framed, optionally-compressed, optionally-encrypted
/// outbound packets. One instance is owned by a connection for its entire
/// lifetime; `set_compression`/`enable_encryption` mutate it in place as the
/// login handshake progresses rather than swapping in a different type, per
/// the single-framing-component design (two interoperating protocol
/// variants would otherwise have to hand off buffer ownership mid-stream).
pub struct PacketEncoder {
    buf: BytesMut,
    compression_threshold: CompressionThreshold,
    #[cfg(feature = "encryption")]
    cipher: Option<Cipher>,
}

impl PacketEncoder {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
            compression_threshold: CompressionThreshold::DISABLED,
            #[cfg(feature = "encryption")]
            cipher: None,
        }
    }

    /// Encodes `pkt` and appends the framed bytes to the end of the
    /// internal buffer, in order after anything already queued.
    pub fn append_packet<P>(&mut self, pkt: &P) -> Result<(), EncodeError>
    where
        P: Packet + Encode,
    {
        let start = self.buf.len();
        self.encode_packet(pkt)?;
        self.encrypt_from(start);
        Ok(())
    }

    fn encode_packet<P>(&mut self, pkt: &P) -> Result<(), EncodeError>
    where
        P: Packet + Encode,
    {
        let mut body = Vec::new();
        pkt.encode_with_id(&mut body)?;

        let envelope = self.envelope(body)?;

        write_varint(&mut (&mut self.buf).writer(), envelope.len() as i32)?;
        self.buf.extend_from_slice(&envelope);
        trace!(packet = P::NAME, bytes = envelope.len(), "queued packet");
        Ok(())
    }

    #[cfg(feature = "compression")]
    fn envelope(&self, body: Vec<u8>) -> Result<Vec<u8>, EncodeError> {
        if !self.compression_threshold.is_enabled() {
            return Ok(body);
        }
        let mut out = Vec::new();
        if body.len() >= self.compression_threshold.0 as usize {
            write_varint(&mut out, body.len() as i32)?;
            let mut encoder =
                flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(&body)?;
            out.extend(encoder.finish()?);
        } else {
            write_varint(&mut out, 0)?;
            out.extend(body);
        }
        Ok(out)
    }

    #[cfg(not(feature = "compression"))]
    fn envelope(&self, body: Vec<u8>) -> Result<Vec<u8>, EncodeError> {
        Ok(body)
    }

    /// Adjusts the mandatory-compression threshold for every packet encoded
    /// from this point onward. Takes effect starting with the *next*
    /// `append_packet`/`prepend_packet` call.
    pub fn set_compression(&mut self, threshold: CompressionThreshold) {
        self.compression_threshold = threshold;
    }

    /// Enables AES-128/CFB8 stream encryption over every byte written from
    /// this point onward. Irreversible for the lifetime of this encoder.
    #[cfg(feature = "encryption")]
    pub fn enable_encryption(&mut self, key: &[u8; 16]) {
        use cfb8::cipher::KeyIvInit;
        self.cipher = Some(Cipher::new(key.into(), key.into()));
    }

    #[cfg(feature = "encryption")]
    fn encrypt_from(&mut self, start: usize) {
        if let Some(cipher) = &mut self.cipher {
            use cfb8::cipher::{generic_array::GenericArray, BlockEncryptMut};
            let tail = &mut self.buf[start..];
            for byte in tail.iter_mut() {
                let mut block = GenericArray::default();
                block[0] = *byte;
                cipher.encrypt_block_mut(&mut block);
                *byte = block[0];
            }
        }
    }

    #[cfg(not(feature = "encryption"))]
    fn encrypt_from(&mut self, _start: usize) {}

    /// Returns everything queued so far, leaving the encoder empty.
    pub fn take(&mut self) -> BytesMut {
        self.buf.split()
    }
}

impl Default for PacketEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PacketEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketEncoder")
            .field("buffered", &self.buf.len())
            .field("compression_threshold", &self.compression_threshold)
            .finish()
    }
}

/// A sink packets can be written into without caring whether it's a live
/// connection or a test buffer.
pub trait WritePacket {
    fn write_packet<P>(&mut self, pkt: &P) -> Result<(), EncodeError>
    where
        P: Packet + Encode;
}

impl WritePacket for PacketEncoder {
    fn write_packet<P>(&mut self, pkt: &P) -> Result<(), EncodeError>
    where
        P: Packet + Encode,
    {
        self.append_packet(pkt)
    }
}
