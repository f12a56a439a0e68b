//! S4 -- compression cutover: once the connection has processed
//! `SetCompression(threshold=256)`, a subsequent outbound body under the
//! threshold keeps the `varint(0)` uncompressed envelope header and a body
//! at or over it is sent zlib-compressed, driven through the real
//! `Connection::send` path rather than `PacketEncoder` in isolation.

mod common;

use mc_client::connection::Connection;
use mc_protocol::packets::login::{EncryptionResponseC2s, SetCompressionS2c};
use mc_protocol::varint::try_read_varint;
use mc_protocol::{ByteArray, PacketState, VarInt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const THRESHOLD: i32 = 256;

/// Reads one raw, still-encoded envelope (frame length already stripped)
/// off `socket`, without decompressing it -- the point is to inspect the
/// `dataLength` varint the encoder actually wrote on the wire.
async fn read_one_envelope(socket: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        if let Some((frame_len, header_len)) = try_read_varint(&buf).unwrap() {
            let frame_len = frame_len as usize;
            if buf.len() >= header_len + frame_len {
                return buf[header_len..header_len + frame_len].to_vec();
            }
        }
        let n = socket.read(&mut chunk).await.unwrap();
        buf.extend_from_slice(&chunk[..n]);
    }
}

fn data_length(envelope: &[u8]) -> i32 {
    let mut slice = envelope;
    let VarInt(data_len) = <VarInt as mc_protocol::Decode>::decode(&mut slice).unwrap();
    data_len
}

#[tokio::test]
async fn body_under_threshold_keeps_the_uncompressed_envelope() {
    common::init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut enc = mc_protocol::encode::PacketEncoder::new();
        enc.append_packet(&SetCompressionS2c {
            threshold: VarInt(THRESHOLD),
        })
        .unwrap();
        socket.write_all(&enc.take()).await.unwrap();

        let envelope = read_one_envelope(&mut socket).await;
        assert_eq!(
            data_length(&envelope),
            0,
            "a body below the threshold must carry dataLength varint(0)"
        );
    });

    let mut conn = Connection::connect(&addr.ip().to_string(), addr.port())
        .await
        .unwrap();
    conn.set_state(PacketState::Login);
    conn.pump().await.unwrap(); // applies SetCompression's side effect

    conn.send(&EncryptionResponseC2s {
        shared_secret: ByteArray(vec![0xAB; 10]),
        verify_token: ByteArray(vec![]),
    })
    .await
    .unwrap();

    server.await.unwrap();
}

#[tokio::test]
async fn body_at_or_over_threshold_is_zlib_compressed_on_the_wire() {
    common::init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let secret = vec![0x5Au8; 1000];

    let server = tokio::spawn({
        let secret = secret.clone();
        async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut enc = mc_protocol::encode::PacketEncoder::new();
            enc.append_packet(&SetCompressionS2c {
                threshold: VarInt(THRESHOLD),
            })
            .unwrap();
            socket.write_all(&enc.take()).await.unwrap();

            let envelope = read_one_envelope(&mut socket).await;
            let declared_len = data_length(&envelope);
            assert!(
                declared_len > 0,
                "a body at/over the threshold must carry a non-zero dataLength"
            );
            assert!(
                (envelope.len() as i32) < declared_len,
                "zlib output did not actually shrink a highly repetitive body"
            );

            let mut dec = mc_protocol::decode::PacketDecoder::new();
            dec.set_compression(THRESHOLD.into());
            dec.queue_slice(&{
                let mut framed = Vec::new();
                mc_protocol::varint::write_varint(&mut framed, envelope.len() as i32).unwrap();
                framed.extend_from_slice(&envelope);
                framed
            });
            let frame = dec.try_next_packet().unwrap().unwrap();
            let response: EncryptionResponseC2s = frame.decode().unwrap();
            assert_eq!(response.shared_secret.0, secret);
        }
    });

    let mut conn = Connection::connect(&addr.ip().to_string(), addr.port())
        .await
        .unwrap();
    conn.set_state(PacketState::Login);
    conn.pump().await.unwrap(); // applies SetCompression's side effect

    conn.send(&EncryptionResponseC2s {
        shared_secret: ByteArray(secret),
        verify_token: ByteArray(vec![]),
    })
    .await
    .unwrap();

    server.await.unwrap();
}
