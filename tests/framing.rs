//! S2 — status query against a fixture server: connect, handshake into
//! `status`, exchange `RequestStatus`/`ResponseStatus` and `Ping`/`Pong`,
//! and disconnect.

mod common;

use mc_client::auth::OfflineAuthenticator;
use mc_client::Client;
use mc_protocol::decode::PacketDecoder;
use mc_protocol::encode::PacketEncoder;
use mc_protocol::packets::status::{PongResponseS2c, StatusResponseS2c};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[tokio::test]
async fn status_query_returns_json_and_positive_latency() {
    common::init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut decoder = PacketDecoder::new();

        // Handshake, then RequestStatus: both are discarded, the fixture
        // only cares about the Ping payload to echo back.
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            decoder.queue_slice(&buf[..n]);
            if decoder.try_next_packet().unwrap().is_some() {
                break;
            }
        }
        // Drain the second (RequestStatus) frame too.
        loop {
            if decoder.try_next_packet().unwrap().is_some() {
                break;
            }
            let n = socket.read(&mut buf).await.unwrap();
            decoder.queue_slice(&buf[..n]);
        }

        let mut enc = PacketEncoder::new();
        enc.append_packet(&StatusResponseS2c {
            json: r#"{"version":{"name":"1.20.1","protocol":763},"players":{"max":20,"online":0}}"#
                .to_string(),
        })
        .unwrap();
        let out = enc.take();
        socket.write_all(&out).await.unwrap();

        let ping = loop {
            if let Some(frame) = decoder.try_next_packet().unwrap() {
                break frame;
            }
            let n = socket.read(&mut buf).await.unwrap();
            decoder.queue_slice(&buf[..n]);
        };
        let mut slice = &ping.body[..];
        let payload = <i64 as mc_protocol::Decode>::decode(&mut slice).unwrap();

        let mut enc = PacketEncoder::new();
        enc.append_packet(&PongResponseS2c { payload }).unwrap();
        socket.write_all(&enc.take()).await.unwrap();
    });

    let mut client = Client::new(OfflineAuthenticator::new("Tester"));
    let (json, latency) = client
        .query_status(&addr.ip().to_string(), addr.port())
        .await
        .unwrap();

    assert!(json.contains("\"protocol\":763"));
    assert!(latency < 5_000);

    server.await.unwrap();
}
