//! The public client workflow: `query_status`, `connect`, `send`,
//! `wait_for`, `disconnect` (§6). One [`Client`] owns one connection; the
//! scheduling model is single-threaded cooperative (§5) -- everything here
//! runs on whatever task calls it, suspending only at socket I/O,
//! `wait_for`, and the authentication collaborator.

use std::time::Duration;

use mc_protocol::packets::handshaking::{HandshakeC2s, NextState};
use mc_protocol::packets::status::{PingRequestC2s, PongResponseS2c, StatusRequestC2s, StatusResponseS2c};
use mc_protocol::registry::ClientboundPacket;
use mc_protocol::{Decode, Packet, PacketState, VarInt};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::Authenticator;
use crate::connection::Connection;
use crate::dispatcher::Dispatcher;
use crate::error::ClientError;
use crate::login;
use crate::resolver;

/// The protocol version advertised in `Handshake` when the caller asks for
/// `auto` and the status probe's JSON can't be parsed for one.
const FALLBACK_PROTOCOL_VERSION: i32 = 0;

#[derive(Deserialize)]
struct StatusVersion {
    protocol: i32,
}

#[derive(Deserialize)]
struct StatusPayload {
    version: StatusVersion,
}

/// A connected (or not-yet-connected) Minecraft client driven by one
/// authentication collaborator `A`.
pub struct Client<A: Authenticator> {
    auth: A,
    dispatcher: Dispatcher,
    connection: Option<Connection>,
}

impl<A: Authenticator> Client<A> {
    pub fn new(auth: A) -> Self {
        Self {
            auth,
            dispatcher: Dispatcher::new(),
            connection: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn state(&self) -> Option<PacketState> {
        self.connection.as_ref().map(Connection::state)
    }

    /// Resolves `host`, connects, performs the `handshaking -> status`
    /// exchange, and disconnects. Returns the raw status JSON and the
    /// measured round-trip latency.
    pub async fn query_status(&mut self, host: &str, port: u16) -> Result<(String, u64), ClientError> {
        let (resolved_host, resolved_port) = resolver::resolve(host).await?;
        let port = if port == 0 { resolved_port } else { port };

        let mut conn = Connection::connect(&resolved_host, port).await?;
        conn.send(&HandshakeC2s {
            protocol_version: VarInt(FALLBACK_PROTOCOL_VERSION),
            server_address: mc_protocol::Bounded::new(resolved_host.clone())?,
            server_port: port,
            next_state: NextState::Status,
        })
        .await?;
        conn.set_state(PacketState::Status);

        conn.send(&StatusRequestC2s).await?;
        let response: StatusResponseS2c = recv_one(&mut conn).await?;

        let payload = timestamp_millis();
        conn.send(&PingRequestC2s { payload }).await?;
        let pong: PongResponseS2c = recv_one(&mut conn).await?;
        let latency = timestamp_millis().saturating_sub(pong.payload).max(0) as u64;

        Ok((response.json, latency))
    }

    /// Connects, handshakes into `login`, optionally probing `status` first
    /// to auto-detect the protocol version, and runs the login sequence
    /// through to `play`.
    pub async fn connect(
        &mut self,
        host: &str,
        port: u16,
        online: bool,
        version: Option<i32>,
    ) -> Result<(), ClientError> {
        let (resolved_host, resolved_port) = resolver::resolve(host).await?;
        let port = if port == 0 { resolved_port } else { port };

        let protocol_version = match version {
            Some(v) => v,
            None => self.probe_protocol_version(&resolved_host, port).await,
        };

        if online {
            self.auth.refresh().await.map_err(|e| ClientError::Auth(e.0))?;
        }

        let mut conn = Connection::connect(&resolved_host, port).await?;
        conn.set_online(online);
        conn.send(&HandshakeC2s {
            protocol_version: VarInt(protocol_version),
            server_address: mc_protocol::Bounded::new(resolved_host.clone())?,
            server_port: port,
            next_state: NextState::Login,
        })
        .await?;
        conn.set_state(PacketState::Login);

        login::run(&mut conn, &mut self.dispatcher, &self.auth).await?;
        self.connection = Some(conn);
        Ok(())
    }

    async fn probe_protocol_version(&self, host: &str, port: u16) -> i32 {
        match status_probe(host, port).await {
            Ok(version) => version,
            Err(err) => {
                warn!(%err, "status probe for protocol version failed, using fallback");
                FALLBACK_PROTOCOL_VERSION
            }
        }
    }

    /// Sends `packet` over the active connection.
    pub async fn send<P>(&mut self, packet: &P) -> Result<(), ClientError>
    where
        P: Packet + mc_protocol::Encode,
    {
        let conn = self.connection.as_mut().ok_or(ClientError::Disconnected)?;
        conn.send(packet).await
    }

    /// Registers a waiter for packet type `P`, pumping the connection
    /// until it arrives or `timeout` elapses. Packets that don't match
    /// `P`'s `(state, id)` are dispatched to any other pending waiters
    /// along the way, preserving wire order (§5).
    pub async fn wait_for<P>(&mut self, timeout: Duration) -> Result<P, ClientError>
    where
        P: Packet + Decode + TryFrom<ClientboundPacket, Error = ClientboundPacket>,
    {
        let key = (P::STATE, P::ID);
        let mut rx = self.dispatcher.register(key);
        let Client {
            connection,
            dispatcher,
            ..
        } = self;
        let conn = connection.as_mut().ok_or(ClientError::Disconnected)?;
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        let result = loop {
            tokio::select! {
                biased;
                result = &mut rx => break result.unwrap_or(Err(ClientError::Disconnected)),
                decoded = conn.pump() => {
                    match decoded {
                        Ok(packet) => dispatcher.dispatch(packet),
                        Err(err) => break Err(err),
                    }
                }
                _ = &mut deadline => {
                    dispatcher.cancel(key, rx);
                    return Err(ClientError::Timeout);
                }
            }
        };

        let packet = result?;
        P::try_from(packet).map_err(|_| ClientError::UnexpectedPacket { expected: P::NAME })
    }

    /// Tears the connection down, failing every pending waiter with
    /// `Disconnected`.
    pub fn disconnect(&mut self) {
        self.connection = None;
        self.dispatcher.fail_all();
        info!("disconnected");
    }
}

async fn recv_one<P>(conn: &mut Connection) -> Result<P, ClientError>
where
    P: Packet + Decode + TryFrom<ClientboundPacket, Error = ClientboundPacket>,
{
    loop {
        let packet = conn.pump().await?;
        if packet.key() == (P::STATE, P::ID) {
            return P::try_from(packet)
                .map_err(|_| ClientError::UnexpectedPacket { expected: P::NAME });
        }
    }
}

async fn status_probe(host: &str, port: u16) -> Result<i32, ClientError> {
    let mut conn = Connection::connect(host, port).await?;
    conn.send(&HandshakeC2s {
        protocol_version: VarInt(FALLBACK_PROTOCOL_VERSION),
        server_address: mc_protocol::Bounded::new(host.to_string())?,
        server_port: port,
        next_state: NextState::Status,
    })
    .await?;
    conn.set_state(PacketState::Status);
    conn.send(&StatusRequestC2s).await?;
    let response: StatusResponseS2c = recv_one(&mut conn).await?;
    let payload: StatusPayload = serde_json::from_str(&response.json)
        .map_err(|e| ClientError::Auth(format!("malformed status json: {e}")))?;
    Ok(payload.version.protocol)
}

fn timestamp_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
