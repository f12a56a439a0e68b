//! Orchestrates the `login` state: `LoginStart`, optional `SetCompression`/
//! `EncryptionRequest` handling, and resolving to `play` on `LoginSuccess`.
//! See §4.E of the protocol design for the step-by-step handshake.

use mc_protocol::packets::login::{EncryptionResponseC2s, LoginStartC2s};
use mc_protocol::primitive::ByteArray;
use mc_protocol::registry::ClientboundPacket;
use mc_protocol::{Bounded, PacketState};
use tracing::{debug, info};

use crate::auth::Authenticator;
use crate::connection::Connection;
use crate::crypto;
use crate::dispatcher::Dispatcher;
use crate::error::ClientError;

/// Drives the connection from `login` (the caller must already have sent
/// `Handshake` with `nextState = login`) through to `play`.
pub async fn run<A: Authenticator>(
    conn: &mut Connection,
    dispatcher: &mut Dispatcher,
    auth: &A,
) -> Result<(), ClientError> {
    let name = Bounded::<3, 16>::new(auth.username().to_string())
        .map_err(|e| ClientError::Auth(e.to_string()))?;
    conn.send(&LoginStartC2s { name }).await?;

    loop {
        let packet = conn.pump().await?;
        handle(conn, auth, &packet).await?;
        dispatcher.dispatch(packet);

        if conn.state() == PacketState::Play {
            info!("login complete, transitioned to play");
            return Ok(());
        }
    }
}

/// Handles an `EncryptionRequest`, performing the full online-mode
/// handshake and enabling AES on both directions of `conn`.
pub async fn handle_encryption_request<A: Authenticator>(
    conn: &mut Connection,
    auth: &A,
    server_id: &str,
    public_key_der: &[u8],
    verify_token: &[u8],
) -> Result<(), ClientError> {
    let public_key = crypto::parse_public_key(public_key_der)?;
    let shared_secret = crypto::generate_shared_secret();

    let encrypted_secret = crypto::pkcs1_encrypt(&public_key, &shared_secret)?;
    let encrypted_token = crypto::pkcs1_encrypt(&public_key, verify_token)?;

    let server_hash = crypto::mc_sha1(server_id, &shared_secret, public_key_der);
    debug!(%server_hash, "joining session server");
    let joined = auth
        .join(&server_hash)
        .await
        .map_err(|e| ClientError::Auth(e.0))?;
    if !joined {
        return Err(ClientError::Auth(
            "session server rejected join request".to_string(),
        ));
    }

    conn.send(&EncryptionResponseC2s {
        shared_secret: ByteArray(encrypted_secret),
        verify_token: ByteArray(encrypted_token),
    })
    .await?;

    // §4.E step 7: encryption is enabled immediately after the response
    // bytes are enqueued, never before -- everything up to and including
    // this send was plaintext.
    conn.enable_encryption(&shared_secret);
    Ok(())
}

/// Applies one decoded login-state packet's semantics beyond the framing
/// side effects `Connection::pump` already applied (compression threshold,
/// the `login` -> `play` transition).
async fn handle<A: Authenticator>(
    conn: &mut Connection,
    auth: &A,
    packet: &ClientboundPacket,
) -> Result<(), ClientError> {
    match packet {
        ClientboundPacket::EncryptionRequest(req) => {
            handle_encryption_request(
                conn,
                auth,
                &req.server_id,
                &req.public_key.0,
                &req.verify_token.0,
            )
            .await
        }
        ClientboundPacket::LoginDisconnect(reason) => Err(ClientError::Auth(format!(
            "login rejected: {}",
            reason.reason
        ))),
        _ => Ok(()),
    }
}
