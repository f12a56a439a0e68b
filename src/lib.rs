//! The core protocol engine for a Minecraft Java Edition client: wire
//! codec, packet framing (with optional compression and encryption), a
//! declarative packet registry, and an async client workflow that can
//! complete the online-mode login handshake.
//!
//! Gameplay-level packet semantics beyond `handshaking`/`status`/`login`
//! are out of scope here; see [`mc_protocol`] for the codec and schema
//! layer this crate builds on.

pub mod auth;
pub mod client;
pub mod connection;
pub mod crypto;
pub mod dispatcher;
pub mod error;
pub mod login;
pub mod resolver;

pub use auth::{AuthError, Authenticator, OfflineAuthenticator};
pub use client::Client;
pub use error::ClientError;
