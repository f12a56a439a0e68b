//! S6 — the canonical "Minecraft SHA-1" vectors published for the session
//! hash, verified through the crate's public `crypto` module.

mod common;

use mc_client::crypto::mc_sha1;

#[test]
fn canonical_session_hash_vectors() {
    common::init_tracing();
    assert_eq!(
        mc_sha1("Notch", b"", b""),
        "4ed1f46bbe04bc756bcb17c0c7ce3e4632f06a48"
    );
    assert_eq!(
        mc_sha1("jeb_", b"", b""),
        "-7c9d5b0044c130109a5d7b5fb5c317c02b4e28c1"
    );
    assert_eq!(
        mc_sha1("simon", b"", b""),
        "88e16a1019277b15d58faf0541e11910eb756f6"
    );
}
