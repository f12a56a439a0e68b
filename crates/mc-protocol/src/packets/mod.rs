//! Packet schemas: one struct per `(state, direction, id)`, each a typed,
//! ordered field list. Encoding/decoding is the mechanical field-by-field
//! traversal the `Encode`/`Decode` derive macros generate; the only thing a
//! schema module adds on top is the `#[packet(id, state, side)]` binding.

pub mod handshaking;
pub mod login;
pub mod status;
