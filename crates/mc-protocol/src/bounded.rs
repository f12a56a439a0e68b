use std::io::Write;
use std::ops::Deref;

use crate::error::{DecodeError, EncodeError};
use crate::primitive::{decode_string, encode_string};
use crate::{Decode, Encode};

/// A `string` field with a byte-length constraint, `[MIN, MAX]`.
///
/// Grounded on `valence_protocol`'s own `Bounded<&'a str, N>` (see
/// `HelloC2s::username`); generalized here with an explicit `MIN` so the
/// schema can express the `constr(min, max)` constraint from the source
/// implementation's field metadata.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Bounded<const MIN: usize, const MAX: usize>(pub String);

impl<const MIN: usize, const MAX: usize> Bounded<MIN, MAX> {
    pub fn new(s: impl Into<String>) -> Result<Self, EncodeError> {
        let s = s.into();
        if s.len() < MIN || s.len() > MAX {
            return Err(EncodeError::StringTooLong {
                len: s.len(),
                max: MAX,
            });
        }
        Ok(Bounded(s))
    }
}

impl<const MIN: usize, const MAX: usize> Deref for Bounded<MIN, MAX> {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl<const MIN: usize, const MAX: usize> Encode for Bounded<MIN, MAX> {
    fn encode(&self, w: &mut impl Write) -> Result<(), EncodeError> {
        encode_string(&self.0, MAX, w)
    }
}

impl<const MIN: usize, const MAX: usize> Decode for Bounded<MIN, MAX> {
    fn decode(r: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Bounded(decode_string(r, MIN, MAX)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_over_max_at_construction() {
        let long = "x".repeat(17);
        assert!(Bounded::<0, 16>::new(long).is_err());
    }

    #[test]
    fn roundtrip() {
        let b = Bounded::<0, 16>::new("Notch").unwrap();
        let mut buf = Vec::new();
        b.encode(&mut buf).unwrap();
        let mut slice = buf.as_slice();
        let decoded = Bounded::<0, 16>::decode(&mut slice).unwrap();
        assert_eq!(decoded, b);
    }
}
