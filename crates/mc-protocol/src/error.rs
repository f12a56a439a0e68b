use thiserror::Error;

/// Failures that can occur while decoding a primitive, a packet body, or a
/// framed envelope. All variants are fatal for the connection: once the byte
/// stream has desynchronized there is no safe resumption point.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("varint exceeds 5 bytes")]
    MalformedVarint,
    #[error("varlong exceeds 10 bytes")]
    MalformedVarlong,
    #[error("read past the end of the buffer: wanted {wanted} bytes, had {available}")]
    ShortRead { wanted: usize, available: usize },
    #[error("string length {len} is outside the allowed range {min}..={max}")]
    StringLength { len: usize, min: usize, max: usize },
    #[error("invalid utf-8 in string field")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("decompressed body length {actual} does not match declared length {expected}")]
    CompressionError { expected: i32, actual: usize },
    #[error("zlib stream error: {0}")]
    Zlib(String),
}

/// Failures that can occur while encoding a primitive or packet body.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("string length {len} exceeds the bounded maximum {max}")]
    StringTooLong { len: usize, max: usize },
    #[error("i/o error writing to backing buffer: {0}")]
    Io(#[from] std::io::Error),
}
