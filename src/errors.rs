//! Error vocabulary shared by the protocol adapter and its host.
//!
//! Every status a data source can produce is translated into one of these
//! variants. `to_raw` gives the numeric code a C-style host expects.

use serde::Serialize;
use std::io;
use thiserror::Error;

const fn tag_error(a: u8, b: u8, c: u8, d: u8) -> i32 {
    -((a as i32) | ((b as i32) << 8) | ((c as i32) << 16) | ((d as i32) << 24))
}

pub const RAW_EINVAL: i32 = -22;
pub const RAW_EAGAIN: i32 = -11;
pub const RAW_EEXIST: i32 = -17;
pub const RAW_EOF: i32 = tag_error(b'E', b'O', b'F', b' ');
pub const RAW_PROTOCOL_NOT_FOUND: i32 = tag_error(0xF8, b'P', b'R', b'O');

#[derive(Debug, Error, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "message")]
pub enum ProtocolError {
    /// Malformed URL or handle, unsupported whence, negative position,
    /// or an operation on a closed adapter.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The source finished or failed; the two are not distinguished.
    #[error("End of stream")]
    EndOfStream,

    /// No data right now. The caller decides when to retry.
    #[error("Resource temporarily unavailable")]
    WouldBlock,

    #[error("Protocol not found: {0}")]
    ProtocolNotFound(String),

    #[error("Protocol already registered: {0}")]
    AlreadyRegistered(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

impl ProtocolError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ProtocolError::InvalidArgument(msg.into())
    }

    /// Host status code for this error.
    pub fn to_raw(&self) -> i32 {
        match self {
            ProtocolError::InvalidArgument(_) => RAW_EINVAL,
            ProtocolError::EndOfStream => RAW_EOF,
            ProtocolError::WouldBlock => RAW_EAGAIN,
            ProtocolError::ProtocolNotFound(_) => RAW_PROTOCOL_NOT_FOUND,
            ProtocolError::AlreadyRegistered(_) => RAW_EEXIST,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ProtocolError::WouldBlock)
    }
}

impl From<ProtocolError> for io::Error {
    fn from(e: ProtocolError) -> Self {
        let kind = match &e {
            ProtocolError::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            ProtocolError::EndOfStream => io::ErrorKind::UnexpectedEof,
            ProtocolError::WouldBlock => io::ErrorKind::WouldBlock,
            ProtocolError::ProtocolNotFound(_) => io::ErrorKind::NotFound,
            ProtocolError::AlreadyRegistered(_) => io::ErrorKind::AlreadyExists,
        };
        io::Error::new(kind, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_codes() {
        assert_eq!(ProtocolError::invalid("x").to_raw(), -22);
        assert_eq!(ProtocolError::WouldBlock.to_raw(), -11);
        assert_eq!(ProtocolError::EndOfStream.to_raw(), -0x2046_4F45);
    }

    #[test]
    fn test_only_would_block_is_retryable() {
        assert!(ProtocolError::WouldBlock.is_retryable());
        assert!(!ProtocolError::EndOfStream.is_retryable());
        assert!(!ProtocolError::invalid("bad whence").is_retryable());
    }

    #[test]
    fn test_io_error_kind() {
        let err: io::Error = ProtocolError::WouldBlock.into();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);

        let err: io::Error = ProtocolError::invalid("negative position").into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_string(&ProtocolError::invalid("null handle")).unwrap();
        assert_eq!(json, r#"{"type":"InvalidArgument","message":"null handle"}"#);
    }
}
