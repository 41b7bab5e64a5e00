//! Plugin contract between the media I/O host and URL protocols.

pub mod media_data_source;
pub mod registry;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::{ProtocolError, ProtocolResult};

pub use media_data_source::MediaDataSource;
pub use registry::ProtocolRegistry;

pub const RAW_SEEK_SET: i32 = 0;
pub const RAW_SEEK_CUR: i32 = 1;
pub const RAW_SEEK_END: i32 = 2;
pub const RAW_SEEK_SIZE: i32 = 0x10000;

/// Seek mode passed by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
    /// Report the total size instead of moving.
    SizeQuery,
}

impl Whence {
    pub fn from_raw(whence: i32) -> ProtocolResult<Self> {
        match whence {
            RAW_SEEK_SET => Ok(Whence::Start),
            RAW_SEEK_CUR => Ok(Whence::Current),
            RAW_SEEK_END => Ok(Whence::End),
            RAW_SEEK_SIZE => Ok(Whence::SizeQuery),
            other => Err(ProtocolError::invalid(format!("Unknown whence: {}", other))),
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Whence::Start => RAW_SEEK_SET,
            Whence::Current => RAW_SEEK_CUR,
            Whence::End => RAW_SEEK_END,
            Whence::SizeQuery => RAW_SEEK_SIZE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
}

impl OpenFlags {
    pub const READ: OpenFlags = OpenFlags {
        read: true,
        write: false,
    };
}

impl Default for OpenFlags {
    fn default() -> Self {
        Self::READ
    }
}

/// Options handed to `open`. Keys a protocol does not declare stay in the map.
pub type OpenOptions = BTreeMap<String, String>;

/// One entry of a protocol's configurable option table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub help: &'static str,
}

/// An opened protocol instance. The host serializes all calls on one instance.
pub trait UrlProtocol: Send + Sync {
    fn name(&self) -> &str;

    fn read(&mut self, buf: &mut [u8]) -> ProtocolResult<usize>;

    fn seek(&mut self, pos: i64, whence: Whence) -> ProtocolResult<i64>;

    fn close(&mut self) -> ProtocolResult<()>;

    /// True when the total length is unknown.
    fn is_streamed(&self) -> bool {
        false
    }
}

pub type OpenFn = Arc<
    dyn Fn(&str, OpenFlags, &mut OpenOptions) -> ProtocolResult<Box<dyn UrlProtocol>>
        + Send
        + Sync,
>;

/// What a protocol registers with the host.
#[derive(Clone)]
pub struct ProtocolDescriptor {
    /// URL scheme, also the registry key.
    pub name: String,
    pub class_name: &'static str,
    /// Size of the per-handle state, for diagnostics.
    pub priv_data_size: usize,
    pub options: Vec<OptionSpec>,
    pub open: OpenFn,
}

impl fmt::Debug for ProtocolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolDescriptor")
            .field("name", &self.name)
            .field("class_name", &self.class_name)
            .field("priv_data_size", &self.priv_data_size)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whence_raw_codes() {
        for whence in [Whence::Start, Whence::Current, Whence::End, Whence::SizeQuery] {
            assert_eq!(Whence::from_raw(whence.as_raw()).unwrap(), whence);
        }
    }

    #[test]
    fn test_unknown_whence_is_invalid() {
        assert!(matches!(
            Whence::from_raw(3),
            Err(ProtocolError::InvalidArgument(_))
        ));
        assert!(Whence::from_raw(-1).is_err());
    }

    #[test]
    fn test_default_flags_read_only() {
        let flags = OpenFlags::default();
        assert!(flags.read);
        assert!(!flags.write);
    }
}
