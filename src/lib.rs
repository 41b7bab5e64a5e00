pub mod config;
pub mod errors;
pub mod loader;
pub mod protocol;
pub mod source;
pub mod stream;

pub use config::{ProtocolConfig, ReadRetryConfig};
pub use errors::{ProtocolError, ProtocolResult};
pub use loader::{open_media, MediaTrack};
pub use protocol::{
    MediaDataSource, OpenFlags, OpenOptions, ProtocolDescriptor, ProtocolRegistry, UrlProtocol,
    Whence,
};
pub use source::{DataSource, SourceHandle, SourceTable};
pub use stream::ProtocolStream;

/// Build a registry with the media data source protocol registered under
/// `config.scheme`. Sources inserted into `sources` become openable as
/// `<scheme>:<handle>`.
pub fn init(config: &ProtocolConfig, sources: SourceTable) -> ProtocolResult<ProtocolRegistry> {
    let mut registry = ProtocolRegistry::new();
    protocol::media_data_source::register(&mut registry, config, sources)?;
    Ok(registry)
}
