//! URL protocol over an external, pull-based data source.
//!
//! `ijkmediadatasource:<id>` names a source previously inserted into a
//! [`SourceTable`]. The protocol keeps its own logical read position and
//! passes it as the explicit offset of every `read_packet`, so seeking never
//! touches the source.

use std::sync::Arc;

use super::{
    OpenFlags, OpenOptions, ProtocolDescriptor, ProtocolRegistry, UrlProtocol, Whence,
};
use crate::config::ProtocolConfig;
use crate::errors::{ProtocolError, ProtocolResult};
use crate::source::{DataSource, SourceHandle, SourceTable};

pub const CLASS_NAME: &str = "IjkMediaDataSource";

/// `logical_size` when the source could not report a length.
pub const UNKNOWN_SIZE: i64 = -1;

pub struct MediaDataSource {
    scheme: String,
    logical_pos: i64,
    logical_size: i64,
    is_streamed: bool,
    handle: SourceHandle,
    source: Option<Box<dyn DataSource>>,
}

impl MediaDataSource {
    /// Resolve the handle in `arg` and take ownership of its source.
    ///
    /// The source's size is queried exactly once, here.
    pub fn open(
        arg: &str,
        flags: OpenFlags,
        config: &ProtocolConfig,
        sources: &SourceTable,
    ) -> ProtocolResult<Self> {
        let handle = parse_handle(arg, &config.url_prefix())?;

        let mut source = sources.take(handle).ok_or_else(|| {
            ProtocolError::invalid(format!("No live data source for handle {}", handle))
        })?;

        let reported = source.total_size();
        let (logical_size, is_streamed) = if reported < 0 {
            (UNKNOWN_SIZE, true)
        } else {
            (reported, false)
        };

        log::debug!(
            "[MediaDataSource] Opened {} (size: {}, streamed: {}, flags: {:?})",
            handle,
            logical_size,
            is_streamed,
            flags
        );

        Ok(Self {
            scheme: config.scheme.clone(),
            logical_pos: 0,
            logical_size,
            is_streamed,
            handle,
            source: Some(source),
        })
    }

    pub fn logical_pos(&self) -> i64 {
        self.logical_pos
    }

    pub fn logical_size(&self) -> i64 {
        self.logical_size
    }

    pub fn handle(&self) -> SourceHandle {
        self.handle
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    fn source_mut(&mut self) -> ProtocolResult<&mut Box<dyn DataSource>> {
        let handle = self.handle;
        self.source
            .as_mut()
            .ok_or_else(|| ProtocolError::invalid(format!("Data source {} is closed", handle)))
    }
}

impl UrlProtocol for MediaDataSource {
    fn name(&self) -> &str {
        &self.scheme
    }

    fn read(&mut self, buf: &mut [u8]) -> ProtocolResult<usize> {
        let offset = self.logical_pos as u64;
        let len = buf.len().min(i32::MAX as usize);
        let source = self.source_mut()?;

        let ret = source.read_packet(&mut buf[..len], offset);
        if ret < 0 {
            return Err(ProtocolError::EndOfStream);
        } else if ret == 0 {
            return Err(ProtocolError::WouldBlock);
        }

        let mut n = ret as usize;
        if n > len {
            log::warn!(
                "[MediaDataSource] Source {} reported {} bytes for a {} byte read",
                self.handle,
                n,
                len
            );
            n = len;
        }

        // position must stay a valid non-negative i64
        self.logical_pos = self.logical_pos.checked_add(n as i64).ok_or_else(|| {
            log::warn!(
                "[MediaDataSource] Source {} read {} bytes past the maximum position {}",
                self.handle,
                n,
                self.logical_pos
            );
            ProtocolError::EndOfStream
        })?;
        Ok(n)
    }

    fn seek(&mut self, pos: i64, whence: Whence) -> ProtocolResult<i64> {
        self.source_mut()?;

        let new_logical_pos = match whence {
            Whence::SizeQuery => {
                log::trace!("[MediaDataSource] seek: size query: {}", self.logical_size);
                return Ok(self.logical_size);
            }
            Whence::Current => {
                log::trace!("[MediaDataSource] seek: current {:+}", pos);
                self.logical_pos.checked_add(pos).ok_or_else(|| {
                    ProtocolError::invalid(format!(
                        "Seek overflow: {} + {}",
                        self.logical_pos, pos
                    ))
                })?
            }
            Whence::Start => {
                log::trace!("[MediaDataSource] seek: start {}", pos);
                pos
            }
            Whence::End => {
                return Err(ProtocolError::invalid("Seek relative to end is not supported"));
            }
        };

        if new_logical_pos < 0 {
            return Err(ProtocolError::invalid(format!(
                "Negative seek position: {}",
                new_logical_pos
            )));
        }

        self.logical_pos = new_logical_pos;
        Ok(self.logical_pos)
    }

    fn close(&mut self) -> ProtocolResult<()> {
        if let Some(mut source) = self.source.take() {
            source.close();
            log::debug!(
                "[MediaDataSource] Closed {} at {}/{}",
                self.handle,
                self.logical_pos,
                self.logical_size
            );
        }
        Ok(())
    }

    fn is_streamed(&self) -> bool {
        self.is_streamed
    }
}

impl Drop for MediaDataSource {
    fn drop(&mut self) {
        if let Some(mut source) = self.source.take() {
            log::debug!("[MediaDataSource] Dropped {} without close", self.handle);
            source.close();
        }
    }
}

/// Strip the scheme prefix (if present) and parse the decimal handle id.
fn parse_handle(arg: &str, prefix: &str) -> ProtocolResult<SourceHandle> {
    let id_str = arg.strip_prefix(prefix).unwrap_or(arg);

    let id = id_str
        .parse::<i64>()
        .map_err(|_| ProtocolError::invalid(format!("Invalid data source handle: {}", id_str)))?;

    SourceHandle::from_raw(id).ok_or_else(|| ProtocolError::invalid("Null data source handle"))
}

/// Descriptor for registering this protocol under `config.scheme`.
pub fn descriptor(config: &ProtocolConfig, sources: SourceTable) -> ProtocolDescriptor {
    let open_config = config.clone();

    ProtocolDescriptor {
        name: config.scheme.clone(),
        class_name: CLASS_NAME,
        priv_data_size: std::mem::size_of::<MediaDataSource>(),
        options: Vec::new(),
        open: Arc::new(
            move |url: &str,
                  flags: OpenFlags,
                  _options: &mut OpenOptions|
                  -> ProtocolResult<Box<dyn UrlProtocol>> {
                let protocol = MediaDataSource::open(url, flags, &open_config, &sources)?;
                Ok(Box::new(protocol))
            },
        ),
    }
}

/// Register the protocol with the host. Undo with `registry.unregister(&config.scheme)`.
pub fn register(
    registry: &mut ProtocolRegistry,
    config: &ProtocolConfig,
    sources: SourceTable,
) -> ProtocolResult<()> {
    registry.register(descriptor(config, sources))
}
