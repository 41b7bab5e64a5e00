use std::io::{self, Read, Seek, SeekFrom};

use symphonia::core::io::MediaSource;

use crate::config::ReadRetryConfig;
use crate::errors::ProtocolError;
use crate::protocol::{UrlProtocol, Whence};

/// Presents an opened protocol as `Read + Seek` so symphonia can probe and
/// decode from it.
///
/// This is the caller side of the protocol: it owns the `WouldBlock` retry
/// policy and maps end of stream onto `Ok(0)`.
pub struct ProtocolStream {
    protocol: Box<dyn UrlProtocol>,
    size: Option<u64>,
    position: u64,
    retry: ReadRetryConfig,
    closed: bool,
}

impl ProtocolStream {
    pub fn new(mut protocol: Box<dyn UrlProtocol>, retry: ReadRetryConfig) -> io::Result<Self> {
        let reported = protocol.seek(0, Whence::SizeQuery)?;
        let size = u64::try_from(reported).ok();

        let position = protocol.seek(0, Whence::Current)?;

        log::debug!(
            "[ProtocolStream] {}: size: {:?}, streamed: {}",
            protocol.name(),
            size,
            protocol.is_streamed()
        );

        Ok(Self {
            protocol,
            size,
            position: position as u64,
            retry,
            closed: false,
        })
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.protocol.close()?;
        Ok(())
    }
}

impl Read for ProtocolStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut attempts = 0;
        loop {
            match self.protocol.read(buf) {
                Ok(n) => {
                    self.position += n as u64;
                    return Ok(n);
                }
                Err(ProtocolError::EndOfStream) => return Ok(0),
                Err(ProtocolError::WouldBlock) => {
                    attempts += 1;
                    if attempts > self.retry.max_attempts {
                        return Err(ProtocolError::WouldBlock.into());
                    }
                    log::trace!(
                        "[ProtocolStream] No data at {} (attempt {}/{}). Retrying...",
                        self.position,
                        attempts,
                        self.retry.max_attempts
                    );
                    std::thread::sleep(self.retry.backoff(attempts));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Seek for ProtocolStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(p) => {
                let p = i64::try_from(p).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "Seek position out of range")
                })?;
                self.protocol.seek(p, Whence::Start)?
            }
            SeekFrom::Current(p) => self.protocol.seek(p, Whence::Current)?,
            SeekFrom::End(p) => {
                let len = self.size.ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "Cannot seek from end: unknown size")
                })?;
                let target = (len as i64).checked_add(p).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "Seek position out of range")
                })?;
                self.protocol.seek(target, Whence::Start)?
            }
        };

        self.position = new_pos as u64;
        Ok(self.position)
    }
}

impl MediaSource for ProtocolStream {
    fn is_seekable(&self) -> bool {
        !self.protocol.is_streamed()
    }

    fn byte_len(&self) -> Option<u64> {
        self.size
    }
}

impl Drop for ProtocolStream {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("[ProtocolStream] Close failed: {}", e);
        }
    }
}
