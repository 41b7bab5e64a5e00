pub mod table;

pub use table::{SourceHandle, SourceTable};

/// Capability table every external data source provides.
///
/// The adapter never inspects the concrete type behind it. Reads are
/// positional: the source must honour `offset` on every call rather than
/// keep its own cursor.
pub trait DataSource: Send + Sync {
    /// Total length in bytes, or a negative value when unknown (streamed).
    fn total_size(&mut self) -> i64;

    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes written into `buf`, `0` when nothing is
    /// available yet, or a negative value at end of stream or on failure.
    fn read_packet(&mut self, buf: &mut [u8], offset: u64) -> i32;

    fn close(&mut self);
}
