//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use media_data_source::DataSource;
use parking_lot::Mutex;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// What a `MockSource` has been asked to do.
#[derive(Debug, Default)]
pub struct SourceLog {
    pub size_queries: usize,
    pub reads: Vec<(u64, usize)>,
    pub closes: usize,
}

/// In-memory data source.
///
/// Reads are positional. Past the end it returns -1. Queued `overrides`
/// replace the next read results, and `size` can be changed after open to
/// check that the adapter caches it.
pub struct MockSource {
    data: Vec<u8>,
    pub size: Arc<Mutex<i64>>,
    pub overrides: Arc<Mutex<VecDeque<i32>>>,
    pub log: Arc<Mutex<SourceLog>>,
}

impl MockSource {
    pub fn new(data: Vec<u8>) -> Self {
        let size = data.len() as i64;
        Self::with_size(data, size)
    }

    pub fn with_size(data: Vec<u8>, size: i64) -> Self {
        Self {
            data,
            size: Arc::new(Mutex::new(size)),
            overrides: Arc::new(Mutex::new(VecDeque::new())),
            log: Arc::new(Mutex::new(SourceLog::default())),
        }
    }

    pub fn patterned(len: usize) -> Self {
        Self::new((0..len).map(|i| (i % 256) as u8).collect())
    }
}

impl DataSource for MockSource {
    fn total_size(&mut self) -> i64 {
        self.log.lock().size_queries += 1;
        *self.size.lock()
    }

    fn read_packet(&mut self, buf: &mut [u8], offset: u64) -> i32 {
        self.log.lock().reads.push((offset, buf.len()));

        if let Some(ret) = self.overrides.lock().pop_front() {
            return ret;
        }

        let start = offset as usize;
        if start >= self.data.len() {
            return -1;
        }
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        n as i32
    }

    fn close(&mut self) {
        self.log.lock().closes += 1;
    }
}

/// 16-bit PCM WAV with a sine wave.
pub fn create_test_wav(sample_count: usize, sample_rate: u32, channels: u16) -> Vec<u8> {
    let bytes_per_sample = 2;
    let data_size = (sample_count * channels as usize * bytes_per_sample) as u32;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(file_size as usize + 8);

    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&file_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    let byte_rate = sample_rate * channels as u32 * bytes_per_sample as u32;
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    let block_align = channels * bytes_per_sample as u16;
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());

    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());

    for i in 0..sample_count {
        let sample = ((i as f32 * 0.1).sin() * 32767.0) as i16;
        for _ in 0..channels {
            wav.extend_from_slice(&sample.to_le_bytes());
        }
    }

    wav
}
