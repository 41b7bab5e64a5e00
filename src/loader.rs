use anyhow::{anyhow, Context, Result};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::config::ProtocolConfig;
use crate::protocol::{OpenFlags, OpenOptions, ProtocolRegistry};
use crate::stream::ProtocolStream;

pub struct MediaTrack {
    pub reader: Box<dyn FormatReader>,
    pub decoder: Box<dyn Decoder>,
    pub track_id: u32,
    pub duration_samples: u64,
    pub sample_rate: u32,
}

/// Open `url` through the registry and probe it into a format reader and decoder.
pub fn open_media(
    registry: &ProtocolRegistry,
    url: &str,
    config: &ProtocolConfig,
) -> Result<MediaTrack> {
    let mut options = OpenOptions::new();
    let protocol = registry
        .open_url(url, OpenFlags::READ, &mut options)
        .with_context(|| format!("Failed to open {}", url))?;
    let stream = ProtocolStream::new(protocol, config.read_retry.clone())?;

    let seekable = stream.is_seekable();
    let byte_len = stream.byte_len();
    log::debug!(
        "[loader] Probing {} (seekable: {}, length: {:?})",
        url,
        seekable,
        byte_len
    );

    let mss = MediaSourceStream::new(Box::new(stream), Default::default());

    let hint = Hint::new();

    let format_opts = FormatOptions {
        enable_gapless: true,
        ..Default::default()
    };
    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &MetadataOptions::default())
        .with_context(|| {
            format!(
                "Unsupported media format from {} ({})",
                url,
                byte_len.map_or_else(|| "streamed".to_string(), |len| format!("{} bytes", len))
            )
        })?;

    let reader = probed.format;
    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| anyhow!("No audio track in {}", url))?;
    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let duration_samples = track.codec_params.n_frames.unwrap_or(0);

    let decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .with_context(|| format!("Unsupported codec for track {} in {}", track.id, url))?;

    log::debug!(
        "[loader] {}: track {}, {} Hz, {} frames",
        url,
        track_id,
        sample_rate,
        duration_samples
    );

    Ok(MediaTrack {
        reader,
        decoder,
        track_id,
        duration_samples,
        sample_rate,
    })
}
