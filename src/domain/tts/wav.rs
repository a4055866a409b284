/// Size of the canonical RIFF/WAVE header written in front of PCM data
pub const WAV_HEADER_LEN: usize = 44;

const DEFAULT_CHANNELS: u16 = 1;
const DEFAULT_SAMPLE_RATE: u32 = 16_000;
const DEFAULT_BITS_PER_SAMPLE: u16 = 16;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("PCM payload of {0} bytes does not fit in a WAV container")]
    PayloadTooLarge(usize),
    #[error("PCM format {0} cannot be described by a WAV header")]
    UnsupportedFormat(String),
}

/// PCM layout parsed from a provider mime descriptor such as
/// `audio/L16;codec=pcm;rate=24000`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavOptions {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl Default for WavOptions {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNELS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
        }
    }
}

impl WavOptions {
    /// Parse `audio/L{bits}` plus `;key=value` parameters.
    /// Unknown parameters are ignored, missing or unparsable values keep the defaults.
    pub fn from_mime(mime_type: &str) -> Self {
        let mut options = Self::default();
        let mut pieces = mime_type.split(';').map(str::trim);

        let base = pieces.next().unwrap_or_default();
        if let Some(format) = base.split('/').nth(1) {
            if let Some(bits) = format
                .strip_prefix('L')
                .and_then(|b| b.parse::<u16>().ok())
                .filter(|&b| b > 0)
            {
                options.bits_per_sample = bits;
            }
        }

        for param in pieces {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            if key.trim().eq_ignore_ascii_case("rate") {
                if let Ok(rate) = value.trim().parse::<u32>() {
                    if rate > 0 {
                        options.sample_rate = rate;
                    }
                }
            }
        }

        options
    }

    /// `None` when the value does not fit the 32-bit header field
    pub fn byte_rate(&self) -> Option<u32> {
        let bits_per_second = u64::from(self.sample_rate)
            * u64::from(self.channels)
            * u64::from(self.bits_per_sample);
        u32::try_from(bits_per_second / 8).ok()
    }

    /// `None` when the value does not fit the 16-bit header field
    pub fn block_align(&self) -> Option<u16> {
        let bits_per_frame = u32::from(self.channels) * u32::from(self.bits_per_sample);
        u16::try_from(bits_per_frame / 8).ok()
    }
}

/// Wrap raw PCM bytes in a 44-byte WAV header described by `mime_type`
pub fn encode_wav(data: &[u8], mime_type: &str) -> Result<Vec<u8>, AudioError> {
    let options = WavOptions::from_mime(mime_type);
    let (Some(byte_rate), Some(block_align)) = (options.byte_rate(), options.block_align()) else {
        return Err(AudioError::UnsupportedFormat(mime_type.to_string()));
    };
    let data_len = u32::try_from(data.len())
        .ok()
        .filter(|len| len.checked_add(36).is_some())
        .ok_or(AudioError::PayloadTooLarge(data.len()))?;

    let mut buffer = Vec::with_capacity(WAV_HEADER_LEN + data.len());
    buffer.extend_from_slice(b"RIFF");
    buffer.extend_from_slice(&(36 + data_len).to_le_bytes());
    buffer.extend_from_slice(b"WAVEfmt ");
    buffer.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    buffer.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buffer.extend_from_slice(&options.channels.to_le_bytes());
    buffer.extend_from_slice(&options.sample_rate.to_le_bytes());
    buffer.extend_from_slice(&byte_rate.to_le_bytes());
    buffer.extend_from_slice(&block_align.to_le_bytes());
    buffer.extend_from_slice(&options.bits_per_sample.to_le_bytes());
    buffer.extend_from_slice(b"data");
    buffer.extend_from_slice(&data_len.to_le_bytes());
    buffer.extend_from_slice(data);

    Ok(buffer)
}

/// File extension for payloads that already carry a container.
/// `None` means raw samples that must go through [`encode_wav`].
pub fn container_extension(mime_type: &str) -> Option<&'static str> {
    let base = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match base.as_str() {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => Some("wav"),
        "audio/ogg" => Some("ogg"),
        "audio/opus" => Some("opus"),
        "audio/aac" => Some("aac"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        _ => None,
    }
}
