//! Loading sound assets for the file-playback variant.

use std::path::Path;

use crate::dsp::sampler::SampleBuffer;
use crate::error::SoundboardError;
use crate::sound::SoundName;

/// Produces a decoded buffer for a sound's asset path.
pub trait AssetLoader {
    fn load(&mut self, name: SoundName, path: &Path) -> Result<SampleBuffer, SoundboardError>;
}

impl<F> AssetLoader for F
where
    F: FnMut(SoundName, &Path) -> Result<SampleBuffer, SoundboardError>,
{
    fn load(&mut self, name: SoundName, path: &Path) -> Result<SampleBuffer, SoundboardError> {
        self(name, path)
    }
}

/// Reads assets from disk and decodes them by file extension.
#[cfg(feature = "assets")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAssetLoader;

#[cfg(feature = "assets")]
impl AssetLoader for FileAssetLoader {
    fn load(&mut self, name: SoundName, path: &Path) -> Result<SampleBuffer, SoundboardError> {
        let load_error = |reason: String| SoundboardError::AssetLoad {
            name,
            path: path.to_path_buf(),
            reason,
        };
        let bytes = std::fs::read(path).map_err(|e| load_error(e.to_string()))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let buffer = decode_asset(&bytes, extension).map_err(|e| load_error(e.to_string()))?;
        log::debug!(
            "loaded {} ({} samples @ {} Hz)",
            path.display(),
            buffer.len(),
            buffer.sample_rate
        );
        Ok(buffer)
    }
}

/// Decode `mp3` or `wav` bytes into a mono buffer at the file's native rate.
#[cfg(feature = "assets")]
pub fn decode_asset(bytes: &[u8], extension: &str) -> Result<SampleBuffer, crate::error::DecodeError> {
    use crate::error::DecodeError;

    let buffer = match extension.to_ascii_lowercase().as_str() {
        "mp3" => decode_mp3(bytes)?,
        "wav" => decode_wav(bytes)?,
        other => {
            return Err(DecodeError::UnsupportedFormat {
                extension: other.to_string(),
            });
        }
    };
    if buffer.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(buffer)
}

#[cfg(feature = "assets")]
fn decode_mp3(bytes: &[u8]) -> Result<SampleBuffer, crate::error::DecodeError> {
    use crate::error::DecodeError;

    let mut decoder = minimp3::Decoder::new(std::io::Cursor::new(bytes));
    let mut pcm: Vec<i16> = Vec::new();
    let mut format: Option<(u16, u32)> = None;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if format.is_none() {
                    format = Some((frame.channels as u16, frame.sample_rate as u32));
                }
                pcm.extend_from_slice(&frame.data);
            }
            Err(minimp3::Error::Eof) => break,
            // ID3 tags and junk between frames
            Err(minimp3::Error::SkippedData) => continue,
            Err(e) => {
                return Err(DecodeError::Malformed {
                    reason: format!("{e:?}"),
                });
            }
        }
    }

    let (channels, sample_rate) = format.ok_or(DecodeError::Empty)?;
    Ok(SampleBuffer::from_i16(&pcm, channels, sample_rate))
}

#[cfg(feature = "assets")]
fn decode_wav(bytes: &[u8]) -> Result<SampleBuffer, crate::error::DecodeError> {
    use crate::error::DecodeError;

    let malformed = |e: hound::Error| DecodeError::Malformed {
        reason: e.to_string(),
    };
    let mut reader = hound::WavReader::new(std::io::Cursor::new(bytes)).map_err(malformed)?;
    let spec = reader.spec();

    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, _) => {
            let samples = reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(malformed)?;
            Ok(SampleBuffer::from_f32(&samples, spec.channels, spec.sample_rate))
        }
        (hound::SampleFormat::Int, 16) => {
            let samples = reader
                .samples::<i16>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(malformed)?;
            Ok(SampleBuffer::from_i16(&samples, spec.channels, spec.sample_rate))
        }
        (hound::SampleFormat::Int, bits) => {
            let scale = (1_i64 << (bits.clamp(1, 32) - 1)) as f32;
            let samples = reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(malformed)?;
            Ok(SampleBuffer::from_f32(&samples, spec.channels, spec.sample_rate))
        }
    }
}
