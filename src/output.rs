//! Audio outputs: where rendered buffers go to be heard.

use crate::dsp::mixer::StereoBuffer;
use crate::error::SoundboardError;

/// One rendered effect, asset or beep, ready for the platform device.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSound {
    pub label: String,
    /// Context time at which playback should begin.
    pub start_time: f64,
    pub buffer: StereoBuffer,
}

/// Sink for rendered sounds. Returning an error means the platform refused
/// playback (for example a blocked autoplay).
pub trait AudioOutput {
    fn play(&mut self, sound: RenderedSound) -> Result<(), SoundboardError>;
}

impl<T: AudioOutput + ?Sized> AudioOutput for Box<T> {
    fn play(&mut self, sound: RenderedSound) -> Result<(), SoundboardError> {
        (**self).play(sound)
    }
}

/// Keeps every sound it is given. Backs the WASM bindings and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    sounds: Vec<RenderedSound>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sounds(&self) -> &[RenderedSound] {
        &self.sounds
    }

    pub fn labels(&self) -> Vec<&str> {
        self.sounds.iter().map(|s| s.label.as_str()).collect()
    }

    /// Remove and return everything played so far.
    pub fn take(&mut self) -> Vec<RenderedSound> {
        std::mem::take(&mut self.sounds)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Superimpose all recorded sounds at their start times, relative to the
    /// earliest one. `None` when nothing was played.
    pub fn mixdown(&self) -> Option<StereoBuffer> {
        let first = self.sounds.first()?;
        let origin = self
            .sounds
            .iter()
            .map(|s| s.start_time)
            .fold(f64::INFINITY, f64::min);
        let sample_rate = first.buffer.sample_rate;

        let mut out = StereoBuffer::silent(0, sample_rate);
        for sound in &self.sounds {
            let offset = ((sound.start_time - origin) * sample_rate as f64).round() as usize;
            out.mix_in(&sound.buffer, offset);
        }
        Some(out)
    }
}

impl AudioOutput for MemoryOutput {
    fn play(&mut self, sound: RenderedSound) -> Result<(), SoundboardError> {
        self.sounds.push(sound);
        Ok(())
    }
}

/// Writes each sound as a numbered 16-bit stereo WAV file in a directory.
#[cfg(feature = "assets")]
#[derive(Debug, Clone)]
pub struct WavDirOutput {
    dir: std::path::PathBuf,
    written: usize,
}

#[cfg(feature = "assets")]
impl WavDirOutput {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        WavDirOutput {
            dir: dir.into(),
            written: 0,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

#[cfg(feature = "assets")]
impl AudioOutput for WavDirOutput {
    fn play(&mut self, sound: RenderedSound) -> Result<(), SoundboardError> {
        let path = self.dir.join(format!("{:04}-{}.wav", self.written, sound.label));
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: sound.buffer.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let rejected = |e: hound::Error| SoundboardError::Playback {
            label: sound.label.clone(),
            reason: e.to_string(),
        };

        let mut writer = hound::WavWriter::create(&path, spec).map_err(rejected)?;
        for sample in sound.buffer.interleaved() {
            writer
                .write_sample(crate::dsp::renderer::to_i16(sample))
                .map_err(rejected)?;
        }
        writer.finalize().map_err(rejected)?;

        log::debug!("wrote {}", path.display());
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sound(label: &str, start_time: f64, frames: usize, value: f32) -> RenderedSound {
        let mut buffer = StereoBuffer::silent(frames, 100);
        buffer.left.iter_mut().for_each(|s| *s = value);
        RenderedSound {
            label: label.to_string(),
            start_time,
            buffer,
        }
    }

    #[test]
    fn records_in_order() {
        let mut out = MemoryOutput::new();
        out.play(sound("a", 0.0, 1, 0.1)).unwrap();
        out.play(sound("b", 0.0, 1, 0.1)).unwrap();
        assert_eq!(out.labels(), vec!["a", "b"]);
        assert_eq!(out.take().len(), 2);
        assert!(out.is_empty());
    }

    #[test]
    fn mixdown_superimposes_at_offsets() {
        let mut out = MemoryOutput::new();
        assert!(out.mixdown().is_none());
        out.play(sound("a", 1.0, 10, 0.25)).unwrap();
        out.play(sound("b", 1.05, 10, 0.5)).unwrap();
        let mix = out.mixdown().unwrap();
        assert_eq!(mix.frames(), 15);
        assert_eq!(mix.left[0], 0.25);
        assert_eq!(mix.left[7], 0.75);
        assert_eq!(mix.left[12], 0.5);
    }

    #[test]
    fn boxed_output_forwards() {
        let mut out: Box<dyn AudioOutput> = Box::new(MemoryOutput::new());
        assert!(out.play(sound("x", 0.0, 1, 0.0)).is_ok());
    }

    #[cfg(feature = "assets")]
    #[test]
    fn wav_dir_output_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = WavDirOutput::new(dir.path());
        out.play(sound("tada", 0.0, 50, 0.5)).unwrap();
        assert_eq!(out.written(), 1);

        let reader = hound::WavReader::open(dir.path().join("0000-tada.wav")).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.len(), 100);
    }
}
