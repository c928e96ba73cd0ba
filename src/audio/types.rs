use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{AudioError, Result};

/// Decoded audio held in memory as planar PCM samples
///
/// Each channel is its own `Vec<f32>` with samples in the range [-1.0, 1.0].
/// All channels have the same length. A buffer is never mutated after
/// construction: every edit produces a fresh one.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from per-channel sample vectors
    ///
    /// Fails when there are no channels, the channels differ in length,
    /// or the sample rate is zero.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidBuffer(
                "Sample rate must be greater than 0".to_string(),
            ));
        }

        let Some(first) = channels.first() else {
            return Err(AudioError::InvalidBuffer(
                "At least one channel is required".to_string(),
            ));
        };

        let frames = first.len();
        if let Some((index, channel)) = channels
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != frames)
        {
            return Err(AudioError::InvalidBuffer(format!(
                "Channel {} has {} frames, expected {}",
                index,
                channel.len(),
                frames
            )));
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Build a buffer from interleaved samples: [L, R, L, R, ...]
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(sample_rate: u32, channel_count: u16, samples: &[f32]) -> Result<Self> {
        if channel_count == 0 {
            return Err(AudioError::InvalidBuffer(
                "At least one channel is required".to_string(),
            ));
        }

        let count = channel_count as usize;
        let frames = samples.len() / count;
        let mut channels = vec![Vec::with_capacity(frames); count];
        for frame in samples.chunks_exact(count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self::new(sample_rate, channels)
    }

    /// New buffer at the same sample rate with edited channel data
    ///
    /// Callers slice every channel with the same range, so the layout
    /// invariants of `self` carry over.
    pub(crate) fn with_channels(&self, channels: Vec<Vec<f32>>) -> Self {
        debug_assert_eq!(channels.len(), self.channels.len());
        debug_assert!(channels.windows(2).all(|w| w[0].len() == w[1].len()));
        Self {
            sample_rate: self.sample_rate,
            channels,
        }
    }

    /// Sample rate in Hz (e.g., 44100, 48000)
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Get the number of audio frames (one sample per channel)
    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    /// Calculate the total duration of the audio in seconds
    ///
    /// Duration = frames / sample_rate
    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

/// A time range in seconds selected for editing
///
/// Regions are plain values. `start >= end` is a degenerate region, which the
/// editor treats as "nothing selected" rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub start: f64,
    pub end: f64,
}

impl Region {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the region in seconds, zero when degenerate
    pub fn width(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn is_degenerate(&self) -> bool {
        self.end <= self.start
    }

    /// Clamp both bounds into `[0, duration]`
    pub fn clamped(&self, duration: f64) -> Self {
        let duration = duration.max(0.0);
        Self {
            start: self.start.clamp(0.0, duration),
            end: self.end.clamp(0.0, duration),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}s..{:.2}s", self.start, self.end)
    }
}

/// Container type of a [`FileArtifact`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioMime {
    Wav,
    Mpeg,
}

impl AudioMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mpeg => "audio/mpeg",
        }
    }

    /// Extension symphonia should be hinted with
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mpeg => "mp3",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("wav") || ext.eq_ignore_ascii_case("wave") {
            Some(Self::Wav)
        } else if ext.eq_ignore_ascii_case("mp3") {
            Some(Self::Mpeg)
        } else {
            None
        }
    }
}

/// An encoded audio file: the original upload or the result of an edit
///
/// The bytes are shared, so cloning an artifact is cheap and two clones
/// refer to the same file. Use [`FileArtifact::ptr_eq`] to compare identity.
#[derive(Debug, Clone)]
pub struct FileArtifact {
    bytes: Arc<[u8]>,
    mime: AudioMime,
    name: Option<String>,
}

impl FileArtifact {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime: AudioMime) -> Self {
        Self {
            bytes: bytes.into(),
            mime,
            name: None,
        }
    }

    /// Artifact produced by the WAV encoder
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self::new(bytes, AudioMime::Wav)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Read an uploaded file, applying the extension filter
    ///
    /// Only the extension is checked. A file whose content does not match its
    /// extension is accepted here and fails later when it is decoded.
    pub fn load<P: AsRef<Path>>(path: P, accepted_extensions: &[String]) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        let accepted = accepted_extensions
            .iter()
            .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(ext));
        let mime = AudioMime::from_extension(ext).filter(|_| accepted).ok_or_else(|| {
            AudioError::UnsupportedFormat(format!(
                "'{}' (accepted: {})",
                path_str,
                accepted_extensions.join(", ")
            ))
        })?;

        let bytes = fs::read(path).map_err(|e| AudioError::FileOpen {
            path: path_str,
            source: e,
        })?;

        let artifact = Self::new(bytes, mime);
        Ok(match path.file_name() {
            Some(name) => artifact.with_name(name.to_string_lossy()),
            None => artifact,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn mime(&self) -> AudioMime {
        self.mime
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when both artifacts share the same underlying file bytes
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

/// Metadata about an audio file without keeping its samples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioInfo {
    /// Total duration in seconds
    pub duration_seconds: f64,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels
    pub channels: u16,

    /// Audio format/codec name (e.g., "PCM", "MP3")
    pub format: String,

    /// Bit depth if available (e.g., 16, 24)
    pub bit_depth: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted() -> Vec<String> {
        vec!["mp3".to_string(), "wav".to_string()]
    }

    #[test]
    fn test_buffer_rejects_uneven_channels() {
        let result = AudioBuffer::new(44100, vec![vec![0.0; 4], vec![0.0; 3]]);
        assert!(matches!(result, Err(AudioError::InvalidBuffer(_))));
    }

    #[test]
    fn test_buffer_rejects_empty_layout() {
        assert!(AudioBuffer::new(44100, Vec::new()).is_err());
        assert!(AudioBuffer::new(0, vec![vec![0.0]]).is_err());
    }

    #[test]
    fn test_from_interleaved_splits_channels() {
        let buffer =
            AudioBuffer::from_interleaved(8000, 2, &[0.1, -0.1, 0.2, -0.2, 0.3]).unwrap();

        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.channel(0).unwrap(), &[0.1, 0.2]);
        assert_eq!(buffer.channel(1).unwrap(), &[-0.1, -0.2]);
    }

    #[test]
    fn test_duration() {
        let buffer = AudioBuffer::new(44100, vec![vec![0.0; 88200]]).unwrap();
        assert_eq!(buffer.duration_seconds(), 2.0);
    }

    #[test]
    fn test_region_clamp() {
        let region = Region::new(-1.0, 12.0).clamped(10.0);
        assert_eq!(region, Region::new(0.0, 10.0));
        assert!(Region::new(3.0, 3.0).is_degenerate());
        assert_eq!(Region::new(4.0, 2.0).width(), 0.0);
    }

    #[test]
    fn test_load_applies_extension_filter() {
        let dir = tempfile::tempdir().unwrap();

        let flac = dir.path().join("song.flac");
        std::fs::write(&flac, b"fLaC").unwrap();
        assert!(matches!(
            FileArtifact::load(&flac, &accepted()),
            Err(AudioError::UnsupportedFormat(_))
        ));

        // Content is not inspected on load
        let fake = dir.path().join("not_really.MP3");
        std::fs::write(&fake, b"hello").unwrap();
        let artifact = FileArtifact::load(&fake, &accepted()).unwrap();
        assert_eq!(artifact.mime(), AudioMime::Mpeg);
        assert_eq!(artifact.name(), Some("not_really.MP3"));
        assert_eq!(artifact.bytes(), b"hello");
    }

    #[test]
    fn test_load_missing_file() {
        let result = FileArtifact::load("/definitely/missing.wav", &accepted());
        assert!(matches!(result, Err(AudioError::FileOpen { .. })));
    }

    #[test]
    fn test_clone_shares_bytes() {
        let a = FileArtifact::wav(vec![1, 2, 3]);
        let b = a.clone();
        let c = FileArtifact::wav(vec![1, 2, 3]);

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
