// src/audio/edit.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::audio::types::{AudioBuffer, Region};

/// Products this close to a whole frame are treated as that frame
const FRAME_SNAP_EPSILON: f64 = 1e-6;

/// Destructive region edits offered by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOp {
    /// Keep only the selected region
    Cut,
    /// Delete the selected region
    Remove,
}

impl EditOp {
    pub fn apply(&self, audio: &AudioBuffer, region: Region) -> AudioBuffer {
        match self {
            Self::Cut => cut(audio, region),
            Self::Remove => remove(audio, region),
        }
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cut => write!(f, "cut"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// Map a timestamp to a frame index
///
/// Uses `floor(seconds * sample_rate)`, clamped to `[0, frame_count]`. A
/// product within `FRAME_SNAP_EPSILON` of a whole number snaps to it, so
/// `duration_seconds()` maps back to `frame_count` instead of one short.
pub fn frame_index(seconds: f64, sample_rate: u32, frame_count: usize) -> usize {
    if !(seconds > 0.0) {
        return 0;
    }

    let exact = seconds * sample_rate as f64;
    let nearest = exact.round();
    let index = if (exact - nearest).abs() < FRAME_SNAP_EPSILON {
        nearest
    } else {
        exact.floor()
    };

    if index >= frame_count as f64 {
        frame_count
    } else {
        index as usize
    }
}

/// Resolve a region to a half-open frame range `[start, end)`
///
/// Degenerate or inverted regions resolve to an empty range at `start`.
fn frame_range(audio: &AudioBuffer, region: Region) -> (usize, usize) {
    let frames = audio.frame_count();
    let start = frame_index(region.start, audio.sample_rate(), frames);
    let end = frame_index(region.end, audio.sample_rate(), frames);
    (start, end.max(start))
}

/// Keep only the audio inside a region
///
/// Returns a new buffer holding frames `[floor(start * rate), floor(end * rate))`
/// of every channel at the original sample rate. Region bounds outside the
/// buffer are clamped; a zero-width or inverted region yields zero frames.
///
/// # Example
/// ```
/// use audio_cutter_lib::audio::{cut, AudioBuffer, Region};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // 10 seconds of stereo at 44.1kHz
/// let audio = AudioBuffer::new(44100, vec![vec![0.5; 441000]; 2])?;
///
/// let kept = cut(&audio, Region::new(5.0, 10.0));
///
/// assert_eq!(kept.duration_seconds(), 5.0);
/// assert_eq!(kept.sample_rate(), 44100);
/// assert_eq!(kept.channel_count(), 2);
/// # Ok(())
/// # }
/// ```
pub fn cut(audio: &AudioBuffer, region: Region) -> AudioBuffer {
    let (start, end) = frame_range(audio, region);

    let channels = audio
        .channels()
        .iter()
        .map(|channel| channel[start..end].to_vec())
        .collect();

    tracing::debug!(start, end, "Cut region");
    audio.with_channels(channels)
}

/// Delete the audio inside a region
///
/// Returns a new buffer holding the frames before `floor(start * rate)`
/// followed by the frames from `floor(end * rate)` on, for every channel.
/// A zero-width or inverted region returns an unchanged copy.
///
/// # Example
/// ```
/// use audio_cutter_lib::audio::{remove, AudioBuffer, Region};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let audio = AudioBuffer::new(10, vec![(0..10).map(|i| i as f32 / 10.0).collect()])?;
///
/// let spliced = remove(&audio, Region::new(0.2, 0.5));
///
/// assert_eq!(spliced.channel(0).unwrap(), &[0.0, 0.1, 0.5, 0.6, 0.7, 0.8, 0.9]);
/// # Ok(())
/// # }
/// ```
pub fn remove(audio: &AudioBuffer, region: Region) -> AudioBuffer {
    let (start, end) = frame_range(audio, region);

    let channels = audio
        .channels()
        .iter()
        .map(|channel| {
            let mut spliced = Vec::with_capacity(channel.len() - (end - start));
            spliced.extend_from_slice(&channel[..start]);
            spliced.extend_from_slice(&channel[end..]);
            spliced
        })
        .collect();

    tracing::debug!(start, end, "Removed region");
    audio.with_channels(channels)
}
