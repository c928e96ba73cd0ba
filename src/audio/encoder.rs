// src/audio/encoder.rs

use std::fs;
use std::path::Path;

use crate::audio::types::AudioBuffer;
use crate::error::{AudioError, Result};

/// Size of the canonical RIFF/WAVE header written before the sample data
pub const WAV_HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: usize = 2;
const FORMAT_PCM: u16 = 1;

/// Quantize one float sample to signed 16-bit PCM
///
/// The sample is clamped to [-1.0, 1.0]. Negative values scale by 32768 and
/// non-negative values by 32767, then the result is truncated toward zero.
/// NaN maps to 0.
pub fn quantize_sample(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode a buffer to an in-memory 16-bit PCM WAV file
///
/// The output is always a 44-byte header followed by interleaved
/// little-endian samples, `44 + frames * channels * 2` bytes in total,
/// whatever the channel count.
///
/// # Example
/// ```
/// use audio_cutter_lib::audio::{encode_wav, AudioBuffer};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mono = AudioBuffer::new(44100, vec![vec![1.0, -1.0]])?;
/// let bytes = encode_wav(&mono)?;
///
/// assert_eq!(bytes.len(), 44 + 4);
/// assert_eq!(&bytes[44..46], &32767i16.to_le_bytes());
/// assert_eq!(&bytes[46..48], &(-32768i16).to_le_bytes());
/// # Ok(())
/// # }
/// ```
pub fn encode_wav(audio: &AudioBuffer) -> Result<Vec<u8>> {
    let channels = audio.channel_count();
    let frames = audio.frame_count();

    let data_len = frames
        .checked_mul(channels * BYTES_PER_SAMPLE)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| n.checked_add(36).is_some())
        .ok_or_else(|| {
            AudioError::EncodeFailed(format!(
                "{} frames x {} channels does not fit in a RIFF file",
                frames, channels
            ))
        })?;
    let (channel_count, block_align) = u16::try_from(channels)
        .ok()
        .and_then(|c| c.checked_mul(BYTES_PER_SAMPLE as u16).map(|align| (c, align)))
        .ok_or_else(|| AudioError::EncodeFailed(format!("Too many channels: {}", channels)))?;

    let sample_rate = audio.sample_rate();
    let byte_rate = sample_rate
        .checked_mul(block_align as u32)
        .ok_or_else(|| AudioError::EncodeFailed(format!("Byte rate overflows at {} Hz", sample_rate)))?;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);

    // RIFF chunk
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&channel_count.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    let planes = audio.channels();
    for frame in 0..frames {
        for plane in planes {
            out.extend_from_slice(&quantize_sample(plane[frame]).to_le_bytes());
        }
    }

    tracing::debug!(
        frames,
        channels,
        sample_rate,
        bytes = out.len(),
        "Encoded WAV"
    );

    Ok(out)
}

/// Encode a buffer and write the WAV file to disk
pub fn write_wav<P: AsRef<Path>>(audio: &AudioBuffer, output_path: P) -> Result<()> {
    let bytes = encode_wav(audio)?;
    fs::write(output_path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavReader};
    use std::io::Cursor;

    fn read_u16(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([bytes[at], bytes[at + 1]])
    }

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn test_quantization_endpoints() {
        assert_eq!(quantize_sample(1.0), 32767);
        assert_eq!(quantize_sample(-1.0), -32768);
        assert_eq!(quantize_sample(0.0), 0);
    }

    #[test]
    fn test_quantization_clamps_and_truncates() {
        assert_eq!(quantize_sample(3.0), 32767);
        assert_eq!(quantize_sample(-7.5), -32768);
        // 0.5 * 32767 = 16383.5, truncated
        assert_eq!(quantize_sample(0.5), 16383);
        // -0.5 * 32768 = -16384 exactly
        assert_eq!(quantize_sample(-0.5), -16384);
        // toward zero, not floor
        assert_eq!(quantize_sample(-0.00001), 0);
        assert_eq!(quantize_sample(f32::NAN), 0);
    }

    #[test]
    fn test_mono_fixture() {
        let audio = AudioBuffer::new(44100, vec![vec![1.0, -1.0]]).unwrap();
        let bytes = encode_wav(&audio).unwrap();

        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(read_u32(&bytes, 4), 40);
        assert_eq!(&bytes[8..16], b"WAVEfmt ");
        assert_eq!(read_u32(&bytes, 16), 16);
        assert_eq!(read_u16(&bytes, 20), 1);
        assert_eq!(read_u16(&bytes, 22), 1);
        assert_eq!(read_u32(&bytes, 24), 44100);
        assert_eq!(read_u32(&bytes, 28), 88200);
        assert_eq!(read_u16(&bytes, 32), 2);
        assert_eq!(read_u16(&bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(read_u32(&bytes, 40), 4);
        assert_eq!(&bytes[44..46], &[0xFF, 0x7F]);
        assert_eq!(&bytes[46..48], &[0x00, 0x80]);
    }

    #[test]
    fn test_interleaves_channels_in_order() {
        let audio = AudioBuffer::new(
            48000,
            vec![vec![0.0, 1.0], vec![-1.0, 0.0], vec![1.0, -1.0]],
        )
        .unwrap();
        let bytes = encode_wav(&audio).unwrap();

        // Header stays 44 bytes even with more than two channels
        assert_eq!(bytes.len(), 44 + 2 * 3 * 2);
        assert_eq!(read_u16(&bytes, 22), 3);
        assert_eq!(read_u32(&bytes, 28), 48000 * 6);
        assert_eq!(read_u16(&bytes, 32), 6);

        let samples: Vec<i16> = bytes[44..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(samples, vec![0, -32768, 32767, 32767, 0, -32768]);
    }

    #[test]
    fn test_empty_buffer_is_header_only() {
        let audio = AudioBuffer::new(22050, vec![Vec::new(), Vec::new()]).unwrap();
        let bytes = encode_wav(&audio).unwrap();

        assert_eq!(bytes.len(), WAV_HEADER_LEN);
        assert_eq!(read_u32(&bytes, 40), 0);
    }

    #[test]
    fn test_output_is_readable_by_hound() {
        let audio = AudioBuffer::new(
            44100,
            vec![vec![0.0, 0.25, -0.25], vec![0.5, -0.5, 1.0]],
        )
        .unwrap();
        let bytes = encode_wav(&audio).unwrap();

        let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, SampleFormat::Int);

        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16383, 8191, -16384, -8192, 32767]);
    }

    #[test]
    fn test_write_wav_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let audio = AudioBuffer::new(8000, vec![vec![0.1; 80]]).unwrap();

        write_wav(&audio, &path).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written.len(), 44 + 160);
    }
}
