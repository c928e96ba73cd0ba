// src/audio/decoder.rs

use hound::{SampleFormat, WavReader};
use std::io::{Cursor, ErrorKind};
use std::path::Path;
use std::sync::Arc;
use symphonia::core::audio::AudioBufferRef;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::types::{AudioBuffer, AudioInfo, AudioMime, FileArtifact};
use crate::error::{AudioError, Result};

/// Decodes an audio artifact to PCM samples in memory
///
/// RIFF/WAVE content is read with hound and integer PCM is mapped back with
/// the inverse of the encoder's quantization, so a file produced by
/// [`encode_wav`](crate::audio::encode_wav) decodes to within one step of the
/// source. Anything else (MP3, FLAC, OGG, unusual WAV variants) goes through
/// symphonia.
///
/// The artifact's MIME type is only a hint; the content decides the path.
///
/// # Example
/// ```
/// use audio_cutter_lib::audio::{decode_artifact, encode_wav, AudioBuffer, FileArtifact};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = AudioBuffer::new(8000, vec![vec![0.0, 1.0, -1.0]])?;
/// let artifact = FileArtifact::wav(encode_wav(&source)?);
///
/// let decoded = decode_artifact(&artifact)?;
/// assert_eq!(decoded, source);
/// # Ok(())
/// # }
/// ```
pub fn decode_artifact(artifact: &FileArtifact) -> Result<AudioBuffer> {
    if is_riff_wave(artifact.bytes()) {
        match decode_wav(artifact.shared_bytes()) {
            Ok(audio) => return Ok(audio),
            Err(e) => tracing::debug!("WAV fast path rejected file, using symphonia: {}", e),
        }
    }

    decode_with_symphonia(artifact.shared_bytes(), artifact.mime())
}

/// Read a file from disk and decode it
///
/// The extension picks the MIME hint; unknown extensions are treated as WAV
/// and left to content sniffing.
pub fn decode_audio_file<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| AudioError::FileOpen {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    let mime = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(AudioMime::from_extension)
        .unwrap_or(AudioMime::Wav);

    decode_artifact(&FileArtifact::new(bytes, mime))
}

/// Get audio metadata without keeping the samples
///
/// Reads only the header when the container declares its frame count. MP3
/// streams usually don't, in which case the whole file is decoded to measure
/// it.
pub fn probe_info(artifact: &FileArtifact) -> Result<AudioInfo> {
    if is_riff_wave(artifact.bytes()) {
        if let Ok(reader) = WavReader::new(Cursor::new(artifact.shared_bytes())) {
            let spec = reader.spec();
            return Ok(AudioInfo {
                duration_seconds: reader.duration() as f64 / spec.sample_rate as f64,
                sample_rate: spec.sample_rate,
                channels: spec.channels,
                format: match spec.sample_format {
                    SampleFormat::Int => "PCM".to_string(),
                    SampleFormat::Float => "PCM float".to_string(),
                },
                bit_depth: Some(spec.bits_per_sample),
            });
        }
    }

    let format = open_format(artifact.shared_bytes(), artifact.mime())?;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::DecodeFailed("No audio track".to_string()))?;

    let params = &track.codec_params;
    let codec_name = symphonia::default::get_codecs()
        .get_codec(params.codec)
        .map(|d| d.short_name.to_uppercase())
        .unwrap_or_else(|| format!("{:?}", params.codec));
    let bit_depth = params.bits_per_sample.map(|b| b as u16);

    let (duration_seconds, sample_rate, channels) =
        match (params.n_frames, params.sample_rate, params.channels) {
            (Some(n_frames), Some(sr), Some(ch)) if sr > 0 => {
                (n_frames as f64 / sr as f64, sr, ch.count() as u16)
            }
            _ => {
                tracing::debug!("Frame count not in metadata, decoding to measure duration");
                let audio = decode_with_symphonia(artifact.shared_bytes(), artifact.mime())?;
                (
                    audio.duration_seconds(),
                    audio.sample_rate(),
                    audio.channel_count() as u16,
                )
            }
        };

    Ok(AudioInfo {
        duration_seconds,
        sample_rate,
        channels,
        format: codec_name,
        bit_depth,
    })
}

fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Decode RIFF/WAVE bytes with hound
///
/// Integer samples of `b` bits map negative values by `2^(b-1)` and
/// non-negative values by `2^(b-1) - 1`, mirroring the encoder.
fn decode_wav(bytes: Arc<[u8]>) -> Result<AudioBuffer> {
    let mut reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()?,
        SampleFormat::Int => {
            let negative_scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f64;
            let positive_scale = (negative_scale - 1.0).max(1.0);
            reader
                .samples::<i32>()
                .map(|s| {
                    s.map(|v| {
                        if v < 0 {
                            (v as f64 / negative_scale) as f32
                        } else {
                            (v as f64 / positive_scale) as f32
                        }
                    })
                })
                .collect::<std::result::Result<Vec<f32>, _>>()?
        }
    };

    tracing::debug!(
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        bits = spec.bits_per_sample,
        samples = samples.len(),
        "Decoded WAV"
    );

    AudioBuffer::from_interleaved(spec.sample_rate, spec.channels, &samples)
}

/// Probe in-memory bytes and return the container reader
fn open_format(bytes: Arc<[u8]>, mime: AudioMime) -> Result<Box<dyn FormatReader>> {
    // Create a media source stream over the artifact bytes
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    // Create a hint to help symphonia detect the format
    let mut hint = Hint::new();
    hint.with_extension(mime.extension());
    hint.mime_type(mime.as_str());

    // Probe the media source to detect format
    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioError::DecodeFailed(format!("Failed to probe format: {}", e)))?;

    Ok(probed.format)
}

/// Decode any symphonia-supported container to planar f32 channels
fn decode_with_symphonia(bytes: Arc<[u8]>, mime: AudioMime) -> Result<AudioBuffer> {
    let mut format = open_format(bytes, mime)?;

    // Find the default audio track (skip video/subtitle tracks)
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::DecodeFailed("No audio track found in file".to_string()))?;

    let track_id = track.id;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::DecodeFailed("Sample rate not found".to_string()))?;

    // Channels may be missing from the metadata of some MP3s; the first
    // decoded packet fills them in
    let declared_channels = track.codec_params.channels.map(|c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::DecodeFailed(format!("Failed to create decoder: {}", e)))?;

    let mut planes: Vec<Vec<f32>> = Vec::new();
    let mut packets_read = 0usize;
    let mut packets_decoded = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(AudioError::DecodeFailed(format!("Failed to read packet: {}", e)))
            }
        };

        // Skip packets from other tracks (e.g., video, album art)
        if packet.track_id() != track_id {
            continue;
        }
        packets_read += 1;

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt frame: drop it and keep going
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(AudioError::DecodeFailed(format!("Decode error: {}", e))),
        };

        append_planes(&decoded, &mut planes)?;
        packets_decoded += 1;
    }

    if packets_read > 0 && packets_decoded == 0 {
        return Err(AudioError::DecodeFailed(format!(
            "None of {} packets could be decoded",
            packets_read
        )));
    }

    if planes.is_empty() {
        let count = declared_channels.ok_or_else(|| {
            AudioError::DecodeFailed("Could not determine channel count".to_string())
        })?;
        planes = vec![Vec::new(); count];
    }

    tracing::debug!(
        sample_rate,
        channels = planes.len(),
        frames = planes.first().map_or(0, Vec::len),
        "Decoded with symphonia"
    );

    AudioBuffer::new(sample_rate, planes)
        .map_err(|e| AudioError::DecodeFailed(format!("Decoded stream is inconsistent: {}", e)))
}

/// Append one decoded packet to the per-channel output
///
/// Handles all sample formats (u8, i16, i32, f32, f64) and converts to f32
fn append_planes(buffer: &AudioBufferRef, output: &mut Vec<Vec<f32>>) -> Result<()> {
    match buffer {
        // Already f32 - just copy
        AudioBufferRef::F32(buf) => extend_planes(buf.planes().planes(), output, |s| s),

        AudioBufferRef::F64(buf) => extend_planes(buf.planes().planes(), output, |s| s as f32),

        // Convert signed integers to f32 in range [-1.0, 1.0]
        AudioBufferRef::S8(buf) => {
            extend_planes(buf.planes().planes(), output, |s| s as f32 / 128.0)
        }
        AudioBufferRef::S16(buf) => {
            extend_planes(buf.planes().planes(), output, |s| s as f32 / 32768.0)
        }
        AudioBufferRef::S24(buf) => extend_planes(buf.planes().planes(), output, |s| {
            s.inner() as f32 / 8388608.0
        }),
        AudioBufferRef::S32(buf) => extend_planes(buf.planes().planes(), output, |s| {
            (s as f64 / 2147483648.0) as f32
        }),

        // Convert unsigned integers to f32
        AudioBufferRef::U8(buf) => extend_planes(buf.planes().planes(), output, |s| {
            (s as f32 - 128.0) / 128.0
        }),
        AudioBufferRef::U16(buf) => extend_planes(buf.planes().planes(), output, |s| {
            (s as f32 - 32768.0) / 32768.0
        }),
        AudioBufferRef::U24(buf) => extend_planes(buf.planes().planes(), output, |s| {
            (s.inner() as f32 - 8388608.0) / 8388608.0
        }),
        AudioBufferRef::U32(buf) => extend_planes(buf.planes().planes(), output, |s| {
            ((s as f64 - 2147483648.0) / 2147483648.0) as f32
        }),
    }
}

fn extend_planes<S: Copy>(
    planes: &[&[S]],
    output: &mut Vec<Vec<f32>>,
    convert: impl Fn(S) -> f32,
) -> Result<()> {
    if output.is_empty() {
        output.resize_with(planes.len(), Vec::new);
    } else if output.len() != planes.len() {
        return Err(AudioError::DecodeFailed(format!(
            "Channel count changed mid-stream: {} -> {}",
            output.len(),
            planes.len()
        )));
    }

    for (channel, plane) in output.iter_mut().zip(planes) {
        channel.extend(plane.iter().map(|&s| convert(s)));
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::audio::encoder::encode_wav;
    use approx::assert_abs_diff_eq;

    fn stereo_sweep(frames: usize) -> AudioBuffer {
        let left = (0..frames)
            .map(|i| (i as f32 / frames as f32) * 2.0 - 1.0)
            .collect();
        let right = (0..frames)
            .map(|i| ((i as f32) * 0.37).sin() * 0.8)
            .collect();
        AudioBuffer::new(44100, vec![left, right]).unwrap()
    }

    /// MPEG-1 Layer III frames (128 kbps, 44.1 kHz, joint stereo) whose
    /// headers parse but whose side info never does: all-ones side info sets
    /// main_data_begin to 511 and big_values past the 288 limit
    pub(crate) fn undecodable_mp3(frames: usize) -> Vec<u8> {
        const FRAME_LEN: usize = 417;
        const SIDE_INFO_LEN: usize = 32;
        let mut bytes = Vec::with_capacity(frames * FRAME_LEN);
        for _ in 0..frames {
            let mut frame = vec![0u8; FRAME_LEN];
            frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
            frame[4..4 + SIDE_INFO_LEN].fill(0xFF);
            bytes.extend_from_slice(&frame);
        }
        bytes
    }

    #[test]
    fn test_round_trip_within_one_step() {
        let source = stereo_sweep(2048);
        let artifact = FileArtifact::wav(encode_wav(&source).unwrap());

        let decoded = decode_artifact(&artifact).unwrap();

        assert_eq!(decoded.sample_rate(), 44100);
        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.frame_count(), 2048);
        for (original, restored) in source.channels().iter().zip(decoded.channels()) {
            for (&a, &b) in original.iter().zip(restored) {
                // positive samples scale by 32767, see "Round-trip bound" in DESIGN.md
                assert_abs_diff_eq!(a, b, epsilon = 1.0 / 32767.0 + f32::EPSILON);
            }
        }
    }

    #[test]
    fn test_symphonia_path_reads_encoded_wav() {
        let source = stereo_sweep(512);
        let bytes: Arc<[u8]> = encode_wav(&source).unwrap().into();

        let decoded = decode_with_symphonia(bytes, AudioMime::Wav).unwrap();

        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.frame_count(), 512);
        for (original, restored) in source.channels().iter().zip(decoded.channels()) {
            for (&a, &b) in original.iter().zip(restored) {
                // symphonia scales every sample by 1/32768, adding up to one
                // more step of error on the positive side
                assert_abs_diff_eq!(a, b, epsilon = 2.0 / 32767.0 + f32::EPSILON);
            }
        }
    }

    #[test]
    fn test_mislabelled_wav_still_decodes() {
        let source = AudioBuffer::new(16000, vec![vec![0.25; 160]]).unwrap();
        let artifact = FileArtifact::new(encode_wav(&source).unwrap(), AudioMime::Mpeg);

        let decoded = decode_artifact(&artifact).unwrap();
        assert_eq!(decoded.frame_count(), 160);
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        let artifact = FileArtifact::new(b"definitely not audio".to_vec(), AudioMime::Mpeg);

        let result = decode_artifact(&artifact);
        assert!(matches!(result, Err(AudioError::DecodeFailed(_))));
    }

    #[test]
    fn test_undecodable_mp3_frames_fail() {
        let artifact = FileArtifact::new(undecodable_mp3(40), AudioMime::Mpeg);

        let result = decode_artifact(&artifact);
        assert!(matches!(result, Err(AudioError::DecodeFailed(_))));
    }

    #[test]
    fn test_truncated_wav_header_fails() {
        let artifact = FileArtifact::wav(b"RIFF\x24\x00\x00\x00WAVE".to_vec());

        assert!(decode_artifact(&artifact).is_err());
    }

    #[test]
    fn test_probe_info_reads_header() {
        let source = AudioBuffer::new(22050, vec![vec![0.0; 44100]; 2]).unwrap();
        let artifact = FileArtifact::wav(encode_wav(&source).unwrap());

        let info = probe_info(&artifact).unwrap();

        assert_eq!(info.duration_seconds, 2.0);
        assert_eq!(info.sample_rate, 22050);
        assert_eq!(info.channels, 2);
        assert_eq!(info.bit_depth, Some(16));
        assert_eq!(info.format, "PCM");
    }

    #[test]
    fn test_decode_audio_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let source = AudioBuffer::new(8000, vec![vec![0.5; 800]]).unwrap();
        std::fs::write(&path, encode_wav(&source).unwrap()).unwrap();

        let decoded = decode_audio_file(&path).unwrap();
        assert_eq!(decoded.duration_seconds(), 0.1);

        let missing = decode_audio_file(dir.path().join("missing.wav"));
        assert!(matches!(missing, Err(AudioError::FileOpen { .. })));
    }
}
