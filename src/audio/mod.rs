// src/audio/mod.rs

pub mod decoder;
pub mod edit;
pub mod encoder;
pub mod types;

// Re-export commonly used items
pub use decoder::{decode_artifact, decode_audio_file, probe_info};
pub use edit::{cut, remove, EditOp};
pub use encoder::{encode_wav, quantize_sample, write_wav};
pub use types::{AudioBuffer, AudioInfo, AudioMime, FileArtifact, Region};
