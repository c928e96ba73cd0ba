pub mod audio;
pub mod config;
pub mod error;
pub mod history;
pub mod selection;
pub mod session;

// Re-export for convenience
pub use audio::*;
pub use config::EditorConfig;
pub use error::{AudioError, Result};
pub use history::{History, HistoryState, Step};
pub use selection::Selection;
pub use session::{EditOutcome, EditorSession};

/// Install the fmt subscriber used by the binaries
///
/// `RUST_LOG` wins when set; otherwise this crate logs at `default_level`.
pub fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "audio_cutter_lib={0},audio_cutter={0},audio_trim={0}",
                    default_level
                ))
            }),
        )
        .with_writer(std::io::stderr)
        .init();
}
