//! One open file being edited
//!
//! Ties the pieces together: decode the active file, apply a region edit,
//! encode the result and commit it to history. The session owns its history
//! and selection, and `apply` takes `&mut self`, so one session never has two
//! edits in flight.

use std::path::{Path, PathBuf};

use crate::audio::{
    decode_artifact, encode_wav, probe_info, EditOp, FileArtifact, Region,
};
use crate::config::EditorConfig;
use crate::error::{AudioError, Result};
use crate::history::{History, HistoryState, Step};
use crate::selection::Selection;

/// What a committed edit produced
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    pub op: EditOp,
    pub region: Region,
    pub frames: usize,
    pub duration_seconds: f64,
}

pub struct EditorSession {
    history: History,
    selection: Selection,
    config: EditorConfig,
}

impl EditorSession {
    /// Open an uploaded file
    ///
    /// The extension filter runs here and the header is probed for the
    /// duration; a file with unreadable content is rejected now rather than
    /// on the first edit.
    pub fn open<P: AsRef<Path>>(path: P, config: EditorConfig) -> Result<Self> {
        config.validate()?;
        let artifact = FileArtifact::load(path, &config.accepted_extensions)?;
        Self::from_artifact(artifact, config)
    }

    pub fn from_artifact(artifact: FileArtifact, config: EditorConfig) -> Result<Self> {
        let info = probe_info(&artifact)?;
        tracing::info!(
            name = artifact.name().unwrap_or("<memory>"),
            duration = info.duration_seconds,
            sample_rate = info.sample_rate,
            channels = info.channels,
            "Opened audio"
        );

        let selection = Selection::new(
            info.duration_seconds,
            config.initial_region,
            config.nudge_step,
        );

        Ok(Self {
            history: History::new(artifact),
            selection,
            config,
        })
    }

    pub fn active(&self) -> &FileArtifact {
        self.history.active()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_state(&self) -> HistoryState {
        self.history.state()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Apply a region edit to the active file and commit the result
    ///
    /// Decoding, editing and encoding run on tokio's blocking pool. If any
    /// step fails the error is returned and the history is left as it was.
    pub async fn apply(&mut self, op: EditOp) -> Result<EditOutcome> {
        let source = self.history.active().clone();
        let region = self.selection.region();
        let name = self.config.download_name.clone();

        let (artifact, outcome) = tokio::task::spawn_blocking(move || {
            let audio = decode_artifact(&source)?;
            let edited = op.apply(&audio, region);
            let bytes = encode_wav(&edited)?;

            let outcome = EditOutcome {
                op,
                region,
                frames: edited.frame_count(),
                duration_seconds: edited.duration_seconds(),
            };
            Ok::<_, AudioError>((FileArtifact::wav(bytes).with_name(name), outcome))
        })
        .await
        .map_err(|e| AudioError::TaskJoin(e.to_string()))??;

        self.history = self.history.commit(artifact);
        self.selection.set_duration(outcome.duration_seconds);

        tracing::info!(
            op = %outcome.op,
            region = %outcome.region,
            duration = outcome.duration_seconds,
            undo_depth = self.history.undo_depth(),
            "Committed edit"
        );

        Ok(outcome)
    }

    /// Returns `true` if there was something to undo
    pub fn undo(&mut self) -> Result<bool> {
        let step = self.history.undo();
        self.step(step, "undo")
    }

    /// Returns `true` if there was something to redo
    pub fn redo(&mut self) -> Result<bool> {
        let step = self.history.redo();
        self.step(step, "redo")
    }

    fn step(&mut self, step: Step, label: &str) -> Result<bool> {
        let Step::Moved(next) = step else {
            tracing::debug!("Nothing to {}", label);
            return Ok(false);
        };

        let info = probe_info(next.active())?;
        self.history = next;
        self.selection.set_duration(info.duration_seconds);

        tracing::info!(
            duration = info.duration_seconds,
            undo_depth = self.history.undo_depth(),
            redo_depth = self.history.redo_depth(),
            "Applied {}",
            label
        );
        Ok(true)
    }

    /// Write the active file to disk
    ///
    /// A directory target gets the configured download name. The bytes are
    /// written as they are: before any edit that is the original upload.
    pub fn save<P: AsRef<Path>>(&self, target: P) -> Result<PathBuf> {
        let target = target.as_ref();
        let path = if target.is_dir() {
            target.join(&self.config.download_name)
        } else {
            target.to_path_buf()
        };

        std::fs::write(&path, self.history.active().bytes())?;
        tracing::info!(path = %path.display(), bytes = self.history.active().len(), "Saved");
        Ok(path)
    }
}
