//! Linear undo/redo over whole-file snapshots
//!
//! A [`History`] is a value: the active artifact plus everything that can be
//! undone or redone. `commit`, `undo` and `redo` never modify it in place;
//! they return the next history, so the active file and both stacks always
//! change together.

use crate::audio::FileArtifact;

/// Whether any undo or redo is available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    /// Nothing to undo or redo
    Empty,
    /// At least one stack holds an artifact
    Active,
}

/// Result of an undo or redo
#[derive(Debug, Clone)]
pub enum Step {
    /// The active artifact changed
    Moved(History),
    /// The relevant stack was empty
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct History {
    active: FileArtifact,
    /// Oldest first; the last entry is undone next
    undo: Vec<FileArtifact>,
    /// The last entry is redone next
    redo: Vec<FileArtifact>,
}

impl History {
    /// Start from the uploaded file with nothing to undo
    pub fn new(original: FileArtifact) -> Self {
        Self {
            active: original,
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    pub fn active(&self) -> &FileArtifact {
        &self.active
    }

    pub fn state(&self) -> HistoryState {
        if self.undo.is_empty() && self.redo.is_empty() {
            HistoryState::Empty
        } else {
            HistoryState::Active
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Install the result of an edit
    ///
    /// The current file becomes undoable and every redoable file is dropped.
    pub fn commit(&self, next: FileArtifact) -> History {
        let mut undo = self.undo.clone();
        undo.push(self.active.clone());

        History {
            active: next,
            undo,
            redo: Vec::new(),
        }
    }

    /// Go back to the file before the last edit
    pub fn undo(&self) -> Step {
        let Some((previous, rest)) = self.undo.split_last() else {
            return Step::Unchanged;
        };

        let mut redo = self.redo.clone();
        redo.push(self.active.clone());

        Step::Moved(History {
            active: previous.clone(),
            undo: rest.to_vec(),
            redo,
        })
    }

    /// Reapply the most recently undone edit
    pub fn redo(&self) -> Step {
        let Some((next, rest)) = self.redo.split_last() else {
            return Step::Unchanged;
        };

        let mut undo = self.undo.clone();
        undo.push(self.active.clone());

        Step::Moved(History {
            active: next.clone(),
            undo,
            redo: rest.to_vec(),
        })
    }
}
