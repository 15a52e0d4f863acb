use std::path::PathBuf;

/// Drop target feedback and first-file selection.
///
/// The window reports one drop event per file. Only the first file of a
/// drop is taken; the zone stops accepting until the pending read finishes
/// or the user starts a new drag.
#[derive(Debug, Clone)]
pub struct DropZone {
    highlighted: bool,
    accepting: bool,
}

impl Default for DropZone {
    fn default() -> Self {
        Self {
            highlighted: false,
            accepting: true,
        }
    }
}

impl DropZone {
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Drag entered or moved over the window
    pub fn hover(&mut self) {
        self.highlighted = true;
        self.accepting = true;
    }

    /// Drag left the window without dropping
    pub fn leave(&mut self) {
        self.highlighted = false;
        self.accepting = true;
    }

    /// A file was dropped. Returns it if it is the first of this drop.
    pub fn drop_file(&mut self, path: PathBuf) -> Option<PathBuf> {
        self.highlighted = false;
        if self.accepting {
            self.accepting = false;
            Some(path)
        } else {
            None
        }
    }

    /// The read started by the last drop has finished
    pub fn settle(&mut self) {
        self.accepting = true;
    }
}
