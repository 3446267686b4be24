//! One-shot background imports polled from the frame loop.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

use tracing::{debug, warn};

use super::document::GameDocument;
use super::storage::{import_from_file, StorageError};

pub type ImportResult = Result<GameDocument, StorageError>;

/// A file read + parse running on its own thread.
pub struct ImportJob {
    path: PathBuf,
    receiver: Receiver<ImportResult>,
}

impl ImportJob {
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (sender, receiver) = channel();
        let worker_path = path.clone();
        thread::spawn(move || {
            let result = import_from_file(&worker_path);
            let _ = sender.send(result);
        });
        debug!(path = %path.display(), "import_started");
        Self { path, receiver }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` while the worker is still running.
    pub fn poll(&self) -> Option<ImportResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!(path = %self.path.display(), "import_worker_lost");
                Some(Err(StorageError::ImportWorkerLost))
            }
        }
    }

    /// Blocks until the worker reports.
    pub fn wait(self) -> ImportResult {
        self.receiver
            .recv()
            .unwrap_or(Err(StorageError::ImportWorkerLost))
    }
}

/// Holds at most one pending import; a second request while one is in flight
/// is refused.
#[derive(Default)]
pub struct ImportSlot {
    pending: Option<ImportJob>,
}

impl ImportSlot {
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn begin(&mut self, path: impl Into<PathBuf>) -> Result<(), StorageError> {
        if self.pending.is_some() {
            return Err(StorageError::ImportBusy);
        }
        self.pending = Some(ImportJob::spawn(path));
        Ok(())
    }

    /// Returns the finished result once and frees the slot.
    pub fn poll(&mut self) -> Option<ImportResult> {
        let result = self.pending.as_ref()?.poll()?;
        self.pending = None;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{Duration, Instant};

    use tempfile::TempDir;

    use super::*;

    fn poll_until_done(slot: &mut ImportSlot) -> ImportResult {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = slot.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "import did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn job_reads_and_parses_in_background() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("level.json");
        fs::write(&path, r#"{"metadata":{"title":"Bg"},"layers":[]}"#).expect("write");

        let document = ImportJob::spawn(&path).wait().expect("import");
        assert_eq!(document.metadata.title, "Bg");
    }

    #[test]
    fn slot_refuses_a_second_import_until_the_first_completes() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("level.json");
        fs::write(&path, r#"{"layers":[]}"#).expect("write");

        let mut slot = ImportSlot::default();
        slot.begin(&path).expect("first import");
        assert!(matches!(slot.begin(&path), Err(StorageError::ImportBusy)));

        poll_until_done(&mut slot).expect("document");
        assert!(!slot.is_busy());
        assert!(slot.poll().is_none());
        slot.begin(&path).expect("slot free again");
    }

    #[test]
    fn failures_are_delivered_through_the_slot() {
        let temp = TempDir::new().expect("temp");
        let mut slot = ImportSlot::default();
        slot.begin(temp.path().join("missing.json")).expect("begin");
        assert!(matches!(
            poll_until_done(&mut slot),
            Err(StorageError::Read { .. })
        ));
    }
}
