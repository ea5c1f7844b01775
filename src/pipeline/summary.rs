//! Per-run counters.

use crate::download::DownloadOutcome;

/// Statistics from one pipeline run.
///
/// Every resolved document ends up in exactly one of `downloaded`, `skipped`
/// or `failed`; tokens or links that never became a URL count as `unresolved`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Targets processed (models or pages).
    pub targets: usize,
    /// Documents whose URL was resolved.
    pub documents: usize,
    /// Documents saved this run.
    pub downloaded: usize,
    /// Documents already present on disk.
    pub skipped: usize,
    /// Documents whose download failed.
    pub failed: usize,
    /// Tokens or links that could not be turned into a URL.
    pub unresolved: usize,
    /// Bytes written this run.
    pub bytes: u64,
}

impl RunSummary {
    /// Creates a summary with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one download attempt.
    pub fn record(&mut self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded(bytes) => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            DownloadOutcome::Skipped => self.skipped += 1,
            DownloadOutcome::Failed => self.failed += 1,
        }
    }

    /// Counts one token or link that produced no URL.
    pub fn record_unresolved(&mut self) {
        self.unresolved += 1;
    }

    /// Returns true if any item failed to resolve or download.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.unresolved > 0
    }
}
