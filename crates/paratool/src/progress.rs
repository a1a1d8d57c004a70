//! Progress reporting and cooperative cancellation.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Extract,
    PatchLootTables,
    GenerateOverrides,
    PatchMetadata,
    Repack,
    Done,
}

impl Stage {
    /// Stages in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Extract,
        Stage::PatchLootTables,
        Stage::GenerateOverrides,
        Stage::PatchMetadata,
        Stage::Repack,
        Stage::Done,
    ];

    /// Overall completion when the stage starts.
    pub fn percent(self) -> u8 {
        match self {
            Stage::Extract => 10,
            Stage::PatchLootTables => 30,
            Stage::GenerateOverrides => 50,
            Stage::PatchMetadata => 65,
            Stage::Repack => 80,
            Stage::Done => 100,
        }
    }

    /// Human-readable stage label.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Extract => "Extracting package",
            Stage::PatchLootTables => "Patching loot tables",
            Stage::GenerateOverrides => "Generating stat overrides",
            Stage::PatchMetadata => "Patching dependencies",
            Stage::Repack => "Repacking package",
            Stage::Done => "Done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single progress report from the patch pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchProgress {
    pub stage: Stage,
    pub percent: u8,
}

impl From<Stage> for PatchProgress {
    fn from(stage: Stage) -> Self {
        Self {
            stage,
            percent: stage.percent(),
        }
    }
}

/// Receiver of pipeline progress.
///
/// Implemented for closures and for channel senders, so a UI thread can
/// drain reports from a [`crossbeam_channel::Receiver`].
pub trait ProgressSink {
    fn report(&self, progress: PatchProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(PatchProgress),
{
    fn report(&self, progress: PatchProgress) {
        self(progress)
    }
}

impl ProgressSink for Sender<PatchProgress> {
    fn report(&self, progress: PatchProgress) {
        // A dropped receiver means nobody is listening anymore
        let _ = self.send(progress);
    }
}

/// Sink that discards all reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: PatchProgress) {}
}

/// Scan progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    /// Packages finished so far
    pub scanned: usize,
    /// Packages to scan, excluding the target
    pub total: usize,
    /// Mods with at least one item found so far
    pub mods_found: usize,
}

/// Shared cancellation flag.
///
/// Clones observe the same flag. Cancellation is checked between pipeline
/// stages, never in the middle of one.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_stage_percents_increase() {
        let percents: Vec<u8> = Stage::ALL.iter().map(|s| s.percent()).collect();
        assert_eq!(percents, vec![10, 30, 50, 65, 80, 100]);
    }

    #[test]
    fn test_closure_sink() {
        let seen = RefCell::new(Vec::new());
        let sink = |p: PatchProgress| seen.borrow_mut().push(p.stage);
        sink.report(Stage::Extract.into());
        sink.report(Stage::Done.into());
        assert_eq!(*seen.borrow(), vec![Stage::Extract, Stage::Done]);
    }

    #[test]
    fn test_channel_sink() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.report(Stage::Repack.into());
        let progress = rx.try_recv().unwrap();
        assert_eq!(progress.stage, Stage::Repack);
        assert_eq!(progress.percent, 80);

        drop(rx);
        tx.report(Stage::Done.into());
    }

    #[test]
    fn test_cancellation_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
