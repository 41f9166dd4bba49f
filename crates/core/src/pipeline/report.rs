use std::path::PathBuf;

/// What happened to one frame unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Swapped, enhanced, and written back.
    Committed,
    /// No qualifying face; the unit was left untouched.
    Skipped,
    /// An error occurred while processing the unit.
    Failed,
}

/// Terminal state of a pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// The source image contained no detectable face.
    NoSourceFace,
    /// A reference image was supplied but contained no detectable face.
    NoReferenceFace,
    /// Image case only: no face in the target qualified for the swap.
    NoMatchingFace,
    /// A swapped frame failed the black-region check while verification
    /// was still required; the run stopped at `unit`.
    VerificationFailed { unit: usize },
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

/// Aggregate result of a video run.
///
/// Skipped and failed units do not make the run unsuccessful; only the
/// statuses other than `Completed` do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoRunReport {
    pub status: RunStatus,
    pub committed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl VideoRunReport {
    pub fn aborted(status: RunStatus) -> Self {
        Self {
            status,
            committed: 0,
            skipped: 0,
            failed: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn units_processed(&self) -> usize {
        self.committed + self.skipped + self.failed
    }
}

/// Result of a single-image run. `output_path` is set only when an output
/// file was actually written.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRunReport {
    pub status: RunStatus,
    pub output_path: Option<PathBuf>,
}

impl ImageRunReport {
    pub fn aborted(status: RunStatus) -> Self {
        Self {
            status,
            output_path: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_completed_counts_as_success() {
        assert!(RunStatus::Completed.is_success());
        assert!(!RunStatus::NoSourceFace.is_success());
        assert!(!RunStatus::NoReferenceFace.is_success());
        assert!(!RunStatus::NoMatchingFace.is_success());
        assert!(!RunStatus::VerificationFailed { unit: 3 }.is_success());
    }

    #[test]
    fn test_skipped_and_failed_units_do_not_flip_success() {
        let report = VideoRunReport {
            status: RunStatus::Completed,
            committed: 1,
            skipped: 7,
            failed: 2,
        };
        assert!(report.is_success());
        assert_eq!(report.units_processed(), 10);
    }

    #[test]
    fn test_aborted_report_has_zero_units() {
        let report = VideoRunReport::aborted(RunStatus::NoReferenceFace);
        assert!(!report.is_success());
        assert_eq!(report.units_processed(), 0);
    }

    #[test]
    fn test_image_aborted_report_has_no_output() {
        let report = ImageRunReport::aborted(RunStatus::NoMatchingFace);
        assert!(!report.is_success());
        assert!(report.output_path.is_none());
    }
}
