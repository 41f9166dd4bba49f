use crate::pipeline::report::UnitOutcome;

/// Cross-cutting observer for pipeline orchestration events.
///
/// Decouples the use cases from specific output mechanisms so hosts can
/// surface progress however they like without changing orchestration code.
pub trait PipelineLogger: Send {
    /// Report frame-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Record the outcome of one frame unit.
    fn unit(&mut self, index: usize, outcome: UnitOutcome);

    /// Surface an expected-but-unfortunate condition (e.g. a faceless
    /// source image).
    fn warn(&mut self, message: &str);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events. Used by tests and embedders
/// with their own progress reporting.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn unit(&mut self, _index: usize, _outcome: UnitOutcome) {}
    fn warn(&mut self, _message: &str) {}
    fn info(&mut self, _message: &str) {}
}

/// `log`-crate backed logger for CLI runs.
///
/// Progress output is throttled to every `throttle_frames` frames to avoid
/// excessive I/O on long videos; per-unit outcomes are tallied for the
/// summary and logged individually at debug level.
pub struct LogPipelineLogger {
    throttle_frames: usize,
    committed: usize,
    skipped: usize,
    failed: usize,
}

impl LogPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            committed: 0,
            skipped: 0,
            failed: 0,
        }
    }

    /// Returns the formatted summary string, or `None` if no units were seen.
    pub fn summary_string(&self) -> Option<String> {
        let total = self.committed + self.skipped + self.failed;
        if total == 0 {
            return None;
        }
        Some(format!(
            "Processed {total} frames: {} swapped, {} skipped, {} errored",
            self.committed, self.skipped, self.failed
        ))
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        if total > 0 && (current % self.throttle_frames == 0 || current == total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processing: {current}/{total} frames ({pct:.1}%)");
        }
    }

    fn unit(&mut self, index: usize, outcome: UnitOutcome) {
        match outcome {
            UnitOutcome::Committed => {
                self.committed += 1;
                log::debug!("frame {index}: swapped");
            }
            UnitOutcome::Skipped => {
                self.skipped += 1;
                log::debug!("frame {index}: no qualifying face, skipped");
            }
            UnitOutcome::Failed => {
                self.failed += 1;
                log::debug!("frame {index}: errored, continuing");
            }
        }
    }

    fn warn(&mut self, message: &str) {
        log::warn!("{message}");
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 10);
        logger.unit(0, UnitOutcome::Committed);
        logger.warn("warning");
        logger.info("hello");
        logger.summary();
        // No panics = success
    }

    #[test]
    fn test_unit_outcomes_are_tallied() {
        let mut logger = LogPipelineLogger::new(10);
        logger.unit(0, UnitOutcome::Committed);
        logger.unit(1, UnitOutcome::Skipped);
        logger.unit(2, UnitOutcome::Skipped);
        logger.unit(3, UnitOutcome::Failed);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("4 frames"));
        assert!(summary.contains("1 swapped"));
        assert!(summary.contains("2 skipped"));
        assert!(summary.contains("1 errored"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = LogPipelineLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_throttle_never_zero() {
        let logger = LogPipelineLogger::new(0);
        assert_eq!(logger.throttle_frames, 1);
    }

    #[test]
    fn test_default_throttle() {
        let logger = LogPipelineLogger::default();
        assert_eq!(logger.throttle_frames, 10);
    }
}
