//! Progress bar utilities for the sink writer

use kdam::{Animation, Bar, BarExt};

use crate::utils::config::ProgressConsts;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    /// Create a new progress bar configuration
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

/// Create a progress bar with the given configuration
pub fn create_progress_bar(config: ProgressBarConfig) -> Bar {
    kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " docs"
    )
}

/// Progress bar owned by the sink writer thread. Redraws every
/// [`ProgressConsts::PROGRESS_UPDATE_BATCH_SIZE`] records.
pub struct WriteProgress {
    bar: Bar,
    pending: usize,
}

impl WriteProgress {
    /// Bar sized from the pre-flight count. The count is advisory; the bar may end short or long.
    pub fn new(expected: u64) -> Self {
        let total = usize::try_from(expected).unwrap_or(usize::MAX);
        Self {
            bar: create_progress_bar(ProgressBarConfig::new(
                total,
                "Dumping",
                Animation::Classic,
            )),
            pending: 0,
        }
    }

    /// Count one written record.
    pub fn record_written(&mut self) {
        self.pending += 1;
        if self.pending >= ProgressConsts::PROGRESS_UPDATE_BATCH_SIZE {
            self.flush();
        }
    }

    /// Push the remainder to the bar.
    pub fn flush(&mut self) {
        if self.pending > 0 {
            let _ = self.bar.update(self.pending);
            self.pending = 0;
        }
    }

    /// Final redraw and newline.
    pub fn finish(mut self) {
        self.flush();
        let _ = self.bar.refresh();
        eprintln!();
    }
}
