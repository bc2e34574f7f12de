/// Observer for long-running batch steps. `completed` never decreases between calls.
pub trait ProgressReporter: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn on_progress(&self, _completed: usize, _total: usize) {}
}

/// Logs progress at roughly every `step_percent` percent, plus the final item.
pub struct LoggingProgress {
    label: &'static str,
    step_percent: usize,
}

impl LoggingProgress {
    pub fn new(label: &'static str) -> Self {
        Self { label, step_percent: 5 }
    }

    pub fn with_step_percent(mut self, value: usize) -> Self {
        self.step_percent = value.clamp(1, 100);
        self
    }

    fn should_report(&self, completed: usize, total: usize) -> bool {
        if completed == total {
            return true;
        }
        let step = (total * self.step_percent / 100).max(1);
        completed % step == 0
    }
}

impl ProgressReporter for LoggingProgress {
    fn on_progress(&self, completed: usize, total: usize) {
        if self.should_report(completed, total) {
            tracing::info!(completed, total, "{}: {completed}/{total}", self.label);
        }
    }
}
