use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner that walks through the pipeline stages. Silent mode draws nothing.
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    stages: usize,
}

impl ProgressReporter {
    pub fn new_spinner(message: &str, silent: bool) -> Self {
        Self::with_stages(message, 0, silent)
    }

    pub fn with_stages(message: &str, stages: usize, silent: bool) -> Self {
        if silent {
            return Self {
                progress_bar: None,
                stages,
            };
        }

        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {prefix}{msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
            stages,
        }
    }

    /// Mark the start of stage `index` (1-based).
    pub fn stage(&self, index: usize, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            if self.stages > 0 {
                pb.set_prefix(format!("[{}/{}] ", index, self.stages));
            }
            pb.set_message(message.to_string());
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_prefix("");
            pb.finish_with_message(message.to_string());
        }
    }

    pub fn println(&self, message: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.println(message),
            None => println!("{}", message),
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_reporter_is_inert() {
        let progress = ProgressReporter::with_stages("Working...", 3, true);
        assert!(progress.progress_bar.is_none());
        progress.stage(1, "Reading");
        progress.finish_with_message("done");
    }
}
