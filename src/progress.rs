use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Instant;

/// Terminal bar fed by the session's percentage events.
pub struct ProgressReporter {
    bar: ProgressBar,
    start_time: Instant,
}

impl ProgressReporter {
    pub fn new(visible: bool) -> Self {
        let bar = ProgressBar::new(100);
        if visible {
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-");
            bar.set_style(style);
            bar.set_draw_target(ProgressDrawTarget::stderr());
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }

        Self {
            bar,
            start_time: Instant::now(),
        }
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.bar.set_message(msg.into());
    }

    pub fn update(&self, percent: u8) {
        self.bar.set_position(u64::from(percent.min(100)));
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self, records: usize) {
        self.bar.finish_and_clear();
        log::info!(
            "Completed in {:.2}s: {} records",
            self.start_time.elapsed().as_secs_f64(),
            records
        );
    }

    pub fn abandon(&self, msg: impl Into<String>) {
        self.bar.abandon_with_message(msg.into());
    }
}
