//! Progress reporting for `hvctl apply`.

use indicatif::{ProgressBar, ProgressStyle};
use reconcile::{ApplyResult, ProgressCallback, ResourceIdentity};

use crate::ui;

/// Progress bar that prints one line per finished action.
pub struct ApplyProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl ApplyProgress {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }
}

impl ProgressCallback for ApplyProgress {
    fn on_start(&mut self, count: usize) {
        if self.quiet {
            return;
        }
        let bar = ProgressBar::new(count as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.set_message("applying");
        self.bar = Some(bar);
    }

    fn on_action_complete(&mut self, identity: &ResourceIdentity, verb: &str, result: &ApplyResult) {
        let line = format!("  {verb} {identity}: {}", ui::result_label(result));
        match &self.bar {
            Some(bar) => {
                bar.suspend(|| println!("{line}"));
                bar.inc(1);
            }
            None if !self.quiet || !result.is_success() => println!("{line}"),
            None => {}
        }
    }

    fn on_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
