use chirp_core::collaborator::CollaboratorResult;
use chirp_core::orchestrator::RunObserver;
use chirp_core::post::Post;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.cyan} replying [{bar:30.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar over the reply batch
pub struct ReplyProgress {
    bar: ProgressBar,
}

impl ReplyProgress {
    /// A visible bar, or a hidden one when output must stay machine-readable
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(template) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(template.progress_chars("=> "));
        }
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl RunObserver for ReplyProgress {
    fn batch_started(&self, targets: usize) {
        self.bar.set_length(targets as u64);
        self.bar.set_position(0);
    }

    fn reply_finished(&self, post: &Post, result: &CollaboratorResult<()>) {
        match result {
            Ok(()) => self.bar.set_message(format!("{}", style(&post.id).green())),
            Err(e) => self.bar.println(format!(
                "  {} {}: {}",
                style("✗").red(),
                post.id,
                style(e).dim()
            )),
        }
        self.bar.inc(1);
    }
}
