//! Human-readable terminal renderer.

use crate::domain::{DownSummary, ResourceKind, SkipReason};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the closing lines of a teardown.
    pub fn render_summary(&self, summary: &DownSummary) {
        if summary.has_warnings() {
            self.ctx.warn(&format!(
                "Project {} torn down with {} failed removal(s).",
                summary.project,
                summary.failed.len()
            ));
        } else {
            self.ctx
                .success(&format!("Project {} torn down.", summary.project));
        }

        self.ctx.kv("Containers:", &count(summary, ResourceKind::Container));
        self.ctx.kv("Networks:", &count(summary, ResourceKind::Network));
        self.ctx.kv("Volumes:", &count(summary, ResourceKind::Volume));

        let external: Vec<&str> = summary
            .skipped
            .iter()
            .filter(|s| s.reason == SkipReason::External)
            .map(|s| s.name.as_str())
            .collect();
        if !external.is_empty() {
            self.ctx
                .info(&format!("Left external resources: {}", external.join(", ")));
        }
    }
}

fn count(summary: &DownSummary, kind: ResourceKind) -> String {
    let removed = summary.removed_names(kind).len();
    let failed = summary.failed.iter().filter(|f| f.kind == kind).count();
    if failed == 0 {
        format!("{removed} removed")
    } else {
        format!("{removed} removed, {failed} failed")
    }
}
