use std::fmt::Write;
use std::path::Path;

use crate::manual::Step;

/// Render the manual as Markdown, one `## Step N` section per step.
/// Image links are `image_dir` joined with the step's file name.
pub fn render_markdown(title: &str, steps: &[Step], image_dir: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {title}");
    let _ = writeln!(out);

    if steps.is_empty() {
        let _ = writeln!(out, "_No steps registered yet._");
        return out;
    }

    for (i, step) in steps.iter().enumerate() {
        let link = image_dir.join(&step.image);
        let _ = writeln!(out, "## Step {}", i + 1);
        let _ = writeln!(out);
        let _ = writeln!(out, "![{}]({})", step.image, link.display());
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", step.text);
        let _ = writeln!(out);
    }
    out
}
