use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use scenebook_core::Workbench;

pub fn run(bench: &Workbench, path: &Path, title: &str) -> Result<()> {
    let markdown = bench.render_manual(title)?;
    fs::write(path, markdown).with_context(|| format!("writing {}", path.display()))?;
    println!("Manual written to {}", path.display());
    Ok(())
}
