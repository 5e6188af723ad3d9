use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use scenebook_core::{ImportProgress, Workbench};

pub fn list(bench: &Workbench) -> Result<()> {
    let scenes = bench.scenes()?;
    if scenes.is_empty() {
        println!("No scenes stored. Use `scenebook scenes add <files>` to add some.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("#"), Cell::new("Scene"), Cell::new("Size")]);

    for (i, name) in scenes.iter().enumerate() {
        let size = bench
            .scene_path(name)
            .ok()
            .and_then(|p| p.metadata().ok())
            .map(|m| format!("{:.1} KB", m.len() as f64 / 1024.0))
            .unwrap_or_else(|| "?".to_string());
        table.add_row(vec![Cell::new(i + 1), Cell::new(name), Cell::new(size)]);
    }

    println!("{table}");
    Ok(())
}

pub fn add(bench: &Workbench, files: &[PathBuf]) -> Result<()> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    bench.import(
        files,
        Some(&mut |progress| match progress {
            ImportProgress::Start { total } => {
                pb.set_length(total as u64);
                pb.set_position(0);
                pb.set_message("Storing scenes...");
            }
            ImportProgress::Stored { name, .. } => {
                pb.inc(1);
                pb.set_message(format!("stored {name}"));
            }
            ImportProgress::Duplicate { path, name } => {
                pb.inc(1);
                pb.println(format!("  {} is already stored as {name}", path.display()));
            }
            ImportProgress::Rejected { reason, .. } => {
                pb.inc(1);
                pb.println(format!("  skipped: {reason}"));
            }
            ImportProgress::Complete {
                stored,
                duplicates,
                rejected,
            } => {
                let mut msg = format!("{stored} stored, {duplicates} already present");
                if rejected > 0 {
                    msg.push_str(&format!(", {rejected} skipped"));
                }
                pb.finish_with_message(msg);
            }
        }),
    )?;

    Ok(())
}
