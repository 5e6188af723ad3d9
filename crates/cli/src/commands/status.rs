use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use scenebook_core::catalog::IdPolicy;
use scenebook_core::Workbench;

pub fn run(bench: &Workbench) -> Result<()> {
    let stats = bench.stats()?;
    let config = bench.config();
    let policy = match config.id_policy {
        IdPolicy::ContentHash => "content hash (deduplicated)",
        IdPolicy::RandomToken => "random token (no deduplication)",
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("Scenes"),
        Cell::new(config.scene_dir().display()),
    ]);
    table.add_row(vec![Cell::new("Manual"), Cell::new(bench.manual_path().display())]);
    table.add_row(vec![Cell::new("Naming"), Cell::new(policy)]);
    table.add_row(vec![Cell::new("Stored scenes"), Cell::new(stats.total_scenes)]);
    table.add_row(vec![Cell::new("Registered steps"), Cell::new(stats.total_steps)]);

    println!("{table}");
    Ok(())
}
