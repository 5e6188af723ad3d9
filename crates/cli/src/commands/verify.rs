use anyhow::{bail, Result};
use scenebook_core::Workbench;

pub fn run(bench: &Workbench) -> Result<()> {
    let report = bench.verify()?;

    println!(
        "{} checked, {} skipped (random names)",
        report.checked, report.skipped
    );
    for name in &report.mismatched {
        println!("  MODIFIED    {name}");
    }
    for (name, error) in &report.unreadable {
        println!("  UNREADABLE  {name}: {error}");
    }

    if !report.is_clean() {
        bail!(
            "{} scene(s) failed verification",
            report.mismatched.len() + report.unreadable.len()
        );
    }
    println!("All scenes intact.");
    Ok(())
}
