use anyhow::{bail, Result};
use scenebook_core::Workbench;

pub fn show(bench: &Workbench) -> Result<()> {
    let steps = bench.steps()?;
    if steps.is_empty() {
        println!("No steps registered yet. Use `scenebook steps add <scene>` to register one.");
        return Ok(());
    }

    for (i, step) in steps.iter().enumerate() {
        println!("Step {}", i + 1);
        println!("{}", "-".repeat(60));
        println!("  image: {}", step.image);
        println!("  {}", step.text);
        println!();
    }
    Ok(())
}

pub fn add(bench: &Workbench, image: &str, text: Option<String>) -> Result<()> {
    if bench.scene_path(image).is_err() {
        eprintln!("warning: {image} is not in the scene catalog");
    }
    let text = text.unwrap_or_else(|| bench.default_description(image));
    let steps = bench.register_step(image, &text)?;
    println!("Registered step {}: {image}", steps.len());
    Ok(())
}

pub fn reset(bench: &Workbench, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("resetting removes every step; re-run with --yes to confirm");
    }
    bench.reset_manual()?;
    println!("Manual reset.");
    Ok(())
}
