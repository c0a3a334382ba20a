//! One `cargo` invocation with a label, timing and a pass/fail line.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

pub struct Step<'a> {
    pub label: &'a str,
    pub args: Vec<&'a str>,
    /// A failing non-fatal step is reported but does not fail the run.
    pub fatal: bool,
    pub hint: Option<&'a str>,
}

pub fn run_step(step: &Step<'_>) -> Result<()> {
    println!("{}", format!("  ▸ {}...", step.label).cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(&step.args)
        .output()
        .with_context(|| format!("Failed to run cargo for {}", step.label))?;

    if output.status.success() {
        println!(
            "{}",
            format!(
                "  ✓ {} passed in {:.2}s",
                step.label,
                start.elapsed().as_secs_f64()
            )
            .green()
        );
        println!();
        return Ok(());
    }

    if step.fatal {
        eprintln!("{}", format!("  ✗ {} failed", step.label).red().bold());
    } else {
        eprintln!("{}", format!("  ⚠ {} reported issues", step.label).yellow().bold());
    }
    eprintln!();
    eprintln!("{}", String::from_utf8_lossy(&output.stderr));
    if let Some(hint) = step.hint {
        eprintln!("     {hint}");
    }
    println!();

    if step.fatal {
        anyhow::bail!("{} failed", step.label);
    }
    Ok(())
}
