use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{run_step, Step};

/// Library crates that must build without `std` for the MCU target.
const NO_STD_CRATES: &[&str] = &["platform", "bluetooth", "library", "playback", "buzzer"];

/// MCU target triple used for the no_std check.
const MCU_TARGET: &str = "thumbv7em-none-eabihf";

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking Home Buzzer builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    let mut no_std_args = vec!["check", "--target", MCU_TARGET, "--no-default-features"];
    for name in NO_STD_CRATES {
        no_std_args.extend(["-p", *name]);
    }

    let steps = [
        Step {
            label: "host workspace",
            args: vec!["check", "--workspace", "--all-targets"],
            fatal: true,
            hint: None,
        },
        Step {
            label: "no_std crates (MCU target)",
            args: no_std_args,
            fatal: true,
            hint: Some("rustup target add thumbv7em-none-eabihf"),
        },
        Step {
            label: "SD card storage (MCU target)",
            args: vec![
                "check", "--target", MCU_TARGET, "--no-default-features", "--features", "sdmmc",
                "-p", "platform",
            ],
            fatal: true,
            hint: Some("rustup target add thumbv7em-none-eabihf"),
        },
        Step {
            label: "clippy lints",
            args: vec!["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            fatal: false,
            hint: None,
        },
        Step {
            label: "formatting",
            args: vec!["fmt", "--all", "--check"],
            fatal: false,
            hint: Some("run 'cargo fmt --all' to fix"),
        },
    ];

    for step in &steps {
        run_step(step)?;
    }

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
