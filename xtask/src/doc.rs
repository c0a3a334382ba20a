use anyhow::Result;
use colored::Colorize;

use crate::step::{run_step, Step};

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Building Home Buzzer docs...".cyan().bold());
    println!();

    // `platform/std` documents the desktop storage and the mocks as well.
    let mut args = vec![
        "doc", "--no-deps", "--workspace", "--exclude", "xtask", "--features", "platform/std",
    ];
    if open {
        args.push("--open");
    }

    run_step(&Step {
        label: "API docs",
        args,
        fatal: true,
        hint: None,
    })?;

    if !open {
        println!("   {}", "target/doc/buzzer/index.html is the entry point".dimmed());
        println!("   {}", "or run 'cargo xtask doc --open'".dimmed());
        println!();
    }
    Ok(())
}
