use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Building workspace documentation...".cyan().bold());
    println!();

    let start = Instant::now();

    // Host docs cover the protocol and decode layers plus the firmware
    // crate's host-visible modules. The hardware driver modules are
    // feature-gated; documenting them needs --target thumbv7em-none-eabihf
    // --features hardware on a machine with that toolchain target.
    let mut cmd = Command::new("cargo");
    cmd.args(["doc", "--workspace", "--no-deps", "--document-private-items"]);
    if open {
        cmd.arg("--open");
    }

    let output = cmd.output().context("Failed to build documentation")?;
    if !output.status.success() {
        eprintln!("{}", "✗ Documentation build failed".red().bold());
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("Documentation build failed");
    }

    println!(
        "{}",
        format!("✓ Documentation built in {:.2}s", start.elapsed().as_secs_f64()).green()
    );

    if !open {
        println!();
        println!(
            "   {}",
            "Start at target/doc/backhaul/index.html (init protocol) or".dimmed()
        );
        println!(
            "   {}",
            "target/doc/platform/index.html (config, MAC, fault decoding).".dimmed()
        );
    }
    println!();

    Ok(())
}
