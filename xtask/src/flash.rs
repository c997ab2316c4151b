use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

const TARGET: &str = "thumbv7em-none-eabihf";
const CHIP: &str = "STM32H743ZITx";

/// Build the hardware firmware image and flash it over the on-board ST-LINK.
pub fn run(release: bool) -> Result<()> {
    let profile = if release { "release" } else { "debug" };

    println!();
    println!(
        "{}",
        format!("🔨 Building MeshGate firmware ({profile}, {TARGET})...")
            .cyan()
            .bold()
    );

    let build_start = Instant::now();
    let mut build = Command::new("cargo");
    // The firmware binary only exists with the hardware feature; a plain
    // build would silently produce nothing to flash.
    build.args([
        "build",
        "-p",
        "firmware",
        "--target",
        TARGET,
        "--features",
        "hardware",
    ]);
    if release {
        build.arg("--release");
    }

    let output = build.output().context("Failed to run cargo build")?;
    if !output.status.success() {
        eprintln!("{}", "✗ Build failed".red().bold());
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("Build failed");
    }
    println!(
        "{}",
        format!("✓ Built in {:.2}s", build_start.elapsed().as_secs_f64()).green()
    );

    let image = format!("target/{TARGET}/{profile}/firmware");
    report_image_size(&image);

    println!();
    println!(
        "{}",
        format!("📡 Flashing {CHIP} (NUCLEO-H743ZI)...").cyan().bold()
    );

    let flash_start = Instant::now();
    let output = Command::new("probe-rs")
        .args(["run", &image, "--chip", CHIP, "--probe-index", "0"])
        .output()
        .context("Failed to run probe-rs. Is probe-rs installed? (cargo install probe-rs-tools)")?;

    if !output.status.success() {
        eprintln!("{}", "✗ Flash failed".red().bold());
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("Flash failed - check that the ST-LINK is connected and the board is powered");
    }

    println!(
        "{}",
        format!("✓ Flashed in {:.2}s", flash_start.elapsed().as_secs_f64()).green()
    );
    println!();
    println!("{}", "📶 MeshGate border router is running.".bold());
    println!(
        "   {}",
        format!("Bring-up logs: probe-rs attach {image} --chip {CHIP}").dimmed()
    );
    println!(
        "   {}",
        "LD1 blinks at 500 ms once the backhaul is up; LD1+LD3 solid means a halted fault.".dimmed()
    );
    println!();

    Ok(())
}

fn report_image_size(image: &str) {
    // Best effort: image size matters on this part (2 MiB flash) but a
    // missing size tool should not block flashing.
    let Ok(out) = Command::new("rust-size").args([image, "-A"]).output() else {
        return;
    };
    if !out.status.success() {
        return;
    }
    println!("{}", "📊 Image size:".cyan());
    for line in String::from_utf8_lossy(&out.stdout).lines() {
        println!("   {}", line.dimmed());
    }
}
