use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// One cargo test invocation in the host matrix.
struct Suite {
    name: &'static str,
    args: &'static [&'static str],
}

/// Unit tests: every `#[cfg(test)]` module in the workspace, including the
/// firmware crate's host-testable bring-up data.
const UNIT: Suite = Suite {
    name: "unit",
    args: &["test", "--lib", "--workspace"],
};

/// Integration tests live only in the host-testable crates; the firmware
/// crate has no `tests/` directory (its hardware modules cannot run here).
const INTEGRATION: Suite = Suite {
    name: "integration",
    args: &[
        "test",
        "--tests",
        "-p",
        "platform",
        "-p",
        "backhaul",
        "--features",
        "platform/std,backhaul/std",
    ],
};

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    println!();
    println!("{}", "🧪 Running host tests...".cyan().bold());
    println!();

    let total_start = Instant::now();

    if !integration_only {
        run_suite(&UNIT)?;
    }
    if !unit_only {
        run_suite(&INTEGRATION)?;
    }

    println!(
        "{}",
        format!(
            "✓ All tests completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}

fn run_suite(suite: &Suite) -> Result<()> {
    println!("{}", format!("  Running {} tests...", suite.name).cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(suite.args)
        .output()
        .with_context(|| format!("Failed to run {} tests", suite.name))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        eprintln!("{}", format!("  ✗ {} tests failed", suite.name).red().bold());
        eprintln!();
        for line in stdout.lines() {
            eprintln!("  {line}");
        }
        anyhow::bail!("{} tests failed", suite.name);
    }

    println!(
        "{}",
        format!(
            "  ✓ {} tests passed ({}) in {:.2}s",
            suite.name,
            summarize(&stdout),
            start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();
    Ok(())
}

/// Sum the pass counts across every `test result:` line cargo printed (one
/// per test binary in the suite).
fn summarize(output: &str) -> String {
    fn tail_number(field: &str) -> u32 {
        field.rsplit(' ').next().unwrap_or("0").parse().unwrap_or(0)
    }

    let mut passed = 0u32;
    let mut failed = 0u32;
    for line in output.lines() {
        let Some(result) = line.split("test result:").nth(1) else {
            continue;
        };
        for field in result.split(';') {
            let field = field.trim();
            if let Some(head) = field.strip_suffix(" passed") {
                passed = passed.saturating_add(tail_number(head));
            } else if let Some(head) = field.strip_suffix(" failed") {
                failed = failed.saturating_add(tail_number(head));
            }
        }
    }
    if failed > 0 {
        format!("{passed} passed, {failed} failed")
    } else {
        format!("{passed} passed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_sums_across_test_binaries() {
        let output = "\
running 8 tests
test result: ok. 8 passed; 0 failed; 0 ignored; 0 measured; 0 filtered out
running 5 tests
test result: ok. 5 passed; 0 failed; 0 ignored; 0 measured; 0 filtered out
";
        assert_eq!(summarize(output), "13 passed");
    }

    #[test]
    fn summarize_reports_failures() {
        let output = "test result: FAILED. 3 passed; 2 failed; 0 ignored\n";
        assert_eq!(summarize(output), "3 passed, 2 failed");
    }

    #[test]
    fn summarize_tolerates_missing_result_lines() {
        assert_eq!(summarize("no cargo output at all"), "0 passed");
    }
}
