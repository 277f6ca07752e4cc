use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::{FileReport, ScenarioResult};

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    playthroughs: &'a [ScenarioResult],
}

pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    files: &[FileReport],
    results: &[ScenarioResult],
) -> Result<()> {
    let report = JsonReport {
        files,
        playthroughs: results,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / total as f64) * 100.0;
    rate
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    files: &[FileReport],
    results: &[ScenarioResult],
) -> Result<()> {
    writeln!(writer, "# Tabletop Scenario Test Results\n")?;

    if !files.is_empty() {
        writeln!(writer, "## Scenario Files\n")?;
        for file in files {
            let status = if file.accepted { "✅" } else { "❌" };
            writeln!(writer, "- {status} `{}`", file.path.display())?;
            for error in &file.errors {
                writeln!(writer, "  - {error}")?;
            }
        }
        writeln!(writer)?;
    }

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Total playthrough sets**: {total}")?;
    writeln!(writer, "- **Passed**: {passed}")?;
    writeln!(writer, "- **Failed**: {}", total - passed)?;
    writeln!(
        writer,
        "- **Success rate**: {:.1}%\n",
        success_rate(passed, total)
    )?;

    writeln!(writer, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(writer, "### {} {} (seed {})\n", status, result.scenario_name, result.seed)?;
        writeln!(
            writer,
            "- **Iterations**: {}/{} clean, {} victories",
            result.successful_iterations, result.iterations_run, result.victories
        )?;
        writeln!(writer, "- **Average time**: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(writer, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(writer, "  - {failure}")?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    files: &[FileReport],
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    if !files.is_empty() {
        writeln!(writer, "{}", "📄 Scenario Files".bright_cyan().bold())?;
        for file in files {
            if file.accepted {
                writeln!(
                    writer,
                    "{} {} ({})",
                    "✅ VALID".green(),
                    file.path.display(),
                    file.scenario_id.as_deref().unwrap_or("?")
                )?;
            } else {
                writeln!(writer, "{} {}", "❌ INVALID".red(), file.path.display())?;
                for error in &file.errors {
                    writeln!(writer, "     • {}", error.red())?;
                }
            }
        }
        writeln!(writer)?;
    }

    if results.is_empty() {
        return Ok(());
    }

    writeln!(writer, "{}", "📊 Playthrough Results Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "==============================".cyan())?;
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(writer, "Total playthrough sets: {total}")?;
    writeln!(writer, "Passed: {}", passed.to_string().green())?;
    writeln!(writer, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(writer, "Success rate: {:.1}%", success_rate(passed, total))?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(writer, "{} {} seed {}", status, result.scenario_name.bold(), result.seed)?;
        writeln!(
            writer,
            "   Iterations: {}/{} clean, {} victories",
            result.successful_iterations, result.iterations_run, result.victories
        )?;
        writeln!(writer, "   Average time: {:?}", result.average_duration)?;
        for failure in &result.failures {
            writeln!(writer, "     • {}", failure.red())?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
