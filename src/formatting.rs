use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use shadowlight_lib::{ErrorOutput, ShadowError, ShadowOutput, SHADOWLIGHT_OUTPUT_VERSION};

use crate::cli::OutputFormat;

/// Most failures listed in pretty output.
const MAX_PRETTY_FAILURES: usize = 10;

/// Write output in the requested format.
pub fn write_output(
    body: &ShadowOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: ShadowError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    tracing::debug!(error = ?err, "command failed");
    let error_payload = err.to_payload();
    let payload = ShadowOutput::Error(ErrorOutput {
        version: SHADOWLIGHT_OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    // Exit code 2 is reserved for fatal errors; audit failures use 1.
    ExitCode::from(2)
}

fn write_json_output(body: &ShadowOutput, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

fn write_pretty_output(body: &ShadowOutput, output: Option<&Path>) -> io::Result<()> {
    let use_human = output.is_none() && std::io::stdout().is_terminal();

    if use_human {
        let content = format_pretty(body, true);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &ShadowOutput, colorize: bool) -> String {
    let status = |passed: bool| {
        if passed {
            color("PASS", "32", colorize)
        } else {
            color("FAIL", "31", colorize)
        }
    };

    let mut buf = String::new();
    match body {
        ShadowOutput::Contrast(out) => {
            writeln!(
                buf,
                "{} {} on {}",
                status(out.passed),
                out.foreground,
                out.background
            )
            .ok();
            writeln!(
                buf,
                "Ratio: {:.2}:1 (required {:.1}:1, {} text)",
                out.ratio,
                out.required,
                if out.large_text { "large" } else { "normal" }
            )
            .ok();
            if let Some(suggestion) = &out.suggestion {
                writeln!(buf, "Suggested text color: {suggestion}").ok();
            }
        }
        ShadowOutput::Apply(out) => {
            let header = color("[APPLY]", "36", colorize);
            writeln!(
                buf,
                "{} {}: {} -> {}",
                header, out.site, out.previous_mode, out.active_mode
            )
            .ok();
            if let Some(report) = &out.report {
                writeln!(
                    buf,
                    "Remediated {} of {} evaluated elements (text {}, borders {}, forced backgrounds {})",
                    report.nodes_changed(),
                    report.evaluated,
                    report.text_fixed,
                    report.border_fixed,
                    report.background_forced
                )
                .ok();
            }
            if out.stylesheet.is_some() {
                writeln!(buf, "Override stylesheet injected").ok();
            }
        }
        ShadowOutput::Audit(out) => {
            writeln!(
                buf,
                "{} Contrast audit ({} failing of {} nodes)",
                status(out.passed),
                out.failures.len(),
                out.nodes
            )
            .ok();
            if !out.failures.is_empty() {
                writeln!(buf, "Failures (max {MAX_PRETTY_FAILURES}):").ok();
                for f in out.failures.iter().take(MAX_PRETTY_FAILURES) {
                    writeln!(
                        buf,
                        "- {:<16} <{}> {:?} {} on {}: {:.2} < {:.1}",
                        f.node, f.tag, f.kind, f.foreground, f.background, f.ratio, f.required
                    )
                    .ok();
                }
            }
        }
        ShadowOutput::Summarize(out) => {
            let header = color("[SUMMARY]", "34", colorize);
            writeln!(buf, "{header}").ok();
            writeln!(buf, "{}", out.summary).ok();
        }
        ShadowOutput::Guide(out) => {
            let header = color("[GUIDE]", "34", colorize);
            if let Some(mode) = out.requested_mode {
                writeln!(buf, "{header} Requested accessibility mode: {mode}").ok();
            } else if out.steps.is_empty() {
                writeln!(buf, "{header} No steps suggested for \"{}\"", out.intent).ok();
            } else {
                writeln!(buf, "{header} {} steps for \"{}\"", out.steps.len(), out.intent).ok();
                for (i, step) in out.steps.iter().enumerate() {
                    writeln!(buf, "{}. {} ({})", i + 1, step.instruction, step.selector).ok();
                }
            }
        }
        ShadowOutput::Error(out) => {
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
        }
    }
    buf
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Determine exit code for the audit command.
pub fn exit_code_for_audit(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
