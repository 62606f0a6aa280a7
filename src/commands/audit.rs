use std::path::PathBuf;
use std::process::ExitCode;

use shadowlight_lib::{
    audit, AuditFinding, AuditOutput, ShadowError, ShadowOutput, SHADOWLIGHT_OUTPUT_VERSION,
};

use crate::cli::OutputFormat;
use crate::formatting::{exit_code_for_audit, render_error, write_output};
use crate::settings::{load_config, resolve_thresholds, ContrastFlagSources};

use super::load_document;

/// Run the audit command.
pub fn run_audit(
    raw_args: &[String],
    config_path: Option<PathBuf>,
    format: OutputFormat,
    snapshot: PathBuf,
    normal_text: f64,
    large_text: f64,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    let flags = ContrastFlagSources::from_args(raw_args);
    let thresholds = resolve_thresholds(normal_text, large_text, &config, &flags);

    let doc = match load_document(&snapshot) {
        Ok(doc) => doc,
        Err(err) => return render_error(err, format, output),
    };

    let failures: Vec<AuditFinding> = audit(&doc, &thresholds)
        .iter()
        .map(|(id, check)| {
            let node = doc.node(*id);
            AuditFinding::new(&node.key, &node.tag, check)
        })
        .collect();
    let passed = failures.is_empty();
    tracing::info!(nodes = doc.len(), failures = failures.len(), "audit finished");

    let body = ShadowOutput::Audit(AuditOutput {
        version: SHADOWLIGHT_OUTPUT_VERSION.to_string(),
        url: doc.url.clone(),
        nodes: doc.len(),
        passed,
        failures,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(ShadowError::Unknown(err.to_string()), format, output);
    }
    exit_code_for_audit(passed)
}
