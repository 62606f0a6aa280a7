use std::path::PathBuf;
use std::process::ExitCode;

use shadowlight_lib::mode::site_from_url;
use shadowlight_lib::{
    AccessibilityMode, ActiveOverride, ApplyOutput, JsonFileStore, ModeController, ShadowError,
    ShadowOutput, SHADOWLIGHT_OUTPUT_VERSION,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{
    format_effective_config, load_config, resolve_store_path, resolve_thresholds,
    ContrastFlagSources,
};

use super::load_document;

/// Run the apply command.
#[allow(clippy::too_many_arguments)]
pub fn run_apply(
    raw_args: &[String],
    config_path: Option<PathBuf>,
    verbose: bool,
    format: OutputFormat,
    snapshot: PathBuf,
    site: Option<String>,
    mode: AccessibilityMode,
    store: Option<PathBuf>,
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
    if verbose {
        tracing::info!(
            "{}",
            format_effective_config(&thresholds, &config, config_path.as_deref())
        );
    }

    let mut doc = match load_document(&snapshot) {
        Ok(doc) => doc,
        Err(err) => return render_error(err, format, output),
    };
    let Some(site) = site.or_else(|| doc.url.as_deref().and_then(site_from_url)) else {
        return render_error(
            ShadowError::Config(
                "No site given and the snapshot has no URL; pass --site <domain>".to_string(),
            ),
            format,
            output,
        );
    };
    let store_path = match resolve_store_path(store, &config) {
        Ok(path) => path,
        Err(err) => return render_error(err, format, output),
    };

    let mut controller =
        ModeController::new(site.clone(), JsonFileStore::new(store_path)).with_thresholds(thresholds);
    let previous_mode = match controller.restore(&mut doc) {
        Ok(mode) => mode,
        Err(err) => return render_error(err, format, output),
    };
    let active_mode = controller.set_mode(&mut doc, mode);

    let report = match controller.active_override() {
        ActiveOverride::Remediation(report) => Some(*report),
        _ => None,
    };
    let body = ShadowOutput::Apply(ApplyOutput {
        version: SHADOWLIGHT_OUTPUT_VERSION.to_string(),
        site,
        previous_mode,
        active_mode,
        stylesheet: controller.active_stylesheet().map(str::to_string),
        report,
        snapshot: doc.to_snapshot(),
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(ShadowError::Unknown(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
