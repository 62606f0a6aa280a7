use std::path::PathBuf;
use std::process::ExitCode;

use shadowlight_lib::{
    AccessibilityMode, Assistant, GuideOutput, OpenAiCompatibleClient, ShadowError, ShadowOutput,
    SHADOWLIGHT_OUTPUT_VERSION,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::load_config;

/// Run the guide command.
///
/// Requests that name an accessibility mode are answered locally with that
/// mode; everything else is sent to the completion service for a step plan.
pub async fn run_guide(
    config_path: Option<PathBuf>,
    format: OutputFormat,
    intent: String,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };

    let requested_mode = AccessibilityMode::from_intent(&intent);
    let steps = if requested_mode.is_some() {
        Vec::new()
    } else {
        let client = match OpenAiCompatibleClient::from_config(&config.completion) {
            Ok(client) => client,
            Err(err) => return render_error(err.into(), format, output),
        };
        match Assistant::new(client).plan_guide(&intent).await {
            Ok(steps) => steps,
            Err(err) => return render_error(err.into(), format, output),
        }
    };

    let body = ShadowOutput::Guide(GuideOutput {
        version: SHADOWLIGHT_OUTPUT_VERSION.to_string(),
        intent,
        requested_mode,
        steps,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(ShadowError::Unknown(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
