use std::path::PathBuf;
use std::process::ExitCode;

use shadowlight_lib::{
    adjust_for_contrast, contrast_ratio, parse_color, ContrastOutput, ShadowError, ShadowOutput,
    SHADOWLIGHT_OUTPUT_VERSION,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::load_config;

/// Run the contrast command.
pub fn run_contrast(
    config_path: Option<PathBuf>,
    format: OutputFormat,
    fg: String,
    bg: String,
    large: bool,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    let (Some(foreground), Some(background)) = (parse_color(&fg), parse_color(&bg)) else {
        let bad = if parse_color(&fg).is_none() { &fg } else { &bg };
        return render_error(
            ShadowError::Config(format!("Unrecognized color '{bad}'")),
            format,
            output,
        );
    };

    let required = if large {
        config.contrast.large_text
    } else {
        config.contrast.normal_text
    };
    let ratio = contrast_ratio(foreground, background);
    let passed = ratio >= required;
    let suggestion = (!passed).then(|| adjust_for_contrast(background, required).to_hex());

    let body = ShadowOutput::Contrast(ContrastOutput {
        version: SHADOWLIGHT_OUTPUT_VERSION.to_string(),
        foreground: foreground.to_hex(),
        background: background.to_hex(),
        ratio,
        required,
        large_text: large,
        passed,
        suggestion,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(ShadowError::Unknown(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
