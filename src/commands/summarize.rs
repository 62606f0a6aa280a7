use std::path::PathBuf;
use std::process::ExitCode;

use shadowlight_lib::{
    Assistant, OpenAiCompatibleClient, ShadowError, ShadowOutput, SummarizeOutput,
    SHADOWLIGHT_OUTPUT_VERSION,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::load_config;

use super::load_document;

/// Run the summarize command.
pub async fn run_summarize(
    config_path: Option<PathBuf>,
    format: OutputFormat,
    snapshot: PathBuf,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    let doc = match load_document(&snapshot) {
        Ok(doc) => doc,
        Err(err) => return render_error(err, format, output),
    };
    let client = match OpenAiCompatibleClient::from_config(&config.completion) {
        Ok(client) => client,
        Err(err) => return render_error(err.into(), format, output),
    };

    let assistant = Assistant::new(client);
    let summary = match assistant.summarize(&doc.page_text()).await {
        Ok(summary) => summary,
        Err(err) => return render_error(err.into(), format, output),
    };

    let body = ShadowOutput::Summarize(SummarizeOutput {
        version: SHADOWLIGHT_OUTPUT_VERSION.to_string(),
        url: doc.url.clone(),
        summary,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(ShadowError::Unknown(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
