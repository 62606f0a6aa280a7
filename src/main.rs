mod cli;
mod commands;
mod formatting;
mod settings;

use std::io::IsTerminal;
use std::process::ExitCode;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Commands;
use commands::{run_apply, run_audit, run_contrast, run_guide, run_summarize};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries JSON output; logs go to stderr.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .init();
}

async fn run() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().collect();
    let args = cli::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Contrast {
            fg,
            bg,
            large,
            output,
        } => run_contrast(args.config, args.format, fg, bg, large, output),
        Commands::Apply {
            snapshot,
            site,
            mode,
            store,
            normal_text,
            large_text,
            output,
        } => run_apply(
            &raw_args,
            args.config,
            args.verbose,
            args.format,
            snapshot,
            site,
            mode,
            store,
            normal_text,
            large_text,
            output,
        ),
        Commands::Audit {
            snapshot,
            normal_text,
            large_text,
            output,
        } => run_audit(
            &raw_args,
            args.config,
            args.format,
            snapshot,
            normal_text,
            large_text,
            output,
        ),
        Commands::Summarize { snapshot, output } => {
            run_summarize(args.config, args.format, snapshot, output).await
        }
        Commands::Guide { intent, output } => {
            run_guide(args.config, args.format, intent, output).await
        }
    }
}
