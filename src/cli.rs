use clap::{Parser, Subcommand, ValueEnum};
use shadowlight_lib::AccessibilityMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shadowlight")]
#[command(
    version,
    about = "ShadowLight - contrast remediation and page assistance",
    long_about = "ShadowLight\n\nModes:\n- contrast: measure one foreground/background pair against WCAG thresholds.\n- apply: switch a site's accessibility mode over a DOM snapshot (toggle semantics).\n- audit: list elements of a DOM snapshot that fail contrast, without changing anything.\n- summarize: plain-language summary of a snapshot's text via the completion service.\n- guide: plan guided steps for a task via the completion service.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose (debug) logging on stderr")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) with contrast/guide/completion/store defaults; CLI flags override config"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value = "json", help = "Output format")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Measure the contrast of a single color pair
    Contrast {
        #[arg(long, help = "Text color (#rgb, #rrggbb, rgb(), rgba())")]
        fg: String,

        #[arg(long, help = "Background color (#rgb, #rrggbb, rgb(), rgba())")]
        bg: String,

        #[arg(long, help = "Treat the text as large (lower threshold)")]
        large: bool,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Apply an accessibility mode to a DOM snapshot
    Apply {
        #[arg(long, value_name = "PATH", help = "DOM snapshot (JSON)")]
        snapshot: PathBuf,

        #[arg(long, help = "Site identity (domain); defaults to the snapshot URL's host")]
        site: Option<String>,

        #[arg(
            long,
            help = "Mode to request: none, high-contrast-light, high-contrast-dark, color-blind-assist, auto-fix"
        )]
        mode: AccessibilityMode,

        #[arg(long, value_name = "PATH", help = "Mode store file (overrides store.path)")]
        store: Option<PathBuf>,

        #[arg(long, default_value = "4.5", help = "Minimum ratio for normal text")]
        normal_text: f64,

        #[arg(long, default_value = "3.0", help = "Minimum ratio for large text")]
        large_text: f64,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Report contrast failures in a DOM snapshot
    Audit {
        #[arg(long, value_name = "PATH", help = "DOM snapshot (JSON)")]
        snapshot: PathBuf,

        #[arg(long, default_value = "4.5", help = "Minimum ratio for normal text")]
        normal_text: f64,

        #[arg(long, default_value = "3.0", help = "Minimum ratio for large text")]
        large_text: f64,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Summarize the text of a DOM snapshot (requires an API key)
    Summarize {
        #[arg(long, value_name = "PATH", help = "DOM snapshot (JSON)")]
        snapshot: PathBuf,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Plan guided steps for a task (requires an API key)
    Guide {
        #[arg(long, help = "What the user wants to do, e.g. 'log in'")]
        intent: String,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, OutputFormat};
    use clap::Parser;
    use shadowlight_lib::AccessibilityMode;

    #[test]
    fn contrast_command_uses_defaults() {
        let cli = Cli::parse_from(["shadowlight", "contrast", "--fg", "#fff", "--bg", "#ff0"]);

        assert!(!cli.verbose);
        assert!(cli.config.is_none());
        assert!(matches!(cli.format, OutputFormat::Json));

        match cli.command {
            Commands::Contrast {
                fg,
                bg,
                large,
                output,
            } => {
                assert_eq!(fg, "#fff");
                assert_eq!(bg, "#ff0");
                assert!(!large);
                assert!(output.is_none());
            }
            _ => panic!("expected contrast command"),
        }
    }

    #[test]
    fn apply_command_respects_overrides() {
        let cli = Cli::parse_from([
            "shadowlight",
            "apply",
            "--snapshot",
            "page.json",
            "--site",
            "example.com",
            "--mode",
            "default-fix",
            "--store",
            "modes.json",
            "--normal-text",
            "7",
            "--format",
            "pretty",
            "--output",
            "out.json",
            "--config",
            "shadowlight.toml",
        ]);

        assert!(matches!(cli.format, OutputFormat::Pretty));
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("shadowlight.toml"))
        );
        match cli.command {
            Commands::Apply {
                snapshot,
                site,
                mode,
                store,
                normal_text,
                large_text,
                output,
            } => {
                assert_eq!(snapshot, std::path::PathBuf::from("page.json"));
                assert_eq!(site.as_deref(), Some("example.com"));
                assert_eq!(mode, AccessibilityMode::AutoFix);
                assert_eq!(store.as_deref(), Some(std::path::Path::new("modes.json")));
                assert!((normal_text - 7.0).abs() < f64::EPSILON);
                assert!((large_text - 3.0).abs() < f64::EPSILON);
                assert_eq!(output.as_deref(), Some(std::path::Path::new("out.json")));
            }
            _ => panic!("expected apply command with overrides"),
        }
    }

    #[test]
    fn apply_rejects_unknown_mode() {
        let result = Cli::try_parse_from([
            "shadowlight",
            "apply",
            "--snapshot",
            "page.json",
            "--mode",
            "sepia",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn guide_command_sets_verbose() {
        let cli = Cli::parse_from(["shadowlight", "--verbose", "guide", "--intent", "log in"]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Guide { intent, output } => {
                assert_eq!(intent, "log in");
                assert!(output.is_none());
            }
            _ => panic!("expected guide command"),
        }
    }
}
