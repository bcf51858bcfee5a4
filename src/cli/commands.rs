use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Gated requirements -> impact -> code pipeline
#[derive(Parser, Debug)]
#[command(
    name = "stagegate",
    about = "Gated requirements -> impact -> code pipeline",
    version,
    long_about = "stagegate sends free-text requirements through three dependent remote \
                  stages: requirements analysis, impact assessment and code generation. \
                  Each stage only becomes available once the stage before it has succeeded, \
                  and re-running a stage clears everything after it."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "Base URL of the remote stage service (overrides STAGEGATE_BASE_URL)"
    )]
    pub base_url: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "SECONDS",
        help = "Per-stage request timeout (overrides STAGEGATE_REQUEST_TIMEOUT)"
    )]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Drive the pipeline interactively from the terminal",
        long_about = "Starts a prompt with one command per stage trigger. Stage calls run in \
                      the background, so the prompt stays usable while they are in flight.\n\n\
                      Commands:\n  \
                      analyze <text>   analyze free-text requirements\n  \
                      analyze @<file>  analyze requirements read from a file\n  \
                      impact           assess impact of the current requirements\n  \
                      code             generate code from the current impact assessment\n  \
                      status           show every stage's status\n  \
                      show <stage>     print a stage's current result\n  \
                      quit             wait for running stages and exit"
    )]
    Interactive(InteractiveArgs),

    #[command(
        about = "Run all three stages once and print a report",
        long_about = "Runs requirements, impact and code in order, stopping at the first stage \
                      that does not succeed.\n\n\
                      Examples:\n  \
                      stagegate run --text \"Users can log in\"\n  \
                      stagegate run --file brd.txt --format json --output report.json"
    )]
    Run(RunArgs),

    #[command(
        about = "Check that the remote stage service is reachable",
        long_about = "Probes the base URL of the remote stage service.\n\n\
                      Examples:\n  \
                      stagegate health\n  \
                      stagegate health --base-url http://10.0.0.5:8000 --format json"
    )]
    Health(HealthArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct InteractiveArgs {
    #[arg(
        long,
        value_name = "TEXT",
        help = "Requirements text to analyze as soon as the prompt starts"
    )]
    pub text: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[arg(
        short = 't',
        long,
        value_name = "TEXT",
        conflicts_with = "file",
        required_unless_present = "file",
        help = "Requirements text"
    )]
    pub text: Option<String>,

    #[arg(
        short = 'F',
        long,
        value_name = "FILE",
        help = "Read requirements text from a file"
    )]
    pub file: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
