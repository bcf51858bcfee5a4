use stagegate::cli::commands::{CliArgs, Commands};
use stagegate::cli::handlers::{handle_health, handle_interactive, handle_run};
use stagegate::util::logging::{init_logging, json_from_env, parse_level, LoggingConfig};
use stagegate::{StagegateConfig, VERSION};

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let config = StagegateConfig::default()
        .with_overrides(args.base_url.as_deref(), args.timeout);
    let config = match log_level_override(&args) {
        Some(level) => config.with_log_level(level),
        None => config,
    };
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    init_logging(LoggingConfig::for_cli(
        parse_level(&config.log_level),
        args.verbose,
        json_from_env(),
    ));

    debug!("stagegate v{} starting", VERSION);
    debug!("Arguments: {:?}", args);
    debug!("{}", config);

    let exit_code = match &args.command {
        Commands::Interactive(interactive_args) => {
            handle_interactive(interactive_args, &config).await
        }
        Commands::Run(run_args) => handle_run(run_args, &config).await,
        Commands::Health(health_args) => handle_health(health_args, &config).await,
    };

    std::process::exit(exit_code);
}

/// `--log-level` wins over `-v`/`-q`, which win over `STAGEGATE_LOG_LEVEL`
fn log_level_override(args: &CliArgs) -> Option<&str> {
    if let Some(level) = &args.log_level {
        Some(level.as_str())
    } else if args.verbose {
        Some("debug")
    } else if args.quiet {
        Some("error")
    } else {
        None
    }
}
