use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "ecosense-backend", version, about = "Ecosense plant and sensor API server")]
pub struct CliArgs {
    /// Path to configuration file (.toml, .yaml, .yml or .json)
    #[arg(short = 'c', long = "config-path", env = "ECOSENSE_CONFIG_PATH")]
    pub config_path: Option<String>,
}
