//! weft CLI: run, inspect and validate cloth scenes.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "weft")]
#[command(version, about = "weft: implicit cloth simulation")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a scene file.
    Simulate {
        /// Path to scene config (TOML).
        #[arg(short, long, default_value = "scene.toml")]
        config: String,

        /// Write per-step positions to this JSON file.
        #[arg(short, long)]
        output: Option<String>,

        /// Continue from the last frame of a recording made with --output.
        #[arg(long)]
        resume: Option<String>,

        /// How many times a failed step may be split into half steps.
        #[arg(long, default_value_t = 3)]
        max_retries: u32,
    },

    /// List the built-in material presets.
    Materials,

    /// Validate a scene (.toml) or mesh (.json).
    Validate {
        /// Path to scene or mesh file.
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Library events go out through tracing's `log` bridge
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();

    let result = match cli.command {
        Commands::Simulate {
            config,
            output,
            resume,
            max_retries,
        } => commands::simulate(&config, output.as_deref(), resume.as_deref(), max_retries),
        Commands::Materials => commands::materials(),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
