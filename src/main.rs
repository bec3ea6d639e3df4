use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use owo_colors::Stream;
use tracing_subscriber::EnvFilter;

use scalebench::bench;
use scalebench::config::{BenchConfig, SAMPLE_CONFIG};
use scalebench::display;
use scalebench::report;

#[derive(Parser)]
#[command(
    name = "scalebench",
    version,
    about = "Run a parallel program across thread/chunk grids and report speedup and efficiency"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (default: ./scalebench.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Report path, overriding the config
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Trials per point, overriding the config
    #[arg(long)]
    trials: Option<usize>,

    /// Print rows as JSON on stdout; progress goes to stderr
    #[arg(long)]
    json: bool,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Run the benchmark grid (default)
    Run,
    /// Print a sample config file
    Init,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(Command::Init) = cli.command {
        print!("{}", SAMPLE_CONFIG);
        return Ok(());
    }

    let (mut config, source) =
        BenchConfig::discover(cli.config.as_deref(), &BenchConfig::default_search_paths())?;
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(trials) = cli.trials {
        config.trials = trials;
    }

    let points = bench::plan(&config)?;
    if cli.json {
        eprint!(
            "{}",
            display::format_run_header(&config.input, points.len(), config.trials, source.as_deref(), Stream::Stderr)
        );
    } else {
        print!(
            "{}",
            display::format_run_header(&config.input, points.len(), config.trials, source.as_deref(), Stream::Stdout)
        );
    }

    let trials = config.trials;
    let json = cli.json;
    let run = bench::run_external(&config, &mut |trial| {
        if json {
            eprintln!("{}", display::format_trial_line(trial, trials, Stream::Stderr));
        } else {
            println!("{}", display::format_trial_line(trial, trials, Stream::Stdout));
        }
    })?;

    if cli.json {
        println!("{}", report::format_json(&config.input, &run.rows, Utc::now()));
    } else {
        print!("{}", display::format_summary(&run.rows, &config.output));
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        process::exit(1);
    }
}
