use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use bootviz::{BootvizOptions, FileConfig, Source, parse_filter, run_main, write_output};
use bootviz_dot::OutputFormat;
use bootviz_dot::engine::is_engine_error;
use bootviz_error::Result;

#[derive(Parser, Debug)]
#[command(
    name = "bootviz",
    about = "bootviz: see where your Spring Boot application spends its startup",
    version
)]
pub struct Cli {
    /// Startup endpoint URL, snapshot file, or '-' for stdin
    #[arg(value_name = "SOURCE")]
    source: Option<String>,

    /// Output file path (writes to stdout when omitted)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format: 'svg', 'png' or 'dot' (default: from the output extension, else svg)
    #[arg(long, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Hide steps at or below this duration unless a slower step sits beneath them (e.g. 500ms, 0.5s)
    #[arg(long, value_name = "DURATION", value_parser = parse_filter)]
    filter: Option<Duration>,

    /// Fraction of the slowest step at which the fill reaches the slow colour
    #[arg(long = "fade-scale", value_name = "RATIO")]
    fade_scale: Option<f64>,

    /// Fill colour for the fastest steps
    #[arg(long = "fast-color", value_name = "HEX")]
    fast_color: Option<String>,

    /// Fill colour for the slowest steps
    #[arg(long = "slow-color", value_name = "HEX")]
    slow_color: Option<String>,

    /// Graphviz layout program
    #[arg(long = "dot-program", value_name = "PATH")]
    dot_program: Option<PathBuf>,

    /// Configuration file (default: ./bootviz.toml if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// HTTP timeout in seconds for the startup endpoint
    #[arg(long = "timeout", value_name = "SECS")]
    timeout: Option<u64>,

    /// Log pipeline phases to stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    /// Defaults, then the config file, then explicit flags.
    fn resolve(&self) -> Result<BootvizOptions> {
        let mut opts = BootvizOptions::new();
        if let Some(config) = FileConfig::discover(self.config.as_deref())? {
            config.apply(&mut opts)?;
        }

        if let Some(source) = &self.source {
            opts.source = Source::parse(source);
        }
        if let Some(output) = &self.output {
            opts.output = Some(output.clone());
        }
        if let Some(format) = self.format {
            opts.format = Some(format);
        }
        if let Some(filter) = self.filter {
            opts.filter = filter;
        }
        if let Some(scale) = self.fade_scale {
            opts.colors.fade_scale = scale;
        }
        if let Some(color) = &self.fast_color {
            opts.colors.fast_color = color.clone();
        }
        if let Some(color) = &self.slow_color {
            opts.colors.slow_color = color.clone();
        }
        if let Some(program) = &self.dot_program {
            opts.dot_program = program.clone();
        }
        if let Some(secs) = self.timeout {
            opts.fetch_timeout = Duration::from_secs(secs);
        }
        Ok(opts)
    }
}

fn init_tracing(verbose: bool) {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    } else if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
            .with_writer(std::io::stderr)
            .init();
    }
}

pub fn run(args: &Cli) -> Result<()> {
    let total_start = Instant::now();

    let opts = args.resolve()?;
    let bytes = run_main(&opts)?;
    write_output(opts.output.as_deref(), &bytes)?;

    let total_secs = total_start.elapsed().as_secs_f64();
    tracing::info!(total_secs, "complete");
    Ok(())
}

pub fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if is_engine_error(&e) {
                eprintln!("hint: pass --format dot to skip Graphviz, or --dot-program to point at it");
            } else if e.is_transient() {
                eprintln!("hint: is the application running with the startup endpoint exposed?");
            }
            tracing::error!(error = %e, "execution failed");
            ExitCode::FAILURE
        }
    }
}
