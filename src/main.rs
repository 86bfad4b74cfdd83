use clap::{ArgAction, Parser};
use log::{error, info};
use refgen::core::config::{self, CliOverrides, DEFAULT_CONFIG_FILE};
use refgen::output::sink::posix;
use refgen::{DiskSink, ReferenceBuilder, Staleness};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "refgen",
    about = "Generate API reference stubs and a literate navigation index"
)]
struct Args {
    /// Config file (defaults to ./refgen.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory module identifiers are relative to
    #[arg(long)]
    dist_root: Option<PathBuf>,

    /// Directory to scan for modules
    #[arg(long)]
    module_root: Option<PathBuf>,

    /// Reference root that receives stubs and the navigation index
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Print the planned files instead of writing them
    #[arg(long, conflicts_with = "check")]
    dry_run: bool,

    /// Fail if the files under the reference root are out of date
    #[arg(long)]
    check: bool,

    /// Fail when two modules map to the same navigation entry
    #[arg(long)]
    strict: bool,

    /// Write doc-path → source-path associations as JSON to this file
    #[arg(long)]
    edit_manifest: Option<PathBuf>,

    /// Also write a debug log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase terminal log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Write a commented default config and exit
    #[arg(long)]
    init_config: bool,
}

fn init_logging(args: &Args) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = &args.log_file {
        match File::create(path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, log_config, file)),
            Err(e) => eprintln!("Cannot open log file {}: {e}", path.display()),
        }
    }
    let _ = CombinedLogger::init(loggers);
}

fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if args.init_config {
        let path = args
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if config::generate_default_config(&path)? {
            println!("Wrote {}", path.display());
        } else {
            println!("{} already exists, left untouched", path.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let file_config = config::load_config(args.config.as_deref())?;
    let cli = CliOverrides {
        dist_root: args.dist_root,
        module_root: args.module_root,
        out_dir: args.out_dir,
        strict: args.strict,
        edit_manifest: args.edit_manifest,
    };
    let resolved = config::resolve(&file_config, &cli);
    info!(
        "Scanning {} (identifiers relative to {})",
        resolved.module_root.display(),
        resolved.dist_root.display()
    );

    if args.check {
        let stale = refgen::check(&resolved)?;
        if stale.is_empty() {
            info!("Reference tree under {} is up to date", resolved.out_dir.display());
            return Ok(ExitCode::SUCCESS);
        }
        for file in &stale {
            let label = match file.staleness {
                Staleness::Missing => "missing",
                Staleness::Changed => "changed",
                Staleness::Extra => "extra",
            };
            println!("{label}: {}", posix(&file.path));
        }
        error!(
            "{} reference file(s) out of date; rerun refgen",
            stale.len()
        );
        return Ok(ExitCode::from(2));
    }

    if args.dry_run {
        let (sink, report) = refgen::build_in_memory(&resolved)?;
        for path in sink.paths() {
            println!("{}", resolved.out_dir.join(path).display());
        }
        info!("{} stubs planned, {} entry points skipped", report.stubs, report.skipped);
        return Ok(ExitCode::SUCCESS);
    }

    let mut sink = DiskSink::new(&resolved.out_dir);
    if let Some(manifest) = &resolved.edit_manifest {
        sink = sink.with_manifest(manifest);
    }
    let report = ReferenceBuilder::new(&resolved).build(&mut sink)?;
    println!(
        "Generated {} reference pages in {}",
        report.stubs,
        resolved.out_dir.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();
    init_logging(&args);

    log::debug!("refgen starting up");

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
