use clap::CommandFactory;
use colored::*;
use env_logger::{Builder, Env, Target};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use textscan::output::{self, OutputFormatter};
use textscan::progress::ProgressReporter;
use textscan::{
    Cli, Commands, Config, MatchRecord, OutputFormat, Parser, Result, ScanError, ScanEvent,
    ScanSession, SearchOptions, reveal_in_file_manager,
};

/// Conventional exit status after SIGINT.
const EXIT_CANCELLED: u8 = 130;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format!("Error: {e}").red());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let start_time = Instant::now();
    info!("Application started with command: {:?}", cli.command);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    debug!("Effective config: {config:?}");

    let code = match cli.command {
        Commands::Search {
            needle,
            path,
            extensions,
            include_names,
            jobs,
            format,
            no_progress,
            follow_links,
            no_hidden,
        } => {
            let mut options = config.search.search_options();
            if jobs.is_some() {
                options.parallel_jobs = jobs;
            }
            if follow_links {
                options.walk.follow_links = true;
            }
            if no_hidden {
                options.walk.include_hidden = false;
            }

            if !config.display.color || !std::io::stdout().is_terminal() {
                colored::control::set_override(false);
            }

            let job = SearchJob {
                extension_filter: extensions.unwrap_or_else(|| config.search.extensions.clone()),
                include_names: include_names || config.search.include_file_names,
                show_progress: config.display.show_progress
                    && !no_progress
                    && std::io::stderr().is_terminal(),
                show_summary: config.display.show_summary && format == OutputFormat::Text,
                needle,
                path,
                format,
                options,
            };
            run_search(job)?
        }
        Commands::Reveal { path } => {
            reveal_in_file_manager(&path)?;
            ExitCode::SUCCESS
        }
        Commands::Config { init, path } => {
            if init {
                let target = path.unwrap_or_else(Config::default_path);
                Config::default().save(&target)?;
                println!("Wrote default config to {}", target.display());
            } else {
                let rendered = toml::to_string_pretty(&config)
                    .map_err(|e| ScanError::Config(e.to_string()))?;
                print!("{rendered}");
            }
            ExitCode::SUCCESS
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "textscan", &mut std::io::stdout());
            ExitCode::SUCCESS
        }
    };

    info!(
        "Application finished. Total elapsed time: {:.2?}",
        start_time.elapsed()
    );
    Ok(code)
}

struct SearchJob {
    needle: String,
    path: PathBuf,
    extension_filter: String,
    include_names: bool,
    format: OutputFormat,
    show_progress: bool,
    show_summary: bool,
    options: SearchOptions,
}

fn run_search(job: SearchJob) -> Result<ExitCode> {
    let (session, events) = ScanSession::new();
    let session = session.with_options(job.options);

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let session = session.clone();
        let interrupted = Arc::clone(&interrupted);
        ctrlc::set_handler(move || {
            if !session.is_scanning() {
                std::process::exit(i32::from(EXIT_CANCELLED));
            }
            interrupted.store(true, Ordering::SeqCst);
            session.stop();
        })
        .map_err(|e| ScanError::Other(format!("Failed to install Ctrl-C handler: {e}")))?;
    }

    session.start(
        job.path.clone(),
        &job.needle,
        &job.extension_filter,
        job.include_names,
    )?;

    let reporter = ProgressReporter::new(job.show_progress);
    reporter.set_message(format!("Searching {}", job.path.display()));

    let mut outcome = None;
    for event in events.iter() {
        match event {
            ScanEvent::ScanningChanged(true) => debug!("Scan running"),
            ScanEvent::ProgressChanged(pct) => reporter.update(pct),
            ScanEvent::ResultsReady(records) => outcome = Some(Ok(records)),
            ScanEvent::ErrorOccurred(msg) => outcome = Some(Err(msg)),
            ScanEvent::ScanningChanged(false) => break,
        }
    }

    match outcome {
        Some(Ok(records)) => {
            reporter.finish(records.len());
            print_results(&records, &job.needle, &job.path, job.format, job.show_summary);
            Ok(ExitCode::SUCCESS)
        }
        Some(Err(msg)) => {
            reporter.abandon("Scan failed");
            Err(ScanError::Other(msg))
        }
        None => {
            reporter.abandon("Scan cancelled");
            if interrupted.load(Ordering::SeqCst) {
                eprintln!("{}", "Scan cancelled".yellow());
            }
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
    }
}

fn print_results(
    records: &[MatchRecord],
    needle: &str,
    folder: &Path,
    format: OutputFormat,
    show_summary: bool,
) {
    let formatter = OutputFormatter::new(format);
    println!("{}", formatter.format_results(records, needle, folder));
    if show_summary && !records.is_empty() {
        println!("\n{}", output::summary(records));
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let target = match &cli.log {
        Some(log_path) => {
            if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            Target::Pipe(Box::new(fs::File::create(log_path)?))
        }
        None => Target::Stderr,
    };

    Builder::from_env(Env::default().default_filter_or(cli.log_level().as_str()))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .target(target)
        .try_init()
        .map_err(|e| ScanError::Other(e.to_string()))
}
