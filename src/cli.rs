use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(short, long, global = true, value_parser, default_value_t = false)]
    pub verbose: bool,

    #[clap(short, long, global = true, value_parser, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to this file instead of stderr.
    #[clap(long, global = true, value_parser)]
    pub log: Option<PathBuf>,

    /// Use this config file instead of the default lookup.
    #[clap(long, global = true, value_parser)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Level used when `RUST_LOG` is unset.
    pub fn log_level(&self) -> log::LevelFilter {
        match (self.verbose, self.quiet) {
            (true, _) => log::LevelFilter::Debug,
            (_, true) => log::LevelFilter::Warn,
            _ => log::LevelFilter::Info,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search file names and contents below a folder.
    Search {
        needle: String,

        #[clap(default_value = ".")]
        path: PathBuf,

        /// Comma separated extensions, e.g. "log,txt". Empty or "*" means the defaults.
        #[clap(short, long, value_parser)]
        extensions: Option<String>,

        /// Also report files whose name contains the needle.
        #[clap(short = 'n', long = "names", value_parser, default_value_t = false)]
        include_names: bool,

        /// Worker threads for matching; 0 picks one per CPU.
        #[clap(short = 'j', long, value_parser)]
        jobs: Option<usize>,

        #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[clap(long, value_parser, default_value_t = false)]
        no_progress: bool,

        #[clap(long, value_parser, default_value_t = false)]
        follow_links: bool,

        #[clap(long, value_parser, default_value_t = false)]
        no_hidden: bool,
    },
    /// Show a file in the system file manager.
    Reveal { path: PathBuf },
    /// Print the active configuration, or write the defaults with --init.
    Config {
        #[clap(long, value_parser, default_value_t = false)]
        init: bool,

        /// Target for --init; defaults to the user config directory.
        #[clap(long, value_parser, requires = "init")]
        path: Option<PathBuf>,
    },
    Completions {
        #[clap(value_enum)]
        shell: Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_picks_log_level() {
        assert_eq!(Cli::parse_from(["textscan", "config"]).log_level(), log::LevelFilter::Info);
        assert_eq!(
            Cli::parse_from(["textscan", "-v", "config"]).log_level(),
            log::LevelFilter::Debug
        );
        assert_eq!(
            Cli::parse_from(["textscan", "config", "--quiet"]).log_level(),
            log::LevelFilter::Warn
        );
        assert!(Cli::try_parse_from(["textscan", "-v", "-q", "config"]).is_err());
    }

    #[test]
    fn search_defaults() {
        let cli = Cli::parse_from(["textscan", "search", "hello"]);
        match cli.command {
            Commands::Search {
                needle,
                path,
                extensions,
                include_names,
                jobs,
                format,
                ..
            } => {
                assert_eq!(needle, "hello");
                assert_eq!(path, PathBuf::from("."));
                assert_eq!(extensions, None);
                assert!(!include_names);
                assert_eq!(jobs, None);
                assert_eq!(format, OutputFormat::Text);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn search_flags() {
        let cli = Cli::parse_from([
            "textscan", "--verbose", "search", "hello", "/tmp", "-e", "log,TXT", "-n", "-j", "4",
            "--format", "json",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Search {
                extensions,
                include_names,
                jobs,
                format,
                ..
            } => {
                assert_eq!(extensions.as_deref(), Some("log,TXT"));
                assert!(include_names);
                assert_eq!(jobs, Some(4));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["textscan", "-v", "-q", "search", "x"]).is_err());
    }
}
