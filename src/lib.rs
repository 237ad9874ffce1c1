pub mod cli;
pub mod config;
pub mod error;
pub mod extensions;
pub mod output;
pub mod processor;
pub mod progress;
pub mod record;
pub mod reveal;
pub mod search;
pub mod session;
pub mod walker;

pub use crate::error::{Result, ScanError, ValidationError};
pub use clap::Parser;
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extensions::{DEFAULT_EXTENSIONS, sanitize_extensions};
pub use record::{FILE_NAME_MATCH_MARKER, MatchRecord};
pub use reveal::reveal_in_file_manager;
pub use search::{SearchOptions, SearchRequest, search};
pub use session::{ScanEvent, ScanSession, validate_inputs};
pub use walker::WalkOptions;
