use clap::{Parser, ValueEnum};

const CMD_NAME: &str = "maestro";
const DEFAULT_OUTPUT: &str = "build";
const DEFAULT_FETCH_TIMEOUT: u64 = 30;

/// Output document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Format {
    /// Complete html page with the procedure's css inlined
    Html,
    /// Plain-text outline
    Text,
}

impl Format {
    /// File extension for documents in this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Text => "txt",
        }
    }
}

/// Stores our command-line args format.
#[derive(Parser, Debug)]
#[command(name = CMD_NAME, version, about = None, long_about = None)]
pub struct Args {
    /// Procedure definition file(s)
    #[arg(value_name = "FILE", required = true, env = "MAESTRO_PROCEDURE")]
    pub procedures: Vec<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT)]
    #[arg(env = "MAESTRO_OUTPUT")]
    pub output: String,

    /// Output format (may be repeated)
    #[arg(short, long = "format", value_enum, default_value = "html")]
    pub formats: Vec<Format>,

    /// Print additional debugging info (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Dry run; print documents instead of writing them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Timeout for fetching url tasks, in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_FETCH_TIMEOUT)]
    pub fetch_timeout: u64,

    /// Refuse to fetch url tasks
    #[arg(long)]
    pub no_fetch: bool,
}
