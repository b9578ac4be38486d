use crate::config::OutputFormat;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "resp-lex")]
#[command(about = "Split a RESP byte stream into protocol tokens")]
#[command(long_about = "resp-lex reads a Redis Serialization Protocol stream from a file or stdin and prints the boundary of every token, stopping at the first sign of corruption")]
#[command(version)]
pub struct Cli {
    /// Input file (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Output format
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Most bytes pulled from the input in a single read
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Raw token bytes shown per record before truncating
    #[arg(long)]
    pub preview: Option<usize>,

    /// Configuration file path (JSON format)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Log level selected by the verbosity flags.
    pub fn log_level(&self) -> Level {
        if self.debug {
            Level::TRACE
        } else if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}
