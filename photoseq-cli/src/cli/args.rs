use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::types::{FormatArg, OutputFormat, PreviewArg};

/// Order, number and convert a directory of photos
#[derive(Parser, Debug)]
#[command(name = "photoseq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Run as if started in <path> instead of the current working directory
    #[arg(short = 'C', global = true, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Assume yes for all prompts
    #[arg(short = 'y', long = "yes", global = true, env = "PHOTOSEQ_YES")]
    pub yes: bool,
}

/// Arguments shared by the renaming commands
#[derive(Args, Debug, Clone)]
pub struct RenameArgs {
    /// Photo directory (defaults from config, then ./photos)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Preview output format (defaults from config if not specified)
    #[arg(long, value_enum)]
    pub preview: Option<PreviewArg>,

    /// Show the plan without renaming anything
    #[arg(long)]
    pub dry_run: bool,

    /// Append every rename step to this log file
    #[arg(long, value_name = "PATH")]
    pub journal: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "summary")]
    pub output: OutputFormat,

    /// Suppress progress output (only show errors)
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rename photos to their positions in an order manifest
    Order {
        /// Order manifest (defaults from config, then order.json)
        #[arg(long, value_name = "PATH")]
        manifest: Option<PathBuf>,

        /// Replace files outside the manifest that hold a target name
        #[arg(long)]
        overwrite: bool,

        #[command(flatten)]
        rename: RenameArgs,
    },

    /// Number photos that don't have a number yet, after the highest one
    Number {
        #[command(flatten)]
        rename: RenameArgs,
    },

    /// Convert photos to a compressed web format
    Convert {
        /// Source directory (defaults from config, then ./photos)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Output directory (defaults from config, then ./photos_webp)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Compression quality, 0-100 (default 85)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        quality: Option<u8>,

        /// Target format
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Preview output format (defaults from config if not specified)
        #[arg(long, value_enum)]
        preview: Option<PreviewArg>,

        /// List what would be converted without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "summary")]
        output: OutputFormat,

        /// Suppress progress output (only show errors)
        #[arg(long)]
        quiet: bool,
    },

    /// Show how a photo directory is numbered
    Status {
        /// Photo directory (defaults from config, then ./photos)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Converted photos as the gallery sees them (defaults from config, then ./photos_webp)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "summary")]
        output: OutputFormat,
    },

    /// Show version information
    Version {
        /// Output format
        #[arg(long, value_enum, default_value = "summary")]
        output: OutputFormat,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,

        /// Directory to write the completion file into
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },
}
