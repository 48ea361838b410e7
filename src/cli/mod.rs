//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::DisplayMode;

/// Read Config Bundle - move reading-display configurations between devices.
///
/// A bundle is a ZIP holding readConfig.json plus the font and background
/// images it references. Robot Mode: use --robot or --format=json for
/// machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "rcb", version, about, long_about = None)]
#[command(propagate_version = true)]
#[allow(clippy::struct_excessive_bools)] // CLI flags naturally use multiple bools
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "RCB_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Engine settings file (TOML)
    #[arg(long, global = true, env = "RCB_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding installed fonts and backgrounds
    #[arg(long, global = true, env = "RCB_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for staging and temporary archives
    #[arg(long, global = true, env = "RCB_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Bundles ===
    /// Export the current configuration as a bundle
    Export(ExportArgs),

    /// Import a bundle from a file or URL and make it current
    Import(ImportArgs),

    // === Settings Store ===
    /// Show the current configuration
    Show,

    /// List stored configurations
    List,

    /// Make another stored configuration current
    Select(SelectArgs),

    /// Rename the current configuration
    Rename(RenameArgs),

    /// Delete the current configuration
    Delete,

    /// Use an image as background for a display mode
    SetBg(SetBgArgs),

    /// Set a text or background color for a display mode
    SetColor(SetColorArgs),

    // === Utilities ===
    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Directory to write the bundle into (defaults to the current directory)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Arguments for bundle import.
///
/// # Examples
///
/// ```bash
/// # Import a local bundle
/// rcb import ~/Downloads/Sepia.zip
///
/// # Import from a URL
/// rcb import https://example.org/Sepia.zip
///
/// # Prompt for a URL on stdin
/// echo https://example.org/Sepia.zip | rcb import --net
/// ```
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Bundle path, file:// URL or http(s):// URL
    #[arg(value_name = "PATH|URL", required_unless_present = "net", conflicts_with = "net")]
    pub source: Option<String>,

    /// Read the bundle URL from stdin
    #[arg(long)]
    pub net: bool,
}

#[derive(Parser, Debug)]
pub struct SelectArgs {
    /// Index from `rcb list` (0-based)
    pub index: usize,
}

#[derive(Parser, Debug)]
pub struct RenameArgs {
    /// New name
    pub name: String,
}

#[derive(Parser, Debug)]
pub struct SetBgArgs {
    /// Image file to install
    pub image: PathBuf,

    /// Display mode to change
    #[arg(long, short = 'm', default_value = "day")]
    pub mode: ModeArg,
}

#[derive(Parser, Debug)]
pub struct SetColorArgs {
    /// What to color
    pub target: ColorTarget,

    /// Color as #RRGGBB or #AARRGGBB
    pub color: String,

    /// Display mode to change
    #[arg(long, short = 'm', default_value = "day")]
    pub mode: ModeArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorTarget {
    /// Text color
    Text,
    /// Solid background color
    Bg,
}

/// Display mode on the command line.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ModeArg {
    #[default]
    Day,
    Night,
    Eink,
}

impl From<ModeArg> for DisplayMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Day => Self::Day,
            ModeArg::Night => Self::Night,
            ModeArg::Eink => Self::EInk,
        }
    }
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
