// comic-tool/src/cli.rs
use crate::core::{ProcessConfig, ProcessMode, DEFAULT_JPEG_QUALITY};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "comic-tool", version, about = "Split and repack comic page archives")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Append the durable log to this file
    #[arg(long, global = true, default_value = "tool.log")]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split comics into individual pages
    Split(PackArgs),

    /// Compress files only, not split
    Compress(PackArgs),

    /// Renumber page files
    Renum {
        /// The source directory
        src_dir: PathBuf,

        /// Apply the renames without asking
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct PackArgs {
    /// The source directory
    pub src_dir: PathBuf,

    /// The destination directory
    pub dest_dir: PathBuf,

    /// JPEG quality for split pages (1-100)
    #[arg(short, long, default_value_t = DEFAULT_JPEG_QUALITY)]
    pub quality: u8,

    /// Directory for staging files (defaults to the destination)
    #[arg(long)]
    pub workspace: Option<PathBuf>,
}

impl PackArgs {
    pub fn to_config(&self, mode: ProcessMode) -> ProcessConfig {
        ProcessConfig {
            mode,
            jpeg_quality: self.quality,
            workspace_root: self.workspace.clone(),
        }
    }
}
