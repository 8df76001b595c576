//! CLI arguments

use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

/// hop - jump to frequently used directories
#[derive(Parser, Debug)]
#[command(name = "hop")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .args(["add", "increase", "decrease", "stat", "purge", "completion", "init"])
        .multiple(false)
))]
pub struct Cli {
    /// Directory query; prints the best match (jump mode)
    #[arg(conflicts_with = "mode")]
    pub query: Vec<String>,

    /// Record a visit to DIR
    #[arg(short, long, value_name = "DIR")]
    pub add: Option<PathBuf>,

    /// With --add: hand the visit to a detached child and return at once
    #[arg(long, requires = "add")]
    pub detach: bool,

    /// Increase the current directory's weight (default step from config)
    #[arg(short, long, value_name = "STEP", num_args = 0..=1)]
    pub increase: Option<Option<f64>>,

    /// Decrease the current directory's weight (default step from config)
    #[arg(short, long, value_name = "STEP", num_args = 0..=1)]
    pub decrease: Option<Option<f64>>,

    /// Show every known directory with its weight
    #[arg(short, long)]
    pub stat: bool,

    /// Forget directories that no longer exist
    #[arg(long)]
    pub purge: bool,

    /// Print ranked completion candidates for PARTIAL
    #[arg(long, value_name = "PARTIAL", allow_hyphen_values = true)]
    pub completion: Option<String>,

    /// With --completion: print candidates as PARTIAL__N__PATH
    #[arg(long, requires = "completion")]
    pub indexed: bool,

    /// Print the integration script for SHELL
    #[arg(long, value_name = "SHELL", value_enum)]
    pub init: Option<Shell>,

    /// Config file (overrides $HOP_CONFIG and the default locations)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Store file (overrides config and $HOP_DATA_FILE)
    #[arg(long, value_name = "FILE")]
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

/// What a single invocation does.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Add { path: PathBuf, detach: bool },
    Adjust { step: Option<f64>, increase: bool },
    Stat,
    Purge,
    Complete { partial: String, indexed: bool },
    Init(Shell),
    Jump(Vec<String>),
}

impl Mode {
    /// Modes run from shell hooks and completion, whose diagnostics must
    /// stay off the terminal.
    pub fn is_background(&self) -> bool {
        matches!(self, Mode::Add { .. } | Mode::Complete { .. })
    }
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if let Some(path) = &self.add {
            Mode::Add {
                path: path.clone(),
                detach: self.detach,
            }
        } else if let Some(step) = self.increase {
            Mode::Adjust {
                step,
                increase: true,
            }
        } else if let Some(step) = self.decrease {
            Mode::Adjust {
                step,
                increase: false,
            }
        } else if self.stat {
            Mode::Stat
        } else if self.purge {
            Mode::Purge
        } else if let Some(partial) = &self.completion {
            Mode::Complete {
                partial: partial.clone(),
                indexed: self.indexed,
            }
        } else if let Some(shell) = self.init {
            Mode::Init(shell)
        } else {
            Mode::Jump(self.query.clone())
        }
    }
}
