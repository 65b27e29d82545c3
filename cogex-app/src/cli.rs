use clap::{Parser, ValueEnum};
use cogex_core::TaskKind;
use std::path::PathBuf;

/// Run an N-back or Stroop session
#[derive(Debug, Parser)]
#[command(name = "cogex", version, about)]
pub struct Cli {
    #[arg(value_enum)]
    pub task: TaskArg,

    /// Asked for on the terminal when omitted.
    #[arg(short, long)]
    pub participant: Option<String>,

    /// Overrides the task's configured trial count.
    #[arg(short, long)]
    pub trials: Option<usize>,

    /// TOML file with display, task and output settings.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskArg {
    NBack,
    Stroop,
}

impl From<TaskArg> for TaskKind {
    fn from(arg: TaskArg) -> Self {
        match arg {
            TaskArg::NBack => TaskKind::NBack,
            TaskArg::Stroop => TaskKind::Stroop,
        }
    }
}
