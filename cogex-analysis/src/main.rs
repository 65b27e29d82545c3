use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cogex_analysis::{
    by_word_color, congruence, default_data_dir, load_participant, summarize,
};
use cogex_core::{ParticipantId, TaskKind};
use cogex_experiment::{NBackRecord, StroopRecord, prompt_participant};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Descriptive statistics for a saved session
#[derive(Debug, Parser)]
#[command(name = "cogex-analyze", version, about)]
struct Cli {
    #[arg(value_enum)]
    task: TaskArg,

    /// Asked for on the terminal when omitted.
    #[arg(short, long)]
    participant: Option<String>,

    /// Defaults to `N Back Data` or `stroop_data`.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TaskArg {
    NBack,
    Stroop,
}

fn run(cli: Cli) -> Result<()> {
    let participant = match &cli.participant {
        Some(raw) => ParticipantId::new(raw)?,
        None => prompt_participant(
            &mut std::io::stdin().lock(),
            &mut std::io::stdout(),
            "Enter the participant ID to analyze: ",
        )
        .context("reading participant id")?,
    };
    let task = match cli.task {
        TaskArg::NBack => TaskKind::NBack,
        TaskArg::Stroop => TaskKind::Stroop,
    };
    let dir = cli.data_dir.unwrap_or_else(|| default_data_dir(task));

    match task {
        TaskKind::NBack => {
            let records: Vec<NBackRecord> = load_participant(&dir, &participant, task)?;
            println!("{}", summarize(&participant, &records)?);
        }
        TaskKind::Stroop => {
            let records: Vec<StroopRecord> = load_participant(&dir, &participant, task)?;
            let summary = summarize(&participant, &records)?;
            println!("Data Overview (response_time, seconds):");
            match &summary.response_times {
                Some(rt) => println!("{rt}\n"),
                None => println!("count 0\n"),
            }
            println!("{summary}");

            println!("\nAccuracy and Response Time by Word-Color Combination:");
            println!(
                "{:<8} {:<8} {:>6} {:>10} {:>10}",
                "word", "color", "trials", "accuracy", "mean rt"
            );
            for pair in by_word_color(&records) {
                println!("{pair}");
            }
            println!("\n{}", congruence(&records));
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        println!("An error occurred: {e:#}");
        std::process::exit(1);
    }
}
