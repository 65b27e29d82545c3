mod app;
mod cli;
mod config;
mod icon;
mod keys;

use anyhow::{Context, Result};
use app::{App, RunOutcome};
use clap::Parser;
use cli::{Cli, TaskArg};
use cogex_core::{ParticipantId, TaskKind};
use cogex_experiment::{FileSink, NBackTask, StroopTask, prompt_participant};
use cogex_render::load_font;
use config::AppConfig;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load(cli.config.as_deref())?;
    let participant = match &cli.participant {
        Some(raw) => ParticipantId::new(raw)?,
        None => prompt_participant(
            &mut std::io::stdin().lock(),
            &mut std::io::stdout(),
            "Enter participant ID: ",
        )
        .context("reading participant id")?,
    };
    let font = load_font(config.display.font_path.as_deref())?;
    let task_kind = TaskKind::from(cli.task);
    let session = config.session_config(task_kind, cli.trials);
    tracing::info!(%participant, task = %task_kind, trials = session.trial_count, "starting");

    let outcome = match cli.task {
        TaskArg::NBack => App::new(
            NBackTask::from_config(&config.n_back)?,
            session,
            participant,
            FileSink::new(config.n_back.output.clone()),
            font,
            config.display.clone(),
        )
        .run()?,
        TaskArg::Stroop => App::new(
            StroopTask::from_config(&config.stroop)?,
            session,
            participant,
            FileSink::new(config.stroop.output.clone()),
            font,
            config.display.clone(),
        )
        .run()?,
    };

    match outcome {
        RunOutcome::Completed(report) => {
            println!("\nExperiment completed.");
            println!("{} trials saved. Thank you!", report.records);
        }
        RunOutcome::Quit { unsaved } => {
            println!("\nExperiment stopped; {unsaved} completed trials were not saved.");
        }
    }
    Ok(())
}
