use std::env;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use shiftlog::calendar::week_of;
use shiftlog::cli::{Cli, Command, read_events, write_events};
use shiftlog::config::ShiftlogConfig;
use shiftlog::{DailyActivity, InMemoryWorkEventStore, ShiftTracker, WorkCommand, WorkEvent};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ShiftlogConfig::load()?;
    init_tracing(&config, cli.verbose);

    let worker_id = cli.worker.clone().unwrap_or_else(|| config.worker_id.clone());

    match cli.command {
        Command::Replay { file } => {
            let events = read_events(&file)
                .with_context(|| format!("failed to load {}", file.display()))?;
            let day = events
                .first()
                .map_or_else(|| Local::now().date_naive(), WorkEvent::day);

            let activity = DailyActivity::from_events(worker_id, day, events)?;
            print_summary(&activity);
        }
        Command::Add {
            file,
            command,
            at,
            day,
        } => {
            let events = if file.exists() {
                read_events(&file)
                    .with_context(|| format!("failed to load {}", file.display()))?
            } else {
                Vec::new()
            };
            let day = day
                .or_else(|| events.first().map(WorkEvent::day))
                .unwrap_or_else(|| Local::now().date_naive());

            let mut activity = DailyActivity::from_events(worker_id, day, events)?;
            let status = activity.add_event(WorkEvent::new(command, day.and_time(at)))?;
            write_events(&file, activity.events())
                .with_context(|| format!("failed to write {}", file.display()))?;
            println!("{at}  {command:<12} -> {status}");
        }
        Command::Demo => run_demo(&worker_id).await?,
    }

    Ok(())
}

fn init_tracing(config: &ShiftlogConfig, verbose: bool) {
    let filter = EnvFilter::try_from_env("SHIFTLOG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "shiftlog=debug"
        } else {
            config.log_filter.as_str()
        })
    });

    let format = env::var("SHIFTLOG_LOG_FORMAT").unwrap_or_else(|_| config.log_format.clone());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

async fn run_demo(worker_id: &str) -> Result<()> {
    let tracker = ShiftTracker::new(InMemoryWorkEventStore::new());
    let today = Local::now().date_naive();

    let steps = [
        (WorkCommand::StartWork, 9),
        (WorkCommand::StartBreak, 12),
        (WorkCommand::EndBreak, 13),
        (WorkCommand::EndWork, 18),
    ];
    for (command, hour) in steps {
        let status = tracker.record(worker_id, command, at(today, hour)?).await?;
        println!("{}  {command:<12} -> {status}", at(today, hour)?.time());
    }

    if let Err(e) = tracker
        .record(worker_id, WorkCommand::StartBreak, at(today, 8)?)
        .await
    {
        println!("rejected: {e}");
    }

    let activity = tracker.day(worker_id, today).await?;
    print_summary(&activity);

    let week = week_of(today).context("current week is out of calendar range")?;
    let week = tracker.period(worker_id, &week).await?;
    for day in week {
        println!("{}  {}", day.day(), day.current_status());
    }
    Ok(())
}

fn at(day: NaiveDate, hour: u32) -> Result<chrono::NaiveDateTime> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0).context("invalid hour")?;
    Ok(day.and_time(time))
}

fn print_summary(activity: &DailyActivity) {
    println!("worker:   {}", activity.worker_id());
    println!("day:      {}", activity.day());
    println!("status:   {}", activity.current_status());
    if let Some(started) = activity.started_at() {
        println!("started:  {}", started.time());
    }
    if let Some(finished) = activity.finished_at() {
        println!("last:     {}", finished.time());
    }
    let worked = activity.worked_duration();
    println!(
        "worked:   {}h{:02}m",
        worked.num_hours(),
        worked.num_minutes() % 60
    );
}
