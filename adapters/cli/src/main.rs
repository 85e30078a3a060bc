#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays scripted actions against a Burrow level.

mod level_file;
mod render;
mod script;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use burrow_core::Event;
use burrow_world::{query, World};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::session::Session;

/// Replays an action script against a level and prints the resulting board.
#[derive(Parser, Debug)]
#[command(author, version, about = "Burrow puzzle rule engine")]
struct Args {
    /// JSON file holding the level's entity records.
    level: PathBuf,
    /// TOML file overriding the rule configuration.
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Actions to replay, e.g. "r r gu fr z".
    #[arg(long, default_value = "")]
    script: String,
    /// Allows firing and undo without their pickups.
    #[arg(long)]
    free_play: bool,
    /// Writes the final records to this JSON file.
    #[arg(long)]
    save: Option<PathBuf>,
}

/// Entry point for the Burrow command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = level_file::load_config(args.rules.as_deref())?;
    let records = level_file::load_records(&args.level)?;
    let world = World::from_records(&records, config)
        .with_context(|| format!("invalid level {}", args.level.display()))?;
    let actions = script::parse(&args.script)?;
    tracing::info!(
        entities = records.len(),
        actions = actions.len(),
        "level loaded"
    );

    let mut session = Session::new(world, args.free_play);
    for action in actions {
        let outcome = session.perform(action);
        println!("> {action}");
        for event in outcome.events.iter().filter(|event| is_notable(event)) {
            println!("  {event:?}");
        }
        for cue in &outcome.cues {
            println!("  cue {cue:?}");
        }
    }

    let world = session.world();
    print!("{}", render::board(world));
    let stats = query::player_stats(world);
    println!(
        "fragments {} | max length {} | gate {}",
        stats.fragments(),
        stats.max_length(),
        if query::gate_complete(world) {
            "complete"
        } else {
            "incomplete"
        }
    );

    if let Some(path) = &args.save {
        level_file::save_records(path, &query::records(world))?;
    }
    Ok(())
}

/// Events worth echoing to the terminal; per-cell moves are left out.
fn is_notable(event: &Event) -> bool {
    !matches!(
        event,
        Event::EntityMoved { .. }
            | Event::MoveCommitted { .. }
            | Event::GravityStarted { .. }
            | Event::GravitySettled { .. }
    )
}
