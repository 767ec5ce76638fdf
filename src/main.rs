// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
mod cassette;
mod config;
mod controller;
mod media;
mod notes;
mod schedule;
mod side;
mod sink;
#[cfg(test)]
mod testutil;

use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::side::Side;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A two-sided cassette that reveals notes while it plays."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Starts the cassette player, controlled from the keyboard.
    Start {
        /// The path to the player config. Without one, the original tape is played.
        player_path: Option<PathBuf>,
    },
    /// Lists the notes on each side and when they are revealed.
    Notes {
        /// The path to the player config.
        player_path: Option<PathBuf>,
    },
    /// Verifies a player config.
    Verify {
        /// The path to the player config.
        player_path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start { player_path } => {
            config::init_controller(player_path.as_deref())?
                .join()
                .await?;
        }
        Commands::Notes { player_path } => {
            let player = config::parse_player(player_path.as_deref())?;
            print!("{}", player.notes());
        }
        Commands::Verify { player_path } => {
            let player = config::parse_player(Some(&player_path))?;
            let labels = player.labels();
            let media = player.media();
            let notes = player.notes();

            println!("{} is valid.", player_path.display());
            for side in Side::ALL {
                println!(
                    "- {} ({}): {:?}, {} notes",
                    labels[side].name,
                    labels[side].mood,
                    media[side],
                    notes.for_side(side).len()
                );
            }
        }
    }

    Ok(())
}
