// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
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
use std::io;

use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{info, span, warn, Level};

use super::Event;
use crate::cassette::KeepsakeKind;
use crate::side::Side;

const PLAY: &str = "play";
const PAUSE: &str = "pause";
const TOGGLE: &str = "toggle";
const SIDE_A: &str = "a";
const SIDE_B: &str = "b";
const LETTER: &str = "letter";
const EJECT: &str = "eject";
const QUIT: &str = "quit";

/// A controller that controls the cassette player using the keyboard.
pub struct Driver {}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }

    /// Reads a single command. Returns false once there is nothing more to read.
    fn monitor_io<R, W>(
        events_tx: &Sender<Event>,
        mut reader: R,
        mut writer: W,
    ) -> Result<bool, io::Error>
    where
        R: io::BufRead,
        W: io::Write,
    {
        write!(
            writer,
            "Command ({}, {}, {}, {}, {}, {}, {}, {}): ",
            PLAY, PAUSE, TOGGLE, SIDE_A, SIDE_B, LETTER, EJECT, QUIT,
        )?;
        writer.flush()?;
        let mut input: String = String::default();
        if reader.read_line(&mut input)? == 0 {
            events_tx
                .blocking_send(Event::Quit)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            return Ok(false);
        }

        let event = match input.trim().to_lowercase().as_str() {
            // An empty line is the quickest way to flip the tape between playing and paused.
            "" | TOGGLE => Event::Toggle,
            PLAY => Event::Play,
            PAUSE => Event::Pause,
            LETTER => Event::Keepsake(KeepsakeKind::Letter),
            EJECT => Event::Keepsake(KeepsakeKind::Eject),
            QUIT => Event::Quit,
            other => match other.parse::<Side>() {
                Ok(side) => Event::Side(side),
                Err(e) => {
                    warn!(input = input, err = e.to_string(), "Unrecognized input");
                    return Ok(true);
                }
            },
        };

        let quit = event == Event::Quit;
        events_tx
            .blocking_send(event)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(!quit)
    }
}

impl super::Driver for Driver {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "keyboard driver");
            let _enter = span.enter();

            info!("Keyboard driver started.");

            while Self::monitor_io(&events_tx, io::stdin().lock(), io::stdout())? {}
            info!("Keyboard driver stopped.");
            Ok(())
        })
    }
}
