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
use std::io;

use parking_lot::Mutex;
use tracing::error;

use crate::{
    media,
    side::{Side, SideLabel},
};

/// Notifications sent to whatever draws the player.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    /// The side started playing.
    Started(Side),
    /// Playback stopped on the side.
    Stopped(Side),
    /// The selected side changed.
    SideChanged { side: Side, label: SideLabel },
    /// A note was revealed.
    NoteRevealed { index: usize, text: String },
    /// All revealed notes were taken down.
    NotesCleared,
    /// A keepsake message was opened.
    Keepsake { title: String, body: String },
}

/// Receives UI signals from the player.
pub trait SignalSink: Send + Sync {
    fn signal(&self, signal: Signal);
}

/// Receives playback failures.
pub trait DiagnosticSink: Send + Sync {
    fn playback_failed(&self, side: Side, error: &media::Error);
}

/// Reports playback failures through tracing.
pub struct TracingDiagnostics {}

impl TracingDiagnostics {
    pub fn new() -> TracingDiagnostics {
        TracingDiagnostics {}
    }
}

impl DiagnosticSink for TracingDiagnostics {
    fn playback_failed(&self, side: Side, error: &media::Error) {
        error!(side = side.to_string(), err = error.to_string(), "Playback failed.");
    }
}

/// Draws the player as lines of text.
pub struct Terminal<W: io::Write + Send> {
    writer: Mutex<W>,
}

impl Terminal<io::Stdout> {
    pub fn stdout() -> Terminal<io::Stdout> {
        Terminal::new(io::stdout())
    }
}

impl<W: io::Write + Send> Terminal<W> {
    pub fn new(writer: W) -> Terminal<W> {
        Terminal {
            writer: Mutex::new(writer),
        }
    }

    fn render(signal: &Signal) -> String {
        match signal {
            Signal::Started(side) => format!("> Playing side {}", side),
            Signal::Stopped(side) => format!("|| Paused side {}", side),
            Signal::SideChanged { side, label } if label.name.is_empty() => {
                format!("[Side {}]", side)
            }
            Signal::SideChanged { label, .. } => format!("[{} | {}]", label.name, label.mood),
            Signal::NoteRevealed { index, text } => format!("  note {}: {}", index + 1, text),
            Signal::NotesCleared => String::new(),
            Signal::Keepsake { title, body } => format!("~ {} ~\n{}", title, body),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: io::Write + Send> SignalSink for Terminal<W> {
    fn signal(&self, signal: Signal) {
        let line = Self::render(&signal);
        if line.is_empty() {
            return;
        }

        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            error!(err = e.to_string(), "Error drawing the player");
        }
    }
}

/// Records everything it is sent.
#[cfg(test)]
#[derive(Default)]
pub struct Recorder {
    signals: Mutex<Vec<Signal>>,
    failures: Mutex<Vec<(Side, String)>>,
}

#[cfg(test)]
impl Recorder {
    pub fn new() -> Recorder {
        Recorder::default()
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.signals.lock().clone()
    }

    /// The text of every note revealed so far, in order.
    pub fn revealed(&self) -> Vec<String> {
        self.signals
            .lock()
            .iter()
            .filter_map(|signal| match signal {
                Signal::NoteRevealed { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Counts the signals matching the predicate.
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Signal) -> bool,
    {
        self.signals.lock().iter().filter(|s| predicate(s)).count()
    }

    pub fn failures(&self) -> Vec<(Side, String)> {
        self.failures.lock().clone()
    }
}

#[cfg(test)]
impl SignalSink for Recorder {
    fn signal(&self, signal: Signal) {
        self.signals.lock().push(signal);
    }
}

#[cfg(test)]
impl DiagnosticSink for Recorder {
    fn playback_failed(&self, side: Side, error: &media::Error) {
        self.failures.lock().push((side, error.to_string()));
    }
}

#[cfg(test)]
mod test {
    use crate::side::{Side, SideLabel};

    use super::{Signal, SignalSink, Terminal};

    #[test]
    fn test_terminal_rendering() {
        let terminal = Terminal::new(Vec::new());
        terminal.signal(Signal::SideChanged {
            side: Side::B,
            label: SideLabel::default_for(Side::B),
        });
        terminal.signal(Signal::Started(Side::B));
        terminal.signal(Signal::NoteRevealed {
            index: 0,
            text: "hello".to_string(),
        });
        terminal.signal(Signal::NotesCleared);
        terminal.signal(Signal::Stopped(Side::B));

        let output = String::from_utf8(terminal.into_inner()).unwrap();
        assert_eq!(
            "[Side B | Chaotic / Goofy]\n> Playing side B\n  note 1: hello\n|| Paused side B\n",
            output
        );
    }
}
