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
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, span, warn, Level, Span};

use crate::{
    media,
    notes::{NoteSet, Notes},
    schedule::Timers,
    side::{Side, SideLabel, Sides},
    sink::{DiagnosticSink, Signal, SignalSink},
};

/// Results that arrive after the operation that caused them has returned.
#[derive(Debug)]
pub enum Event {
    /// A start request was answered.
    StartResolved {
        side: Side,
        attempt: u64,
        result: Result<(), media::Error>,
    },
    /// A reveal timer fired.
    Reveal { session: u64, index: usize },
    /// A side's track played to its end.
    TrackEnded(Side),
}

/// The two static messages hidden in the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeepsakeKind {
    /// Opened from the headphone jack.
    Letter,
    /// Opened from the eject button.
    Eject,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Keepsake {
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Keepsakes {
    pub letter: Keepsake,
    pub eject: Keepsake,
}

impl Default for Keepsakes {
    fn default() -> Self {
        Keepsakes {
            letter: Keepsake {
                title: "A letter for you".to_string(),
                body: "Press play. Every note on this tape was written for you.".to_string(),
            },
            eject: Keepsake {
                title: "Nice try".to_string(),
                body: "This tape doesn't come out. It's yours to keep.".to_string(),
            },
        }
    }
}

/// An outstanding start request.
struct Start {
    attempt: u64,
    /// Set when the start continues playback after a side switch.
    resumed: bool,
}

/// Owns the side selection and the play state of the tape, and reveals the current side's
/// notes while it plays.
pub struct PlaybackController {
    current_side: Side,
    is_playing: bool,
    media: Sides<Arc<dyn media::Handle>>,
    notes: Arc<Notes>,
    labels: Sides<SideLabel>,
    keepsakes: Keepsakes,
    signals: Arc<dyn SignalSink>,
    diagnostics: Arc<dyn DiagnosticSink>,
    /// Deferred results are fed back to the controller through here.
    events_tx: mpsc::UnboundedSender<Event>,
    /// Pending reveals for the current session.
    reveals: Timers,
    /// Notes revealed in the current session, in reveal order.
    revealed: Vec<String>,
    /// Bumped whenever reveals are cancelled so fires already queued are dropped.
    session: u64,
    /// Bumped on every start request.
    attempt: u64,
    /// The start request whose answer is still wanted.
    starting: Option<Start>,
    span: Span,
}

impl PlaybackController {
    /// Creates a new controller on side A, paused. Deferred results for the controller arrive
    /// on the returned receiver and must be passed to handle.
    pub fn new(
        media: Sides<Arc<dyn media::Handle>>,
        notes: Arc<Notes>,
        signals: Arc<dyn SignalSink>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> (PlaybackController, mpsc::UnboundedReceiver<Event>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        for side in Side::ALL {
            tokio::spawn(PlaybackController::forward_finished(
                side,
                media[side].finished(),
                events_tx.clone(),
            ));
        }

        let controller = PlaybackController {
            current_side: Side::A,
            is_playing: false,
            media,
            notes,
            labels: Sides::from_fn(SideLabel::default_for),
            keepsakes: Keepsakes::default(),
            signals,
            diagnostics,
            events_tx,
            reveals: Timers::new(),
            revealed: Vec::new(),
            session: 0,
            attempt: 0,
            starting: None,
            span: span!(Level::INFO, "cassette"),
        };
        (controller, events_rx)
    }

    /// Replaces the side labels.
    pub fn with_labels(mut self, labels: Sides<SideLabel>) -> PlaybackController {
        self.labels = labels;
        self
    }

    /// Replaces the keepsake messages.
    pub fn with_keepsakes(mut self, keepsakes: Keepsakes) -> PlaybackController {
        self.keepsakes = keepsakes;
        self
    }

    /// Turns a handle's finished notifications into events.
    async fn forward_finished(
        side: Side,
        mut finished: broadcast::Receiver<()>,
        events_tx: mpsc::UnboundedSender<Event>,
    ) {
        loop {
            match finished.recv().await {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    if events_tx.send(Event::TrackEnded(side)).is_err() {
                        return;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    }

    pub fn current_side(&self) -> Side {
        self.current_side
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// The notes revealed so far in this session.
    pub fn revealed(&self) -> &[String] {
        &self.revealed
    }

    /// The number of scheduled reveals that haven't been revealed yet.
    pub fn pending_reveals(&self) -> usize {
        self.reveals.len().saturating_sub(self.revealed.len())
    }

    /// Handles a deferred result.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::StartResolved {
                side,
                attempt,
                result,
            } => self.start_resolved(side, attempt, result),
            Event::Reveal { session, index } => self.reveal(session, index),
            Event::TrackEnded(side) => self.on_track_ended(side),
        }
    }

    /// Starts the current side. The outcome is handled when its StartResolved event arrives.
    pub fn play(&mut self) {
        self.start(false);
    }

    fn start(&mut self, resumed: bool) {
        let span = self.span.clone();
        let _enter = span.enter();

        let side = self.current_side;
        // Only one side may ever be heard.
        self.media[side.other()].stop();

        self.attempt += 1;
        let attempt = self.attempt;
        self.starting = Some(Start { attempt, resumed });

        let handle = &self.media[side];
        info!(side = side.to_string(), attempt, handle = handle.to_string(), "Starting playback.");
        let start = handle.start();
        let handle_name = handle.to_string();
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match start.await {
                Ok(result) => result,
                Err(_) => Err(media::Error::Dropped(handle_name)),
            };
            if events_tx
                .send(Event::StartResolved {
                    side,
                    attempt,
                    result,
                })
                .is_err()
            {
                debug!(attempt, "Controller is gone, dropping start result.");
            }
        });
    }

    fn start_resolved(&mut self, side: Side, attempt: u64, result: Result<(), media::Error>) {
        let span = self.span.clone();
        let _enter = span.enter();

        let wanted = self
            .starting
            .as_ref()
            .is_some_and(|start| start.attempt == attempt);

        match result {
            Ok(()) if wanted => {
                self.starting = None;
                self.is_playing = true;
                info!(side = side.to_string(), "Playback started.");
                self.signals.signal(Signal::Started(side));
                self.schedule_notes();
            }
            Ok(()) => {
                let superseded_on_same_side =
                    side == self.current_side && (self.is_playing || self.starting.is_some());
                if superseded_on_same_side {
                    debug!(side = side.to_string(), attempt, "Ignoring outdated start.");
                } else {
                    info!(
                        side = side.to_string(),
                        attempt, "Outdated start succeeded, stopping it."
                    );
                    self.media[side].stop();
                }
            }
            Err(e) => {
                self.diagnostics.playback_failed(side, &e);
                if !wanted {
                    return;
                }
                let resumed = self.starting.take().is_some_and(|start| start.resumed);
                if resumed {
                    // The side switch already silenced the old side; show that nothing plays.
                    self.signals.signal(Signal::Stopped(side));
                }
            }
        }
    }

    /// Stops the current side and takes down its notes.
    pub fn pause(&mut self) {
        let span = self.span.clone();
        let _enter = span.enter();

        let side = self.current_side;
        self.media[side].stop();
        self.starting = None;
        self.is_playing = false;
        info!(side = side.to_string(), "Playback paused.");
        self.signals.signal(Signal::Stopped(side));
        self.cancel_scheduled_reveals();
    }

    pub fn toggle_play_pause(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Selects the given side. If the tape was playing, playback carries on with the new side.
    pub fn switch_side(&mut self, new_side: Side) {
        let span = self.span.clone();
        let _enter = span.enter();

        if new_side == self.current_side {
            debug!(side = new_side.to_string(), "Side already selected.");
            return;
        }

        let was_playing = self.is_playing;
        self.media[self.current_side].stop();
        self.starting = None;
        self.current_side = new_side;
        info!(side = new_side.to_string(), was_playing, "Switched side.");
        self.signals.signal(Signal::SideChanged {
            side: new_side,
            label: self.labels[new_side].clone(),
        });

        if was_playing {
            self.cancel_scheduled_reveals();
            self.is_playing = false;
            self.start(true);
        }
    }

    /// Handles a side's track playing to its end.
    pub fn on_track_ended(&mut self, side: Side) {
        if side != self.current_side {
            debug!(side = side.to_string(), "Ignoring end of the unselected side.");
            return;
        }
        if self.starting.is_some() || self.media[side].is_active() {
            // The side was started again after it ended.
            debug!(side = side.to_string(), "Ignoring outdated track end.");
            return;
        }
        info!(side = side.to_string(), "Track ended.");
        self.pause();
    }

    /// Schedules the current side's notes, one every NOTE_INTERVAL starting now.
    pub fn schedule_notes(&mut self) {
        self.cancel_scheduled_reveals();

        let session = self.session;
        let notes = self.notes.for_side(self.current_side);
        if notes.is_empty() {
            debug!(side = self.current_side.to_string(), "No notes on this side.");
            return;
        }
        let count = notes.len();
        for index in 0..count {
            let events_tx = self.events_tx.clone();
            self.reveals.schedule(NoteSet::reveal_offset(index), move || {
                let _ = events_tx.send(Event::Reveal { session, index });
            });
        }
        debug!(
            side = self.current_side.to_string(),
            session, count, "Scheduled notes."
        );
    }

    /// Cancels every pending reveal and clears the revealed notes.
    pub fn cancel_scheduled_reveals(&mut self) {
        if !self.reveals.is_empty() {
            debug!(
                session = self.session,
                scheduled = self.reveals.len(),
                revealed = self.revealed.len(),
                "Cancelling reveals."
            );
        }
        self.reveals.cancel_all();
        self.session += 1;
        self.revealed.clear();
        self.signals.signal(Signal::NotesCleared);
    }

    fn reveal(&mut self, session: u64, index: usize) {
        if session != self.session {
            debug!(session, index, "Dropping reveal from a cancelled session.");
            return;
        }

        let Some(text) = self.notes.for_side(self.current_side).get(index) else {
            warn!(index, "No note to reveal.");
            return;
        };
        let text = text.to_string();
        self.revealed.push(text.clone());
        self.signals.signal(Signal::NoteRevealed { index, text });
    }

    /// Shows one of the keepsake messages. Playback is untouched.
    pub fn open_keepsake(&self, kind: KeepsakeKind) {
        let keepsake = match kind {
            KeepsakeKind::Letter => &self.keepsakes.letter,
            KeepsakeKind::Eject => &self.keepsakes.eject,
        };
        self.signals.signal(Signal::Keepsake {
            title: keepsake.title.clone(),
            body: keepsake.body.clone(),
        });
    }
}
