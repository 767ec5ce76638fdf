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
use std::{fmt, sync::Arc};

use tokio::sync::{broadcast, oneshot};

use crate::config::{self, error::ConfigError};
use crate::side::Side;

pub mod mock;
pub mod simulated;

/// Errors reported when a side can't be started.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The handle refused to start playback.
    #[error("{handle} refused to start: {reason}")]
    StartFailed { handle: String, reason: String },

    /// The handle dropped the start request without answering it.
    #[error("{0} dropped the start request")]
    Dropped(String),
}

/// The result of a start request. Resolved exactly once.
pub type StartResult = oneshot::Receiver<Result<(), Error>>;

/// A media handle plays the track for a single side.
pub trait Handle: fmt::Display + Send + Sync {
    /// Begins playback. The outcome arrives on the returned receiver.
    fn start(&self) -> StartResult;

    /// Stops playback. Stopping a handle that isn't playing does nothing.
    fn stop(&self);

    /// Subscribes to the notification sent when the track plays to its end.
    fn finished(&self) -> broadcast::Receiver<()>;

    /// Returns true while the handle is producing audio.
    fn is_active(&self) -> bool;
}

/// Gets the media handle for the given side from its configuration.
pub fn get_handle(side: Side, config: &config::Media) -> Result<Arc<dyn Handle>, ConfigError> {
    let name = format!("side-{}", side.to_string().to_lowercase());
    Ok(match config {
        config::Media::Mock => Arc::new(mock::Handle::get(&name)),
        config::Media::Simulated { duration } => Arc::new(simulated::Handle::new(
            &name,
            config::track_duration(side, duration.as_deref())?,
        )),
    })
}
