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

use serde::Deserialize;

use super::error::ConfigError;
use super::media::Media;
use crate::cassette::{Keepsake, Keepsakes};
use crate::notes::{NoteSet, Notes};
use crate::side::{Side, SideLabel, Sides};

/// The configuration for the cassette player.
#[derive(Deserialize, Default)]
pub struct Player {
    /// Per-side configuration.
    #[serde(default)]
    sides: SidesConfig,
    /// The hidden messages.
    #[serde(default)]
    keepsakes: KeepsakesConfig,
}

#[derive(Deserialize, Default)]
struct SidesConfig {
    a: Option<SideConfig>,
    b: Option<SideConfig>,
}

/// The configuration for a single side. Anything left out falls back to the original tape.
#[derive(Deserialize, Default, Clone)]
struct SideConfig {
    /// The media that plays this side.
    media: Option<Media>,
    /// The name printed on the label.
    label: Option<String>,
    /// The mood printed under the name.
    mood: Option<String>,
    /// The notes revealed while the side plays, in reveal order.
    notes: Option<Vec<String>>,
}

#[derive(Deserialize, Default)]
struct KeepsakesConfig {
    letter: Option<KeepsakeConfig>,
    eject: Option<KeepsakeConfig>,
}

#[derive(Deserialize, Clone)]
struct KeepsakeConfig {
    title: String,
    body: String,
}

impl From<KeepsakeConfig> for Keepsake {
    fn from(config: KeepsakeConfig) -> Self {
        Keepsake {
            title: config.title,
            body: config.body,
        }
    }
}

impl Player {
    fn side(&self, side: Side) -> SideConfig {
        match side {
            Side::A => self.sides.a.clone(),
            Side::B => self.sides.b.clone(),
        }
        .unwrap_or_default()
    }

    /// Gets the media configuration for each side.
    pub fn media(&self) -> Sides<Media> {
        Sides::from_fn(|side| self.side(side).media.unwrap_or_default())
    }

    /// Gets the notes for both sides.
    pub fn notes(&self) -> Arc<Notes> {
        let notes = Sides::from_fn(|side| match self.side(side).notes {
            Some(notes) => NoteSet::new(notes),
            None => Notes::defaults_for(side),
        });
        Arc::new(Notes::new(notes.a, notes.b))
    }

    /// Gets the labels for both sides.
    pub fn labels(&self) -> Sides<SideLabel> {
        Sides::from_fn(|side| {
            let config = self.side(side);
            let default = SideLabel::default_for(side);
            SideLabel {
                name: config.label.unwrap_or(default.name),
                mood: config.mood.unwrap_or(default.mood),
            }
        })
    }

    /// Gets the keepsake messages.
    pub fn keepsakes(&self) -> Keepsakes {
        let default = Keepsakes::default();
        Keepsakes {
            letter: self
                .keepsakes
                .letter
                .clone()
                .map_or(default.letter, Keepsake::from),
            eject: self
                .keepsakes
                .eject
                .clone()
                .map_or(default.eject, Keepsake::from),
        }
    }

    /// Checks everything that can only be checked after parsing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for side in Side::ALL {
            self.media()[side].validate(side)?;
        }
        Ok(())
    }
}
