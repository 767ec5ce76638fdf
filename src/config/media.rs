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
use std::time::Duration;

use duration_string::DurationString;
use serde::Deserialize;

use super::error::ConfigError;
use crate::side::Side;

const DEFAULT_TRACK_DURATION: &str = "2m";

/// A YAML representation of the media that plays a side.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Media {
    /// A handle that plays nothing and never ends on its own.
    Mock,
    /// A handle that plays silence for the given duration.
    Simulated {
        /// The length of the track (default: 2m).
        duration: Option<String>,
    },
}

impl Default for Media {
    fn default() -> Self {
        Media::Simulated { duration: None }
    }
}

impl Media {
    /// Checks that the media can be built for the given side.
    pub fn validate(&self, side: Side) -> Result<(), ConfigError> {
        match self {
            Media::Mock => Ok(()),
            Media::Simulated { duration } => track_duration(side, duration.as_deref()).map(|_| ()),
        }
    }
}

/// Parses the duration of a simulated track, falling back to the default length.
pub fn track_duration(side: Side, value: Option<&str>) -> Result<Duration, ConfigError> {
    let value = value.unwrap_or(DEFAULT_TRACK_DURATION);
    let duration: Duration = DurationString::from_string(value.to_string())
        .map_err(|e| ConfigError::InvalidDuration {
            side,
            value: value.to_string(),
            reason: e.to_string(),
        })?
        .into();
    if duration.is_zero() {
        return Err(ConfigError::EmptyTrack(side));
    }
    Ok(duration)
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::{config::error::ConfigError, side::Side};

    use super::{track_duration, Media};

    #[test]
    fn test_durations() {
        assert_eq!(
            Duration::from_secs(120),
            track_duration(Side::A, None).unwrap()
        );
        assert_eq!(
            Duration::from_secs(180),
            track_duration(Side::A, Some("3m")).unwrap()
        );
        assert!(Media::Mock.validate(Side::B).is_ok());
        assert!(Media::default().validate(Side::B).is_ok());
    }

    #[test]
    fn test_bad_durations() {
        assert!(matches!(
            track_duration(Side::B, Some("forever")),
            Err(ConfigError::InvalidDuration { side: Side::B, .. })
        ));
        assert!(matches!(
            track_duration(Side::A, Some("0s")),
            Err(ConfigError::EmptyTrack(Side::A))
        ));
        assert!(Media::Simulated {
            duration: Some("0s".to_string())
        }
        .validate(Side::A)
        .is_err());
    }
}
