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
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use config::{Config, File, FileFormat};
use tracing::info;

use crate::cassette::PlaybackController;
use crate::controller::{keyboard, Controller};
use crate::side::Sides;
use crate::sink::{Terminal, TracingDiagnostics};

use self::error::ConfigError;

pub mod error;
mod media;
mod player;

pub use self::media::{track_duration, Media};
pub use self::player::Player;

/// Parses the player configuration from a YAML file. Without a file, the original tape is used.
pub fn parse_player(file: Option<&Path>) -> Result<Player, ConfigError> {
    let player: Player = match file {
        Some(file) => {
            info!(file = file.display().to_string(), "Loading player config.");
            Config::builder()
                .add_source(File::from(file).format(FileFormat::Yaml))
                .build()?
                .try_deserialize()?
        }
        None => Player::default(),
    };

    player.validate()?;
    Ok(player)
}

/// Parses the player configuration from a YAML string.
#[cfg(test)]
pub fn parse_player_str(yaml: &str) -> Result<Player, ConfigError> {
    let player: Player = Config::builder()
        .add_source(File::from_str(yaml, FileFormat::Yaml))
        .build()?
        .try_deserialize()?;
    player.validate()?;
    Ok(player)
}

/// Builds the playback controller from the given config file and wraps it in a controller driven
/// by the keyboard. The controller can be waited on until the user quits.
pub fn init_controller(player_path: Option<&Path>) -> Result<Controller, Box<dyn Error>> {
    let player = parse_player(player_path)?;
    let media_config = player.media();
    let media = Sides::try_from_fn(|side| crate::media::get_handle(side, &media_config[side]))?;

    let (cassette, deferred_rx) = PlaybackController::new(
        media,
        player.notes(),
        Arc::new(Terminal::stdout()),
        Arc::new(TracingDiagnostics::new()),
    );
    let cassette = cassette
        .with_labels(player.labels())
        .with_keepsakes(player.keepsakes());

    Ok(Controller::new(
        cassette,
        deferred_rx,
        Arc::new(keyboard::Driver::new()),
    ))
}

#[cfg(test)]
mod test {
    use std::{error::Error, io::Write};

    use crate::{
        cassette::Keepsakes,
        side::{Side, SideLabel},
    };

    use super::{error::ConfigError, parse_player, parse_player_str, Media};

    #[test]
    fn test_defaults() -> Result<(), Box<dyn Error>> {
        let player = parse_player(None)?;

        assert_eq!(Media::default(), player.media()[Side::A]);
        assert_eq!(4, player.notes().for_side(Side::B).len());
        assert_eq!(SideLabel::default_for(Side::A), player.labels()[Side::A]);
        assert_eq!(Keepsakes::default(), player.keepsakes());
        Ok(())
    }

    #[test]
    fn test_full_config() -> Result<(), Box<dyn Error>> {
        let player = parse_player_str(
            r#"
            sides:
              a:
                media:
                  kind: simulated
                  duration: 3m
                label: Morning
                mood: Slow
                notes:
                  - first
                  - second
              b:
                media:
                  kind: mock
            keepsakes:
              letter:
                title: Hi
                body: Hello there
        "#,
        )?;

        assert_eq!(
            Media::Simulated {
                duration: Some("3m".to_string())
            },
            player.media()[Side::A]
        );
        assert_eq!(Media::Mock, player.media()[Side::B]);

        let notes = player.notes();
        assert_eq!(
            vec!["first", "second"],
            notes.for_side(Side::A).iter().collect::<Vec<_>>()
        );
        // B's notes weren't given, so the defaults stay.
        assert_eq!(4, notes.for_side(Side::B).len());

        let labels = player.labels();
        assert_eq!("Morning", labels[Side::A].name);
        assert_eq!("Slow", labels[Side::A].mood);
        assert_eq!(SideLabel::default_for(Side::B), labels[Side::B]);

        let keepsakes = player.keepsakes();
        assert_eq!("Hi", keepsakes.letter.title);
        assert_eq!("Hello there", keepsakes.letter.body);
        assert_eq!(Keepsakes::default().eject, keepsakes.eject);
        Ok(())
    }

    #[test]
    fn test_invalid_duration() {
        let result = parse_player_str(
            r#"
            sides:
              b:
                media:
                  kind: simulated
                  duration: soon
        "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration { side: Side::B, .. })
        ));
    }

    #[test]
    fn test_unknown_media_kind() {
        let result = parse_player_str(
            r#"
            sides:
              a:
                media:
                  kind: vinyl
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_parse_file() -> Result<(), Box<dyn Error>> {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
        writeln!(file, "sides:\n  b:\n    label: Flip side")?;

        let player = parse_player(Some(file.path()))?;
        assert_eq!("Flip side", player.labels()[Side::B].name);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let result = parse_player(Some(std::path::Path::new("does/not/exist.yaml")));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
