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
use std::{fmt, ops::Index, str::FromStr};

/// One of the two sides of the tape. Each side has its own media and its own notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// Both sides, in tape order.
    pub const ALL: [Side; 2] = [Side::A, Side::B];

    /// Returns the side that isn't this one.
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown side '{0}', expected 'a' or 'b'")]
pub struct ParseSideError(String);

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a" => Ok(Side::A),
            "b" => Ok(Side::B),
            _ => Err(ParseSideError(s.to_string())),
        }
    }
}

/// A value held once per side.
#[derive(Clone, Debug, PartialEq)]
pub struct Sides<T> {
    pub a: T,
    pub b: T,
}

impl<T> Sides<T> {
    pub fn new(a: T, b: T) -> Sides<T> {
        Sides { a, b }
    }

    /// Builds a value for each side from the given function.
    pub fn from_fn<F>(mut f: F) -> Sides<T>
    where
        F: FnMut(Side) -> T,
    {
        Sides {
            a: f(Side::A),
            b: f(Side::B),
        }
    }

    /// Like from_fn, but stops on the first error.
    pub fn try_from_fn<F, E>(mut f: F) -> Result<Sides<T>, E>
    where
        F: FnMut(Side) -> Result<T, E>,
    {
        Ok(Sides {
            a: f(Side::A)?,
            b: f(Side::B)?,
        })
    }
}

impl<T> Index<Side> for Sides<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }
}

/// How a side is presented: its name and the mood of the mix.
#[derive(Clone, Debug, PartialEq)]
pub struct SideLabel {
    pub name: String,
    pub mood: String,
}

impl SideLabel {
    /// The label printed on the original tape for the given side.
    pub fn default_for(side: Side) -> SideLabel {
        SideLabel {
            name: format!("Side {}", side),
            mood: match side {
                Side::A => "Soft / Sappy",
                Side::B => "Chaotic / Goofy",
            }
            .to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_side() {
        assert_eq!(Side::A, "a".parse::<Side>().unwrap());
        assert_eq!(Side::B, " B ".parse::<Side>().unwrap());
        assert!("c".parse::<Side>().is_err());
    }

    #[test]
    fn test_other_side() {
        assert_eq!(Side::B, Side::A.other());
        assert_eq!(Side::A, Side::B.other());
    }

    #[test]
    fn test_sides_index() {
        let sides = Sides::from_fn(|side| side.to_string());
        assert_eq!("A", sides[Side::A]);
        assert_eq!("B", sides[Side::B]);

        let failed: Result<Sides<u8>, String> = Sides::try_from_fn(|side| match side {
            Side::A => Ok(1),
            Side::B => Err("no".to_string()),
        });
        assert!(failed.is_err());
    }

    #[test]
    fn test_default_labels() {
        let label = SideLabel::default_for(Side::B);
        assert_eq!("Side B", label.name);
        assert_eq!("Chaotic / Goofy", label.mood);
    }
}
