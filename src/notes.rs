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
use std::{fmt, time::Duration};

use crate::side::{Side, Sides};

/// The gap between two consecutive note reveals.
pub const NOTE_INTERVAL: Duration = Duration::from_millis(22_000);

const SIDE_A_NOTES: [&str; 4] = [
    "Remember that rainy afternoon when we couldn't stop laughing at absolutely nothing?",
    "Your smile is still my favorite thing in the world.",
    "Thank you for being patient with me, even when I'm being impossible.",
    "Every playlist I make reminds me of you.",
];

const SIDE_B_NOTES: [&str; 4] = [
    "That time you tried to cook and we ended up ordering pizza anyway? Classic.",
    "I love how you dance when you think no one's watching.",
    "Our inside jokes are better than anyone else's actual jokes.",
    "You make the chaotic moments feel like adventures.",
];

/// The ordered notes for a single side. The order is the reveal order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteSet {
    notes: Vec<String>,
}

impl NoteSet {
    pub fn new(notes: Vec<String>) -> NoteSet {
        NoteSet { notes }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.notes.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.notes.iter().map(String::as_str)
    }

    /// How long after the start of a session the note at index is revealed.
    pub fn reveal_offset(index: usize) -> Duration {
        NOTE_INTERVAL * index as u32
    }
}

impl From<&[&str]> for NoteSet {
    fn from(notes: &[&str]) -> Self {
        NoteSet::new(notes.iter().map(|note| note.to_string()).collect())
    }
}

/// The notes for both sides of the tape. Read only once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Notes {
    sides: Sides<NoteSet>,
}

impl Notes {
    pub fn new(a: NoteSet, b: NoteSet) -> Notes {
        Notes {
            sides: Sides::new(a, b),
        }
    }

    /// Gets the notes for the given side.
    pub fn for_side(&self, side: Side) -> &NoteSet {
        &self.sides[side]
    }

    /// The notes that ship with the tape for the given side.
    pub fn defaults_for(side: Side) -> NoteSet {
        match side {
            Side::A => NoteSet::from(&SIDE_A_NOTES[..]),
            Side::B => NoteSet::from(&SIDE_B_NOTES[..]),
        }
    }
}

impl Default for Notes {
    fn default() -> Self {
        Notes::new(Notes::defaults_for(Side::A), Notes::defaults_for(Side::B))
    }
}

impl fmt::Display for Notes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for side in Side::ALL {
            let notes = self.for_side(side);
            writeln!(f, "Side {} (count: {}):", side, notes.len())?;
            for (index, note) in notes.iter().enumerate() {
                let offset = NoteSet::reveal_offset(index).as_secs();
                writeln!(f, "- {:>2}:{:02} {}", offset / 60, offset % 60, note)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::side::Side;

    use super::{NoteSet, Notes};

    #[test]
    fn test_reveal_offsets() {
        assert_eq!(Duration::ZERO, NoteSet::reveal_offset(0));
        assert_eq!(Duration::from_secs(22), NoteSet::reveal_offset(1));
        assert_eq!(Duration::from_secs(66), NoteSet::reveal_offset(3));
    }

    #[test]
    fn test_default_notes() {
        let notes = Notes::default();
        assert_eq!(4, notes.for_side(Side::A).len());
        assert_eq!(4, notes.for_side(Side::B).len());
        assert_eq!(
            Some("Every playlist I make reminds me of you."),
            notes.for_side(Side::A).get(3)
        );
        assert!(notes.for_side(Side::B).get(4).is_none());
    }

    #[test]
    fn test_display() {
        let notes = Notes::new(NoteSet::from(&["x", "y"][..]), NoteSet::default());
        assert_eq!(
            "Side A (count: 2):\n-  0:00 x\n-  0:22 y\nSide B (count: 0):\n",
            notes.to_string()
        );
    }
}
