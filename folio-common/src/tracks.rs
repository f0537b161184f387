//! Track registry operations on the ordered track list

use std::str::FromStr;

use crate::models::{TrackRecord, TracksDocument};
use crate::{Error, Result};

/// Longest title accepted from the admin panel, in characters
pub const MAX_TITLE_CHARS: usize = 200;

/// Direction of a single reorder step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(Error::InvalidInput("Invalid direction".to_string())),
        }
    }
}

/// Outcome of adding an uploaded file to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// New record appended at the end
    Appended,
    /// A record with the same filename existed and was updated in place
    Replaced,
}

/// Trim and bound a title supplied by the operator
pub fn normalize_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidInput("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(Error::InvalidInput(format!(
            "Title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(title.to_string())
}

impl TracksDocument {
    pub fn position(&self, filename: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.filename == filename)
    }

    /// Register an uploaded file
    ///
    /// A filename that is already registered keeps its position and gets the
    /// new title, so re-uploading never produces duplicate records.
    pub fn register(&mut self, record: TrackRecord) -> Registration {
        match self.position(&record.filename) {
            Some(index) => {
                self.tracks[index].title = record.title;
                Registration::Replaced
            }
            None => {
                self.tracks.push(record);
                Registration::Appended
            }
        }
    }

    /// Remove a record; an unknown filename is an error
    pub fn remove(&mut self, filename: &str) -> Result<TrackRecord> {
        let index = self
            .position(filename)
            .ok_or_else(|| Error::NotFound("Track not found".to_string()))?;
        Ok(self.tracks.remove(index))
    }

    pub fn rename(&mut self, filename: &str, title: &str) -> Result<()> {
        let title = normalize_title(title)?;
        let index = self
            .position(filename)
            .ok_or_else(|| Error::NotFound("Track not found".to_string()))?;
        self.tracks[index].title = title;
        Ok(())
    }

    /// Swap a record with its neighbour
    ///
    /// Returns `false` when the record already sits at the requested end;
    /// the list is left unchanged in that case.
    pub fn move_track(&mut self, filename: &str, direction: Direction) -> Result<bool> {
        let index = self
            .position(filename)
            .ok_or_else(|| Error::NotFound("Track not found".to_string()))?;

        let target = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.tracks.len() => index + 1,
            _ => return Ok(false),
        };
        self.tracks.swap(index, target);
        Ok(true)
    }
}
