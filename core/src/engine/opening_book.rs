//! An opening book for Connect Four, storing pre-computed exact scores for early-game positions.

use crate::Position;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// An error arising from reading or writing an opening book file.
#[derive(Debug)]
pub enum BookIoError {
    /// An underlying read/write failure.
    Io(std::io::Error),
    /// The file's size is not of the form `9n + 1`.
    CorruptBook { size: u64 },
}

impl Display for BookIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BookIoError::Io(e) => write!(f, "opening book I/O error: {e}"),
            BookIoError::CorruptBook { size } => {
                write!(f, "corrupt opening book: file size {size} is not of the form 9n + 1")
            }
        }
    }
}

impl Error for BookIoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BookIoError::Io(e) => Some(e),
            BookIoError::CorruptBook { .. } => None,
        }
    }
}

impl From<std::io::Error> for BookIoError {
    fn from(e: std::io::Error) -> BookIoError {
        BookIoError::Io(e)
    }
}

/// A cache that stores pre-computed exact scores for opening game positions, generated up to
/// a fixed ply depth.
///
/// The book is a `HashMap` from a position's key to its exact score. Lookups also try the
/// horizontal-mirror fingerprint, halving the number of entries a generator needs to store.
#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    pub map: HashMap<u64, i8>,
    pub depth: i8,
}

impl OpeningBook {
    /// Creates a new, empty opening book for the given depth.
    pub fn new(depth: i8) -> OpeningBook {
        OpeningBook { map: HashMap::new(), depth }
    }

    /// Looks up a position's score in the opening book.
    ///
    /// Returns `None` if the position is played past the book's depth, or if neither the
    /// position's key nor its mirrored key is present.
    #[inline(always)]
    pub fn get(&self, position: &Position) -> Option<i8> {
        if position.get_moves() as i8 > self.depth {
            return None;
        }

        self.map
            .get(&position.get_key())
            .or_else(|| self.map.get(&position.get_mirrored_key()))
            .copied()
    }

    /// Saves the opening book to a file.
    ///
    /// The file starts with a single signed byte holding the book's depth, followed by one
    /// 9-byte record per entry (an 8-byte little-endian key and a signed score byte), in
    /// ascending order of key.
    pub fn save(&self, path: &Path) -> Result<(), BookIoError> {
        let mut file = File::create(path)?;

        file.write_all(&[self.depth as u8])?;

        let mut keys: Vec<&u64> = self.map.keys().collect();
        keys.sort_unstable();

        for key in keys {
            let score = self.map[key];
            file.write_all(&key.to_le_bytes())?;
            file.write_all(&[score as u8])?;
        }

        Ok(())
    }

    /// Loads an opening book from a binary file written by [`OpeningBook::save`].
    ///
    /// # Errors
    ///
    /// Returns [`BookIoError::CorruptBook`] if the file's size is not of the form `9n + 1`.
    pub fn load(path: &Path) -> Result<OpeningBook, BookIoError> {
        let mut file = File::open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        if bytes.is_empty() || (bytes.len() - 1) % 9 != 0 {
            return Err(BookIoError::CorruptBook { size: bytes.len() as u64 });
        }

        let depth = bytes[0] as i8;
        let mut map = HashMap::with_capacity((bytes.len() - 1) / 9);

        for record in bytes[1..].chunks_exact(9) {
            let key = u64::from_le_bytes(record[0..8].try_into().unwrap());
            let score = record[8] as i8;
            map.insert(key, score);
        }

        Ok(OpeningBook { map, depth })
    }
}
