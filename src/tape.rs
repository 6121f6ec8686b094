//! The machine's read/write storage.
//!
//! The tape is conceptually infinite in both directions. Only the written range is stored:
//! a buffer of cells plus the logical position of its first cell. Reading outside that
//! range yields the blank symbol without growing anything, and writing one cell past
//! either end grows the buffer by exactly that cell.

use std::collections::VecDeque;
use std::fmt;

use crate::types::{Symbol, TuringMachineError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: VecDeque<Symbol>,
    /// Logical position of `cells[0]`. Only ever decreases, by one per leftward growth.
    origin: i64,
    blank: Symbol,
}

impl Tape {
    /// Creates a tape holding `symbols` at positions `0..symbols.len()`.
    pub fn new(symbols: impl IntoIterator<Item = Symbol>, blank: Symbol) -> Self {
        Self {
            cells: symbols.into_iter().collect(),
            origin: 0,
            blank,
        }
    }

    /// Maps a logical position to a buffer index, if it lies inside the written range.
    fn index(&self, position: i64) -> Option<usize> {
        let offset = position.checked_sub(self.origin)?;
        usize::try_from(offset)
            .ok()
            .filter(|&index| index < self.cells.len())
    }

    /// Returns the symbol at `position`, or the blank if that cell was never written.
    pub fn read(&self, position: i64) -> Symbol {
        self.index(position)
            .map(|index| self.cells[index])
            .unwrap_or(self.blank)
    }

    /// Writes `symbol` at `position`.
    ///
    /// Inside the written range the cell is overwritten. One cell past the right end the
    /// buffer is appended to, one cell before the left end it is prepended to. Anything
    /// further out would leave a gap and is rejected.
    pub fn write(&mut self, position: i64, symbol: Symbol) -> Result<(), TuringMachineError> {
        if let Some(index) = self.index(position) {
            self.cells[index] = symbol;
        } else if position == self.end() {
            self.cells.push_back(symbol);
        } else if position == self.origin - 1 {
            self.cells.push_front(symbol);
            self.origin -= 1;
        } else {
            return Err(TuringMachineError::TapeBoundary(position));
        }

        Ok(())
    }

    /// Logical position one past the last written cell.
    pub fn end(&self) -> i64 {
        self.origin + self.cells.len() as i64
    }

    /// Logical position of the first written cell.
    pub fn origin(&self) -> i64 {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The tape content with the trailing run of blanks removed.
    ///
    /// Leading and interior blanks are kept.
    pub fn trimmed(&self) -> String {
        self.to_string()
            .trim_end_matches(self.blank)
            .to_string()
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cells.iter().try_for_each(|symbol| write!(f, "{symbol}"))
    }
}
