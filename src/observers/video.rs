//! Video output surface.
//!
//! The guest renders text by storing character codes into a contiguous range
//! read as a fixed-width grid, row-major. Byte 0 is drawn as a blank.

use std::any::Any;

use super::{BusWrite, ObserverError, WriteObserver};

/// Width of the guest text screen in characters.
pub const SCREEN_COLUMNS: usize = 40;

/// Height of the guest text screen in characters.
pub const SCREEN_ROWS: usize = 30;

/// Character grid the video surface draws into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextGrid {
    rows: usize,
    cols: usize,
    cells: Vec<char>,
}

impl TextGrid {
    /// Create a blank grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![' '; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Character at `row`, `col`, if inside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        (row < self.rows && col < self.cols).then(|| self.cells[row * self.cols + col])
    }

    /// Each row as a string.
    pub fn lines(&self) -> Vec<String> {
        self.cells
            .chunks(self.cols.max(1))
            .map(|row| row.iter().collect())
            .collect()
    }
}

/// Observer that maps stores into a [`TextGrid`].
///
/// # Examples
///
/// ```rust
/// use cerbemu::{MemoryBus, ObservableMemory, VideoSurface};
///
/// let mut memory = ObservableMemory::new();
/// let id = memory.subscribe(0xF800..0xF800 + 30 * 40, VideoSurface::new(30, 40)).unwrap();
/// memory.arm();
///
/// memory.write(0xF800 + 41, b'A');
///
/// let video = memory.observer::<VideoSurface>(id).unwrap();
/// assert_eq!(video.grid().get(1, 1), Some('A'));
/// ```
#[derive(Debug, Clone)]
pub struct VideoSurface {
    grid: TextGrid,
    dirty: bool,
}

impl VideoSurface {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            grid: TextGrid::new(rows, cols),
            dirty: true,
        }
    }

    pub fn grid(&self) -> &TextGrid {
        &self.grid
    }

    /// Returns whether the grid changed since the last call, and clears the mark.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Default for VideoSurface {
    fn default() -> Self {
        Self::new(SCREEN_ROWS, SCREEN_COLUMNS)
    }
}

impl WriteObserver for VideoSurface {
    fn on_write(&mut self, write: BusWrite) -> Result<(), ObserverError> {
        let cols = self.grid.cols;
        let offset = write.offset as usize;
        let cell = offset
            .checked_div(cols)
            .zip(offset.checked_rem(cols))
            .filter(|&(row, _)| row < self.grid.rows);
        let Some((row, col)) = cell else {
            return Err(ObserverError::OutOfBounds {
                offset: write.offset,
                rows: self.grid.rows,
                cols,
            });
        };
        let ch = match write.value {
            0 => ' ',
            code => char::from(code),
        };
        self.grid.cells[row * cols + col] = ch;
        self.dirty = true;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
