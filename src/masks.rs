use bit_set::BitSet;

use crate::coordinates::GridPosition;
use crate::units::{ColumnIndex, Height, RowIndex, Width};

/// A 2D on/off mask deciding which grid positions may hold nodes.
///
/// Source data is laid out in rows, so a value is looked up as `rows[y][x]`: row = y, column = x.
#[derive(Debug, Clone)]
pub struct BinaryMask2D {
    // a bit in the set means masked off
    mask: BitSet,
    pub width: usize,
    pub height: usize,
}

impl BinaryMask2D {
    /// Builds a mask from rows of legality flags, `true` meaning the cell may hold a node.
    ///
    /// The width is the longest row; cells missing from shorter rows are masked off.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> BinaryMask2D {
        let height = rows.len();
        let width = rows.iter().map(|row| row.as_ref().len()).max().unwrap_or(0);

        BinaryMask2D::from_fn(Width(width), Height(height), |x, y| {
            rows[y].as_ref().get(x).cloned().unwrap_or(false)
        })
    }

    /// Builds a mask by asking `is_valid(x, y)` about every cell.
    pub fn from_fn<F>(width: Width, height: Height, mut is_valid: F) -> BinaryMask2D
        where F: FnMut(usize, usize) -> bool
    {
        let (Width(w), Height(h)) = (width, height);
        let mut mask = BitSet::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                if !is_valid(x, y) {
                    mask.insert(y * w + x);
                }
            }
        }

        BinaryMask2D {
            mask,
            width: w,
            height: h,
        }
    }

    /// Is the given position masked out / turned off?
    ///
    /// Positions outside of the mask's own bounds are masked.
    pub fn is_masked(&self, position: GridPosition) -> bool {
        match self.bit_index(position) {
            Some(bit_index) => self.mask.contains(bit_index),
            None => true,
        }
    }

    #[inline]
    pub fn is_valid(&self, position: GridPosition) -> bool {
        !self.is_masked(position)
    }

    pub fn count_unmasked(&self) -> usize {
        self.width * self.height - self.mask.len()
    }

    pub fn first_unmasked_position(&self) -> Option<GridPosition> {
        // The bitset iterator yields masked indices only, so scan for the first gap.
        (0..self.width * self.height)
            .find(|bit_index| !self.mask.contains(*bit_index))
            .map(|i| {
                GridPosition::from_row_column_indices(ColumnIndex(i % self.width),
                                                      RowIndex(i / self.width))
            })
    }

    fn bit_index(&self, position: GridPosition) -> Option<usize> {
        if position.x < 0 || position.y < 0 {
            return None;
        }
        let (x, y) = (position.x as usize, position.y as usize);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gp(x: i32, y: i32) -> GridPosition {
        GridPosition::new(x, y)
    }

    #[test]
    fn rows_are_y_columns_are_x() {
        // 3 wide, 2 high: only (2, 0) and (0, 1) are open
        let mask = BinaryMask2D::from_rows(&[vec![false, false, true], vec![true, false, false]]);
        assert_eq!(mask.width, 3);
        assert_eq!(mask.height, 2);
        assert!(mask.is_valid(gp(2, 0)));
        assert!(mask.is_valid(gp(0, 1)));
        assert!(mask.is_masked(gp(0, 2)));
        assert!(mask.is_masked(gp(1, 0)));
        assert_eq!(mask.count_unmasked(), 2);
    }

    #[test]
    fn outside_bounds_is_masked() {
        let mask = BinaryMask2D::from_fn(Width(2), Height(2), |_, _| true);
        assert!(mask.is_valid(gp(1, 1)));
        assert!(mask.is_masked(gp(2, 0)));
        assert!(mask.is_masked(gp(0, 2)));
        assert!(mask.is_masked(gp(-1, 0)));
    }

    #[test]
    fn ragged_rows_mask_missing_cells() {
        let mask = BinaryMask2D::from_rows(&[vec![true, true], vec![true]]);
        assert_eq!(mask.width, 2);
        assert!(mask.is_masked(gp(1, 1)));
        assert!(mask.is_valid(gp(0, 1)));
    }

    #[test]
    fn first_unmasked() {
        let mask = BinaryMask2D::from_fn(Width(3), Height(4), |x, y| x == 1 && y == 2);
        assert_eq!(mask.first_unmasked_position(), Some(gp(1, 2)));

        let closed = BinaryMask2D::from_fn(Width(3), Height(3), |_, _| false);
        assert_eq!(closed.first_unmasked_position(), None);
        assert_eq!(closed.count_unmasked(), 0);
    }
}
