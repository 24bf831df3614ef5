//! Grid geometry.
//!
//! Orthogonal neighborhoods, off-board direction counts, and the center
//! cells that are closed to initial placement.

/// Row/column offsets for up, down, left, right.
pub const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Returns the on-board orthogonal neighbors of `(row, col)`, in
/// up, down, left, right order.
pub fn neighbors(size: usize, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
    DIRECTIONS.iter().filter_map(move |&(dr, dc)| {
        let r = row.checked_add_signed(dr)?;
        let c = col.checked_add_signed(dc)?;
        (r < size && c < size).then_some((r, c))
    })
}

/// Returns how many of the four orthogonal directions leave the board.
/// Corners have 2, edges 1, interior cells 0.
pub fn off_board_directions(size: usize, row: usize, col: usize) -> u8 {
    4 - neighbors(size, row, col).count() as u8
}

/// Returns true if `(row, col)` is one of the center cells closed to
/// initial placement.
///
/// Even sizes exclude the central 2x2 block; odd sizes exclude the center
/// cell and its four orthogonal neighbors.
pub fn is_excluded_center(size: usize, row: usize, col: usize) -> bool {
    let mid = size / 2;
    if size % 2 == 0 {
        (row == mid - 1 || row == mid) && (col == mid - 1 || col == mid)
    } else {
        (row == mid && col.abs_diff(mid) <= 1) || (col == mid && row.abs_diff(mid) <= 1)
    }
}

/// Lists the excluded center cells for a board of `size`.
pub fn excluded_center(size: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::with_capacity(5);
    for row in 0..size {
        for col in 0..size {
            if is_excluded_center(size, row, col) {
                out.push((row, col));
            }
        }
    }
    out
}
