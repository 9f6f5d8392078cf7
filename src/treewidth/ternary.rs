//! Base-3 encodings of bag colorings: one trit per bag position.

/// Largest supported bag size; 3^19 still fits comfortably in a usize.
pub const MAX_EXPONENT: usize = 19;

pub const POW3: [usize; MAX_EXPONENT + 1] = {
    let mut table = [1_usize; MAX_EXPONENT + 1];
    let mut i = 1;
    while i <= MAX_EXPONENT {
        table[i] = 3 * table[i - 1];
        i += 1;
    }
    table
};

/// Per-vertex state of the coloring DP. WHITE is not taken and not yet
/// dominated, GRAY is not taken but already dominated, BLACK is taken.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    White,
    Gray,
    Black,
}

impl Color {
    fn from_trit(trit: usize) -> Self {
        match trit {
            0 => Color::White,
            1 => Color::Gray,
            _ => Color::Black,
        }
    }

    fn trit(self) -> usize {
        self as usize
    }
}

/// A coloring of a bag, encoded as little-endian trits.
pub type TernaryFun = usize;

/// Removes the trit at position `x`, shifting the higher ones down.
pub fn cut(f: TernaryFun, x: usize) -> TernaryFun {
    debug_assert!(x < MAX_EXPONENT);
    let pref = f % POW3[x];
    let suf = f / POW3[x + 1] * POW3[x];
    pref + suf
}

/// Inserts `c` at position `x`, shifting the higher trits up.
pub fn insert(f: TernaryFun, x: usize, c: Color) -> TernaryFun {
    debug_assert!(x < MAX_EXPONENT);
    let pref = f % POW3[x];
    let suf = (f - pref) * 3;
    pref + suf + c.trit() * POW3[x]
}

/// Replaces the trit at position `x` with `c`.
pub fn set(f: TernaryFun, x: usize, c: Color) -> TernaryFun {
    debug_assert!(x < MAX_EXPONENT);
    f - at(f, x).trit() * POW3[x] + c.trit() * POW3[x]
}

/// Reads the trit at position `x`.
pub fn at(f: TernaryFun, x: usize) -> Color {
    debug_assert!(x <= MAX_EXPONENT);
    Color::from_trit(f / POW3[x] % 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        // f = (White, Black, Gray) little-endian: 0 + 2*3 + 1*9 = 15.
        let f: TernaryFun = 15;
        assert_eq!(at(f, 0), Color::White);
        assert_eq!(at(f, 1), Color::Black);
        assert_eq!(at(f, 2), Color::Gray);

        assert_eq!(set(f, 0, Color::Gray), 16);
        assert_eq!(set(f, 1, Color::White), 9);
        assert_eq!(set(f, 2, Color::Gray), f);

        // Cutting position 1 leaves (White, Gray).
        assert_eq!(cut(f, 1), 3);
        // Re-inserting Black at position 1 restores f.
        assert_eq!(insert(cut(f, 1), 1, Color::Black), f);
    }

    #[test]
    fn insert_at_end_appends() {
        let f: TernaryFun = 5; // (Gray, Gray)
        assert_eq!(insert(f, 2, Color::Black), 5 + 2 * 9);
        assert_eq!(insert(f, 0, Color::White), 15);
    }

    #[test]
    fn pow3_table() {
        assert_eq!(POW3[0], 1);
        assert_eq!(POW3[3], 27);
        assert_eq!(POW3[MAX_EXPONENT], 1_162_261_467);
    }
}
