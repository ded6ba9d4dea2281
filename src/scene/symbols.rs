//! Dot-matrix symbol tables used by [`crate::Grid`].

use std::collections::HashMap;

use crate::foundation::error::{DotweaveError, DotweaveResult};

/// Bit set of connection directions from a symbol cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Links(u8);

impl Links {
    /// No links.
    pub const NONE: Self = Self(0);
    /// Up.
    pub const N: Self = Self(1);
    /// Up-right.
    pub const NE: Self = Self(1 << 1);
    /// Right.
    pub const E: Self = Self(1 << 2);
    /// Down-right.
    pub const SE: Self = Self(1 << 3);
    /// Down.
    pub const S: Self = Self(1 << 4);
    /// Down-left.
    pub const SW: Self = Self(1 << 5);
    /// Left.
    pub const W: Self = Self(1 << 6);
    /// Up-left.
    pub const NW: Self = Self(1 << 7);

    const OFFSETS: [(Self, i32, i32); 8] = [
        (Self::N, 0, -1),
        (Self::NE, 1, -1),
        (Self::E, 1, 0),
        (Self::SE, 1, 1),
        (Self::S, 0, 1),
        (Self::SW, -1, 1),
        (Self::W, -1, 0),
        (Self::NW, -1, -1),
    ];

    /// Raw bits.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Return `true` when every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Cell offsets `(dx, dy)` of every set direction.
    pub fn offsets(self) -> impl Iterator<Item = (i32, i32)> {
        Self::OFFSETS
            .into_iter()
            .filter(move |(l, _, _)| self.contains(*l))
            .map(|(_, dx, dy)| (dx, dy))
    }
}

impl std::ops::BitOr for Links {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Links {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// One dot of a symbol: its cell (row-major index) and outgoing links.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolDot {
    /// Row-major cell index in the symbol matrix.
    pub cell: u16,
    /// Directions this dot connects to.
    pub links: Links,
}

/// Symbol table: a fixed-size dot matrix per character.
#[derive(Clone, Debug)]
pub struct Symbols {
    width: u16,
    height: u16,
    defs: HashMap<char, Vec<SymbolDot>>,
}

impl Symbols {
    /// Empty table of `width` x `height` symbols.
    pub fn new(width: u16, height: u16) -> DotweaveResult<Self> {
        if width == 0 || height == 0 {
            return Err(DotweaveError::validation(format!(
                "symbol size {width}x{height} is empty"
            )));
        }
        Ok(Self {
            width,
            height,
            defs: HashMap::new(),
        })
    }

    /// Build a table from text bitmaps, one row per string, `#` marking a dot.
    ///
    /// Links are derived from neighbors: right and down always, diagonals only when both cells
    /// between them are empty.
    pub fn from_bitmaps<'a>(
        width: u16,
        height: u16,
        glyphs: impl IntoIterator<Item = (char, &'a [&'a str])>,
    ) -> DotweaveResult<Self> {
        let mut out = Self::new(width, height)?;
        for (ch, rows) in glyphs {
            if rows.len() != usize::from(height) {
                return Err(DotweaveError::validation(format!(
                    "symbol {ch:?} has {} rows, expected {height}",
                    rows.len()
                )));
            }
            let mut grid = vec![false; usize::from(width) * usize::from(height)];
            for (y, row) in rows.iter().enumerate() {
                if row.chars().count() != usize::from(width) {
                    return Err(DotweaveError::validation(format!(
                        "symbol {ch:?} row {y} is not {width} cells wide"
                    )));
                }
                for (x, c) in row.chars().enumerate() {
                    grid[y * usize::from(width) + x] = c == '#';
                }
            }
            let filled = |x: i32, y: i32| -> bool {
                x >= 0
                    && y >= 0
                    && x < i32::from(width)
                    && y < i32::from(height)
                    && grid[y as usize * usize::from(width) + x as usize]
            };
            let mut dots = Vec::new();
            for y in 0..i32::from(height) {
                for x in 0..i32::from(width) {
                    if !filled(x, y) {
                        continue;
                    }
                    let mut links = Links::NONE;
                    if filled(x + 1, y) {
                        links |= Links::E;
                    }
                    if filled(x, y + 1) {
                        links |= Links::S;
                    }
                    if filled(x + 1, y + 1) && !filled(x + 1, y) && !filled(x, y + 1) {
                        links |= Links::SE;
                    }
                    if filled(x - 1, y + 1) && !filled(x - 1, y) && !filled(x, y + 1) {
                        links |= Links::SW;
                    }
                    dots.push(SymbolDot {
                        cell: (y * i32::from(width) + x) as u16,
                        links,
                    });
                }
            }
            out.defs.insert(ch, dots);
        }
        Ok(out)
    }

    /// Built-in 5x5 table covering `A`-`Z`, `0`-`9` and common punctuation.
    pub fn builtin() -> Self {
        let glyphs = FONT_5X5.iter().map(|(c, rows)| (*c, &rows[..]));
        match Self::from_bitmaps(5, 5, glyphs) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "built-in symbol table rejected");
                Self {
                    width: 5,
                    height: 5,
                    defs: HashMap::new(),
                }
            }
        }
    }

    /// Define (or replace) `ch`. Cells outside the matrix are rejected.
    pub fn insert(&mut self, ch: char, dots: Vec<SymbolDot>) -> DotweaveResult<()> {
        let cells = self.width as usize * self.height as usize;
        if let Some(bad) = dots.iter().find(|d| usize::from(d.cell) >= cells) {
            return Err(DotweaveError::validation(format!(
                "symbol {ch:?} cell {} outside {}x{} matrix",
                bad.cell, self.width, self.height
            )));
        }
        self.defs.insert(ch, dots);
        Ok(())
    }

    /// Matrix width in cells.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Matrix height in cells.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Dots of `ch`, falling back to its uppercase form.
    pub fn get(&self, ch: char) -> Option<&[SymbolDot]> {
        self.defs
            .get(&ch)
            .or_else(|| self.defs.get(&ch.to_ascii_uppercase()))
            .map(Vec::as_slice)
    }

    /// Cell coordinates `(column, row)` of a row-major index.
    pub fn cell_xy(&self, cell: u16) -> (u16, u16) {
        (cell % self.width, cell / self.width)
    }
}

#[rustfmt::skip]
const FONT_5X5: &[(char, [&str; 5])] = &[
    ('A', [".###.", "#...#", "#####", "#...#", "#...#"]),
    ('B', ["####.", "#...#", "####.", "#...#", "####."]),
    ('C', [".####", "#....", "#....", "#....", ".####"]),
    ('D', ["####.", "#...#", "#...#", "#...#", "####."]),
    ('E', ["#####", "#....", "####.", "#....", "#####"]),
    ('F', ["#####", "#....", "####.", "#....", "#...."]),
    ('G', [".####", "#....", "#..##", "#...#", ".###."]),
    ('H', ["#...#", "#...#", "#####", "#...#", "#...#"]),
    ('I', ["#####", "..#..", "..#..", "..#..", "#####"]),
    ('J', ["#####", "...#.", "...#.", "#..#.", ".##.."]),
    ('K', ["#...#", "#..#.", "###..", "#..#.", "#...#"]),
    ('L', ["#....", "#....", "#....", "#....", "#####"]),
    ('M', ["#...#", "##.##", "#.#.#", "#...#", "#...#"]),
    ('N', ["#...#", "##..#", "#.#.#", "#..##", "#...#"]),
    ('O', [".###.", "#...#", "#...#", "#...#", ".###."]),
    ('P', ["####.", "#...#", "####.", "#....", "#...."]),
    ('Q', [".###.", "#...#", "#.#.#", "#..#.", ".##.#"]),
    ('R', ["####.", "#...#", "####.", "#..#.", "#...#"]),
    ('S', [".####", "#....", ".###.", "....#", "####."]),
    ('T', ["#####", "..#..", "..#..", "..#..", "..#.."]),
    ('U', ["#...#", "#...#", "#...#", "#...#", ".###."]),
    ('V', ["#...#", "#...#", "#...#", ".#.#.", "..#.."]),
    ('W', ["#...#", "#...#", "#.#.#", "##.##", "#...#"]),
    ('X', ["#...#", ".#.#.", "..#..", ".#.#.", "#...#"]),
    ('Y', ["#...#", ".#.#.", "..#..", "..#..", "..#.."]),
    ('Z', ["#####", "...#.", "..#..", ".#...", "#####"]),
    ('0', [".###.", "#..##", "#.#.#", "##..#", ".###."]),
    ('1', ["..#..", ".##..", "..#..", "..#..", ".###."]),
    ('2', ["####.", "....#", ".###.", "#....", "#####"]),
    ('3', ["####.", "....#", ".###.", "....#", "####."]),
    ('4', ["#...#", "#...#", "#####", "....#", "....#"]),
    ('5', ["#####", "#....", "####.", "....#", "####."]),
    ('6', [".###.", "#....", "####.", "#...#", ".###."]),
    ('7', ["#####", "....#", "...#.", "..#..", "..#.."]),
    ('8', [".###.", "#...#", ".###.", "#...#", ".###."]),
    ('9', [".###.", "#...#", ".####", "....#", ".###."]),
    ('.', [".....", ".....", ".....", ".....", "..#.."]),
    (',', [".....", ".....", ".....", "..#..", ".#..."]),
    ('!', ["..#..", "..#..", "..#..", ".....", "..#.."]),
    ('?', [".###.", "....#", "..##.", ".....", "..#.."]),
    ('-', [".....", ".....", ".###.", ".....", "....."]),
    (':', [".....", "..#..", ".....", "..#..", "....."]),
    (' ', [".....", ".....", ".....", ".....", "....."]),
];

#[cfg(test)]
#[path = "../../tests/unit/scene/symbols.rs"]
mod tests;
