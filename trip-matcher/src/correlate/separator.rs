//! Bracket glyphs that visually tie together the rows of one group.

use crate::matcher::MatchType;

/// Glyphs for the first, middle and last rows of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separator {
    pub first: char,
    pub middle: char,
    pub last: char,
}

const BLANK: Separator = Separator::new(' ', ' ', ' ');

impl Separator {
    pub const fn new(first: char, middle: char, last: char) -> Self {
        Self {
            first,
            middle,
            last,
        }
    }

    pub fn for_type(match_type: MatchType) -> Self {
        match match_type {
            MatchType::ZeroOne => Self::new(' ', ' ', '↦'),
            MatchType::OneZero => Self::new(' ', ' ', '↤'),
            MatchType::ManyMany => Self::new('┳', '┃', '┻'),
            MatchType::ZeroMany | MatchType::OneMany => Self::new('┏', '┃', '┗'),
            MatchType::ManyZero | MatchType::ManyOne => Self::new('┓', '┃', '┛'),
            MatchType::OneOne => BLANK,
        }
    }

    /// Glyph for row `index` of a group of `len` rows.
    ///
    /// The last row always takes the `last` glyph, so a single-row group
    /// shows only that.
    pub fn glyph(&self, index: usize, len: usize) -> char {
        if index + 1 >= len {
            self.last
        } else if index == 0 {
            self.first
        } else {
            self.middle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(match_type: MatchType, len: usize) -> String {
        let separator = Separator::for_type(match_type);
        (0..len).map(|i| separator.glyph(i, len)).collect()
    }

    #[test]
    fn multi_row_brackets() {
        assert_eq!(column(MatchType::ManyMany, 4), "┳┃┃┻");
        assert_eq!(column(MatchType::OneMany, 2), "┏┗");
        assert_eq!(column(MatchType::ZeroMany, 3), "┏┃┗");
        assert_eq!(column(MatchType::ManyOne, 3), "┓┃┛");
        assert_eq!(column(MatchType::ManyZero, 2), "┓┛");
    }

    #[test]
    fn single_rows_use_last_glyph() {
        assert_eq!(column(MatchType::ZeroOne, 1), "↦");
        assert_eq!(column(MatchType::OneZero, 1), "↤");
        assert_eq!(column(MatchType::OneOne, 1), " ");
    }
}
