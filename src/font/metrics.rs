//! Advance widths for the standard PDF fonts the engine draws with.
//!
//! Widths are in 1/1000 em, taken from the Adobe AFM files. Only printable
//! ASCII is tabulated; other characters fall back to a representative glyph
//! width so measurement stays conservative for Latin-1 text.

/// Helvetica, U+0020..=U+007E.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Helvetica-Bold, U+0020..=U+007E.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

#[derive(Debug, Clone, Copy)]
enum WidthTable {
    Proportional(&'static [u16; 95]),
    Monospace(u16),
}

/// Glyph metrics for one standard font face.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    table: WidthTable,
}

impl StandardFontMetrics {
    pub const HELVETICA: Self = Self {
        table: WidthTable::Proportional(&HELVETICA),
    };
    pub const HELVETICA_BOLD: Self = Self {
        table: WidthTable::Proportional(&HELVETICA_BOLD),
    };
    pub const COURIER: Self = Self {
        table: WidthTable::Monospace(600),
    };

    /// Advance width in 1/1000 em.
    pub fn advance(&self, ch: char) -> u16 {
        let table = match self.table {
            WidthTable::Monospace(w) => return w,
            WidthTable::Proportional(t) => t,
        };
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) {
            return table[(cp - 0x20) as usize];
        }
        match ch {
            '\u{00A0}' => table[0],
            '\u{2022}' => 350,
            '\u{2013}' => 556,
            '\u{2014}' | '\u{2026}' => 1000,
            '\u{00B2}' | '\u{00B3}' => 333,
            '\u{00B0}' => 400,
            '\u{20AC}' => 556,
            c if c.is_uppercase() => table[(b'O' - 0x20) as usize],
            _ => table[(b'o' - 0x20) as usize],
        }
    }

    /// Advance width of a single character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.advance(ch) as f64 / 1000.0 * font_size
    }

    /// Width of a single-line string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}
