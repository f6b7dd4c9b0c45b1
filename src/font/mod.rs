/*
等寬點陣字型
============
8x8 字形，每個字元固定前進 GLYPH_WIDTH 像素
*/

mod glyphs;

use glyphs::FONT_8X8;
use std::fmt;

pub const GLYPH_WIDTH: usize = 8;
pub const GLYPH_HEIGHT: usize = 8;

const FIRST_PRINTABLE: u8 = 32;
const LAST_PRINTABLE: u8 = 126;

/// 單一字元的 8x8 點陣
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    rows: [u8; GLYPH_HEIGHT],
}

impl Glyph {
    /// 查詢字元的字形，非可列印 ASCII 一律回傳空白字形
    pub fn for_char(ch: char) -> Self {
        let index = match u8::try_from(ch) {
            Ok(b) if (FIRST_PRINTABLE..=LAST_PRINTABLE).contains(&b) => {
                (b - FIRST_PRINTABLE) as usize
            }
            _ => 0,
        };

        let mut rows = [0u8; GLYPH_HEIGHT];
        rows.copy_from_slice(&FONT_8X8[index * GLYPH_HEIGHT..(index + 1) * GLYPH_HEIGHT]);
        Self { rows }
    }

    /// 取得特定位置的像素是否點亮
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        (self.rows[y] >> (7 - x)) & 1 != 0
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|&row| row == 0)
    }
}

impl fmt::Debug for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Glyph [")?;
        for y in 0..GLYPH_HEIGHT {
            write!(f, "  ")?;
            for x in 0..GLYPH_WIDTH {
                write!(f, "{}", if self.get_pixel(x, y) { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_is_blank() {
        assert!(Glyph::for_char(' ').is_blank());
    }

    #[test]
    fn test_non_printable_falls_back_to_blank() {
        assert!(Glyph::for_char('\t').is_blank());
        assert!(Glyph::for_char('é').is_blank());
        assert!(Glyph::for_char('\u{7f}').is_blank());
    }

    #[test]
    fn test_glyph_pixels() {
        // '|' 為 0x18: 第 3、4 行像素點亮
        let bar = Glyph::for_char('|');
        assert!(!bar.get_pixel(2, 0));
        assert!(bar.get_pixel(3, 0));
        assert!(bar.get_pixel(4, 0));
        assert!(!bar.get_pixel(5, 0));

        // '_' 只有最後一列
        let underscore = Glyph::for_char('_');
        assert!(!underscore.get_pixel(0, 6));
        assert!(underscore.get_pixel(0, 7));
    }

    #[test]
    fn test_distinct_letters() {
        assert_ne!(Glyph::for_char('a'), Glyph::for_char('b'));
        assert!(!Glyph::for_char('~').is_blank());
    }
}
