//! Minimal 5x7 pixel font for burning HUD text into frames.
//!
//! Uppercase-only; lowercase input is folded to uppercase and unknown
//! characters render as blanks. Kept in code so the annotator needs no
//! font asset on disk.

use image::{Rgb, RgbImage};

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal gap between glyphs, in font pixels.
const GLYPH_GAP: u32 = 1;

/// Rows of a 5x7 glyph, most significant of the low 5 bits is the left column.
type Glyph = [u8; 7];

const BLANK: Glyph = [0; 7];

fn glyph(c: char) -> Glyph {
    match c {
        ' ' => BLANK,
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '%' => [0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b01110, 0b00000, 0b00000, 0b00000],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        _ => BLANK,
    }
}

/// Width in pixels of `text` rendered at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    (chars * (GLYPH_WIDTH + GLYPH_GAP) - GLYPH_GAP) * scale
}

/// Burn `text` into `frame` with its top-left corner at (`x`, `y`).
/// Pixels falling outside the frame are clipped.
pub fn draw_text(frame: &mut RgbImage, x: i32, y: i32, scale: u32, text: &str, color: Rgb<u8>) {
    let scale = scale.max(1);
    let mut pen_x = x;

    for c in text.chars() {
        let rows = glyph(c.to_ascii_uppercase());
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let base_x = pen_x + (col * scale) as i32;
                let base_y = y + (row as u32 * scale) as i32;
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = base_x + dx as i32;
                        let py = base_y + dy as i32;
                        if px >= 0
                            && py >= 0
                            && (px as u32) < frame.width()
                            && (py as u32) < frame.height()
                        {
                            frame.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
        pen_x += ((GLYPH_WIDTH + GLYPH_GAP) * scale) as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_within_frame_bounds() {
        let mut frame = RgbImage::new(60, 20);
        draw_text(&mut frame, 2, 2, 1, "REPS: 12", Rgb([0, 255, 0]));
        let lit = frame.pixels().filter(|p| p.0 != [0, 0, 0]).count();
        assert!(lit > 0);
    }

    #[test]
    fn clips_instead_of_panicking() {
        let mut frame = RgbImage::new(10, 10);
        draw_text(&mut frame, -3, -3, 2, "CLIPPED TEXT", Rgb([255, 255, 255]));
        draw_text(&mut frame, 8, 8, 3, "EDGE", Rgb([255, 255, 255]));
    }

    #[test]
    fn width_accounts_for_scale_and_gaps() {
        assert_eq!(text_width("", 1), 0);
        assert_eq!(text_width("A", 1), GLYPH_WIDTH);
        assert_eq!(text_width("AB", 1), GLYPH_WIDTH * 2 + 1);
        assert_eq!(text_width("AB", 2), (GLYPH_WIDTH * 2 + 1) * 2);
    }
}
