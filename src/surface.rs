use crate::font::{Glyph, GLYPH_HEIGHT, GLYPH_WIDTH};

/// RGBA8888 像素緩衝區
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: usize,
    height: usize,
    // 每像素 4 bytes，逐列排列
    buffer: Vec<u8>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 以單一顏色填滿整個緩衝區
    pub fn fill(&mut self, color: [u8; 4]) {
        for pixel in self.buffer.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    /// 設置像素，超出範圍的座標直接忽略
    pub fn set_pixel(&mut self, x: usize, y: usize, color: [u8; 4]) {
        if x < self.width && y < self.height {
            let offset = (y * self.width + x) * 4;
            self.buffer[offset..offset + 4].copy_from_slice(&color);
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * 4;
        let mut pixel = [0u8; 4];
        pixel.copy_from_slice(&self.buffer[offset..offset + 4]);
        Some(pixel)
    }

    /// 以透明背景繪製單一字形，(x, y) 為字形左上角
    pub fn draw_glyph(&mut self, x: usize, y: usize, glyph: &Glyph, color: [u8; 4]) {
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if glyph.get_pixel(col, row) {
                    self.set_pixel(x + col, y + row, color);
                }
            }
        }
    }

    /// 從 (x, y) 開始繪製一行文字，遇到右邊界就停止，回傳實際繪製的字元數
    pub fn draw_text(&mut self, x: usize, y: usize, text: &str, color: [u8; 4]) -> usize {
        let mut cx = x;
        let mut drawn = 0;
        for ch in text.chars() {
            if cx + GLYPH_WIDTH > self.width {
                break;
            }
            self.draw_glyph(cx, y, &Glyph::for_char(ch), color);
            cx += GLYPH_WIDTH;
            drawn += 1;
        }
        drawn
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// 轉成 0RGB u32 格式 (minifb 使用)
    pub fn to_0rgb(&self) -> Vec<u32> {
        self.buffer
            .chunks_exact(4)
            .map(|px| ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | (px[2] as u32))
            .collect()
    }
}
