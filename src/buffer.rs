use std::collections::VecDeque;

/// 有上限的文字行緩衝區，超過上限時丟棄最舊的行
#[derive(Debug, Clone)]
pub struct LineBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl LineBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines,
        }
    }

    /// 追加一行，回傳被淘汰的行數
    pub fn push(&mut self, line: String) -> usize {
        self.lines.push_back(line);
        let excess = self.lines.len().saturating_sub(self.max_lines);
        self.lines.drain(..excess);
        excess
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// 取得 [start, end) 範圍內的行，範圍會被限制在緩衝區內
    pub fn range(&self, start: usize, end: usize) -> impl Iterator<Item = &str> {
        let end = end.min(self.lines.len());
        let start = start.min(end);
        self.lines.range(start..end).map(String::as_str)
    }
}

/// 捲動位置：第一個可見行的索引
///
/// 不變式: `0 <= offset <= max(0, total - lines_per_page)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    offset: usize,
}

impl ScrollState {
    /// 最大可捲動位置，總行數不足一頁時為 0
    pub fn max_offset(total: usize, lines_per_page: usize) -> usize {
        total.saturating_sub(lines_per_page)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 跟隨尾端
    pub fn follow_tail(&mut self, total: usize, lines_per_page: usize) {
        self.offset = Self::max_offset(total, lines_per_page);
    }

    /// 依 delta 捲動，下限與上限都會被套用
    pub fn scroll_by(&mut self, delta: isize, total: usize, lines_per_page: usize) {
        let moved = self.offset.saturating_add_signed(delta);
        self.offset = moved.min(Self::max_offset(total, lines_per_page));
    }

    /// 內容或視口改變後重新限制位置
    pub fn clamp(&mut self, total: usize, lines_per_page: usize) {
        self.offset = self.offset.min(Self::max_offset(total, lines_per_page));
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }
}
