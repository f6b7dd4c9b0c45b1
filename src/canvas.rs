use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, trace};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use crate::buffer::{LineBuffer, ScrollState};
use crate::config::CanvasConfig;
use crate::display::DisplaySurface;
use crate::error::Result;
use crate::font::GLYPH_HEIGHT;
use crate::refresh::RefreshWorker;
use crate::surface::Surface;

/// 可繪製區域與行距
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
    pub line_height: usize,
    pub margin_left: usize,
}

impl Viewport {
    /// 一頁可顯示的行數
    pub fn lines_per_page(&self) -> usize {
        self.height.checked_div(self.line_height).unwrap_or(0)
    }

    /// 第 row 個可見行的字形頂端 y 座標，字形在行高內垂直置中
    fn glyph_top(&self, row: usize) -> usize {
        row * self.line_height + self.line_height.saturating_sub(GLYPH_HEIGHT) / 2
    }
}

#[derive(Debug)]
struct CanvasState {
    lines: LineBuffer,
    scroll: ScrollState,
    viewport: Viewport,
}

impl CanvasState {
    fn clamp_scroll(&mut self) {
        let (total, per_page) = (self.lines.len(), self.viewport.lines_per_page());
        self.scroll.clamp(total, per_page);
    }
}

struct Inner {
    state: RwLock<CanvasState>,
    background: [u8; 4],
    foreground: [u8; 4],
    refresh_hz: u32,
    // 單一容量的待渲染信號
    pending_tx: Sender<()>,
    pending_rx: Receiver<()>,
    display: Arc<DisplaySurface>,
    renders: AtomicU64,
}

/// 捲動文字畫布
///
/// 生產者透過 `append` / `scroll` 修改內容，刷新執行緒以固定頻率
/// 把可見範圍渲染成點陣圖並交給 [`DisplaySurface`]。
/// 複製 `TextCanvas` 只會複製 `Arc`，所有複本共用同一份狀態。
#[derive(Clone)]
pub struct TextCanvas {
    inner: Arc<Inner>,
}

impl TextCanvas {
    /// 以預設行距、邊界與行數上限建立畫布
    pub fn new(width: usize, height: usize) -> Self {
        let config = CanvasConfig {
            width,
            height,
            ..CanvasConfig::default()
        };
        Self::from_config(config)
    }

    /// 以設定建立畫布，設定不合法時回傳錯誤
    pub fn with_config(config: CanvasConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: CanvasConfig) -> Self {
        let viewport = Viewport {
            width: config.width,
            height: config.height,
            line_height: config.line_height,
            margin_left: config.margin_left,
        };
        let state = CanvasState {
            lines: LineBuffer::new(config.max_lines),
            scroll: ScrollState::default(),
            viewport,
        };

        let initial = draw(&state, config.background, config.foreground);
        let (pending_tx, pending_rx) = bounded(1);

        debug!(
            "建立畫布 {}x{}，每頁 {} 行",
            viewport.width,
            viewport.height,
            viewport.lines_per_page()
        );

        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                background: config.background,
                foreground: config.foreground,
                refresh_hz: config.refresh_hz,
                pending_tx,
                pending_rx,
                display: Arc::new(DisplaySurface::new(initial)),
                renders: AtomicU64::new(0),
            }),
        }
    }

    /// 追加一行並捲動到尾端
    pub fn append(&self, line: impl Into<String>) {
        {
            let mut state = self.write_state();
            let evicted = state.lines.push(line.into());
            if evicted > 0 {
                trace!("淘汰 {} 行", evicted);
            }
            let (total, per_page) = (state.lines.len(), state.viewport.lines_per_page());
            state.scroll.follow_tail(total, per_page);
        }
        self.request_update();
    }

    /// 捲動 delta 行，正數向下，負數向上
    pub fn scroll(&self, delta: isize) {
        {
            let mut state = self.write_state();
            let (total, per_page) = (state.lines.len(), state.viewport.lines_per_page());
            state.scroll.scroll_by(delta, total, per_page);
        }
        self.request_update();
    }

    /// 改變視口尺寸，行距與邊界維持不變
    pub fn resize(&self, width: usize, height: usize) {
        {
            let mut state = self.write_state();
            state.viewport.width = width;
            state.viewport.height = height;
            state.clamp_scroll();
            debug!(
                "視口改為 {}x{}，每頁 {} 行",
                width,
                height,
                state.viewport.lines_per_page()
            );
        }
        self.request_update();
    }

    /// 清除所有行
    pub fn clear(&self) {
        {
            let mut state = self.write_state();
            state.lines.clear();
            state.scroll.reset();
        }
        self.request_update();
    }

    /// 把目前可見範圍渲染成新的點陣圖
    pub fn render(&self) -> Surface {
        let start = Instant::now();
        let surface = {
            let state = self.read_state();
            draw(&state, self.inner.background, self.inner.foreground)
        };
        self.inner.renders.fetch_add(1, Ordering::Relaxed);
        trace!("渲染完成，耗時 {:?}", start.elapsed());
        surface
    }

    /// 交給 GUI 宿主顯示的影像
    pub fn widget(&self) -> Arc<DisplaySurface> {
        Arc::clone(&self.inner.display)
    }

    /// 啟動刷新執行緒
    pub fn start_refresh(&self) -> Result<RefreshWorker> {
        RefreshWorker::spawn(self.clone())
    }

    pub fn len(&self) -> usize {
        self.read_state().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().lines.is_empty()
    }

    pub fn offset(&self) -> usize {
        self.read_state().scroll.offset()
    }

    pub fn lines_per_page(&self) -> usize {
        self.read_state().viewport.lines_per_page()
    }

    pub fn viewport(&self) -> Viewport {
        self.read_state().viewport
    }

    /// 目前可見的行
    pub fn visible_lines(&self) -> Vec<String> {
        let state = self.read_state();
        let (start, end) = visible_range(&state);
        state.lines.range(start, end).map(str::to_owned).collect()
    }

    /// 累計渲染次數
    pub fn render_count(&self) -> u64 {
        self.inner.renders.load(Ordering::Relaxed)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(1) / self.inner.refresh_hz.max(1)
    }

    /// 取出待渲染信號，沒有待處理的請求時回傳 false
    pub(crate) fn take_pending(&self) -> bool {
        self.inner.pending_rx.try_recv().is_ok()
    }

    fn request_update(&self) {
        // 已經有待處理的請求時 try_send 失敗，直接忽略
        let _ = self.inner.pending_tx.try_send(());
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CanvasState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CanvasState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// 可見範圍 [start, end)，在本地計算夾制後的位置，不修改共享狀態
fn visible_range(state: &CanvasState) -> (usize, usize) {
    let total = state.lines.len();
    let per_page = state.viewport.lines_per_page();
    let start = state
        .scroll
        .offset()
        .min(ScrollState::max_offset(total, per_page));
    let end = (start + per_page).min(total);
    (start, end)
}

fn draw(state: &CanvasState, background: [u8; 4], foreground: [u8; 4]) -> Surface {
    let viewport = state.viewport;
    let mut surface = Surface::new(viewport.width, viewport.height);
    surface.fill(background);

    let (start, end) = visible_range(state);
    for (row, line) in state.lines.range(start, end).enumerate() {
        // 每行都從左邊界重新開始
        surface.draw_text(viewport.margin_left, viewport.glyph_top(row), line, foreground);
    }
    surface
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use pretty_assertions::assert_eq;

    fn labels(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("line {}", i)).collect()
    }

    fn canvas_with(lines: std::ops::Range<usize>) -> TextCanvas {
        let canvas = TextCanvas::new(800, 600);
        for line in labels(lines) {
            canvas.append(line);
        }
        canvas
    }

    #[test]
    fn test_lines_per_page() {
        let canvas = TextCanvas::new(800, 600);
        assert_eq!(canvas.lines_per_page(), 42);
        assert!(canvas.is_empty());
        assert_eq!(canvas.offset(), 0);
    }

    #[test]
    fn test_append_follows_tail() {
        let canvas = canvas_with(0..50);
        assert_eq!(canvas.len(), 50);
        assert_eq!(canvas.offset(), 8);
        assert_eq!(canvas.visible_lines(), labels(8..50));
    }

    #[test]
    fn test_auto_follow_after_every_append() {
        let canvas = TextCanvas::new(800, 600);
        for i in 0..100 {
            canvas.append(format!("line {}", i));
            assert_eq!(canvas.offset(), canvas.len().saturating_sub(42));
        }
    }

    #[test]
    fn test_append_resets_manual_scroll() {
        let canvas = canvas_with(0..50);
        canvas.scroll(-5);
        assert_eq!(canvas.offset(), 3);
        canvas.append("line 50");
        assert_eq!(canvas.offset(), 9);
    }

    #[test]
    fn test_scroll_to_top() {
        let canvas = canvas_with(0..50);
        canvas.scroll(-100);
        assert_eq!(canvas.offset(), 0);
        assert_eq!(canvas.visible_lines(), labels(0..42));
    }

    #[test]
    fn test_scroll_clamp_invariant() {
        let canvas = canvas_with(0..60);
        let deltas = [3, -1, 100, -7, -1000, 5, 18, 1, isize::MAX, isize::MIN, 0];
        for delta in deltas {
            canvas.scroll(delta);
            let offset = canvas.offset();
            assert!(offset <= canvas.len().saturating_sub(canvas.lines_per_page()));
        }
    }

    #[test]
    fn test_scroll_under_one_page() {
        let canvas = canvas_with(0..5);
        canvas.scroll(10);
        assert_eq!(canvas.offset(), 0);
        assert_eq!(canvas.visible_lines(), labels(0..5));
    }

    #[test]
    fn test_bound_evicts_oldest() {
        let canvas = TextCanvas::new(800, 600);
        for i in 0..10_050 {
            canvas.append(format!("line {}", i));
            assert!(canvas.len() <= 10_000);
        }
        assert_eq!(canvas.len(), 10_000);
        assert_eq!(canvas.offset(), 10_000 - 42);

        canvas.scroll(isize::MIN);
        assert_eq!(canvas.visible_lines(), labels(50..92));
        canvas.scroll(isize::MAX);
        assert_eq!(canvas.visible_lines(), labels(10_008..10_050));
    }

    #[test]
    fn test_render_is_deterministic() {
        let canvas = canvas_with(0..50);
        assert_eq!(canvas.render(), canvas.render());
        assert_eq!(canvas.render_count(), 2);
    }

    #[test]
    fn test_render_shows_scrolled_window() {
        // 捲動到 8 的畫面應該和只含第 8..49 行的畫布相同
        let scrolled = canvas_with(0..50);
        let expected = canvas_with(8..50);
        assert_eq!(expected.offset(), 0);
        assert_eq!(scrolled.render(), expected.render());

        scrolled.scroll(-100);
        assert_eq!(scrolled.render(), canvas_with(0..42).render());
    }

    #[test]
    fn test_render_leaves_background_below_last_line() {
        let canvas = canvas_with(0..3);
        let surface = canvas.render();
        let background = CanvasConfig::default().background;
        let foreground = CanvasConfig::default().foreground;

        let lit = |y_range: std::ops::Range<usize>| {
            y_range
                .flat_map(|y| (0..800).map(move |x| (x, y)))
                .any(|(x, y)| surface.get_pixel(x, y) == Some(foreground))
        };
        assert!(lit(0..14));
        assert!(lit(28..42));
        assert!(!lit(42..600));
        assert_eq!(surface.get_pixel(799, 599), Some(background));
    }

    #[test]
    fn test_each_line_starts_at_left_margin() {
        // 不同長度的行，第一個字元都畫在同一個 x 座標
        let long = TextCanvas::new(200, 28);
        long.append("||||||||");
        long.append("|");
        let surface = long.render();
        let foreground = CanvasConfig::default().foreground;
        // '|' 的點亮欄位為 3、4，加上左邊界 2
        let top_row0 = 3;
        let top_row1 = 14 + 3;
        assert_eq!(surface.get_pixel(2 + 3, top_row0), Some(foreground));
        assert_eq!(surface.get_pixel(2 + 3, top_row1), Some(foreground));
        assert_ne!(surface.get_pixel(2 + 8 + 3, top_row1), Some(foreground));
    }

    #[test]
    fn test_resize_reclamps_offset() {
        let canvas = canvas_with(0..50);
        assert_eq!(canvas.offset(), 8);

        canvas.resize(800, 700); // 50 行
        assert_eq!(canvas.lines_per_page(), 50);
        assert_eq!(canvas.offset(), 0);
        assert_eq!(canvas.render().height(), 700);

        canvas.resize(800, 140); // 10 行
        canvas.append("line 50");
        assert_eq!(canvas.offset(), 41);
    }

    #[test]
    fn test_clear() {
        let canvas = canvas_with(0..50);
        canvas.clear();
        assert!(canvas.is_empty());
        assert_eq!(canvas.offset(), 0);
        assert!(canvas.visible_lines().is_empty());
    }

    #[test]
    fn test_with_config() {
        let config = ConfigBuilder::new()
            .size(160, 100)
            .line_height(10)
            .max_lines(5)
            .build();
        let canvas = TextCanvas::with_config(config).unwrap();
        assert_eq!(canvas.lines_per_page(), 10);
        for i in 0..8 {
            canvas.append(format!("line {}", i));
        }
        assert_eq!(canvas.visible_lines(), labels(3..8));

        let invalid = ConfigBuilder::new().line_height(0).build();
        assert!(TextCanvas::with_config(invalid).is_err());
    }

    #[test]
    fn test_zero_line_height_is_safe() {
        let viewport = Viewport {
            width: 10,
            height: 10,
            line_height: 0,
            margin_left: 0,
        };
        assert_eq!(viewport.lines_per_page(), 0);
    }

    #[test]
    fn test_mutations_coalesce_into_one_request() {
        let canvas = TextCanvas::new(800, 600);
        for i in 0..10 {
            canvas.append(format!("line {}", i));
        }
        canvas.scroll(-1);
        assert!(canvas.take_pending());
        assert!(!canvas.take_pending());
    }

    #[test]
    fn test_clones_share_state() {
        let canvas = TextCanvas::new(800, 600);
        let producer = canvas.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                producer.append(format!("line {}", i));
            }
        });
        handle.join().unwrap();
        assert_eq!(canvas.len(), 100);
        assert_eq!(canvas.offset(), 58);
    }
}
