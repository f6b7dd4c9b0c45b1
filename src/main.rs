// TextCanvas 示範程式
// 背景執行緒持續寫入日誌行，刷新執行緒以 60 Hz 上限渲染，主執行緒負責視窗

use anyhow::Context;
use clap::Parser;
use log::{error, info, LevelFilter};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use text_canvas::utils::logger;
use text_canvas::{CanvasConfig, Error, TextCanvas};

const WHEEL_LINES: f32 = 3.0;

#[derive(Parser, Debug)]
#[command(name = "text_canvas", about = "捲動文字畫布示範")]
struct Args {
    /// TOML 設定檔路徑
    #[arg(long)]
    config: Option<PathBuf>,

    /// 生產者寫入的行數
    #[arg(long, default_value_t = 1000)]
    lines: usize,

    /// 每行之間的間隔（毫秒）
    #[arg(long, default_value_t = 1)]
    interval_ms: u64,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.log_level);
    info!("🎮 TextCanvas 示範啟動中...");

    let config = match &args.config {
        Some(path) => CanvasConfig::load(path)
            .with_context(|| format!("無法載入設定檔 {}", path.display()))?,
        None => CanvasConfig::default(),
    };
    let canvas = TextCanvas::with_config(config.clone())?;

    let mut window = Window::new(
        "TextCanvas Demo",
        config.width,
        config.height,
        WindowOptions::default(),
    )
    .map_err(|e| {
        error!("❌ 視窗建立失敗: {:?}", e);
        Error::window(e.to_string())
    })?;
    #[allow(deprecated)]
    window.limit_update_rate(Some(canvas.refresh_interval()));

    let worker = canvas
        .start_refresh()
        .context("無法啟動刷新執行緒")?;
    spawn_producer(canvas.clone(), args.lines, Duration::from_millis(args.interval_ms))?;

    let display = canvas.widget();
    let mut frame_count = 0u64;

    info!("🚀 開始顯示循環...");
    while window.is_open() && !window.is_key_down(Key::Escape) {
        handle_input(&window, &canvas);

        match display.take_frame() {
            Some(frame) => {
                window
                    .update_with_buffer(&frame.to_0rgb(), frame.width(), frame.height())
                    .map_err(|e| Error::window(e.to_string()))?;
                frame_count += 1;
            }
            None => window.update(),
        }
    }

    worker.stop();
    info!("🎉 TextCanvas 示範結束，共顯示 {} 幀", frame_count);
    Ok(())
}

fn spawn_producer(canvas: TextCanvas, lines: usize, interval: Duration) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("producer".to_string())
        .spawn(move || {
            for i in 0..lines {
                thread::sleep(interval);
                canvas.append(format!("Much canvas {:04}: so wow", i));
            }
            info!("✅ 生產者完成，共寫入 {} 行", lines);
        })
        .context("無法啟動生產者執行緒")?;
    Ok(())
}

fn handle_input(window: &Window, canvas: &TextCanvas) {
    let page = canvas.lines_per_page();
    for key in window.get_keys_pressed(KeyRepeat::Yes) {
        if let Some(delta) = key_scroll_delta(key, page) {
            canvas.scroll(delta);
        }
    }

    if let Some((_, dy)) = window.get_scroll_wheel() {
        // 滾輪向上為正值，對應向上捲動
        let delta = (-dy * WHEEL_LINES).round() as isize;
        if delta != 0 {
            canvas.scroll(delta);
        }
    }
}

// 鍵盤對應捲動量
fn key_scroll_delta(key: Key, lines_per_page: usize) -> Option<isize> {
    let page = lines_per_page.max(1) as isize;
    match key {
        Key::Up => Some(-1),
        Key::Down => Some(1),
        Key::PageUp => Some(-page),
        Key::PageDown => Some(page),
        Key::Home => Some(isize::MIN),
        Key::End => Some(isize::MAX),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_scroll_delta() {
        assert_eq!(key_scroll_delta(Key::Up, 42), Some(-1));
        assert_eq!(key_scroll_delta(Key::PageDown, 42), Some(42));
        assert_eq!(key_scroll_delta(Key::PageUp, 0), Some(-1));
        assert_eq!(key_scroll_delta(Key::Home, 42), Some(isize::MIN));
        assert_eq!(key_scroll_delta(Key::A, 42), None);
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["text_canvas"]);
        assert_eq!(args.lines, 1000);
        assert_eq!(args.interval_ms, 1);
        assert_eq!(args.log_level, LevelFilter::Info);
        assert!(args.config.is_none());
    }
}
