use chrono::{DateTime, Local};
use log::{Level, LevelFilter};
use std::fmt;
use std::io::Write;

/// 安裝全域日誌記錄器
///
/// 預設層級由 `level` 決定，`RUST_LOG` 環境變數可以覆寫。
/// 重複呼叫時保留第一次安裝的記錄器。
pub fn init(level: LevelFilter) {
    let result = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{}",
                format_line(Local::now(), record.level(), record.args())
            )
        })
        .try_init();

    if result.is_err() {
        log::debug!("日誌記錄器已經初始化");
    }
}

/// `[YYYY-MM-DD HH:MM:SS LEVEL] message`
pub fn format_line(now: DateTime<Local>, level: Level, message: &fmt::Arguments<'_>) -> String {
    format!("[{} {}] {}", now.format("%Y-%m-%d %H:%M:%S"), level, message)
}
