use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::font::GLYPH_HEIGHT;

/// 畫布設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// 視口寬度（像素）
    pub width: usize,
    /// 視口高度（像素）
    pub height: usize,
    /// 每行的垂直間距（像素）
    pub line_height: usize,
    /// 左邊界（像素）
    pub margin_left: usize,
    /// 最多保留的行數
    pub max_lines: usize,
    /// 刷新頻率上限（Hz）
    pub refresh_hz: u32,
    /// 背景色 RGBA
    pub background: [u8; 4],
    /// 文字顏色 RGBA
    pub foreground: [u8; 4],
}

pub const DEFAULT_WIDTH: usize = 800;
pub const DEFAULT_HEIGHT: usize = 600;
pub const DEFAULT_LINE_HEIGHT: usize = 14;
pub const DEFAULT_MARGIN_LEFT: usize = 2;
pub const DEFAULT_MAX_LINES: usize = 10_000;
pub const DEFAULT_REFRESH_HZ: u32 = 60;

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            line_height: DEFAULT_LINE_HEIGHT,
            margin_left: DEFAULT_MARGIN_LEFT,
            max_lines: DEFAULT_MAX_LINES,
            refresh_hz: DEFAULT_REFRESH_HZ,
            background: [0x00, 0x00, 0x00, 0xFF],
            foreground: [0xC8, 0xC8, 0xC8, 0xFF],
        }
    }
}

impl CanvasConfig {
    /// 從 TOML 檔案載入設定，缺少的欄位使用預設值
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("載入設定檔: {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CanvasConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 檢查設定值
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::invalid_config(format!(
                "視口尺寸不可為 0: {}x{}",
                self.width, self.height
            )));
        }
        if self.line_height < GLYPH_HEIGHT {
            return Err(Error::invalid_config(format!(
                "line_height ({}) 小於字形高度 ({})",
                self.line_height, GLYPH_HEIGHT
            )));
        }
        if self.max_lines == 0 {
            return Err(Error::invalid_config("max_lines 不可為 0"));
        }
        if self.refresh_hz == 0 {
            return Err(Error::invalid_config("refresh_hz 不可為 0"));
        }
        Ok(())
    }
}

/// 設定構建器
pub struct ConfigBuilder {
    config: CanvasConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder {
            config: CanvasConfig::default(),
        }
    }

    pub fn size(mut self, width: usize, height: usize) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn line_height(mut self, line_height: usize) -> Self {
        self.config.line_height = line_height;
        self
    }

    pub fn margin_left(mut self, margin_left: usize) -> Self {
        self.config.margin_left = margin_left;
        self
    }

    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.config.max_lines = max_lines;
        self
    }

    pub fn refresh_hz(mut self, refresh_hz: u32) -> Self {
        self.config.refresh_hz = refresh_hz;
        self
    }

    pub fn colors(mut self, background: [u8; 4], foreground: [u8; 4]) -> Self {
        self.config.background = background;
        self.config.foreground = foreground;
        self
    }

    pub fn build(self) -> CanvasConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        ConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = CanvasConfig::default();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
        assert_eq!(config.line_height, 14);
        assert_eq!(config.max_lines, 10_000);
        assert_eq!(config.refresh_hz, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CanvasConfig::from_toml_str("width = 640\nheight = 480\n").unwrap();
        assert_eq!(
            config,
            CanvasConfig {
                width: 640,
                height: 480,
                ..CanvasConfig::default()
            }
        );
    }

    #[test]
    fn test_toml_colors() {
        let config =
            CanvasConfig::from_toml_str("foreground = [0, 255, 0, 255]\nline_height = 10\n")
                .unwrap();
        assert_eq!(config.foreground, [0, 255, 0, 255]);
        assert_eq!(config.line_height, 10);
    }

    #[test]
    fn test_malformed_toml() {
        let err = CanvasConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            ConfigBuilder::new().size(0, 600).build(),
            ConfigBuilder::new().line_height(4).build(),
            ConfigBuilder::new().max_lines(0).build(),
            ConfigBuilder::new().refresh_hz(0).build(),
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = CanvasConfig::load("/nonexistent/text_canvas.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
