// 捲動文字畫布庫
pub mod buffer;
pub mod canvas;
pub mod config;
pub mod display;
pub mod error;
pub mod font;
pub mod refresh;
pub mod surface;
pub mod utils;

pub use crate::buffer::{LineBuffer, ScrollState};
pub use crate::canvas::{TextCanvas, Viewport};
pub use crate::config::{CanvasConfig, ConfigBuilder};
pub use crate::display::{DisplaySurface, RepaintHook};
pub use crate::error::{Error, Result};
pub use crate::refresh::{RefreshWorker, Refresher};
pub use crate::surface::Surface;
