use std::io;
use thiserror::Error;

/// 文字畫布的錯誤類型
///
/// 核心操作 (append / scroll / render) 不會失敗，
/// 只有設定讀取、工作執行緒建立與視窗層會回傳錯誤。
#[derive(Error, Debug)]
pub enum Error {
    /// IO 錯誤
    #[error("IO 錯誤: {0}")]
    Io(#[from] io::Error),

    /// 設定檔解析錯誤
    #[error("設定檔解析錯誤: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// 設定值不合法
    #[error("設定值不合法: {0}")]
    InvalidConfig(String),

    /// 視窗錯誤
    #[error("視窗錯誤: {0}")]
    Window(String),
}

impl Error {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    pub fn window(msg: impl Into<String>) -> Self {
        Error::Window(msg.into())
    }
}

/// 畫布結果類型
pub type Result<T> = std::result::Result<T, Error>;
