// 刷新執行緒
// 以固定頻率檢查待渲染信號，有請求時才渲染並交給顯示表面

use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use log::{info, warn};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::canvas::TextCanvas;
use crate::error::Result;

/// 單次刷新
pub struct Refresher {
    canvas: TextCanvas,
}

impl Refresher {
    pub fn new(canvas: TextCanvas) -> Self {
        Self { canvas }
    }

    /// 執行一次刷新，回傳這次是否有渲染
    ///
    /// 兩次 tick 之間不論有多少次修改，都只會渲染一次。
    pub fn tick(&self) -> bool {
        if !self.canvas.take_pending() {
            return false;
        }
        let surface = self.canvas.render();
        self.canvas.widget().install(surface);
        true
    }
}

/// 背景刷新執行緒，stop 或 drop 時會停止並等待執行緒結束
pub struct RefreshWorker {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshWorker {
    pub fn spawn(canvas: TextCanvas) -> Result<Self> {
        let interval = canvas.refresh_interval();
        let (stop_tx, stop_rx) = bounded(1);
        let refresher = Refresher::new(canvas);

        let handle = thread::Builder::new()
            .name("text-canvas-refresh".to_string())
            .spawn(move || run(refresher, interval, stop_rx))?;

        info!("刷新執行緒啟動，間隔 {:?}", interval);
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// 停止刷新執行緒並等待結束
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("刷新執行緒異常結束");
            } else {
                info!("刷新執行緒已停止");
            }
        }
    }
}

impl Drop for RefreshWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(refresher: Refresher, interval: Duration, stop_rx: Receiver<()>) {
    let ticker = tick(interval);
    loop {
        select! {
            recv(ticker) -> _ => {
                refresher.tick();
            }
            // 收到停止信號或發送端被丟棄
            recv(stop_rx) -> _ => break,
        }
    }
}
