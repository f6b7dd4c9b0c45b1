use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::surface::Surface;

/// GUI 宿主的重繪入口，必須可以從任意執行緒呼叫
pub trait RepaintHook: Send + Sync {
    fn request_repaint(&self);
}

/// 不做任何事的重繪入口，宿主自行輪詢 [`DisplaySurface::take_frame`]
#[derive(Debug, Default)]
pub struct NoopRepaint;

impl RepaintHook for NoopRepaint {
    fn request_repaint(&self) {}
}

/// 交給 GUI 宿主顯示的影像
///
/// 刷新執行緒透過 `install` 放入新影格，宿主執行緒透過 `take_frame` 取出。
pub struct DisplaySurface {
    frame: Mutex<Surface>,
    dirty: AtomicBool,
    generation: AtomicU64,
    hook: Mutex<Arc<dyn RepaintHook>>,
}

impl DisplaySurface {
    pub fn new(initial: Surface) -> Self {
        Self {
            frame: Mutex::new(initial),
            dirty: AtomicBool::new(true),
            generation: AtomicU64::new(0),
            hook: Mutex::new(Arc::new(NoopRepaint)),
        }
    }

    /// 註冊宿主的重繪入口
    pub fn set_repaint_hook(&self, hook: Arc<dyn RepaintHook>) {
        *lock(&self.hook) = hook;
    }

    /// 放入新影格並通知宿主重繪
    pub fn install(&self, surface: Surface) {
        *lock(&self.frame) = surface;
        self.generation.fetch_add(1, Ordering::Relaxed);
        self.dirty.store(true, Ordering::Release);

        let hook = Arc::clone(&lock(&self.hook));
        hook.request_repaint();
    }

    /// 若有尚未顯示的影格則回傳其複本，每個影格最多回傳一次
    pub fn take_frame(&self) -> Option<Surface> {
        if self.dirty.swap(false, Ordering::AcqRel) {
            Some(lock(&self.frame).clone())
        } else {
            None
        }
    }

    /// 目前的影格，不影響 dirty 狀態
    pub fn latest_frame(&self) -> Surface {
        lock(&self.frame).clone()
    }

    pub fn needs_repaint(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// 已放入的影格數
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }
}

impl Debug for DisplaySurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplaySurface")
            .field("generation", &self.generation())
            .field("dirty", &self.needs_repaint())
            .finish()
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
