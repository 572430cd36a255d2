//! 搜索控制：停止标志与时间限制
//!
//! 搜索在展开兄弟节点之间（蒙特卡洛在每次模拟之间）检查是否需要停止，
//! 停止后返回目前为止的最佳走法。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// 搜索控制
///
/// 克隆后共享同一个停止标志和起始时间，可交给其他线程用于取消搜索
#[derive(Debug, Clone)]
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    time_limit: Option<Duration>,
    start: Arc<Mutex<Instant>>,
}

impl SearchControl {
    /// 不限时，只响应外部停止
    pub fn new_infinite(stopped: Arc<AtomicBool>) -> Self {
        Self {
            stopped,
            time_limit: None,
            start: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// 限时搜索，时钟立即开始
    pub fn new_timed(stopped: Arc<AtomicBool>, limit: Duration) -> Self {
        Self {
            stopped,
            time_limit: Some(limit),
            start: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// 根据可选时限创建
    pub fn with_limit(limit: Option<Duration>) -> Self {
        let stopped = Arc::new(AtomicBool::new(false));
        match limit {
            Some(limit) => Self::new_timed(stopped, limit),
            None => Self::new_infinite(stopped),
        }
    }

    /// 重新开始计时（每次搜索开始时调用），并清除停止标志
    pub fn restart(&self) {
        *self.start.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
        self.stopped.store(false, Ordering::Release);
    }

    /// 请求停止
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// 是否应当停止
    ///
    /// 超时后置位停止标志，之后的调用不再读时钟
    pub fn should_stop(&self) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }

        if let Some(limit) = self.time_limit {
            if self.elapsed() >= limit {
                self.stopped.store(true, Ordering::Release);
                return true;
            }
        }

        false
    }

    /// 本次搜索已用时间
    pub fn elapsed(&self) -> Duration {
        self.start
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// 共享的停止标志
    pub fn stop_flag(&self) -> &Arc<AtomicBool> {
        &self.stopped
    }
}

impl Default for SearchControl {
    fn default() -> Self {
        Self::with_limit(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infinite_never_stops_by_itself() {
        let control = SearchControl::default();
        assert!(!control.should_stop());
        assert!(control.time_limit().is_none());
    }

    #[test]
    fn test_external_stop_is_shared() {
        let control = SearchControl::default();
        let handle = control.clone();
        handle.stop();
        assert!(control.should_stop());

        control.restart();
        assert!(!handle.should_stop());
    }

    #[test]
    fn test_restart_is_shared_by_clones() {
        let control = SearchControl::with_limit(Some(Duration::from_millis(500)));
        let strategy_copy = control.clone();
        std::thread::sleep(Duration::from_millis(600));
        control.restart();
        assert!(!strategy_copy.should_stop());
        assert!(strategy_copy.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_zero_limit_stops_immediately() {
        let control = SearchControl::with_limit(Some(Duration::ZERO));
        assert!(control.should_stop());
        assert!(control.stop_flag().load(Ordering::Relaxed));
    }
}
