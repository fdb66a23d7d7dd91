use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// 防抖器："最后一次输入生效"
///
/// 每次调用 `settle` 都会等待一个延迟；等待期间若有更新的调用，
/// 较早的调用返回 None，只有最新的一次返回其值。
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    latest: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 等待输入稳定；被更新的输入取代时返回 None
    pub async fn settle<T>(&self, value: T) -> Option<T> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;

        if self.latest.load(Ordering::SeqCst) == ticket {
            Some(value)
        } else {
            None
        }
    }

    /// 取消所有等待中的输入
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}
