// 分页查询缓存
//
// 以缓存键为索引的分页状态表：
// - 每个键是一台独立的状态机，同一键最多一个进行中的请求
// - 请求携带 FetchTicket（键 + 代号 + 页码），代号不一致的结果直接丢弃
// - 新鲜期（stale_time）内复用已累积的结果，过期后从第 1 页重新开始
// - 超过 gc_time 未被访问的条目由 CacheCleanupTask 定期清理
// - 请求发出后超过 gc_time 仍未结束的条目视为被遗弃，回滚后可重新请求

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::external::error::{CatalogError, ErrorInfo};
use crate::models::PaginatedResponse;

use super::cache_key::{CacheKey, PageQuery};
use super::state::{PaginationState, PaginationStatus};

/// 缓存策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// 数据被视为新鲜的时长
    pub stale_time: Duration,
    /// 未被访问的条目保留时长
    pub gc_time: Duration,
}

impl CachePolicy {
    /// 发现页：5 分钟新鲜期，30 分钟回收
    pub fn discovery() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(30 * 60),
        }
    }

    /// 搜索：每次激活都重新请求
    pub fn search() -> Self {
        Self {
            stale_time: Duration::ZERO,
            gc_time: Duration::from_secs(5 * 60),
        }
    }
}

/// 判定请求被遗弃的最短时长
const MIN_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

impl Default for CachePolicy {
    fn default() -> Self {
        Self::discovery()
    }
}

/// 一次进行中请求的标记
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub key: CacheKey,
    pub generation: u64,
    pub page: u32,
}

/// 需要执行的请求：标记 + 对应的查询
#[derive(Debug, Clone)]
pub struct FetchPlan<Q> {
    pub ticket: FetchTicket,
    pub query: Q,
}

/// 已有条目上的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    LoadMore,
    Retry,
}

/// 渲染层读取的分页快照
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot<T> {
    pub key: CacheKey,
    pub status: PaginationStatus,
    pub all_results: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub has_next_page: bool,
    pub is_fetching_next_page: bool,
    pub is_loading: bool,
    pub error: Option<ErrorInfo>,
}

impl<T> PageSnapshot<T> {
    /// 未启用查询（例如过短的搜索关键词）的空快照
    pub fn idle(key: CacheKey) -> Self {
        Self {
            key,
            status: PaginationStatus::Idle,
            all_results: Vec::new(),
            current_page: 0,
            total_pages: 0,
            total_results: 0,
            has_next_page: false,
            is_fetching_next_page: false,
            is_loading: false,
            error: None,
        }
    }

    /// 转换结果项，其余字段保持不变
    pub fn map<U, F>(self, f: F) -> PageSnapshot<U>
    where
        F: FnMut(T) -> U,
    {
        PageSnapshot {
            key: self.key,
            status: self.status,
            all_results: self.all_results.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_results: self.total_results,
            has_next_page: self.has_next_page,
            is_fetching_next_page: self.is_fetching_next_page,
            is_loading: self.is_loading,
            error: self.error,
        }
    }
}

impl<T: Clone> PageSnapshot<T> {
    fn from_state(key: &CacheKey, state: &PaginationState<T>) -> Self {
        Self {
            key: key.clone(),
            status: state.status(),
            all_results: state.results().to_vec(),
            current_page: state.current_page(),
            total_pages: state.total_pages(),
            total_results: state.total_results(),
            has_next_page: state.has_next_page(),
            is_fetching_next_page: state.status() == PaginationStatus::LoadingNextPage,
            is_loading: state.status() == PaginationStatus::LoadingFirstPage,
            error: state.error().map(ErrorInfo::from),
        }
    }
}

struct CacheEntry<Q, T> {
    query: Q,
    state: PaginationState<T>,
    generation: u64,
    updated_at: Option<Instant>,
    last_accessed: Instant,
    fetch_started: Option<Instant>,
}

impl<Q, T> CacheEntry<Q, T> {
    fn new(query: Q, generation: u64) -> Self {
        Self {
            query,
            state: PaginationState::new(),
            generation,
            updated_at: None,
            last_accessed: Instant::now(),
            fetch_started: None,
        }
    }

    fn is_wedged(&self, fetch_timeout: Duration) -> bool {
        self.state.status().is_loading()
            && self
                .fetch_started
                .map(|started| started.elapsed() >= fetch_timeout)
                .unwrap_or(false)
    }

    fn is_stale(&self, stale_time: Duration) -> bool {
        match self.updated_at {
            Some(updated_at) => updated_at.elapsed() >= stale_time,
            None => false,
        }
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryCacheStats {
    pub entries: usize,
    pub in_flight: usize,
}

/// 以缓存键为索引的分页缓存
///
/// 内部锁只在同步代码中持有，不会跨越 `.await`
pub struct QueryCache<Q, T> {
    entries: Arc<Mutex<HashMap<CacheKey, CacheEntry<Q, T>>>>,
    generations: Arc<AtomicU64>,
    policy: CachePolicy,
}

impl<Q, T> Clone for QueryCache<Q, T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            generations: Arc::clone(&self.generations),
            policy: self.policy,
        }
    }
}

impl<Q: PageQuery, T: Clone> QueryCache<Q, T> {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            generations: Arc::new(AtomicU64::new(0)),
            policy,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry<Q, T>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn fetch_timeout(&self) -> Duration {
        self.policy.gc_time.max(MIN_FETCH_TIMEOUT)
    }

    /// 回滚长时间没有结束的请求；迟到的结果因代号变化被丢弃
    fn release_wedged(&self, key: &CacheKey, entry: &mut CacheEntry<Q, T>) {
        if !entry.is_wedged(self.fetch_timeout()) {
            return;
        }
        tracing::warn!(
            "Fetch for {} has been in flight too long, releasing it",
            key
        );
        entry.state.abandon();
        entry.generation = self.next_generation();
        entry.fetch_started = None;
    }

    fn plan_for(
        key: &CacheKey,
        entry: &mut CacheEntry<Q, T>,
        page: Option<u32>,
    ) -> Option<FetchPlan<Q>> {
        let page = page?;
        entry.fetch_started = Some(Instant::now());
        Some(FetchPlan {
            ticket: FetchTicket {
                key: key.clone(),
                generation: entry.generation,
                page,
            },
            query: entry.query.clone(),
        })
    }

    /// 激活一个查询：必要时开始第 1 页的请求
    ///
    /// 新鲜的数据直接复用；过期且没有请求在进行的条目从第 1 页重新开始
    pub fn activate(&self, query: &Q) -> (Option<FetchPlan<Q>>, PageSnapshot<T>) {
        self.enter(query, true)
    }

    /// 继续使用已有条目（不论是否过期）；条目不存在时与 `activate` 相同
    pub fn resume(&self, query: &Q) -> (Option<FetchPlan<Q>>, PageSnapshot<T>) {
        self.enter(query, false)
    }

    fn enter(&self, query: &Q, refresh_stale: bool) -> (Option<FetchPlan<Q>>, PageSnapshot<T>) {
        let key = query.cache_key();
        let stale_time = self.policy.stale_time;
        let mut entries = self.lock();

        if let Some(entry) = entries.get_mut(&key) {
            self.release_wedged(&key, entry);
        }

        let needs_reset = entries
            .get(&key)
            .map(|entry| {
                refresh_stale && !entry.state.status().is_loading() && entry.is_stale(stale_time)
            })
            .unwrap_or(true);

        if needs_reset {
            if entries.contains_key(&key) {
                tracing::debug!("Cached pages for {} are stale, restarting from page 1", key);
            }
            let generation = self.next_generation();
            entries.insert(key.clone(), CacheEntry::new(query.clone(), generation));
        } else {
            tracing::debug!("Cache hit for {}", key);
        }

        let Some(entry) = entries.get_mut(&key) else {
            return (None, PageSnapshot::idle(key));
        };
        entry.last_accessed = Instant::now();

        let page = entry.state.start_first_page();
        let plan = Self::plan_for(&key, entry, page);

        (plan, PageSnapshot::from_state(&key, &entry.state))
    }

    /// 在已有条目上加载下一页或重试；条目不存在时返回 None
    pub fn begin(
        &self,
        key: &CacheKey,
        trigger: Trigger,
    ) -> Option<(Option<FetchPlan<Q>>, PageSnapshot<T>)> {
        let mut entries = self.lock();
        let entry = entries.get_mut(key)?;
        entry.last_accessed = Instant::now();
        self.release_wedged(key, entry);

        let page = match trigger {
            Trigger::LoadMore => entry.state.start_next_page(),
            Trigger::Retry => entry.state.start_retry(),
        };
        if page.is_none() {
            tracing::debug!(
                "Ignoring {:?} for {} in state {:?}",
                trigger,
                key,
                entry.state.status()
            );
        }

        let plan = Self::plan_for(key, entry, page);

        Some((plan, PageSnapshot::from_state(key, &entry.state)))
    }

    /// 写入请求结果；标记过期（条目被替换或删除）时丢弃并返回 false
    pub fn complete(
        &self,
        ticket: &FetchTicket,
        result: Result<PaginatedResponse<T>, CatalogError>,
    ) -> bool {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(&ticket.key) else {
            tracing::debug!("Discarding page {} for evicted key {}", ticket.page, ticket.key);
            return false;
        };
        if entry.generation != ticket.generation {
            tracing::debug!(
                "Discarding page {} for {} from generation {} (current {})",
                ticket.page,
                ticket.key,
                ticket.generation,
                entry.generation
            );
            return false;
        }

        let applied = match result {
            Ok(response) => {
                let applied = entry.state.complete(ticket.page, response);
                if applied {
                    entry.updated_at = Some(Instant::now());
                }
                applied
            }
            Err(err) => entry.state.fail(ticket.page, err),
        };
        if applied {
            entry.fetch_started = None;
        }
        applied
    }

    /// 放弃请求：条目回到请求前的状态
    pub fn abandon(&self, ticket: &FetchTicket) {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(&ticket.key) {
            if entry.generation == ticket.generation
                && entry.state.pending_page() == Some(ticket.page)
            {
                entry.state.abandon();
                entry.fetch_started = None;
            }
        }
    }

    pub fn snapshot(&self, key: &CacheKey) -> Option<PageSnapshot<T>> {
        let entries = self.lock();
        entries
            .get(key)
            .map(|entry| PageSnapshot::from_state(key, &entry.state))
    }

    /// 使某个键失效，进行中的请求结果会被丢弃
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// 清理超过 gc_time 未被访问且没有请求在进行的条目，以及被遗弃的请求
    pub fn cleanup_expired(&self) -> usize {
        let gc_time = self.policy.gc_time;
        let fetch_timeout = self.fetch_timeout();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| {
            if entry.is_wedged(fetch_timeout) {
                return false;
            }
            entry.state.status().is_loading() || entry.last_accessed.elapsed() < gc_time
        });
        before - entries.len()
    }

    pub fn stats(&self) -> QueryCacheStats {
        let entries = self.lock();
        QueryCacheStats {
            entries: entries.len(),
            in_flight: entries
                .values()
                .filter(|entry| entry.state.status().is_loading())
                .count(),
        }
    }
}

/// 可被定期清理的缓存
pub trait Expiring: Send + Sync {
    fn cleanup_expired(&self) -> usize;
}

impl<Q, T> Expiring for QueryCache<Q, T>
where
    Q: PageQuery,
    T: Clone + Send + 'static,
{
    fn cleanup_expired(&self) -> usize {
        QueryCache::cleanup_expired(self)
    }
}

/// 缓存清理任务
pub struct CacheCleanupTask {
    caches: Vec<Arc<dyn Expiring>>,
    interval: Duration,
}

impl CacheCleanupTask {
    pub fn new(caches: Vec<Arc<dyn Expiring>>, interval: Duration) -> Self {
        Self { caches, interval }
    }

    /// 执行一轮清理，返回被回收的条目数
    pub fn run_once(&self) -> usize {
        self.caches.iter().map(|cache| cache.cleanup_expired()).sum()
    }

    /// 启动定期清理任务
    pub async fn start(self) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;
            let evicted = self.run_once();
            tracing::debug!("Query cache cleanup completed, {} entries evicted", evicted);
        }
    }
}
