// 分页编排器
//
// 持有"当前激活的缓存键"，负责驱动 QueryCache 的请求：
// - activate：切换到新的查询，必要时请求第 1 页
// - load_more / retry：作用于当前激活的键
// - 请求完成时若激活的键已经改变，结果被丢弃，旧条目回滚到请求前的状态
// - 请求在完成前被丢弃（例如客户端断开）时，条目同样回滚

use std::sync::{Arc, Mutex};

use super::cache::{FetchPlan, FetchTicket, PageSnapshot, QueryCache, Trigger};
use super::cache_key::{CacheKey, PageQuery};
use super::source::PageSource;

/// 进行中请求的守卫：未解除就被释放时放弃对应的请求
struct InFlight<'a, Q: PageQuery, T: Clone> {
    cache: &'a QueryCache<Q, T>,
    ticket: &'a FetchTicket,
    armed: bool,
}

impl<'a, Q: PageQuery, T: Clone> InFlight<'a, Q, T> {
    fn new(cache: &'a QueryCache<Q, T>, ticket: &'a FetchTicket) -> Self {
        Self {
            cache,
            ticket,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<Q: PageQuery, T: Clone> Drop for InFlight<'_, Q, T> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!(
                "Request for page {} of {} was dropped before completing",
                self.ticket.page,
                self.ticket.key
            );
            self.cache.abandon(self.ticket);
        }
    }
}

pub struct PaginationOrchestrator<Q, S>
where
    Q: PageQuery,
    S: PageSource<Q> + ?Sized,
{
    source: Arc<S>,
    cache: QueryCache<Q, S::Item>,
    active: Mutex<Option<CacheKey>>,
}

impl<Q, S> PaginationOrchestrator<Q, S>
where
    Q: PageQuery,
    S: PageSource<Q> + ?Sized,
{
    pub fn new(source: Arc<S>, cache: QueryCache<Q, S::Item>) -> Self {
        Self {
            source,
            cache,
            active: Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &QueryCache<Q, S::Item> {
        &self.cache
    }

    pub fn active_key(&self) -> Option<CacheKey> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_active(&self, key: CacheKey) {
        *self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(key);
    }

    fn is_active(&self, key: &CacheKey) -> bool {
        self.active_key().as_ref() == Some(key)
    }

    /// 激活查询；未启用的查询只切换激活键，不发起请求
    pub async fn activate(&self, query: Q) -> PageSnapshot<S::Item> {
        self.enter(query, true).await
    }

    /// 激活查询但保留已有的累积结果（即使已过期）
    pub async fn resume(&self, query: Q) -> PageSnapshot<S::Item> {
        self.enter(query, false).await
    }

    /// 加载当前激活键的下一页；加载中、已到末页或出错时不做任何事
    pub async fn load_more(&self) -> Option<PageSnapshot<S::Item>> {
        self.trigger(Trigger::LoadMore).await
    }

    /// 重新请求失败的那一页
    pub async fn retry(&self) -> Option<PageSnapshot<S::Item>> {
        self.trigger(Trigger::Retry).await
    }

    pub fn snapshot(&self) -> Option<PageSnapshot<S::Item>> {
        let key = self.active_key()?;
        self.cache.snapshot(&key)
    }

    async fn enter(&self, query: Q, refresh_stale: bool) -> PageSnapshot<S::Item> {
        let key = query.cache_key();
        self.set_active(key.clone());

        if !query.is_enabled() {
            return PageSnapshot::idle(key);
        }

        let (plan, snapshot) = if refresh_stale {
            self.cache.activate(&query)
        } else {
            self.cache.resume(&query)
        };
        match plan {
            Some(plan) => self.run(plan).await,
            None => snapshot,
        }
    }

    async fn trigger(&self, trigger: Trigger) -> Option<PageSnapshot<S::Item>> {
        let key = self.active_key()?;
        let (plan, snapshot) = self.cache.begin(&key, trigger)?;
        match plan {
            Some(plan) => Some(self.run(plan).await),
            None => Some(snapshot),
        }
    }

    async fn run(&self, plan: FetchPlan<Q>) -> PageSnapshot<S::Item> {
        let FetchPlan { ticket, query } = plan;
        tracing::info!("Fetching page {} for {}", ticket.page, ticket.key);

        let mut in_flight = InFlight::new(&self.cache, &ticket);
        let result = self.source.fetch_page(&query, ticket.page).await;
        in_flight.disarm();
        drop(in_flight);

        match &result {
            Ok(response) => tracing::info!(
                "Fetched page {}/{} for {} ({} results)",
                ticket.page,
                response.total_pages,
                ticket.key,
                response.results.len()
            ),
            Err(e) => tracing::warn!("Fetching page {} for {} failed: {}", ticket.page, ticket.key, e),
        }

        if self.is_active(&ticket.key) {
            self.cache.complete(&ticket, result);
        } else {
            tracing::debug!(
                "Discarding page {} for {}: active key changed while in flight",
                ticket.page,
                ticket.key
            );
            self.cache.abandon(&ticket);
        }

        self.cache
            .snapshot(&ticket.key)
            .unwrap_or_else(|| PageSnapshot::idle(ticket.key.clone()))
    }
}
