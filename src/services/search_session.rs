use std::sync::Arc;
use std::time::Duration;

use crate::services::debounce::Debouncer;
use crate::services::pagination::{PageSnapshot, PageSource, PaginationOrchestrator, QueryCache};
use crate::services::search::SearchQuery;

/// 搜索输入的默认防抖时长
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// 一次搜索会话：输入经过防抖后驱动分页编排器
///
/// 被更新的输入取代的按键不会发起请求
pub struct SearchSession<S>
where
    S: PageSource<SearchQuery> + ?Sized,
{
    debouncer: Debouncer,
    orchestrator: PaginationOrchestrator<SearchQuery, S>,
}

impl<S> SearchSession<S>
where
    S: PageSource<SearchQuery> + ?Sized,
{
    pub fn new(source: Arc<S>, cache: QueryCache<SearchQuery, S::Item>, delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            orchestrator: PaginationOrchestrator::new(source, cache),
        }
    }

    /// 处理一次输入；被更新的输入取代时返回 None
    pub async fn input(&self, raw: &str) -> Option<PageSnapshot<S::Item>> {
        let query = self.debouncer.settle(SearchQuery::new(raw)).await?;
        tracing::debug!("Search input settled on {:?}", query.as_str());
        Some(self.orchestrator.activate(query).await)
    }

    /// 立即提交（例如按下回车），取消等待中的输入
    pub async fn submit(&self, raw: &str) -> PageSnapshot<S::Item> {
        self.debouncer.cancel();
        self.orchestrator.activate(SearchQuery::new(raw)).await
    }

    pub async fn load_more(&self) -> Option<PageSnapshot<S::Item>> {
        self.orchestrator.load_more().await
    }

    pub async fn retry(&self) -> Option<PageSnapshot<S::Item>> {
        self.orchestrator.retry().await
    }

    pub fn snapshot(&self) -> Option<PageSnapshot<S::Item>> {
        self.orchestrator.snapshot()
    }
}
