use serde::Serialize;

use crate::external::error::CatalogError;
use crate::models::PaginatedResponse;

/// 分页状态机的状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStatus {
    Idle,
    LoadingFirstPage,
    LoadingNextPage,
    Ready,
    Exhausted,
    Errored,
}

impl PaginationStatus {
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            PaginationStatus::LoadingFirstPage | PaginationStatus::LoadingNextPage
        )
    }
}

/// 单个缓存键的分页累积状态
///
/// 页码从 1 开始，结果只追加不替换
#[derive(Debug, Clone)]
pub struct PaginationState<T> {
    status: PaginationStatus,
    results: Vec<T>,
    current_page: u32,
    total_pages: u32,
    total_results: u32,
    error: Option<CatalogError>,
    /// 请求发出前的状态，放弃请求时回滚
    resume: PaginationStatus,
}

impl<T> Default for PaginationState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PaginationState<T> {
    pub fn new() -> Self {
        Self {
            status: PaginationStatus::Idle,
            results: Vec::new(),
            current_page: 0,
            total_pages: 0,
            total_results: 0,
            error: None,
            resume: PaginationStatus::Idle,
        }
    }

    pub fn status(&self) -> PaginationStatus {
        self.status
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_results(&self) -> u32 {
        self.total_results
    }

    pub fn error(&self) -> Option<&CatalogError> {
        self.error.as_ref()
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page > 0 && self.current_page < self.total_pages
    }

    /// 正在请求的页码（没有请求时为 None）
    pub fn pending_page(&self) -> Option<u32> {
        match self.status {
            PaginationStatus::LoadingFirstPage => Some(1),
            PaginationStatus::LoadingNextPage => Some(self.current_page + 1),
            _ => None,
        }
    }

    /// Idle → LoadingFirstPage
    pub fn start_first_page(&mut self) -> Option<u32> {
        if self.status != PaginationStatus::Idle {
            return None;
        }
        self.transition_to_loading(PaginationStatus::LoadingFirstPage)
    }

    /// Ready → LoadingNextPage，仅当还有下一页
    pub fn start_next_page(&mut self) -> Option<u32> {
        if self.status != PaginationStatus::Ready || !self.has_next_page() {
            return None;
        }
        self.transition_to_loading(PaginationStatus::LoadingNextPage)
    }

    /// Errored → 重新请求失败的那一页
    pub fn start_retry(&mut self) -> Option<u32> {
        if self.status != PaginationStatus::Errored {
            return None;
        }
        let next = if self.current_page == 0 {
            PaginationStatus::LoadingFirstPage
        } else {
            PaginationStatus::LoadingNextPage
        };
        self.transition_to_loading(next)
    }

    fn transition_to_loading(&mut self, next: PaginationStatus) -> Option<u32> {
        self.resume = self.status;
        self.status = next;
        self.pending_page()
    }

    /// 请求成功：追加结果并重新计算是否还有下一页
    ///
    /// 只接受当前正在等待的页，其余响应返回 false 并被忽略
    pub fn complete(&mut self, page: u32, response: PaginatedResponse<T>) -> bool {
        if self.pending_page() != Some(page) {
            return false;
        }
        if response.page != page {
            tracing::warn!(
                "Catalog answered page {} for a request of page {}",
                response.page,
                page
            );
        }

        self.results.extend(response.results);
        self.current_page = page;
        self.total_pages = response.total_pages;
        self.total_results = response.total_results;
        self.error = None;
        self.status = if self.current_page >= self.total_pages {
            PaginationStatus::Exhausted
        } else {
            PaginationStatus::Ready
        };
        true
    }

    /// 请求失败：进入 Errored，保留已累积的结果
    pub fn fail(&mut self, page: u32, error: CatalogError) -> bool {
        if self.pending_page() != Some(page) {
            return false;
        }
        self.error = Some(error);
        self.status = PaginationStatus::Errored;
        true
    }

    /// 放弃正在进行的请求，回到请求前的状态
    pub fn abandon(&mut self) {
        if self.status.is_loading() {
            self.status = self.resume;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, results: Vec<u32>, total_pages: u32) -> PaginatedResponse<u32> {
        PaginatedResponse {
            page: number,
            total_results: total_pages * 2,
            results,
            total_pages,
        }
    }

    #[test]
    fn test_first_page_transitions() {
        let mut state = PaginationState::new();
        assert_eq!(state.start_first_page(), Some(1));
        assert_eq!(state.status(), PaginationStatus::LoadingFirstPage);
        assert_eq!(state.start_first_page(), None);

        assert!(state.complete(1, page(1, vec![1, 2], 3)));
        assert_eq!(state.status(), PaginationStatus::Ready);
        assert!(state.has_next_page());
    }

    #[test]
    fn test_pages_accumulate_until_exhausted() {
        let mut state = PaginationState::new();
        state.start_first_page();
        state.complete(1, page(1, vec![1, 2], 3));

        for (number, results) in [(2, vec![3, 4]), (3, vec![5])] {
            assert_eq!(state.start_next_page(), Some(number));
            assert_eq!(state.start_next_page(), None);
            assert!(state.complete(number, page(number, results, 3)));
        }

        assert_eq!(state.results(), &[1, 2, 3, 4, 5]);
        assert_eq!(state.status(), PaginationStatus::Exhausted);
        assert!(!state.has_next_page());
        assert_eq!(state.start_next_page(), None);
    }

    #[test]
    fn test_single_page_result_is_exhausted() {
        let mut state = PaginationState::new();
        state.start_first_page();
        state.complete(1, page(1, vec![], 0));
        assert_eq!(state.status(), PaginationStatus::Exhausted);
        assert!(!state.has_next_page());
    }

    #[test]
    fn test_failure_and_retry_of_next_page() {
        let mut state = PaginationState::new();
        state.start_first_page();
        state.complete(1, page(1, vec![1], 2));
        state.start_next_page();

        assert!(state.fail(2, CatalogError::RateLimited));
        assert_eq!(state.status(), PaginationStatus::Errored);
        assert_eq!(state.error(), Some(&CatalogError::RateLimited));
        assert_eq!(state.results(), &[1]);
        assert_eq!(state.start_next_page(), None);

        assert_eq!(state.start_retry(), Some(2));
        assert_eq!(state.status(), PaginationStatus::LoadingNextPage);
        assert!(state.complete(2, page(2, vec![2], 2)));
        assert_eq!(state.error(), None);
        assert_eq!(state.results(), &[1, 2]);
    }

    #[test]
    fn test_retry_of_first_page() {
        let mut state: PaginationState<u32> = PaginationState::new();
        state.start_first_page();
        state.fail(1, CatalogError::Connectivity("offline".into()));
        assert_eq!(state.start_retry(), Some(1));
        assert_eq!(state.status(), PaginationStatus::LoadingFirstPage);
    }

    #[test]
    fn test_unexpected_page_is_ignored() {
        let mut state = PaginationState::new();
        state.start_first_page();
        assert!(!state.complete(2, page(2, vec![9], 3)));
        assert!(state.results().is_empty());
    }

    #[test]
    fn test_abandon_rolls_back() {
        let mut state = PaginationState::new();
        state.start_first_page();
        state.complete(1, page(1, vec![1], 2));
        state.start_next_page();
        state.abandon();
        assert_eq!(state.status(), PaginationStatus::Ready);
        assert_eq!(state.start_next_page(), Some(2));
    }
}
