use async_trait::async_trait;

use crate::external::error::CatalogError;
use crate::models::PaginatedResponse;

/// 分页数据来源
///
/// 页码从 1 开始；响应携带 `{page, results, total_pages, total_results}`
#[async_trait]
pub trait PageSource<Q: Sync>: Send + Sync {
    type Item: Clone + Send + Sync + 'static;

    async fn fetch_page(
        &self,
        query: &Q,
        page: u32,
    ) -> Result<PaginatedResponse<Self::Item>, CatalogError>;
}
