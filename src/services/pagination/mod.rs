// 分页查询模块
//
// 本模块以缓存键为中心管理分页请求，包括：
// - 缓存键推导（语义相同的查询得到相同的键）
// - 每个键独立的分页状态机
// - 带新鲜期与回收期的查询缓存
// - 丢弃过期响应的分页编排器

pub mod cache;
pub mod cache_key;
pub mod orchestrator;
pub mod source;
pub mod state;

pub use cache::{
    CacheCleanupTask, CachePolicy, Expiring, FetchPlan, FetchTicket, PageSnapshot, QueryCache,
    QueryCacheStats, Trigger,
};
pub use cache_key::{CacheKey, PageQuery, DISCOVERY_SCOPE, SEARCH_SCOPE};
pub use orchestrator::PaginationOrchestrator;
pub use source::PageSource;
pub use state::{PaginationState, PaginationStatus};
