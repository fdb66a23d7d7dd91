pub mod debounce;
pub mod filter_codec;
pub mod filter_merger;
pub mod filter_store;
pub mod pagination;
pub mod search;
pub mod search_session;
pub mod trend;

pub use debounce::Debouncer;
pub use filter_codec::FilterStateCodec;
pub use filter_merger::{coming_soon_params, merge_filters_to_discover_params, trending_params, FilterMerger};
pub use filter_store::FilterStore;
pub use pagination::{
    CacheCleanupTask, CacheKey, CachePolicy, PageQuery, PageSnapshot, PageSource,
    PaginationOrchestrator, PaginationStatus, QueryCache,
};
pub use search::{normalize_search_query, sanitize_input, validate_search_query, SearchQuery};
pub use search_session::{SearchSession, SEARCH_DEBOUNCE};
pub use trend::{get_trend_date_range, Clock, FixedClock, SystemClock, TrendWindow};
