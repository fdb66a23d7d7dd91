pub mod discover;
pub mod filter;
pub mod movie;
pub mod validation;

pub use discover::{DiscoverParams, PaginatedResponse};
pub use filter::{
    dedup_genres, DateRange, FilterState, FilterUpdate, QuickSortOption, SortOption, TrendOption,
    UrlFilterParams, QUICK_GENRES,
};
pub use movie::{Genre, GenreListResponse, Movie};
pub use validation::{ParamValidator, ValidationError, Validator};
