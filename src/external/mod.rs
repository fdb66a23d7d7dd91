pub mod error;
pub mod genres;
pub mod tmdb;

use async_trait::async_trait;

pub use error::{CatalogError, CatalogErrorKind, ErrorInfo};
pub use genres::GenreCatalog;
pub use tmdb::{build_image_url, Catalog, ImageSize, TmdbClient};

use crate::models::{DiscoverParams, Movie, PaginatedResponse, ParamValidator};
use crate::services::pagination::PageSource;
use crate::services::search::{validate_search_query, SearchQuery};

// 任何目录实现都可以作为分页数据来源；请求前先做参数校验
#[async_trait]
impl<C: Catalog + ?Sized> PageSource<DiscoverParams> for C {
    type Item = Movie;

    async fn fetch_page(
        &self,
        query: &DiscoverParams,
        page: u32,
    ) -> Result<PaginatedResponse<Movie>, CatalogError> {
        let params = ParamValidator::validate(query.clone())?;
        self.discover_movies(&params, page).await
    }
}

#[async_trait]
impl<C: Catalog + ?Sized> PageSource<SearchQuery> for C {
    type Item = Movie;

    async fn fetch_page(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<PaginatedResponse<Movie>, CatalogError> {
        let query = validate_search_query(query.as_str())?;
        self.search_movies(&query, page).await
    }
}
