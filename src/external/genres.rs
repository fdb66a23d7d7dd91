use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::external::error::CatalogError;
use crate::external::tmdb::Catalog;
use crate::models::{Genre, QUICK_GENRES};

const GENRE_CACHE_KEY: &str = "movie";

/// 电影类型目录
///
/// 类型列表几乎不变，缓存 24 小时；快速类型与高级类型由 `QUICK_GENRES` 划分
#[derive(Clone)]
pub struct GenreCatalog {
    catalog: Arc<dyn Catalog>,
    cache: Cache<&'static str, Arc<Vec<Genre>>>,
}

impl GenreCatalog {
    pub fn new(catalog: Arc<dyn Catalog>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { catalog, cache }
    }

    /// 全部类型（命中缓存时不请求目录 API）
    pub async fn genres(&self) -> Result<Arc<Vec<Genre>>, CatalogError> {
        let catalog = Arc::clone(&self.catalog);
        self.cache
            .try_get_with(GENRE_CACHE_KEY, async move {
                tracing::info!("Loading movie genre list from catalog");
                catalog.genre_list().await.map(Arc::new)
            })
            .await
            .map_err(|e| e.as_ref().clone())
    }

    pub async fn advanced_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        Ok(split_advanced_genres(&self.genres().await?))
    }

    /// 按给定顺序查找类型名称，未知的 id 被跳过
    pub async fn names(&self, ids: &[u32]) -> Result<Vec<String>, CatalogError> {
        let genres = self.genres().await?;
        Ok(ids
            .iter()
            .filter_map(|id| genres.iter().find(|g| g.id == *id))
            .map(|g| g.name.clone())
            .collect())
    }

    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

/// 快速类型：只保留 `QUICK_GENRES` 中的类型，已选中的排在前面
pub fn split_quick_genres(all: &[Genre], selected: &[u32]) -> Vec<Genre> {
    let quick: Vec<&Genre> = all.iter().filter(|g| QUICK_GENRES.contains(&g.id)).collect();
    let (mut chosen, rest): (Vec<&Genre>, Vec<&Genre>) =
        quick.into_iter().partition(|g| selected.contains(&g.id));
    chosen.extend(rest);
    chosen.into_iter().cloned().collect()
}

/// 高级类型：`QUICK_GENRES` 以外的全部类型
pub fn split_advanced_genres(all: &[Genre]) -> Vec<Genre> {
    all.iter()
        .filter(|g| !QUICK_GENRES.contains(&g.id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscoverParams, Movie, PaginatedResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn genre(id: u32, name: &str) -> Genre {
        Genre {
            id,
            name: name.to_string(),
        }
    }

    fn all_genres() -> Vec<Genre> {
        vec![
            genre(28, "Action"),
            genre(12, "Adventure"),
            genre(16, "Animation"),
            genre(35, "Comedy"),
            genre(18, "Drama"),
            genre(27, "Horror"),
        ]
    }

    struct CountingCatalog {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Catalog for CountingCatalog {
        async fn discover_movies(
            &self,
            _params: &DiscoverParams,
            _page: u32,
        ) -> Result<PaginatedResponse<Movie>, CatalogError> {
            Err(CatalogError::Status(404))
        }

        async fn search_movies(
            &self,
            _query: &str,
            _page: u32,
        ) -> Result<PaginatedResponse<Movie>, CatalogError> {
            Err(CatalogError::Status(404))
        }

        async fn genre_list(&self) -> Result<Vec<Genre>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(all_genres())
        }
    }

    #[test]
    fn test_quick_genres_put_selected_first() {
        let quick = split_quick_genres(&all_genres(), &[27, 35]);
        let ids: Vec<u32> = quick.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![35, 27, 28, 18]);
    }

    #[test]
    fn test_advanced_genres_exclude_quick_ones() {
        let ids: Vec<u32> = split_advanced_genres(&all_genres()).iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![12, 16]);
    }

    #[tokio::test]
    async fn test_genre_list_is_cached() {
        let catalog = Arc::new(CountingCatalog {
            calls: AtomicUsize::new(0),
        });
        let genres = GenreCatalog::new(catalog.clone(), Duration::from_secs(60));

        assert_eq!(genres.names(&[18, 999, 28]).await.unwrap(), vec!["Drama", "Action"]);
        assert_eq!(genres.advanced_genres().await.unwrap().len(), 2);
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);

        genres.invalidate();
        genres.genres().await.unwrap();
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 2);
    }
}
