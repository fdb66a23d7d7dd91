use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::config::TmdbSettings;
use crate::external::error::CatalogError;
use crate::models::{DiscoverParams, Genre, GenreListResponse, Movie, PaginatedResponse};

const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// 电影目录 API
///
/// 参数在调用前已经过校验；实现只负责请求与解码
#[async_trait]
pub trait Catalog: Send + Sync {
    /// discover 接口（GET /discover/movie）
    async fn discover_movies(
        &self,
        params: &DiscoverParams,
        page: u32,
    ) -> Result<PaginatedResponse<Movie>, CatalogError>;

    /// 关键词搜索（GET /search/movie）
    async fn search_movies(
        &self,
        query: &str,
        page: u32,
    ) -> Result<PaginatedResponse<Movie>, CatalogError>;

    /// 电影类型列表（GET /genre/movie/list）
    async fn genre_list(&self) -> Result<Vec<Genre>, CatalogError>;
}

/// 访问凭证：优先使用只读令牌（Bearer），否则使用 api_key 查询参数
#[derive(Clone)]
enum Credentials {
    ReadToken(String),
    ApiKey(String),
    Missing,
}

/// TMDB API客户端
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    credentials: Credentials,
    base_url: String,
    language: String,
}

impl TmdbClient {
    pub fn new(settings: &TmdbSettings) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        let credentials = match (&settings.read_token, &settings.api_key) {
            (Some(token), _) => Credentials::ReadToken(token.clone()),
            (None, Some(key)) => Credentials::ApiKey(key.clone()),
            (None, None) => {
                tracing::warn!("TMDB credentials are not configured, catalog requests will fail");
                Credentials::Missing
            }
        };

        Ok(Self {
            client,
            credentials,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            language: settings.language.clone(),
        })
    }

    pub fn has_credentials(&self) -> bool {
        !matches!(self.credentials, Credentials::Missing)
    }

    /// 构建带语言与凭证的 GET 请求
    fn request(&self, path: &str, query: &[(&str, String)]) -> Result<RequestBuilder, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .client
            .get(&url)
            .query(&[("language", self.language.as_str())])
            .query(query);

        builder = match &self.credentials {
            Credentials::ReadToken(token) => builder.bearer_auth(token),
            Credentials::ApiKey(key) => builder.query(&[("api_key", key.as_str())]),
            Credentials::Missing => return Err(CatalogError::MissingCredentials),
        };
        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, CatalogError> {
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::from_status(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    fn discover_request(
        &self,
        params: &DiscoverParams,
        page: u32,
    ) -> Result<RequestBuilder, CatalogError> {
        let mut query = vec![("page", page.to_string())];
        query.extend(params.query_pairs());
        self.request("/discover/movie", &query)
    }

    fn search_request(&self, query: &str, page: u32) -> Result<RequestBuilder, CatalogError> {
        self.request(
            "/search/movie",
            &[
                ("query", query.to_string()),
                ("include_adult", "false".to_string()),
                ("page", page.to_string()),
            ],
        )
    }
}

#[async_trait]
impl Catalog for TmdbClient {
    async fn discover_movies(
        &self,
        params: &DiscoverParams,
        page: u32,
    ) -> Result<PaginatedResponse<Movie>, CatalogError> {
        let builder = self.discover_request(params, page)?;
        self.send(builder).await
    }

    async fn search_movies(
        &self,
        query: &str,
        page: u32,
    ) -> Result<PaginatedResponse<Movie>, CatalogError> {
        let builder = self.search_request(query, page)?;
        self.send(builder).await
    }

    async fn genre_list(&self) -> Result<Vec<Genre>, CatalogError> {
        let builder = self.request("/genre/movie/list", &[])?;
        let response: GenreListResponse = self.send(builder).await?;
        Ok(response.genres)
    }
}

/// 图片尺寸枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W92,
    W154,
    W185,
    W342,
    W500,
    W780,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W92 => "w92",
            ImageSize::W154 => "w154",
            ImageSize::W185 => "w185",
            ImageSize::W342 => "w342",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::Original => "original",
        }
    }
}

/// 构建图片URL；空路径返回 None
pub fn build_image_url(path: Option<&str>, size: ImageSize) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    let separator = if path.starts_with('/') { "" } else { "/" };
    Some(format!("{}/{}{}{}", IMAGE_BASE_URL, size.as_str(), separator, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(read_token: Option<&str>, api_key: Option<&str>) -> TmdbSettings {
        TmdbSettings {
            read_token: read_token.map(str::to_string),
            api_key: api_key.map(str::to_string),
            base_url: "https://catalog.test/3/".to_string(),
            language: "en-US".to_string(),
            timeout_secs: 10,
        }
    }

    #[test]
    fn test_discover_request_uses_catalog_parameter_names() {
        let client = TmdbClient::new(&settings(Some("token"), None)).unwrap();
        let params = DiscoverParams {
            with_genres: Some("28,12".to_string()),
            primary_release_date_gte: Some("2024-03-08".to_string()),
            primary_release_date_lte: Some("2024-03-15".to_string()),
            ..Default::default()
        };

        let request = client.discover_request(&params, 2).unwrap().build().unwrap();
        let url = request.url().as_str();
        assert!(url.starts_with("https://catalog.test/3/discover/movie?"));
        assert!(url.contains("language=en-US"));
        assert!(url.contains("page=2"));
        assert!(url.contains("with_genres=28%2C12"));
        assert!(url.contains("primary_release_date.gte=2024-03-08"));
        assert!(url.contains("primary_release_date.lte=2024-03-15"));
        assert!(!url.contains("api_key"));
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer token"
        );
    }

    #[test]
    fn test_search_request_excludes_adult_results() {
        let client = TmdbClient::new(&settings(None, Some("key"))).unwrap();
        let request = client.search_request("the matrix", 1).unwrap().build().unwrap();
        let url = request.url().as_str();

        assert!(url.contains("/search/movie?"));
        assert!(url.contains("query=the+matrix"));
        assert!(url.contains("include_adult=false"));
        assert!(url.contains("api_key=key"));
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn test_missing_credentials_fail_before_sending() {
        let client = TmdbClient::new(&settings(None, None)).unwrap();
        assert!(!client.has_credentials());
        assert!(matches!(
            client.search_request("alien", 1),
            Err(CatalogError::MissingCredentials)
        ));
    }

    #[test]
    fn test_build_image_url() {
        assert_eq!(
            build_image_url(Some("/abc.jpg"), ImageSize::W500).as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(
            build_image_url(Some("abc.jpg"), ImageSize::Original).as_deref(),
            Some("https://image.tmdb.org/t/p/original/abc.jpg")
        );
        assert_eq!(build_image_url(Some(""), ImageSize::W92), None);
        assert_eq!(build_image_url(None, ImageSize::W92), None);
    }
}
