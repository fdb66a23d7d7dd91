use serde::{Deserialize, Serialize};

/// 目录 API 返回的电影基本信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub popularity: f32,
}

impl Movie {
    /// 上映年份（取 release_date 的年份部分）
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_ref()
            .and_then(|date| date.split('-').next())
            .and_then(|year| year.parse().ok())
    }
}

/// 电影类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// 类型列表响应
#[derive(Debug, Deserialize, Serialize)]
pub struct GenreListResponse {
    pub genres: Vec<Genre>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_deserialize_with_missing_optional_fields() {
        let json = r#"{"id": 603, "title": "The Matrix", "release_date": "1999-03-30"}"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 603);
        assert_eq!(movie.release_year(), Some(1999));
        assert!(movie.genre_ids.is_empty());
    }

    #[test]
    fn test_release_year_empty_date() {
        let json = r#"{"id": 1, "title": "Untitled", "release_date": ""}"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.release_year(), None);
    }
}
