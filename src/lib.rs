// 电影发现后端库
//
// 本库提供电影发现页的核心功能，包括：
// - 筛选状态与 URL 参数的双向编解码
// - 筛选合并与参数校验
// - 以缓存键为中心的分页查询缓存
// - 目录 API（TMDB）集成
// - API 路由

pub mod api;
pub mod config;
pub mod external;
pub mod models;
pub mod services;
