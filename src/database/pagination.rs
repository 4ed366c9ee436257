use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;

/// Raw `?page=&per_page=` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Normalized pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Clamp the query into `page >= 1` and `1 <= per_page <= max_page_size`
    pub fn from_query(query: &PageQuery, api: &ApiConfig) -> Self {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query
            .per_page
            .unwrap_or(api.default_page_size)
            .clamp(1, api.max_page_size.max(1));
        Self { page, per_page }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        let per_page = i64::from(request.per_page);
        let pages = if total <= 0 { 0 } else { (total + per_page - 1) / per_page };
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            pages,
        }
    }
}
