use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Ayudante de serde para query strings: un valor vacío (`?page=`) se
/// interpreta como ausente en lugar de fallar el parseo.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginationInfo {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

impl PaginationParams {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self { page, limit }
    }

    pub fn get_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn get_limit(&self) -> u32 {
        self.limit.unwrap_or(50).clamp(1, 10_000)
    }

    pub fn get_offset(&self) -> usize {
        ((self.get_page() - 1) * self.get_limit()) as usize
    }
}

impl PaginationInfo {
    pub fn new(page: u32, limit: u32, total: usize) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            ((total as f64) / (limit as f64)).ceil() as u32
        };

        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// Corta la página pedida de una colección ya filtrada.
pub fn paginar<T: Clone>(items: &[T], params: &PaginationParams) -> (Vec<T>, PaginationInfo) {
    let total = items.len();
    let offset = params.get_offset();
    let limit = params.get_limit() as usize;
    let page: Vec<T> = items.iter().skip(offset).take(limit).cloned().collect();
    (
        page,
        PaginationInfo::new(params.get_page(), params.get_limit(), total),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params() {
        let params = PaginationParams::new(Some(2), Some(10));
        assert_eq!(params.get_page(), 2);
        assert_eq!(params.get_limit(), 10);
        assert_eq!(params.get_offset(), 10);
    }

    #[test]
    fn test_pagination_params_defaults() {
        let params = PaginationParams::new(None, None);
        assert_eq!(params.get_page(), 1);
        assert_eq!(params.get_limit(), 50);
        assert_eq!(params.get_offset(), 0);
    }

    #[test]
    fn test_pagination_info() {
        let info = PaginationInfo::new(2, 10, 25);
        assert_eq!(info.page, 2);
        assert_eq!(info.limit, 10);
        assert_eq!(info.total, 25);
        assert_eq!(info.total_pages, 3);
    }

    #[test]
    fn test_empty_as_none() {
        #[derive(Deserialize)]
        struct Q {
            #[serde(default, deserialize_with = "empty_as_none")]
            page: Option<u32>,
        }

        let q: Q = serde_json::from_str(r#"{"page": ""}"#).unwrap();
        assert_eq!(q.page, None);
        let q: Q = serde_json::from_str(r#"{"page": "3"}"#).unwrap();
        assert_eq!(q.page, Some(3));
        let q: Q = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(q.page, None);
        assert!(serde_json::from_str::<Q>(r#"{"page": "abc"}"#).is_err());
    }

    #[test]
    fn test_paginar() {
        let items: Vec<u32> = (0..25).collect();
        let (pagina, info) = paginar(&items, &PaginationParams::new(Some(3), Some(10)));
        assert_eq!(pagina, vec![20, 21, 22, 23, 24]);
        assert_eq!(info.total, 25);
        assert_eq!(info.total_pages, 3);

        let (vacia, info) = paginar(&items, &PaginationParams::new(Some(4), Some(10)));
        assert!(vacia.is_empty());
        assert_eq!(info.page, 4);
    }
}
