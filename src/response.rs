//! Standard response envelope: every endpoint answers with `{code, message, data}`.

use axum::Json;
use serde::Serialize;

pub const SUCCESS_MESSAGE: &str = "success";

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        ApiResponse {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// One window of records plus the soft-delete-filtered total.
#[derive(Debug, Serialize)]
pub struct PageData<T> {
    pub records: Vec<T>,
    pub total: u64,
    pub size: u32,
    pub current: u32,
    pub pages: u64,
}

impl<T> PageData<T> {
    pub fn new(records: Vec<T>, total: u64, current: u32, size: u32) -> Self {
        let pages = if size == 0 { 0 } else { total.div_ceil(u64::from(size)) };
        PageData {
            records,
            total,
            size,
            current,
            pages,
        }
    }
}

pub fn success<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: 200,
        message: SUCCESS_MESSAGE.to_string(),
        data: Some(data),
    })
}

/// Success without payload (delete).
pub fn success_empty() -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        code: 200,
        message: SUCCESS_MESSAGE.to_string(),
        data: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        let page: PageData<u8> = PageData::new(vec![], 21, 1, 10);
        assert_eq!(page.pages, 3);
        let page: PageData<u8> = PageData::new(vec![], 0, 1, 10);
        assert_eq!(page.pages, 0);
    }

    #[test]
    fn empty_success_serializes_null_data() {
        let body = serde_json::to_value(&success_empty().0).unwrap();
        assert_eq!(body, serde_json::json!({"code": 200, "message": "success", "data": null}));
    }
}
