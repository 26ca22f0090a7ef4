use serde::{Deserialize, Serialize};

/// `?page=&limit=` query parameters, 1-based
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Clamp to page >= 1 and 1 <= limit <= max_limit
    pub fn resolve(&self, default_limit: i64, max_limit: i64) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.limit.unwrap_or(default_limit), max_limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Page is capped so that `offset()` always fits in an i64
    pub fn new(page: i64, limit: i64, max_limit: i64) -> Self {
        let limit = limit.clamp(1, max_limit.max(1));
        Self {
            page: page.clamp(1, i64::MAX / limit),
            limit,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
            total_pages: total_pages(total, request.limit),
        }
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        let q = PageQuery { page: Some(0), limit: Some(500) };
        let r = q.resolve(20, 100);
        assert_eq!(r, PageRequest { page: 1, limit: 100 });
        assert_eq!(r.offset(), 0);

        let q = PageQuery { page: Some(3), limit: None };
        assert_eq!(q.resolve(20, 100).offset(), 40);
    }

    #[test]
    fn huge_page_stays_in_range() {
        let q = PageQuery { page: Some(i64::MAX), limit: Some(20) };
        let r = q.resolve(20, 100);
        assert_eq!(r.page, i64::MAX / 20);
        assert!(r.offset() > 0);

        let r = PageRequest::new(i64::MAX, i64::MAX, i64::MAX);
        assert_eq!(r.page, 1);
        assert_eq!(r.offset(), 0);

        let r = PageRequest::new(i64::MIN, 10, 100);
        assert_eq!(r.page, 1);
    }

    #[test]
    fn counts_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
    }
}
