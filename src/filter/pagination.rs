use super::types::FilterParams;

/// Normalized page window: `page >= 1`, `1 <= limit <= max_limit`,
/// `offset = (page - 1) * limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64, max_limit: i64) -> Self {
        let max_limit = max_limit.max(1);
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(default_limit)
            .clamp(1, max_limit);
        let offset = (page - 1).saturating_mul(limit);
        Self { page, limit, offset }
    }

    /// Reads `page` and `limit`
    pub fn from_params(params: &FilterParams, default_limit: i64, max_limit: i64) -> Self {
        Self::new(params.int("page"), params.int("limit"), default_limit, max_limit)
    }

    pub fn to_sql(&self) -> String {
        format!("LIMIT {} OFFSET {}", self.limit, self.offset)
    }

    /// Number of pages needed for `total` rows
    pub fn pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}
