use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: i64,
    pub limit: i64,
}

/// Links to adjacent pages; each side is present only when that page holds rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

impl Pagination {
    pub fn compute(page: i64, limit: i64, total: i64) -> Self {
        let next = (page.saturating_mul(limit) < total).then_some(PageRef { page: page.saturating_add(1), limit });
        let prev = ((page - 1).saturating_mul(limit) > 0).then_some(PageRef { page: page - 1, limit });
        Self { next, prev }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_page_has_both_links() {
        let p = Pagination::compute(2, 2, 10);
        assert_eq!(p.next, Some(PageRef { page: 3, limit: 2 }));
        assert_eq!(p.prev, Some(PageRef { page: 1, limit: 2 }));
    }

    #[test]
    fn first_page_has_no_prev() {
        let p = Pagination::compute(1, 25, 30);
        assert!(p.prev.is_none());
        assert!(p.next.is_some());
    }

    #[test]
    fn exact_fit_has_no_next() {
        let p = Pagination::compute(2, 5, 10);
        assert!(p.next.is_none());
        assert_eq!(serde_json::to_value(&Pagination::compute(1, 5, 5)).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn huge_page_is_past_the_end() {
        let p = Pagination::compute(4_611_686_018_427_387_904, 4, 10);
        assert!(p.next.is_none());
        assert_eq!(p.prev, Some(PageRef { page: 4_611_686_018_427_387_903, limit: 4 }));
    }
}
