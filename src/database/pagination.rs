use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct PageContext<T> {
    pub rows: Vec<T>,
    pub total_rows: i64,
    pub next_offset: Option<i64>,
    pub prev_offset: Option<i64>,
}

impl<T> PageContext<T> {
    /// Builds a page from a window-counted result set. The total comes
    /// from a `COUNT(*) OVER()` column on the rows themselves, so an
    /// offset past the last row yields an empty page with a zero total
    /// and no navigation offsets.
    pub fn from_rows(rows: Vec<T>, total_rows: i64, page_size: i64, current_offset: i64) -> Self {
        if rows.is_empty() {
            return Self::no_rows();
        }

        let next_offset = match current_offset + page_size < total_rows {
            true => Some(current_offset + page_size),
            false => None,
        };
        let prev_offset = match current_offset > 0 {
            true => Some((current_offset - page_size).max(0)),
            false => None,
        };

        Self {
            rows,
            total_rows,
            next_offset,
            prev_offset,
        }
    }

    pub fn no_rows() -> Self {
        Self {
            rows: vec![],
            total_rows: 0,
            next_offset: None,
            prev_offset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_has_no_prev_offset() {
        let page = PageContext::from_rows(vec![1, 2, 3], 7, 3, 0);
        assert_eq!(page.prev_offset, None);
        assert_eq!(page.next_offset, Some(3));
        assert_eq!(page.total_rows, 7);
    }

    #[test]
    fn middle_page_has_both_offsets() {
        let page = PageContext::from_rows(vec![4, 5, 6], 7, 3, 3);
        assert_eq!(page.prev_offset, Some(0));
        assert_eq!(page.next_offset, Some(6));
    }

    #[test]
    fn last_page_has_no_next_offset() {
        let page = PageContext::from_rows(vec![7], 7, 3, 6);
        assert_eq!(page.prev_offset, Some(3));
        assert_eq!(page.next_offset, None);
    }

    #[test]
    fn offset_past_the_end_collapses_to_empty_page() {
        // No rows means no window count either, whatever the caller
        // passes as the total.
        let page: PageContext<i32> = PageContext::from_rows(vec![], 7, 3, 9);
        assert_eq!(page.total_rows, 0);
        assert_eq!(page.next_offset, None);
        assert_eq!(page.prev_offset, None);
    }

    #[test]
    fn empty_result_collapses_to_no_rows() {
        let page: PageContext<i32> = PageContext::from_rows(vec![], 0, 3, 0);
        assert_eq!(page.total_rows, 0);
        assert_eq!(page.next_offset, None);
        assert_eq!(page.prev_offset, None);
    }
}
