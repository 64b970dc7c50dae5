//! Paging policy shared by the result set and its tests.

/// Documents requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// The service never reports a total, so a short page is the only signal that
/// nothing follows. Everything that needs to know whether more pages exist
/// asks this predicate.
pub fn page_exhausted(returned: usize, page_size: usize) -> bool {
    returned < page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_page_is_not_exhausted() {
        assert!(!page_exhausted(10, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn short_or_empty_page_is_exhausted() {
        assert!(page_exhausted(9, DEFAULT_PAGE_SIZE));
        assert!(page_exhausted(0, DEFAULT_PAGE_SIZE));
    }
}
