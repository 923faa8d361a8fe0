//! Offset pagination for list endpoints.

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Rejected pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// `limit` was zero.
    #[error("limit must be greater than zero")]
    ZeroLimit,
    /// `limit` exceeded [`MAX_PAGE_LIMIT`].
    #[error("limit must not exceed {max}")]
    LimitTooLarge { max: u32 },
}

/// Validated offset and limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    offset: u32,
    limit: u32,
}

impl Pagination {
    /// Validate an offset/limit pair.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::{Pagination, PaginationError};
    ///
    /// assert!(Pagination::new(0, 20).is_ok());
    /// assert_eq!(Pagination::new(0, 0), Err(PaginationError::ZeroLimit));
    /// ```
    pub const fn new(offset: u32, limit: u32) -> Result<Self, PaginationError> {
        if limit == 0 {
            return Err(PaginationError::ZeroLimit);
        }
        if limit > MAX_PAGE_LIMIT {
            return Err(PaginationError::LimitTooLarge {
                max: MAX_PAGE_LIMIT,
            });
        }
        Ok(Self { offset, limit })
    }

    /// Number of rows to skip.
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Maximum number of rows to return.
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Apply `f` to every item while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(MAX_PAGE_LIMIT)]
    fn accepts_limits_in_range(#[case] limit: u32) {
        let pagination = Pagination::new(5, limit).expect("valid pagination");
        assert_eq!(pagination.offset(), 5);
        assert_eq!(pagination.limit(), limit);
    }

    #[rstest]
    fn rejects_oversized_limit() {
        assert_eq!(
            Pagination::new(0, MAX_PAGE_LIMIT + 1),
            Err(PaginationError::LimitTooLarge {
                max: MAX_PAGE_LIMIT
            })
        );
    }
}
