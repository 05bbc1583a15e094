use serde::{Deserialize, Serialize};
use std::{fmt, num::NonZeroUsize};

/// Maximum number of rows a single page may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageSize {
    Bounded(NonZeroUsize),
    /// The whole result arrives as one page.
    Unbounded,
}

impl PageSize {
    pub fn new(rows: usize) -> Self {
        NonZeroUsize::new(rows)
            .map(PageSize::Bounded)
            .unwrap_or(PageSize::Unbounded)
    }

    /// Interprets the signed page size callers traditionally pass around:
    /// `i32::MAX` and non-positive values disable paging.
    pub fn from_i32(rows: i32) -> Self {
        if rows <= 0 || rows == i32::MAX {
            PageSize::Unbounded
        } else {
            PageSize::new(rows as usize)
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            PageSize::Bounded(n) => Some(n.get()),
            PageSize::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, PageSize::Unbounded)
    }

    /// Number of rows the next page holds when `remaining` rows are left.
    pub fn take(&self, remaining: usize) -> usize {
        match self {
            PageSize::Bounded(n) => remaining.min(n.get()),
            PageSize::Unbounded => remaining,
        }
    }
}

impl From<i32> for PageSize {
    fn from(rows: i32) -> Self {
        PageSize::from_i32(rows)
    }
}

impl From<usize> for PageSize {
    fn from(rows: usize) -> Self {
        PageSize::new(rows)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Bounded(n) => write!(f, "{n}"),
            PageSize::Unbounded => write!(f, "unbounded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_i32() {
        assert_eq!(PageSize::from_i32(10).limit(), Some(10));
        assert!(PageSize::from_i32(i32::MAX).is_unbounded());
        assert!(PageSize::from_i32(0).is_unbounded());
        assert!(PageSize::from_i32(-5).is_unbounded());
    }

    #[test]
    fn test_take() {
        assert_eq!(PageSize::from_i32(10).take(1003), 10);
        assert_eq!(PageSize::from_i32(10).take(3), 3);
        assert_eq!(PageSize::Unbounded.take(1003), 1003);
    }
}
