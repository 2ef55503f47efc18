pub mod country;
pub mod friend;
pub mod ping;
pub mod post;
pub mod profile;
pub mod user;

use serde::Deserialize;

use crate::error::AppError;

/// Offset pagination shared by the friends list and post feeds.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 5;
    pub const MAX_LIMIT: i64 = 50;

    /// Returns `(limit, offset)`, rejecting out-of-range values.
    pub fn bounds(&self) -> Result<(i64, i64), AppError> {
        let limit = self.limit.unwrap_or(Self::DEFAULT_LIMIT);
        if !(0..=Self::MAX_LIMIT).contains(&limit) {
            return Err(AppError::Validation(
                "limit must be between 0 and 50".to_string(),
            ));
        }
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::Validation(
                "offset must be non-negative".to_string(),
            ));
        }
        Ok((limit, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn defaults_apply() {
        let p = Pagination {
            limit: None,
            offset: None,
        };
        assert_eq!(p.bounds().unwrap(), (5, 0));
    }

    #[test]
    fn bounds_enforced() {
        let p = Pagination {
            limit: Some(51),
            offset: None,
        };
        assert!(p.bounds().is_err());

        let p = Pagination {
            limit: Some(0),
            offset: Some(-1),
        };
        assert!(p.bounds().is_err());

        let p = Pagination {
            limit: Some(50),
            offset: Some(100),
        };
        assert_eq!(p.bounds().unwrap(), (50, 100));
    }
}
