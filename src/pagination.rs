//! This modules defines the common functionality for paging data.

use crate::validation::InvalidValue;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The number of items per page when the request does not specify a limit.
    pub default_page_size: u64,
    /// The largest limit a request may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 500,
        }
    }
}

/// A validated, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The page number, starting from 1.
    pub number: u64,
    /// The maximum number of items on a page.
    pub limit: u64,
}

impl Page {
    /// The number of items to skip to reach this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1).saturating_mul(self.limit)
    }
}

impl PaginationConfig {
    /// Parse the raw `page` query parameter, defaulting to the first page.
    pub fn parse_page(&self, raw_page: Option<&str>) -> Result<u64, InvalidValue> {
        match raw_page {
            None => Ok(1),
            Some(raw_page) => match raw_page.trim().parse::<u64>() {
                Ok(page) if page >= 1 => Ok(page),
                _ => Err(InvalidValue::new("page must be a positive integer")),
            },
        }
    }

    /// Parse the raw `limit` query parameter, defaulting to [PaginationConfig::default_page_size].
    pub fn parse_limit(&self, raw_limit: Option<&str>) -> Result<u64, InvalidValue> {
        let Some(raw_limit) = raw_limit else {
            return Ok(self.default_page_size);
        };

        match raw_limit.trim().parse::<u64>() {
            Ok(limit) if (1..=self.max_page_size).contains(&limit) => Ok(limit),
            _ => Err(InvalidValue(format!(
                "limit must be an integer between 1 and {}",
                self.max_page_size
            ))),
        }
    }
}
