//! Query parameter encoding for list endpoints.
//!
//! Unset values are left out of the query string entirely rather than sent empty.

use std::fmt::Display;

/// Query key for the page number.
pub const PAGE_NUMBER_KEY: &str = "page[number]";

/// Query key for the page size.
pub const PAGE_SIZE_KEY: &str = "page[size]";

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: &'static str, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append the pagination keys set in `options`.
    pub fn push_list_options(&mut self, options: &ListOptions) {
        self.push_opt(PAGE_NUMBER_KEY, options.page_number);
        self.push_opt(PAGE_SIZE_KEY, options.page_size);
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.pairs
    }
}

/// Pagination options shared by list endpoints.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// The page number to request (1-based).
    pub page_number: Option<u32>,
    /// The number of elements per page.
    pub page_size: Option<u32>,
}

impl ListOptions {
    /// Request a specific page.
    #[must_use]
    pub const fn page(number: u32, size: u32) -> Self {
        Self {
            page_number: Some(number),
            page_size: Some(size),
        }
    }
}
