//! Listing filters: pagination, the sort safelist and result metadata.

use crate::duration::Timing;
use crate::error::ValidationErrors;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE: i64 = 10_000_000;

/// Sort keys accepted by the listing, with and without the `-` prefix.
pub const SORT_SAFELIST: &[&str] = &[
    "id",
    "name",
    "prep_time",
    "active_time",
    "-id",
    "-name",
    "-prep_time",
    "-active_time",
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    #[default]
    Id,
    Name,
    PrepTime,
    ActiveTime,
}

impl SortColumn {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "id" => Some(SortColumn::Id),
            "name" => Some(SortColumn::Name),
            "prep_time" => Some(SortColumn::PrepTime),
            "active_time" => Some(SortColumn::ActiveTime),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Page window and sort key for a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: "id".to_string(),
        }
    }
}

impl Filters {
    /// Resolves the sort key. Anything outside the safelist sorts by ascending id.
    pub fn sort_order(&self) -> (SortColumn, Direction) {
        let (key, direction) = match self.sort.strip_prefix('-') {
            Some(key) => (key, Direction::Desc),
            None => (self.sort.as_str(), Direction::Asc),
        };
        match SortColumn::from_key(key) {
            Some(column) => (column, direction),
            None => (SortColumn::Id, Direction::Asc),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.page > 0, "page", "must be greater than zero");
        errors.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        errors.check(self.page_size > 0, "page_size", "must be greater than zero");
        errors.check(
            self.page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );
        errors.check(
            SORT_SAFELIST.contains(&self.sort.as_str()),
            "sort",
            "invalid sort value",
        );
        errors.into_result()
    }
}

/// Everything the lister filters on. Empty strings, empty lists and zero
/// timings mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Case-insensitive substring of the recipe name.
    pub name: String,
    /// A recipe matches if any of its ingredient names contains any of these.
    pub ingredients: Vec<String>,
    /// A recipe matches if any of its equipment names contains any of these.
    pub equipment: Vec<String>,
    pub max_prep_time: Timing,
    pub max_active_time: Timing,
    pub filters: Filters,
}

/// Pagination details returned alongside a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    /// An empty result still reports a single (empty) page.
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        let last_page = if total_records == 0 || page_size <= 0 {
            1
        } else {
            (total_records + page_size - 1) / page_size
        };
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page,
            total_records,
        }
    }
}
