use serde::{Deserialize, Serialize};

use super::{DomainError, DomainResult, Item};

/// Ordering of discover results. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    #[default]
    PopularityDesc,
    PopularityAsc,
    RatingDesc,
    RatingAsc,
    ReleaseDateDesc,
    ReleaseDateAsc,
}

impl SortOption {
    pub const ALL: [SortOption; 6] = [
        SortOption::PopularityDesc,
        SortOption::PopularityAsc,
        SortOption::RatingDesc,
        SortOption::RatingAsc,
        SortOption::ReleaseDateDesc,
        SortOption::ReleaseDateAsc,
    ];

    /// Value of the upstream `sort_by` parameter
    pub fn api_value(&self) -> &'static str {
        match self {
            SortOption::PopularityDesc => "popularity.desc",
            SortOption::PopularityAsc => "popularity.asc",
            SortOption::RatingDesc => "vote_average.desc",
            SortOption::RatingAsc => "vote_average.asc",
            SortOption::ReleaseDateDesc => "release_date.desc",
            SortOption::ReleaseDateAsc => "release_date.asc",
        }
    }
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_value())
    }
}

/// Discover filters. Replacing the value resets pagination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub genres: Option<Vec<u32>>,
    pub release_year: Option<u16>,
    pub min_rating: Option<f32>,
}

impl FilterOptions {
    pub fn is_empty(&self) -> bool {
        self.genres.as_ref().map_or(true, |g| g.is_empty())
            && self.release_year.is_none()
            && self.min_rating.is_none()
    }
}

/// Everything the transport needs for one discover page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverQuery {
    pub page: u32,
    pub sort: Option<SortOption>,
    pub genres: Option<Vec<u32>>,
    pub release_year: Option<u16>,
    pub min_rating: Option<f32>,
}

impl DiscoverQuery {
    pub fn new(page: u32, sort: SortOption, filter: &FilterOptions) -> Self {
        Self {
            page,
            sort: Some(sort),
            genres: filter.genres.clone().filter(|g| !g.is_empty()),
            release_year: filter.release_year,
            min_rating: filter.min_rating,
        }
    }

    /// Comma-joined genre ids as the upstream expects them
    pub fn genres_param(&self) -> Option<String> {
        self.genres.as_ref().map(|genres| {
            genres
                .iter()
                .map(|g| g.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
    }
}

/// One page of results as reported by the upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<Item>,
    pub total_pages: u32,
}

/// Pagination bookkeeping for the list engine.
///
/// `page` is the next page to request. `total_pages` is the only signal
/// used to detect the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub page: u32,
    pub is_last_page: bool,
}

impl PageCursor {
    pub fn first() -> Self {
        Self {
            page: 1,
            is_last_page: false,
        }
    }

    /// Cursor after `fetched_page` came back successfully
    pub fn advanced(fetched_page: u32, total_pages: u32) -> Self {
        Self {
            page: fetched_page + 1,
            is_last_page: fetched_page >= total_pages,
        }
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::first()
    }
}

/// Search text must contain something besides whitespace
pub fn validate_search_query(query: &str) -> DomainResult<()> {
    if query.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Search query cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Pages are 1-based
pub fn validate_page(page: u32) -> DomainResult<()> {
    if page == 0 {
        return Err(DomainError::InvariantViolation(
            "Page numbers start at 1".to_string(),
        ));
    }
    Ok(())
}
