//! Pagination and sort parameters.
//!
//! Pages are zero-based. Sort parameters use the `field,direction` form
//! (`price,desc`); the field must be one of a fixed whitelist per resource,
//! and the direction is ascending unless it says `desc` (any case).

use core::fmt;

use serde::Serialize;

use crate::validation::ValidationError;

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    /// Items per page, in `1..=MAX_PAGE_SIZE`.
    pub size: u32,
}

impl PageRequest {
    /// Build a page request from raw query values.
    ///
    /// Missing values default to page 0 and size 10. Sizes outside
    /// `1..=100` are clamped.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPage` for a negative page index.
    pub fn from_query(page: Option<i64>, size: Option<i64>) -> Result<Self, ValidationError> {
        let page = match page {
            None => 0,
            Some(p) => u32::try_from(p).map_err(|_| ValidationError::InvalidPage(p))?,
        };
        let size = size.map_or(DEFAULT_PAGE_SIZE, |s| {
            let clamped = s.clamp(1, i64::from(MAX_PAGE_SIZE));
            u32::try_from(clamped).unwrap_or(DEFAULT_PAGE_SIZE)
        });
        Ok(Self { page, size })
    }

    /// Number of items to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }

    /// Page size as a `LIMIT` value.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the totals needed to navigate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub content: Vec<T>,
    /// Items across all pages.
    pub total_elements: u64,
    /// Number of pages.
    pub total_pages: u64,
    /// Zero-based index of this page.
    pub number: u32,
    /// Requested page size.
    pub size: u32,
    /// Whether this is the first page.
    pub first: bool,
    /// Whether this is the last page.
    pub last: bool,
}

impl<T> Page<T> {
    /// Assemble a page from its content and the total item count.
    #[must_use]
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size.max(1));
        let total_pages = total_elements.div_ceil(size);
        Self {
            content,
            total_elements,
            total_pages,
            number: request.page,
            size: request.size,
            first: request.page == 0,
            last: u64::from(request.page) + 1 >= total_pages,
        }
    }

    /// Slice an in-memory, already sorted collection into a page.
    #[must_use]
    pub fn from_sorted(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len() as u64;
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let content = items.into_iter().skip(skip).take(take).collect();
        Self::new(content, request, total)
    }

    /// Transform every item, keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
            first: self.first,
            last: self.last,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// Parse a direction. Anything other than `desc` (any case) is ascending.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Apply this direction to an ascending comparison.
    #[must_use]
    pub const fn apply(self, ordering: core::cmp::Ordering) -> core::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// A whitelisted sortable field.
pub trait SortField: Sized + Copy {
    /// Sort used when the client sends none.
    const DEFAULT: SortSpec<Self>;

    /// Look up a field by its API name.
    fn from_name(name: &str) -> Option<Self>;

    /// API name of the field.
    fn name(self) -> &'static str;

    /// Column expression used in `ORDER BY`.
    fn column(self) -> &'static str;
}

/// A parsed `field,direction` sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    /// Field to sort by.
    pub field: F,
    /// Direction.
    pub direction: SortDirection,
}

impl<F: SortField> SortSpec<F> {
    /// Parse a raw `field,direction` value.
    ///
    /// Missing or blank input yields the field's default sort.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidSort` for a field outside the
    /// whitelist.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(F::DEFAULT);
        };

        let mut parts = raw.split(',');
        let field_name = parts.next().unwrap_or_default().trim();
        let direction = parts.next().map_or(SortDirection::Asc, SortDirection::parse);

        let field = F::from_name(field_name)
            .ok_or_else(|| ValidationError::InvalidSort(field_name.to_owned()))?;
        Ok(Self { field, direction })
    }
}

impl<F: SortField> fmt::Display for SortSpec<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{},{direction}", self.field.name())
    }
}

/// Sortable product fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortField {
    /// Product id.
    Id,
    /// Product name.
    Name,
    /// Price.
    Price,
    /// Denormalized average rating.
    AverageRating,
    /// Denormalized review count.
    ReviewCount,
}

impl SortField for ProductSortField {
    const DEFAULT: SortSpec<Self> = SortSpec {
        field: Self::Name,
        direction: SortDirection::Asc,
    };

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "price" => Some(Self::Price),
            "averageRating" => Some(Self::AverageRating),
            "reviewCount" => Some(Self::ReviewCount),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Price => "price",
            Self::AverageRating => "averageRating",
            Self::ReviewCount => "reviewCount",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "p.id",
            Self::Name => "LOWER(p.name)",
            Self::Price => "p.price",
            Self::AverageRating => "p.average_rating",
            Self::ReviewCount => "p.review_count",
        }
    }
}

/// Sortable review fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSortField {
    /// Creation timestamp.
    CreatedAt,
    /// Star rating.
    Rating,
    /// Helpful vote count.
    HelpfulCount,
    /// Review id.
    Id,
}

impl SortField for ReviewSortField {
    const DEFAULT: SortSpec<Self> = SortSpec {
        field: Self::CreatedAt,
        direction: SortDirection::Desc,
    };

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "createdAt" => Some(Self::CreatedAt),
            "rating" => Some(Self::Rating),
            "helpfulCount" => Some(Self::HelpfulCount),
            "id" => Some(Self::Id),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::Rating => "rating",
            Self::HelpfulCount => "helpfulCount",
            Self::Id => "id",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "r.created_at",
            Self::Rating => "r.rating",
            Self::HelpfulCount => "COALESCE(r.helpful_count, 0)",
            Self::Id => "r.id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let request = PageRequest::from_query(None, None).expect("valid");
        assert_eq!(request, PageRequest { page: 0, size: 10 });
    }

    #[test]
    fn test_page_request_clamps_size() {
        assert_eq!(
            PageRequest::from_query(Some(0), Some(0)).expect("valid").size,
            1
        );
        assert_eq!(
            PageRequest::from_query(Some(0), Some(5000)).expect("valid").size,
            MAX_PAGE_SIZE
        );
    }

    #[test]
    fn test_page_request_rejects_negative_page() {
        assert_eq!(
            PageRequest::from_query(Some(-1), None),
            Err(ValidationError::InvalidPage(-1))
        );
    }

    #[test]
    fn test_page_over_twenty_five_items() {
        let items: Vec<u32> = (0..25).collect();

        let first = Page::from_sorted(items.clone(), PageRequest { page: 0, size: 10 });
        assert_eq!(first.content.len(), 10);
        assert_eq!(first.total_elements, 25);
        assert_eq!(first.total_pages, 3);
        assert!(first.first);
        assert!(!first.last);

        let third = Page::from_sorted(items, PageRequest { page: 2, size: 10 });
        assert_eq!(third.content, vec![20, 21, 22, 23, 24]);
        assert!(third.last);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let page = Page::from_sorted(vec![1, 2, 3], PageRequest { page: 4, size: 10 });
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 3);
        assert!(page.last);
    }

    #[test]
    fn test_empty_page_is_first_and_last() {
        let page: Page<u32> = Page::from_sorted(Vec::new(), PageRequest::default());
        assert_eq!(page.total_pages, 0);
        assert!(page.first && page.last);
    }

    #[test]
    fn test_page_json_shape() {
        let page = Page::new(vec!["a"], PageRequest { page: 1, size: 1 }, 3);
        let json = serde_json::to_value(&page).expect("serialize");
        assert_eq!(json["content"], serde_json::json!(["a"]));
        assert_eq!(json["totalElements"], 3);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["number"], 1);
        assert_eq!(json["size"], 1);
    }

    #[test]
    fn test_sort_defaults() {
        assert_eq!(
            SortSpec::<ProductSortField>::parse(None).expect("valid").to_string(),
            "name,asc"
        );
        assert_eq!(
            SortSpec::<ReviewSortField>::parse(Some("")).expect("valid").to_string(),
            "createdAt,desc"
        );
    }

    #[test]
    fn test_sort_direction_is_case_insensitive() {
        let sort = SortSpec::<ProductSortField>::parse(Some("price,DESC")).expect("valid");
        assert_eq!(sort.field, ProductSortField::Price);
        assert_eq!(sort.direction, SortDirection::Desc);

        let sort = SortSpec::<ProductSortField>::parse(Some("price,sideways")).expect("valid");
        assert_eq!(sort.direction, SortDirection::Asc);

        let sort = SortSpec::<ProductSortField>::parse(Some("reviewCount")).expect("valid");
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_sort_rejects_unknown_field() {
        assert_eq!(
            SortSpec::<ReviewSortField>::parse(Some("reviewer_name;drop,asc")),
            Err(ValidationError::InvalidSort("reviewer_name;drop".to_string()))
        );
    }

    #[test]
    fn test_sort_ignores_trailing_segments() {
        let sort = SortSpec::<ProductSortField>::parse(Some("name,desc,x")).expect("valid");
        assert_eq!(sort.field, ProductSortField::Name);
        assert_eq!(sort.direction, SortDirection::Desc);
    }
}
