//! Catalog filter normalization.
//!
//! Both the product listing and the catalog stats accept the same optional
//! `category` and `search` parameters. Raw query values go through
//! [`CatalogFilter::new`] exactly once; everything downstream switches on
//! [`FilterCase`] instead of re-checking strings.

/// Normalize a raw filter value.
///
/// Trims surrounding whitespace. Absent and blank values mean "no filter".
#[must_use]
pub fn normalize_filter(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

/// Normalize a raw category value.
///
/// Same as [`normalize_filter`], and additionally treats `"All"` (any case)
/// as "no filter".
#[must_use]
pub fn normalize_category(raw: Option<&str>) -> Option<String> {
    normalize_filter(raw).filter(|value| !value.eq_ignore_ascii_case("all"))
}

/// The four combinations of active filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterCase<'a> {
    /// Every product matches.
    Unfiltered,
    /// Exact membership in the product's category set.
    Category(&'a str),
    /// Case-insensitive substring match on the product name.
    Search(&'a str),
    /// Both predicates must hold.
    CategoryAndSearch {
        /// Category label.
        category: &'a str,
        /// Name substring.
        search: &'a str,
    },
}

/// Normalized category and search filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    category: Option<String>,
    search: Option<String>,
}

impl CatalogFilter {
    /// Build a filter from raw query values.
    #[must_use]
    pub fn new(category: Option<&str>, search: Option<&str>) -> Self {
        Self {
            category: normalize_category(category),
            search: normalize_filter(search),
        }
    }

    /// Filter that matches every product.
    #[must_use]
    pub const fn unfiltered() -> Self {
        Self {
            category: None,
            search: None,
        }
    }

    /// Active category, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Active search term, if any.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Which predicates are active.
    #[must_use]
    pub fn case(&self) -> FilterCase<'_> {
        match (self.category.as_deref(), self.search.as_deref()) {
            (None, None) => FilterCase::Unfiltered,
            (Some(category), None) => FilterCase::Category(category),
            (None, Some(search)) => FilterCase::Search(search),
            (Some(category), Some(search)) => FilterCase::CategoryAndSearch { category, search },
        }
    }

    /// Evaluate the filter against a product in memory.
    pub fn matches<'c>(&self, name: &str, categories: impl IntoIterator<Item = &'c str>) -> bool {
        let in_category = |category: &str| categories.into_iter().any(|c| c == category);
        let name_contains = |search: &str| name.to_lowercase().contains(&search.to_lowercase());

        match self.case() {
            FilterCase::Unfiltered => true,
            FilterCase::Category(category) => in_category(category),
            FilterCase::Search(search) => name_contains(search),
            FilterCase::CategoryAndSearch { category, search } => {
                name_contains(search) && in_category(category)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_filter_blank_is_none() {
        assert_eq!(normalize_filter(None), None);
        assert_eq!(normalize_filter(Some("")), None);
        assert_eq!(normalize_filter(Some("   ")), None);
        assert_eq!(normalize_filter(Some(" phone ")), Some("phone".to_string()));
    }

    #[test]
    fn test_normalize_category_all_is_none() {
        assert_eq!(normalize_category(Some("All")), None);
        assert_eq!(normalize_category(Some("all")), None);
        assert_eq!(normalize_category(Some(" ALL ")), None);
        assert_eq!(normalize_category(Some("Gaming")), Some("Gaming".to_string()));
    }

    #[test]
    fn test_filter_cases() {
        assert_eq!(CatalogFilter::new(None, None).case(), FilterCase::Unfiltered);
        assert_eq!(
            CatalogFilter::new(Some("Gaming"), Some("")).case(),
            FilterCase::Category("Gaming")
        );
        assert_eq!(
            CatalogFilter::new(Some("All"), Some("pro")).case(),
            FilterCase::Search("pro")
        );
        assert_eq!(
            CatalogFilter::new(Some("Laptops"), Some("asus")).case(),
            FilterCase::CategoryAndSearch {
                category: "Laptops",
                search: "asus"
            }
        );
    }

    #[test]
    fn test_category_match_is_exact() {
        let filter = CatalogFilter::new(Some("Gaming"), None);
        assert!(filter.matches("PS5 DualSense Controller", ["Gaming", "Accessories"]));
        assert!(!filter.matches("Gaming Mouse", ["Accessories"]));
        assert!(!filter.matches("Anything", ["gaming"]));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let filter = CatalogFilter::new(None, Some("IPHONE"));
        assert!(filter.matches("iPhone 15 Pro", ["Electronics"]));
        assert!(!filter.matches("Galaxy S24", ["Electronics"]));
    }

    #[test]
    fn test_category_and_search_both_required() {
        let filter = CatalogFilter::new(Some("Laptops"), Some("rog"));
        assert!(filter.matches("Asus ROG Zephyrus", ["Laptops", "Gaming"]));
        assert!(!filter.matches("Asus ROG Ally", ["Gaming"]));
        assert!(!filter.matches("MacBook Air", ["Laptops"]));
    }

    #[test]
    fn test_all_equals_unfiltered() {
        assert_eq!(
            CatalogFilter::new(Some("All"), None),
            CatalogFilter::unfiltered()
        );
    }
}
