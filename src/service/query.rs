//! Turns raw pagination, sort and filter inputs into a bounded list query.
//!
//! Page and page size are normalised and never rejected. An unknown sort field
//! is dropped with a warning, while an unknown sort direction or an inverted
//! numeric range is a validation error.

use crate::error::CatalogError;

pub const ALLOWED_PAGE_SIZES: [u32; 3] = [10, 20, 50];
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Name,
    Height,
    Weight,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(SortField::Name),
            "height" => Some(SortField::Height),
            "weight" => Some(SortField::Weight),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Height => "height",
            SortField::Weight => "weight",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

/// Record predicate: case-insensitive name substring plus inclusive numeric bounds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filters {
    pub name: Option<String>,
    pub min_height: Option<i32>,
    pub max_height: Option<i32>,
    pub min_weight: Option<i32>,
    pub max_weight: Option<i32>,
}

impl Filters {
    fn validate(&self) -> Result<(), CatalogError> {
        if let (Some(min), Some(max)) = (self.min_height, self.max_height) {
            if min > max {
                return Err(CatalogError::validation(
                    "minHeight",
                    "invalid height range: minHeight cannot be greater than maxHeight",
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_weight, self.max_weight) {
            if min > max {
                return Err(CatalogError::validation(
                    "minWeight",
                    "invalid weight range: minWeight cannot be greater than maxWeight",
                ));
            }
        }
        Ok(())
    }

    /// Evaluate the predicate in memory; mirrors the SQL WHERE clause.
    pub fn matches(&self, name: &str, height: i32, weight: i32) -> bool {
        if let Some(needle) = &self.name {
            if !name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        self.min_height.map_or(true, |m| height >= m)
            && self.max_height.map_or(true, |m| height <= m)
            && self.min_weight.map_or(true, |m| weight >= m)
            && self.max_weight.map_or(true, |m| weight <= m)
    }
}

/// Raw list inputs after the HTTP layer has parsed numbers.
#[derive(Clone, Debug, Default)]
pub struct ListRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub filters: Filters,
}

/// Validated list query handed to the record store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: Filters,
    pub sort: Option<Sort>,
    pub page: u32,
    pub limit: u32,
}

impl ListQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn build(req: ListRequest) -> Result<Self, CatalogError> {
        let page = normalize_page(req.page);
        let limit = normalize_limit(req.limit);

        let order = match req.sort_order.as_deref() {
            None => SortOrder::default(),
            Some(raw) => SortOrder::parse(raw).ok_or_else(|| {
                CatalogError::validation("sortOrder", "invalid sortOrder parameter. must be 'asc' or 'desc'")
            })?,
        };

        let sort = match req.sort_by.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => match SortField::parse(raw) {
                Some(field) => Some(Sort { field, order }),
                None => {
                    tracing::warn!(sort_by = %raw, "unknown sortBy field, using default order");
                    None
                }
            },
        };

        let mut filters = req.filters;
        filters.name = filters
            .name
            .take()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        filters.validate()?;

        Ok(ListQuery {
            filters,
            sort,
            page,
            limit,
        })
    }
}

fn normalize_page(page: Option<i64>) -> u32 {
    page.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32
}

fn normalize_limit(limit: Option<i64>) -> u32 {
    limit
        .and_then(|l| u32::try_from(l).ok())
        .filter(|l| ALLOWED_PAGE_SIZES.contains(l))
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

pub fn total_pages(total_items: u64, page_size: u32) -> u64 {
    total_items.div_ceil(u64::from(page_size))
}
