//! Page request and page result value objects.
//!
//! # Invariants
//! - Page numbers are zero-based.
//! - `PageRequest` page size is always within `1..=PAGE_SIZE_MAX`.
//! - `Page::from_fetch` only runs the count step when the fetched rows cannot
//!   determine the total on their own.

use crate::query::column::Column;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const PAGE_SIZE_MAX: u32 = 100;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parses `asc`/`desc` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: Column,
    pub direction: Direction,
}

/// Ordered list of sort keys. Empty means "storage order".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(column: Column, direction: Direction) -> Self {
        Self::unsorted().and(column, direction)
    }

    /// Appends a secondary sort key.
    pub fn and(mut self, column: Column, direction: Direction) -> Self {
        self.orders.push(Order { column, direction });
        self
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Zero-based page window with an optional sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

impl PageRequest {
    /// Creates an unsorted request. `size` is normalized by
    /// [`normalize_page_size`].
    pub fn of(page: u32, size: u32) -> Self {
        Self {
            page,
            size: normalize_page_size(Some(size)),
            sort: Sort::unsorted(),
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn page_number(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.size
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }
}

/// Normalizes page size: missing or `0` -> default, above max -> max.
pub fn normalize_page_size(size: Option<u32>) -> u32 {
    match size {
        Some(0) | None => DEFAULT_PAGE_SIZE,
        Some(value) if value > PAGE_SIZE_MAX => PAGE_SIZE_MAX,
        Some(value) => value,
    }
}

/// One page of results plus the total element count of the unpaged query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    content: Vec<T>,
    request: PageRequest,
    total: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            content,
            request,
            total,
        }
    }

    /// Builds a page from already-fetched rows, calling `count` only when
    /// needed.
    ///
    /// On the first page (offset `0`) a short fetch (fewer rows than the page
    /// size) already is the whole result, so its length is the total and
    /// `count` is never invoked. Every other case runs `count`; its error is
    /// returned unchanged.
    pub fn from_fetch<E, F>(content: Vec<T>, request: PageRequest, count: F) -> Result<Self, E>
    where
        F: FnOnce() -> Result<u64, E>,
    {
        let fetched = content.len() as u64;
        if request.offset() == 0 && fetched < u64::from(request.page_size()) {
            return Ok(Self::new(content, request, fetched));
        }
        let total = count()?;
        Ok(Self::new(content, request, total))
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    pub fn number(&self) -> u32 {
        self.request.page_number()
    }

    pub fn size(&self) -> u32 {
        self.request.page_size()
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn total_elements(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.size()))
    }

    pub fn is_first(&self) -> bool {
        self.number() == 0
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number()) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number() > 0
    }

    /// Converts the content while keeping request and total.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            request: self.request,
            total: self.total,
        }
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Page", 7)?;
        state.serialize_field("content", &self.content)?;
        state.serialize_field("pageNumber", &self.number())?;
        state.serialize_field("pageSize", &self.size())?;
        state.serialize_field("totalElements", &self.total)?;
        state.serialize_field("totalPages", &self.total_pages())?;
        state.serialize_field("first", &self.is_first())?;
        state.serialize_field("last", &self.is_last())?;
        state.end()
    }
}
