//! Fixed-size pagination for list and search views.

use serde::Serialize;

use crate::error::DomainError;

/// Posts per page on every paginated view.
pub const PAGE_SIZE: usize = 10;

/// Which page the client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Number(usize),
    Last,
}

impl PageRequest {
    /// Parse the `page` query parameter. Absent means the first page.
    pub fn parse(raw: Option<&str>) -> Result<Self, DomainError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(PageRequest::Number(1)),
            Some("last") => Ok(PageRequest::Last),
            Some(other) => other
                .parse()
                .map(PageRequest::Number)
                .map_err(|_| DomainError::InvalidPage(format!("'{other}' is not a page number"))),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Number(1)
    }
}

/// One page of an ordered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Slice `items` into page `request`. Page N holds items `[10(N-1), 10N)`.
    ///
    /// The first page of an empty collection is valid; any other page outside
    /// `1..=total_pages` is an error.
    pub fn paginate(items: Vec<T>, request: PageRequest) -> Result<Self, DomainError> {
        let total = items.len();
        let total_pages = total.div_ceil(PAGE_SIZE).max(1);

        let page = match request {
            PageRequest::Last => total_pages,
            PageRequest::Number(n) if (1..=total_pages).contains(&n) => n,
            PageRequest::Number(n) => {
                return Err(DomainError::InvalidPage(format!(
                    "page {n} is out of range 1..={total_pages}"
                )));
            }
        };

        let items = items
            .into_iter()
            .skip((page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect();

        Ok(Self {
            items,
            page,
            per_page: PAGE_SIZE,
            total,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        })
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        let items: Vec<usize> = (0..25).collect();

        let first = Page::paginate(items.clone(), PageRequest::Number(1)).unwrap();
        assert_eq!(first.items, (0..10).collect::<Vec<_>>());
        assert!(first.has_next);
        assert!(!first.has_previous);

        let third = Page::paginate(items.clone(), PageRequest::Number(3)).unwrap();
        assert_eq!(third.items, (20..25).collect::<Vec<_>>());
        assert_eq!(third.total_pages, 3);
        assert!(!third.has_next);

        let last = Page::paginate(items, PageRequest::Last).unwrap();
        assert_eq!(last.page, 3);
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let page = Page::paginate(Vec::<u8>::new(), PageRequest::Number(1)).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_out_of_range_pages_fail() {
        let items: Vec<usize> = (0..10).collect();
        assert!(Page::paginate(items.clone(), PageRequest::Number(0)).is_err());
        assert!(Page::paginate(items, PageRequest::Number(2)).is_err());
    }

    #[test]
    fn test_parse_request() {
        assert_eq!(PageRequest::parse(None).unwrap(), PageRequest::Number(1));
        assert_eq!(PageRequest::parse(Some("4")).unwrap(), PageRequest::Number(4));
        assert_eq!(PageRequest::parse(Some("last")).unwrap(), PageRequest::Last);
        assert!(PageRequest::parse(Some("two")).is_err());
    }
}
