use serde::{Deserialize, Serialize};

/// Cursor-based page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub first: usize,
    pub after: Option<String>,
}

impl Page {
    pub fn first(first: usize) -> Self {
        Self { first, after: None }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// One page of a paginated collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            page_info: PageInfo::default(),
        }
    }

    /// Request for the following page, if there is one
    pub fn next_page(&self, first: usize) -> Option<Page> {
        if !self.page_info.has_next_page {
            return None;
        }
        let cursor = self.page_info.end_cursor.clone()?;
        Some(Page::first(first).after(cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_page() {
        let conn = Connection {
            items: vec![1, 2],
            page_info: PageInfo {
                has_next_page: true,
                end_cursor: Some("2".to_string()),
            },
        };
        assert_eq!(conn.next_page(2), Some(Page::first(2).after("2")));

        let done = Connection::last(vec![3]);
        assert_eq!(done.next_page(2), None);
    }
}
