//! Inbox list parameters.

use mailglass_core::Category;

/// Default page size for inbox listings.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Which page of the inbox to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxQuery {
    /// Restrict to one inbox tab.
    pub category: Option<Category>,
    /// Extra Gmail search terms, e.g. `from:alice is:unread`.
    pub search: Option<String>,
    /// Maximum number of messages per page.
    pub max_results: u32,
    /// Token from a previous page.
    pub page_token: Option<String>,
}

impl Default for InboxQuery {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            max_results: DEFAULT_PAGE_SIZE,
            page_token: None,
        }
    }
}

impl InboxQuery {
    /// Creates a query for the first page of the whole inbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the listing to one tab.
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Adds search terms.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Continues from a previous page.
    #[must_use]
    pub fn with_page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    /// The Gmail `q` parameter.
    #[must_use]
    pub fn search_query(&self) -> String {
        let mut parts = vec!["in:inbox".to_string()];
        if let Some(category) = self.category {
            parts.push(category.search_query());
        }
        if let Some(search) = self.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            parts.push(search.to_string());
        }
        parts.join(" ")
    }

    /// Query string pairs for `users.messages.list`.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.search_query()),
            ("maxResults", self.max_results.to_string()),
            ("includeSpamTrash", "false".to_string()),
        ];
        if let Some(token) = &self.page_token {
            params.push(("pageToken", token.clone()));
        }
        params
    }
}
