//! Gmail system labels and the inbox category and priority derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Gmail system label IDs.
pub mod label {
    /// Message is in the inbox.
    pub const INBOX: &str = "INBOX";
    /// Message has not been read.
    pub const UNREAD: &str = "UNREAD";
    /// Gmail marked the message important.
    pub const IMPORTANT: &str = "IMPORTANT";
    /// User starred the message.
    pub const STARRED: &str = "STARRED";
    /// Personal mail tab.
    pub const CATEGORY_PERSONAL: &str = "CATEGORY_PERSONAL";
    /// Social networks tab.
    pub const CATEGORY_SOCIAL: &str = "CATEGORY_SOCIAL";
    /// Deals and offers tab.
    pub const CATEGORY_PROMOTIONS: &str = "CATEGORY_PROMOTIONS";
    /// Notifications, receipts and statements tab.
    pub const CATEGORY_UPDATES: &str = "CATEGORY_UPDATES";
    /// Mailing lists and discussion boards tab.
    pub const CATEGORY_FORUMS: &str = "CATEGORY_FORUMS";
}

fn has_label(labels: &[String], id: &str) -> bool {
    labels.iter().any(|l| l == id)
}

/// Inbox tab a message is sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Person-to-person mail and anything not sorted elsewhere.
    #[default]
    Primary,
    /// Social networks and media sharing sites.
    Social,
    /// Deals, offers and marketing.
    Promotions,
    /// Confirmations, receipts, bills and statements.
    Updates,
    /// Online groups, discussion boards and mailing lists.
    Forums,
}

impl Category {
    /// Categories checked against labels, in precedence order.
    const LABELLED: [Self; 4] = [Self::Social, Self::Promotions, Self::Updates, Self::Forums];

    /// All categories, in tab order.
    pub const ALL: [Self; 5] = [
        Self::Primary,
        Self::Social,
        Self::Promotions,
        Self::Updates,
        Self::Forums,
    ];

    /// Derives the category from a message's labels.
    ///
    /// The first of social, promotions, updates and forums whose label is
    /// present wins; without any of them the message is primary.
    #[must_use]
    pub fn from_labels(labels: &[String]) -> Self {
        Self::LABELLED
            .into_iter()
            .find(|category| has_label(labels, category.label_id()))
            .unwrap_or_default()
    }

    /// Gmail label ID of this category.
    #[must_use]
    pub const fn label_id(&self) -> &'static str {
        match self {
            Self::Primary => label::CATEGORY_PERSONAL,
            Self::Social => label::CATEGORY_SOCIAL,
            Self::Promotions => label::CATEGORY_PROMOTIONS,
            Self::Updates => label::CATEGORY_UPDATES,
            Self::Forums => label::CATEGORY_FORUMS,
        }
    }

    /// Parse from string representation; unknown values are primary.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "social" => Self::Social,
            "promotions" => Self::Promotions,
            "updates" => Self::Updates,
            "forums" => Self::Forums,
            _ => Self::Primary,
        }
    }

    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Social => "social",
            Self::Promotions => "promotions",
            Self::Updates => "updates",
            Self::Forums => "forums",
        }
    }

    /// Human-readable tab name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Primary => "Primary",
            Self::Social => "Social",
            Self::Promotions => "Promotions",
            Self::Updates => "Updates",
            Self::Forums => "Forums",
        }
    }

    /// Gmail search operator selecting this tab, e.g. `category:social`.
    #[must_use]
    pub fn search_query(&self) -> String {
        format!("category:{}", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Display priority of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Marked important.
    High,
    /// Starred but not important.
    Starred,
    /// Neither.
    #[default]
    Normal,
}

impl Priority {
    /// Derives priority from labels; importance outranks a star.
    #[must_use]
    pub fn from_labels(labels: &[String]) -> Self {
        if has_label(labels, label::IMPORTANT) {
            Self::High
        } else if has_label(labels, label::STARRED) {
            Self::Starred
        } else {
            Self::Normal
        }
    }

    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Starred => "starred",
            Self::Normal => "normal",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(ids: &[&str]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_category_from_labels() {
        assert_eq!(Category::from_labels(&labels(&[])), Category::Primary);
        assert_eq!(
            Category::from_labels(&labels(&["INBOX", "CATEGORY_PERSONAL"])),
            Category::Primary
        );
        assert_eq!(
            Category::from_labels(&labels(&["STARRED", "CATEGORY_SOCIAL"])),
            Category::Social
        );
        assert_eq!(
            Category::from_labels(&labels(&["CATEGORY_FORUMS"])),
            Category::Forums
        );
    }

    #[test]
    fn test_category_precedence_follows_fixed_order() {
        assert_eq!(
            Category::from_labels(&labels(&["CATEGORY_FORUMS", "CATEGORY_UPDATES"])),
            Category::Updates
        );
        assert_eq!(
            Category::from_labels(&labels(&["CATEGORY_PROMOTIONS", "CATEGORY_SOCIAL"])),
            Category::Social
        );
    }

    #[test]
    fn test_category_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), category);
        }
    }

    #[test]
    fn test_category_search_query() {
        assert_eq!(Category::Promotions.search_query(), "category:promotions");
    }

    #[test]
    fn test_priority_from_labels() {
        assert_eq!(Priority::from_labels(&labels(&[])), Priority::Normal);
        assert_eq!(
            Priority::from_labels(&labels(&["STARRED"])),
            Priority::Starred
        );
        assert_eq!(
            Priority::from_labels(&labels(&["IMPORTANT", "STARRED"])),
            Priority::High
        );
        assert_eq!(
            Priority::from_labels(&labels(&["STARRED", "IMPORTANT"])),
            Priority::High
        );
    }
}
