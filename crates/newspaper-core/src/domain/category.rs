use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::required;

/// Longest category name accepted.
pub const NAME_MAX_LEN: usize = 64;

/// Category entity - a topical tag with its own subscriber list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Subscriber email addresses, in subscription order.
    pub subscribers: Vec<String>,
}

impl Category {
    /// Create a new category with no subscribers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            subscribers: Vec::new(),
        }
    }

    /// Add a subscriber. Returns `false` if the address was already subscribed.
    pub fn subscribe(&mut self, email: &str) -> bool {
        if self.is_subscribed(email) {
            return false;
        }
        self.subscribers.push(email.to_string());
        true
    }

    /// Remove a subscriber. Returns `false` if the address was not subscribed.
    pub fn unsubscribe(&mut self, email: &str) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| !s.eq_ignore_ascii_case(email));
        before != self.subscribers.len()
    }

    pub fn is_subscribed(&self, email: &str) -> bool {
        self.subscribers.iter().any(|s| s.eq_ignore_ascii_case(email))
    }
}

/// Name submitted for a new category.
#[derive(Debug, Clone, Validate)]
pub struct NewCategory {
    #[garde(custom(required), length(chars, max = NAME_MAX_LEN))]
    pub name: String,
}

impl NewCategory {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
        }
    }
}

/// An address asking to be told about new posts in a category.
///
/// Addresses are trimmed and lowercased, so one mailbox maps to one
/// subscription.
#[derive(Debug, Clone, Validate)]
pub struct Subscription {
    #[garde(email)]
    pub email: String,
}

impl Subscription {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.trim().to_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_is_idempotent() {
        let mut category = Category::new("Tech");
        assert!(category.subscribe("a@x.com"));
        assert!(!category.subscribe("A@X.com"));
        assert_eq!(category.subscribers, vec!["a@x.com".to_string()]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut category = Category::new("Tech");
        category.subscribe("a@x.com");
        category.subscribe("b@x.com");
        assert!(category.unsubscribe("a@x.com"));
        assert!(!category.unsubscribe("a@x.com"));
        assert_eq!(category.subscribers, vec!["b@x.com".to_string()]);
    }

    #[test]
    fn test_name_validation() {
        assert!(NewCategory::new("Sport").validate(&()).is_ok());
        assert!(NewCategory::new("   ").validate(&()).is_err());
        assert!(NewCategory::new(&"n".repeat(NAME_MAX_LEN + 1)).validate(&()).is_err());
    }

    #[test]
    fn test_subscription_normalizes_address() {
        let subscription = Subscription::new("  Alice@Example.COM ");
        assert_eq!(subscription.email, "alice@example.com");
        assert!(subscription.validate(&()).is_ok());
    }

    #[test]
    fn test_subscription_rejects_non_mailboxes() {
        for email in [
            "no-at-sign",
            "@x.com",
            "a@",
            "a b@x.com",
            "a(b)@x.com",
            "a<b>@x.com",
            "a\"b@x.com",
            "a@x_y!.com",
        ] {
            assert!(Subscription::new(email).validate(&()).is_err(), "{email}");
        }
    }
}
