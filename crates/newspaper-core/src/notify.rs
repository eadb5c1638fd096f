//! Subscriber notification on category attachment.
//!
//! When categories are added to a post, every subscriber of every added
//! category receives one combined message. Recipients are collected in
//! category order and duplicates are kept: an address subscribed to two of
//! the added categories appears twice. A message with no recipients is not
//! sent at all.

use std::sync::Arc;

use askama::Template;

use crate::domain::{Category, Post};
use crate::ports::{MailError, Mailer, OutgoingEmail};

/// Site-wide values the notification needs.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Public base URL of the site, without a trailing slash.
    pub site_url: String,
    pub from_address: String,
}

impl NotificationConfig {
    pub fn new(site_url: impl Into<String>, from_address: impl Into<String>) -> Self {
        let site_url = site_url.into();
        Self {
            site_url: site_url.trim_end_matches('/').to_string(),
            from_address: from_address.into(),
        }
    }

    /// Absolute link to a post's detail page.
    pub fn post_link(&self, post: &Post) -> String {
        format!("{}/news/{}", self.site_url, post.id)
    }
}

/// A change to the set of categories attached to a post.
#[derive(Debug, Clone)]
pub enum CategoryChange {
    /// Categories newly attached.
    Added(Vec<Category>),
    Removed(Vec<Category>),
    Cleared,
}

/// Outcome of handling a category change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Sent { recipients: usize },
    /// Categories were added but nobody subscribes to them.
    Skipped,
    /// The change was not an addition.
    Ignored,
}

#[derive(Template)]
#[template(path = "news_created_email.html")]
struct NewPostEmail<'a> {
    text: &'a str,
    link: &'a str,
}

/// Sends the "new post in your category" email.
#[derive(Clone)]
pub struct NotificationDispatcher {
    config: NotificationConfig,
    mailer: Arc<dyn Mailer>,
}

impl NotificationDispatcher {
    pub fn new(config: NotificationConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self { config, mailer }
    }

    /// React to a category change. Only additions notify anyone.
    pub async fn handle(&self, post: &Post, change: &CategoryChange) -> Result<Dispatch, MailError> {
        match change {
            CategoryChange::Added(categories) => self.notify(post, categories).await,
            CategoryChange::Removed(_) | CategoryChange::Cleared => Ok(Dispatch::Ignored),
        }
    }

    /// Send one message about `post` to the subscribers of `added`.
    pub async fn notify(&self, post: &Post, added: &[Category]) -> Result<Dispatch, MailError> {
        let recipients = collect_recipients(added);
        if recipients.is_empty() {
            tracing::debug!(post_id = %post.id, "No subscribers for added categories, skipping");
            return Ok(Dispatch::Skipped);
        }

        let email = self.compose(post, recipients)?;
        let count = email.to.len();

        tracing::debug!(
            post_id = %post.id,
            to = ?email.to.iter().map(|e| mask_email(e)).collect::<Vec<_>>(),
            "Sending new post notification"
        );
        self.mailer.send(&email).await?;
        tracing::info!(post_id = %post.id, recipients = count, "New post notification sent");

        Ok(Dispatch::Sent { recipients: count })
    }

    /// Render the notification for `post` without sending it.
    pub fn compose(&self, post: &Post, recipients: Vec<String>) -> Result<OutgoingEmail, MailError> {
        let link = self.config.post_link(post);
        let html_body = NewPostEmail {
            text: &post.preview,
            link: &link,
        }
        .render()
        .map_err(|e| MailError::Rendering(e.to_string()))?;

        Ok(OutgoingEmail {
            from: self.config.from_address.clone(),
            to: recipients,
            subject: post.title.clone(),
            text_body: String::new(),
            html_body,
        })
    }
}

/// Subscribers of every category, in order, duplicates included.
pub fn collect_recipients(categories: &[Category]) -> Vec<String> {
    categories
        .iter()
        .flat_map(|c| c.subscribers.iter().cloned())
        .collect()
}

/// Mask an address for logging: `alice@x.com` becomes `a***@x.com`.
pub fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at) => {
            let (local, domain) = email.split_at(at);
            match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{first}***{domain}"),
                _ => format!("***{domain}"),
            }
        }
        None => "***".to_string(),
    }
}
