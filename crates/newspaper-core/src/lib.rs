//! # NewsPaper Core
//!
//! The domain layer of the NewsPaper site.
//! Posts, categories, the search filter and the subscriber notification
//! workflow live here, with no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod filter;
pub mod notify;
pub mod pagination;
pub mod ports;
pub mod service;

pub use error::DomainError;
pub use filter::PostFilter;
pub use notify::{CategoryChange, Dispatch, NotificationConfig, NotificationDispatcher};
pub use pagination::{PAGE_SIZE, Page, PageRequest};
pub use service::NewsService;
