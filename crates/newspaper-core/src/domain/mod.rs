//! Domain entities - the core business objects.

mod category;
mod permission;
mod post;

pub use category::{Category, NAME_MAX_LEN, NewCategory, Subscription};
pub use permission::{Caller, POST_EDITOR, Permission};
pub use post::{PREVIEW_LEN, Post, PostDraft, PostKind, TITLE_MAX_LEN, derive_preview};
