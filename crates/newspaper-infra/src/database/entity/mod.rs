//! SeaORM entities.

pub mod category;
pub mod category_subscriber;
pub mod post;
pub mod post_category;
