pub mod user;
pub mod reef;
pub mod event;
pub mod article;
pub mod gallery_item;
pub mod reef_bookmark;
