//! Data models for Bookshelf

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod page;
pub mod renewal;
pub mod user;
