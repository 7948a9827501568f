pub mod auth;
pub mod engagement;
pub mod feed;
pub mod media;
pub mod posts;
pub mod session;
pub mod users;
