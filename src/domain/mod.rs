pub mod engagement;
pub mod feed;
pub mod media;
pub mod post;
pub mod user;
