pub mod animation;
pub mod plotting;
pub mod summary;
