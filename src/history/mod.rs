pub mod store;
pub mod timeline;
pub mod types;
