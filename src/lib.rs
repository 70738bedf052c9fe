pub mod app;
pub mod cache;
pub mod config;
pub mod domain;
pub mod format;
pub mod observer;
pub mod store;
