pub mod cache;
pub mod config;
pub mod cost;
pub mod fetch;
pub mod io;
pub mod model;
pub mod overrides;
pub mod pipeline;
pub mod project;
pub mod rates;
pub mod storage;
pub mod validate;
