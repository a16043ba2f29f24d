// Library for tests to access modules

pub mod aggregator;
pub mod attributes;
pub mod config;
pub mod error;
pub mod format;
pub mod linux;
pub mod models;
pub mod process;
pub mod rate;
pub mod reader;
pub mod routes;
pub mod snapshot_store;
pub mod version;
pub mod worker;
