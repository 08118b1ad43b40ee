pub mod config;
pub mod exporter;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod scraper;
pub mod storage;
pub mod traversal;
