pub mod algorithms;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod models;
pub mod optimizer;
pub mod scoring;
pub mod selection;
pub mod verification;
