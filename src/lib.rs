pub mod cli;
pub mod config;
pub mod gitlab;
pub mod logging;
pub mod parser;
pub mod report;
pub mod scan;
pub mod version;
