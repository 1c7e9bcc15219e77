//! Index client implementations and response-shape parsers

pub mod metadata;
pub mod pypi;
pub mod simple_page;

pub use pypi::PypiIndexClient;
pub use simple_page::SimplePageParser;
