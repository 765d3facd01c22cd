pub mod scrape;
pub mod build;
pub mod publish;
