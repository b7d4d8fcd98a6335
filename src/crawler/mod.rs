//! Crawler module: fetching, page extraction, and crawl orchestration
//!
//! - `fetcher` owns HTTP, the fixed inter-request delay, bounded retries
//!   and the NotFound/Transient absence signal
//! - `parser` turns page markup into scraped structs
//! - `coordinator` is the resumable orchestration loop

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{crawl, Coordinator};
pub use fetcher::{build_http_client, ContentSource, FetchError};
pub use parser::{
    extract_chapter, extract_novel, extract_novel_urls, ScrapedChapter, ScrapedNovel,
};
