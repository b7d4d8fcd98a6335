//! Text utilities: slug derivation, filename sanitizing, and plain-text
//! extraction from scraped HTML fragments.

mod extract;
mod slug;

pub use extract::{chapter_body, strip_tags, word_count};
pub use slug::{safe_filename, slugify};
