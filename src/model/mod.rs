//! Record types for the persisted dataset
//!
//! Every entity the crawler materializes has an explicit record type with
//! statically declared fields; nothing is carried around as loose JSON
//! maps. Engagement metrics and timestamps that the source site does not
//! expose are synthesized (see [`synth`]).

pub mod records;
pub mod synth;

pub use records::{
    ChapterRecord, GenreRecord, JsonDate, NovelMetrics, NovelRecord, DEFAULT_AUTHOR_ID,
    GENRE_CLASS, NOVEL_CLASS,
};
