//! Dataset statistics
//!
//! Backs the CLI's `--stats` mode: a read-only scan over the archive and
//! the crawl state, summarizing what a crawl has materialized so far.

use crate::state::load_state;
use crate::storage::Archive;

/// Aggregate numbers over the whole archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetStatistics {
    pub novels: u64,
    pub completed_novels: u64,
    pub chapters: u64,
    pub total_words: u64,
    pub genres: u64,
    pub current_page: u32,
}

/// Scans the archive and state file for dataset statistics.
pub fn load_statistics(archive: &Archive) -> DatasetStatistics {
    let state = load_state(&archive.state_path());
    let mut stats = DatasetStatistics {
        genres: archive.load_genres().len() as u64,
        current_page: state.current_page,
        ..DatasetStatistics::default()
    };

    for novel in archive.load_all_novels() {
        stats.novels += 1;
        stats.chapters += novel.chapter_count;
        stats.total_words += novel.word_count;
        if state.progress(&novel.slug).completed {
            stats.completed_novels += 1;
        }
    }
    stats
}

/// Prints dataset statistics to stdout.
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Chapterline Dataset ===\n");
    println!("Novels:            {}", stats.novels);
    println!("  completed:       {}", stats.completed_novels);
    println!("Chapters:          {}", stats.chapters);
    println!("Words:             {}", stats.total_words);
    println!("Genres:            {}", stats.genres);
    println!("Catalog page:      {}", stats.current_page);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::records::{JsonDate, NovelMetrics, NovelRecord, NOVEL_CLASS};
    use crate::state::{save_state, CrawlState, NovelProgress};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn novel(slug: &str, chapters: u64, words: u64) -> NovelRecord {
        let date = JsonDate(
            NaiveDate::from_ymd_opt(2022, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );
        NovelRecord {
            novel_id: "NOV0000001".to_string(),
            title: slug.to_string(),
            alt_title: slug.to_string(),
            slug: slug.to_string(),
            cover_art: String::new(),
            author_name: String::new(),
            author_id: String::new(),
            description: String::new(),
            source: String::new(),
            language: String::new(),
            status: String::new(),
            scraped_status: String::new(),
            approved: true,
            target_audience: String::new(),
            genre_list: vec![],
            chapter_list: vec![],
            chapter_count: chapters,
            word_count: words,
            metrics: NovelMetrics {
                rating_average: 0.0,
                total_rating: 0,
                total_likes: 0,
                total_views: 0,
                total_comments: 0,
                total_upvotes: 0,
                total_follow: 0,
                views_today: 0,
                views_this_week: 0,
                views_this_month: 0,
                views_this_year: 0,
                publication_date: date,
                created: date,
                updated: date,
            },
            class: NOVEL_CLASS.to_string(),
        }
    }

    #[test]
    fn test_statistics_over_archive() {
        let dir = tempdir().unwrap();
        let archive = Archive::open(dir.path()).unwrap();

        archive.write_novel(&novel("alpha", 3, 300), &[]).unwrap();
        archive.write_novel(&novel("beta", 5, 500), &[]).unwrap();

        let mut state = CrawlState::default();
        state.current_page = 2;
        state.processed_novels.insert(
            "alpha".to_string(),
            NovelProgress {
                last_chapter: 3,
                completed: true,
            },
        );
        save_state(&archive.state_path(), &state).unwrap();

        let stats = load_statistics(&archive);
        assert_eq!(stats.novels, 2);
        assert_eq!(stats.completed_novels, 1);
        assert_eq!(stats.chapters, 8);
        assert_eq!(stats.total_words, 800);
        assert_eq!(stats.current_page, 2);
    }

    #[test]
    fn test_statistics_on_empty_archive() {
        let dir = tempdir().unwrap();
        let archive = Archive::open(dir.path()).unwrap();
        assert_eq!(
            load_statistics(&archive),
            DatasetStatistics {
                current_page: 1,
                ..DatasetStatistics::default()
            }
        );
    }
}
