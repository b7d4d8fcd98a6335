//! Crawl coordinator - the resumable orchestration loop
//!
//! Drives pagination over the catalog, per-novel chapter discovery, and
//! the durability cadence: every discovered chapter is persisted (artifact
//! + metadata + state checkpoint) before the next fetch begins, so an
//! interruption loses at most the in-flight unit of work.
//!
//! The loop is strictly sequential: one task, one request in flight, no
//! shared-state locking anywhere.

use std::time::{Duration, Instant};

use url::Url;

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, ContentSource, FetchError};
use crate::crawler::parser::{ScrapedChapter, ScrapedNovel};
use crate::genres::GenreRegistry;
use crate::ids::{EntityKind, IdGenerator};
use crate::model::records::{DEFAULT_AUTHOR_ID, NOVEL_CLASS};
use crate::model::{synth, ChapterRecord, NovelRecord};
use crate::state::{load_state, save_state, CrawlState, NovelProgress};
use crate::storage::Archive;
use crate::text::{slugify, word_count};
use crate::ChapterlineError;

/// Main coordinator structure
pub struct Coordinator {
    config: Config,
    source: ContentSource,
    archive: Archive,
    state: CrawlState,
    ids: IdGenerator,
    genres: GenreRegistry,
    base_url: Url,
}

impl Coordinator {
    /// Wires up the coordinator: opens the archive, loads (or resets) the
    /// crawl state, rebuilds the genre registry from disk, and seeds the
    /// id generator past every identifier the dataset already contains.
    pub fn new(config: Config, fresh: bool) -> Result<Self, ChapterlineError> {
        let archive = Archive::open(&config.output.data_dir)?;
        if fresh {
            tracing::info!("Discarding previous crawl state");
            save_state(&archive.state_path(), &CrawlState::default())?;
        }
        let state = load_state(&archive.state_path());

        let genres = GenreRegistry::from_records(archive.load_genres());
        let ids = IdGenerator::seeded(archive.highest_issued_ids());

        let client = build_http_client(&config.user_agent)?;
        let source = ContentSource::new(
            client,
            Duration::from_millis(config.crawler.request_delay_ms),
            config.crawler.missing_info.clone(),
        );
        let base_url = Url::parse(&config.crawler.base_url)?;

        if !state.processed_novels.is_empty() {
            tracing::info!(
                "Resuming: page {}, {} novels processed, {} known in state",
                state.current_page,
                state.stories_crawled_count,
                state.processed_novels.len()
            );
        }

        Ok(Self {
            config,
            source,
            archive,
            state,
            ids,
            genres,
            base_url,
        })
    }

    /// Runs the crawl until the novel quota is met or the catalog ends.
    pub async fn run(&mut self) -> Result<(), ChapterlineError> {
        let started = Instant::now();
        let quota = self.config.crawler.max_novels;

        while self.state.stories_crawled_count < quota {
            let page = self.state.current_page;
            let page_url = self.listing_page_url(page)?;
            tracing::info!("Fetching novel list from: {}", page_url);

            let novel_urls = match self.source.novel_urls_on_page(&page_url).await {
                Ok(urls) => urls,
                Err(e) => {
                    // A failed listing fetch is indistinguishable from
                    // catalog exhaustion and ends pagination either way.
                    tracing::info!("Listing fetch for page {} failed ({}). Stopping.", page, e);
                    break;
                }
            };
            if novel_urls.is_empty() {
                tracing::info!("No more novels found on page {}. Stopping.", page);
                break;
            }

            for novel_url in novel_urls {
                if self.state.stories_crawled_count >= quota {
                    break;
                }
                if let Err(e) = self.process_novel(&novel_url).await {
                    tracing::error!("Error processing {}: {}", novel_url, e);
                }
            }

            if self.state.stories_crawled_count >= quota {
                break;
            }
            self.state.current_page += 1;
            self.checkpoint();
        }

        self.persist_genres();
        self.checkpoint();
        tracing::info!(
            "Crawl finished: {} novels processed, {} genres, {:?} elapsed",
            self.state.stories_crawled_count,
            self.genres.len(),
            started.elapsed()
        );
        Ok(())
    }

    /// Handles one novel URL end to end: detail scrape, genre resolution,
    /// resume decision, chapter discovery, finalization.
    async fn process_novel(&mut self, listed_url: &Url) -> Result<(), ChapterlineError> {
        let novel_url = with_trailing_slash(listed_url.clone());

        let scraped = match self.source.novel_detail(&novel_url).await {
            Ok(scraped) => scraped,
            Err(e) => {
                tracing::warn!("Failed to scrape novel {}: {}. Skipping.", novel_url, e);
                return Ok(());
            }
        };

        // Resolve the taxonomy first; duplicates within one novel collapse.
        let mut genre_ids: Vec<String> = Vec::new();
        for name in &scraped.genre_names {
            if let Some(id) = self.genres.resolve(name, &mut self.ids) {
                if !genre_ids.contains(&id) {
                    genre_ids.push(id);
                }
            }
        }

        // Slug priority: slugified title, declared URL slug, novel id.
        let (slug, reserved_id) = match slugify(&scraped.title).or_else(|| path_slug(&novel_url)) {
            Some(slug) => (slug, None),
            None => {
                let id = self.ids.next(EntityKind::Novel);
                (id.clone(), Some(id))
            }
        };

        let progress = self.state.progress(&slug);
        if progress.completed {
            tracing::info!("Novel '{}' already completed, skipping", slug);
            return Ok(());
        }

        let on_disk = self.archive.existing_max_chapter(&slug);
        let resume_start = progress.last_chapter.max(on_disk) + 1;
        let cap = self.config.crawler.max_chapters_per_novel;

        let mut novel =
            self.build_novel_record(&scraped, slug.clone(), reserved_id, genre_ids, on_disk);

        if resume_start > cap {
            tracing::info!(
                "Novel '{}' already has {} chapters (cap {}), marking completed",
                slug,
                resume_start - 1,
                cap
            );
            self.state.processed_novels.insert(
                slug,
                NovelProgress {
                    last_chapter: resume_start - 1,
                    completed: true,
                },
            );
            self.checkpoint();
            return Ok(());
        }

        tracing::info!(
            "Scraping chapters {}..={} for '{}'",
            resume_start,
            cap,
            novel.title
        );

        let mut last_seen = resume_start - 1;
        let mut completed = false;
        let mut new_in_run = 0u32;

        for sequence in resume_start..=cap {
            let chapter_url = match novel_url.join(&format!("chuong-{}/", sequence)) {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!("Cannot build chapter URL for '{}': {}", slug, e);
                    break;
                }
            };

            match self.source.chapter_detail(&chapter_url, sequence).await {
                Ok(scraped_chapter) => {
                    let chapter =
                        self.build_chapter_record(scraped_chapter, &novel.novel_id, sequence);
                    novel.chapter_list.push(chapter.id.clone());
                    novel.chapter_count += 1;
                    novel.word_count += chapter.word_count;
                    last_seen = sequence;
                    new_in_run += 1;

                    // Durability after every single chapter, not batched.
                    if let Err(e) = self
                        .archive
                        .write_novel(&novel, std::slice::from_ref(&chapter))
                    {
                        tracing::error!(
                            "Failed to persist chapter {} of '{}': {}",
                            sequence,
                            slug,
                            e
                        );
                    }
                    self.state.processed_novels.insert(
                        slug.clone(),
                        NovelProgress {
                            last_chapter: sequence,
                            completed: false,
                        },
                    );
                    self.checkpoint();
                }
                Err(FetchError::NotFound) => {
                    tracing::info!(
                        "Chapter {} of '{}' does not exist, discovery finished",
                        sequence,
                        slug
                    );
                    completed = true;
                    break;
                }
                Err(FetchError::Transient(reason)) => {
                    tracing::warn!(
                        "Transient failure at chapter {} of '{}' ({}); the next run will retry it",
                        sequence,
                        slug,
                        reason
                    );
                    break;
                }
            }
        }
        if last_seen >= cap {
            completed = true;
        }

        // Finalize: one more (idempotent) metadata save, then the shared
        // files, then the quota advance.
        if let Err(e) = self.archive.write_novel(&novel, &[]) {
            tracing::error!("Failed to finalize metadata for '{}': {}", slug, e);
        }
        self.persist_genres();
        self.state.processed_novels.insert(
            slug.clone(),
            NovelProgress {
                last_chapter: last_seen,
                completed,
            },
        );
        self.state.stories_crawled_count += 1;
        self.checkpoint();

        tracing::info!(
            "Processed novel {}/{}: '{}' ({} chapters, {} new this run{})",
            self.state.stories_crawled_count,
            self.config.crawler.max_novels,
            novel.title,
            novel.chapter_count,
            new_in_run,
            if completed { ", complete" } else { "" }
        );
        Ok(())
    }

    /// Builds the novel record, carrying identity and aggregates over from
    /// previously persisted metadata when the novel is being resumed.
    fn build_novel_record(
        &mut self,
        scraped: &ScrapedNovel,
        slug: String,
        reserved_id: Option<String>,
        genre_ids: Vec<String>,
        on_disk: u32,
    ) -> NovelRecord {
        let previous = self.archive.load_novel(&slug);
        let (novel_id, chapter_list, chapter_count, word_count) = match previous {
            Some(prev) => (
                prev.novel_id,
                prev.chapter_list,
                prev.chapter_count,
                prev.word_count,
            ),
            None => {
                let id = reserved_id.unwrap_or_else(|| self.ids.next(EntityKind::Novel));
                // Artifacts without metadata (e.g. a corrupted file) still
                // count toward the contiguous chapter range.
                (id, Vec::new(), u64::from(on_disk), 0)
            }
        };
        let alt_title = slugify(&scraped.title).unwrap_or_else(|| slug.clone());

        NovelRecord {
            novel_id,
            title: scraped.title.clone(),
            alt_title,
            slug,
            cover_art: scraped.cover_art.clone(),
            author_name: scraped.author_name.clone(),
            author_id: DEFAULT_AUTHOR_ID.to_string(),
            description: scraped.description.clone(),
            source: scraped.source.clone(),
            language: "tiếng Việt".to_string(),
            status: "completed".to_string(),
            scraped_status: scraped.status.clone(),
            approved: true,
            target_audience: "all".to_string(),
            genre_list: genre_ids,
            chapter_list,
            chapter_count,
            word_count,
            metrics: synth::novel_metrics(),
            class: NOVEL_CLASS.to_string(),
        }
    }

    fn build_chapter_record(
        &mut self,
        scraped: ScrapedChapter,
        novel_id: &str,
        sequence: u32,
    ) -> ChapterRecord {
        let id = self.ids.next(EntityKind::Chapter);
        let body = crate::text::chapter_body(scraped.plain_text.as_deref(), &scraped.content);
        ChapterRecord {
            id,
            novel_id: novel_id.to_string(),
            number: sequence,
            title: scraped.title,
            content: scraped.content,
            plain_text: scraped.plain_text,
            word_count: word_count(&body),
        }
    }

    /// Catalog page URL: the listing path itself for page 1, then the
    /// site's `trang-N/` suffix convention.
    fn listing_page_url(&self, page: u32) -> Result<Url, url::ParseError> {
        let listing = self.base_url.join(&self.config.crawler.listing_path)?;
        if page <= 1 {
            Ok(listing)
        } else {
            listing.join(&format!("trang-{}/", page))
        }
    }

    /// Saves the crawl state; persistence failures are logged, never fatal.
    fn checkpoint(&self) {
        if let Err(e) = save_state(&self.archive.state_path(), &self.state) {
            tracing::error!("Failed to save crawl state: {}", e);
        }
    }

    fn persist_genres(&self) {
        if let Err(e) = self.archive.save_genres(self.genres.records()) {
            tracing::error!("Failed to save genres: {}", e);
        }
    }
}

/// Normalizes a novel URL so chapter paths can be joined onto it.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// The slug the site itself declares: the last path segment of the novel
/// URL.
fn path_slug(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(|segment| segment.to_string())
}

/// Runs a complete crawl with the given configuration.
pub async fn crawl(config: Config, fresh: bool) -> Result<(), ChapterlineError> {
    let mut coordinator = Coordinator::new(config, fresh)?;
    coordinator.run().await
}
