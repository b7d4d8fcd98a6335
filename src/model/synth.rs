//! Synthesized metadata
//!
//! The source catalog exposes no engagement numbers or timestamps, but the
//! downstream importer expects them, so they are generated: plausible view
//! pyramids (today ≤ week ≤ month ≤ year ≤ total) and ordered date triples
//! (publication ≤ created ≤ updated ≤ now).

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use rand::Rng;

use crate::model::records::{JsonDate, NovelMetrics};

const START_YEAR: i32 = 2021;

/// Picks a random datetime in a past year (day capped at 28 to dodge
/// month-length arithmetic), never later than `now`.
fn random_datetime(rng: &mut impl Rng, now: NaiveDateTime) -> NaiveDateTime {
    let latest_year = (now.year() - 1).max(START_YEAR);
    let year = rng.gen_range(START_YEAR..=latest_year);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    let date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| now.date());
    let time = date
        .and_hms_opt(rng.gen_range(0..24), rng.gen_range(0..60), rng.gen_range(0..60))
        .unwrap_or_else(|| now.date().and_hms_opt(0, 0, 0).unwrap_or(now));
    time.min(now)
}

/// Generates the synthesized metric block for a new novel record.
pub fn novel_metrics() -> NovelMetrics {
    let mut rng = rand::thread_rng();
    let now = Utc::now().naive_utc();

    let rating_average = (rng.gen_range(0.0..=10.0_f64) * 10.0).round() / 10.0;
    let total_views: u64 = rng.gen_range(1_000..=1_000_000);
    let total_rating = rng.gen_range(total_views / 100..=total_views / 5);
    let total_likes = rng.gen_range(0..=total_views / 2);
    let total_comments = rng.gen_range(0..=total_likes / 2);
    let total_upvotes = rng.gen_range(0..=total_likes);
    let total_follow = rng.gen_range(0..=total_views / 10);

    let views_this_year = rng.gen_range(0..=total_views);
    let views_this_month = rng.gen_range(0..=views_this_year);
    let views_this_week = rng.gen_range(0..=views_this_month);
    let views_today = rng.gen_range(0..=views_this_week);

    let publication = random_datetime(&mut rng, now);
    let created = (publication
        + Duration::days(rng.gen_range(0..=30))
        + Duration::hours(rng.gen_range(0..24))
        + Duration::minutes(rng.gen_range(0..60)))
    .min(now)
    .max(publication);
    let updated = (created
        + Duration::days(rng.gen_range(0..=10))
        + Duration::hours(rng.gen_range(0..24))
        + Duration::minutes(rng.gen_range(0..60)))
    .min(now)
    .max(created);

    NovelMetrics {
        rating_average,
        total_rating,
        total_likes,
        total_views,
        total_comments,
        total_upvotes,
        total_follow,
        views_today,
        views_this_week,
        views_this_month,
        views_this_year,
        publication_date: JsonDate(publication),
        created: JsonDate(created),
        updated: JsonDate(updated),
    }
}

/// Generates the created/updated date pair for a new genre record.
pub fn genre_dates() -> (JsonDate, JsonDate) {
    let mut rng = rand::thread_rng();
    let now = Utc::now().naive_utc();

    let created = random_datetime(&mut rng, now);
    let updated = (created
        + Duration::days(rng.gen_range(0..=365))
        + Duration::hours(rng.gen_range(0..24)))
    .min(now)
    .max(created);

    (JsonDate(created), JsonDate(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_novel_metrics_are_internally_consistent() {
        for _ in 0..50 {
            let m = novel_metrics();
            assert!((0.0..=10.0).contains(&m.rating_average));
            assert!(m.views_today <= m.views_this_week);
            assert!(m.views_this_week <= m.views_this_month);
            assert!(m.views_this_month <= m.views_this_year);
            assert!(m.views_this_year <= m.total_views);
            assert!(m.publication_date.0 <= m.created.0);
            assert!(m.created.0 <= m.updated.0);
            assert!(m.updated.0 <= Utc::now().naive_utc());
        }
    }

    #[test]
    fn test_genre_dates_are_ordered() {
        for _ in 0..50 {
            let (created, updated) = genre_dates();
            assert!(created.0 <= updated.0);
        }
    }
}
