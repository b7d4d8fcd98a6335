//! HTML extraction for the catalog's three page shapes
//!
//! Pure functions from page markup to scraped structs; all network and
//! retry concerns live in the fetcher. Selector strings mirror the source
//! site's markup, with the looser fallbacks the site needs on some themes.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Fields scraped from a novel's detail page. Identifier assignment and
/// metric synthesis happen in the coordinator; this is raw page content
/// with configured placeholders for missing fields.
#[derive(Debug, Clone)]
pub struct ScrapedNovel {
    pub title: String,
    pub cover_art: String,
    pub author_name: String,
    pub genre_names: Vec<String>,
    pub description: String,
    pub source: String,
    pub status: String,
}

/// Fields scraped from a chapter page
#[derive(Debug, Clone)]
pub struct ScrapedChapter {
    pub title: String,
    pub content: String,
    pub plain_text: Option<String>,
}

/// Extracts novel detail-page URLs from a catalog listing page.
pub fn extract_novel_urls(html: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);

    let mut urls = anchor_urls(
        &document,
        "div.list-truyen .row div.col-xs-7 > h3.truyen-title > a",
        base,
    );
    if urls.is_empty() {
        urls = anchor_urls(&document, "h3.truyen-title > a", base);
    }
    urls
}

/// Extracts a novel's fields from its detail page. Missing fields take
/// the placeholder; an unrecognizable page therefore still yields a
/// (placeholder-heavy) record, as the source markup intends.
pub fn extract_novel(html: &str, base: &Url, placeholder: &str) -> ScrapedNovel {
    let document = Html::parse_document(html);

    let title = select_text(&document, "h3.title").unwrap_or_else(|| placeholder.to_string());

    let cover_art = select_attr(&document, "div.book img[itemprop=\"image\"]", "src")
        .and_then(|src| base.join(&src).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| placeholder.to_string());

    let author_name = select_text(&document, "div.info a[itemprop=\"author\"]")
        .unwrap_or_else(|| placeholder.to_string());

    let genre_names = match Selector::parse("div.info a[itemprop=\"genre\"]") {
        Ok(selector) => document
            .select(&selector)
            .map(|el| element_text(&el))
            .filter(|name| !name.is_empty())
            .collect(),
        Err(_) => Vec::new(),
    };

    let description = select_inner_html(&document, "div.desc-text[itemprop=\"description\"]")
        .or_else(|| select_inner_html(&document, "div.desc-text"))
        .unwrap_or_else(|| format!("<p>{}</p>", placeholder));

    let source = select_text(&document, "div.info span.source")
        .or_else(|| select_text(&document, "span.source"))
        .unwrap_or_else(|| placeholder.to_string());

    let status = select_text(&document, "div.info span.text-success")
        .or_else(|| select_text(&document, "span.text-success"))
        .unwrap_or_else(|| placeholder.to_string());

    ScrapedNovel {
        title,
        cover_art,
        author_name,
        genre_names,
        description,
        source,
        status,
    }
}

/// Extracts a chapter from its page. Returns `None` when the content
/// container is missing, which the caller treats as "this chapter does
/// not exist".
pub fn extract_chapter(html: &str, expected_sequence: u32) -> Option<ScrapedChapter> {
    let document = Html::parse_document(html);

    let content_el = match Selector::parse("div.chapter-c") {
        Ok(selector) => document.select(&selector).next()?,
        Err(_) => return None,
    };

    let raw_title = select_text(&document, "a.chapter-title")
        .unwrap_or_else(|| format!("Chương {}", expected_sequence));
    let title = strip_label_prefix(&raw_title);

    let content = content_el.inner_html();

    let mut paragraphs: Vec<String> = Vec::new();
    if let Ok(p_selector) = Selector::parse("p") {
        for p in content_el.select(&p_selector) {
            if inside_ad_container(&p) {
                continue;
            }
            let text = element_text(&p);
            if !text.is_empty() {
                paragraphs.push(text);
            }
        }
    }
    let plain = if paragraphs.is_empty() {
        element_text(&content_el)
    } else {
        paragraphs.join("\n")
    };

    if plain.is_empty() && content.trim().is_empty() {
        tracing::debug!("Chapter {} page has an empty content container", expected_sequence);
    }

    Some(ScrapedChapter {
        title,
        content,
        plain_text: if plain.is_empty() { None } else { Some(plain) },
    })
}

/// Strips a leading `Chương N:` label so only the chapter's own title
/// remains; titles without that shape pass through unchanged.
fn strip_label_prefix(raw: &str) -> String {
    let trimmed = raw.trim();

    let label: String = trimmed.chars().take(6).flat_map(char::to_lowercase).collect();
    if label != "chương" {
        return trimmed.to_string();
    }
    let rest = match trimmed.char_indices().nth(6) {
        Some((idx, _)) => &trimmed[idx..],
        None => "",
    };

    let rest = rest.trim_start();
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return trimmed.to_string();
    }

    match rest[digits_end..].trim_start().strip_prefix(':') {
        Some(tail) if !tail.trim().is_empty() => tail.trim().to_string(),
        _ => trimmed.to_string(),
    }
}

/// True when an element sits inside an advertising wrapper (class name
/// mentioning ads/google/display), which must not leak into chapter text.
fn inside_ad_container(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| {
            ancestor
                .value()
                .attr("class")
                .map(|classes| {
                    let classes = classes.to_lowercase();
                    classes.contains("ads")
                        || classes.contains("google")
                        || classes.contains("display")
                })
                .unwrap_or(false)
        })
}

fn anchor_urls(document: &Html, selector: &str, base: &Url) -> Vec<Url> {
    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .collect()
}

/// Whitespace-normalized text of an element, like the page renders it.
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.to_string())
}

fn select_inner_html(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.inner_html())
        .filter(|html| !html.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    const LISTING_PAGE: &str = r#"
        <html><body>
        <div class="list-truyen">
          <div class="row">
            <div class="col-xs-7">
              <h3 class="truyen-title"><a href="/tien-nghich/">Tiên Nghịch</a></h3>
            </div>
          </div>
          <div class="row">
            <div class="col-xs-7">
              <h3 class="truyen-title"><a href="https://example.com/vu-than/">Vũ Thần</a></h3>
            </div>
          </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_extract_novel_urls_primary_selector() {
        let urls = extract_novel_urls(LISTING_PAGE, &base_url());
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].as_str(), "https://example.com/tien-nghich/");
        assert_eq!(urls[1].as_str(), "https://example.com/vu-than/");
    }

    #[test]
    fn test_extract_novel_urls_fallback_selector() {
        let html = r#"<html><body>
            <h3 class="truyen-title"><a href="/alpha/">Alpha</a></h3>
        </body></html>"#;
        let urls = extract_novel_urls(html, &base_url());
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].as_str(), "https://example.com/alpha/");
    }

    #[test]
    fn test_extract_novel_urls_empty_page() {
        assert!(extract_novel_urls("<html><body></body></html>", &base_url()).is_empty());
    }

    const NOVEL_PAGE: &str = r#"
        <html><body>
        <h3 class="title">Đấu Phá Thương Khung</h3>
        <div class="book"><img itemprop="image" src="/images/cover.jpg"></div>
        <div class="info">
          <a itemprop="author">Thiên Tàm Thổ Đậu</a>
          <a itemprop="genre">Tiên Hiệp</a>
          <a itemprop="genre">Huyền Huyễn</a>
          <span class="source">Sưu tầm</span>
          <span class="text-success">Full</span>
        </div>
        <div class="desc-text" itemprop="description"><p>Một thế giới</p><p>kỳ ảo.</p></div>
        </body></html>
    "#;

    #[test]
    fn test_extract_novel_full_page() {
        let novel = extract_novel(NOVEL_PAGE, &base_url(), "n/a");
        assert_eq!(novel.title, "Đấu Phá Thương Khung");
        assert_eq!(novel.cover_art, "https://example.com/images/cover.jpg");
        assert_eq!(novel.author_name, "Thiên Tàm Thổ Đậu");
        assert_eq!(novel.genre_names, vec!["Tiên Hiệp", "Huyền Huyễn"]);
        assert_eq!(novel.description, "<p>Một thế giới</p><p>kỳ ảo.</p>");
        assert_eq!(novel.source, "Sưu tầm");
        assert_eq!(novel.status, "Full");
    }

    #[test]
    fn test_extract_novel_missing_fields_take_placeholder() {
        let novel = extract_novel("<html><body></body></html>", &base_url(), "n/a");
        assert_eq!(novel.title, "n/a");
        assert_eq!(novel.cover_art, "n/a");
        assert_eq!(novel.author_name, "n/a");
        assert!(novel.genre_names.is_empty());
        assert_eq!(novel.description, "<p>n/a</p>");
        assert_eq!(novel.source, "n/a");
        assert_eq!(novel.status, "n/a");
    }

    const CHAPTER_PAGE: &str = r#"
        <html><body>
        <a class="chapter-title">Chương 3: Khởi đầu</a>
        <div class="chapter-c">
          <p>Dòng thứ nhất.</p>
          <div class="ads-responsive"><p>QUẢNG CÁO</p></div>
          <p>Dòng thứ hai.</p>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_extract_chapter_strips_label_and_ads() {
        let chapter = extract_chapter(CHAPTER_PAGE, 3).unwrap();
        assert_eq!(chapter.title, "Khởi đầu");
        assert_eq!(
            chapter.plain_text.as_deref(),
            Some("Dòng thứ nhất.\nDòng thứ hai.")
        );
        assert!(chapter.content.contains("Dòng thứ nhất."));
    }

    #[test]
    fn test_extract_chapter_missing_container_is_absent() {
        let html = r#"<html><body><p>404 not here</p></body></html>"#;
        assert!(extract_chapter(html, 1).is_none());
    }

    #[test]
    fn test_extract_chapter_without_title_uses_expected_sequence() {
        let html = r#"<html><body><div class="chapter-c"><p>nội dung</p></div></body></html>"#;
        let chapter = extract_chapter(html, 9).unwrap();
        assert_eq!(chapter.title, "Chương 9");
    }

    #[test]
    fn test_extract_chapter_without_paragraphs_uses_container_text() {
        let html = r#"<html><body><div class="chapter-c">thô  văn bản</div></body></html>"#;
        let chapter = extract_chapter(html, 1).unwrap();
        assert_eq!(chapter.plain_text.as_deref(), Some("thô văn bản"));
    }

    #[test]
    fn test_strip_label_prefix_variants() {
        assert_eq!(strip_label_prefix("Chương 12: Trận chiến"), "Trận chiến");
        assert_eq!(strip_label_prefix("chương 1 : x"), "x");
        assert_eq!(strip_label_prefix("Chương 12"), "Chương 12");
        assert_eq!(strip_label_prefix("Lời mở đầu"), "Lời mở đầu");
        assert_eq!(strip_label_prefix("Chương : thiếu số"), "Chương : thiếu số");
    }
}
