//! Slug derivation and filename sanitizing
//!
//! Slugs are the on-disk folder key for a novel and must be idempotently
//! derivable from the title alone, independent of crawl order. The source
//! catalog is Vietnamese, so the usual diacritics are folded to ASCII
//! before the non-alphanumeric collapse.

/// Folds a Vietnamese-accented character to its base letter, if it is one.
fn fold_diacritic(c: char) -> Option<char> {
    const TABLES: &[(&str, char)] = &[
        ("àáạảãâầấậẩẫăằắặẳẵ", 'a'),
        ("èéẹẻẽêềếệểễ", 'e'),
        ("ìíịỉĩ", 'i'),
        ("òóọỏõôồốộổỗơờớợởỡ", 'o'),
        ("ùúụủũưừứựửữ", 'u'),
        ("ỳýỵỷỹ", 'y'),
        ("đ", 'd'),
    ];
    TABLES
        .iter()
        .find(|(accented, _)| accented.contains(c))
        .map(|(_, base)| *base)
}

/// Derives a slug from free text: lowercase, diacritics folded, runs of
/// non-alphanumeric characters collapsed to single hyphens.
///
/// Returns `None` when the input contains nothing sluggable (empty or all
/// punctuation); callers fall back to the declared URL slug or the novel
/// identifier in that case.
pub fn slugify(text: &str) -> Option<String> {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        let c = fold_diacritic(c).unwrap_or(c);
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Sanitizes a chapter title for use inside an artifact filename:
/// characters that are unsafe on common filesystems collapse to hyphens.
pub fn safe_filename(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_dash = false;
    for c in text.trim().chars() {
        if matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
            if !last_was_dash {
                out.push('-');
                last_was_dash = true;
            }
        } else {
            out.push(c);
            last_was_dash = false;
        }
    }
    out
}
