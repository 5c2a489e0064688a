//! Domain Services
//!
//! Pure domain logic for organization slugs.

use crate::domain::value_objects::Slug;

/// Highest numeric suffix tried when making a slug unique
pub const MAX_SLUG_SUFFIX: u32 = 50;

fn transliterate(c: char) -> char {
    match c {
        'ç' | 'Ç' => 'c',
        'ğ' | 'Ğ' => 'g',
        'ı' | 'İ' => 'i',
        'ö' | 'Ö' => 'o',
        'ş' | 'Ş' => 's',
        'ü' | 'Ü' => 'u',
        other => other,
    }
}

/// Cut at `max` bytes (input is ASCII) and drop a trailing separator.
fn truncate(mut value: String, max: usize) -> String {
    value.truncate(max);
    while value.ends_with('-') {
        value.pop();
    }
    value
}

/// Normalize free text into a slug.
///
/// Lower-case ASCII, Turkish letters transliterated, every run of other
/// characters collapsed into one `-`, trimmed of separators and cut to
/// [`Slug::MAX`]. Input without any usable character yields `org`.
pub fn slugify(raw: &str) -> Slug {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for c in raw.trim().chars().map(transliterate).flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }

    let out = truncate(out, Slug::MAX);
    if out.is_empty() {
        Slug::from_normalized(Slug::FALLBACK.to_string())
    } else {
        Slug::from_normalized(out)
    }
}

/// Candidates tried in order: `base`, `base-2`, ..., `base-50`.
///
/// The base is shortened when needed so every candidate stays within
/// [`Slug::MAX`].
pub fn slug_candidates(base: &Slug) -> impl Iterator<Item = Slug> + '_ {
    std::iter::once(base.clone()).chain((2..=MAX_SLUG_SUFFIX).map(move |n| {
        let suffix = format!("-{n}");
        let head = truncate(base.as_str().to_string(), Slug::MAX - suffix.len());
        Slug::from_normalized(format!("{head}{suffix}"))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("  Acme Hair & Beauty  ").as_str(), "acme-hair-beauty");
        assert_eq!(slugify("--a--b--").as_str(), "a-b");
    }

    #[test]
    fn test_slugify_turkish_letters() {
        assert_eq!(slugify("Güzellik Şişli").as_str(), "guzellik-sisli");
        assert_eq!(slugify("IĞDIR Çiçekçi").as_str(), "igdir-cicekci");
        assert_eq!(slugify("İstanbul Öğretmen").as_str(), "istanbul-ogretmen");
    }

    #[test]
    fn test_slugify_fallback() {
        assert_eq!(slugify("!!!").as_str(), "org");
        assert_eq!(slugify("").as_str(), "org");
    }

    #[test]
    fn test_slugify_length() {
        let slug = slugify(&"ab ".repeat(40));
        assert!(slug.as_str().len() <= Slug::MAX);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test]
    fn test_slug_candidates() {
        let base = slugify("acme");
        let all: Vec<_> = slug_candidates(&base).collect();
        assert_eq!(all.len(), 50);
        assert_eq!(all[0].as_str(), "acme");
        assert_eq!(all[1].as_str(), "acme-2");
        assert_eq!(all[49].as_str(), "acme-50");
    }

    #[test]
    fn test_slug_candidates_stay_within_max() {
        let base = slugify(&"a".repeat(80));
        for candidate in slug_candidates(&base) {
            assert!(candidate.as_str().len() <= Slug::MAX);
        }
    }
}
