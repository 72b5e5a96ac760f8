//! Slug generation for URL path segments and document keys.
//!
//! One algorithm for every entity type: NFKD-decompose, drop combining marks,
//! lowercase, collapse any run of non-alphanumeric characters into a single
//! hyphen, trim edge hyphens.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize free text into a lowercase hyphenated token.
///
/// Output is empty when the input carries no alphanumeric characters at all;
/// callers must reject or fall back in that case.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }

    out
}

/// Slugify each field independently, then join the non-empty results with
/// hyphens. Used for compound keys such as title + author + category.
pub fn slugify_all<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for part in parts {
        let piece = slugify(part);
        if piece.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('-');
        }
        out.push_str(&piece);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_well_formed(slug: &str) -> bool {
        !slug.starts_with('-')
            && !slug.ends_with('-')
            && !slug.contains("--")
            && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }

    #[test]
    fn compound_poem_slug() {
        let slug = slugify_all(["Main Tera Hoon", "Tahzeeb Hafi", "ghazal"]);
        assert_eq!(slug, "main-tera-hoon-tahzeeb-hafi-ghazal");
    }

    #[test]
    fn strips_diacritics() {
        assert_eq!(slugify("Café du Monde"), "cafe-du-monde");
        assert_eq!(slugify("Mehfil-é-Sukhan"), "mehfil-e-sukhan");
    }

    #[test]
    fn collapses_symbol_runs() {
        assert_eq!(slugify("  Dil -- & -- Dariya!  "), "dil-dariya");
    }

    #[test]
    fn empty_and_symbol_only_inputs() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!! ??? ---"), "");
        // Empty pieces are skipped, not joined.
        assert_eq!(slugify_all(["", "ghazal", "***"]), "ghazal");
    }

    #[test]
    fn output_charset_holds_for_awkward_inputs() {
        let samples = [
            "  leading and trailing  ",
            "UPPER lower 123",
            "naïve café — déjà vu",
            "a,b.c/d\\e|f",
            "underscore_is_not_kept",
            "tabs\tand\nnewlines",
        ];
        for sample in samples {
            let slug = slugify(sample);
            assert!(is_well_formed(&slug), "bad slug {slug:?} from {sample:?}");
        }
    }
}
