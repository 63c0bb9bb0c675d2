//! Title and tag slug helpers.
//!
//! Resource detail pages are addressed by a slug derived from the resource's
//! unique title. The mapping is whitespace → `_`, lowercase, then
//! percent-encoding; recovery replaces `_` with a space and relies on a
//! case-insensitive substring lookup rather than an exact inverse.

use std::borrow::Cow;

/// Derive a URL slug from a resource title.
///
/// ```
/// # use optimal_resources::slug::title_slug;
/// assert_eq!(title_slug("Rust for Rustaceans"), "rust_for_rustaceans");
/// assert_eq!(title_slug("C++ Crash Course"), "c%2B%2B_crash_course");
/// ```
#[must_use]
pub fn title_slug(title: &str) -> String {
    let underscored: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    urlencoding::encode(&underscored).into_owned()
}

/// Recover a lookup pattern from a slug.
///
/// Not an exact inverse of [`title_slug`]: the original casing is gone and a
/// literal underscore in a title is indistinguishable from an encoded space.
/// The result feeds a case-insensitive substring match against titles.
#[must_use]
pub fn slug_title(slug: &str) -> String {
    let decoded: Cow<'_, str> = urlencoding::decode(slug).unwrap_or(Cow::Borrowed(slug));
    decoded.replace('_', " ")
}

/// Render a tag for page headings.
///
/// A handful of tags have canonical spellings that plain capitalization
/// cannot produce; everything else gets its first letter uppercased.
///
/// ```
/// # use optimal_resources::slug::display_tag;
/// assert_eq!(display_tag("javascript"), "JavaScript");
/// assert_eq!(display_tag("html-css"), "HTML/CSS");
/// assert_eq!(display_tag("react"), "React");
/// ```
#[must_use]
pub fn display_tag(tag: &str) -> String {
    match tag {
        "javascript" => "JavaScript".to_string(),
        "typescript" => "TypeScript".to_string(),
        "html-css" => "HTML/CSS".to_string(),
        _ => {
            let mut chars = tag.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_underscores() {
        assert_eq!(title_slug("The Rust Book"), "the_rust_book");
        assert_eq!(title_slug("Single"), "single");
    }

    #[test]
    fn slug_percent_encodes_specials() {
        assert_eq!(title_slug("C++ Crash Course"), "c%2B%2B_crash_course");
        assert_eq!(title_slug("100% Rust"), "100%25_rust");
    }

    #[test]
    fn slug_title_recovers_spaces() {
        assert_eq!(slug_title("the_rust_book"), "the rust book");
        assert_eq!(slug_title("c%2B%2B_crash_course"), "c++ crash course");
    }

    #[test]
    fn round_trip_matches_case_insensitively() {
        let title = "Programming Rust, 2nd Edition";
        let recovered = slug_title(&title_slug(title));
        assert_eq!(recovered, title.to_lowercase());
    }

    #[test]
    fn tag_special_cases() {
        assert_eq!(display_tag("javascript"), "JavaScript");
        assert_eq!(display_tag("typescript"), "TypeScript");
        assert_eq!(display_tag("html-css"), "HTML/CSS");
    }

    #[test]
    fn tag_default_capitalizes_first_letter() {
        assert_eq!(display_tag("react"), "React");
        assert_eq!(display_tag("go"), "Go");
        assert_eq!(display_tag(""), "");
    }
}
