//! URL slug generation for board titles.

/// Punctuation dropped outright instead of becoming a separator.
const REMOVED_CHARS: &[char] = &['*', '+', '~', '.', '(', ')', '\'', '"', '!', ':', '@'];

/// Generate a URL-safe slug from a board title.
///
/// Lowercases, drops quote-like punctuation, turns every other
/// non-alphanumeric run into a single hyphen, and trims hyphens at the ends.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut prev_hyphen = true;
    for c in title.to_lowercase().chars() {
        if REMOVED_CHARS.contains(&c) {
            continue;
        }
        if c.is_alphanumeric() {
            slug.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
