//! Pure string transforms for display names and URL slugs

/// Humanize a field name for display.
///
/// Underscores and hyphens become spaces, a space is inserted before
/// internal capitals, and each word is title-cased:
/// `first_name` becomes `First Name`, `helloWorld` becomes `Hello World`.
#[must_use]
pub fn humanize(input: &str) -> String {
    let mut spaced = String::with_capacity(input.len() + 4);
    let mut prev: Option<char> = None;
    for ch in input.chars() {
        match ch {
            '_' | '-' => spaced.push(' '),
            c if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase()) => {
                spaced.push(' ');
                spaced.push(c);
            }
            c => spaced.push(c),
        }
        prev = Some(ch);
    }

    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive a URL slug from a title.
///
/// Lowercases the input; runs of non-alphanumeric characters collapse to a
/// single `-`; leading and trailing dashes are trimmed.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }
    slug
}
