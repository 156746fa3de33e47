//! camelCase / snake_case key conversion

/// Convert camelCase or PascalCase to snake_case
///
/// A run of capitals counts as one word (`HTTPServer` becomes `http_server`),
/// and a capital followed by a lowercase letter starts a new word. Characters
/// that are not letters pass through unchanged, and a capital right after `_`
/// or `-` gets no extra separator.
#[must_use]
pub fn camel_to_snake(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = !prev.is_uppercase() || next_is_lower;
            if boundary && !matches!(prev, '_' | '-') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// Convert snake_case or kebab-case to CamelCase
///
/// Each `_`/`-` separated segment is title-cased and the segments are joined
/// with no separator. Empty segments disappear.
#[must_use]
pub fn snake_to_camel(s: &str) -> String {
    s.split(['_', '-'])
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
            }
        })
        .collect()
}
