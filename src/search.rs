use crate::models::Title;

/// Case-insensitive substring search over the unified catalog followed by the
/// user-added titles, preserving each collection's order. Whitespace-only
/// queries match nothing rather than everything.
pub fn search_titles(catalog: &[Title], user_added: &[Title], text: &str) -> Vec<Title> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for t in catalog {
        if t.title.to_lowercase().contains(&needle) {
            out.push(t.clone());
        }
    }
    for t in user_added {
        if t.title.to_lowercase().contains(&needle) {
            out.push(t.clone());
        }
    }
    out
}
