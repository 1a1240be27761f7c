use crate::models::{Config, Title};

/// Titles shown per display row before wrapping to the next one.
pub const TITLES_PER_ROW: usize = 6;

/// Resolve a poster reference to a fetchable URL. Relative paths are joined
/// onto the configured poster base; an empty path gets the placeholder frame.
pub fn poster_src(cfg: &Config, poster_path: &str) -> String {
    if poster_path.is_empty() {
        return cfg.placeholder_poster_url.clone();
    }
    if poster_path.starts_with("http") {
        poster_path.to_string()
    } else {
        format!("{}{}", cfg.poster_base_url, poster_path)
    }
}

/// Split a collection into fixed-size display rows. Order and total count are
/// preserved; the last row holds whatever remains.
pub fn chunk_rows(titles: &[Title], size: usize) -> Vec<&[Title]> {
    if size == 0 {
        return Vec::new();
    }
    titles.chunks(size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(n: usize) -> Vec<Title> {
        (0..n)
            .map(|i| Title {
                title: format!("t{}", i),
                ..Title::default()
            })
            .collect()
    }

    #[test]
    fn test_chunk_rows_preserves_count_and_order() {
        for n in [0usize, 1, 5, 6, 7, 12, 13] {
            let titles = named(n);
            let rows = chunk_rows(&titles, TITLES_PER_ROW);
            let total: usize = rows.iter().map(|r| r.len()).sum();
            assert_eq!(total, n);
            let flat: Vec<&str> = rows
                .iter()
                .flat_map(|r| r.iter().map(|t| t.title.as_str()))
                .collect();
            let expected: Vec<String> = (0..n).map(|i| format!("t{}", i)).collect();
            assert_eq!(flat, expected.iter().map(String::as_str).collect::<Vec<_>>());
            if let Some(last) = rows.last() {
                assert!((1..=TITLES_PER_ROW).contains(&last.len()));
            }
        }
    }

    #[test]
    fn test_poster_src_fallbacks() {
        let cfg = Config::default();
        assert_eq!(poster_src(&cfg, ""), cfg.placeholder_poster_url);
        assert_eq!(
            poster_src(&cfg, "https://stills.example/a.jpg"),
            "https://stills.example/a.jpg"
        );
        assert_eq!(
            poster_src(&cfg, "/abc.jpg"),
            format!("{}/abc.jpg", cfg.poster_base_url)
        );
    }
}
