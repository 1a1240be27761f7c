use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleKind {
    #[default]
    Movie,
    Tv,
}

/// One candidate playback endpoint for a movie title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub name: String,
    pub url: String,
}

/// A catalog entry. Identity is the `title` string; there is no numeric id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Title {
    pub title: String,
    #[serde(default)]
    pub poster_path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub seasons: Option<u32>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub director: String,
    #[serde(default, rename = "type")]
    pub kind: TitleKind,
    /// Per-season episode counts, index 0 = season 1. Movies: absent.
    #[serde(default)]
    pub seasons_episodes: Option<Vec<u32>>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub servers: Option<Vec<ServerEntry>>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub cast: Option<String>,
    /// Still frame shown when a movie has no playback endpoint at all.
    #[serde(default)]
    pub trailer_image: Option<String>,
}

impl Title {
    pub fn is_tv(&self) -> bool {
        self.kind == TitleKind::Tv
    }
}

/// Browsing context shown in the main content area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Home,
    Movies,
    TvShows,
    New,
    MyList,
    AddTitle,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Movies => "movies",
            Section::TvShows => "tvshows",
            Section::New => "new",
            Section::MyList => "mylist",
            Section::AddTitle => "addmovie",
        }
    }
    pub fn from_str(s: &str) -> Option<Section> {
        match s {
            "home" => Some(Section::Home),
            "movies" => Some(Section::Movies),
            "tvshows" => Some(Section::TvShows),
            "new" => Some(Section::New),
            "mylist" => Some(Section::MyList),
            "addmovie" => Some(Section::AddTitle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: String, // "dark" | "light"
    #[serde(default)]
    pub font_scale: f32,
    /// SHA-256 hex digest of the admin password. Empty = removals always denied.
    #[serde(default)]
    pub admin_password_hash: String,
    #[serde(default)]
    pub poster_base_url: String,
    #[serde(default)]
    pub placeholder_poster_url: String,
    #[serde(default)]
    pub episode_embed_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            font_scale: 1.15,
            admin_password_hash: String::new(),
            poster_base_url: "https://image.tmdb.org/t/p/w780".to_string(),
            placeholder_poster_url: "https://via.placeholder.com/180x260?text=No+Image"
                .to_string(),
            episode_embed_base: "https://player4u.xyz/embed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_roundtrip() {
        for s in [
            Section::Home,
            Section::Movies,
            Section::TvShows,
            Section::New,
            Section::MyList,
            Section::AddTitle,
        ] {
            assert_eq!(Section::from_str(s.as_str()), Some(s));
        }
        assert_eq!(Section::from_str("browse"), None);
    }

    #[test]
    fn test_title_kind_serde_literals() {
        let t: Title = serde_json::from_str(r#"{"title":"X","type":"tv"}"#).unwrap();
        assert_eq!(t.kind, TitleKind::Tv);
        let t: Title = serde_json::from_str(r#"{"title":"Y"}"#).unwrap();
        assert_eq!(t.kind, TitleKind::Movie);
    }
}
