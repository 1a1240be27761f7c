use url::Url;

use crate::models::{Config, ServerEntry, Title};

/// Embed-provider marker that triggers the synthesized alternate server.
const EMBED_PROVIDER_MARKER: &str = "2embed.";
const ALT_SERVER_ID: &str = "vsrcc";
const ALT_SERVER_NAME: &str = "VSRCC";
/// Episodes assumed per season when a tv title carries no per-season counts.
const DEFAULT_EPISODES_PER_SEASON: u32 = 10;

/// Playback state for one detail view. Rebuilt whenever the selected title
/// changes, discarded when the detail view exits.
///
/// Movie titles get a derived server list; tv titles always have an empty
/// list and no active url, since tv playback goes through a synthesized
/// stream key instead.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackContext {
    pub servers: Vec<ServerEntry>,
    pub active_server: Option<String>,
    pub active_url: Option<String>,
    pub selected_season: u32,
    pub selected_episode: u32,
    pub max_episodes: u32,
}

impl PlaybackContext {
    pub fn resolve(title: &Title) -> PlaybackContext {
        let servers = if title.is_tv() {
            Vec::new()
        } else {
            movie_servers(title)
        };
        let (active_server, active_url) = if title.is_tv() {
            (None, None)
        } else {
            match servers.first() {
                Some(s) => (Some(s.name.clone()), Some(s.url.clone())),
                None => (None, title.video_url.clone()),
            }
        };
        PlaybackContext {
            servers,
            active_server,
            active_url,
            selected_season: 1,
            selected_episode: 1,
            max_episodes: max_episodes_for(title, 1),
        }
    }

    /// Switch the active endpoint. Unknown names leave the context unchanged;
    /// no reachability check is made, playback failure is the player's problem.
    pub fn set_active_server(&mut self, name: &str) {
        if let Some(s) = self.servers.iter().find(|s| s.name == name) {
            self.active_server = Some(s.name.clone());
            self.active_url = Some(s.url.clone());
        }
    }

    /// Change the selected season, recomputing the episode ceiling from the
    /// title's per-season counts. An episode beyond the new ceiling resets
    /// to 1.
    pub fn set_season(&mut self, season: u32, title: &Title) {
        self.selected_season = season.max(1);
        self.max_episodes = max_episodes_for(title, self.selected_season);
        if self.selected_episode > self.max_episodes {
            self.selected_episode = 1;
        }
    }

    /// Out-of-range episodes clamp to the valid range, never an error.
    pub fn set_episode(&mut self, episode: u32) {
        self.selected_episode = episode.clamp(1, self.max_episodes.max(1));
    }
}

/// Derive the ordered candidate server list for a movie title. Pure; the
/// source title is never mutated, and resolving twice yields the same list.
pub fn movie_servers(title: &Title) -> Vec<ServerEntry> {
    let mut servers: Vec<ServerEntry> = Vec::new();
    for s in title.servers.iter().flatten() {
        if !servers.iter().any(|e| e.url == s.url) {
            servers.push(s.clone());
        }
    }

    let base_url = title
        .video_url
        .clone()
        .or_else(|| servers.first().map(|s| s.url.clone()));
    let Some(base_url) = base_url else {
        return servers;
    };

    if !servers.iter().any(|s| s.url == base_url) {
        servers.insert(
            0,
            ServerEntry {
                name: "Default".to_string(),
                url: base_url.clone(),
            },
        );
    }

    if base_url.contains(EMBED_PROVIDER_MARKER) {
        let alt_url = set_query_param(&base_url, "server", ALT_SERVER_ID);
        if !servers.iter().any(|s| s.url == alt_url) {
            servers.push(ServerEntry {
                name: ALT_SERVER_NAME.to_string(),
                url: alt_url,
            });
        }
    }

    servers
}

/// Set or replace a single query parameter, leaving every other part of the
/// URL intact. Strings that do not parse as absolute URLs get a plain
/// `?key=value` / `&key=value` suffix instead.
pub fn set_query_param(url: &str, key: &str, value: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        let sep = if url.contains('?') { '&' } else { '?' };
        return format!("{}{}{}={}", url, sep, key, value);
    };
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut replaced = false;
    {
        let mut q = parsed.query_pairs_mut();
        q.clear();
        for (k, v) in &pairs {
            if k == key {
                q.append_pair(key, value);
                replaced = true;
            } else {
                q.append_pair(k, v);
            }
        }
        if !replaced {
            q.append_pair(key, value);
        }
    }
    parsed.to_string()
}

/// Lookup key for tv playback: lower-cased title plus zero-padded
/// season/episode, percent-encoded for the embed collaborator.
pub fn episode_stream_key(title: &str, season: u32, episode: u32) -> String {
    let key = format!("{} s{:02}e{:02}", title.to_lowercase(), season, episode);
    urlencoding::encode(&key).into_owned()
}

pub fn episode_embed_url(cfg: &Config, title: &str, season: u32, episode: u32) -> String {
    format!(
        "{}?key={}",
        cfg.episode_embed_base,
        episode_stream_key(title, season, episode)
    )
}

fn max_episodes_for(title: &Title, season: u32) -> u32 {
    title
        .seasons_episodes
        .as_ref()
        .and_then(|counts| counts.get(season.saturating_sub(1) as usize))
        .copied()
        .unwrap_or(DEFAULT_EPISODES_PER_SEASON)
}
