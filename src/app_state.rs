use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::catalog::Catalog;
use crate::logger::log_line;
use crate::models::{Section, Title};
use crate::player::PlaybackContext;
use crate::search::search_titles;
use crate::storage::{
    KEY_IS_DETAIL_VIEW, KEY_LAST_SECTION, KEY_SECTION, KEY_SELECTED_TITLE, KEY_USER_ADDED, Store,
};

/// Results of background poster work, delivered to the UI thread.
#[derive(Debug, Clone)]
pub enum Msg {
    PosterDecoded {
        url: String,
        rgba: Vec<u8>,
        w: u32,
        h: u32,
    },
    PosterFailed {
        url: String,
    },
}

/// Central view-state controller. Owns the current section, search text,
/// selection, the user-added list and the per-session shuffled display
/// collections; every mutation writes its slice straight through to the
/// injected store.
pub struct AppState {
    catalog: Catalog,
    store: Box<dyn Store>,
    rng: StdRng,

    pub current_section: Section,
    pub search_term: String,
    pub selected: Option<Title>,
    pub is_detail_view: bool,
    pub user_added: Vec<Title>,
    /// Playback state for the open detail view; None while browsing.
    pub playback: Option<PlaybackContext>,

    // Shuffled once here, held fixed for the whole session.
    shuffled_trending: Vec<Title>,
    shuffled_movies: Vec<Title>,
    shuffled_new: Vec<Title>,
    shuffled_tvshows: Vec<Title>,
}

impl AppState {
    pub fn new(catalog: Catalog, store: Box<dyn Store>, mut rng: StdRng) -> AppState {
        let user_added: Vec<Title> = store
            .get(KEY_USER_ADDED)
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        let current_section = store
            .get(KEY_SECTION)
            .and_then(|s| Section::from_str(&s))
            .unwrap_or(Section::Home);

        // The stored selection is only a title string; re-resolve it against
        // the catalog and the user-added list, since the catalog may have
        // been rebuilt since it was written.
        let mut selected = store.get(KEY_SELECTED_TITLE).and_then(|name| {
            catalog
                .find(&name)
                .cloned()
                .or_else(|| user_added.iter().find(|t| t.title == name).cloned())
        });
        let is_detail_view =
            store.get(KEY_IS_DETAIL_VIEW).as_deref() == Some("true") && selected.is_some();
        if !is_detail_view {
            selected = None;
        }
        let playback = selected.as_ref().map(PlaybackContext::resolve);

        let mut shuffled_trending = catalog.trending.clone();
        let mut shuffled_movies = catalog.movies.clone();
        let mut shuffled_new = catalog.new_popular.clone();
        let mut shuffled_tvshows = catalog.tvshows.clone();
        shuffled_trending.shuffle(&mut rng);
        shuffled_movies.shuffle(&mut rng);
        shuffled_new.shuffle(&mut rng);
        shuffled_tvshows.shuffle(&mut rng);

        AppState {
            catalog,
            store,
            rng,
            current_section,
            search_term: String::new(),
            selected,
            is_detail_view,
            user_added,
            playback,
            shuffled_trending,
            shuffled_movies,
            shuffled_new,
            shuffled_tvshows,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // Display collections; stable for the session.
    pub fn trending(&self) -> &[Title] {
        &self.shuffled_trending
    }
    pub fn movies(&self) -> &[Title] {
        &self.shuffled_movies
    }
    pub fn new_popular(&self) -> &[Title] {
        &self.shuffled_new
    }
    pub fn tvshows(&self) -> &[Title] {
        &self.shuffled_tvshows
    }

    /// Catalog my-list entries first, then user additions, insertion order.
    /// Never shuffled.
    pub fn my_list(&self) -> Vec<Title> {
        let mut out = self.catalog.my_list.clone();
        out.extend(self.user_added.iter().cloned());
        out
    }

    pub fn navigate(&mut self, section: Section) {
        self.search_term.clear();
        self.selected = None;
        self.playback = None;
        self.is_detail_view = false;
        self.current_section = section;
        self.store.set(KEY_SECTION, section.as_str());
        self.persist_selection();
        log_line(&format!("navigate: {}", section.as_str()));
    }

    /// Open the detail view for a title. The argument is re-resolved against
    /// the unified catalog by exact title string; a miss keeps the caller's
    /// record as-is (freshly added titles are selectable immediately).
    pub fn select(&mut self, title: &Title) {
        self.store
            .set(KEY_LAST_SECTION, self.current_section.as_str());
        let resolved = self
            .catalog
            .find(&title.title)
            .cloned()
            .unwrap_or_else(|| title.clone());
        self.playback = Some(PlaybackContext::resolve(&resolved));
        self.selected = Some(resolved);
        self.is_detail_view = true;
        self.search_term.clear();
        self.persist_selection();
        log_line(&format!("select: {}", title.title));
    }

    /// Leave the detail view, returning to the section that was current when
    /// the title was selected.
    pub fn go_back(&mut self) {
        self.selected = None;
        self.playback = None;
        self.is_detail_view = false;
        self.current_section = self
            .store
            .get(KEY_LAST_SECTION)
            .and_then(|s| Section::from_str(&s))
            .unwrap_or(Section::Home);
        self.store.set(KEY_SECTION, self.current_section.as_str());
        self.persist_selection();
    }

    /// Search text is ephemeral: held raw, never persisted.
    pub fn set_search(&mut self, text: String) {
        self.search_term = text;
    }

    pub fn add_user_title(&mut self, title: Title) {
        log_line(&format!("add title: {}", title.title));
        self.user_added.push(title);
        self.persist_user_added();
    }

    /// Remove every user-added entry with this exact title. Authorization is
    /// the caller's job (admin gate); none happens here.
    pub fn remove_user_title(&mut self, title: &Title) {
        self.user_added.retain(|t| t.title != title.title);
        self.persist_user_added();
        log_line(&format!("remove title: {}", title.title));
    }

    /// Query, not stored state: substring matches over catalog then
    /// user-added titles. Empty search text matches nothing.
    pub fn search_results(&self) -> Vec<Title> {
        search_titles(self.catalog.all(), &self.user_added, &self.search_term)
    }

    /// Up to 5 catalog titles excluding the given one, in fresh random order
    /// on every call.
    pub fn recommendations_for(&mut self, title: &Title) -> Vec<Title> {
        let mut pool: Vec<Title> = self
            .catalog
            .all()
            .iter()
            .filter(|t| t.title != title.title)
            .cloned()
            .collect();
        pool.shuffle(&mut self.rng);
        pool.truncate(5);
        pool
    }

    // Playback events for the open detail view. No-ops while browsing.
    pub fn set_season(&mut self, season: u32) {
        if let (Some(title), Some(ctx)) = (&self.selected, &mut self.playback) {
            ctx.set_season(season, title);
        }
    }

    pub fn set_episode(&mut self, episode: u32) {
        if let Some(ctx) = &mut self.playback {
            ctx.set_episode(episode);
        }
    }

    pub fn set_active_server(&mut self, name: &str) {
        if let Some(ctx) = &mut self.playback {
            ctx.set_active_server(name);
        }
    }

    fn persist_selection(&self) {
        match &self.selected {
            Some(t) => self.store.set(KEY_SELECTED_TITLE, &t.title),
            None => self.store.remove(KEY_SELECTED_TITLE),
        }
        self.store.set(
            KEY_IS_DETAIL_VIEW,
            if self.is_detail_view { "true" } else { "false" },
        );
    }

    fn persist_user_added(&self) {
        if let Ok(encoded) = serde_json::to_string(&self.user_added) {
            self.store.set(KEY_USER_ADDED, &encoded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TitleKind;
    use crate::storage::MemStore;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    const FIXTURE: &str = r#"{
        "trending": [
            {"title": "Alpha", "type": "movie", "video_url": "https://2embed.example/e/1?server=foo"},
            {"title": "Beta", "type": "tv", "seasons": 3, "seasons_episodes": [10, 8, 12]},
            {"title": "Gamma", "type": "movie"}
        ],
        "movies": [
            {"title": "Alpha", "type": "movie", "video_url": "https://2embed.example/e/1?server=foo"},
            {"title": "Gamma", "type": "movie"},
            {"title": "Delta Force Nine", "type": "movie", "video_url": "https://vid.example/d9"}
        ],
        "tvshows": [
            {"title": "Beta", "type": "tv", "seasons": 3, "seasons_episodes": [10, 8, 12]}
        ],
        "new_popular": [
            {"title": "Delta Force Nine", "type": "movie", "video_url": "https://vid.example/d9"}
        ],
        "my_list": [
            {"title": "Gamma", "type": "movie"}
        ]
    }"#;

    fn fixture_catalog() -> Catalog {
        Catalog::from_json(FIXTURE).unwrap()
    }

    fn state_with(store: Box<dyn Store>) -> AppState {
        AppState::new(fixture_catalog(), store, StdRng::seed_from_u64(7))
    }

    fn fresh_state() -> AppState {
        state_with(Box::new(MemStore::new()))
    }

    fn user_title(name: &str) -> Title {
        Title {
            title: name.to_string(),
            kind: TitleKind::Movie,
            video_url: Some("https://vid.example/user".to_string()),
            ..Title::default()
        }
    }

    fn assert_invariant(state: &AppState) {
        assert_eq!(state.is_detail_view, state.selected.is_some());
        assert_eq!(state.is_detail_view, state.playback.is_some());
    }

    #[test]
    fn test_defaults_with_empty_store() {
        let state = fresh_state();
        assert_eq!(state.current_section, Section::Home);
        assert!(state.selected.is_none());
        assert!(!state.is_detail_view);
        assert!(state.user_added.is_empty());
        assert_invariant(&state);
    }

    #[test]
    fn test_select_then_go_back_restores_section() {
        let mut state = fresh_state();
        state.navigate(Section::TvShows);
        let beta = state.catalog().find("Beta").unwrap().clone();
        state.select(&beta);
        assert!(state.is_detail_view);
        assert_invariant(&state);
        state.go_back();
        assert_eq!(state.current_section, Section::TvShows);
        assert!(state.selected.is_none());
        assert_invariant(&state);
    }

    #[test]
    fn test_invariant_holds_across_operations() {
        let mut state = fresh_state();
        assert_invariant(&state);
        state.navigate(Section::Movies);
        assert_invariant(&state);
        let alpha = state.catalog().find("Alpha").unwrap().clone();
        state.select(&alpha);
        assert_invariant(&state);
        state.set_search("x".to_string());
        assert_invariant(&state);
        state.add_user_title(user_title("Mine"));
        assert_invariant(&state);
        state.navigate(Section::Home);
        assert_invariant(&state);
        state.go_back();
        assert_invariant(&state);
    }

    #[test]
    fn test_select_clears_search() {
        let mut state = fresh_state();
        state.set_search("alp".to_string());
        assert!(!state.search_results().is_empty());
        let alpha = state.catalog().find("Alpha").unwrap().clone();
        state.select(&alpha);
        assert!(state.search_term.is_empty());
    }

    #[test]
    fn test_select_unknown_title_uses_caller_record() {
        let mut state = fresh_state();
        let mine = user_title("Not In Catalog");
        state.select(&mine);
        assert_eq!(state.selected.as_ref().unwrap().title, "Not In Catalog");
        assert!(state.playback.is_some());
    }

    #[test]
    fn test_movie_selection_resolves_servers_tv_does_not() {
        let mut state = fresh_state();
        let alpha = state.catalog().find("Alpha").unwrap().clone();
        state.select(&alpha);
        assert!(!state.playback.as_ref().unwrap().servers.is_empty());
        let beta = state.catalog().find("Beta").unwrap().clone();
        state.select(&beta);
        assert!(state.playback.as_ref().unwrap().servers.is_empty());
    }

    #[test]
    fn test_season_episode_events_reach_playback() {
        let mut state = fresh_state();
        let beta = state.catalog().find("Beta").unwrap().clone();
        state.select(&beta);
        state.set_episode(10);
        state.set_season(2);
        let ctx = state.playback.as_ref().unwrap();
        assert_eq!(ctx.max_episodes, 8);
        assert_eq!(ctx.selected_episode, 1);
        // Browsing: playback events are no-ops.
        state.go_back();
        state.set_season(2);
        state.set_episode(5);
        assert!(state.playback.is_none());
    }

    #[test]
    fn test_add_then_remove_restores_list() {
        let mut state = fresh_state();
        state.add_user_title(user_title("Keeper"));
        let before = state.user_added.clone();
        state.add_user_title(user_title("Twice"));
        state.add_user_title(user_title("Twice"));
        assert_eq!(state.user_added.len(), 3);
        state.remove_user_title(&user_title("Twice"));
        let names: Vec<&str> = state.user_added.iter().map(|t| t.title.as_str()).collect();
        let expected: Vec<&str> = before.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_my_list_is_catalog_then_user_added() {
        let mut state = fresh_state();
        state.add_user_title(user_title("Mine A"));
        state.add_user_title(user_title("Mine B"));
        let names: Vec<String> = state.my_list().iter().map(|t| t.title.clone()).collect();
        assert_eq!(names, ["Gamma", "Mine A", "Mine B"]);
    }

    #[test]
    fn test_empty_search_matches_nothing() {
        let mut state = fresh_state();
        assert!(state.search_results().is_empty());
        state.set_search("   ".to_string());
        assert!(state.search_results().is_empty());
    }

    #[test]
    fn test_search_finds_user_added_after_catalog() {
        let mut state = fresh_state();
        state.add_user_title(user_title("Alphaville"));
        state.set_search("alpha".to_string());
        let names: Vec<String> = state
            .search_results()
            .iter()
            .map(|t| t.title.clone())
            .collect();
        assert_eq!(names, ["Alpha", "Alphaville"]);
    }

    #[test]
    fn test_shuffled_rows_stable_within_session() {
        let state = fresh_state();
        let first: Vec<String> = state.trending().iter().map(|t| t.title.clone()).collect();
        for _ in 0..3 {
            let again: Vec<String> = state.trending().iter().map(|t| t.title.clone()).collect();
            assert_eq!(first, again);
        }
        // Same content as the catalog row, order aside.
        let mut sorted = first.clone();
        sorted.sort();
        let mut expected: Vec<String> = fixture_catalog()
            .trending
            .iter()
            .map(|t| t.title.clone())
            .collect();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_recommendations_exclude_subject_and_cap_at_five() {
        let mut state = fresh_state();
        let alpha = state.catalog().find("Alpha").unwrap().clone();
        let recs = state.recommendations_for(&alpha);
        assert!(recs.len() <= 5);
        assert!(!recs.is_empty());
        assert!(recs.iter().all(|t| t.title != "Alpha"));
    }

    /// Shared-map store so two controller instances can see the same
    /// persisted state, like two process runs over one backing file.
    struct SharedStore(Rc<RefCell<BTreeMap<String, String>>>);

    impl Store for SharedStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.borrow().get(key).cloned()
        }
        fn set(&self, key: &str, value: &str) {
            self.0.borrow_mut().insert(key.to_string(), value.to_string());
        }
        fn remove(&self, key: &str) {
            self.0.borrow_mut().remove(key);
        }
    }

    #[test]
    fn test_state_survives_reload() {
        let map = Rc::new(RefCell::new(BTreeMap::new()));
        {
            let mut state = state_with(Box::new(SharedStore(map.clone())));
            state.navigate(Section::Movies);
            state.add_user_title(user_title("Persisted"));
            let alpha = state.catalog().find("Alpha").unwrap().clone();
            state.select(&alpha);
        }
        let state = state_with(Box::new(SharedStore(map.clone())));
        assert_eq!(state.user_added.len(), 1);
        assert_eq!(state.selected.as_ref().unwrap().title, "Alpha");
        assert!(state.is_detail_view);
        assert!(state.playback.is_some());
        assert_invariant(&state);
    }

    #[test]
    fn test_reload_after_go_back_is_not_detail() {
        let map = Rc::new(RefCell::new(BTreeMap::new()));
        {
            let mut state = state_with(Box::new(SharedStore(map.clone())));
            state.navigate(Section::New);
            let gamma = state.catalog().find("Gamma").unwrap().clone();
            state.select(&gamma);
            state.go_back();
        }
        let state = state_with(Box::new(SharedStore(map.clone())));
        assert_eq!(state.current_section, Section::New);
        assert!(!state.is_detail_view);
        assert!(state.selected.is_none());
    }

    #[test]
    fn test_stale_selection_does_not_force_detail_view() {
        // A stored title that no longer resolves anywhere: the detail flag
        // is ignored and the invariant still holds.
        let store = MemStore::with(&[
            (KEY_SELECTED_TITLE, "Vanished"),
            (KEY_IS_DETAIL_VIEW, "true"),
            (KEY_SECTION, "mylist"),
        ]);
        let state = state_with(Box::new(store));
        assert!(!state.is_detail_view);
        assert!(state.selected.is_none());
        assert_eq!(state.current_section, Section::MyList);
        assert_invariant(&state);
    }

    #[test]
    fn test_selection_restores_from_user_added() {
        let encoded = serde_json::to_string(&vec![user_title("Mine")]).unwrap();
        let store = MemStore::with(&[
            (KEY_USER_ADDED, &encoded),
            (KEY_SELECTED_TITLE, "Mine"),
            (KEY_IS_DETAIL_VIEW, "true"),
        ]);
        let state = state_with(Box::new(store));
        assert!(state.is_detail_view);
        assert_eq!(state.selected.as_ref().unwrap().title, "Mine");
    }
}
