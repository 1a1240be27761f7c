use eframe::egui::{self, Align2, Color32, RichText};
use egui_extras::{Column, TableBuilder};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::mpsc::{self, Receiver, Sender};

mod admin;
mod app_state;
mod catalog;
mod config;
mod helpers;
mod icon;
mod images;
mod logger;
mod models;
mod player;
mod search;
mod storage;
mod ui_helpers;

use admin::verify_admin_password;
use app_state::{AppState, Msg};
use catalog::Catalog;
use config::{read_config, save_config};
use helpers::{TITLES_PER_ROW, chunk_rows, poster_src};
use images::{ImageManager, UPLOADS_PER_FRAME};
use logger::{log_error, log_line};
use models::{Config, Section, Title, TitleKind};
use player::episode_embed_url;
use storage::{FileStore, data_dir};
use ui_helpers::{kind_badge, poster_placeholder, section_heading, truncate};

const POSTER_SIZE: egui::Vec2 = egui::vec2(120.0, 176.0);
const DETAIL_POSTER_SIZE: egui::Vec2 = egui::vec2(220.0, 330.0);

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    let icon = icon::generate_icon(256);
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 840.0])
        .with_icon(icon);
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "Nightfall",
        options,
        Box::new(|_cc| Box::new(Nightfall::new())),
    )
}

/// Draft for the add-title form. Turned into a `Title` on submit.
#[derive(Default)]
struct AddTitleForm {
    title: String,
    poster_path: String,
    description: String,
    release_date: String,
    duration: String,
    rating: String,
    genre: String,
    director: String,
    is_tv: bool,
    /// Comma-separated episode counts, one per season ("10, 8, 12").
    seasons_episodes: String,
    video_url: String,
    feedback: Option<String>,
}

impl AddTitleForm {
    fn to_title(&self) -> Title {
        let counts: Vec<u32> = self
            .seasons_episodes
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        let mut t = Title {
            title: self.title.trim().to_string(),
            poster_path: self.poster_path.trim().to_string(),
            description: self.description.trim().to_string(),
            release_date: self.release_date.trim().to_string(),
            rating: self.rating.trim().to_string(),
            genre: self.genre.trim().to_string(),
            director: self.director.trim().to_string(),
            kind: if self.is_tv { TitleKind::Tv } else { TitleKind::Movie },
            ..Title::default()
        };
        if !self.video_url.trim().is_empty() {
            t.video_url = Some(self.video_url.trim().to_string());
        }
        if self.is_tv {
            if !counts.is_empty() {
                t.seasons = Some(counts.len() as u32);
                t.episodes = Some(counts.iter().sum());
                t.seasons_episodes = Some(counts);
            }
        } else if !self.duration.trim().is_empty() {
            t.duration = Some(self.duration.trim().to_string());
        }
        t
    }
}

/// Pending admin-gated removal.
struct RemovePrompt {
    target: Title,
    input: String,
    error: Option<String>,
}

struct Nightfall {
    config: Config,
    state: AppState,
    images: ImageManager,
    tx: Sender<Msg>,
    rx: Receiver<Msg>,
    add_form: AddTitleForm,
    remove_prompt: Option<RemovePrompt>,
    /// Recommendation row for the open detail view; redrawn on each select.
    recommended: Vec<Title>,
    theme_applied: bool,
    font_scale_applied: bool,
}

impl Nightfall {
    fn new() -> Self {
        let config = match read_config() {
            Ok(c) => c,
            Err(_) => {
                let cfg = Config::default();
                if let Err(e) = save_config(&cfg) {
                    log_error("failed to save default config", &e);
                }
                cfg
            }
        };
        let catalog = match Catalog::embedded() {
            Ok(c) => c,
            Err(e) => {
                log_error("failed to load bundled catalog", &e);
                Catalog::default()
            }
        };
        let store = FileStore::open(data_dir());
        let state = AppState::new(catalog, Box::new(store), StdRng::from_entropy());
        let (tx, rx) = mpsc::channel();
        log_line("session start");

        let mut app = Self {
            config,
            state,
            images: ImageManager::default(),
            tx,
            rx,
            add_form: AddTitleForm::default(),
            remove_prompt: None,
            recommended: Vec::new(),
            theme_applied: false,
            font_scale_applied: false,
        };
        // A detail view restored from the last session needs its row too.
        if let Some(t) = app.state.selected.clone() {
            app.recommended = app.state.recommendations_for(&t);
        }
        app
    }

    fn select_title(&mut self, title: &Title) {
        self.state.select(title);
        if let Some(sel) = self.state.selected.clone() {
            self.recommended = self.state.recommendations_for(&sel);
        }
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("NIGHTFALL")
                        .heading()
                        .strong()
                        .color(Color32::from_rgb(199, 54, 64)),
                );
                ui.separator();
                for (label, section) in [
                    ("Home", Section::Home),
                    ("TV Shows", Section::TvShows),
                    ("Movies", Section::Movies),
                    ("New & Popular", Section::New),
                    ("My List", Section::MyList),
                    ("Add Movie", Section::AddTitle),
                ] {
                    let active =
                        self.state.current_section == section && !self.state.is_detail_view;
                    if ui.selectable_label(active, label).clicked() {
                        self.state.navigate(section);
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label("👤");
                    let mut term = self.state.search_term.clone();
                    let resp = ui.add(
                        egui::TextEdit::singleline(&mut term)
                            .hint_text("Search")
                            .desired_width(200.0),
                    );
                    if resp.changed() {
                        self.state.set_search(term);
                    }
                });
            });
            ui.add_space(4.0);
        });
    }

    /// Poster image if the texture is ready, placeholder frame otherwise.
    /// Either way the whole area is clickable.
    fn poster_widget(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        title: &Title,
        size: egui::Vec2,
    ) -> egui::Response {
        let src = poster_src(&self.config, &title.poster_path);
        if let Some(tex) = self.images.texture(&src) {
            ui.add(
                egui::Image::new(tex)
                    .fit_to_exact_size(size)
                    .sense(egui::Sense::click()),
            )
        } else {
            if !self.images.has_failed(&src) {
                self.images.request(&src, &self.tx, ctx);
            }
            poster_placeholder(ui, size, &title.title)
        }
    }

    fn render_poster_card(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        title: &Title,
        removable: bool,
    ) {
        ui.vertical(|ui| {
            let clicked = self.poster_widget(ui, ctx, title, POSTER_SIZE).clicked();
            ui.horizontal(|ui| {
                ui.label(truncate(&title.title, 15)).on_hover_text(&title.title);
                if removable && ui.small_button("✕").on_hover_text("Remove from list").clicked() {
                    self.remove_prompt = Some(RemovePrompt {
                        target: title.clone(),
                        input: String::new(),
                        error: None,
                    });
                }
            });
            if clicked {
                self.select_title(title);
            }
        });
    }

    fn render_row(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        id: &str,
        heading: &str,
        titles: &[Title],
        removable: bool,
    ) {
        section_heading(ui, heading);
        egui::ScrollArea::horizontal()
            .id_source(id)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for t in titles {
                        self.render_poster_card(ui, ctx, t, removable);
                    }
                });
            });
    }

    fn render_banner(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, title: &Title) {
        egui::Frame::none()
            .fill(Color32::from_gray(16))
            .rounding(6.0)
            .inner_margin(egui::Margin::same(14.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let clicked = self.poster_widget(ui, ctx, title, DETAIL_POSTER_SIZE).clicked();
                    ui.add_space(14.0);
                    let mut watch = false;
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&title.title).heading().strong());
                        ui.horizontal(|ui| {
                            ui.label(&title.release_date);
                            if let Some(d) = &title.duration {
                                ui.label(d);
                            }
                            ui.label(format!("⭐ {}", title.rating));
                            ui.label(kind_badge(title.kind));
                        });
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(&title.genre).italics());
                            ui.label(format!("Director: {}", title.director));
                        });
                        ui.add_space(6.0);
                        ui.label(truncate(&title.description, 220));
                        ui.add_space(8.0);
                        watch = ui.button(RichText::new("▶  Watch").strong()).clicked();
                    });
                    if clicked || watch {
                        self.select_title(title);
                    }
                });
            });
    }

    fn render_home(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let trending = self.state.trending().to_vec();
        let banner = trending
            .first()
            .cloned()
            .or_else(|| self.state.catalog().trending.first().cloned());
        if let Some(first) = banner {
            self.render_banner(ui, ctx, &first);
        }
        self.render_row(ui, ctx, "trending", "Trending Now", &trending, false);
        let movies: Vec<Title> = self.state.movies().iter().take(TITLES_PER_ROW).cloned().collect();
        self.render_row(ui, ctx, "movies-home", "Movies", &movies, false);
        let newpop: Vec<Title> = self
            .state
            .new_popular()
            .iter()
            .take(TITLES_PER_ROW)
            .cloned()
            .collect();
        self.render_row(ui, ctx, "new-home", "New & Popular", &newpop, false);
        let mylist: Vec<Title> = self.state.my_list().into_iter().take(TITLES_PER_ROW).collect();
        self.render_row(ui, ctx, "mylist-home", "My List", &mylist, false);
        let tv: Vec<Title> = self.state.tvshows().iter().take(TITLES_PER_ROW).cloned().collect();
        self.render_row(ui, ctx, "tv-home", "TV Shows", &tv, false);
    }

    /// Section pages paginate the full collection into fixed-size rows.
    fn render_section_rows(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        heading: &str,
        titles: &[Title],
        removable: bool,
    ) {
        for (i, chunk) in chunk_rows(titles, TITLES_PER_ROW).into_iter().enumerate() {
            let id = format!("{}-{}", heading, i);
            self.render_row(ui, ctx, &id, heading, chunk, removable);
        }
    }

    fn render_search_results(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let results = self.state.search_results();
        let term = self.state.search_term.trim().to_string();
        if results.is_empty() {
            ui.add_space(24.0);
            ui.label(format!("No results found for \"{}\".", term));
            return;
        }
        let heading = format!("Search Results for \"{}\"", term);
        self.render_row(ui, ctx, "search", &heading, &results, false);
    }

    fn render_detail(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let Some(title) = self.state.selected.clone() else {
            return;
        };
        if ui.button("← Back").clicked() {
            self.state.go_back();
            return;
        }
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            self.poster_widget(ui, ctx, &title, DETAIL_POSTER_SIZE);
            ui.add_space(16.0);
            ui.vertical(|ui| {
                ui.label(RichText::new(&title.title).heading().strong());
                ui.add_space(6.0);
                render_metadata_table(ui, &title);
            });
        });

        ui.add_space(12.0);
        section_heading(ui, &format!("Watch {} Online", title.title));
        let playback = self.state.playback.clone();
        egui::Frame::none()
            .fill(Color32::from_gray(14))
            .rounding(6.0)
            .inner_margin(egui::Margin::same(12.0))
            .show(ui, |ui| {
                if title.is_tv() {
                    let pb = playback.as_ref();
                    let season = pb.map(|p| p.selected_season).unwrap_or(1);
                    let episode = pb.map(|p| p.selected_episode).unwrap_or(1);
                    let embed = episode_embed_url(&self.config, &title.title, season, episode);
                    ui.label("Embedded stream");
                    ui.label(RichText::new(embed).monospace().weak());
                } else {
                    let active = playback
                        .as_ref()
                        .and_then(|p| p.active_url.clone())
                        .or_else(|| title.video_url.clone());
                    match active {
                        Some(url) => {
                            ui.label("Embedded stream");
                            ui.label(RichText::new(url).monospace().weak());
                        }
                        None => {
                            // No playback target at all: still frame with a
                            // play glyph, like the web player fallback.
                            let caption = title
                                .trailer_image
                                .clone()
                                .unwrap_or_else(|| title.title.clone());
                            poster_placeholder(ui, egui::vec2(320.0, 180.0), &caption);
                            ui.label("▶");
                        }
                    }
                }
            });

        if !title.is_tv() {
            let servers = playback.as_ref().map(|p| p.servers.clone()).unwrap_or_default();
            if !servers.is_empty() {
                ui.add_space(6.0);
                ui.label(RichText::new("Available Servers").strong());
                let active = playback.as_ref().and_then(|p| p.active_server.clone());
                ui.horizontal(|ui| {
                    for s in &servers {
                        let selected = active.as_deref() == Some(s.name.as_str());
                        if ui.selectable_label(selected, &s.name).clicked() {
                            self.state.set_active_server(&s.name);
                        }
                    }
                });
            }
        } else {
            ui.add_space(6.0);
            let pb = playback.as_ref();
            let seasons_total = title
                .seasons
                .or_else(|| title.seasons_episodes.as_ref().map(|v| v.len() as u32))
                .unwrap_or(1)
                .max(1);
            let mut season = pb.map(|p| p.selected_season).unwrap_or(1);
            let mut episode = pb.map(|p| p.selected_episode).unwrap_or(1);
            let max_episodes = pb.map(|p| p.max_episodes).unwrap_or(1).max(1);
            ui.horizontal(|ui| {
                egui::ComboBox::from_label("Season")
                    .selected_text(format!("Season {}", season))
                    .show_ui(ui, |ui| {
                        for s in 1..=seasons_total {
                            ui.selectable_value(&mut season, s, format!("Season {}", s));
                        }
                    });
                egui::ComboBox::from_label("Episode")
                    .selected_text(format!("Episode {}", episode))
                    .show_ui(ui, |ui| {
                        for e in 1..=max_episodes {
                            ui.selectable_value(&mut episode, e, format!("Episode {}", e));
                        }
                    });
            });
            if pb.map(|p| p.selected_season) != Some(season) {
                self.state.set_season(season);
            } else if pb.map(|p| p.selected_episode) != Some(episode) {
                self.state.set_episode(episode);
            }
        }

        ui.add_space(12.0);
        section_heading(ui, "Synopsis");
        ui.label(&title.description);

        if !self.recommended.is_empty() {
            let recommended = self.recommended.clone();
            self.render_row(ui, ctx, "recommended", "You May Also Like", &recommended, false);
        }
    }

    fn render_add_form(&mut self, ui: &mut egui::Ui) {
        section_heading(ui, "Add Movie");
        egui::Grid::new("add-form")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                ui.label("Title");
                ui.text_edit_singleline(&mut self.add_form.title);
                ui.end_row();
                ui.label("Poster path or URL");
                ui.text_edit_singleline(&mut self.add_form.poster_path);
                ui.end_row();
                ui.label("Description");
                ui.text_edit_multiline(&mut self.add_form.description);
                ui.end_row();
                ui.label("Release year");
                ui.text_edit_singleline(&mut self.add_form.release_date);
                ui.end_row();
                ui.label("Rating");
                ui.text_edit_singleline(&mut self.add_form.rating);
                ui.end_row();
                ui.label("Genre");
                ui.text_edit_singleline(&mut self.add_form.genre);
                ui.end_row();
                ui.label("Director");
                ui.text_edit_singleline(&mut self.add_form.director);
                ui.end_row();
                ui.label("Video URL");
                ui.text_edit_singleline(&mut self.add_form.video_url);
                ui.end_row();
                ui.label("TV show");
                ui.checkbox(&mut self.add_form.is_tv, "");
                ui.end_row();
                if self.add_form.is_tv {
                    ui.label("Episodes per season");
                    ui.text_edit_singleline(&mut self.add_form.seasons_episodes);
                } else {
                    ui.label("Duration");
                    ui.text_edit_singleline(&mut self.add_form.duration);
                }
                ui.end_row();
            });
        ui.add_space(8.0);
        if ui.button("Add to My List").clicked() {
            if self.add_form.title.trim().is_empty() {
                self.add_form.feedback = Some("A title is required.".to_string());
            } else {
                let t = self.add_form.to_title();
                let name = t.title.clone();
                self.state.add_user_title(t);
                self.add_form = AddTitleForm {
                    feedback: Some(format!("Added \"{}\" to My List.", name)),
                    ..AddTitleForm::default()
                };
            }
        }
        if let Some(msg) = &self.add_form.feedback {
            ui.label(msg.clone());
        }
    }

    fn render_remove_prompt(&mut self, ctx: &egui::Context) {
        let Some(prompt) = &mut self.remove_prompt else {
            return;
        };
        let mut close = false;
        let mut confirmed = false;
        egui::Window::new("Remove from My List")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "Enter the admin password to remove \"{}\".",
                    prompt.target.title
                ));
                ui.add(egui::TextEdit::singleline(&mut prompt.input).password(true));
                if let Some(err) = &prompt.error {
                    ui.colored_label(Color32::LIGHT_RED, err);
                }
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                    if ui.button("Remove").clicked() {
                        confirmed = true;
                    }
                });
            });
        if confirmed {
            let target = prompt.target.clone();
            if verify_admin_password(&self.config, &prompt.input) {
                self.state.remove_user_title(&target);
                close = true;
            } else {
                prompt.error = Some("Incorrect password. Access denied.".to_string());
                prompt.input.clear();
            }
        }
        if close {
            self.remove_prompt = None;
        }
    }
}

fn render_metadata_table(ui: &mut egui::Ui, title: &Title) {
    let mut rows: Vec<(&str, String)> = vec![
        ("Title", title.title.clone()),
        (
            "Quality",
            title.quality.clone().unwrap_or_else(|| "HD".to_string()),
        ),
        ("Released", title.release_date.clone()),
        ("Genre", title.genre.clone()),
        (
            "Country",
            title
                .country
                .clone()
                .unwrap_or_else(|| "United States".to_string()),
        ),
        (
            "Cast",
            title
                .cast
                .clone()
                .unwrap_or_else(|| "Cast information not available".to_string()),
        ),
    ];
    if title.is_tv() {
        rows.push((
            "Seasons",
            title.seasons.map(|n| n.to_string()).unwrap_or_default(),
        ));
        rows.push((
            "Episodes",
            title.episodes.map(|n| n.to_string()).unwrap_or_default(),
        ));
    } else {
        rows.push(("Duration", title.duration.clone().unwrap_or_default()));
    }
    rows.push(("Rating", format!("⭐ {}", title.rating)));
    rows.push(("Director", title.director.clone()));

    TableBuilder::new(ui)
        .column(Column::exact(90.0))
        .column(Column::remainder())
        .body(|mut body| {
            for (label, value) in rows {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(RichText::new(label).weak());
                    });
                    row.col(|ui| {
                        ui.label(value);
                    });
                });
            }
        });
}

impl eframe::App for Nightfall {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            match self.config.theme.as_str() {
                "light" => ctx.set_visuals(egui::Visuals::light()),
                _ => ctx.set_visuals(egui::Visuals::dark()),
            }
            self.theme_applied = true;
        }
        if !self.font_scale_applied {
            let mut style = egui::Style::default();
            let scale = self.config.font_scale.max(0.6).min(2.0);
            style.text_styles.iter_mut().for_each(|(_, ts)| {
                ts.size *= scale;
            });
            ctx.set_style(style);
            self.font_scale_applied = true;
        }

        while let Ok(msg) = self.rx.try_recv() {
            self.images.handle_msg(msg);
        }
        self.images.upload_pending(ctx, UPLOADS_PER_FRAME);

        self.render_header(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    let searching = !self.state.search_term.trim().is_empty();
                    if searching && !self.state.is_detail_view {
                        self.render_search_results(ui, ctx);
                    } else if self.state.is_detail_view {
                        self.render_detail(ui, ctx);
                    } else {
                        match self.state.current_section {
                            Section::Home => self.render_home(ui, ctx),
                            Section::Movies => {
                                let titles = self.state.movies().to_vec();
                                self.render_section_rows(ui, ctx, "Movies", &titles, false);
                            }
                            Section::TvShows => {
                                let titles = self.state.tvshows().to_vec();
                                self.render_section_rows(ui, ctx, "TV Shows", &titles, false);
                            }
                            Section::New => {
                                let titles = self.state.new_popular().to_vec();
                                self.render_section_rows(ui, ctx, "New & Popular", &titles, false);
                            }
                            Section::MyList => {
                                let titles = self.state.my_list();
                                self.render_section_rows(ui, ctx, "My List", &titles, true);
                            }
                            Section::AddTitle => self.render_add_form(ui),
                        }
                    }
                });
        });
        self.render_remove_prompt(ctx);
    }
}
