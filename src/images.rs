use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use directories::ProjectDirs;
use eframe::egui;

use crate::app_state::Msg;
use crate::logger::log_error;

/// Decoded posters uploaded as textures per frame; keeps scrolling smooth
/// when a whole row of posters arrives at once.
pub const UPLOADS_PER_FRAME: usize = 3;

/// Poster loading and texture cache. Fetch + decode happen on the runtime;
/// results come back over the app's message channel and are uploaded on the
/// UI thread under a per-frame budget.
pub struct ImageManager {
    textures: HashMap<String, egui::TextureHandle>,
    pending: HashSet<String>,
    failed: HashSet<String>,
    uploads: VecDeque<(String, Vec<u8>, u32, u32)>,
}

impl Default for ImageManager {
    fn default() -> Self {
        ImageManager {
            textures: HashMap::new(),
            pending: HashSet::new(),
            failed: HashSet::new(),
            uploads: VecDeque::new(),
        }
    }
}

impl ImageManager {
    pub fn texture(&self, url: &str) -> Option<&egui::TextureHandle> {
        self.textures.get(url)
    }

    pub fn has_failed(&self, url: &str) -> bool {
        self.failed.contains(url)
    }

    /// Kick off a background fetch for a poster, once per url.
    pub fn request(&mut self, url: &str, tx: &Sender<Msg>, ctx: &egui::Context) {
        if self.textures.contains_key(url)
            || self.pending.contains(url)
            || self.failed.contains(url)
        {
            return;
        }
        self.pending.insert(url.to_string());

        let url = url.to_string();
        let tx = tx.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let msg = match fetch_poster(&url).await {
                Ok(bytes) => match image::load_from_memory(&bytes) {
                    Ok(img) => {
                        let rgba = img.to_rgba8();
                        let (w, h) = rgba.dimensions();
                        Msg::PosterDecoded {
                            url: url.clone(),
                            rgba: rgba.into_raw(),
                            w,
                            h,
                        }
                    }
                    Err(e) => {
                        log_error("failed to decode poster", &e);
                        Msg::PosterFailed { url: url.clone() }
                    }
                },
                Err(e) => {
                    log_error("failed to fetch poster", e.as_ref());
                    Msg::PosterFailed { url: url.clone() }
                }
            };
            if tx.send(msg).is_ok() {
                ctx.request_repaint();
            }
        });
    }

    pub fn handle_msg(&mut self, msg: Msg) {
        match msg {
            Msg::PosterDecoded { url, rgba, w, h } => {
                self.uploads.push_back((url, rgba, w, h));
            }
            Msg::PosterFailed { url } => {
                self.pending.remove(&url);
                self.failed.insert(url);
            }
        }
    }

    /// Upload queued decodes, at most `budget` per call.
    pub fn upload_pending(&mut self, ctx: &egui::Context, budget: usize) {
        let mut done = 0usize;
        while done < budget {
            let Some((url, rgba, w, h)) = self.uploads.pop_front() else {
                break;
            };
            if !self.textures.contains_key(&url) {
                let color_image =
                    egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &rgba);
                let tex = ctx.load_texture(url.clone(), color_image, egui::TextureOptions::LINEAR);
                self.textures.insert(url.clone(), tex);
            }
            self.pending.remove(&url);
            done += 1;
        }
        if !self.uploads.is_empty() {
            ctx.request_repaint();
        }
    }
}

fn poster_cache_dir() -> PathBuf {
    match ProjectDirs::from("", "", "Nightfall") {
        Some(dirs) => dirs.cache_dir().join("posters"),
        None => PathBuf::from("posters-cache"),
    }
}

fn poster_cache_path(url: &str) -> PathBuf {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    let ext = if url.ends_with(".png") {
        "png"
    } else if url.ends_with(".jpg") || url.ends_with(".jpeg") {
        "jpg"
    } else {
        "img"
    };
    poster_cache_dir().join(format!("{:x}.{}", hasher.finish(), ext))
}

/// Read the poster from the byte cache, or fetch and cache it.
async fn fetch_poster(url: &str) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    let cache_path = poster_cache_path(url);
    if let Ok(data) = tokio::fs::read(&cache_path).await {
        return Ok(data);
    }

    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()).into());
    }
    let data = response.bytes().await?.to_vec();

    if let Some(dir) = cache_path.parent() {
        tokio::fs::create_dir_all(dir).await.ok();
        tokio::fs::write(&cache_path, &data).await.ok();
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_path_is_stable_per_url() {
        let a = poster_cache_path("https://image.tmdb.org/t/p/w780/abc.jpg");
        let b = poster_cache_path("https://image.tmdb.org/t/p/w780/abc.jpg");
        let c = poster_cache_path("https://image.tmdb.org/t/p/w780/def.jpg");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_cache_path_extension_from_url() {
        assert!(poster_cache_path("https://x/a.png").to_string_lossy().ends_with(".png"));
        assert!(poster_cache_path("https://x/a.jpeg").to_string_lossy().ends_with(".jpg"));
        assert!(poster_cache_path("https://x/a?size=w780").to_string_lossy().ends_with(".img"));
    }
}
