use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::models::Config;
use crate::storage::data_dir;

fn config_file_path() -> PathBuf {
    data_dir().join("nightfall.conf")
}

/// Read the config file, falling back to a local file next to the binary.
pub fn read_config() -> Result<Config, io::Error> {
    let primary = config_file_path();
    let content = match fs::read_to_string(&primary) {
        Ok(s) => s,
        Err(_e) => fs::read_to_string("nightfall.conf")?,
    };
    Ok(parse_config(&content))
}

/// Line-oriented `key=value` parsing. Unknown keys are ignored; missing keys
/// keep their defaults.
fn parse_config(content: &str) -> Config {
    let mut cfg = Config::default();
    for line in content.lines() {
        if let Some((k, v)) = line.split_once('=') {
            match k.trim() {
                "theme" => cfg.theme = v.trim().to_string(),
                "font_scale" => cfg.font_scale = v.trim().parse::<f32>().unwrap_or(1.15),
                "admin_password_hash" => cfg.admin_password_hash = v.trim().to_lowercase(),
                "poster_base_url" => cfg.poster_base_url = v.trim().to_string(),
                "placeholder_poster_url" => cfg.placeholder_poster_url = v.trim().to_string(),
                "episode_embed_base" => cfg.episode_embed_base = v.trim().to_string(),
                _ => {}
            }
        }
    }
    if cfg.theme.is_empty() {
        cfg.theme = "dark".to_string();
    }
    cfg
}

pub fn save_config(cfg: &Config) -> Result<(), io::Error> {
    let path = config_file_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut f = fs::File::create(path)?;
    writeln!(f, "theme={}", cfg.theme)?;
    writeln!(f, "font_scale={:.2}", cfg.font_scale)?;
    if !cfg.admin_password_hash.is_empty() {
        writeln!(f, "admin_password_hash={}", cfg.admin_password_hash)?;
    }
    writeln!(f, "poster_base_url={}", cfg.poster_base_url)?;
    writeln!(f, "placeholder_poster_url={}", cfg.placeholder_poster_url)?;
    writeln!(f, "episode_embed_base={}", cfg.episode_embed_base)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_missing_keys() {
        let cfg = parse_config("");
        assert_eq!(cfg.theme, "dark");
        assert!(cfg.admin_password_hash.is_empty());
        assert!(cfg.episode_embed_base.starts_with("https://"));
    }

    #[test]
    fn test_parse_tolerates_junk_lines() {
        let cfg = parse_config("theme=light\ngarbage\nfont_scale=abc\n# note\n");
        assert_eq!(cfg.theme, "light");
        assert_eq!(cfg.font_scale, 1.15);
    }

    #[test]
    fn test_admin_hash_is_case_folded() {
        let cfg = parse_config("admin_password_hash=ABCDEF0123\n");
        assert_eq!(cfg.admin_password_hash, "abcdef0123");
    }
}
