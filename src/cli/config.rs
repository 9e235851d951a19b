use std::fs;
use std::path::PathBuf;

use crate::provider::Session;

const SESSION_FILE: &str = "session.json";

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("JOBS_CONSOLE_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("jobs-console")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> anyhow::Result<Option<Session>> {
    load_session_from(&get_config_dir()?)
}

pub fn save_session(session: &Session) -> anyhow::Result<()> {
    save_session_to(&get_config_dir()?, session)
}

/// Forget the stored session; returns whether one existed
pub fn clear_session() -> anyhow::Result<bool> {
    clear_session_in(&get_config_dir()?)
}

fn load_session_from(dir: &std::path::Path) -> anyhow::Result<Option<Session>> {
    let session_file = dir.join(SESSION_FILE);

    if !session_file.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(session_file)?;
    let session: Session = serde_json::from_str(&content)?;
    Ok(Some(session))
}

fn save_session_to(dir: &std::path::Path, session: &Session) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(session)?;
    fs::write(dir.join(SESSION_FILE), content)?;
    Ok(())
}

fn clear_session_in(dir: &std::path::Path) -> anyhow::Result<bool> {
    let session_file = dir.join(SESSION_FILE);
    if !session_file.exists() {
        return Ok(false);
    }
    fs::remove_file(session_file)?;
    Ok(true)
}
