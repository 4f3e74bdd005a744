use std::path::{Path, PathBuf};

/// Resolve the data directory: explicit override, then `$BASKET_DIR`,
/// then `$XDG_DATA_HOME/basket`, then `~/.local/share/basket`.
pub fn data_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    if let Some(dir) = non_empty_var("BASKET_DIR") {
        return PathBuf::from(dir);
    }
    let data_home = non_empty_var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs_home().join(".local").join("share"));
    data_home.join("basket")
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}
