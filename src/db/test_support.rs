use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// A fresh SQLite file under the OS temp dir; callers remove it when done.
pub(crate) fn temp_database_url(tag: &str) -> (String, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut path = std::env::temp_dir();
    path.push(format!(
        "inventory-{tag}-{}-{nanos}.sqlite",
        std::process::id()
    ));
    (format!("sqlite:{}", path.display()), path)
}
