use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::info;

/// Creates `path` with `initial` contents when it does not exist yet,
/// along with any missing parent directories. Returns whether it was created.
pub async fn ensure_file(path: &Path, initial: &[u8]) -> io::Result<bool> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    if fs::try_exists(path).await? {
        return Ok(false);
    }

    fs::write(path, initial).await?;
    info!("initialized {}", path.display());
    Ok(true)
}

/// Replaces the whole file: writes a sibling temp file then renames it over
/// the target, so readers never observe a half-written file.
pub async fn write_replace(path: &Path, payload: &[u8]) -> io::Result<()> {
    let tmp_path = temp_path(path);
    fs::write(&tmp_path, payload).await?;
    fs::rename(&tmp_path, path).await
}

/// `desk.csv` becomes `desk.csv.tmp`; the full file name is kept so files
/// sharing a stem never share a temp file.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
pub(crate) fn scratch_path(name: &str) -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("request_desk_{}_{}", std::process::id(), nanos));
    path.push(name);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_file_creates_once() {
        let path = scratch_path("nested/file.txt");
        assert!(ensure_file(&path, b"first").await.unwrap());
        assert!(!ensure_file(&path, b"second").await.unwrap());
        assert_eq!(fs::read(&path).await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn write_replace_overwrites_and_cleans_temp() {
        let path = scratch_path("data.csv");
        ensure_file(&path, b"old").await.unwrap();
        write_replace(&path, b"new").await.unwrap();
        assert_eq!(fs::read(&path).await.unwrap(), b"new");
        assert!(!fs::try_exists(temp_path(&path)).await.unwrap());
    }

    #[test]
    fn temp_path_keeps_extension() {
        assert_eq!(temp_path(Path::new("data/desk.csv")), PathBuf::from("data/desk.csv.tmp"));
        assert_ne!(
            temp_path(Path::new("data/desk.csv")),
            temp_path(Path::new("data/desk.json"))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn files_sharing_a_stem_replace_independently() {
        let csv = scratch_path("desk.csv");
        let json = csv.with_file_name("desk.json");
        ensure_file(&csv, b"").await.unwrap();
        ensure_file(&json, b"").await.unwrap();

        for round in 0..200u32 {
            let csv_payload = format!("csv {round}");
            let json_payload = format!("json {round}");
            let (a, b) = tokio::join!(
                write_replace(&csv, csv_payload.as_bytes()),
                write_replace(&json, json_payload.as_bytes())
            );
            a.unwrap();
            b.unwrap();
            assert_eq!(fs::read(&csv).await.unwrap(), csv_payload.as_bytes());
            assert_eq!(fs::read(&json).await.unwrap(), json_payload.as_bytes());
        }
    }
}
