use std::ffi::OsStr;
use std::path::{Path, PathBuf};

pub fn archive_path(backup_dir: &Path) -> PathBuf {
    let mut name = backup_dir.as_os_str().to_os_string();
    name.push(".tar.gz");
    PathBuf::from(name)
}

// Archive root is the backup directory's base name.
pub fn tar_args(dest: &Path, backup_dir: &Path) -> Vec<String> {
    let base = backup_dir
        .file_name()
        .unwrap_or_else(|| OsStr::new("."))
        .to_string_lossy()
        .into_owned();
    vec![
        "tar".to_string(),
        "-czf".to_string(),
        archive_path(backup_dir).to_string_lossy().into_owned(),
        "-C".to_string(),
        dest.to_string_lossy().into_owned(),
        base,
    ]
}
