use std::path::Path;

// Trailing slashes: contents of source land directly in backup_dir.
pub fn rsync_args(source: &Path, backup_dir: &Path) -> Vec<String> {
    vec![
        "rsync".to_string(),
        "-avz".to_string(),
        "--delete".to_string(),
        with_trailing_slash(source),
        with_trailing_slash(backup_dir),
    ]
}

fn with_trailing_slash(path: &Path) -> String {
    let mut s = path.to_string_lossy().into_owned();
    if !s.ends_with('/') {
        s.push('/');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsync_args_mirror_directory_contents() {
        let args = rsync_args(Path::new("/home/user/docs"), Path::new("/backup/backup_20250101_120000"));
        assert_eq!(
            args,
            vec![
                "rsync",
                "-avz",
                "--delete",
                "/home/user/docs/",
                "/backup/backup_20250101_120000/",
            ]
        );
    }

    #[test]
    fn existing_trailing_slash_is_not_doubled() {
        let args = rsync_args(Path::new("/src/"), Path::new("/dst"));
        assert_eq!(args[3], "/src/");
        assert_eq!(args[4], "/dst/");
    }
}
