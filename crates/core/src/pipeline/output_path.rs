use std::path::{Path, PathBuf};

/// Derives the output path for a swapped image: the original file name
/// prefixed with `swapped-`, in the same directory.
pub fn swapped_output_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefixed = format!("swapped-{name}");
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(prefixed),
        _ => PathBuf::from(prefixed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::with_directory("/a/b/target.png", "/a/b/swapped-target.png")]
    #[case::bare_name("target.png", "swapped-target.png")]
    #[case::relative_dir("frames/007.png", "frames/swapped-007.png")]
    #[case::no_extension("/tmp/photo", "/tmp/swapped-photo")]
    fn test_swapped_output_path(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(swapped_output_path(Path::new(input)), PathBuf::from(expected));
    }
}
