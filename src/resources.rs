use std::path::{Path, PathBuf};

use anyhow::Context;

/// Directory the build script copies `res/` into.
const BUILD_RESOURCES: &str = env!("OUT_DIR");

/// Reads a text resource.
///
/// The path is tried relative to the working directory first, then inside the
/// copy of `res/` made by the build script, so the binary still finds its
/// shaders when launched from somewhere other than the crate root.
pub fn load_string(file_name: impl AsRef<Path>) -> anyhow::Result<String> {
    let path = resolve(file_name.as_ref(), Path::new(BUILD_RESOURCES));
    log::debug!("loading resource {}", path.display());

    std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read resource {}", path.display()))
}

fn resolve(file_name: &Path, fallback_root: &Path) -> PathBuf {
    if file_name.exists() {
        return file_name.to_path_buf();
    }

    let fallback = fallback_root.join(file_name);
    if fallback.exists() {
        fallback
    } else {
        // report the path the caller asked for
        file_name.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "#shader vertex\nvoid main() {{}}\n").unwrap();

        let text = load_string(file.path()).unwrap();
        assert!(text.starts_with("#shader vertex"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_string("res/shaders/does_not_exist.shader").unwrap_err();
        assert!(err.to_string().contains("does_not_exist.shader"));
    }

    #[test]
    fn falls_back_to_build_copy() {
        let root = tempfile::tempdir().unwrap();
        let relative = Path::new("only_in_build_dir/basic.shader");
        std::fs::create_dir_all(root.path().join("only_in_build_dir")).unwrap();
        std::fs::write(root.path().join(relative), "x").unwrap();

        assert_eq!(resolve(relative, root.path()), root.path().join(relative));
    }

    #[test]
    fn shipped_shader_is_reachable() {
        let text = load_string("res/shaders/basic.shader").unwrap();
        assert!(text.contains("#shader fragment"));
    }
}
