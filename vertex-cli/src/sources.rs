use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File extension of Vertex sources.
pub const SOURCE_EXTENSION: &str = "vx";

/// All Vertex sources below `root`, sorted so batch output is stable.
pub fn find_sources(root: impl AsRef<Path>) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root.as_ref()) {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
        {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// `<stem>_gen.py`, the name generated files get by default.
pub fn generated_file_name(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    PathBuf::from(format!("{stem}_gen.py"))
}
