//! language.rs
//! Language tag for the rendering surface, guessed from a file extension.

use std::path::Path;

pub fn guess_language(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "py" => "python",
        "js" => "javascript",
        "ts" => "typescript",
        "java" => "java",
        "cpp" => "cpp",
        "c" => "c",
        "h" => "c-header",
        "html" => "html",
        "css" => "css",
        "sh" => "shell",
        "rb" => "ruby",
        "php" => "php",
        "rs" => "rust",
        "go" => "go",
        "swift" => "swift",
        "json" => "json",
        "yml" | "yaml" => "yaml",
        "csh" => "csh",
        "bash" => "bash",
        "zsh" => "zsh",
        "fish" => "fish",
        _ => "unknown",
    }
}
