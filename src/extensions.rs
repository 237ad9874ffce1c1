//! Extension filter handling shared by the session, the CLI and the config file.

/// Extensions searched when the filter text is empty or `*`.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".config", ".conf", ".xml", ".json", ".ini", ".yaml", ".yml", ".toml", ".cfg", ".txt", ".log",
    ".md", ".csv",
];

pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

/// Turns raw filter text such as `"log, TXT"` into `[".log", ".txt"]`.
///
/// Empty text, `*`, or text with no usable tokens yields the default set.
pub fn sanitize_extensions(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() || text == "*" {
        return default_extensions();
    }

    let exts: Vec<String> = text
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            let t = t.to_lowercase();
            if t.starts_with('.') {
                t
            } else {
                format!(".{t}")
            }
        })
        .collect();

    if exts.is_empty() {
        default_extensions()
    } else {
        exts
    }
}

/// `lowered_name` must already be lowercase.
pub fn matches_extension(lowered_name: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| lowered_name.ends_with(ext.as_str()))
}
