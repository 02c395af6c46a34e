use std::sync::LazyLock;

use regex::Regex;

static INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_-]+").unwrap());

/// Project name for a branch deployment: `<prefix>-<branch>`, reduced to
/// the characters docker compose accepts in a project name.
///
/// `feature/Login` under prefix `shop` becomes `shop-feature-login`.
pub fn project_name(prefix: &str, branch: &str) -> String {
    let raw = format!("{prefix}-{branch}").to_lowercase();
    let cleaned = INVALID_CHARS.replace_all(&raw, "-");
    cleaned.trim_matches('-').to_string()
}
