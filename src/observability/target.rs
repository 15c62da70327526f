//! Diagnostics target resolution.

/// Decide where diagnostics go.
///
/// With remote logging disabled the local file path wins whatever the URL
/// holds. With it enabled the URL is returned verbatim, empty or not; a bad
/// URL only shows up when the client first posts to it.
pub fn resolve_logging_target<'a>(
    remote_enabled: bool,
    remote_url: &'a str,
    local_path: &'a str,
) -> &'a str {
    if remote_enabled {
        remote_url
    } else {
        local_path
    }
}
