//! URL path canonicalization.
//!
//! Reduces an absolute URL or a bare path to the form used for all
//! redirect comparisons: no scheme, no authority, always starting with `/`.
//!
//! ```
//! use redirection_core::canonical::canonicalize;
//!
//! assert_eq!(canonicalize("https://example.com/a?x=1"), "/a?x=1");
//! assert_eq!(canonicalize("blog/post"), "/blog/post");
//! ```

use url::Url;

/// Canonicalize a raw redirect endpoint.
///
/// Inputs starting with `http` that parse as URLs lose their scheme, host,
/// port and credentials. Path, query and fragment are kept exactly as
/// written: no dot-segment resolution, no percent-encoding. Inputs that
/// fail to parse are treated as opaque paths. Either way the result is
/// forced to start with `/`.
pub fn canonicalize(raw: &str) -> String {
    let relative = if raw.starts_with("http") && Url::parse(raw).is_ok() {
        strip_authority(raw)
    } else {
        raw
    };

    if relative.starts_with('/') {
        relative.to_string()
    } else {
        format!("/{}", relative)
    }
}

/// Slice the path, query and fragment out of a URL that already parsed.
///
/// `http:foo` has no authority, so its path is `foo`.
fn strip_authority(raw: &str) -> &str {
    let Some((_scheme, rest)) = raw.split_once(':') else {
        return raw;
    };
    match rest.strip_prefix("//") {
        Some(authority_and_rest) => {
            let end = authority_and_rest
                .find(['/', '?', '#'])
                .unwrap_or(authority_and_rest.len());
            &authority_and_rest[end..]
        }
        None => rest,
    }
}

/// Remove every trailing `/`. `"/"` becomes `""`.
pub fn trim_trailing_slashes(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// The same path with its trailing slash added or removed.
///
/// Returns `None` for paths whose toggled form would be empty.
pub fn toggle_trailing_slash(path: &str) -> Option<String> {
    if let Some(stripped) = path.strip_suffix('/') {
        if stripped.is_empty() {
            None
        } else {
            Some(stripped.to_string())
        }
    } else if path.is_empty() {
        None
    } else {
        Some(format!("{}/", path))
    }
}
