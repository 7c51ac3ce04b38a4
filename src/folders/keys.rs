//! Prefix and key canonicalization.
//!
//! Every prefix-typed input goes through [`normalize`] before it reaches the
//! store; the marker filter in listing compares against the normalized form.

/// `""` stays the bucket root; anything else gets exactly one trailing `/`
/// if it lacks one.
pub fn normalize(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{}/", prefix)
    }
}

pub fn strip_leading_slash(key: &str) -> &str {
    key.trim_start_matches('/')
}

/// Move `key` from under `old_prefix` to under `new_prefix`, keeping the
/// relative path. `key` must start with `old_prefix`.
pub fn remap_key(key: &str, old_prefix: &str, new_prefix: &str) -> String {
    debug_assert!(key.starts_with(old_prefix));
    format!("{}{}", new_prefix, &key[old_prefix.len()..])
}
