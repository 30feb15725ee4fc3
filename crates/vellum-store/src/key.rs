//! Artifact key cleaning.
//!
//! Keys are cleaned lexically, as if rooted, before they are combined with a
//! storage root:
//! - `/` and `\` are both separators; empty and `.` segments are dropped
//! - `..` pops the previous segment and never climbs above the root
//! - the cleaned key must be exactly one segment (the namespace is flat)
//! - NUL bytes and the reserved staging directory name are rejected
//!
//! A cleaned key is always a single normal path component, so joining it
//! onto a root cannot resolve outside that root.

use crate::error::{StoreError, StoreResult};

/// Name of the directory under the storage root holding in-flight writes.
pub const STAGING_DIR: &str = ".staging";

const SEPARATORS: &[char] = &['/', '\\'];

/// Clean a caller-supplied key into the name it is stored under.
///
/// # Examples
///
/// ```
/// use vellum_store::clean_key;
///
/// assert_eq!(clean_key("v1.2.0").unwrap(), "v1.2.0");
/// assert_eq!(clean_key("./v1.2.0").unwrap(), "v1.2.0");
/// assert_eq!(clean_key("../v1.2.0").unwrap(), "v1.2.0");
/// assert!(clean_key("../../etc/passwd").is_err());
/// assert!(clean_key("..").is_err());
/// ```
pub fn clean_key(key: &str) -> StoreResult<String> {
    if key.contains('\0') {
        return Err(invalid(key, "contains a NUL byte"));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in key.split(SEPARATORS) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    match segments.as_slice() {
        [] => Err(invalid(key, "key is empty after cleaning")),
        [name] if *name == STAGING_DIR => Err(invalid(key, "name is reserved")),
        [name] => Ok((*name).to_string()),
        _ => Err(invalid(
            key,
            &format!("nested path {:?} is not allowed", segments.join("/")),
        )),
    }
}

fn invalid(key: &str, reason: &str) -> StoreError {
    StoreError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::{Component, Path};

    #[test]
    fn plain_keys_pass_through() {
        assert_eq!(clean_key("v1.2.0").unwrap(), "v1.2.0");
        assert_eq!(clean_key("release-notes.txt").unwrap(), "release-notes.txt");
        assert_eq!(clean_key(".hidden").unwrap(), ".hidden");
        assert_eq!(clean_key("...").unwrap(), "...");
    }

    #[test]
    fn dot_segments_collapse() {
        assert_eq!(clean_key("./a").unwrap(), "a");
        assert_eq!(clean_key("a/.").unwrap(), "a");
        assert_eq!(clean_key("//a//").unwrap(), "a");
        assert_eq!(clean_key("a/b/..").unwrap(), "a");
    }

    #[test]
    fn parent_segments_stop_at_root() {
        assert_eq!(clean_key("../a").unwrap(), "a");
        assert_eq!(clean_key("../../../a").unwrap(), "a");
        assert_eq!(clean_key("/../a").unwrap(), "a");
        assert_eq!(clean_key("..\\..\\a").unwrap(), "a");
    }

    #[test]
    fn empty_results_rejected() {
        for key in ["", ".", "..", "/", "./..", "a/.."] {
            let err = clean_key(key).unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey { .. }), "{key:?}");
        }
    }

    #[test]
    fn nested_paths_rejected() {
        assert!(clean_key("../../etc/passwd").is_err());
        assert!(clean_key("a/b").is_err());
        assert!(clean_key("a\\b").is_err());
    }

    #[test]
    fn staging_name_reserved() {
        assert!(clean_key(STAGING_DIR).is_err());
        assert!(clean_key("../.staging").is_err());
    }

    #[test]
    fn nul_rejected() {
        assert!(clean_key("a\0b").is_err());
    }

    proptest! {
        #[test]
        fn cleaned_key_is_single_normal_component(key in ".{0,40}") {
            if let Ok(name) = clean_key(&key) {
                prop_assert!(!name.is_empty());
                prop_assert!(!name.contains(SEPARATORS));
                let components: Vec<_> = Path::new(&name).components().collect();
                prop_assert_eq!(components.len(), 1);
                prop_assert!(matches!(components[0], Component::Normal(_)));
            }
        }

        #[test]
        fn cleaning_is_idempotent(key in "[a-z./\\\\]{0,24}") {
            if let Ok(name) = clean_key(&key) {
                prop_assert_eq!(clean_key(&name).unwrap(), name);
            }
        }
    }
}
