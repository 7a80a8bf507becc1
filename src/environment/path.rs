//! Merging of `Path`-like values.

/// The separator of entries in the Windows `Path` value.
pub(crate) const PATH_SEPARATOR: char = ';';

/// Appends the given entry to the given `Path` value.
///
/// Returns `None` if the value already contains the entry (as substring), so repeated runs never introduce duplicates.
pub(crate) fn append_path_entry(current: &str, entry: &str) -> Option<String> {
    if current.contains(entry) {
        return None;
    }

    let current = current.trim_end_matches(PATH_SEPARATOR);
    if current.is_empty() {
        return Some(entry.to_string());
    }

    Some(format!("{current}{PATH_SEPARATOR}{entry}"))
}
