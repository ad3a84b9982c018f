/// Default path component marking the test subtree
pub const DEFAULT_CATEGORY_MARKER: &str = "rostests";

/// Default category attached to revisions touching the test subtree
pub const DEFAULT_CATEGORY: &str = "rostests";

/// Returns `category` if any path has a component equal to `marker`.
///
/// Paths are split on `/` and compared component by component, so
/// `base/rostests_helper/x.c` does not match `rostests`.
pub fn categorize<'a, S: AsRef<str>>(
    files: &[S],
    marker: &str,
    category: &'a str,
) -> Option<&'a str> {
    let touches_marker = files
        .iter()
        .any(|path| path.as_ref().split('/').any(|component| component == marker));

    touches_marker.then_some(category)
}
