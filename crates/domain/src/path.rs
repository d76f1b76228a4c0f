//! Template path helpers.

/// Returns the final segment of a rendered template path.
///
/// Both `/` and `\` separate segments and trailing separators are ignored, so
/// the result does not depend on the directory the template was resolved in.
#[must_use]
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_of_absolute_path() {
        assert_eq!(basename("/srv/app/views/user.jade"), "user.jade");
    }

    #[test]
    fn test_basename_without_directory() {
        assert_eq!(basename("user.jade"), "user.jade");
    }

    #[test]
    fn test_basename_windows_separators() {
        assert_eq!(basename(r"C:\app\views\user.jade"), "user.jade");
    }

    #[test]
    fn test_basename_trailing_separator() {
        assert_eq!(basename("/srv/views/partials/"), "partials");
    }

    #[test]
    fn test_basename_empty() {
        assert_eq!(basename(""), "");
        assert_eq!(basename("/"), "");
    }
}
