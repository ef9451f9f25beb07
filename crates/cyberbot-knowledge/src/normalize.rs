//! Text normalization used for both stored questions and incoming queries.

/// Lowercase, drop punctuation and collapse whitespace.
///
/// Word characters (alphanumerics and `_`) and whitespace survive; every
/// other character is removed outright, so `"don't"` becomes `"dont"`.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_punctuation() {
        assert_eq!(normalize("What is Phishing??"), "what is phishing");
        assert_eq!(normalize("Don't click!"), "dont click");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize("  two\t\tfactor \n auth  "), "two factor auth");
    }

    #[test]
    fn test_underscore_and_unicode_kept() {
        assert_eq!(normalize("snake_case Café"), "snake_case café");
    }

    #[test]
    fn test_only_punctuation_is_empty() {
        assert_eq!(normalize("?!..."), "");
    }
}
