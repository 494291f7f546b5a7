pub fn normalize_non_empty(input: Option<String>) -> Option<String> {
    input.and_then(|v| normalize_non_empty_str(&v))
}

pub fn normalize_non_empty_str(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Clamp an optional listing limit into [1, max], falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    match limit {
        Some(v) if v >= 1 => v.min(max),
        _ => default,
    }
}

pub fn normalize_email(input: &str) -> Option<String> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return None;
    }
    Some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_optional_string() {
        assert_eq!(
            normalize_non_empty(Some("  hello  ".to_string())),
            Some("hello".to_string())
        );
        assert_eq!(normalize_non_empty(Some("   ".to_string())), None);
        assert_eq!(normalize_non_empty(None), None);
    }

    #[test]
    fn clamps_limits() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
        assert_eq!(clamp_limit(Some(0), 20, 100), 20);
        assert_eq!(clamp_limit(Some(-5), 20, 100), 20);
        assert_eq!(clamp_limit(Some(50), 20, 100), 50);
        assert_eq!(clamp_limit(Some(500), 20, 100), 100);
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(
            normalize_email("  User@Example.COM "),
            Some("user@example.com".to_string())
        );
        assert_eq!(normalize_email("not-an-email"), None);
        assert_eq!(normalize_email("   "), None);
    }
}
