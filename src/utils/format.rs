use chrono::{Local, LocalResult, TimeZone};

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring match for list filtering
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Display-name portion of an RFC 5322 address.
/// "Ada Lovelace <ada@example.com>" becomes "Ada Lovelace"; a bare
/// address is returned as-is.
pub fn sender_name(from: &str) -> String {
    match from.split('<').next() {
        Some(name) if !name.trim().is_empty() => name.trim().trim_matches('"').to_string(),
        _ => from.trim_start_matches('<').trim_end_matches('>').to_string(),
    }
}

/// Render a Gmail internalDate (epoch milliseconds as a string) as local
/// clock time. Unparseable input is passed through untouched.
pub fn format_message_time(internal_date: Option<&str>) -> String {
    let Some(raw) = internal_date else {
        return String::new();
    };
    let Ok(millis) = raw.parse::<i64>() else {
        return raw.to_string();
    };
    match Local.timestamp_millis_opt(millis) {
        LocalResult::Single(dt) => dt.format("%H:%M").to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Invoice #1042", "invoice"));
        assert!(contains_ignore_case("ada@example.com", "ADA"));
        assert!(!contains_ignore_case("Hello", "World"));
    }

    #[test]
    fn test_sender_name() {
        assert_eq!(sender_name("Ada Lovelace <ada@example.com>"), "Ada Lovelace");
        assert_eq!(sender_name("\"Lovelace, Ada\" <ada@example.com>"), "Lovelace, Ada");
        assert_eq!(sender_name("<ada@example.com>"), "ada@example.com");
        assert_eq!(sender_name("ada@example.com"), "ada@example.com");
    }

    #[test]
    fn test_format_message_time() {
        // A valid timestamp renders as HH:MM in the local zone
        let rendered = format_message_time(Some("1700000000000"));
        assert_eq!(rendered.len(), 5);
        assert!(rendered.contains(':'));

        // Garbage passes through, absence renders empty
        assert_eq!(format_message_time(Some("yesterday")), "yesterday");
        assert_eq!(format_message_time(None), "");
    }
}
