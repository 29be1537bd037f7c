//! Host identity — the numeric user id handed to us by whatever launched
//! the client.
//!
//! The embedding host is not guaranteed to provide one; absence is a
//! recognized state, not an error, and the caller renders it as such.
//! Resolution order: explicit config override, `GENBOX_TG_ID`, then a
//! Telegram WebApp init-data string in `TG_INIT_DATA`.

use crate::config::Config;

/// Resolve the user id, if the environment provides one.
pub fn resolve(config: &Config) -> Option<i64> {
    if let Some(id) = config.identity.tg_id {
        return Some(id);
    }
    if let Ok(raw) = std::env::var("GENBOX_TG_ID") {
        if let Ok(id) = raw.trim().parse::<i64>() {
            return Some(id);
        }
    }
    if let Ok(raw) = std::env::var("TG_INIT_DATA") {
        if let Some(id) = user_id_from_init_data(&raw) {
            return Some(id);
        }
    }
    None
}

/// Extract `user.id` from a Telegram WebApp init-data query string
/// (`query_id=…&user=%7B%22id%22%3A42%2C…%7D&auth_date=…`).  The `user`
/// field is url-encoded JSON.  Anything malformed yields `None`.
pub fn user_id_from_init_data(raw: &str) -> Option<i64> {
    for pair in raw.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if key != "user" {
            continue;
        }
        let decoded = percent_decode(value)?;
        let user: serde_json::Value = serde_json::from_str(&decoded).ok()?;
        return user.get("id").and_then(|v| v.as_i64());
    }
    None
}

/// Minimal percent-decoding for the init-data `user` field.  `+` is a
/// space per the query-string convention.
fn percent_decode(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes.get(i + 1..i + 3)?;
                let hex = std::str::from_utf8(hex).ok()?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_from_init_data() {
        let raw = "query_id=AAE1&user=%7B%22id%22%3A123456789%2C%22first_name%22%3A%22Ada%22%7D&auth_date=1700000000";
        assert_eq!(user_id_from_init_data(raw), Some(123456789));
    }

    #[test]
    fn test_init_data_without_user_field() {
        assert_eq!(user_id_from_init_data("query_id=AAE1&auth_date=1"), None);
        assert_eq!(user_id_from_init_data(""), None);
    }

    #[test]
    fn test_init_data_with_non_numeric_id() {
        let raw = "user=%7B%22id%22%3A%22not-a-number%22%7D";
        assert_eq!(user_id_from_init_data(raw), None);
    }

    #[test]
    fn test_init_data_with_broken_encoding() {
        assert_eq!(user_id_from_init_data("user=%7B%2"), None);
        assert_eq!(user_id_from_init_data("user=%zz"), None);
    }

    #[test]
    fn test_config_override_wins() {
        let mut config = Config::default();
        config.identity.tg_id = Some(7);
        assert_eq!(resolve(&config), Some(7));
    }
}
