/// Ledger row models
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the ledger
///
/// Created lazily on first interaction, never deleted. `listen_start` and
/// `listen_song_id` hold the single active listen per user; starting a new
/// listen overwrites them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub credits: i64,
    pub lifetime_points: i64,
    pub daily_points: i64,
    /// Calendar date of the last daily-counter touch, `YYYY-MM-DD`
    pub last_active: Option<String>,
    /// Epoch millis of the active listen, 0 = none
    pub listen_start: i64,
    pub listen_song_id: i64,
    /// Moderator-granted bonus submission slots
    pub extra_submits: i64,
    /// Epoch millis, 0 = not suspended
    pub suspended_until: i64,
    pub suspend_reason: Option<String>,
}

impl User {
    pub fn last_active_date(&self) -> Option<NaiveDate> {
        self.last_active
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }

    pub fn is_suspended(&self, now_ms: i64) -> bool {
        self.suspended_until > now_ms
    }
}

/// Song record in the ledger
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub user_id: String,
    pub url: String,
    pub title: Option<String>,
    pub artist_name: Option<String>,
    pub description: String,
    /// JSON array of 2 or 4 taxonomy strings
    pub tags: String,
    /// Signed score; dislikes can push it negative
    pub upvotes: i64,
    pub views: i64,
    /// Opaque reference to the posted message, set by the caller after the
    /// surrounding system posts it
    pub message_ref: Option<String>,
    /// Opaque routing/location reference
    pub channel_ref: Option<String>,
    /// Epoch millis
    pub timestamp: i64,
}

impl Song {
    /// Decode the stored tag path. Malformed rows decode to an empty list
    /// rather than failing a read path.
    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_default()
    }
}

/// Review record; the composite key enforces at most one review per user
/// per song, ever
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub user_id: String,
    pub song_id: i64,
    pub timestamp: i64,
}

/// Append-only vote ledger row. Negative amounts are audit entries only;
/// the cap sum excludes them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Vote {
    pub id: i64,
    pub song_id: i64,
    pub voter_id: String,
    pub amount: i64,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_list_decodes_json() {
        let song = Song {
            id: 1,
            user_id: "u1".to_string(),
            url: "https://youtu.be/x".to_string(),
            title: None,
            artist_name: None,
            description: "demo".to_string(),
            tags: r#"["Rock: Indie & Alt","Dream Pop"]"#.to_string(),
            upvotes: 0,
            views: 0,
            message_ref: None,
            channel_ref: None,
            timestamp: 0,
        };
        assert_eq!(song.tag_list(), vec!["Rock: Indie & Alt", "Dream Pop"]);
    }

    #[test]
    fn malformed_tags_decode_to_empty() {
        let song = Song {
            id: 1,
            user_id: "u1".to_string(),
            url: "https://youtu.be/x".to_string(),
            title: None,
            artist_name: None,
            description: String::new(),
            tags: "not json".to_string(),
            upvotes: 0,
            views: 0,
            message_ref: None,
            channel_ref: None,
            timestamp: 0,
        };
        assert!(song.tag_list().is_empty());
    }

    #[test]
    fn suspension_check_uses_now() {
        let user = User {
            id: "u1".to_string(),
            credits: 10,
            lifetime_points: 0,
            daily_points: 0,
            last_active: None,
            listen_start: 0,
            listen_song_id: 0,
            extra_submits: 0,
            suspended_until: 5_000,
            suspend_reason: Some("spam".to_string()),
        };
        assert!(user.is_suspended(4_999));
        assert!(!user.is_suspended(5_000));
    }
}
