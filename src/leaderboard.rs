/// Read-only ranking queries over the ledger
use crate::db::models::Song;
use crate::error::CoreResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const TOP_N: i64 = 10;

/// One critic row: lifetime points globally, review count when windowed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticEntry {
    pub user_id: String,
    pub score: i64,
}

/// One track row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackEntry {
    pub song_id: i64,
    pub url: String,
    pub artist_name: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub score: i64,
}

/// The dual leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboards {
    pub critics: Vec<CriticEntry>,
    pub tracks: Vec<TrackEntry>,
}

/// Leaderboard aggregator service
pub struct LeaderboardManager {
    db: SqlitePool,
}

impl LeaderboardManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Top critics and tracks; `window_days = None` means all time
    pub async fn rankings(&self, window_days: Option<u32>) -> CoreResult<Leaderboards> {
        self.rankings_at(window_days, Utc::now().timestamp_millis())
            .await
    }

    /// Clock-explicit variant of [`rankings`](Self::rankings)
    pub async fn rankings_at(
        &self,
        window_days: Option<u32>,
        now_ms: i64,
    ) -> CoreResult<Leaderboards> {
        let critics = match window_days {
            None => {
                let rows = sqlx::query(
                    "SELECT id, lifetime_points FROM users ORDER BY lifetime_points DESC LIMIT ?1",
                )
                .bind(TOP_N)
                .fetch_all(&self.db)
                .await?;
                rows.iter()
                    .map(|row| CriticEntry {
                        user_id: row.get("id"),
                        score: row.get("lifetime_points"),
                    })
                    .collect()
            }
            Some(days) => {
                // No per-event point log, but reviews are timestamped:
                // windowed critic rank is review count in the window.
                let since = now_ms - (days as i64) * DAY_MS;
                let rows = sqlx::query(
                    r#"
                    SELECT user_id, COUNT(*) AS reviews
                    FROM reviews WHERE timestamp > ?1
                    GROUP BY user_id ORDER BY reviews DESC LIMIT ?2
                    "#,
                )
                .bind(since)
                .bind(TOP_N)
                .fetch_all(&self.db)
                .await?;
                rows.iter()
                    .map(|row| CriticEntry {
                        user_id: row.get("user_id"),
                        score: row.get("reviews"),
                    })
                    .collect()
            }
        };

        let since = window_days
            .map(|days| now_ms - (days as i64) * DAY_MS)
            .unwrap_or(i64::MIN);
        let songs = sqlx::query_as::<_, Song>(
            "SELECT * FROM songs WHERE timestamp > ?1 ORDER BY upvotes DESC LIMIT ?2",
        )
        .bind(since)
        .bind(TOP_N)
        .fetch_all(&self.db)
        .await?;

        Ok(Leaderboards {
            critics,
            tracks: songs.iter().map(track_entry).collect(),
        })
    }

    /// Top tracks whose tag path contains the given genre or style
    pub async fn top_by_genre(&self, tag: &str) -> CoreResult<Vec<TrackEntry>> {
        let pattern = format!("%{}%", tag);
        let songs = sqlx::query_as::<_, Song>(
            "SELECT * FROM songs WHERE tags LIKE ?1 ORDER BY upvotes DESC LIMIT ?2",
        )
        .bind(pattern)
        .bind(TOP_N)
        .fetch_all(&self.db)
        .await?;
        Ok(songs.iter().map(track_entry).collect())
    }
}

fn track_entry(song: &Song) -> TrackEntry {
    TrackEntry {
        song_id: song.id,
        url: song.url.clone(),
        artist_name: song.artist_name.clone(),
        description: song.description.clone(),
        tags: song.tag_list(),
        score: song.upvotes,
    }
}
