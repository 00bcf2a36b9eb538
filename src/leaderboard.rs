//! Top-five leaderboard
//!
//! Persisted as a JSON array of `{initials, score}` under
//! [`LEADERBOARD_KEY`], with the best score mirrored under
//! [`HIGH_SCORE_KEY`]. Anything unreadable falls back to the house scores.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::persistence::{self, HIGH_SCORE_KEY, LEADERBOARD_KEY, ScoreStore};

/// Maximum number of entries kept
pub const MAX_ENTRIES: usize = 5;
/// Shown when no initials were entered
pub const ANONYMOUS: &str = "???";

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub initials: String,
    pub score: u64,
}

impl LeaderboardEntry {
    pub fn new(initials: &str, score: u64) -> Self {
        Self {
            initials: initials.to_string(),
            score,
        }
    }
}

/// Uppercase, alphanumeric only, at most three characters; `???` if nothing
/// is left
pub fn sanitize_initials(raw: &str) -> String {
    let initials: String = raw
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .take(3)
        .collect();
    if initials.is_empty() {
        ANONYMOUS.to_string()
    } else {
        initials
    }
}

/// Stored high score; anything missing or malformed reads as 0
pub fn parse_high_score(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .map_or(0, |v| v.round() as u64)
}

fn score_of(value: Option<&Value>) -> u64 {
    let score = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if score.is_finite() && score > 0.0 {
        score.round() as u64
    } else {
        0
    }
}

/// Leaderboard, sorted best first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// House scores used when nothing valid is stored
    pub fn fallback() -> Self {
        Self {
            entries: vec![
                LeaderboardEntry::new("SNO", 125_000),
                LeaderboardEntry::new("PLO", 95_000),
                LeaderboardEntry::new("ICE", 80_000),
                LeaderboardEntry::new("BRR", 55_000),
                LeaderboardEntry::new("DIG", 32_000),
            ],
        }
    }

    /// Parse stored JSON.
    ///
    /// Missing, invalid, non-array or empty input gives the fallback board.
    /// Otherwise entries are cleaned up: initials sanitized, non-numeric or
    /// non-positive scores dropped, re-sorted and trimmed to five.
    pub fn parse(raw: Option<&str>) -> Self {
        let parsed = serde_json::from_str::<Value>(raw.unwrap_or("[]"));
        let items = match parsed {
            Ok(Value::Array(items)) if !items.is_empty() => items,
            _ => return Self::fallback(),
        };

        let mut entries: Vec<LeaderboardEntry> = items
            .iter()
            .map(|item| LeaderboardEntry {
                initials: sanitize_initials(
                    item.get("initials").and_then(Value::as_str).unwrap_or(""),
                ),
                score: score_of(item.get("score")),
            })
            .filter(|e| e.score > 0)
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_ENTRIES);
        Self { entries }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Index a new score lands at: after every entry at least as high
    fn slot(&self, score: u64) -> usize {
        self.entries.partition_point(|e| e.score >= score)
    }

    /// Rank (1-based) `score` would take, shown while initials are entered
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        self.qualifies(score).then(|| self.slot(score) + 1)
    }

    /// Insert a score below any equal ones and trim to five.
    ///
    /// Returns the rank achieved (1-indexed), or None if it fell off the end.
    pub fn submit(&mut self, initials: &str, score: u64) -> Option<usize> {
        let pos = self.slot(score);
        let entry = LeaderboardEntry::new(&sanitize_initials(initials), score);
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_ENTRIES);
        (pos < MAX_ENTRIES).then_some(pos + 1)
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Read the board and the best score from storage
    pub fn load(store: &dyn ScoreStore) -> (Self, u64) {
        let board = Self::parse(persistence::read_or_warn(store, LEADERBOARD_KEY).as_deref());
        let high_score = board
            .top_score()
            .filter(|s| *s > 0)
            .unwrap_or_else(|| {
                parse_high_score(persistence::read_or_warn(store, HIGH_SCORE_KEY).as_deref())
            });
        log::info!(
            "Loaded {} leaderboard entries, high score {}",
            board.entries.len(),
            high_score
        );
        (board, high_score)
    }

    /// Write the board and the best score; failures are logged
    pub fn save(&self, store: &mut dyn ScoreStore, high_score: u64) {
        if let Err(e) = persistence::write_json(store, LEADERBOARD_KEY, self) {
            log::warn!("Could not save leaderboard: {}", e);
        }
        persistence::write_or_warn(store, HIGH_SCORE_KEY, &high_score.to_string());
        log::info!("Leaderboard saved ({} entries)", self.entries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    fn scores(board: &Leaderboard) -> Vec<u64> {
        board.entries().iter().map(|e| e.score).collect()
    }

    #[test]
    fn test_sanitize_initials() {
        assert_eq!(sanitize_initials("ab-c9"), "ABC");
        assert_eq!(sanitize_initials("z9"), "Z9");
        assert_eq!(sanitize_initials("  "), "???");
        assert_eq!(sanitize_initials("éé"), "???");
    }

    #[test]
    fn test_parse_degrades_to_fallback() {
        assert_eq!(Leaderboard::parse(None), Leaderboard::fallback());
        assert_eq!(Leaderboard::parse(Some("not json")), Leaderboard::fallback());
        assert_eq!(Leaderboard::parse(Some("{\"a\":1}")), Leaderboard::fallback());
        assert_eq!(Leaderboard::parse(Some("[]")), Leaderboard::fallback());
    }

    #[test]
    fn test_parse_cleans_entries() {
        let raw = r#"[
            {"initials": "ab", "score": 500},
            {"initials": "", "score": "9000"},
            {"initials": "xyz", "score": "lots"},
            {"score": 1200.6},
            {"initials": "neg", "score": -5}
        ]"#;
        let board = Leaderboard::parse(Some(raw));
        assert_eq!(
            board.entries(),
            &[
                LeaderboardEntry::new("???", 9000),
                LeaderboardEntry::new("???", 1201),
                LeaderboardEntry::new("AB", 500),
            ]
        );
    }

    #[test]
    fn test_qualifies_and_rank() {
        let board = Leaderboard::fallback();
        assert!(!board.qualifies(0));
        assert!(!board.qualifies(32_000));
        assert!(board.qualifies(32_001));
        assert_eq!(board.potential_rank(100_000), Some(2));
        assert_eq!(board.potential_rank(10), None);
        // Ties rank below the existing entry, as submit files them
        assert_eq!(board.potential_rank(95_000), Some(3));
        assert!(Leaderboard::new().qualifies(1));
    }

    #[test]
    fn test_submit_inserts_and_trims() {
        let mut board = Leaderboard::fallback();
        assert_eq!(board.submit("zed", 95_000), Some(3));
        assert_eq!(board.entries().len(), MAX_ENTRIES);
        assert_eq!(board.entries()[2], LeaderboardEntry::new("ZED", 95_000));
        assert_eq!(scores(&board), vec![125_000, 95_000, 95_000, 80_000, 55_000]);

        assert_eq!(board.submit("", 1), None);
        assert_eq!(board.entries().len(), MAX_ENTRIES);
    }

    #[test]
    fn test_load_prefers_board_top() {
        let store = MemoryStore::with_values([(HIGH_SCORE_KEY, "42")]);
        let (board, high) = Leaderboard::load(&store);
        assert_eq!(board, Leaderboard::fallback());
        assert_eq!(high, 125_000);

        let store = MemoryStore::with_values([
            (LEADERBOARD_KEY, r#"[{"initials":"x","score":0}]"#),
            (HIGH_SCORE_KEY, "oops"),
        ]);
        let (board, high) = Leaderboard::load(&store);
        assert!(board.is_empty());
        assert_eq!(high, 0);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let mut board = Leaderboard::new();
        board.submit("amy", 7000);
        board.save(&mut store, 7000);

        let (loaded, high) = Leaderboard::load(&store);
        assert_eq!(loaded, board);
        assert_eq!(high, 7000);
    }

    #[test]
    fn test_parse_high_score() {
        assert_eq!(parse_high_score(None), 0);
        assert_eq!(parse_high_score(Some("")), 0);
        assert_eq!(parse_high_score(Some("abc")), 0);
        assert_eq!(parse_high_score(Some(" 1500 ")), 1500);
    }

    proptest! {
        #[test]
        fn prop_parse_is_sorted_and_bounded(
            entries in prop::collection::vec(("[a-z?]{0,5}", -1000i64..200_000), 0..12)
        ) {
            let json = serde_json::to_string(
                &entries
                    .iter()
                    .map(|(i, s)| serde_json::json!({"initials": i, "score": s}))
                    .collect::<Vec<_>>(),
            )
            .unwrap();
            let board = Leaderboard::parse(Some(&json));
            prop_assert!(board.entries().len() <= MAX_ENTRIES);
            prop_assert!(board.entries().windows(2).all(|w| w[0].score >= w[1].score));
            prop_assert!(board.entries().iter().all(|e| e.score > 0 && e.initials.len() <= 3));
        }
    }
}
