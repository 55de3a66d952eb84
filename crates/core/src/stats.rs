//! Study statistics, streaks and achievements.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Cards reviewed in one session needed for the session achievement.
pub const SESSION_CARDS_GOAL: u32 = 10;
/// Consecutive study days needed for the streak achievement.
pub const STREAK_GOAL: u32 = 7;

//
// ─── ACHIEVEMENTS ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    FirstDeck,
    StudyStreak,
    MasteryLevel,
    StudySession,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 4] = [
        AchievementKind::FirstDeck,
        AchievementKind::StudyStreak,
        AchievementKind::MasteryLevel,
        AchievementKind::StudySession,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::FirstDeck => "Deck Creator",
            Self::StudyStreak => "Consistent Learner",
            Self::MasteryLevel => "Master Mind",
            Self::StudySession => "Study Session",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::FirstDeck => "Create your first deck",
            Self::StudyStreak => "Study for 7 days in a row",
            Self::MasteryLevel => "Achieve 100% mastery in a deck",
            Self::StudySession => "Review 10 cards in a session",
        }
    }

    #[must_use]
    pub fn points(self) -> u32 {
        match self {
            Self::FirstDeck => 10,
            Self::StudyStreak => 50,
            Self::MasteryLevel => 100,
            Self::StudySession => 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub kind: AchievementKind,
    #[serde(default)]
    pub earned: bool,
    #[serde(default)]
    pub earned_at: Option<DateTime<Utc>>,
}

impl Achievement {
    #[must_use]
    pub fn locked(kind: AchievementKind) -> Self {
        Self {
            kind,
            earned: false,
            earned_at: None,
        }
    }
}

fn full_catalog() -> Vec<Achievement> {
    AchievementKind::ALL.iter().copied().map(Achievement::locked).collect()
}

//
// ─── SESSIONS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySessionRecord {
    pub date: DateTime<Utc>,
    pub duration_secs: u64,
    pub cards_reviewed: u32,
}

//
// ─── STATISTICS ────────────────────────────────────────────────────────────────
//

/// Persisted study statistics.
///
/// Streaks count UTC calendar days. Missing fields in stored data fall back
/// to their zero values, and the achievement list is completed on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    pub total_study_time_secs: u64,
    pub cards_mastered: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_study_date: Option<NaiveDate>,
    pub study_history: Vec<StudySessionRecord>,
    pub achievements: Vec<Achievement>,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            total_study_time_secs: 0,
            cards_mastered: 0,
            current_streak: 0,
            longest_streak: 0,
            last_study_date: None,
            study_history: Vec::new(),
            achievements: full_catalog(),
        }
    }
}

impl Statistics {
    /// Adds any catalog entries missing from stored data and drops duplicates.
    pub fn normalize(&mut self) {
        let mut seen = Vec::with_capacity(AchievementKind::ALL.len());
        self.achievements.retain(|a| {
            if seen.contains(&a.kind) {
                false
            } else {
                seen.push(a.kind);
                true
            }
        });
        for kind in AchievementKind::ALL {
            if !seen.contains(&kind) {
                self.achievements.push(Achievement::locked(kind));
            }
        }
    }

    #[must_use]
    pub fn achievement(&self, kind: AchievementKind) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.kind == kind)
    }

    #[must_use]
    pub fn has_earned(&self, kind: AchievementKind) -> bool {
        self.achievement(kind).is_some_and(|a| a.earned)
    }

    /// Awards an achievement. Returns true only the first time.
    pub fn earn(&mut self, kind: AchievementKind, now: DateTime<Utc>) -> bool {
        if let Some(existing) = self.achievements.iter_mut().find(|a| a.kind == kind) {
            if existing.earned {
                return false;
            }
            existing.earned = true;
            existing.earned_at = Some(now);
        } else {
            self.achievements.push(Achievement {
                kind,
                earned: true,
                earned_at: Some(now),
            });
        }
        true
    }

    /// Sum of points over earned achievements.
    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.achievements
            .iter()
            .filter(|a| a.earned)
            .map(|a| a.kind.points())
            .sum()
    }

    pub fn record_card_mastered(&mut self) {
        self.cards_mastered = self.cards_mastered.saturating_add(1);
    }

    /// Counts `now`'s day toward the streak.
    ///
    /// Studying twice on the same day changes nothing; studying the day after
    /// the last study day extends the streak; any longer gap restarts it.
    /// Returns achievements newly earned as a result.
    pub fn update_streak(&mut self, now: DateTime<Utc>) -> Vec<AchievementKind> {
        let today = now.date_naive();
        if self.last_study_date == Some(today) {
            return Vec::new();
        }

        let yesterday = today.checked_sub_days(Days::new(1));
        if self.last_study_date.is_some() && self.last_study_date == yesterday {
            self.current_streak = self.current_streak.saturating_add(1);
        } else {
            self.current_streak = 1;
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_study_date = Some(today);

        self.check_achievements(now)
    }

    /// Records a finished session and counts it toward the streak.
    pub fn add_study_session(
        &mut self,
        duration_secs: u64,
        cards_reviewed: u32,
        now: DateTime<Utc>,
    ) -> Vec<AchievementKind> {
        self.total_study_time_secs = self.total_study_time_secs.saturating_add(duration_secs);
        self.study_history.push(StudySessionRecord {
            date: now,
            duration_secs,
            cards_reviewed,
        });

        let mut earned = self.update_streak(now);
        for kind in self.check_achievements(now) {
            if !earned.contains(&kind) {
                earned.push(kind);
            }
        }
        earned
    }

    /// Evaluates streak and session achievements against current state.
    ///
    /// An empty session history simply does not qualify.
    pub fn check_achievements(&mut self, now: DateTime<Utc>) -> Vec<AchievementKind> {
        let mut earned = Vec::new();

        if self.current_streak >= STREAK_GOAL && self.earn(AchievementKind::StudyStreak, now) {
            earned.push(AchievementKind::StudyStreak);
        }

        let last_session_qualifies = self
            .study_history
            .last()
            .is_some_and(|s| s.cards_reviewed >= SESSION_CARDS_GOAL);
        if last_session_qualifies && self.earn(AchievementKind::StudySession, now) {
            earned.push(AchievementKind::StudySession);
        }

        earned
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
