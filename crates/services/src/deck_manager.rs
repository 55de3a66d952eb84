use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use storage::repository::Storage;
use study_core::Clock;
use study_core::interchange::{self, ImportedDeck};
use study_core::mastery::{self, Rating};
use study_core::model::{Card, Confidence, Deck, DeckId};
use study_core::planner::{self, Recommendation, SessionPlan};
use study_core::search::{self, SearchHit};
use study_core::stats::{AchievementKind, Statistics};
use study_core::timer::StudyTimer;

use crate::error::DeckManagerError;

/// Deck mastery that counts as fully mastered for the achievement.
const FULL_MASTERY: f64 = 1.0 - 1e-9;

//
// ─── SESSION TYPES ─────────────────────────────────────────────────────────────
//

/// Position of the study cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    deck_id: DeckId,
    card: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveSession {
    deck_id: DeckId,
    started_at: DateTime<Utc>,
}

/// Returned when a study session begins.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStart {
    pub deck_id: DeckId,
    pub session_secs: u32,
    /// Running timer sized to the deck; the caller drives its ticks.
    pub timer: StudyTimer,
    pub earned: Vec<AchievementKind>,
}

/// Returned when a study session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub deck_id: DeckId,
    pub duration_secs: u64,
    pub cards_reviewed: u32,
    pub deck_mastery: f64,
    pub earned: Vec<AchievementKind>,
}

/// Outcome of rating a card plus the review advice for its new mastery.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedCard {
    pub rating: Rating,
    pub recommendation: Recommendation,
}

//
// ─── DECK MANAGER ──────────────────────────────────────────────────────────────
//

/// Single owner of the deck collection, statistics and study cursor.
///
/// Every mutation is written back through `Storage` before returning.
pub struct DeckManager {
    clock: Clock,
    storage: Storage,
    decks: Vec<Deck>,
    stats: Statistics,
    cursor: Option<Cursor>,
    session: Option<ActiveSession>,
}

impl DeckManager {
    /// Load decks and statistics from storage.
    ///
    /// # Errors
    ///
    /// Returns `DeckManagerError::Storage` if the stored collection cannot be read.
    pub async fn load(clock: Clock, storage: Storage) -> Result<Self, DeckManagerError> {
        let mut decks = storage.load_decks().await?;
        for deck in &mut decks {
            deck.recompute_mastery();
        }
        let stats = storage.load_stats().await?;
        info!(decks = decks.len(), "deck collection loaded");

        Ok(Self {
            clock,
            storage,
            decks,
            stats,
            cursor: None,
            session: None,
        })
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    #[must_use]
    pub fn deck(&self, id: DeckId) -> Option<&Deck> {
        self.decks.iter().find(|d| d.id() == id)
    }

    #[must_use]
    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    fn deck_index(&self, id: DeckId) -> Result<usize, DeckManagerError> {
        self.decks
            .iter()
            .position(|d| d.id() == id)
            .ok_or(DeckManagerError::DeckNotFound(id))
    }

    fn next_deck_id(&self, now: DateTime<Utc>) -> DeckId {
        let mut id = DeckId::from_timestamp(now);
        while self.decks.iter().any(|d| d.id() == id) {
            id = id.next();
        }
        id
    }

    async fn persist_decks(&self) -> Result<(), DeckManagerError> {
        self.storage.save_decks(&self.decks).await?;
        Ok(())
    }

    async fn persist_all(&self) -> Result<(), DeckManagerError> {
        self.storage.save_decks(&self.decks).await?;
        self.storage.save_stats(&self.stats).await?;
        Ok(())
    }

    // ─── Deck CRUD ─────────────────────────────────────────────────────────────

    /// Create a deck and persist it. The very first deck earns `FirstDeck`.
    ///
    /// # Errors
    ///
    /// Returns `DeckManagerError::Deck` for an invalid name, or a storage error.
    pub async fn create_deck(
        &mut self,
        name: impl Into<String>,
        cards: Vec<Card>,
    ) -> Result<DeckId, DeckManagerError> {
        let now = self.clock.now();
        let deck = Deck::new(self.next_deck_id(now), name, cards, now)?;
        let id = self.insert_deck(deck, now);
        self.persist_all().await?;
        Ok(id)
    }

    fn insert_deck(&mut self, deck: Deck, now: DateTime<Utc>) -> DeckId {
        let id = deck.id();
        info!(deck_id = %id, name = deck.name(), cards = deck.len(), "deck created");
        self.decks.push(deck);
        if self.decks.len() == 1 {
            self.stats.earn(AchievementKind::FirstDeck, now);
        }
        id
    }

    /// Remove a deck. Returns false if no such deck existed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persistence fails.
    pub async fn delete_deck(&mut self, id: DeckId) -> Result<bool, DeckManagerError> {
        let before = self.decks.len();
        self.decks.retain(|d| d.id() != id);
        if self.decks.len() == before {
            return Ok(false);
        }
        if self.cursor.is_some_and(|c| c.deck_id == id) {
            self.cursor = None;
        }
        if self.session.is_some_and(|s| s.deck_id == id) {
            self.session = None;
        }
        self.persist_decks().await?;
        info!(deck_id = %id, "deck deleted");
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns `DeckNotFound`, a name validation error, or a storage error.
    pub async fn rename_deck(
        &mut self,
        id: DeckId,
        name: impl Into<String>,
    ) -> Result<(), DeckManagerError> {
        let index = self.deck_index(id)?;
        self.decks[index].rename(name)?;
        self.persist_decks().await
    }

    /// Append a card and return its index.
    ///
    /// # Errors
    ///
    /// Returns `DeckNotFound`, a card validation error, or a storage error.
    pub async fn add_card(
        &mut self,
        id: DeckId,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<usize, DeckManagerError> {
        let index = self.deck_index(id)?;
        let card = Card::new(question, answer)?;
        self.decks[index].add_card(card);
        self.persist_decks().await?;
        Ok(self.decks[index].len() - 1)
    }

    /// # Errors
    ///
    /// Returns `DeckNotFound`, `CardOutOfRange`, or a storage error.
    pub async fn remove_card(&mut self, id: DeckId, card: usize) -> Result<Card, DeckManagerError> {
        let index = self.deck_index(id)?;
        let removed = self.decks[index].remove_card(card)?;
        if let Some(cursor) = self.cursor.as_mut().filter(|c| c.deck_id == id) {
            let len = self.decks[index].len();
            cursor.card = cursor.card.min(len.saturating_sub(1));
        }
        self.persist_decks().await?;
        Ok(removed)
    }

    // ─── Navigation ────────────────────────────────────────────────────────────

    /// Make `id` the current deck, positioned at its first card.
    ///
    /// # Errors
    ///
    /// Returns `DeckNotFound` if the deck does not exist.
    pub fn select_deck(&mut self, id: DeckId) -> Result<&Deck, DeckManagerError> {
        let index = self.deck_index(id)?;
        self.cursor = Some(Cursor {
            deck_id: id,
            card: 0,
        });
        Ok(&self.decks[index])
    }

    #[must_use]
    pub fn current_deck(&self) -> Option<&Deck> {
        self.cursor.and_then(|c| self.deck(c.deck_id))
    }

    #[must_use]
    pub fn current_card_index(&self) -> Option<usize> {
        self.cursor.map(|c| c.card)
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Card> {
        let cursor = self.cursor?;
        self.deck(cursor.deck_id)?.card(cursor.card)
    }

    /// Advance to the next card; false at the end of the deck.
    pub fn next_card(&mut self) -> bool {
        let Some(len) = self.current_deck().map(Deck::len) else {
            return false;
        };
        match self.cursor.as_mut() {
            Some(cursor) if cursor.card + 1 < len => {
                cursor.card += 1;
                true
            }
            _ => false,
        }
    }

    /// Step back to the previous card; false at the start of the deck.
    pub fn previous_card(&mut self) -> bool {
        match self.cursor.as_mut() {
            Some(cursor) if cursor.card > 0 => {
                cursor.card -= 1;
                true
            }
            _ => false,
        }
    }

    /// Shuffle the current deck in place and return to its first card.
    ///
    /// # Errors
    ///
    /// Returns `NoDeckSelected` or a storage error.
    pub async fn shuffle_current(&mut self) -> Result<(), DeckManagerError> {
        let mut rng = rand::rng();
        self.shuffle_current_with(&mut rng).await
    }

    /// Like [`Self::shuffle_current`] with a caller-supplied RNG.
    ///
    /// # Errors
    ///
    /// Returns `NoDeckSelected` or a storage error.
    pub async fn shuffle_current_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<(), DeckManagerError> {
        let cursor = self.cursor.as_mut().ok_or(DeckManagerError::NoDeckSelected)?;
        cursor.card = 0;
        let deck_id = cursor.deck_id;
        let index = self.deck_index(deck_id)?;
        self.decks[index].cards_mut().shuffle(rng);
        debug!(deck_id = %deck_id, "deck shuffled");
        self.persist_decks().await
    }

    // ─── Rating ────────────────────────────────────────────────────────────────

    /// Rate the card under the cursor.
    ///
    /// # Errors
    ///
    /// Returns `NoDeckSelected`, `EmptyDeck`, or a storage error.
    pub async fn rate_current_card(
        &mut self,
        confidence: Confidence,
    ) -> Result<RatedCard, DeckManagerError> {
        let cursor = self.cursor.ok_or(DeckManagerError::NoDeckSelected)?;
        if self.deck(cursor.deck_id).is_some_and(Deck::is_empty) {
            return Err(DeckManagerError::EmptyDeck);
        }
        self.rate_card(cursor.deck_id, cursor.card, confidence).await
    }

    /// Rate card `card` of deck `id`, update deck mastery and persist.
    ///
    /// # Errors
    ///
    /// Returns `DeckNotFound`, `Mastery(CardOutOfRange)`, or a storage error.
    pub async fn rate_card(
        &mut self,
        id: DeckId,
        card: usize,
        confidence: Confidence,
    ) -> Result<RatedCard, DeckManagerError> {
        let now = self.clock.now();
        let index = self.deck_index(id)?;
        let deck = &mut self.decks[index];
        let rating = mastery::rate_card(deck, card, confidence, now)?;
        debug!(
            deck_id = %id,
            card,
            %confidence,
            mastery = rating.mastery,
            deck_mastery = rating.deck_mastery,
            "card rated"
        );

        if rating.newly_mastered() {
            self.stats.record_card_mastered();
            info!(deck_id = %id, card, "card mastered");
        }
        self.persist_all().await?;

        Ok(RatedCard {
            rating,
            recommendation: Recommendation::for_mastery(rating.mastery),
        })
    }

    // ─── Planning ──────────────────────────────────────────────────────────────

    /// Session length for the current deck (25 minutes when none is selected).
    #[must_use]
    pub fn recommended_session_seconds(&self) -> u32 {
        planner::recommended_session_seconds(self.current_deck())
    }

    #[must_use]
    pub fn current_recommendation(&self) -> Option<Recommendation> {
        self.current_card().map(planner::recommendation)
    }

    #[must_use]
    pub fn plan(&self, id: DeckId) -> Option<SessionPlan> {
        self.deck(id).map(planner::plan_session)
    }

    /// Decks whose name or cards contain `query`, ignoring case.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        search::search_decks(&self.decks, query)
    }

    // ─── Sessions ──────────────────────────────────────────────────────────────

    /// Begin studying the current deck.
    ///
    /// Stamps the deck's `last_studied`, counts today toward the streak and
    /// returns a started timer sized by the planner.
    ///
    /// # Errors
    ///
    /// Returns `NoDeckSelected` or a storage error.
    pub async fn start_session(&mut self) -> Result<SessionStart, DeckManagerError> {
        let cursor = self.cursor.ok_or(DeckManagerError::NoDeckSelected)?;
        let now = self.clock.now();
        let index = self.deck_index(cursor.deck_id)?;
        self.decks[index].mark_studied(now);

        let earned = self.stats.update_streak(now);
        let session_secs = planner::recommended_session_seconds(Some(&self.decks[index]));
        let mut timer = StudyTimer::new(session_secs);
        timer.start();

        self.session = Some(ActiveSession {
            deck_id: cursor.deck_id,
            started_at: now,
        });
        self.persist_all().await?;
        info!(deck_id = %cursor.deck_id, session_secs, "study session started");

        Ok(SessionStart {
            deck_id: cursor.deck_id,
            session_secs,
            timer,
            earned,
        })
    }

    #[must_use]
    pub fn session_active(&self) -> bool {
        self.session.is_some()
    }

    /// Finish the running session after `duration_secs` of study.
    ///
    /// Cards rated since the session began count as reviewed.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession` or a storage error.
    pub async fn end_session(
        &mut self,
        duration_secs: u64,
    ) -> Result<SessionSummary, DeckManagerError> {
        let session = self.session.take().ok_or(DeckManagerError::NoActiveSession)?;
        let now = self.clock.now();
        let Some(deck) = self.deck(session.deck_id) else {
            warn!(deck_id = %session.deck_id, "session deck vanished before end");
            return Err(DeckManagerError::DeckNotFound(session.deck_id));
        };

        let reviewed = deck
            .cards()
            .iter()
            .filter(|c| c.last_reviewed().is_some_and(|at| at >= session.started_at))
            .count();
        let cards_reviewed = u32::try_from(reviewed).unwrap_or(u32::MAX);
        let deck_mastery = deck.mastery();

        let mut earned = self.stats.add_study_session(duration_secs, cards_reviewed, now);
        if deck_mastery >= FULL_MASTERY && self.stats.earn(AchievementKind::MasteryLevel, now) {
            earned.push(AchievementKind::MasteryLevel);
        }
        self.persist_all().await?;
        info!(deck_id = %session.deck_id, duration_secs, cards_reviewed, "study session ended");

        Ok(SessionSummary {
            deck_id: session.deck_id,
            duration_secs,
            cards_reviewed,
            deck_mastery,
            earned,
        })
    }

    // ─── Interchange ───────────────────────────────────────────────────────────

    #[must_use]
    pub fn export_interchange(&self) -> String {
        interchange::export_decks(&self.decks)
    }

    /// Import interchange text, adding one deck per deck name found.
    ///
    /// Nothing is added unless the whole text parses.
    ///
    /// # Errors
    ///
    /// Returns `Interchange` for undecodable input, or a storage error.
    pub async fn import_interchange(&mut self, bytes: &[u8]) -> Result<Vec<DeckId>, DeckManagerError> {
        let imported = interchange::import_decks_from_bytes(bytes)?;
        let ids = self.add_imported(imported)?;
        if !ids.is_empty() {
            self.persist_all().await?;
        }
        info!(decks = ids.len(), "interchange import finished");
        Ok(ids)
    }

    fn add_imported(&mut self, imported: Vec<ImportedDeck>) -> Result<Vec<DeckId>, DeckManagerError> {
        let now = self.clock.now();
        let mut decks = Vec::with_capacity(imported.len());
        let mut id = self.next_deck_id(now);
        for entry in imported {
            while self.decks.iter().any(|d| d.id() == id) {
                id = id.next();
            }
            decks.push(Deck::new(id, entry.name, entry.cards, now)?.with_category(entry.category));
            id = id.next();
        }

        Ok(decks.into_iter().map(|deck| self.insert_deck(deck, now)).collect())
    }

    /// Create a deck from `question,answer` lines.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDeck` if no usable rows were found, a name validation
    /// error, or a storage error.
    pub async fn import_csv(
        &mut self,
        name: impl Into<String>,
        text: &str,
    ) -> Result<DeckId, DeckManagerError> {
        let cards = interchange::import_csv(text);
        if cards.is_empty() {
            return Err(DeckManagerError::EmptyDeck);
        }
        self.create_deck(name, cards).await
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use study_core::time::fixed_now;

    async fn manager() -> DeckManager {
        DeckManager::load(Clock::fixed(fixed_now()), Storage::in_memory())
            .await
            .unwrap()
    }

    fn cards(n: usize) -> Vec<Card> {
        (0..n)
            .map(|i| Card::new(format!("Q{i}"), format!("A{i}")).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn first_deck_earns_achievement_and_ids_are_unique() {
        let mut mgr = manager().await;
        let a = mgr.create_deck("A", cards(1)).await.unwrap();
        let b = mgr.create_deck("B", cards(1)).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(a, DeckId::from_timestamp(fixed_now()));
        assert!(mgr.stats().has_earned(AchievementKind::FirstDeck));
        assert_eq!(mgr.stats().total_points(), 10);
    }

    #[tokio::test]
    async fn navigation_stays_in_bounds() {
        let mut mgr = manager().await;
        let id = mgr.create_deck("Nav", cards(2)).await.unwrap();
        assert!(!mgr.next_card());

        mgr.select_deck(id).unwrap();
        assert_eq!(mgr.current_card().unwrap().question(), "Q0");
        assert!(!mgr.previous_card());
        assert!(mgr.next_card());
        assert_eq!(mgr.current_card().unwrap().question(), "Q1");
        assert!(!mgr.next_card());
        assert!(mgr.previous_card());
        assert_eq!(mgr.current_card_index(), Some(0));
    }

    #[tokio::test]
    async fn rating_requires_selection() {
        let mut mgr = manager().await;
        mgr.create_deck("Deck", cards(1)).await.unwrap();
        let err = mgr.rate_current_card(Confidence::Easy).await.unwrap_err();
        assert!(matches!(err, DeckManagerError::NoDeckSelected));
    }

    #[tokio::test]
    async fn rating_updates_card_and_deck() {
        let mut mgr = manager().await;
        let id = mgr.create_deck("Deck", cards(2)).await.unwrap();
        mgr.select_deck(id).unwrap();

        let rated = mgr.rate_current_card(Confidence::Easy).await.unwrap();
        assert!((rated.rating.mastery - 0.405).abs() < 1e-3);
        assert_eq!(rated.recommendation, Recommendation::MakingProgress);

        let deck = mgr.deck(id).unwrap();
        assert_eq!(deck.card(0).unwrap().review_count(), 1);
        // weights 2/3 and 1/3
        assert!((deck.mastery() - rated.rating.mastery * 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(mgr.current_recommendation(), Some(Recommendation::MakingProgress));
    }

    #[tokio::test]
    async fn rating_out_of_range_card_fails() {
        let mut mgr = manager().await;
        let id = mgr.create_deck("Deck", cards(1)).await.unwrap();
        let err = mgr.rate_card(id, 4, Confidence::Hard).await.unwrap_err();
        assert!(matches!(err, DeckManagerError::Mastery(_)));
    }

    #[tokio::test]
    async fn delete_clears_cursor() {
        let mut mgr = manager().await;
        let id = mgr.create_deck("Gone", cards(1)).await.unwrap();
        mgr.select_deck(id).unwrap();
        assert!(mgr.delete_deck(id).await.unwrap());
        assert!(mgr.current_deck().is_none());
        assert!(!mgr.delete_deck(id).await.unwrap());
    }

    #[tokio::test]
    async fn shuffle_keeps_cards_and_resets_cursor() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let mut mgr = manager().await;
        let id = mgr.create_deck("Shuffle", cards(20)).await.unwrap();
        mgr.select_deck(id).unwrap();
        mgr.next_card();

        let mut rng = StdRng::seed_from_u64(7);
        mgr.shuffle_current_with(&mut rng).await.unwrap();

        assert_eq!(mgr.current_card_index(), Some(0));
        let mut questions: Vec<_> = mgr
            .deck(id)
            .unwrap()
            .cards()
            .iter()
            .map(|c| c.question().to_owned())
            .collect();
        questions.sort();
        let mut expected: Vec<_> = (0..20).map(|i| format!("Q{i}")).collect();
        expected.sort();
        assert_eq!(questions, expected);
    }

    #[tokio::test]
    async fn session_counts_cards_rated_since_start() {
        let mut mgr = manager().await;
        let id = mgr.create_deck("Session", cards(12)).await.unwrap();
        mgr.select_deck(id).unwrap();
        mgr.rate_current_card(Confidence::Medium).await.unwrap();

        mgr.clock.advance(Duration::days(1));
        let start = mgr.start_session().await.unwrap();
        assert_eq!(start.session_secs, 900);
        assert!(start.timer.is_running());
        assert_eq!(mgr.deck(id).unwrap().last_studied(), Some(mgr.now()));

        for _ in 0..11 {
            mgr.rate_current_card(Confidence::Easy).await.unwrap();
            mgr.next_card();
        }
        let summary = mgr.end_session(1200).await.unwrap();

        assert_eq!(summary.cards_reviewed, 11);
        assert_eq!(summary.earned, vec![AchievementKind::StudySession]);
        assert_eq!(mgr.stats().total_study_time_secs, 1200);
        assert_eq!(mgr.stats().current_streak, 1);
        assert!(!mgr.session_active());
    }

    #[tokio::test]
    async fn ending_without_session_fails() {
        let mut mgr = manager().await;
        let err = mgr.end_session(10).await.unwrap_err();
        assert!(matches!(err, DeckManagerError::NoActiveSession));
    }

    #[tokio::test]
    async fn default_session_length_without_deck() {
        let mgr = manager().await;
        assert_eq!(mgr.recommended_session_seconds(), 1500);
        assert_eq!(mgr.current_recommendation(), None);
    }

    #[tokio::test]
    async fn import_adds_decks_and_export_includes_them() {
        let mut mgr = manager().await;
        let text = "#separator:tab\nfront\tback\tVerbs\nq\ta\n";
        let ids = mgr.import_interchange(text.as_bytes()).await.unwrap();
        assert_eq!(ids.len(), 2);

        let verbs = mgr.deck(ids[0]).unwrap();
        assert_eq!(verbs.name(), "Verbs");
        assert_eq!(verbs.category(), Some("imported"));
        assert_eq!(mgr.deck(ids[1]).unwrap().name(), "Imported Cards");

        let exported = mgr.export_interchange();
        assert!(exported.contains("front\tback\tVerbs\t\n"));
        assert!(exported.contains("q\ta\tImported Cards\t\n"));
    }

    #[tokio::test]
    async fn invalid_import_changes_nothing() {
        let mut mgr = manager().await;
        let err = mgr.import_interchange(&[0xc3, 0x28]).await.unwrap_err();
        assert!(matches!(err, DeckManagerError::Interchange(_)));
        assert!(mgr.decks().is_empty());
    }

    #[tokio::test]
    async fn search_reports_card_only_matches() {
        let mut mgr = manager().await;
        let verbs = mgr.create_deck("Verbs", cards(3)).await.unwrap();
        let nouns = mgr.create_deck("Nouns", Vec::new()).await.unwrap();
        mgr.add_card(nouns, "house", "dom").await.unwrap();

        let hits = mgr.search("a1");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].deck_id, verbs);
        assert!(hits[0].cards_only());
        assert_eq!(hits[0].matching_cards, 1);

        let hits = mgr.search("NOUN");
        assert_eq!(hits.len(), 1);
        assert!(hits[0].name_matches);
    }

    #[tokio::test]
    async fn csv_import_requires_rows() {
        let mut mgr = manager().await;
        let id = mgr.import_csv("Animals", "cat,kot\ndog,pies\n").await.unwrap();
        assert_eq!(mgr.deck(id).unwrap().len(), 2);

        let err = mgr.import_csv("Empty", "nothing here").await.unwrap_err();
        assert!(matches!(err, DeckManagerError::EmptyDeck));
    }

    #[tokio::test]
    async fn state_survives_reload() {
        let storage = Storage::in_memory();
        let clock = Clock::fixed(fixed_now());
        let id = {
            let mut mgr = DeckManager::load(clock, storage.clone()).await.unwrap();
            let id = mgr.create_deck("Persisted", cards(3)).await.unwrap();
            mgr.rate_card(id, 2, Confidence::Hard).await.unwrap();
            id
        };

        let mgr = DeckManager::load(clock, storage).await.unwrap();
        let deck = mgr.deck(id).unwrap();
        assert_eq!(deck.card(2).unwrap().review_count(), 1);
        assert!(mgr.stats().has_earned(AchievementKind::FirstDeck));
    }
}
