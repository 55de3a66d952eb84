//! Subcommand handlers. Output goes to the given writer so tests can capture it.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use services::DeckManager;
use study_core::model::{Confidence, Deck, DeckId};
use study_core::planner;
use study_core::timer::{StudyTimer, TimerEvent};

fn minutes(secs: u32) -> u32 {
    secs / 60
}

fn percent(value: f64) -> f64 {
    (value * 100.0).round()
}

// ─── Listing ───────────────────────────────────────────────────────────────────

pub fn list_decks(mgr: &DeckManager, out: &mut impl Write) -> Result<()> {
    if mgr.decks().is_empty() {
        writeln!(out, "No decks yet. Create one with `studymaster create <name>`.")?;
        return Ok(());
    }
    for deck in mgr.decks() {
        let category = deck.category().map(|c| format!(" [{c}]")).unwrap_or_default();
        writeln!(
            out,
            "{:>15}  {}{}  {} cards  {}% mastered",
            deck.id(),
            deck.name(),
            category,
            deck.len(),
            percent(deck.mastery())
        )?;
    }
    Ok(())
}

pub fn show_deck(mgr: &DeckManager, id: DeckId, out: &mut impl Write) -> Result<()> {
    let deck = mgr.deck(id).with_context(|| format!("deck {id} not found"))?;
    let plan = planner::plan_session(deck);

    writeln!(out, "{} ({} cards)", deck.name(), deck.len())?;
    writeln!(out, "Deck mastery: {}%", percent(plan.deck_mastery))?;
    writeln!(out, "Recommended session: {} minutes", minutes(plan.session_secs))?;
    if let Some(at) = deck.last_studied() {
        writeln!(out, "Last studied: {}", at.format("%Y-%m-%d %H:%M"))?;
    }
    for (card, advice) in deck.cards().iter().zip(&plan.cards) {
        writeln!(
            out,
            "  #{:<3} {}% {} | {} -> {}",
            advice.index,
            percent(advice.mastery),
            advice.recommendation,
            card.question(),
            card.answer()
        )?;
    }
    Ok(())
}

pub fn search(mgr: &DeckManager, query: &str, out: &mut impl Write) -> Result<()> {
    let hits = mgr.search(query);
    if hits.is_empty() {
        writeln!(out, "No decks match \"{query}\"")?;
        return Ok(());
    }
    for hit in hits {
        let Some(deck) = mgr.deck(hit.deck_id) else {
            continue;
        };
        if hit.cards_only() {
            writeln!(
                out,
                "{:>15}  {}  {} matching cards",
                hit.deck_id,
                deck.name(),
                hit.matching_cards
            )?;
        } else {
            writeln!(out, "{:>15}  {}  {} cards", hit.deck_id, deck.name(), deck.len())?;
        }
    }
    Ok(())
}

pub fn show_stats(mgr: &DeckManager, out: &mut impl Write) -> Result<()> {
    let stats = mgr.stats();
    writeln!(out, "Total study time: {} minutes", stats.total_study_time_secs / 60)?;
    writeln!(out, "Cards mastered: {}", stats.cards_mastered)?;
    writeln!(
        out,
        "Streak: {} days (longest {})",
        stats.current_streak, stats.longest_streak
    )?;
    writeln!(out, "Sessions: {}", stats.study_history.len())?;
    writeln!(out, "Points: {}", stats.total_points())?;
    for achievement in &stats.achievements {
        let mark = if achievement.earned { "x" } else { " " };
        writeln!(
            out,
            "  [{mark}] {} ({} pts): {}",
            achievement.kind.name(),
            achievement.kind.points(),
            achievement.kind.description()
        )?;
    }
    Ok(())
}

// ─── Mutations ─────────────────────────────────────────────────────────────────

pub async fn rate(
    mgr: &mut DeckManager,
    id: DeckId,
    card: usize,
    value: u8,
    out: &mut impl Write,
) -> Result<()> {
    let confidence = Confidence::from_u8(value)?;
    let rated = mgr.rate_card(id, card, confidence).await?;
    writeln!(
        out,
        "Card #{card}: {}% (deck {}%)",
        percent(rated.rating.mastery),
        percent(rated.rating.deck_mastery)
    )?;
    writeln!(out, "{}", rated.recommendation)?;
    Ok(())
}

pub fn export(mgr: &DeckManager, path: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let text = mgr.export_interchange();
    match path {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), decks = mgr.decks().len(), "exported decks");
            writeln!(out, "Exported {} decks to {}", mgr.decks().len(), path.display())?;
        }
        None => out.write_all(text.as_bytes())?,
    }
    Ok(())
}

pub async fn import(mgr: &mut DeckManager, path: &Path, out: &mut impl Write) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let ids = mgr.import_interchange(&bytes).await?;
    let cards: usize = ids
        .iter()
        .filter_map(|id| mgr.deck(*id))
        .map(Deck::len)
        .sum();
    writeln!(out, "Imported {} decks ({cards} cards)", ids.len())?;
    Ok(())
}

pub async fn import_csv(
    mgr: &mut DeckManager,
    name: &str,
    path: &Path,
    out: &mut impl Write,
) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let id = mgr.import_csv(name, &text).await?;
    let len = mgr.deck(id).map_or(0, Deck::len);
    writeln!(out, "Created deck {id} with {len} cards")?;
    Ok(())
}

// ─── Interactive study ─────────────────────────────────────────────────────────

fn read_line(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}

fn advance_timer(timer: &mut StudyTimer, secs: i64, out: &mut impl Write) -> Result<()> {
    for _ in 0..secs.max(0) {
        let message = match timer.tick() {
            Some(TimerEvent::FiveMinutesLeft) => "5 minutes left in this session",
            Some(TimerEvent::OneMinuteLeft) => "1 minute left in this session",
            Some(TimerEvent::SessionComplete { long_break: true }) => {
                "Session complete, take a long break"
            }
            Some(TimerEvent::SessionComplete { long_break: false }) => {
                "Session complete, take a short break"
            }
            _ => continue,
        };
        writeln!(out, "** {message} **")?;
    }
    Ok(())
}

enum Step {
    Rated,
    Back,
    Quit,
}

async fn study_card(
    mgr: &mut DeckManager,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Step> {
    let Some(card) = mgr.current_card() else {
        return Ok(Step::Quit);
    };
    let answer = card.answer().to_owned();
    writeln!(out, "\nQ: {}", card.question())?;
    write!(out, "[enter] show answer, p previous, q quit > ")?;
    out.flush()?;
    match read_line(input)?.as_deref() {
        None | Some("q") => return Ok(Step::Quit),
        Some("p") => return Ok(Step::Back),
        _ => {}
    }

    writeln!(out, "A: {answer}")?;
    loop {
        write!(out, "How well did you know it? 1 hard, 2 medium, 3 easy > ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(Step::Quit);
        };
        if line == "q" {
            return Ok(Step::Quit);
        }
        let Some(confidence) = line.parse::<u8>().ok().and_then(|v| Confidence::from_u8(v).ok())
        else {
            writeln!(out, "Please answer 1, 2 or 3.")?;
            continue;
        };
        let rated = mgr.rate_current_card(confidence).await?;
        writeln!(
            out,
            "Mastery {}%: {}",
            percent(rated.rating.mastery),
            rated.recommendation
        )?;
        return Ok(Step::Rated);
    }
}

/// Walk the deck card by card, rating each one, then record the session.
pub async fn study(
    mgr: &mut DeckManager,
    id: DeckId,
    shuffle: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let deck = mgr.select_deck(id)?;
    if deck.is_empty() {
        bail!("deck {id} has no cards");
    }
    if shuffle {
        mgr.shuffle_current().await?;
    }

    let started = mgr.now();
    let mut last_tick = started;
    let mut session = mgr.start_session().await?;
    writeln!(
        out,
        "Studying {} for about {} minutes",
        mgr.current_deck().map_or("", |d| d.name()),
        minutes(session.session_secs)
    )?;
    for kind in &session.earned {
        writeln!(out, "Achievement unlocked: {}", kind.name())?;
    }

    loop {
        let step = study_card(mgr, input, out).await?;
        let now = mgr.now();
        advance_timer(&mut session.timer, (now - last_tick).num_seconds(), out)?;
        last_tick = now;

        match step {
            Step::Quit => break,
            Step::Back => {
                mgr.previous_card();
            }
            Step::Rated => {
                if !mgr.next_card() {
                    break;
                }
            }
        }
    }

    let elapsed = u64::try_from((mgr.now() - started).num_seconds()).unwrap_or(0);
    let summary = mgr.end_session(elapsed).await?;
    writeln!(
        out,
        "\nReviewed {} cards in {} minutes. Deck mastery {}%.",
        summary.cards_reviewed,
        summary.duration_secs / 60,
        percent(summary.deck_mastery)
    )?;
    for kind in &summary.earned {
        writeln!(out, "Achievement unlocked: {}", kind.name())?;
    }
    Ok(())
}
