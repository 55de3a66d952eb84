//! Tab-separated flashcard interchange text (Anki "notes in plain text").
//!
//! Export writes a small header followed by one `front<TAB>back<TAB>deck<TAB>`
//! row per card. Import is lenient: rows it cannot use are skipped.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::model::{Card, Deck};

pub const EXPORT_HEADER: &str = "#separator:tab\n#html:true\n#columns:Front\tBack\tDeck\tTags\n\n";

/// Deck name for rows that do not carry one.
pub const DEFAULT_IMPORT_DECK: &str = "Imported Cards";
pub const IMPORTED_CATEGORY: &str = "imported";

/// Suggested file name for exports.
pub const EXPORT_FILE_NAME: &str = "studymaster_export.txt";

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern is valid"));
static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("markup pattern is valid"));

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InterchangeError {
    #[error("Invalid import format: {0}")]
    InvalidFormat(String),
}

//
// ─── EXPORT ────────────────────────────────────────────────────────────────────
//

fn escape_field(text: &str) -> String {
    text.replace("\r\n", "<br>")
        .replace('\n', "<br>")
        .replace('\t', " ")
}

/// Serializes every card of every deck, in deck then card order.
#[must_use]
pub fn export_decks(decks: &[Deck]) -> String {
    let mut out = String::from(EXPORT_HEADER);
    for deck in decks {
        let deck_name = escape_field(deck.name());
        for card in deck.cards() {
            out.push_str(&escape_field(card.question()));
            out.push('\t');
            out.push_str(&escape_field(card.answer()));
            out.push('\t');
            out.push_str(&deck_name);
            out.push_str("\t\n");
        }
    }
    out
}

//
// ─── IMPORT ────────────────────────────────────────────────────────────────────
//

/// A deck parsed from interchange text, not yet part of any collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDeck {
    pub name: String,
    pub cards: Vec<Card>,
    pub category: &'static str,
}

fn clean_field(text: &str) -> String {
    let with_breaks = LINE_BREAK.replace_all(text, "\n");
    MARKUP.replace_all(&with_breaks, "").into_owned()
}

fn parse_row(line: &str) -> Option<(String, Card)> {
    let mut fields = line.split('\t').map(str::trim);
    let front = fields.next().filter(|f| !f.is_empty())?;
    let back = fields.next().filter(|f| !f.is_empty())?;
    let deck = fields
        .next()
        .map(|f| clean_field(f).trim().to_owned())
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_IMPORT_DECK.to_owned());

    let card = Card::new(clean_field(front), clean_field(back)).ok()?;
    Some((deck, card))
}

/// Parses interchange text into decks grouped by name.
///
/// Leading header (`#`) and blank lines are skipped. Rows missing a front or
/// back are dropped. Decks appear in the order their names are first seen.
#[must_use]
pub fn import_decks(text: &str) -> Vec<ImportedDeck> {
    let mut decks: Vec<ImportedDeck> = Vec::new();

    let body = text
        .lines()
        .skip_while(|line| line.starts_with('#') || line.trim().is_empty());

    for line in body {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((deck_name, card)) = parse_row(line) else {
            continue;
        };

        match decks.iter_mut().find(|d| d.name == deck_name) {
            Some(deck) => deck.cards.push(card),
            None => decks.push(ImportedDeck {
                name: deck_name,
                cards: vec![card],
                category: IMPORTED_CATEGORY,
            }),
        }
    }

    decks
}

/// Decodes raw file contents before parsing.
///
/// # Errors
///
/// Returns `InterchangeError::InvalidFormat` if the bytes are not UTF-8.
pub fn import_decks_from_bytes(bytes: &[u8]) -> Result<Vec<ImportedDeck>, InterchangeError> {
    let text = std::str::from_utf8(bytes).map_err(|e| InterchangeError::InvalidFormat(e.to_string()))?;
    Ok(import_decks(text))
}

/// Parses `question,answer` records. Quoted cells may contain commas; cells
/// are trimmed, extra cells are ignored and rows missing either side are
/// dropped.
#[must_use]
pub fn import_csv(text: &str) -> Vec<Card> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    reader
        .records()
        .filter_map(Result::ok)
        .filter_map(|record| {
            let question = record.get(0)?;
            let answer = record.get(1)?;
            Card::new(question, answer).ok()
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
