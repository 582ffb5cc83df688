use log::debug;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("The card \"{0}\" already exists.")]
    DuplicateTerm(String),
    #[error("The definition \"{0}\" already exists.")]
    DuplicateDefinition(String),
    #[error("Can't remove \"{0}\": there is no such card")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub term: String,
    pub definition: String,
    pub errors: u32,
}

/// Insertion-ordered card collection, keyed by term. Iteration order is the
/// order cards were added, which keeps exports deterministic.
#[derive(Debug, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new() -> Deck {
        Deck::default()
    }

    pub fn add(&mut self, term: &str, definition: &str) -> Result<(), DeckError> {
        if self.position(term).is_some() {
            return Err(DeckError::DuplicateTerm(term.to_owned()));
        }
        if self.find_by_definition(definition).is_some() {
            return Err(DeckError::DuplicateDefinition(definition.to_owned()));
        }
        self.cards.push(Card {
            term: term.to_owned(),
            definition: definition.to_owned(),
            errors: 0,
        });
        debug!("[Deck] Added card {:?} -> {:?}", term, definition);
        Ok(())
    }

    pub fn remove(&mut self, term: &str) -> Result<Card, DeckError> {
        match self.position(term) {
            Some(idx) => {
                debug!("[Deck] Removed card {:?}", term);
                Ok(self.cards.remove(idx))
            }
            None => Err(DeckError::NotFound(term.to_owned())),
        }
    }

    /// Trusted bulk load: overwrites an existing card in place (keeping its
    /// position) and skips the duplicate-definition check.
    pub fn upsert(&mut self, term: &str, definition: &str, errors: u32) {
        match self.position(term) {
            Some(idx) => {
                let card = &mut self.cards[idx];
                card.definition = definition.to_owned();
                card.errors = errors;
                debug!("[Deck] Overwrote card {:?} -> {:?}", term, definition);
            }
            None => {
                self.cards.push(Card {
                    term: term.to_owned(),
                    definition: definition.to_owned(),
                    errors,
                });
                debug!("[Deck] Added card {:?} -> {:?}", term, definition);
            }
        }
    }

    pub fn record_error(&mut self, term: &str) {
        if let Some(idx) = self.position(term) {
            self.cards[idx].errors += 1;
            debug!("[Deck] {:?} now at {} errors", term, self.cards[idx].errors);
        }
    }

    pub fn reset_errors(&mut self) {
        for card in &mut self.cards {
            card.errors = 0;
        }
        debug!("[Deck] Reset error counts on {} cards", self.cards.len());
    }

    pub fn get(&self, term: &str) -> Option<&Card> {
        self.position(term).map(|idx| &self.cards[idx])
    }

    /// First card (in iteration order) whose definition matches exactly.
    pub fn find_by_definition(&self, definition: &str) -> Option<&str> {
        self.cards
            .iter()
            .find(|card| card.definition == definition)
            .map(|card| card.term.as_str())
    }

    /// Every card tied for the maximum error count, in iteration order,
    /// together with that maximum. None when no card has any errors.
    pub fn hardest(&self) -> Option<(Vec<&Card>, u32)> {
        let max = self.cards.iter().map(|card| card.errors).max().unwrap_or(0);
        if max == 0 {
            return None;
        }
        let tied = self.cards.iter().filter(|card| card.errors == max).collect();
        Some((tied, max))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn terms(&self) -> Vec<String> {
        self.cards.iter().map(|card| card.term.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn position(&self, term: &str) -> Option<usize> {
        self.cards.iter().position(|card| card.term == term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck_of(pairs: &[(&str, &str)]) -> Deck {
        let mut deck = Deck::new();
        for (term, definition) in pairs {
            deck.add(term, definition).unwrap();
        }
        deck
    }

    #[test]
    fn test_add_rejects_duplicate_term() {
        let mut deck = deck_of(&[("france", "paris")]);
        let err = deck.add("france", "lyon").unwrap_err();
        assert_eq!(err, DeckError::DuplicateTerm("france".to_owned()));
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.get("france").unwrap().definition, "paris");
    }

    #[test]
    fn test_add_rejects_duplicate_definition_even_for_new_term() {
        let mut deck = deck_of(&[("france", "paris")]);
        let err = deck.add("texas", "paris").unwrap_err();
        assert_eq!(err, DeckError::DuplicateDefinition("paris".to_owned()));
        assert_eq!(deck.len(), 1);
        assert!(deck.get("texas").is_none());
    }

    #[test]
    fn test_remove_missing_card() {
        let mut deck = deck_of(&[("a", "1")]);
        let err = deck.remove("b").unwrap_err();
        assert_eq!(err, DeckError::NotFound("b".to_owned()));
        assert_eq!(deck.len(), 1);
    }

    #[test]
    fn test_iteration_order_tracks_insertion() {
        let mut deck = deck_of(&[("a", "1"), ("b", "2"), ("c", "3")]);
        deck.remove("b").unwrap();
        deck.add("d", "4").unwrap();
        let terms: Vec<_> = deck.iter().map(|card| card.term.as_str()).collect();
        assert_eq!(terms, ["a", "c", "d"]);
    }

    #[test]
    fn test_upsert_overwrites_in_place() {
        let mut deck = deck_of(&[("a", "1"), ("b", "2")]);
        deck.upsert("a", "one", 5);
        let terms: Vec<_> = deck.iter().map(|card| card.term.as_str()).collect();
        assert_eq!(terms, ["a", "b"]);
        let card = deck.get("a").unwrap();
        assert_eq!(card.definition, "one");
        assert_eq!(card.errors, 5);
    }

    #[test]
    fn test_upsert_appends_new_terms() {
        let mut deck = deck_of(&[("a", "1")]);
        deck.upsert("b", "1", 2);
        let terms: Vec<_> = deck.iter().map(|card| card.term.as_str()).collect();
        assert_eq!(terms, ["a", "b"]);
        assert_eq!(deck.get("b").unwrap().errors, 2);
    }

    #[test]
    fn test_find_by_definition_prefers_iteration_order() {
        let mut deck = deck_of(&[("a", "1")]);
        deck.upsert("b", "dup", 0);
        deck.upsert("c", "dup", 0);
        assert_eq!(deck.find_by_definition("dup"), Some("b"));
        assert_eq!(deck.find_by_definition("nope"), None);
    }

    #[test]
    fn test_hardest_none_without_errors() {
        let deck = deck_of(&[("a", "1"), ("b", "2")]);
        assert!(deck.hardest().is_none());
        assert!(Deck::new().hardest().is_none());
    }

    #[test]
    fn test_hardest_returns_all_tied_cards() {
        let mut deck = deck_of(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]);
        deck.upsert("b", "2", 3);
        deck.upsert("c", "3", 3);
        deck.upsert("d", "4", 1);
        let (tied, max) = deck.hardest().unwrap();
        assert_eq!(max, 3);
        let terms: Vec<_> = tied.iter().map(|card| card.term.as_str()).collect();
        assert_eq!(terms, ["b", "c"]);
    }

    #[test]
    fn test_reset_errors_zeroes_everything() {
        let mut deck = deck_of(&[("a", "1"), ("b", "2")]);
        deck.record_error("a");
        deck.record_error("a");
        deck.record_error("b");
        deck.reset_errors();
        assert!(deck.hardest().is_none());
        assert!(deck.iter().all(|card| card.errors == 0));
    }

    #[test]
    fn test_record_error_accumulates() {
        let mut deck = deck_of(&[("a", "1")]);
        deck.record_error("a");
        deck.record_error("a");
        assert_eq!(deck.get("a").unwrap().errors, 2);
    }
}
