//! Poker hand evaluation.
//!
//! Every 5-card subset of a player's cards is classified and the strongest
//! one under [`compare`] is kept. Hands of the same category are ordered by
//! their tie-break fields: `primary`, then `secondary`, then `kickers`.

use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::HashMap, fmt};
use thiserror::Error;

use super::entities::{ACE, Card, Value};

/// Number of cards in an evaluated hand.
pub const HAND_SIZE: usize = 5;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandCategory {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl HandCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::HighCard => "High Card",
            Self::Pair => "Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
            Self::RoyalFlush => "Royal Flush",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum HandError {
    #[error("need at least {HAND_SIZE} cards to make a hand, got {0}")]
    EmptyHandSet(usize),
}

/// The best 5-card hand found for a set of cards.
///
/// `primary` is the quad, trips, higher pair or pair rank (or the top card
/// of a straight). `secondary` is the pair of a full house or the lower pair
/// of two pair. `kickers` are the remaining ranks, highest first.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedHand {
    pub category: HandCategory,
    pub cards: Vec<Card>,
    pub primary: Option<Value>,
    pub secondary: Option<Value>,
    pub kickers: Vec<Value>,
}

impl EvaluatedHand {
    fn new(category: HandCategory, cards: Vec<Card>) -> Self {
        Self {
            category,
            cards,
            primary: None,
            secondary: None,
            kickers: vec![],
        }
    }

    fn with_primary(mut self, value: Value) -> Self {
        self.primary = Some(value);
        self
    }

    fn with_secondary(mut self, value: Value) -> Self {
        self.secondary = Some(value);
        self
    }

    fn with_kickers(mut self, kickers: impl IntoIterator<Item = Value>) -> Self {
        self.kickers = kickers.into_iter().collect();
        self
    }
}

impl fmt::Display for EvaluatedHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.category)?;
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{card}")?;
        }
        write!(f, "]")
    }
}

/// Total order over evaluated hands. `Equal` means the hands are an exact tie.
pub fn compare(a: &EvaluatedHand, b: &EvaluatedHand) -> Ordering {
    a.category
        .cmp(&b.category)
        .then_with(|| a.primary.cmp(&b.primary))
        .then_with(|| a.secondary.cmp(&b.secondary))
        .then_with(|| a.kickers.cmp(&b.kickers))
}

/// Top card of the straight formed by `values` (sorted descending), if any.
/// The wheel (A-5-4-3-2) is a five-high straight.
fn straight_high(values: &[Value; HAND_SIZE]) -> Option<Value> {
    let distinct = values.windows(2).all(|w| w[0] != w[1]);
    if !distinct {
        return None;
    }
    if values[0] - values[4] == 4 {
        return Some(values[0]);
    }
    if *values == [ACE, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

/// Classifies exactly five cards.
pub fn evaluate5(hand: [Card; HAND_SIZE]) -> EvaluatedHand {
    let mut cards = hand;
    cards.sort_by(|a, b| b.cmp(a));
    let values = cards.map(|c| c.0);

    let mut counts: HashMap<Value, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    // Largest group first, higher rank first among equal-sized groups.
    let mut groups: Vec<(usize, Value)> = counts.into_iter().map(|(v, n)| (n, v)).collect();
    groups.sort_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.1 == cards[0].1);
    let straight = straight_high(&values);
    let cards = cards.to_vec();

    // Five distinct values or five of one suit rule out every paired
    // category, so these can be settled before looking at groups.
    match (straight, is_flush) {
        (Some(ACE), true) => {
            return EvaluatedHand::new(HandCategory::RoyalFlush, cards)
                .with_primary(ACE)
                .with_kickers(values);
        }
        (Some(high), true) => {
            return EvaluatedHand::new(HandCategory::StraightFlush, cards)
                .with_primary(high)
                .with_kickers(values);
        }
        (None, true) => {
            return EvaluatedHand::new(HandCategory::Flush, cards).with_kickers(values);
        }
        (Some(high), false) => {
            return EvaluatedHand::new(HandCategory::Straight, cards)
                .with_primary(high)
                .with_kickers(values);
        }
        (None, false) => {}
    }

    let rest = |skip: usize| groups.iter().skip(skip).map(|g| g.1).collect::<Vec<_>>();
    match groups.as_slice() {
        [(4, quad), ..] => EvaluatedHand::new(HandCategory::FourOfAKind, cards)
            .with_primary(*quad)
            .with_kickers(rest(1)),
        [(3, trips), (2, pair)] => EvaluatedHand::new(HandCategory::FullHouse, cards)
            .with_primary(*trips)
            .with_secondary(*pair),
        [(3, trips), ..] => EvaluatedHand::new(HandCategory::ThreeOfAKind, cards)
            .with_primary(*trips)
            .with_kickers(rest(1)),
        [(2, high), (2, low), ..] => EvaluatedHand::new(HandCategory::TwoPair, cards)
            .with_primary(*high)
            .with_secondary(*low)
            .with_kickers(rest(2)),
        [(2, pair), ..] => EvaluatedHand::new(HandCategory::Pair, cards)
            .with_primary(*pair)
            .with_kickers(rest(1)),
        _ => EvaluatedHand::new(HandCategory::HighCard, cards).with_kickers(values),
    }
}

/// Index sets of every 5-element subset of `0..n`, in lexicographic order.
struct Combinations {
    n: usize,
    idx: [usize; HAND_SIZE],
    done: bool,
}

impl Combinations {
    fn new(n: usize) -> Self {
        Self {
            n,
            idx: [0, 1, 2, 3, 4],
            done: n < HAND_SIZE,
        }
    }
}

impl Iterator for Combinations {
    type Item = [usize; HAND_SIZE];

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.idx;

        // Find the rightmost index that can still move right.
        let mut i = HAND_SIZE;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.idx[i] < self.n - HAND_SIZE + i {
                self.idx[i] += 1;
                for j in i + 1..HAND_SIZE {
                    self.idx[j] = self.idx[j - 1] + 1;
                }
                break;
            }
        }

        Some(current)
    }
}

/// Finds the strongest 5-card hand among all subsets of `cards`.
pub fn evaluate_best_hand(cards: &[Card]) -> Result<EvaluatedHand, HandError> {
    let mut best: Option<EvaluatedHand> = None;
    for idx in Combinations::new(cards.len()) {
        let hand = evaluate5(idx.map(|i| cards[i]));
        if best
            .as_ref()
            .is_none_or(|b| compare(&hand, b) == Ordering::Greater)
        {
            best = Some(hand);
        }
    }
    best.ok_or(HandError::EmptyHandSet(cards.len()))
}

/// Evaluates a player's hole cards together with the community cards.
pub fn evaluate_player_hand(
    hole_cards: &[Card],
    community_cards: &[Card],
) -> Result<EvaluatedHand, HandError> {
    let all: Vec<Card> = hole_cards.iter().chain(community_cards).copied().collect();
    evaluate_best_hand(&all)
}
