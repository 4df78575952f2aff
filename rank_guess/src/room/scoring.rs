//! Round ranking.

use std::cmp::Ordering;

use crate::game::{EvaluatedHand, compare};

/// Orders hands strongest first and assigns 1-based finishing ranks.
///
/// A hand that ties exactly with the one before it shares that rank. The
/// next distinct hand is ranked by its position, so three players where the
/// top two tie finish 1, 1, 3.
pub fn rank_by_strength<'a, K>(
    hands: impl IntoIterator<Item = (K, &'a EvaluatedHand)>,
) -> Vec<(K, u32)> {
    let mut hands: Vec<(K, &EvaluatedHand)> = hands.into_iter().collect();
    hands.sort_by(|a, b| compare(b.1, a.1));

    let mut ranked = Vec::with_capacity(hands.len());
    let mut rank = 0u32;
    let mut previous: Option<&EvaluatedHand> = None;
    for (position, (key, hand)) in hands.into_iter().enumerate() {
        let ties_previous = previous.is_some_and(|p| compare(hand, p) == Ordering::Equal);
        if !ties_previous {
            rank = position as u32 + 1;
        }
        previous = Some(hand);
        ranked.push((key, rank));
    }
    ranked
}
