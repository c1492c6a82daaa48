//! Transforms over a question's answer list in response to player actions.
//!
//! Every operation takes the current question by reference and hands back a
//! new version; the caller decides whether to store it. None of them ever
//! removes the correct option.

use crate::error::ActionRejected;
use crate::question::Question;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

/// Marks `answer_id` as the only selected option. An id that matches nothing
/// leaves every option unselected.
pub fn select(question: &Question, answer_id: usize) -> Question {
    let mut next = question.clone();
    for answer in next.answers.iter_mut() {
        answer.is_selected = answer.id == answer_id;
    }
    next
}

/// Selects the correct option and clears every other selection.
pub fn reveal_correct(question: &Question) -> Result<Question, ActionRejected> {
    if question.answers.len() <= 1 {
        return Err(ActionRejected::OnlyOneOptionRemains);
    }

    let mut next = question.clone();
    for answer in next.answers.iter_mut() {
        answer.is_selected = answer.is_correct;
    }
    Ok(next)
}

/// Removes one incorrect option drawn uniformly from the incorrect ones still
/// present. When a single option is left it is auto-selected.
///
/// The caller owns the hint budget and is responsible for decrementing it
/// after a successful call.
pub fn hint<R: Rng + ?Sized>(
    question: &Question,
    hint_budget: u32,
    rng: &mut R,
) -> Result<Question, ActionRejected> {
    if hint_budget == 0 {
        return Err(ActionRejected::NoHintsRemaining);
    }

    let incorrect = question.incorrect_answers().map(|a| a.id).collect_vec();
    let Some(&removed) = incorrect.choose(rng) else {
        return Err(ActionRejected::OnlyOneOptionRemains);
    };

    let mut next = question.clone();
    next.answers.retain(|a| a.id != removed);
    if next.answers.len() == 1 {
        next.answers[0].is_selected = true;
    }
    Ok(next)
}

/// Two-wrong elimination. With all three incorrect options still present two
/// of them are dropped at random and nothing is selected. Otherwise the list
/// collapses to the correct option, which becomes selected.
pub fn eliminate_two_wrong<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Question {
    let incorrect = question.incorrect_answers().map(|a| a.id).collect_vec();
    let mut next = question.clone();

    if incorrect.len() == 3 {
        let removed = incorrect.choose_multiple(rng, 2).copied().collect_vec();
        next.answers.retain(|a| !removed.contains(&a.id));
    } else {
        next.answers.retain(|a| a.is_correct);
        for answer in next.answers.iter_mut() {
            answer.is_selected = true;
        }
    }
    next
}
