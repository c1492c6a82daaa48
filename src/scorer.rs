use crate::question::Question;

/// Points awarded for each question whose correct option ends up selected
pub const POINTS_PER_CORRECT: u32 = 10;

/// Sums the final answer state of every question. Auto-selected correct
/// options count the same as ones the player picked.
pub fn compute_score(batch: &[Question]) -> u32 {
    batch
        .iter()
        .flat_map(|q| q.answers.iter())
        .filter(|a| a.is_correct && a.is_selected)
        .count() as u32
        * POINTS_PER_CORRECT
}
