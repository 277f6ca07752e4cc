//! Role-based question selection ("the mixer").
//!
//! Questions qualify when they target every role or overlap the selected
//! roles. The qualifying pool is shuffled uniformly and cut to the session
//! length, so replays of the same setup draw a different mix.
use rand::Rng;
use rand::seq::SliceRandom;

use crate::roles::Role;
use crate::scenario::{Inject, Question, ScenarioDocument, question_to_inject};

/// Questions from `questions` that `selected` may be asked, in pool order.
#[must_use]
pub fn qualifying_questions<'a>(questions: &'a [Question], selected: &[Role]) -> Vec<&'a Question> {
    if selected.is_empty() {
        return Vec::new();
    }
    questions
        .iter()
        .filter(|question| question.is_playable_by(selected))
        .collect()
}

/// Draw up to `cap` distinct qualifying questions in random order.
///
/// Pools no larger than `cap` come back whole (shuffled, never padded);
/// larger pools yield a uniform sample of exactly `cap`.
pub fn select_questions<R>(
    document: &ScenarioDocument,
    selected: &[Role],
    cap: usize,
    rng: &mut R,
) -> Vec<Question>
where
    R: Rng + ?Sized,
{
    let mut pool = qualifying_questions(&document.questions, selected);
    pool.shuffle(rng);
    pool.truncate(cap);
    log::debug!(
        "mixer drew {} question(s) for roles {:?} from '{}'",
        pool.len(),
        selected,
        document.meta.id
    );
    pool.into_iter().cloned().collect()
}

/// Select questions and project them into a session's inject timeline,
/// numbering them 1..=n in draw order.
pub fn build_session_injects<R>(
    document: &ScenarioDocument,
    selected: &[Role],
    cap: usize,
    rng: &mut R,
) -> Vec<Inject>
where
    R: Rng + ?Sized,
{
    select_questions(document, selected, cap, rng)
        .iter()
        .enumerate()
        .map(|(index, question)| question_to_inject(question, index))
        .collect()
}
