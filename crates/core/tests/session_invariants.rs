use study_core::model::{CardId, Difficulty, FlashCard, McqQuestion, QuestionId};
use study_core::session::{FlashcardSession, McqSession, SessionPhase};

fn cards(n: u64) -> Vec<FlashCard> {
    (1..=n)
        .map(|id| FlashCard::new(CardId::new(id), format!("F{id}"), format!("B{id}"), Difficulty::Easy).unwrap())
        .collect()
}

fn questions(n: u64) -> Vec<McqQuestion> {
    (1..=n)
        .map(|id| {
            McqQuestion::new(
                QuestionId::new(id),
                format!("Q{id}"),
                vec!["a".into(), "b".into(), "c".into()],
                (id % 3) as usize,
                "",
            )
            .unwrap()
        })
        .collect()
}

#[derive(Clone, Copy, Debug)]
enum CardOp {
    Flip,
    Right,
    Wrong,
    Previous,
    Next,
    Restart,
}

const CARD_OPS: [CardOp; 6] = [
    CardOp::Flip,
    CardOp::Right,
    CardOp::Wrong,
    CardOp::Previous,
    CardOp::Next,
    CardOp::Restart,
];

fn apply_card(s: &FlashcardSession, op: CardOp) -> FlashcardSession {
    let next = match op {
        CardOp::Flip => s.flip(),
        CardOp::Right => s.respond(true),
        CardOp::Wrong => s.respond(false),
        CardOp::Previous => s.previous(),
        CardOp::Next => s.next(),
        CardOp::Restart => Ok(s.restart()),
    };
    next.unwrap_or_else(|_| s.clone())
}

fn check_card_invariants(s: &FlashcardSession) {
    assert!(s.cursor().index() < s.cards().len());
    assert!(s.correct().is_disjoint(&s.incorrect()));
    let union: std::collections::BTreeSet<_> = s.correct().union(&s.incorrect()).copied().collect();
    assert_eq!(union, s.studied());
    assert!(s.progress().percent <= 100);
    if let Ok(summary) = s.summary() {
        assert!(summary.accuracy <= 100);
        if summary.studied == 0 {
            assert_eq!(summary.accuracy, 0);
        }
    }
}

#[test]
fn flashcard_invariants_hold_for_every_short_sequence() {
    let start = FlashcardSession::start(cards(3)).unwrap();
    let mut frontier = vec![start];
    for _ in 0..5 {
        let mut next_frontier = Vec::with_capacity(frontier.len() * CARD_OPS.len());
        for state in &frontier {
            for op in CARD_OPS {
                let next = apply_card(state, op);
                check_card_invariants(&next);
                if state.is_completed() && !matches!(op, CardOp::Restart) {
                    assert_eq!(&next, state, "completed session changed on {op:?}");
                }
                next_frontier.push(next);
            }
        }
        frontier = next_frontier;
    }
}

#[derive(Clone, Copy, Debug)]
enum McqOp {
    Select(usize),
    Advance,
    Retreat,
    Tick,
    Submit,
}

const MCQ_OPS: [McqOp; 7] = [
    McqOp::Select(0),
    McqOp::Select(2),
    McqOp::Select(3),
    McqOp::Advance,
    McqOp::Retreat,
    McqOp::Tick,
    McqOp::Submit,
];

fn apply_mcq(s: &McqSession, op: McqOp) -> McqSession {
    let next = match op {
        McqOp::Select(option) => s.select_current(option),
        McqOp::Advance => s.advance(),
        McqOp::Retreat => s.retreat(),
        McqOp::Tick => Ok(s.tick()),
        McqOp::Submit => Ok(s.submit()),
    };
    next.unwrap_or_else(|_| s.clone())
}

#[test]
fn mcq_invariants_hold_for_every_short_sequence() {
    let start = McqSession::start(questions(3), 3).unwrap();
    let mut frontier = vec![start];
    for _ in 0..5 {
        let mut next_frontier = Vec::new();
        for state in &frontier {
            for op in MCQ_OPS {
                let next = apply_mcq(state, op);
                assert!(next.cursor().index() < next.questions().len());
                assert!(next.responses().len() <= next.questions().len());
                assert!(next.remaining_secs() <= state.remaining_secs());
                if next.remaining_secs() == 0 {
                    assert!(next.is_completed());
                }
                if state.is_completed() {
                    assert_eq!(next.responses(), state.responses());
                    assert_eq!(next.phase(), state.phase());
                }
                match next.score() {
                    Ok(score) => {
                        assert!(score <= 100);
                        if next.responses().is_empty() {
                            assert_eq!(score, 0);
                        }
                    }
                    Err(_) => assert_eq!(next.phase(), SessionPhase::InProgress),
                }
                next_frontier.push(next);
            }
        }
        frontier = next_frontier;
    }
}
