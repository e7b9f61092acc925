//! Plain-text screens for the terminal host.

use std::fmt::Write as _;

use services::{DeckStats, ResultDetail, ResultsOverview};
use study_core::model::{Difficulty, ExamTemplate, FlashCard, FlashcardSet, ScoreBand, TestResult};
use study_core::session::{
    CardStatus, FlashcardSession, McqRating, McqSession, Verdict, WrittenSession, word_count,
};
use study_core::time::format_countdown;

/// A session that can draw itself.
pub trait Screen {
    /// The current item with its controls.
    fn screen(&self) -> String;

    /// The completion screen. Empty while the session is running.
    fn summary(&self) -> String;
}

impl Screen for McqSession {
    fn screen(&self) -> String {
        let progress = self.progress();
        let question = self.current_question();
        let selected = self.response(question.id());

        let mut out = format!(
            "Question {} of {}   answered {}/{}   time left {}\n{}\n",
            progress.position,
            progress.total,
            progress.answered,
            progress.total,
            format_countdown(self.remaining_secs()),
            question.prompt()
        );
        for (index, option) in question.options().iter().enumerate() {
            let marker = if selected == Some(index) { '*' } else { ' ' };
            let _ = writeln!(out, " {marker} {}) {option}", index + 1);
        }
        out
    }

    fn summary(&self) -> String {
        let (Ok(score), Ok(review)) = (self.score(), self.review()) else {
            return String::new();
        };
        let correct = review
            .iter()
            .filter(|r| r.verdict == Verdict::Correct)
            .count();
        let mut out = format!(
            "Score {score}% ({}) - {correct} of {} correct\n",
            McqRating::for_score(score).label(),
            review.len()
        );
        for (line, question) in review.iter().zip(self.questions()) {
            let mark = match line.verdict {
                Verdict::Correct => "ok  ",
                Verdict::Incorrect => "miss",
                Verdict::Unanswered => "skip",
            };
            let answer = question.option(line.correct).unwrap_or_default();
            let _ = writeln!(out, " [{mark}] {}", question.prompt());
            let _ = writeln!(out, "        answer: {answer}");
            if !question.explanation().is_empty() {
                let _ = writeln!(out, "        {}", question.explanation());
            }
        }
        out
    }
}

impl Screen for WrittenSession {
    fn screen(&self) -> String {
        let progress = self.progress();
        let question = self.current_question();
        let answer = self.current_answer();

        let mut out = format!(
            "Question {} of {} ({} points, {})   answered {}/{}   time left {}\n{}\n",
            progress.position,
            progress.total,
            question.points(),
            question.expected_length(),
            progress.answered,
            progress.total,
            format_countdown(self.remaining_secs()),
            question.prompt()
        );
        if answer.trim().is_empty() {
            out.push_str("  (no answer yet)\n");
        } else {
            let _ = writeln!(out, "  your answer ({} words): {answer}", word_count(answer));
        }
        out
    }

    fn summary(&self) -> String {
        if !self.is_completed() {
            return String::new();
        }
        let mut out = format!(
            "Submitted {} of {} answers ({} of {} points attempted)\n",
            self.answered_count(),
            self.questions().len(),
            self.answered_points(),
            self.total_points()
        );
        for (line, question) in self.answer_report().iter().zip(self.questions()) {
            let status = if line.answered { "answered" } else { "blank" };
            let _ = writeln!(
                out,
                " [{status}] {} pts, {} words: {}",
                line.points,
                line.words,
                question.prompt()
            );
            if let Some(sample) = question.sample_answer() {
                let _ = writeln!(out, "        sample: {sample}");
            }
        }
        out
    }
}

impl Screen for FlashcardSession {
    fn screen(&self) -> String {
        let progress = self.progress();
        let card = self.current_card();
        let status = match self.status(card.id()) {
            CardStatus::Unseen => "",
            CardStatus::Correct => "   (knew it)",
            CardStatus::Incorrect => "   (missed)",
        };

        let mut out = format!(
            "Card {} of {} [{}]   studied {}/{}{status}\nQ: {}\n",
            progress.position,
            progress.total,
            card.difficulty(),
            progress.answered,
            progress.total,
            card.front()
        );
        if self.is_flipped() {
            let _ = writeln!(out, "A: {}", card.back());
            out.push_str("  y = knew it, x = did not\n");
        } else {
            out.push_str("  f to flip\n");
        }
        out
    }

    fn summary(&self) -> String {
        let Ok(summary) = FlashcardSession::summary(self) else {
            return String::new();
        };
        format!(
            "Session complete: {} correct, {} incorrect, accuracy {}%\n",
            summary.correct, summary.incorrect, summary.accuracy
        )
    }
}

pub fn exam_list(exams: &[ExamTemplate]) -> String {
    let mut out = String::new();
    for exam in exams {
        let _ = write!(
            out,
            "{:>3}  {}  [{}] {} min, {} questions, {}",
            exam.id,
            exam.title,
            exam.kind,
            exam.duration,
            exam.questions,
            exam.difficulty
        );
        if let Some(best) = exam.best_score {
            let _ = write!(out, ", best {best}%");
        }
        out.push('\n');
        if !exam.description.is_empty() {
            let _ = writeln!(out, "     {}", exam.description);
        }
    }
    out
}

pub fn deck_list(decks: &[FlashcardSet], stats: &DeckStats) -> String {
    let mut out = String::new();
    for deck in decks {
        let _ = writeln!(
            out,
            "{:>3}  {} ({})  {}/{} mastered ({}%), {} studied today",
            deck.id,
            deck.title,
            deck.subject,
            deck.mastered_cards,
            deck.card_count,
            deck.mastery_percent(),
            deck.studied_today
        );
    }
    let _ = writeln!(
        out,
        "{} sets, {} cards, {} mastered ({}%), {} studied today",
        stats.sets, stats.total_cards, stats.mastered_cards, stats.mastery_percent, stats.studied_today
    );
    out
}

pub fn card_list(cards: &[FlashCard]) -> String {
    let mut out = String::new();
    for card in cards {
        let mastered = if card.is_mastered() { "  mastered" } else { "" };
        let _ = writeln!(out, "{:>3}  [{}] {}{mastered}", card.id(), card.difficulty(), card.front());
        let _ = writeln!(out, "     {}", card.back());
    }
    if cards.is_empty() {
        out.push_str("no cards match\n");
    }
    out
}

pub fn result_list(results: &[TestResult], overview: &ResultsOverview, subjects: &[String]) -> String {
    let mut out = String::new();
    for result in results {
        let band = if result.pending_grading {
            "ungraded"
        } else {
            result.band().label()
        };
        let _ = writeln!(
            out,
            "{:>3}  {}  {:<9} {:>3}% {:<10} {} ({}), {}/{} in {} min",
            result.id,
            result.completed_at.format("%Y-%m-%d"),
            result.kind.label(),
            result.score,
            band,
            result.title,
            result.subject,
            result.questions_correct,
            result.questions_total,
            result.time_spent.div_ceil(60)
        );
    }
    if results.is_empty() {
        out.push_str("no results yet\n");
    } else {
        let target = if overview.above_target {
            "above target"
        } else {
            "below target"
        };
        let _ = writeln!(
            out,
            "\n{} results, average {}% ({target}), {}h studied",
            overview.count, overview.average_score, overview.total_hours
        );
        if overview.pending_grading > 0 {
            let _ = writeln!(
                out,
                "{} written results await grading and are left out of averages",
                overview.pending_grading
            );
        }
        for kind in &overview.by_kind {
            if let Some(average) = kind.average {
                let _ = writeln!(out, "  {:<16} {:>2} taken, average {average}%", kind.kind.label(), kind.count);
            }
        }
        for subject in &overview.by_subject {
            match subject.average {
                Some(average) => {
                    let _ = writeln!(
                        out,
                        "  {:<16} {:>2} taken, average {average}%",
                        subject.subject, subject.count
                    );
                }
                None => {
                    let _ = writeln!(out, "  {:<16} {:>2} taken, ungraded", subject.subject, subject.count);
                }
            }
        }
    }
    if !subjects.is_empty() {
        let _ = writeln!(out, "subjects: {}", subjects.join(", "));
    }
    out
}

fn difficulty_note(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "basic concepts and fundamental knowledge",
        Difficulty::Medium => "intermediate application and analysis",
        Difficulty::Hard => "advanced problem-solving and synthesis",
    }
}

pub fn result_detail(detail: &ResultDetail) -> String {
    let result = &detail.result;
    let band = detail.band.map_or("ungraded", ScoreBand::label);
    let mut out = format!(
        "{} ({}, {})\ncompleted {}\nscore      {}% ({band})\n",
        result.title,
        result.subject,
        result.kind,
        result.completed_at.format("%Y-%m-%d %H:%M"),
        result.score
    );
    match detail.accuracy_percent {
        Some(accuracy) => {
            let _ = writeln!(
                out,
                "accuracy   {accuracy}% ({} of {} correct)",
                result.questions_correct, result.questions_total
            );
        }
        None => out.push_str("accuracy   -\n"),
    }
    let spent = result.time_spent.div_ceil(60);
    match detail.time_efficiency_percent {
        Some(efficiency) => {
            let _ = writeln!(
                out,
                "time       {spent} of {} min, {efficiency}% to spare",
                result.duration
            );
        }
        None => {
            let _ = writeln!(out, "time       {spent} min");
        }
    }
    let _ = writeln!(
        out,
        "difficulty {}: {}",
        result.difficulty,
        difficulty_note(result.difficulty)
    );
    out
}
