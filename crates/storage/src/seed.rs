//! Built-in sample catalog used when no catalog file is supplied.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use study_core::model::{
    CardId, DeckId, Difficulty, ExamId, ExamKind, ExamTemplate, FlashCard, FlashcardSet,
    McqQuestion, QuestionId, ResultId, ResultKind, TestResult, WrittenQuestion,
};

use crate::catalog::{Catalog, DeckEntry, ExamEntry};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error(transparent)]
    Model(#[from] study_core::Error),

    #[error("invalid seed date {0}")]
    Date(&'static str),
}

impl From<study_core::model::QuestionError> for SeedError {
    fn from(e: study_core::model::QuestionError) -> Self {
        Self::Model(e.into())
    }
}

impl From<study_core::model::CardError> for SeedError {
    fn from(e: study_core::model::CardError) -> Self {
        Self::Model(e.into())
    }
}

fn day(date: &'static str) -> Result<DateTime<Utc>, SeedError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or(SeedError::Date(date))
}

fn options(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// The five-question MCQ bank every MCQ-bearing exam starts with.
///
/// # Errors
///
/// Returns `SeedError::Model` if a built-in question is malformed.
pub fn sample_mcq_questions() -> Result<Vec<McqQuestion>, SeedError> {
    Ok(vec![
        McqQuestion::new(
            QuestionId::new(1),
            "What is the time complexity of searching in a balanced binary search tree?",
            options(&["O(1)", "O(log n)", "O(n)", "O(n log n)"]),
            1,
            "In a balanced BST, the height is log n, so search operations take O(log n) time.",
        )?,
        McqQuestion::new(
            QuestionId::new(2),
            "Which data structure uses LIFO (Last In, First Out) principle?",
            options(&["Queue", "Stack", "Array", "Linked List"]),
            1,
            "Stack follows LIFO principle where the last element added is the first one to be removed.",
        )?,
        McqQuestion::new(
            QuestionId::new(3),
            "What is the worst-case time complexity of QuickSort?",
            options(&["O(n log n)", "O(n²)", "O(n)", "O(log n)"]),
            1,
            "QuickSort has O(n²) worst-case complexity when the pivot is always the smallest or largest element.",
        )?,
        McqQuestion::new(
            QuestionId::new(4),
            "In a hash table, what is the purpose of a hash function?",
            options(&[
                "To sort the data",
                "To map keys to array indices",
                "To encrypt the data",
                "To compress the data",
            ]),
            1,
            "A hash function maps keys to array indices to determine where to store or find data in the hash table.",
        )?,
        McqQuestion::new(
            QuestionId::new(5),
            "Which traversal method visits nodes in a binary tree level by level?",
            options(&["Inorder", "Preorder", "Postorder", "Level-order"]),
            3,
            "Level-order traversal (BFS) visits all nodes at each level before moving to the next level.",
        )?,
    ])
}

/// The five-question written bank.
///
/// # Errors
///
/// Returns `SeedError::Model` if a built-in question is malformed.
pub fn sample_written_questions() -> Result<Vec<WrittenQuestion>, SeedError> {
    Ok(vec![
        WrittenQuestion::new(
            QuestionId::new(1),
            "Explain the concept of dynamic programming and provide an example of a problem that can be solved using this technique. Include the recursive relation and discuss the time complexity improvement.",
            20,
            "300-400 words",
        )?
        .with_sample_answer(
            "Dynamic programming is an optimization technique that solves complex problems by breaking them down into simpler subproblems and storing the results to avoid redundant calculations...",
        ),
        WrittenQuestion::new(
            QuestionId::new(2),
            "Compare and contrast different sorting algorithms (Quick Sort, Merge Sort, Heap Sort). Discuss their time complexities, space complexities, and when you would choose one over the others.",
            25,
            "400-500 words",
        )?,
        WrittenQuestion::new(
            QuestionId::new(3),
            "Describe the process of handling deadlocks in operating systems. What are the four necessary conditions for deadlock? Explain at least two deadlock prevention strategies.",
            20,
            "300-400 words",
        )?,
        WrittenQuestion::new(
            QuestionId::new(4),
            "Design a database schema for a university management system. Include at least 5 entities with their relationships. Explain your normalization decisions and provide sample SQL queries.",
            25,
            "400-500 words",
        )?,
        WrittenQuestion::new(
            QuestionId::new(5),
            "Explain the TCP three-way handshake process. Why is it necessary? What happens if one of the steps fails? Include a diagram or detailed description of the packet exchange.",
            10,
            "200-300 words",
        )?,
    ])
}

/// The five cards every built-in deck is studied with.
///
/// # Errors
///
/// Returns `SeedError::Model` if a built-in card is malformed.
pub fn sample_cards() -> Result<Vec<FlashCard>, SeedError> {
    Ok(vec![
        FlashCard::new(
            CardId::new(1),
            "What is the time complexity of binary search?",
            "O(log n) - Binary search eliminates half of the remaining elements in each step, resulting in logarithmic time complexity.",
            Difficulty::Medium,
        )?,
        FlashCard::new(
            CardId::new(2),
            "Define a stack data structure",
            "A stack is a linear data structure that follows the Last In, First Out (LIFO) principle. Elements are added and removed from the same end called the 'top' of the stack.",
            Difficulty::Easy,
        )?
        .mastered(true),
        FlashCard::new(
            CardId::new(3),
            "What is dynamic programming?",
            "Dynamic programming is an optimization technique that solves complex problems by breaking them down into simpler subproblems and storing the results to avoid redundant calculations.",
            Difficulty::Hard,
        )?,
        FlashCard::new(
            CardId::new(4),
            "Explain the difference between BFS and DFS",
            "BFS (Breadth-First Search) explores nodes level by level using a queue, while DFS (Depth-First Search) explores as far as possible along each branch using a stack or recursion.",
            Difficulty::Medium,
        )?,
        FlashCard::new(
            CardId::new(5),
            "What is a hash collision?",
            "A hash collision occurs when two different keys produce the same hash value, requiring collision resolution techniques like chaining or open addressing.",
            Difficulty::Medium,
        )?
        .mastered(true),
    ])
}

struct ExamSeed {
    id: u64,
    title: &'static str,
    subject: &'static str,
    kind: ExamKind,
    duration: u32,
    questions: u32,
    difficulty: Difficulty,
    description: &'static str,
    last_attempt: Option<&'static str>,
    best_score: Option<u8>,
}

const EXAMS: [ExamSeed; 5] = [
    ExamSeed {
        id: 1,
        title: "Data Structures Fundamentals",
        subject: "Data Structures",
        kind: ExamKind::Mcq,
        duration: 45,
        questions: 30,
        difficulty: Difficulty::Medium,
        description: "Test your knowledge of arrays, linked lists, stacks, and queues",
        last_attempt: Some("2024-01-10"),
        best_score: Some(85),
    },
    ExamSeed {
        id: 2,
        title: "Algorithm Analysis",
        subject: "Algorithms",
        kind: ExamKind::Written,
        duration: 90,
        questions: 5,
        difficulty: Difficulty::Hard,
        description: "Analyze time complexity and solve algorithmic problems",
        last_attempt: None,
        best_score: Some(78),
    },
    ExamSeed {
        id: 3,
        title: "Computer Networks Basics",
        subject: "Networks",
        kind: ExamKind::Mcq,
        duration: 60,
        questions: 40,
        difficulty: Difficulty::Easy,
        description: "OSI model, TCP/IP, and network protocols",
        last_attempt: Some("2024-01-12"),
        best_score: Some(92),
    },
    ExamSeed {
        id: 4,
        title: "Operating Systems Concepts",
        subject: "Operating Systems",
        kind: ExamKind::Mixed,
        duration: 120,
        questions: 25,
        difficulty: Difficulty::Hard,
        description: "Process management, memory allocation, and file systems",
        last_attempt: None,
        best_score: None,
    },
    ExamSeed {
        id: 5,
        title: "Database Design",
        subject: "Databases",
        kind: ExamKind::Written,
        duration: 75,
        questions: 6,
        difficulty: Difficulty::Medium,
        description: "Normalization, ER diagrams, and SQL queries",
        last_attempt: None,
        best_score: Some(88),
    },
];

struct DeckSeed {
    id: u64,
    title: &'static str,
    subject: &'static str,
    card_count: u32,
    studied_today: u32,
    mastered_cards: u32,
    difficulty: Difficulty,
    last_studied: &'static str,
    created: &'static str,
    description: &'static str,
}

const DECKS: [DeckSeed; 5] = [
    DeckSeed {
        id: 1,
        title: "Data Structures Fundamentals",
        subject: "Data Structures",
        card_count: 45,
        studied_today: 12,
        mastered_cards: 32,
        difficulty: Difficulty::Medium,
        last_studied: "2024-01-15",
        created: "2024-01-10",
        description: "Arrays, linked lists, stacks, queues, and basic operations",
    },
    DeckSeed {
        id: 2,
        title: "Algorithm Complexity",
        subject: "Algorithms",
        card_count: 30,
        studied_today: 8,
        mastered_cards: 18,
        difficulty: Difficulty::Hard,
        last_studied: "2024-01-14",
        created: "2024-01-08",
        description: "Big O notation, time and space complexity analysis",
    },
    DeckSeed {
        id: 3,
        title: "Network Protocols",
        subject: "Computer Networks",
        card_count: 38,
        studied_today: 0,
        mastered_cards: 25,
        difficulty: Difficulty::Medium,
        last_studied: "2024-01-12",
        created: "2024-01-05",
        description: "TCP/IP, HTTP, DNS, and network layer protocols",
    },
    DeckSeed {
        id: 4,
        title: "Operating System Concepts",
        subject: "Operating Systems",
        card_count: 52,
        studied_today: 15,
        mastered_cards: 28,
        difficulty: Difficulty::Hard,
        last_studied: "2024-01-15",
        created: "2024-01-03",
        description: "Process management, memory allocation, file systems",
    },
    DeckSeed {
        id: 5,
        title: "Database Normalization",
        subject: "Databases",
        card_count: 25,
        studied_today: 5,
        mastered_cards: 20,
        difficulty: Difficulty::Easy,
        last_studied: "2024-01-13",
        created: "2024-01-07",
        description: "Normal forms, ER diagrams, and database design principles",
    },
];

struct ResultSeed {
    title: &'static str,
    kind: ResultKind,
    subject: &'static str,
    score: u8,
    date: &'static str,
    duration: u32,
    questions_total: u32,
    questions_correct: u32,
    difficulty: Difficulty,
    minutes_spent: u32,
}

const RESULTS: [ResultSeed; 5] = [
    ResultSeed {
        title: "Data Structures Fundamentals",
        kind: ResultKind::Mcq,
        subject: "Data Structures",
        score: 85,
        date: "2024-01-15",
        duration: 45,
        questions_total: 30,
        questions_correct: 26,
        difficulty: Difficulty::Medium,
        minutes_spent: 42,
    },
    ResultSeed {
        title: "Algorithm Analysis",
        kind: ResultKind::Written,
        subject: "Algorithms",
        score: 78,
        date: "2024-01-14",
        duration: 90,
        questions_total: 5,
        questions_correct: 4,
        difficulty: Difficulty::Hard,
        minutes_spent: 87,
    },
    ResultSeed {
        title: "Network Protocols Study Session",
        kind: ResultKind::Flashcard,
        subject: "Computer Networks",
        score: 92,
        date: "2024-01-13",
        duration: 30,
        questions_total: 38,
        questions_correct: 35,
        difficulty: Difficulty::Medium,
        minutes_spent: 28,
    },
    ResultSeed {
        title: "Operating Systems Concepts",
        kind: ResultKind::Mcq,
        subject: "Operating Systems",
        score: 72,
        date: "2024-01-12",
        duration: 60,
        questions_total: 40,
        questions_correct: 29,
        difficulty: Difficulty::Hard,
        minutes_spent: 58,
    },
    ResultSeed {
        title: "Database Design",
        kind: ResultKind::Written,
        subject: "Databases",
        score: 88,
        date: "2024-01-11",
        duration: 75,
        questions_total: 6,
        questions_correct: 5,
        difficulty: Difficulty::Medium,
        minutes_spent: 73,
    },
];

/// Build the sample catalog: five exams, five decks and a short result history.
///
/// Every exam shares the sample banks matching its kind; every deck shares
/// the sample cards.
///
/// # Errors
///
/// Returns `SeedError` if any built-in record is malformed.
pub fn sample_catalog() -> Result<Catalog, SeedError> {
    let mcq = sample_mcq_questions()?;
    let written = sample_written_questions()?;
    let cards = sample_cards()?;

    let mut exams = Vec::with_capacity(EXAMS.len());
    for seed in &EXAMS {
        let last_attempt = seed.last_attempt.map(day).transpose()?;
        let template = ExamTemplate {
            id: ExamId::new(seed.id),
            title: seed.title.to_string(),
            subject: seed.subject.to_string(),
            kind: seed.kind,
            duration: seed.duration,
            questions: seed.questions,
            difficulty: seed.difficulty,
            description: seed.description.to_string(),
            last_attempt,
            best_score: seed.best_score,
        };
        let (mcq_questions, written_questions) = match seed.kind {
            ExamKind::Mcq => (mcq.clone(), Vec::new()),
            ExamKind::Written => (Vec::new(), written.clone()),
            ExamKind::Mixed => (mcq.clone(), written.clone()),
        };
        exams.push(ExamEntry {
            template,
            mcq_questions,
            written_questions,
        });
    }

    let mut decks = Vec::with_capacity(DECKS.len());
    for seed in &DECKS {
        decks.push(DeckEntry {
            set: FlashcardSet {
                id: DeckId::new(seed.id),
                title: seed.title.to_string(),
                subject: seed.subject.to_string(),
                card_count: seed.card_count,
                studied_today: seed.studied_today,
                mastered_cards: seed.mastered_cards,
                difficulty: seed.difficulty,
                last_studied: Some(day(seed.last_studied)?),
                created: day(seed.created)?,
                description: seed.description.to_string(),
            },
            cards: cards.clone(),
        });
    }

    let mut results = Vec::with_capacity(RESULTS.len());
    for (seed, id) in RESULTS.iter().zip(1u64..) {
        results.push(TestResult {
            id: ResultId::new(id),
            title: seed.title.to_string(),
            kind: seed.kind,
            subject: seed.subject.to_string(),
            score: seed.score,
            max_score: 100,
            completed_at: day(seed.date)?,
            duration: seed.duration,
            questions_total: seed.questions_total,
            questions_correct: seed.questions_correct,
            difficulty: seed.difficulty,
            time_spent: seed.minutes_spent * 60,
            pending_grading: false,
        });
    }

    Ok(Catalog {
        exams,
        decks,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_catalog_is_valid() {
        let catalog = sample_catalog().unwrap();
        catalog.validate().unwrap();
        assert_eq!(catalog.exams.len(), 5);
        assert_eq!(catalog.decks.len(), 5);
        assert_eq!(catalog.results.len(), 5);
    }

    #[test]
    fn mixed_exam_carries_both_banks() {
        let catalog = sample_catalog().unwrap();
        let mixed = catalog
            .exams
            .iter()
            .find(|e| e.template.kind == ExamKind::Mixed)
            .unwrap();
        assert_eq!(mixed.mcq_questions.len(), 5);
        assert_eq!(mixed.written_questions.len(), 5);

        let written = &catalog.exams[1];
        assert!(written.mcq_questions.is_empty());
        assert_eq!(
            written.written_questions.iter().map(WrittenQuestion::points).sum::<u32>(),
            100
        );
    }

    #[test]
    fn seed_dates_are_midnight_utc() {
        let date = day("2024-01-15").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-01-15T00:00:00+00:00");
        assert!(matches!(day("2024-13-40"), Err(SeedError::Date(_))));
    }
}
