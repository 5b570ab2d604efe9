//! End-to-end quiz runs against a virtual clock.

use codefun_core::error::{CoreError, QuizError};
use codefun_core::session::REVEAL_DELAY_MS;
use codefun_core::timer::{ManualClock, TimerQueue};
use codefun_core::{
    Event, FeedbackMode, KeyValueStore, LevelTimes, MemoryStore, QuestionBank, QuizApp,
    QuizOutcome, QuizSession, ResultRecorder, SessionState, StartOptions, StorageError,
    TimerMode,
};
use indexmap::IndexMap;

type TestApp = QuizApp<TimerQueue<ManualClock>, MemoryStore>;

const BANK: &str = r##"{
    "A": [
        { "question": "Which keyword declares a variable in JavaScript?", "options": ["let", "int", "dim"], "answerIndex": 0 },
        { "question": "What does HTML stand for?", "options": ["Hyper Trainer", "HyperText Markup Language"], "answerIndex": 1 },
        { "question": "Which symbol starts a Python comment?", "options": ["//", "#", "--"], "answerIndex": 1 }
    ],
    "B": [
        { "question": "2 + 3?", "options": ["5", "6"], "answerIndex": 0 },
        { "question": "10 / 2?", "options": ["4", "5"], "answerIndex": 1 },
        { "question": "3 * 3?", "options": ["9", "6"], "answerIndex": 0 },
        { "question": "7 - 4?", "options": ["2", "3"], "answerIndex": 1 }
    ],
    "Empty": []
}"##;

fn app(times: &[(&str, u32)]) -> (ManualClock, TestApp) {
    let clock = ManualClock::new();
    let bank = QuestionBank::from_json_str(BANK, "test").unwrap();
    let times = LevelTimes::new(
        times
            .iter()
            .map(|(level, secs)| (level.to_string(), *secs))
            .collect::<IndexMap<_, _>>(),
    );
    let session = QuizSession::new(TimerQueue::new(clock.clone()));
    let app = QuizApp::new(bank, times, session, ResultRecorder::new(MemoryStore::new())).with_seed(99);
    (clock, app)
}

fn options(count: u32, timer_mode: TimerMode, feedback_mode: FeedbackMode) -> StartOptions {
    StartOptions {
        question_count: count,
        timer_mode,
        feedback_mode,
    }
}

fn answer(app: &mut TestApp, clock: &ManualClock, correct: bool) -> Vec<Event> {
    let q = app.session().current_question().unwrap();
    let choice = if correct {
        q.answer_index
    } else {
        (q.answer_index + 1) % q.options.len()
    };
    let mut events = app.submit_answer(choice).unwrap();
    clock.advance(REVEAL_DELAY_MS);
    events.extend(app.pump().unwrap());
    events
}

fn completed(events: &[Event]) -> Option<&QuizOutcome> {
    events.iter().find_map(|e| match e {
        Event::QuizCompleted { outcome, .. } => Some(outcome),
        _ => None,
    })
}

#[test]
fn short_pool_caps_count_and_scores_instantly() {
    let (clock, mut app) = app(&[]);
    app.select_level("A").unwrap();
    app.start(options(5, TimerMode::None, FeedbackMode::Instant)).unwrap();
    assert_eq!(app.session().questions().len(), 3);

    answer(&mut app, &clock, true);
    answer(&mut app, &clock, false);
    let events = answer(&mut app, &clock, true);

    let outcome = completed(&events).expect("quiz should complete");
    assert_eq!(outcome.score, 2);
    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.percent, 67);
    assert!(!outcome.time_up);
    assert_eq!(app.session().state(), SessionState::Completed);

    let recorded = events
        .iter()
        .find_map(|e| match e {
            Event::ResultRecorded { entry, best_score } => Some((entry.clone(), *best_score)),
            _ => None,
        })
        .expect("result should be recorded");
    assert_eq!(recorded.1, 2);

    let history = app.recorder().history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], recorded.0);
    assert_eq!(
        (history[0].level.as_str(), history[0].score, history[0].total, history[0].percent),
        ("A", 2, 3, 67)
    );
}

#[test]
fn total_budget_expiry_completes_with_time_up() {
    let (clock, mut app) = app(&[("A", 10)]);
    app.select_level("A").unwrap();
    app.start(options(2, TimerMode::Total, FeedbackMode::Instant)).unwrap();
    assert_eq!(app.session().remaining_total_secs(), 20);
    assert!(!app.session().is_per_question_timer_armed());

    clock.advance(19_999);
    let events = app.pump().unwrap();
    assert!(completed(&events).is_none());

    clock.advance(1);
    let events = app.pump().unwrap();
    let outcome = completed(&events).expect("time should run out");
    assert!(outcome.time_up);
    assert_eq!(outcome.score, 0);
    assert_eq!(outcome.total, 2);
    assert_eq!(app.recorder().history().unwrap().len(), 1);
}

#[test]
fn deferred_mode_scores_at_the_end() {
    let (clock, mut app) = app(&[("B", 5)]);
    app.select_level("B").unwrap();
    app.start(options(4, TimerMode::PerQuestion, FeedbackMode::Deferred)).unwrap();

    let first = answer(&mut app, &clock, true);
    assert!(first.iter().any(|e| matches!(
        e,
        Event::AnswerRevealed { outcome: None, correct_index: None, score: None, .. }
    )));
    answer(&mut app, &clock, false);

    // Let the last two questions run out.
    let mut events = Vec::new();
    for _ in 0..2 {
        clock.advance(5_000);
        events.extend(app.pump().unwrap());
        clock.advance(REVEAL_DELAY_MS);
        events.extend(app.pump().unwrap());
    }
    let timeouts = events
        .iter()
        .filter(|e| matches!(e, Event::QuestionTimedOut { .. }))
        .count();
    assert_eq!(timeouts, 2);

    let outcome = completed(&events).expect("quiz should complete");
    assert_eq!(outcome.score, 1);
    assert_eq!(outcome.total, 4);
    assert!(!outcome.time_up);
}

#[test]
fn total_expiry_counts_unreached_questions_as_misses() {
    let (clock, mut app) = app(&[("B", 2)]);
    app.select_level("B").unwrap();
    app.start(options(4, TimerMode::Total, FeedbackMode::Deferred)).unwrap();
    answer(&mut app, &clock, true);
    clock.advance(8_000);
    let events = app.pump().unwrap();
    let outcome = completed(&events).unwrap();
    assert!(outcome.time_up);
    assert_eq!(outcome.score, 1);
}

#[test]
fn retry_reuses_question_order_and_resets() {
    let (clock, mut app) = app(&[("B", 3)]);
    app.select_level("B").unwrap();
    app.start(options(4, TimerMode::Total, FeedbackMode::Instant)).unwrap();
    let order = app.session().questions().to_vec();

    for _ in 0..4 {
        answer(&mut app, &clock, true);
    }
    assert_eq!(app.session().state(), SessionState::Completed);
    assert_eq!(app.session().score(), 4);

    app.retry().unwrap();
    assert_eq!(app.session().state(), SessionState::InProgress);
    assert_eq!(app.session().questions(), order.as_slice());
    assert_eq!(app.session().score(), 0);
    assert_eq!(app.session().remaining_total_secs(), 12);
    assert!(app.session().is_total_timer_armed());
    assert_eq!(app.selected_level(), Some("B"));
}

#[test]
fn start_without_level_is_invalid_configuration() {
    let (_, mut app) = app(&[]);
    let err = app
        .start(options(5, TimerMode::None, FeedbackMode::Instant))
        .unwrap_err();
    assert!(matches!(err, CoreError::Quiz(QuizError::InvalidConfiguration)));
    assert_eq!(app.session().state(), SessionState::Idle);
}

#[test]
fn empty_level_returns_to_level_selection() {
    let (_, mut app) = app(&[]);
    app.select_level("Empty").unwrap();
    let err = app
        .start(options(5, TimerMode::None, FeedbackMode::Instant))
        .unwrap_err();
    assert!(matches!(err, CoreError::Quiz(QuizError::NoQuestionsAvailable { .. })));
    assert_eq!(app.selected_level(), None);
    assert_eq!(app.session().state(), SessionState::Idle);
}

#[test]
fn unknown_level_cannot_be_selected() {
    let (_, mut app) = app(&[]);
    assert!(app.select_level("Z").is_err());
    assert_eq!(app.selected_level(), None);
}

#[test]
fn quit_records_nothing() {
    let (clock, mut app) = app(&[("A", 10)]);
    app.select_level("A").unwrap();
    app.start(options(3, TimerMode::PerQuestion, FeedbackMode::Instant)).unwrap();
    answer(&mut app, &clock, true);
    let events = app.quit();
    assert!(matches!(events[0], Event::QuizAborted { .. }));
    clock.advance(60_000);
    assert!(app.pump().unwrap().is_empty());
    assert!(app.recorder().history().unwrap().is_empty());
    assert_eq!(app.recorder().best("A").unwrap(), 0);
    assert_eq!(app.until_next_wake_ms(), None);
}

#[test]
fn each_completion_records_exactly_one_entry() {
    let (clock, mut app) = app(&[("A", 1)]);
    app.select_level("A").unwrap();
    app.start(options(3, TimerMode::Total, FeedbackMode::Instant)).unwrap();
    answer(&mut app, &clock, true);
    answer(&mut app, &clock, true);
    // Answer the last question 300 ms before the budget ends so the
    // reveal pause and the countdown land together.
    clock.advance(3_000 - 1_400 - 700);
    let mut events = app.submit_answer(0).unwrap();
    clock.advance(REVEAL_DELAY_MS);
    events.extend(app.pump().unwrap());
    clock.advance(5_000);
    events.extend(app.pump().unwrap());

    let completions = events
        .iter()
        .filter(|e| matches!(e, Event::QuizCompleted { .. }))
        .count();
    assert_eq!(completions, 1);
    assert_eq!(app.recorder().history().unwrap().len(), 1);
}

/// Reads succeed, every write reports a locked database.
struct LockedStore;

impl KeyValueStore for LockedStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Locked)
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Locked)
    }
}

#[test]
fn storage_failure_keeps_the_completion_events() {
    let clock = ManualClock::new();
    let bank = QuestionBank::from_json_str(BANK, "test").unwrap();
    let session = QuizSession::new(TimerQueue::new(clock.clone()));
    let mut app = QuizApp::new(
        bank,
        LevelTimes::new(IndexMap::new()),
        session,
        ResultRecorder::new(LockedStore),
    )
    .with_seed(99);
    app.select_level("A").unwrap();
    app.start(options(1, TimerMode::None, FeedbackMode::Instant)).unwrap();

    let correct = app.session().current_question().unwrap().answer_index;
    let revealed = app.submit_answer(correct).unwrap();
    assert!(matches!(revealed[0], Event::AnswerRevealed { .. }));

    clock.advance(REVEAL_DELAY_MS);
    let events = app.pump().expect("pump should not fail on storage errors");
    let position = events
        .iter()
        .position(|e| matches!(e, Event::QuizCompleted { .. }))
        .expect("completion should be delivered");
    match &events[position + 1] {
        Event::RecordFailed { level, message } => {
            assert_eq!(level, "A");
            assert!(message.contains("locked"), "{message}");
        }
        other => panic!("Expected RecordFailed, got {other:?}"),
    }
    assert!(!events.iter().any(|e| matches!(e, Event::ResultRecorded { .. })));
    assert_eq!(app.session().state(), SessionState::Completed);
    assert_eq!(app.session().outcome().unwrap().score, 1);

    let retried = app.retry().unwrap();
    assert!(matches!(retried[0], Event::QuizRetried { .. }));
    assert_eq!(app.session().state(), SessionState::InProgress);
}
