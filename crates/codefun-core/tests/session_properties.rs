use codefun_core::session::REVEAL_DELAY_MS;
use codefun_core::timer::{ManualClock, TimerQueue};
use codefun_core::{
    Event, FeedbackMode, Question, QuizSession, SessionPlan, SessionState, TimerMode,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;

fn pool(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question::new(format!("question {i}"), &["a", "b", "c", "d"], i % 4))
        .collect()
}

fn feedback() -> impl Strategy<Value = FeedbackMode> {
    prop_oneof![Just(FeedbackMode::Instant), Just(FeedbackMode::Deferred)]
}

proptest! {
    /// `None` lets the per-question countdown run out.
    #[test]
    fn completed_score_is_bounded(
        pool_size in 1usize..12,
        requested in 1u32..15,
        answers in proptest::collection::vec(proptest::option::of(0usize..4), 15),
        feedback_mode in feedback(),
        seed in any::<u64>(),
    ) {
        let clock = ManualClock::new();
        let mut session = QuizSession::new(TimerQueue::new(clock.clone()));
        let plan = SessionPlan {
            level: "P".into(),
            question_count: requested,
            timer_mode: TimerMode::PerQuestion,
            feedback_mode,
            time_per_question: 2,
        };
        session.start(plan, &pool(pool_size), &mut Pcg64::seed_from_u64(seed)).unwrap();
        let expected_len = (requested as usize).min(pool_size);
        prop_assert_eq!(session.questions().len(), expected_len);

        let mut completions = 0;
        for answer in answers.iter().take(expected_len) {
            let mut events = match answer {
                Some(option) => session.submit_answer(*option).unwrap(),
                None => {
                    clock.advance(2_000);
                    session.pump()
                }
            };
            clock.advance(REVEAL_DELAY_MS);
            events.extend(session.pump());
            completions += events
                .iter()
                .filter(|e| matches!(e, Event::QuizCompleted { .. }))
                .count();
        }

        prop_assert_eq!(completions, 1);
        prop_assert_eq!(session.state(), SessionState::Completed);
        let outcome = session.outcome().unwrap();
        prop_assert!(outcome.score as usize <= expected_len);
        prop_assert_eq!(outcome.total as usize, expected_len);
    }
}
