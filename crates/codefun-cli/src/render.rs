//! Terminal rendering of quiz events.

use std::io::Write;

use codefun_core::timer::{format_mm_ss, CountdownKind};
use codefun_core::{AnswerOutcome, Event, LevelSummary, LevelTimes, Theme};

const RESET: &str = "\x1b[0m";

pub struct Renderer {
    theme: Theme,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    fn good(&self) -> &'static str {
        match self.theme {
            Theme::Light => "\x1b[32m",
            Theme::Dark => "\x1b[92m",
        }
    }

    fn bad(&self) -> &'static str {
        match self.theme {
            Theme::Light => "\x1b[31m",
            Theme::Dark => "\x1b[91m",
        }
    }

    fn accent(&self) -> &'static str {
        match self.theme {
            Theme::Light => "\x1b[34m",
            Theme::Dark => "\x1b[96m",
        }
    }

    pub fn levels(&self, levels: &[LevelSummary], times: &LevelTimes) {
        println!();
        println!("{}Levels{RESET}", self.accent());
        for summary in levels {
            let timer = times
                .seconds_for(&summary.level)
                .map(|s| format!(", {s}s per question"))
                .unwrap_or_default();
            println!(
                "  {:<10} {} questions{timer}",
                summary.level, summary.question_count
            );
        }
    }

    pub fn prompt(&self, text: &str) {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }

    /// Blocking notice for recoverable problems.
    pub fn notice(&self, message: &dyn std::fmt::Display) {
        println!("{}! {message}{RESET}", self.bad());
    }

    pub fn render_all(&self, events: &[Event]) {
        for event in events {
            self.render(event);
        }
    }

    pub fn render(&self, event: &Event) {
        match event {
            Event::QuizStarted { level, question_count, .. } => {
                println!();
                println!("{}Level {level}{RESET} ({question_count} questions)", self.accent());
            }
            Event::QuestionPresented {
                index,
                total,
                question,
                options,
                progress_pct,
                score,
            } => {
                println!();
                let score = score.map(|s| format!("  Score: {s}")).unwrap_or_default();
                println!("Question {} / {total}  [{progress_pct:>3}%]{score}", index + 1);
                println!("{question}");
                for (i, option) in options.iter().enumerate() {
                    println!("  {}) {option}", i + 1);
                }
                self.prompt("> ");
            }
            Event::TimerTicked { timer, remaining_secs } => {
                // Only announce round numbers and the final seconds.
                if *remaining_secs > 0 && (*remaining_secs <= 5 || remaining_secs % 10 == 0) {
                    let label = match timer {
                        CountdownKind::PerQuestion => "time left",
                        CountdownKind::Total => "quiz time left",
                    };
                    println!("  [{label} {}]", format_mm_ss(*remaining_secs));
                }
            }
            Event::QuestionTimedOut { .. } => {
                println!("{}  Time's up for this question.{RESET}", self.bad());
            }
            Event::AnswerRevealed {
                selected,
                correct_index,
                outcome,
                ..
            } => match (outcome, correct_index) {
                (Some(AnswerOutcome::Correct), _) => println!("{}  Correct!{RESET}", self.good()),
                (Some(_), Some(correct)) => println!(
                    "{}  Wrong.{RESET} The answer was {}.",
                    self.bad(),
                    correct + 1
                ),
                _ => match selected {
                    Some(sel) => println!("  Answer {} saved.", sel + 1),
                    None => println!("  No answer."),
                },
            },
            Event::QuizCompleted { outcome, .. } => {
                println!();
                let title = if outcome.time_up { "Time's up!" } else { "Result!" };
                println!("{}{title}{RESET}", self.accent());
                println!("You got {} of {} questions.", outcome.score, outcome.total);
                println!("{}%", outcome.percent);
            }
            Event::ResultRecorded { entry, best_score } => {
                println!("Best score (level {}): {best_score}", entry.level);
            }
            Event::RecordFailed { message, .. } => {
                self.notice(&format!("result not saved: {message}"));
            }
            Event::QuizAborted { .. } => println!("Quiz abandoned."),
            Event::QuizRetried { .. } => println!("Starting over with the same questions."),
            Event::LevelSelected { .. } | Event::StateSnapshot { .. } => {}
        }
    }
}
