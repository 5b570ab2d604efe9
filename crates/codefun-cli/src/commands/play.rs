use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use codefun_core::storage::ThemePreference;
use codefun_core::timer::{SystemClock, TimerQueue};
use codefun_core::{
    Config, CoreError, Event, FeedbackMode, QuizApp, QuizSession, ResultRecorder, SessionState,
    SqliteStore, StartOptions, TimerMode,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::load_bank;
use crate::render::Renderer;

type App = QuizApp<TimerQueue<SystemClock>, SqliteStore>;

#[derive(Args)]
pub struct PlayArgs {
    /// Start this level right away
    #[arg(long)]
    pub level: Option<String>,
    /// Number of questions
    #[arg(long)]
    pub count: Option<u32>,
    /// Timer mode: none, per or total
    #[arg(long)]
    pub timer: Option<TimerMode>,
    /// Feedback mode: instant or deferred
    #[arg(long)]
    pub feedback: Option<FeedbackMode>,
    /// Question document (defaults to the configured path)
    #[arg(long)]
    pub questions: Option<PathBuf>,
    /// Shuffle seed for a reproducible question order
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Home,
    Quiz,
    Result,
}

pub fn run(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let bank = load_bank(&config, args.questions.as_deref())?;

    let store = SqliteStore::open()?;
    let theme = ThemePreference::new(&store).get()?;
    let renderer = Renderer::new(theme);

    let mut options = StartOptions::from(&config.quiz);
    if let Some(count) = args.count {
        options.question_count = count;
    }
    if let Some(timer) = args.timer {
        options.timer_mode = timer;
    }
    if let Some(feedback) = args.feedback {
        options.feedback_mode = feedback;
    }

    let session = QuizSession::new(TimerQueue::new(SystemClock::new()))
        .with_reveal_delay(config.quiz.reveal_delay_ms);
    let mut app = QuizApp::new(bank, config.levels.clone(), session, ResultRecorder::new(store));
    if let Some(seed) = args.seed {
        app = app.with_seed(seed);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(play_loop(&mut app, &renderer, options, args.level))?;
    Ok(())
}

async fn play_loop(
    app: &mut App,
    renderer: &Renderer,
    options: StartOptions,
    level: Option<String>,
) -> Result<(), CoreError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Some(level) = level {
        let started = app
            .select_level(&level)
            .and_then(|mut events| {
                events.extend(app.start(options)?);
                Ok(events)
            });
        show(renderer, started)?;
    }
    let mut phase = phase_of(app);
    prompt_for(app, renderer, phase);

    loop {
        let wait = app.until_next_wake_ms();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                let input = line.trim();
                match phase {
                    Phase::Home => {
                        if input.is_empty() {
                            return Ok(());
                        }
                        let level = resolve_level(app, input);
                        let started = app.select_level(&level).and_then(|mut events| {
                            events.extend(app.start(options)?);
                            Ok(events)
                        });
                        show(renderer, started)?;
                    }
                    Phase::Quiz => match QuizInput::parse(input) {
                        QuizInput::Ignore => {}
                        QuizInput::Quit => renderer.render_all(&app.quit()),
                        QuizInput::Next => show(renderer, app.advance())?,
                        QuizInput::Answer(option) => show(renderer, app.submit_answer(option))?,
                        QuizInput::Unknown => {
                            renderer.notice(&"enter an option number, n for next or q to quit")
                        }
                    },
                    Phase::Result => match input {
                        "r" => show(renderer, app.retry())?,
                        "h" => renderer.render_all(&app.quit()),
                        "q" => return Ok(()),
                        _ => renderer.notice(&"r to retry, h for levels, q to exit"),
                    },
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(wait.unwrap_or(0))), if wait.is_some() => {
                show(renderer, app.pump())?;
            }
        }

        let next = phase_of(app);
        if next != phase || next == Phase::Home {
            prompt_for(app, renderer, next);
        }
        phase = next;
    }
}

/// One input line while a question is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuizInput {
    Ignore,
    Quit,
    Next,
    /// 0-based option index.
    Answer(usize),
    Unknown,
}

impl QuizInput {
    fn parse(input: &str) -> Self {
        match input.trim() {
            "" => QuizInput::Ignore,
            "q" => QuizInput::Quit,
            "n" => QuizInput::Next,
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => QuizInput::Answer(n - 1),
                _ => QuizInput::Unknown,
            },
        }
    }
}

fn phase_of(app: &App) -> Phase {
    match app.session().state() {
        SessionState::Idle => Phase::Home,
        SessionState::InProgress => Phase::Quiz,
        SessionState::Completed => Phase::Result,
    }
}

fn prompt_for(app: &App, renderer: &Renderer, phase: Phase) {
    match phase {
        Phase::Home => {
            renderer.levels(&app.bank().levels(), app.level_times());
            renderer.prompt("Level (blank to exit): ");
        }
        Phase::Quiz => {}
        Phase::Result => renderer.prompt("[r]etry, [h]ome, [q]uit: "),
    }
}

/// Accept either a level name or its 1-based position in the list.
fn resolve_level(app: &App, input: &str) -> String {
    let levels = app.bank().levels();
    match input.parse::<usize>() {
        Ok(n) if n >= 1 && n <= levels.len() && !app.bank().contains(input) => {
            levels[n - 1].level.clone()
        }
        _ => input.to_string(),
    }
}

/// Render events, turning recoverable quiz errors into notices.
fn show(renderer: &Renderer, result: Result<Vec<Event>, CoreError>) -> Result<(), CoreError> {
    match result {
        Ok(events) => {
            renderer.render_all(&events);
            Ok(())
        }
        Err(CoreError::Quiz(err)) if err.is_recoverable() => {
            renderer.notice(&err);
            Ok(())
        }
        Err(err) => Err(err),
    }
}
