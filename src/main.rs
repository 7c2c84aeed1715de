//! Readalong demo host
//!
//! Reads text aloud with the platform speech engine and renders the
//! coordinator's progress in the terminal: a progress bar and the text with
//! the current word highlighted, or one JSON object per update with `--json`.
//!
//! Usage: `readalong [--debug] [--json] [TEXT...]` (text from stdin if none)

use log::{debug, error, info};
use readalong::config::Config;
use readalong::speech::create_engine;
use readalong::{Color, Result, SpeechCoordinator, SpeechListener, StyledText};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::process;
use std::thread;
use std::time::Duration;

/// How often engine events are pumped
const PUMP_INTERVAL: Duration = Duration::from_millis(20);

/// Width of the progress bar in cells
const BAR_WIDTH: usize = 30;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");
    let json = args.iter().any(|arg| arg == "--json");

    init_logging(debug_mode);

    let words: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|arg| !matches!(*arg, "--debug" | "-d" | "--json"))
        .collect();

    if let Err(e) = run(&words, json) {
        error!("Fatal error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// `--debug` logs everything to readalong.log; otherwise only errors reach stderr
fn init_logging(debug_mode: bool) {
    if !debug_mode {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
        return;
    }

    match OpenOptions::new()
        .create(true)
        .append(true)
        .open("readalong.log")
    {
        Ok(log_file) => {
            env_logger::Builder::new()
                .filter_level(log::LevelFilter::Debug)
                .target(env_logger::Target::Pipe(Box::new(log_file)))
                .init();
            info!("Readalong {} starting, logging to readalong.log", readalong::VERSION);
        }
        Err(e) => {
            eprintln!("Warning: cannot open readalong.log ({}), logging warnings to stderr", e);
            env_logger::Builder::new()
                .filter_level(log::LevelFilter::Warn)
                .init();
        }
    }
}

fn run(words: &[&str], json: bool) -> Result<()> {
    let text = if words.is_empty() {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        input.trim_end_matches('\n').to_string()
    } else {
        words.join(" ")
    };

    let config = Config::load();
    info!("Configuration loaded from {:?}", config.path());

    let engine = create_engine()?;
    let mut coordinator = SpeechCoordinator::with_config(engine, &config);

    let listener: Box<dyn SpeechListener> = if json {
        Box::new(JsonListener)
    } else {
        Box::new(TerminalListener::new(coordinator.highlight_color()))
    };
    coordinator.set_listener(listener);
    coordinator.set_text(text);
    coordinator.speak();

    loop {
        let handled = coordinator.pump();
        if handled > 0 {
            debug!("Handled {} engine events", handled);
        }
        if !coordinator.is_speaking() {
            break;
        }
        thread::sleep(PUMP_INTERVAL);
    }

    if !json {
        println!();
    }
    info!("Finished speaking");
    Ok(())
}

/// Renders progress as an ANSI-colored line in the terminal
struct TerminalListener {
    highlight: Color,
}

impl TerminalListener {
    fn new(highlight: Color) -> Self {
        Self { highlight }
    }

    fn render(&self, ratio: f32, styled: &StyledText) -> String {
        let filled = ((ratio * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
        let mut line = format!(
            "\r\x1b[2K[{}{}] {:3.0}% ",
            "#".repeat(filled),
            ".".repeat(BAR_WIDTH - filled),
            ratio * 100.0
        );

        for run in styled.runs() {
            // Paragraph breaks would scroll the line away
            let text = styled.substring(run.range.clone()).replace('\n', " / ");
            match run.style.color {
                Some(color) if color == self.highlight => {
                    line.push_str(&format!(
                        "\x1b[1;38;2;{};{};{}m{}\x1b[0m",
                        color.r, color.g, color.b, text
                    ));
                }
                _ => line.push_str(&text),
            }
        }
        line
    }
}

impl SpeechListener for TerminalListener {
    fn on_start(&mut self) {
        debug!("Segment started");
    }

    fn on_finish(&mut self) {
        debug!("Segment finished");
    }

    fn on_progress(&mut self, ratio: f32, styled: &StyledText) {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{}", self.render(ratio, styled));
        let _ = stdout.flush();
    }
}

/// One JSON object per update
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Update<'a> {
    Start,
    Finish,
    Progress { ratio: f32, text: &'a StyledText },
}

struct JsonListener;

impl JsonListener {
    fn encode(update: &Update<'_>) -> Result<String> {
        Ok(serde_json::to_string(update)?)
    }

    fn emit(&self, update: &Update<'_>) {
        match Self::encode(update) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to encode update: {}", e),
        }
    }
}

impl SpeechListener for JsonListener {
    fn on_start(&mut self) {
        self.emit(&Update::Start);
    }

    fn on_finish(&mut self) {
        self.emit(&Update::Finish);
    }

    fn on_progress(&mut self, ratio: f32, styled: &StyledText) {
        self.emit(&Update::Progress {
            ratio,
            text: styled,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readalong::styled::{Style, BASE_FONT};

    #[test]
    fn test_render_highlights_word() {
        let mut styled = StyledText::with_font("Hello World", BASE_FONT.clone());
        styled.set_style(6..11, Style::new(Color::ORANGE, BASE_FONT.clone()));

        let line = TerminalListener::new(Color::ORANGE).render(0.5, &styled);
        assert!(line.contains(" 50% Hello "));
        assert!(line.contains("\x1b[1;38;2;255;165;0mWorld\x1b[0m"));
        assert!(line.contains(&format!("[{}{}]", "#".repeat(15), ".".repeat(15))));
    }

    #[test]
    fn test_render_joins_paragraphs() {
        let styled = StyledText::plain("one\ntwo");
        let line = TerminalListener::new(Color::ORANGE).render(0.0, &styled);
        assert!(line.ends_with("one / two"));
    }

    #[test]
    fn test_json_update_shape() {
        let styled = StyledText::plain("hi");
        let value = serde_json::to_value(Update::Progress {
            ratio: 0.5,
            text: &styled,
        })
        .expect("encode update");
        assert_eq!(value["event"], "progress");
        assert_eq!(value["ratio"], 0.5);
        assert_eq!(value["text"]["text"], "hi");
    }

    #[test]
    fn test_json_lifecycle_lines() {
        assert_eq!(
            JsonListener::encode(&Update::Start).expect("encode"),
            r#"{"event":"start"}"#
        );
        assert_eq!(
            JsonListener::encode(&Update::Finish).expect("encode"),
            r#"{"event":"finish"}"#
        );
    }
}
