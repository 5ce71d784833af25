use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use storydeck_common::{Deck, SlideRecord};
use storydeck_core::{NavCommand, Navigator};
use tokio::time::{sleep, Duration};

const CONTROLS: &str = "← → (h l / j k / space) | Home/End | q quit";

pub struct DeckPreview {
    deck: Deck,
    nav: Navigator,
    should_quit: bool,
}

impl DeckPreview {
    pub fn new(deck: Deck) -> Self {
        let nav = Navigator::for_deck(&deck);
        Self {
            deck,
            nav,
            should_quit: false,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.ui(f))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key.code);
                    }
                }
            }

            if self.should_quit {
                return Ok(());
            }

            sleep(Duration::from_millis(16)).await;
        }
    }

    pub fn handle_key_event(&mut self, key: KeyCode) {
        let command = match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('j') | KeyCode::Char(' ') => {
                NavCommand::Next
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('k') => NavCommand::Previous,
            KeyCode::Home => NavCommand::First,
            KeyCode::End => NavCommand::Last,
            _ => return,
        };
        self.nav.apply(command);
        tracing::debug!(position = ?self.nav.position(), "navigated");
    }

    fn ui(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(f.area());

        let header = Paragraph::new(format!(
            "{} ({})",
            self.deck.topic(),
            self.nav.progress_label()
        ))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title("Story Deck"));
        f.render_widget(header, chunks[0]);

        let body = match self.nav.current(&self.deck) {
            Some(slide) => slide_text(slide),
            None => Text::from(vec![
                Line::styled(
                    "No slides were generated.",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Line::from(""),
                Line::from("The model reply could not be turned into a deck. Try again or rephrase the topic."),
            ]),
        };
        let slide = Paragraph::new(body)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(slide, chunks[1]);

        let footer = Paragraph::new(CONTROLS)
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(footer, chunks[2]);
    }
}

fn slide_text(slide: &SlideRecord) -> Text<'_> {
    let mut lines = vec![
        Line::styled(
            slide.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
    ];
    lines.extend(
        slide
            .bullets
            .iter()
            .map(|b| Line::from(vec![Span::raw("• "), Span::raw(b.as_str())])),
    );
    lines.push(Line::from(""));
    lines.push(Line::styled(image_status(slide), Style::default().fg(Color::DarkGray)));
    Text::from(lines)
}

fn image_status(slide: &SlideRecord) -> String {
    match &slide.image {
        Some(image) => format!(
            "[image: {}, {} KB]",
            image.mime_type,
            image.data.len().div_ceil(1024)
        ),
        None => "[no image]".to_string(),
    }
}
