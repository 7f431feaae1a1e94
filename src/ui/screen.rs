use ratatui::Frame;

use crate::{ui::SummaryView, App, AppState};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// HUD, arena and key legend, using the App widget
pub struct PlayingScreen;

impl Screen for PlayingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// End-of-session results
pub struct SummaryScreen;

impl Screen for SummaryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        match &app.summary {
            Some(summary) => f.render_widget(SummaryView(summary), f.area()),
            None => f.render_widget(app, f.area()),
        }
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Playing => Box::new(PlayingScreen),
        AppState::Summary => Box::new(SummaryScreen),
    }
}
