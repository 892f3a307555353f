use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::TableState;

use crate::config::{DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_TOP_N};
use crate::error::Result;
use crate::model::AnalyticsResult;
use crate::query::Query;
use crate::report::Report;

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

#[derive(Debug, Default)]
pub enum QueryState {
    #[default]
    Idle,
    Loading(Query),
    Success(Box<AnalyticsResult>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    InputFile,
    OutputDir,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::InputFile => "インプットファイル",
            Field::OutputDir => "アウトプット先",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editing {
    pub field: Field,
    pub buffer: String,
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Run(Query),
    Quit,
}

pub struct App {
    pub api_base: String,
    pub top_n: u32,
    pub input_file: String,
    pub output_dir: String,
    pub editing: Option<Editing>,
    pub state: QueryState,
    pub last_query: Option<Query>,
    pub last_update: Option<DateTime<Local>>,
    pub table_state: TableState,
    pub running: bool,
    generation: u64,
    ticks: usize,
}

impl App {
    pub fn new(api_base: &str) -> Self {
        Self {
            api_base: api_base.to_string(),
            top_n: DEFAULT_TOP_N,
            input_file: DEFAULT_INPUT_FILE.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            editing: None,
            state: QueryState::Idle,
            last_query: None,
            last_update: None,
            table_state: TableState::default(),
            running: true,
            generation: 0,
            ticks: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, QueryState::Loading(_))
    }

    pub fn result(&self) -> Option<&AnalyticsResult> {
        match &self.state {
            QueryState::Success(result) => Some(&**result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            QueryState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn report(&self) -> Option<Report> {
        self.result()
            .map(|result| Report::build(result, &self.api_base))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start `query`: drop any previous result or error and return the
    /// generation its completion must present to [`App::finish`].
    pub fn begin(&mut self, query: Query) -> u64 {
        self.generation += 1;
        self.state = QueryState::Loading(query);
        self.last_query = Some(query);
        self.table_state = TableState::default();
        tracing::debug!(generation = self.generation, ?query, "query started");
        self.generation
    }

    /// Store the outcome of the query started as `generation`.
    ///
    /// Returns false and leaves state untouched when a newer query has
    /// started since.
    pub fn finish(&mut self, generation: u64, outcome: Result<AnalyticsResult>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                latest = self.generation,
                "discarding stale query result"
            );
            return false;
        }

        match outcome {
            Ok(result) => {
                tracing::info!(usecase = result.usecase(), "query completed");
                self.state = QueryState::Success(Box::new(result));
            }
            Err(e) => {
                tracing::warn!("query failed: {}", e);
                self.state = QueryState::Failed(e.display_message());
            }
        }
        self.last_update = Some(Local::now());
        true
    }

    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    pub fn spinner(&self) -> char {
        SPINNER[self.ticks % SPINNER.len()]
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if self.editing.is_some() {
            self.handle_edit_key(key);
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('1') => self.trigger(Query::CustomerSalesRanking { top_n: self.top_n }),
            KeyCode::Char('2') => self.trigger(Query::PopularProductsRanking { top_n: self.top_n }),
            KeyCode::Char('3') => self.trigger(Query::HourlySalesTrend),
            KeyCode::Char('r') => match self.last_query {
                Some(query) => self.trigger(query),
                None => Action::None,
            },
            KeyCode::Char('i') => {
                self.start_editing(Field::InputFile);
                Action::None
            }
            KeyCode::Char('o') => {
                self.start_editing(Field::OutputDir);
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_previous();
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                Action::None
            }
            _ => Action::None,
        }
    }

    // Triggers are disabled while a query is loading.
    fn trigger(&self, query: Query) -> Action {
        if self.is_loading() {
            Action::None
        } else {
            Action::Run(query)
        }
    }

    fn start_editing(&mut self, field: Field) {
        let buffer = match field {
            Field::InputFile => self.input_file.clone(),
            Field::OutputDir => self.output_dir.clone(),
        };
        self.editing = Some(Editing { field, buffer });
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let Some(editing) = self.editing.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(c) => editing.buffer.push(c),
            KeyCode::Backspace => {
                editing.buffer.pop();
            }
            KeyCode::Enter => {
                if let Some(Editing { field, buffer }) = self.editing.take() {
                    match field {
                        Field::InputFile => self.input_file = buffer,
                        Field::OutputDir => self.output_dir = buffer,
                    }
                }
            }
            KeyCode::Esc => self.editing = None,
            _ => {}
        }
    }

    fn row_count(&self) -> usize {
        self.result().map(AnalyticsResult::row_count).unwrap_or(0)
    }

    pub fn select_next(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => i.checked_sub(1).unwrap_or(len - 1),
            None => 0,
        };
        self.table_state.select(Some(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::model::{ResultKind, fixtures};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new("http://localhost:8000")
    }

    #[test]
    fn starts_idle() {
        let app = app();
        assert!(matches!(app.state, QueryState::Idle));
        assert!(app.result().is_none());
        assert!(app.error().is_none());
        assert_eq!(app.input_file, "./onlineRetail.xlsx");
        assert_eq!(app.output_dir, "./output");
    }

    #[test]
    fn success_replaces_previous_result_and_error() {
        let mut app = app();

        let generation = app.begin(Query::HourlySalesTrend);
        assert!(app.is_loading());
        assert!(app.finish(generation, Ok(fixtures::hourly_trend())));
        assert_eq!(app.result().unwrap().kind(), ResultKind::HourlySalesTrend);

        let generation = app.begin(Query::customer_sales_ranking());
        assert!(app.result().is_none());
        assert!(app.finish(
            generation,
            Err(AnalyticsError::Transport("connection refused".to_string()))
        ));
        assert_eq!(app.error(), Some("connection refused"));
        assert!(app.result().is_none());

        let generation = app.begin(Query::customer_sales_ranking());
        assert!(app.error().is_none());
        assert!(app.finish(generation, Ok(fixtures::customer_ranking())));
        assert!(app.error().is_none());
        assert_eq!(
            app.result().unwrap().kind(),
            ResultKind::CustomerSalesRanking
        );
        assert!(app.last_update.is_some());
    }

    #[test]
    fn service_detail_is_shown() {
        let mut app = app();
        let generation = app.begin(Query::popular_products_ranking());
        app.finish(
            generation,
            Err(AnalyticsError::Service {
                status: 404,
                detail: Some("データファイルが見つかりません".to_string()),
            }),
        );
        assert_eq!(app.error(), Some("データファイルが見つかりません"));
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut app = app();
        let first = app.begin(Query::customer_sales_ranking());
        let second = app.begin(Query::HourlySalesTrend);

        assert!(!app.finish(first, Ok(fixtures::customer_ranking())));
        assert!(app.is_loading());

        assert!(app.finish(second, Ok(fixtures::hourly_trend())));
        assert_eq!(app.result().unwrap().kind(), ResultKind::HourlySalesTrend);

        assert!(!app.finish(first, Err(AnalyticsError::Transport("late".to_string()))));
        assert!(app.error().is_none());
    }

    #[test]
    fn number_keys_run_queries() {
        let mut app = app();
        app.top_n = 5;
        assert_eq!(
            app.handle_key(key(KeyCode::Char('1'))),
            Action::Run(Query::CustomerSalesRanking { top_n: 5 })
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('2'))),
            Action::Run(Query::PopularProductsRanking { top_n: 5 })
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('3'))),
            Action::Run(Query::HourlySalesTrend)
        );
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn triggers_disabled_while_loading() {
        let mut app = app();
        app.begin(Query::HourlySalesTrend);
        assert_eq!(app.handle_key(key(KeyCode::Char('1'))), Action::None);
        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), Action::None);
    }

    #[test]
    fn refresh_reruns_last_query() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), Action::None);

        let generation = app.begin(Query::PopularProductsRanking { top_n: 3 });
        app.finish(generation, Ok(fixtures::product_ranking()));
        assert_eq!(
            app.handle_key(key(KeyCode::Char('r'))),
            Action::Run(Query::PopularProductsRanking { top_n: 3 })
        );
    }

    #[test]
    fn editing_paths() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('o')));
        assert_eq!(app.editing.as_ref().unwrap().field, Field::OutputDir);

        for _ in 0.."output".len() {
            app.handle_key(key(KeyCode::Backspace));
        }
        // 'q' is text while editing, not quit
        for c in "q1".chars() {
            assert_eq!(app.handle_key(key(KeyCode::Char(c))), Action::None);
        }
        app.handle_key(key(KeyCode::Enter));
        assert!(app.editing.is_none());
        assert_eq!(app.output_dir, "./q1");

        app.handle_key(key(KeyCode::Char('i')));
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Esc));
        assert!(app.editing.is_none());
        assert_eq!(app.input_file, "./onlineRetail.xlsx");
    }

    #[test]
    fn table_selection_wraps() {
        let mut app = app();
        app.select_next();
        assert_eq!(app.table_state.selected(), None);

        let generation = app.begin(Query::customer_sales_ranking());
        app.finish(generation, Ok(fixtures::customer_ranking()));

        app.select_previous();
        assert_eq!(app.table_state.selected(), Some(0));
        app.select_previous();
        assert_eq!(app.table_state.selected(), Some(2));
        app.select_next();
        assert_eq!(app.table_state.selected(), Some(0));
    }
}
