use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::model::AnalyticsResult;
use crate::query::{AnalyticsSource, Query, run_query};

#[derive(Debug)]
pub enum Event {
    Tick,
    Key(KeyEvent),
    Quit,
    Loaded {
        generation: u64,
        outcome: Result<AnalyticsResult>,
    },
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        std::thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(CrosstermEvent::Key(key)) = event::read() {
                        let event = match key.code {
                            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                                Event::Quit
                            }
                            _ => Event::Key(key),
                        };
                        if event_tx.send(event).is_err() {
                            break;
                        }
                    }
                } else if event_tx.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, tx }
    }

    /// Sender for posting query completions back into the loop.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Run `query` in the background and post the outcome as [`Event::Loaded`].
///
/// Nothing is posted if `cancel` fires first.
pub fn spawn_query<S>(
    source: S,
    query: Query,
    generation: u64,
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    S: AnalyticsSource + Send + Sync + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(generation, ?query, "query cancelled");
            }
            outcome = run_query(&source, query) => {
                let _ = tx.send(Event::Loaded { generation, outcome });
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResultKind;
    use crate::query::fake::FakeSource;
    use crate::tui::App;

    #[tokio::test]
    async fn completion_lands_in_app() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new("http://localhost:8000");

        let generation = app.begin(Query::HourlySalesTrend);
        spawn_query(
            FakeSource::default(),
            Query::HourlySalesTrend,
            generation,
            tx,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let Some(Event::Loaded { generation, outcome }) = rx.recv().await else {
            panic!("expected a Loaded event");
        };
        assert!(app.finish(generation, outcome));
        assert_eq!(app.result().unwrap().kind(), ResultKind::HourlySalesTrend);
    }

    #[tokio::test]
    async fn transport_failure_lands_as_error() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new("http://localhost:8000");

        let query = Query::customer_sales_ranking();
        let generation = app.begin(query);
        spawn_query(
            FakeSource::failing("error sending request: connection refused"),
            query,
            generation,
            tx,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let Some(Event::Loaded { generation, outcome }) = rx.recv().await else {
            panic!("expected a Loaded event");
        };
        app.finish(generation, outcome);
        assert_eq!(
            app.error(),
            Some("error sending request: connection refused")
        );
        assert!(app.result().is_none());
    }

    #[tokio::test]
    async fn cancelled_query_posts_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();

        spawn_query(FakeSource::default(), Query::HourlySalesTrend, 1, tx, cancel)
            .await
            .unwrap();

        assert!(rx.recv().await.is_none());
    }
}
