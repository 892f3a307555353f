mod app;
mod event;
mod ui;

pub use app::{Action, App, Editing, Field, QueryState};
pub use event::{Event, EventHandler, spawn_query};
pub use ui::draw;
