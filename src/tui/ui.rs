use crate::query::Query;
use crate::report::{Accent, DetailTable, Metric, Report};
use crate::tui::app::{App, Field, QueryState};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

const ACTIONS: [(char, Query); 3] = [
    ('1', Query::customer_sales_ranking()),
    ('2', Query::popular_products_ranking()),
    ('3', Query::HourlySalesTrend),
];

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0]);
    draw_settings(frame, app, chunks[1]);
    draw_actions(frame, app, chunks[2]);
    draw_body(frame, app, chunks[3]);
    draw_status_bar(frame, app, chunks[4]);
}

fn titled_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_style(Style::default().add_modifier(Modifier::BOLD))
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "Online Retail Analytics",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "オンライン小売データ分析アプリケーション",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn draw_settings(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = [
        (Field::InputFile, &app.input_file),
        (Field::OutputDir, &app.output_dir),
    ]
    .into_iter()
    .map(|(field, current)| {
        let label = Span::styled(
            format!("{}: ", field.label()),
            Style::default().fg(Color::DarkGray),
        );
        match &app.editing {
            Some(editing) if editing.field == field => Line::from(vec![
                label,
                Span::styled(
                    format!("{}_", editing.buffer),
                    Style::default().fg(Color::Yellow),
                ),
            ]),
            _ => Line::from(vec![label, Span::raw(current.as_str())]),
        }
    })
    .collect();

    let paragraph = Paragraph::new(lines).block(titled_block("ファイル設定"));
    frame.render_widget(paragraph, area);
}

fn draw_actions(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = ACTIONS
        .iter()
        .map(|(key, query)| {
            if app.is_loading() {
                Line::from(vec![
                    Span::styled(format!(" [{}] ", key), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        format!("{} 処理中...", app.spinner()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            } else {
                Line::from(vec![
                    Span::styled(format!(" [{}] ", key), Style::default().fg(Color::Yellow)),
                    Span::styled(
                        query.with_top_n(app.top_n).label(),
                        Style::default().fg(action_color(*query)),
                    ),
                ])
            }
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(titled_block("データ分析"));
    frame.render_widget(paragraph, area);
}

fn action_color(query: Query) -> Color {
    match query {
        Query::CustomerSalesRanking { .. } => Color::Blue,
        Query::PopularProductsRanking { .. } => Color::Green,
        Query::HourlySalesTrend => Color::LightRed,
    }
}

fn draw_body(frame: &mut Frame, app: &App, area: Rect) {
    match &app.state {
        QueryState::Failed(message) => draw_error(frame, message, area),
        QueryState::Success(_) => {
            if let Some(report) = app.report() {
                draw_report(frame, app, &report, area);
            }
        }
        QueryState::Idle | QueryState::Loading(_) => {}
    }
}

fn draw_error(frame: &mut Frame, message: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error ")
        .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(Line::from(Span::styled(
        message,
        Style::default().fg(Color::Red),
    )))
    .wrap(Wrap { trim: true })
    .block(block);

    let height = area.height.min(5);
    frame.render_widget(paragraph, Rect { height, ..area });
}

fn draw_report(frame: &mut Frame, app: &App, report: &Report, area: Rect) {
    let block = titled_block(&report.title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(inner);

    draw_metrics(frame, &report.metrics, chunks[0]);

    let graph = Paragraph::new(Line::from(vec![
        Span::styled(format!("{}: ", report.graph_alt), Style::default().fg(Color::DarkGray)),
        Span::styled(
            report.graph_url.as_str(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED),
        ),
    ]))
    .block(titled_block("グラフ"));
    frame.render_widget(graph, chunks[1]);

    draw_table(frame, app, &report.table, chunks[2]);
}

fn draw_metrics(frame: &mut Frame, metrics: &[Metric], area: Rect) {
    let constraints = vec![Constraint::Ratio(1, metrics.len().max(1) as u32); metrics.len()];
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (metric, cell) in metrics.iter().zip(cells.iter()) {
        let color = accent_color(metric.accent);
        let mut lines = vec![
            Line::from(Span::styled(metric.label, Style::default().fg(Color::DarkGray))),
            Line::from(Span::styled(
                metric.value.as_str(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
        ];
        if let Some(detail) = &metric.detail {
            lines.push(Line::from(Span::styled(
                detail.as_str(),
                Style::default().fg(Color::DarkGray),
            )));
        }

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        frame.render_widget(paragraph, *cell);
    }
}

fn accent_color(accent: Accent) -> Color {
    match accent {
        Accent::Blue => Color::Blue,
        Accent::Green => Color::Green,
        Accent::Orange => Color::LightRed,
        Accent::Purple => Color::Magenta,
    }
}

fn draw_table(frame: &mut Frame, app: &App, table: &DetailTable, area: Rect) {
    let last = table.headers.len().saturating_sub(1);

    let header = Row::new(table.headers.iter().enumerate().map(|(i, h)| {
        let line = Line::from(*h);
        Cell::from(if i == last { line.alignment(Alignment::Right) } else { line })
    }))
    .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let rows = table.rows.iter().map(|row| {
        let cells = row.cells.iter().enumerate().map(|(i, text)| {
            let line = Line::from(text.as_str());
            Cell::from(if i == last { line.alignment(Alignment::Right) } else { line })
        });
        let style = if row.highlighted {
            Style::default()
                .fg(Color::LightRed)
                .bg(Color::Rgb(60, 30, 10))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(cells).style(style)
    });

    let widths: Vec<Constraint> = match table.headers.len() {
        2 => vec![Constraint::Percentage(50), Constraint::Percentage(50)],
        _ => vec![
            Constraint::Length(6),
            Constraint::Min(20),
            Constraint::Length(22),
        ],
    };

    let widget = Table::new(rows, widths)
        .header(header)
        .block(titled_block(table.title))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = app.table_state.clone();
    frame.render_stateful_widget(widget, area, &mut state);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let last_update = app
        .last_update
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let status = if app.is_loading() {
        Span::styled("Loading", Style::default().fg(Color::Yellow))
    } else if app.error().is_some() {
        Span::styled("Error", Style::default().fg(Color::Red))
    } else if app.result().is_some() {
        Span::styled("OK", Style::default().fg(Color::Green))
    } else {
        Span::styled("Idle", Style::default().fg(Color::DarkGray))
    };

    let line = if app.editing.is_some() {
        Line::from(vec![
            Span::styled(" Enter", Style::default().fg(Color::DarkGray)),
            Span::raw(":save "),
            Span::styled("Esc", Style::default().fg(Color::DarkGray)),
            Span::raw(":cancel"),
        ])
    } else {
        Line::from(vec![
            Span::styled(" q", Style::default().fg(Color::DarkGray)),
            Span::raw(":quit "),
            Span::styled("1-3", Style::default().fg(Color::DarkGray)),
            Span::raw(":run "),
            Span::styled("r", Style::default().fg(Color::DarkGray)),
            Span::raw(":rerun "),
            Span::styled("i/o", Style::default().fg(Color::DarkGray)),
            Span::raw(":edit "),
            Span::styled("↑↓", Style::default().fg(Color::DarkGray)),
            Span::raw(":scroll │ "),
            status,
            Span::raw(format!(" │ {} │ {}", last_update, app.api_base)),
        ])
    };

    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::model::fixtures;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(app: &App) -> String {
        let backend = TestBackend::new(110, 60);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app() -> App {
        App::new("http://localhost:8000")
    }

    #[test]
    fn product_action_shows_requested_top_n() {
        let mut app = app();
        app.top_n = 25;
        let screen: String = render(&app).chars().filter(|c| *c != ' ').collect();
        assert!(screen.contains("人気商品のトップ25"));
        assert!(!screen.contains("トップ10"));
    }

    #[test]
    fn idle_shows_controls_only() {
        let screen = render(&app());
        assert!(screen.contains("Online Retail Analytics"));
        assert!(screen.contains("[1]"));
        assert!(screen.contains("[3]"));
        assert!(screen.contains("./onlineRetail.xlsx"));
        assert!(!screen.contains("Error"));
        assert!(!screen.contains("http://localhost:8000/output"));
    }

    #[test]
    fn customer_ranking_screen() {
        let mut app = app();
        let generation = app.begin(Query::customer_sales_ranking());
        app.finish(generation, Ok(fixtures::customer_ranking()));

        let screen = render(&app);
        assert!(screen.contains("500"));
        assert!(screen.contains("1,000"));
        assert!(screen.contains("Top 10"));
        assert!(screen.contains("17850"));
        assert!(screen.contains("¥5,391.21"));
        assert!(screen.contains(
            "http://localhost:8000/output/customer_sales_ranking_20240101_120000.png"
        ));
    }

    #[test]
    fn hourly_trend_screen() {
        let mut app = app();
        let generation = app.begin(Query::HourlySalesTrend);
        app.finish(generation, Ok(fixtures::hourly_trend()));

        let screen = render(&app);
        assert!(screen.contains("¥12,345.67"));
        assert!(screen.contains("¥102.50"));
        assert!(screen.contains("397,924"));
    }

    #[test]
    fn peak_row_is_styled() {
        let mut app = app();
        let generation = app.begin(Query::HourlySalesTrend);
        app.finish(generation, Ok(fixtures::hourly_trend()));

        let backend = TestBackend::new(110, 60);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let buffer = terminal.backend().buffer();

        let peak_bg = Color::Rgb(60, 30, 10);
        let highlighted_rows: Vec<u16> = (0..buffer.area.height)
            .filter(|&y| (0..buffer.area.width).any(|x| buffer[(x, y)].bg == peak_bg))
            .collect();
        assert_eq!(highlighted_rows.len(), 1);

        let y = highlighted_rows[0];
        let line: String = (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect();
        assert!(line.contains("¥12,345.67"));
    }

    #[test]
    fn transport_failure_shows_error_panel_only() {
        let mut app = app();
        let generation = app.begin(Query::HourlySalesTrend);
        app.finish(
            generation,
            Err(AnalyticsError::Transport(
                "error sending request for url (http://localhost:8000/api/v1/analytics/hourly-sales-trend)"
                    .to_string(),
            )),
        );

        let screen = render(&app);
        assert!(screen.contains("Error"));
        assert!(screen.contains("error sending request"));
        assert!(!screen.contains("http://localhost:8000/output"));
        assert!(!screen.contains("¥"));
    }

    #[test]
    fn loading_disables_actions() {
        let mut app = app();
        app.begin(Query::HourlySalesTrend);
        let screen = render(&app);
        assert!(screen.contains("Loading"));
        assert!(screen.contains("..."));
    }
}
