use crate::client::resolve_url;
use crate::format::{format_count, format_currency, format_hour};
use crate::model::AnalyticsResult;

pub const PEAK_MARKER: &str = "（ピーク）";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Blue,
    Green,
    Orange,
    Purple,
}

/// One cell of the summary panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
    pub detail: Option<String>,
    pub accent: Accent,
}

impl Metric {
    fn new(label: &'static str, value: String, accent: Accent) -> Self {
        Self {
            label,
            value,
            detail: None,
            accent,
        }
    }

    fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub cells: Vec<String>,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTable {
    pub title: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<DetailRow>,
}

/// Everything the dashboard shows for one result, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub metrics: Vec<Metric>,
    pub graph_url: String,
    pub graph_alt: String,
    pub table: DetailTable,
}

impl Report {
    pub fn build(result: &AnalyticsResult, api_base: &str) -> Self {
        let envelope = result.envelope();
        let total_records = Metric::new("総レコード数", format_count(envelope.total_records), Accent::Blue);

        let (metrics, table) = match result {
            AnalyticsResult::HourlySalesTrend(r) => {
                let metrics = vec![
                    total_records,
                    Metric::new("有効レコード数", format_count(r.valid_records), Accent::Green),
                    Metric::new("ピーク時間帯", format_hour(r.peak_hour), Accent::Orange)
                        .with_detail(format_currency(r.peak_sales)),
                    Metric::new("最低時間帯", format_hour(r.lowest_hour), Accent::Purple)
                        .with_detail(format_currency(r.lowest_sales)),
                ];
                let rows = r
                    .data
                    .iter()
                    .map(|item| {
                        let is_peak = item.hour == r.peak_hour;
                        let mut hour = format_hour(item.hour);
                        if is_peak {
                            hour.push_str(PEAK_MARKER);
                        }
                        DetailRow {
                            cells: vec![hour, format_currency(item.sales)],
                            highlighted: is_peak,
                        }
                    })
                    .collect();
                let table = DetailTable {
                    title: result.kind().table_title(),
                    headers: vec!["時間帯", "売上（Sales）"],
                    rows,
                };
                (metrics, table)
            }
            AnalyticsResult::CustomerSalesRanking(r) => {
                let metrics = ranking_metrics(total_records, "有効顧客数", r.valid_customers, r.top_n);
                let rows = r
                    .ranking
                    .iter()
                    .map(|item| DetailRow {
                        cells: vec![
                            item.rank.to_string(),
                            item.customer_id.to_string(),
                            format_currency(item.sales),
                        ],
                        highlighted: false,
                    })
                    .collect();
                let table = DetailTable {
                    title: result.kind().table_title(),
                    headers: vec!["順位", "顧客ID", "売上（Sales）"],
                    rows,
                };
                (metrics, table)
            }
            AnalyticsResult::PopularProductsRanking(r) => {
                let metrics = ranking_metrics(total_records, "有効商品数", r.valid_products, r.top_n);
                let rows = r
                    .ranking
                    .iter()
                    .map(|item| DetailRow {
                        cells: vec![
                            item.rank.to_string(),
                            item.product_name.clone(),
                            format_count(item.quantity),
                        ],
                        highlighted: false,
                    })
                    .collect();
                let table = DetailTable {
                    title: result.kind().table_title(),
                    headers: vec!["順位", "商品名", "販売数量（Quantity）"],
                    rows,
                };
                (metrics, table)
            }
        };

        Self {
            title: format!("{} - 結果", envelope.usecase),
            metrics,
            graph_url: resolve_url(api_base, &envelope.graph_url),
            graph_alt: envelope.usecase.clone(),
            table,
        }
    }

    /// Plain text rendering for non-interactive output.
    pub fn to_text(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = String::new();

        out.push_str(&format!("{}\n{}\n{}\n", rule, self.title, rule));
        for metric in &self.metrics {
            out.push_str(&format!("  {}: {}", metric.label, metric.value));
            if let Some(detail) = &metric.detail {
                out.push_str(&format!(" ({})", detail));
            }
            out.push('\n');
        }
        out.push_str(&format!("  グラフ: {}\n", self.graph_url));
        out.push_str(&format!("{}\n", "-".repeat(60)));

        out.push_str(&format!("{}\n", self.table.title));
        out.push_str(&format!("  {}\n", self.table.headers.join(" | ")));
        for row in &self.table.rows {
            let prefix = if row.highlighted { ">" } else { " " };
            out.push_str(&format!("{} {}\n", prefix, row.cells.join(" | ")));
        }
        out.push_str(&format!("{}\n", rule));
        out
    }
}

fn ranking_metrics(total_records: Metric, valid_label: &'static str, valid: u64, top_n: u32) -> Vec<Metric> {
    vec![
        total_records,
        Metric::new(valid_label, valid.to_string(), Accent::Green),
        Metric::new("表示件数", format!("Top {}", top_n), Accent::Purple),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    const BASE: &str = "http://localhost:8000";

    fn metric<'a>(report: &'a Report, label: &str) -> &'a Metric {
        report
            .metrics
            .iter()
            .find(|m| m.label == label)
            .unwrap_or_else(|| panic!("no metric {}", label))
    }

    #[test]
    fn customer_ranking_report() {
        let report = Report::build(&fixtures::customer_ranking(), BASE);

        assert_eq!(report.title, "顧客別売上ランキング - 結果");
        assert_eq!(report.metrics.len(), 3);
        assert_eq!(metric(&report, "有効顧客数").value, "500");
        assert_eq!(metric(&report, "総レコード数").value, "1,000");
        assert_eq!(metric(&report, "表示件数").value, "Top 10");

        assert_eq!(report.table.headers, vec!["順位", "顧客ID", "売上（Sales）"]);
        assert_eq!(report.table.rows[0].cells, vec!["1", "17850", "¥5,391.21"]);
        assert_eq!(
            report.graph_url,
            "http://localhost:8000/output/customer_sales_ranking_20240101_120000.png"
        );
        assert_eq!(report.graph_alt, "顧客別売上ランキング");
    }

    #[test]
    fn product_ranking_report() {
        let report = Report::build(&fixtures::product_ranking(), BASE);

        assert_eq!(report.metrics.len(), 3);
        assert_eq!(metric(&report, "有効商品数").value, "3684");
        assert_eq!(metric(&report, "総レコード数").value, "541,909");
        assert_eq!(report.table.headers[1], "商品名");
        assert_eq!(report.table.headers[2], "販売数量（Quantity）");
        assert_eq!(
            report.table.rows[0].cells,
            vec!["1", "WHITE HANGING HEART T-LIGHT HOLDER", "2,028"]
        );
        assert_eq!(report.table.title, "ランキング詳細");
    }

    #[test]
    fn ranking_rows_keep_input_order() {
        let mut result = fixtures::customer_ranking();
        if let AnalyticsResult::CustomerSalesRanking(r) = &mut result {
            r.ranking.reverse();
        }
        let report = Report::build(&result, BASE);
        let ranks: Vec<&str> = report
            .table
            .rows
            .iter()
            .map(|row| row.cells[0].as_str())
            .collect();
        assert_eq!(ranks, vec!["3", "2", "1"]);
    }

    #[test]
    fn hourly_trend_report() {
        let report = Report::build(&fixtures::hourly_trend(), BASE);

        assert_eq!(report.metrics.len(), 4);
        assert_eq!(metric(&report, "有効レコード数").value, "397,924");

        let peak = metric(&report, "ピーク時間帯");
        assert_eq!(peak.value, "15時");
        assert_eq!(peak.detail.as_deref(), Some("¥12,345.67"));

        let lowest = metric(&report, "最低時間帯");
        assert_eq!(lowest.value, "3時");
        assert_eq!(lowest.detail.as_deref(), Some("¥102.50"));

        assert_eq!(report.table.title, "時間帯別詳細");
        assert_eq!(report.table.rows.len(), 24);
    }

    #[test]
    fn only_peak_hour_is_highlighted() {
        let report = Report::build(&fixtures::hourly_trend(), BASE);
        let highlighted: Vec<&DetailRow> =
            report.table.rows.iter().filter(|row| row.highlighted).collect();

        assert_eq!(highlighted.len(), 1);
        assert_eq!(highlighted[0].cells, vec!["15時（ピーク）", "¥12,345.67"]);
        assert_eq!(report.table.rows[3].cells, vec!["3時", "¥102.50"]);
    }

    #[test]
    fn text_report_marks_peak_row() {
        let text = Report::build(&fixtures::hourly_trend(), BASE).to_text();
        assert!(text.contains("時間帯別売上傾向 - 結果"));
        assert!(text.contains("> 15時（ピーク） | ¥12,345.67"));
        assert!(text.contains("  3時 | ¥102.50"));
        assert!(text.contains("ピーク時間帯: 15時 (¥12,345.67)"));
        assert!(text.contains("グラフ: http://localhost:8000/output/hourly_sales_trend"));
    }
}
