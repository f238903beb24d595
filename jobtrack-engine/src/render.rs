//! Plain-text rendering of session views for the terminal

use std::fmt::Write as _;

use chrono::NaiveDate;

use jobtrack_common::dates::{days_until, normalize_date, DueStatus};

use crate::highlight::mark_matches;
use crate::record::{display_value, CompositeOrderRecord};
use crate::session::{ResultView, SessionView};

/// Known production units, first substring match wins
const UNIT_TAGS: &[&str] = &[
    "U1", "U2", "U3", "U4", "U5", "HUMUS", "TRILOK", "Raj Kn", "RICHMO", "Sample", "Humus",
    "Stock", "Prime", "Indoli",
];

/// Markers placed around highlighted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightStyle {
    /// Bold yellow ANSI escape
    Ansi,
    /// `[[` and `]]`, for terminals without colour
    Brackets,
}

impl HighlightStyle {
    fn markers(self) -> (&'static str, &'static str) {
        match self {
            HighlightStyle::Ansi => ("\x1b[1;33m", "\x1b[0m"),
            HighlightStyle::Brackets => ("[[", "]]"),
        }
    }
}

/// Unit family label for colour-coding, `None` for unknown units
pub fn unit_tag(unit: &str) -> Option<&'static str> {
    UNIT_TAGS.iter().copied().find(|tag| unit.contains(tag))
}

/// One JSON object per visible record, newline terminated
pub fn render_json_lines(result: &ResultView<'_>) -> serde_json::Result<String> {
    let mut out = String::new();
    for record in &result.visible {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Renders session views as text
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    style: HighlightStyle,
    today: NaiveDate,
}

impl TextRenderer {
    pub fn new(style: HighlightStyle, today: NaiveDate) -> Self {
        Self { style, today }
    }

    pub fn render(&self, view: &SessionView<'_>) -> String {
        match view {
            SessionView::Loading => "Loading...\n".to_string(),
            SessionView::Failed(message) => format!("Error: {}\n", message),
            SessionView::Ready(result) => self.render_result(result),
        }
    }

    fn render_result(&self, result: &ResultView<'_>) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Found {} of {} records (showing {})",
            result.matched,
            result.total,
            result.visible.len()
        );

        if result.visible.is_empty() {
            out.push_str("No results found matching the current filters.\n");
            return out;
        }

        for (index, record) in result.visible.iter().enumerate() {
            out.push('\n');
            out.push_str(&self.render_card(index + 1, record, result.highlight));
        }

        if result.has_more {
            out.push_str("\n-- more (press Enter) --\n");
        }
        out
    }

    /// One record as a text card
    pub fn render_card(
        &self,
        position: usize,
        record: &CompositeOrderRecord,
        highlight: Option<&str>,
    ) -> String {
        let mark = |text: &str| match highlight {
            Some(query) => {
                let (open, close) = self.style.markers();
                mark_matches(text, query, open, close)
            }
            None => text.to_string(),
        };
        let summary = &record.summary;
        let mut out = String::new();

        let unit = match unit_tag(&summary.unit) {
            Some(tag) => format!("{} [{}]", summary.unit, tag),
            None => summary.unit.clone(),
        };
        let image = if record.has_image() { "image" } else { "no image" };
        let _ = writeln!(out, "#{} {}  unit {}  ({})", position, mark(&record.job_id), unit, image);

        let _ = writeln!(
            out,
            "  PO {}  buyer {}  style {} / {}  qty {}  merch {}",
            mark(&summary.po_number),
            mark(&summary.buyer),
            mark(&summary.style_id),
            mark(&summary.style_no),
            mark(&summary.quantity),
            mark(&summary.merchandiser),
        );

        let due = DueStatus::for_date(normalize_date(&summary.final_delivery_date), self.today)
            .map(|status| format!("  ({})", status))
            .unwrap_or_default();
        let po_age = days_until(normalize_date(&summary.po_date), self.today)
            .map(|days| format!("  (DT: {} day)", days.abs()))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  final delivery {}{}  our delivery {}  PO date {}{}  U46 {}",
            summary.final_delivery_date,
            due,
            summary.our_delivery_date,
            summary.po_date,
            po_age,
            mark(&summary.u46),
        );

        if !record.has_linked_reports() {
            out.push_str("  No additional production reports linked to this order.\n");
            return out;
        }

        for (name, report) in record.present_reports() {
            let fields: Vec<String> = report
                .iter()
                .map(|(key, value)| format!("{}: {}", key, mark(&display_value(Some(value)))))
                .collect();
            let _ = writeln!(out, "  {} report: {}", name, fields.join(", "));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::OrderSummary;
    use indexmap::IndexMap;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn record(linked: bool) -> CompositeOrderRecord {
        let mut primary_fields = IndexMap::new();
        for (key, value) in [
            ("jobno_oms", "H100"),
            ("punit_sh", "U1-Main"),
            ("finaldelvdate", "2024-03-05"),
            ("date", "2024-02-20"),
            ("buyer_sh", "ACME"),
        ] {
            primary_fields.insert(key.to_string(), value.to_string());
        }
        let mut linked_reports = IndexMap::new();
        linked_reports.insert(
            "Fabyarn".to_string(),
            linked.then(|| json!({"orderno": "H100", "yarn": "Blue Cotton"}).as_object().cloned()).flatten(),
        );
        CompositeOrderRecord {
            job_id: "H100".to_string(),
            summary: OrderSummary::from_fields(&primary_fields),
            primary_fields,
            linked_reports,
            image: None,
        }
    }

    #[test]
    fn test_unit_tag() {
        assert_eq!(unit_tag("U3 Knitting"), Some("U3"));
        assert_eq!(unit_tag("TRILOK"), Some("TRILOK"));
        assert_eq!(unit_tag("Outsourced"), None);
    }

    #[test]
    fn test_card_shows_due_status_and_reports() {
        let renderer = TextRenderer::new(HighlightStyle::Brackets, today());
        let card = renderer.render_card(1, &record(true), None);
        assert!(card.contains("#1 H100  unit U1-Main [U1]  (no image)"));
        assert!(card.contains("(Due: 4 day)"));
        assert!(card.contains("(DT: 10 day)"));
        assert!(card.contains("Fabyarn report: orderno: H100, yarn: Blue Cotton"));
    }

    #[test]
    fn test_card_highlights_matches() {
        let renderer = TextRenderer::new(HighlightStyle::Brackets, today());
        let card = renderer.render_card(1, &record(true), Some("blue"));
        assert!(card.contains("yarn: [[Blue]] Cotton"));
    }

    #[test]
    fn test_card_without_reports() {
        let renderer = TextRenderer::new(HighlightStyle::Brackets, today());
        let card = renderer.render_card(2, &record(false), None);
        assert!(card.contains("No additional production reports linked to this order."));
    }

    #[test]
    fn test_render_states() {
        let renderer = TextRenderer::new(HighlightStyle::Ansi, today());
        assert_eq!(renderer.render(&SessionView::Loading), "Loading...\n");
        assert_eq!(
            renderer.render(&SessionView::Failed("Failed to fetch source 'knitst': HTTP 502")),
            "Error: Failed to fetch source 'knitst': HTTP 502\n"
        );
    }

    #[test]
    fn test_json_lines_one_object_per_record() {
        let first = record(true);
        let second = record(false);
        let view = ResultView {
            visible: vec![&first, &second],
            matched: 2,
            total: 2,
            has_more: false,
            highlight: None,
        };
        let text = render_json_lines(&view).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["job_id"], "H100");
        assert_eq!(lines[0]["summary"]["unit"], "U1-Main");
        assert_eq!(lines[0]["linked_reports"]["Fabyarn"]["yarn"], "Blue Cotton");
        assert!(lines[1]["linked_reports"]["Fabyarn"].is_null());
    }

    #[test]
    fn test_render_empty_result() {
        let renderer = TextRenderer::new(HighlightStyle::Brackets, today());
        let view = SessionView::Ready(ResultView {
            visible: Vec::new(),
            matched: 0,
            total: 12,
            has_more: false,
            highlight: None,
        });
        let text = renderer.render(&view);
        assert!(text.starts_with("Found 0 of 12 records"));
        assert!(text.contains("No results found"));
    }
}
