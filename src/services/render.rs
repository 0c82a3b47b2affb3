use crate::model::report::DailyReport;

pub trait ReportRenderer: Send + Sync {
    fn subject(&self, report: &DailyReport) -> String;

    fn body(&self, report: &DailyReport) -> String;
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const CELL: &str = "padding: 10px; border: 1px solid #cbd5e1;";

/// Renders the report as an HTML mail body.
pub struct HtmlReportRenderer {
    school_name: String,
}

impl HtmlReportRenderer {
    pub fn new(school_name: impl Into<String>) -> Self {
        Self {
            school_name: school_name.into(),
        }
    }
}

impl ReportRenderer for HtmlReportRenderer {
    fn subject(&self, report: &DailyReport) -> String {
        format!(
            "Daily attendance report - {} - {}",
            self.school_name,
            report.date.format("%Y-%m-%d")
        )
    }

    fn body(&self, report: &DailyReport) -> String {
        let mut html = String::new();
        html.push_str("<div style='font-family: Arial, sans-serif; color: #333;'>");
        html.push_str(&format!(
            "<h2 style='color: #0369a1;'>Daily attendance report - {}</h2>",
            escape(&self.school_name)
        ));
        html.push_str(&format!(
            "<p><strong>Date:</strong> {}</p>",
            report.date.format("%Y-%m-%d")
        ));

        html.push_str(
            "<div style='background-color: #f0f9ff; padding: 15px; border-radius: 8px;'>",
        );
        html.push_str(&format!(
            "<p><strong>Total absent:</strong> {}</p>",
            report.total_absent()
        ));
        html.push_str(&format!(
            "<p><strong>Roll call completion:</strong> {:.1}% ({} of {} classes)</p>",
            report.completion_percentage, report.submitted_classes, report.trackable_classes
        ));
        html.push_str("</div>");

        if report.all_submitted() {
            html.push_str("<p style='color: #15803d;'>Attendance was recorded for every class.</p>");
        } else {
            html.push_str("<h3 style='color: #b91c1c;'>Classes without a roll call</h3><ul>");
            for class in &report.pending_classes {
                html.push_str(&format!("<li>{}</li>", escape(&class.name)));
            }
            html.push_str("</ul>");
        }

        if !report.absences.is_empty() {
            html.push_str("<h3 style='color: #0369a1;'>Absent students</h3>");
            html.push_str("<table style='width: 100%; border-collapse: collapse;'><thead><tr>");
            for heading in ["Student", "Class", "Transport", "Recorded by"] {
                html.push_str(&format!("<th style='{CELL}'>{heading}</th>"));
            }
            html.push_str("</tr></thead><tbody>");
            for absence in &report.absences {
                html.push_str("<tr>");
                for cell in [
                    escape(&absence.student_name),
                    escape(&absence.class_name),
                    absence.transport.label().to_string(),
                    escape(absence.recorded_by.as_deref().unwrap_or("N/A")),
                ] {
                    html.push_str(&format!("<td style='{CELL}'>{cell}</td>"));
                }
                html.push_str("</tr>");
            }
            html.push_str("</tbody></table>");
        }

        html.push_str("</div>");
        html
    }
}
