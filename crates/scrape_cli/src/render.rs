use std::fmt::Write;

use scrape_core::{JobView, PageRecord, ResultSet};

/// One status line for the current job, or `None` before any request.
pub fn status_line(view: &JobView) -> Option<String> {
    let job = view.job.as_ref()?;
    let mut line = format!("[{}] {}", job.target(), view.phase);
    if view.busy {
        line.push_str("...");
    } else if view.phase.is_settled() && view.error_message.is_none() {
        let _ = write!(line, " | {} result(s)", format_with_commas(view.result_count));
    }
    if let Some(message) = &view.error_message {
        let _ = write!(line, " | {message}");
    }
    Some(line)
}

pub fn render_results(results: &ResultSet) -> String {
    if results.is_empty() {
        return "No results.\n".to_string();
    }
    let width = results
        .iter()
        .map(|record| record.status.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for record in results {
        let _ = writeln!(out, "{}", format_record(record, width));
    }
    out
}

fn format_record(record: &PageRecord, width: usize) -> String {
    let mut row = format!("{:<width$}  {}", record.status, record.url);

    let mut details = Vec::new();
    if let Some(title) = record.meta_title.as_deref().filter(|t| !t.is_empty()) {
        details.push(format!("\"{title}\""));
    }
    if let Some(headings) = record.heading_count {
        details.push(format!("{headings} headings"));
    }
    let links = record
        .internal_link_count
        .or_else(|| record.internal_links.as_ref().map(|l| l.len() as u64));
    if let Some(links) = links {
        details.push(format!("{links} internal links"));
    }
    if !details.is_empty() {
        let _ = write!(row, " ({})", details.join(", "));
    }
    row
}

fn format_with_commas(value: usize) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
