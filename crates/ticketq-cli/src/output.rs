//! Plain-text table rendering for ticket listings.

use chrono::Utc;
use ticketq_core::Ticket;

const HEADERS: [&str; 7] = ["ID", "STATUS", "TEAM", "DESCRIPTION", "CREATED", "UPDATED", "AGE"];

/// Print tickets as an aligned table. Descriptions are truncated; the CSV
/// export carries the full text.
pub fn print_ticket_table(tickets: &[Ticket]) {
    if tickets.is_empty() {
        println!("No tickets found");
        return;
    }

    let now = Utc::now();
    let rows: Vec<[String; 7]> = tickets
        .iter()
        .map(|t| {
            [
                t.id.to_string(),
                t.status.to_string(),
                t.team_name.clone().unwrap_or_else(|| "-".to_string()),
                t.short_description(),
                t.created_at.format("%Y-%m-%d").to_string(),
                t.updated_at.format("%Y-%m-%d").to_string(),
                format!("{}d", t.days_since_updated(now)),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    print_row(&HEADERS.map(String::from), &widths);
    for row in &rows {
        print_row(row, &widths);
    }
}

fn print_row(cells: &[String; 7], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    println!("{}", line.join("  ").trim_end());
}
