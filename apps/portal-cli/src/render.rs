//! Plain-text rendering of a page view.

use std::io::{self, Write};

use portal_core::{PageView, RowView};

const GAP: &str = "  ";

/// Write `view` as an aligned table followed by the paging summary.
pub fn write_page(out: &mut impl Write, label: &str, view: &PageView) -> io::Result<()> {
    if view.rows.is_empty() {
        writeln!(out, "No {} records found", label.to_lowercase())?;
    } else {
        write_table(out, &view.rows)?;
        writeln!(out)?;
    }

    writeln!(out, "{}", view.summary)?;
    if view.page_count > 1 {
        let pages: Vec<String> = view
            .page_numbers
            .iter()
            .map(|&n| if n == view.page { format!("[{}]", n) } else { n.to_string() })
            .collect();
        writeln!(out, "Page {} of {}: {}", view.page, view.page_count, pages.join(" "))?;
    }

    let stats = view.stats;
    if stats.active + stats.inactive > 0 {
        writeln!(
            out,
            "Total: {}  Active: {}  Inactive: {}",
            stats.total, stats.active, stats.inactive
        )?;
    }
    Ok(())
}

fn write_table(out: &mut impl Write, rows: &[RowView]) -> io::Result<()> {
    let mut headings = vec!["ID".to_string(), "Title".to_string(), "Details".to_string()];
    if let Some(first) = rows.first() {
        headings.extend(first.columns.iter().map(|(heading, _)| heading.clone()));
    }
    headings.push("Status".to_string());

    let table: Vec<Vec<String>> = rows.iter().map(|row| cells(row, &headings)).collect();

    let widths: Vec<usize> = headings
        .iter()
        .enumerate()
        .map(|(i, heading)| {
            table
                .iter()
                .map(|line| line[i].chars().count())
                .chain(std::iter::once(heading.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    write_line(out, &headings, &widths)?;
    for line in &table {
        write_line(out, line, &widths)?;
    }
    Ok(())
}

fn cells(row: &RowView, headings: &[String]) -> Vec<String> {
    let mut line = vec![row.id.clone(), row.title.clone(), row.subtitle.clone()];
    line.extend(
        headings[3..headings.len() - 1]
            .iter()
            .map(|heading| row.cell(heading).unwrap_or("").to_string()),
    );
    line.push(
        row.badges
            .iter()
            .map(|badge| badge.label.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    );
    line
}

fn write_line(out: &mut impl Write, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
        .collect();
    writeln!(out, "{}", padded.join(GAP).trim_end())
}
