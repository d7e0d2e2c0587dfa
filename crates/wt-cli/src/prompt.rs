//! Interactive confirmation before a full-history scan.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use wt_core::HistorySummary;

/// Asks whether to scan the whole history. Only `y` (any case) confirms.
///
/// End of input counts as a refusal.
pub fn confirm_full_scan<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    summary: Option<&HistorySummary>,
) -> Result<bool> {
    if let Some(summary) = summary {
        let (from, to) = summary.suggested_range();
        writeln!(output, "{summary}")?;
        writeln!(
            output,
            "To report on the last month only, pass --date-from {from} --date-to {to}"
        )?;
    }
    write!(
        output,
        "No --date-from given, are you sure you want to compute stats for your entire \
         watch history? (This may take a while) [y/N] "
    )?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use chrono::NaiveDate;
    use insta::assert_snapshot;

    fn ask(answer: &str, summary: Option<&HistorySummary>) -> (bool, String) {
        let mut output = Vec::new();
        let confirmed = confirm_full_scan(Cursor::new(answer), &mut output, summary).unwrap();
        (confirmed, String::from_utf8(output).unwrap())
    }

    #[test]
    fn accepts_y_in_any_case() {
        assert!(ask("y\n", None).0);
        assert!(ask("Y\n", None).0);
        assert!(ask("  y  \n", None).0);
    }

    #[test]
    fn anything_else_declines() {
        assert!(!ask("n\n", None).0);
        assert!(!ask("yes\n", None).0);
        assert!(!ask("\n", None).0);
        assert!(!ask("", None).0);
    }

    #[test]
    fn prompt_mentions_history_span() {
        let summary = HistorySummary {
            count: 42,
            oldest: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            newest: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        };
        let (_, output) = ask("n\n", Some(&summary));
        assert_snapshot!(output.trim_end(), @r"
        Found 42 entries from 2023-06-01 to 2024-01-15
        To report on the last month only, pass --date-from 2023-12-16 --date-to 2024-01-15
        No --date-from given, are you sure you want to compute stats for your entire watch history? (This may take a while) [y/N]
        ");
    }
}
