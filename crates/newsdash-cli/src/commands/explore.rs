use std::io::{self, BufRead, Write};
use std::sync::Arc;

use newsdash_core::session::HELP;
use newsdash_core::{
    DashboardConfig, Dataset, ExploreSession, FilterParams, SessionCommand, SessionOutcome,
};
use tracing::info;

use crate::cli::FilterArgs;
use crate::error::CliError;
use crate::output::{write_warnings, TableView};

const PROMPT: &str = "newsdash> ";

pub fn run(args: &FilterArgs, dataset: Arc<Dataset>, config: &DashboardConfig) -> Result<(), CliError> {
    info!(rows = dataset.len(), "starting explore session");
    let session =
        ExploreSession::new(dataset, config.table_limit).with_params(FilterParams::from(args));

    let stdin = io::stdin();
    let stdout = io::stdout();
    drive(session, stdin.lock(), &mut stdout.lock())
}

/// Read commands until `quit` or end of input, redrawing after each one.
fn drive<R: BufRead>(
    mut session: ExploreSession,
    input: R,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    redraw(out, &session.view())?;

    let mut lines = input.lines();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(err)) if err.kind() == io::ErrorKind::InvalidData => {
                writeln!(out, "ignoring unreadable input line: {err}")?;
                continue;
            }
            Some(Err(err)) => return Err(err.into()),
            None => {
                writeln!(out)?;
                return Ok(());
            }
        };

        let command = match line.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(err) => {
                writeln!(out, "{err}")?;
                continue;
            }
        };

        match session.execute(command) {
            SessionOutcome::Redraw(view) => redraw(out, &view)?,
            SessionOutcome::Help => writeln!(out, "{HELP}")?,
            SessionOutcome::Quit => return Ok(()),
        }
    }
}

fn redraw(out: &mut dyn Write, view: &newsdash_core::DashboardView) -> io::Result<()> {
    writeln!(out)?;
    view.write_table(out)?;
    write_warnings(out, &view.warnings)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use newsdash_core::columns::{ARTICLE_TITLE, NEWS_ID, STOCK_SYMBOL};
    use newsdash_core::{Record, Symbol};

    use super::*;

    fn session() -> ExploreSession {
        let records = [("1", "AAA", "Good news"), ("2", "BBB", "Bad news")]
            .into_iter()
            .map(|(id, symbol, title)| Record {
                news_id: Some(id.to_owned()),
                stock_symbol: Symbol::normalize(symbol),
                article_title: Some(title.to_owned()),
                ..Record::default()
            })
            .collect();
        let columns = [NEWS_ID, STOCK_SYMBOL, ARTICLE_TITLE]
            .iter()
            .map(|name| (*name).to_owned())
            .collect();
        ExploreSession::new(Arc::new(Dataset::from_records("gold.csv", columns, records)), 200)
    }

    fn transcript(input: &str) -> String {
        let mut out = Vec::new();
        drive(session(), Cursor::new(input.to_owned()), &mut out).expect("session runs");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn redraws_after_every_change() {
        let text = transcript("symbol bbb\nquit\n");

        let results = text
            .lines()
            .filter(|line| line.starts_with("== Results:"))
            .collect::<Vec<_>>();
        assert_eq!(
            results,
            vec![
                "== Results: 2 rows (showing 2) ==",
                "== Results: 1 rows (showing 1) ==",
            ]
        );
        assert!(text.contains("title  : Bad news"));
    }

    #[test]
    fn bad_input_keeps_session_alive() {
        let text = transcript("zoom\nhelp\n");

        assert!(text.contains("unknown command 'zoom'"));
        assert!(text.contains("commands:"));
        assert!(text.ends_with(&format!("{PROMPT}\n")), "ends cleanly at EOF");
    }

    #[test]
    fn invalid_utf8_line_is_reported_and_skipped() {
        let mut input = b"symbol bbb\n".to_vec();
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        input.extend_from_slice(b"show\nquit\n");

        let mut out = Vec::new();
        drive(session(), Cursor::new(input), &mut out).expect("session survives bad bytes");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.contains("ignoring unreadable input line"));
        let redraws = text.lines().filter(|line| line.starts_with("== Results:")).count();
        assert_eq!(redraws, 3, "initial view, symbol, then show");
    }

    #[test]
    fn empty_filter_shows_no_results_warning() {
        let text = transcript("keyword nothing here\nq\n");
        assert!(text.contains("no record selected"));
        assert!(text.contains("  - no results match the current filters"));
    }
}
