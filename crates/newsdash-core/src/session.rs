//! Interactive filter-and-redraw state.
//!
//! An [`ExploreSession`] keeps the current control values and re-renders the
//! whole dashboard after every change, against the dataset it was opened on.

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::dashboard::{DashboardView, Selection};
use crate::dataset::Dataset;
use crate::filter::{is_all, FilterParams};

pub const HELP: &str = "\
commands:
  year <YEAR|all>        restrict to one year
  symbol <SYMBOL|all>    restrict to one ticker
  keyword [TEXT]         title substring, empty clears
  range [MIN MAX]        sentiment score range, empty resets to dataset bounds
  select [NEWS_ID]       focus a record in the detail pane, empty clears
  reset                  clear every control
  show                   redraw the current view
  help                   this text
  quit                   leave the session";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown command '{command}' (try 'help')")]
    UnknownCommand { command: String },
    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Year(Option<String>),
    Symbol(Option<String>),
    Keyword(Option<String>),
    Range(Option<(String, String)>),
    Select(Option<String>),
    Reset,
    Show,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = SessionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_owned());
        let control = |value: Option<String>| value.filter(|value| !is_all(value));

        match command.to_ascii_lowercase().as_str() {
            "" | "show" => Ok(Self::Show),
            "year" => Ok(Self::Year(control(argument))),
            "symbol" => Ok(Self::Symbol(control(argument))),
            "keyword" => Ok(Self::Keyword(argument)),
            "select" => Ok(Self::Select(argument)),
            "range" => {
                let bounds = rest.split_whitespace().collect::<Vec<_>>();
                match bounds.as_slice() {
                    [] => Ok(Self::Range(None)),
                    [min, max] => Ok(Self::Range(Some(((*min).to_owned(), (*max).to_owned())))),
                    _ => Err(SessionError::MissingArgument {
                        command: "range",
                        expected: "two bounds, MIN and MAX",
                    }),
                }
            }
            "reset" => Ok(Self::Reset),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(SessionError::UnknownCommand {
                command: other.to_owned(),
            }),
        }
    }
}

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Redraw(Box<DashboardView>),
    Help,
    Quit,
}

pub struct ExploreSession {
    dataset: Arc<Dataset>,
    params: FilterParams,
    focus: Option<String>,
    table_limit: usize,
}

impl ExploreSession {
    pub fn new(dataset: Arc<Dataset>, table_limit: usize) -> Self {
        Self {
            dataset,
            params: FilterParams::default(),
            focus: None,
            table_limit,
        }
    }

    /// Start from existing control values instead of an empty filter.
    pub fn with_params(mut self, mut params: FilterParams) -> Self {
        self.focus = params
            .news_id
            .take()
            .filter(|news_id| !news_id.trim().is_empty());
        self.params = params;
        self
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn execute(&mut self, command: SessionCommand) -> SessionOutcome {
        debug!(?command, "session command");
        match command {
            SessionCommand::Year(year) => self.params.year = year,
            SessionCommand::Symbol(symbol) => self.params.symbol = symbol,
            SessionCommand::Keyword(keyword) => self.params.keyword = keyword,
            SessionCommand::Range(Some((min, max))) => {
                self.params.sent_min = Some(min);
                self.params.sent_max = Some(max);
            }
            SessionCommand::Range(None) => {
                self.params.sent_min = None;
                self.params.sent_max = None;
            }
            SessionCommand::Select(news_id) => self.focus = news_id,
            SessionCommand::Reset => {
                self.params = FilterParams::default();
                self.focus = None;
            }
            SessionCommand::Show => {}
            SessionCommand::Help => return SessionOutcome::Help,
            SessionCommand::Quit => return SessionOutcome::Quit,
        }
        SessionOutcome::Redraw(Box::new(self.view()))
    }

    /// Render the current state.
    pub fn view(&self) -> DashboardView {
        let resolved = self.params.resolve(&self.dataset);
        DashboardView::build(
            &self.dataset,
            &resolved.spec,
            resolved.warnings,
            self.table_limit,
            Selection::Focus(self.focus.as_deref()),
        )
    }
}
