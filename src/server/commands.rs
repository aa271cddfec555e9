//! Command dispatcher: parse a request line, act, render the reply.
//!
//! Every reply is one free-form text block. Protocol and lookup errors
//! are rendered into the reply and never terminate the session.

use std::fmt::Write as _;

use thiserror::Error;

use crate::models::Submission;
use crate::state::ServerState;

/// Static usage text for `help`.
const HELP_TEXT: &str = "\nAvailable commands:\n \
* help - Display this dialog.\n \
* pingSites <comma separated URL list>\n \
\t- Example: pingSites www.google.com,www.espn.com\n \
\t- Up to 10 URLs are supported; extras are dropped.\n \
* showHandles - Display the total number of submissions.\n \
* showHandleStatus <integer> - (Ex. showHandleStatus 3)\n \
\t- Lists the requested websites and their current status.\n \
\t- Without an argument, lists every handle.\n";

/// A parsed request line: command token plus optional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `help`
    Help,
    /// `pingSites <list>`
    PingSites(Option<&'a str>),
    /// `showHandles`
    ShowHandles,
    /// `showHandleStatus [<handle>]`
    ShowHandleStatus(Option<&'a str>),
    /// Blank line; elicits no reply.
    Empty,
    /// Anything else.
    Unknown(&'a str),
}

/// Client-visible command errors.
///
/// These are recovered locally: the message becomes the reply text and
/// the connection stays open.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The handle argument was not a non-negative integer.
    #[error("Error: '{raw}' is not a valid handle. Expected a non-negative integer.")]
    BadHandleArgument {
        /// The raw argument as received.
        raw: String,
    },

    /// The handle is outside the issued range.
    #[error("Error: handle {handle} doesn't exist.")]
    UnknownHandle {
        /// The handle that was requested.
        handle: u64,
    },

    /// `pingSites` was called without any URL.
    #[error("Error: pingSites requires a comma separated list of URLs.")]
    MissingUrlList,
}

/// Splits a request line into command token and argument.
#[must_use]
pub fn parse(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let (token, arg) = match line.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, Some(rest.trim()).filter(|a| !a.is_empty())),
        None => (line, None),
    };
    match token {
        "help" => Command::Help,
        "pingSites" => Command::PingSites(arg),
        "showHandles" => Command::ShowHandles,
        "showHandleStatus" => Command::ShowHandleStatus(arg),
        other => Command::Unknown(other),
    }
}

/// Dispatches one request line and renders the reply block.
///
/// An empty reply means the session writes nothing and reads the next
/// line.
#[must_use]
pub fn dispatch(line: &str, state: &ServerState) -> String {
    match parse(line) {
        Command::Help => HELP_TEXT.to_string(),
        Command::PingSites(arg) => ping_sites(arg, state).unwrap_or_else(render_error),
        Command::ShowHandles => show_handles(state),
        Command::ShowHandleStatus(arg) => {
            show_handle_status(arg, state).unwrap_or_else(render_error)
        }
        Command::Empty => String::new(),
        Command::Unknown(token) => {
            tracing::debug!(token, "unrecognized command");
            "\nError: Unrecognized command.\nType 'help'\n\n".to_string()
        }
    }
}

fn render_error(error: CommandError) -> String {
    format!("\n{error}\n\n")
}

/// `pingSites`: create the submission, enqueue its tasks, reply with the
/// handle. Never waits for a probe.
fn ping_sites(arg: Option<&str>, state: &ServerState) -> Result<String, CommandError> {
    let urls = split_url_list(arg.unwrap_or(""));
    if urls.is_empty() {
        return Err(CommandError::MissingUrlList);
    }
    let submission = state.submit(&urls);
    tracing::info!(
        handle = submission.handle(),
        sites = submission.tasks().len(),
        "submission created"
    );
    Ok(format!(
        "Your handle for this request is: {handle}\n\
         To view status of this request, type\n\
         \t showHandleStatus {handle}\n",
        handle = submission.handle()
    ))
}

fn show_handles(state: &ServerState) -> String {
    format!("Total submissions created: {}\n", state.registry().len())
}

/// `showHandleStatus`: render one handle, or every handle in creation
/// order when no argument is given.
fn show_handle_status(arg: Option<&str>, state: &ServerState) -> Result<String, CommandError> {
    match arg {
        None => {
            let handles = state.registry().handles();
            if handles.is_empty() {
                return Ok("No handles have been created yet.\n".to_string());
            }
            let mut out = String::new();
            for handle in handles {
                // Handles are never dropped, so every id still resolves.
                if let Some(submission) = state.registry().get(handle) {
                    render_submission(&submission, &mut out);
                }
            }
            Ok(out)
        }
        Some(raw) => {
            let handle: u64 = raw
                .parse()
                .map_err(|_| CommandError::BadHandleArgument {
                    raw: raw.to_string(),
                })?;
            let submission = state
                .registry()
                .get(handle)
                .ok_or(CommandError::UnknownHandle { handle })?;
            let mut out = String::new();
            render_submission(&submission, &mut out);
            Ok(out)
        }
    }
}

/// Renders one submission's url/min/avg/max/status table.
fn render_submission(submission: &Submission, out: &mut String) {
    let _ = writeln!(out, "\nHandle {}:", submission.handle());
    let _ = writeln!(
        out,
        "  {:<49} {:>6} {:>6} {:>6}  {}",
        "URL", "MIN", "AVG", "MAX", "STATUS"
    );
    for task in submission.tasks() {
        let state = task.state();
        let _ = writeln!(
            out,
            "  {:<49} {:>6} {:>6} {:>6}  {}",
            task.url(),
            render_latency(state.stats.min_ms),
            render_latency(state.stats.avg_ms),
            render_latency(state.stats.max_ms),
            state.status
        );
    }
}

/// Renders one latency field; the `-1` sentinel displays as `-`.
fn render_latency(ms: i64) -> String {
    if ms < 0 {
        "-".to_string()
    } else {
        ms.to_string()
    }
}

/// Splits a `pingSites` argument on commas and whitespace, dropping empty
/// fragments.
fn split_url_list(arg: &str) -> Vec<String> {
    arg.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|fragment| !fragment.is_empty())
        .map(ToString::to_string)
        .collect()
}
