//! Terminal presentation.
//!
//! [`TerminalSink`] queues what the session asks to show; the browse loop
//! drains the queue after each dispatch step and renders it here. Tables
//! use `tabled`, structured output uses serde.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use sharenav_core::{PresentationSink, Server, Share};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Sink ─────────────────────────────────────────────────────────────

/// Something the session asked the terminal to show.
#[derive(Debug, Clone)]
pub enum Notice {
    Servers(Vec<Server>),
    ServersError,
    Shares(Vec<Share>),
    SharesError,
    Selected(Share),
    Close,
}

#[derive(Debug, Default)]
pub struct TerminalSink {
    notices: RefCell<VecDeque<Notice>>,
}

impl TerminalSink {
    /// Take every queued notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        self.notices.borrow_mut().drain(..).collect()
    }

    fn push(&self, notice: Notice) {
        self.notices.borrow_mut().push_back(notice);
    }
}

impl PresentationSink for TerminalSink {
    fn show_servers_content(&self, servers: &[Server]) {
        self.push(Notice::Servers(servers.to_vec()));
    }

    fn show_servers_error(&self) {
        self.push(Notice::ServersError);
    }

    fn show_shares_content(&self, shares: &[Share]) {
        self.push(Notice::Shares(shares.to_vec()));
    }

    fn show_shares_error(&self) {
        self.push(Notice::SharesError);
    }

    fn share_selected(&self, share: &Share) {
        self.push(Notice::Selected(share.clone()));
    }

    fn request_close(&self) {
        self.push(Notice::Close);
    }
}

// ── Rows ─────────────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServerRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Tabled)]
struct ShareRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

// ── Renderers ────────────────────────────────────────────────────────

pub fn render_servers(format: OutputFormat, servers: &[Server]) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Table => render_table(servers.iter().enumerate().map(|(index, s)| ServerRow {
            index,
            id: s.id.to_string(),
            name: s.name.clone(),
        })),
        OutputFormat::Json => serde_json::to_string_pretty(servers)?,
        OutputFormat::Plain => lines(servers.iter().map(|s| s.name.as_str())),
    })
}

pub fn render_shares(format: OutputFormat, shares: &[Share]) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Table => render_table(shares.iter().map(|s| ShareRow {
            id: s.id.to_string(),
            name: s.name.clone(),
        })),
        OutputFormat::Json => serde_json::to_string_pretty(shares)?,
        OutputFormat::Plain => lines(shares.iter().map(|s| s.name.as_str())),
    })
}

pub fn render_selected(format: OutputFormat, share: &Share) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(share)?,
        OutputFormat::Table | OutputFormat::Plain => {
            format!("{} ({} on {})", share.name, share.id, share.server)
        }
    })
}

fn render_table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn lines<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join("\n")
}

// ── Printing ─────────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Print rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a one-line status message to stderr.
pub fn print_status(message: &str, color: bool) {
    let mut stderr = io::stderr().lock();
    if color {
        let _ = writeln!(stderr, "{}", message.dimmed());
    } else {
        let _ = writeln!(stderr, "{message}");
    }
}
