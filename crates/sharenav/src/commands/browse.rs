//! `browse`: drive a session from sign-in to share selection.

use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use sharenav_config::KeyringCredentials;
use sharenav_core::{
    Collaborators, EventBus, HttpDiscovery, HttpTransport, Server, ServerId, Session,
    SessionController, SessionEnd, Share, Step,
};

use crate::cli::{BrowseArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Notice, TerminalSink};
use crate::prompt::TerminalPrompt;

/// What the loop does after a notice.
enum Next {
    Continue,
    Done,
}

pub async fn handle(args: BrowseArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::resolve(global)?;
    let mut session_config = cfg.to_session_config()?;
    if let Some(mode) = args.mode {
        session_config.default_mode = mode.into();
    }
    let color = output::should_color(global.color);

    let (bus, queue) = EventBus::new();
    let events = bus.sender();
    let sink = Rc::new(TerminalSink::default());
    let collaborators = Collaborators {
        credentials: Rc::new(KeyringCredentials::new(
            cfg.identity.as_deref(),
            Arc::new(TerminalPrompt),
            events.clone(),
        )),
        discovery: Rc::new(HttpDiscovery::new(&session_config, events.clone())?),
        transport: Rc::new(HttpTransport::new(&session_config, events)?),
        sink: sink.clone(),
    };

    let mut session = Session::new(&session_config, Rc::new(bus), queue, collaborators);

    let cancel = session.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    session.start();
    loop {
        let step = session.step().await?;

        let mut notices = sink.drain();
        while !notices.is_empty() {
            for notice in notices {
                if let Next::Done = react(notice, &args, global, session.controller(), color)? {
                    return Ok(());
                }
            }
            notices = sink.drain();
        }

        match step {
            Step::Dispatched => {}
            Step::Finished(SessionEnd::Closed) => return Err(CliError::Cancelled),
            Step::Finished(SessionEnd::Cancelled) => return Err(CliError::Interrupted),
        }
    }
}

fn react(
    notice: Notice,
    args: &BrowseArgs,
    global: &GlobalOpts,
    controller: &SessionController,
    color: bool,
) -> Result<Next, CliError> {
    debug!(?notice, "rendering");
    match notice {
        Notice::Servers(servers) => {
            let Some(ref wanted) = args.server else {
                output::print_output(&output::render_servers(global.output, &servers)?);
                return Ok(Next::Done);
            };
            let id = find_server(&servers, wanted)?;
            if let Some(server) = servers.iter().find(|s| s.id == id) {
                output::print_status(&format!("Opening {}...", server.name), color);
            }
            controller.select_server(&id)?;
            Ok(Next::Continue)
        }
        Notice::ServersError => Err(CliError::LoadFailed {
            what: "server list",
        }),
        Notice::Shares(shares) => {
            let Some(ref wanted) = args.share else {
                output::print_output(&output::render_shares(global.output, &shares)?);
                return Ok(Next::Done);
            };
            let share = find_share(&shares, wanted)?;
            controller.select_share(&share.id)?;
            Ok(Next::Continue)
        }
        Notice::SharesError => Err(CliError::LoadFailed {
            what: "share list",
        }),
        Notice::Selected(share) => {
            output::print_output(&output::render_selected(global.output, &share)?);
            Ok(Next::Done)
        }
        Notice::Close => Err(CliError::Cancelled),
    }
}

/// Resolve `wanted` as an id, then a name, then a list position.
fn find_server(servers: &[Server], wanted: &str) -> Result<ServerId, CliError> {
    servers
        .iter()
        .find(|s| s.id.as_str() == wanted)
        .or_else(|| servers.iter().find(|s| s.name.eq_ignore_ascii_case(wanted)))
        .or_else(|| wanted.parse::<usize>().ok().and_then(|i| servers.get(i)))
        .map(|s| s.id.clone())
        .ok_or_else(|| CliError::NotFound {
            resource_type: "server",
            identifier: wanted.to_owned(),
            list_command: "browse".into(),
        })
}

/// Resolve `wanted` as a share id, then a name.
fn find_share<'a>(shares: &'a [Share], wanted: &str) -> Result<&'a Share, CliError> {
    shares
        .iter()
        .find(|s| s.id.as_str() == wanted)
        .or_else(|| shares.iter().find(|s| s.name.eq_ignore_ascii_case(wanted)))
        .ok_or_else(|| CliError::NotFound {
            resource_type: "share",
            identifier: wanted.to_owned(),
            list_command: "browse --server <SERVER>".into(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn servers() -> Vec<Server> {
        vec![Server::new("a1", "Home", true), Server::new("b2", "Cabin", true)]
    }

    #[test]
    fn server_lookup_prefers_id_then_name_then_index() {
        assert_eq!(find_server(&servers(), "b2").unwrap(), ServerId::new("b2"));
        assert_eq!(find_server(&servers(), "home").unwrap(), ServerId::new("a1"));
        assert_eq!(find_server(&servers(), "1").unwrap(), ServerId::new("b2"));
        assert!(matches!(
            find_server(&servers(), "attic"),
            Err(CliError::NotFound { .. })
        ));
    }

    #[test]
    fn share_lookup_matches_name_case_insensitively() {
        let shares = vec![Share::new("m", "Movies", ServerId::new("a1"))];
        assert_eq!(find_share(&shares, "movies").unwrap().id.as_str(), "m");
        assert!(find_share(&shares, "music").is_err());
    }
}
