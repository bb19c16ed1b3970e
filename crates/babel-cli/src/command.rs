//! Console line commands.
//!
//! Plain lines are user actions. Lines starting with `!` stand in for the
//! signaling server and inject the event they name.

use std::{mem, net::SocketAddr, str::FromStr};

use babel_app::Input;
use babel_client::{SignalingEvent, UserIntent};
use babel_core::{ContactId, MediaEndpoint, Presence, SessionId};
use thiserror::Error;

/// Usage text printed by `help`.
pub const HELP: &str = "\
commands:
  call <id>              place a call
  accept <id>            accept the prompted call
  decline <id>           decline the prompted call
  hangup                 end or refuse the current call
  end <session>          end a session by number
  button                 click the call button
  select <id>            select a contact
  move <id> <index>      reorder a contact
  add <username>         request a new contact
  remove <id>            delete a contact
  msg <id> <text>        send a chat message
  status <status>        available, away, dnd or offline
  quit                   exit
signaling events:
  !connected <ok|fail>   !disconnected
  !incoming <id>         !accepted <id>        !declined <id>     !ended <id>
  !endpoint <id> <ip:port>
  !presence <id> <status>
  !contact <id> <name> <status>
  !added <ok|fail>       !message <id> <text>";

/// Errors from [`parse_line`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Blank line.
    #[error("empty command")]
    Empty,

    /// The first word is not a known command.
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),

    /// A required argument is absent.
    #[error("`{command}` needs <{argument}>")]
    MissingArgument {
        /// Command being parsed.
        command: String,
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// An argument did not parse.
    #[error("invalid {argument}: `{value}`")]
    InvalidArgument {
        /// Name of the argument.
        argument: &'static str,
        /// Text that was given.
        value: String,
    },
}

/// Parse one console line.
///
/// `timestamp` is stamped on chat messages.
///
/// # Errors
///
/// Returns [`CommandError`] for blank lines, unknown commands and bad
/// arguments.
pub fn parse_line(line: &str, timestamp: u64) -> Result<Input, CommandError> {
    let line = line.trim();
    let (signaling, body) = match line.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, line),
    };

    let mut args = Args { command: "", rest: body };
    let command = args.word().ok_or(CommandError::Empty)?;
    args.command = command;

    if signaling {
        parse_event(command, &mut args, timestamp).map(Input::Signaling)
    } else if command == "quit" {
        Ok(Input::Quit)
    } else {
        parse_intent(command, &mut args, timestamp).map(Input::User)
    }
}

fn parse_intent(command: &str, args: &mut Args<'_>, timestamp: u64) -> Result<UserIntent, CommandError> {
    let intent = match command {
        "call" => UserIntent::PlaceCall { peer_id: args.contact()? },
        "accept" => UserIntent::AcceptCall { peer_id: args.contact()? },
        "decline" => UserIntent::DeclineCall { peer_id: args.contact()? },
        "hangup" => UserIntent::HangUp,
        "end" => UserIntent::EndCall { session_id: SessionId(args.parse("session")?) },
        "button" => UserIntent::CallButtonClicked,
        "select" => UserIntent::SelectContact { peer_id: args.contact()? },
        "move" => {
            UserIntent::ReorderContact { peer_id: args.contact()?, index: args.parse("index")? }
        },
        "add" => UserIntent::AddContact { username: args.required("username")?.to_string() },
        "remove" => UserIntent::RemoveContact { peer_id: args.contact()? },
        "msg" => UserIntent::SendMessage {
            peer_id: args.contact()?,
            text: args.text("text")?,
            timestamp,
        },
        "status" => UserIntent::SetOwnStatus { presence: args.presence()? },
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(intent)
}

fn parse_event(command: &str, args: &mut Args<'_>, timestamp: u64) -> Result<SignalingEvent, CommandError> {
    let event = match command {
        "connected" => SignalingEvent::Connected { success: args.flag("result")? },
        "disconnected" => SignalingEvent::Disconnected,
        "incoming" => SignalingEvent::IncomingCall { peer_id: args.contact()? },
        "accepted" => SignalingEvent::CallAccepted { peer_id: args.contact()? },
        "declined" => SignalingEvent::CallDeclined { peer_id: args.contact()? },
        "ended" => SignalingEvent::CallEnded { peer_id: args.contact()? },
        "endpoint" => {
            let peer_id = args.contact()?;
            let addr: SocketAddr = args.parse("ip:port")?;
            SignalingEvent::PeerMediaEndpoint {
                peer_id,
                endpoint: MediaEndpoint::new(addr.ip(), addr.port()),
            }
        },
        "presence" => {
            SignalingEvent::PresenceChanged { peer_id: args.contact()?, presence: args.presence()? }
        },
        "contact" => SignalingEvent::ContactInfo {
            peer_id: args.contact()?,
            display_name: args.required("name")?.to_string(),
            presence: args.presence()?,
        },
        "added" => SignalingEvent::ContactAddResult { success: args.flag("result")? },
        "message" => SignalingEvent::MessageReceived {
            peer_id: args.contact()?,
            text: args.text("text")?,
            timestamp,
        },
        other => return Err(CommandError::Unknown(format!("!{other}"))),
    };
    Ok(event)
}

struct Args<'a> {
    command: &'a str,
    rest: &'a str,
}

impl<'a> Args<'a> {
    fn word(&mut self) -> Option<&'a str> {
        let rest = self.rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (word, tail) = rest.split_at(end);
        self.rest = tail;
        Some(word)
    }

    fn required(&mut self, argument: &'static str) -> Result<&'a str, CommandError> {
        self.word().ok_or_else(|| CommandError::MissingArgument {
            command: self.command.to_string(),
            argument,
        })
    }

    fn parse<T: FromStr>(&mut self, argument: &'static str) -> Result<T, CommandError> {
        let value = self.required(argument)?;
        value
            .parse()
            .map_err(|_| CommandError::InvalidArgument { argument, value: value.to_string() })
    }

    fn contact(&mut self) -> Result<ContactId, CommandError> {
        self.parse("id")
    }

    fn presence(&mut self) -> Result<Presence, CommandError> {
        let value = self.required("status")?;
        Presence::parse(value)
            .ok_or_else(|| CommandError::InvalidArgument { argument: "status", value: value.to_string() })
    }

    fn flag(&mut self, argument: &'static str) -> Result<bool, CommandError> {
        match self.required(argument)? {
            "ok" | "true" | "yes" => Ok(true),
            "fail" | "false" | "no" => Ok(false),
            value => Err(CommandError::InvalidArgument { argument, value: value.to_string() }),
        }
    }

    /// Remainder of the line, which must not be blank.
    fn text(&mut self, argument: &'static str) -> Result<String, CommandError> {
        let text = mem::take(&mut self.rest).trim();
        if text.is_empty() {
            return Err(CommandError::MissingArgument { command: self.command.to_string(), argument });
        }
        Ok(text.to_string())
    }
}
