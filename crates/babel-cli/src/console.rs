//! Console driver.
//!
//! Implements the [`Driver`] trait over a line reader and a writer: stdin and
//! stdout for the `babel` binary, in-memory buffers in tests. Signaling
//! commands are echoed; the operator plays the server by typing `!` events.

use std::{
    io::{self, Stdout, Write},
    net::{IpAddr, Ipv4Addr},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use babel_app::{ClientConfig, Driver, Input};
use babel_client::{CallIcon, ConnectionState, SignalingCommand, UiNotification};
use babel_core::{LineOrigin, MediaEndpoint, MediaError, MediaHandle};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::{
    UdpMedia,
    command::{self, CommandError},
};

/// How long [`Driver::poll_input`] waits for a line before yielding.
const TICK: Duration = Duration::from_millis(100);

/// Console driver errors.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Console driver implementing the [`Driver`] trait.
pub struct ConsoleDriver<R, W> {
    lines: Lines<R>,
    out: W,
    media: UdpMedia,
    tick: Duration,
    toast_duration: Duration,
}

impl ConsoleDriver<BufReader<Stdin>, Stdout> {
    /// Driver on the process's stdin and stdout.
    pub fn stdio(config: &ClientConfig) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdout(), config)
    }
}

impl<R, W> ConsoleDriver<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    /// Driver reading lines from `reader` and printing to `out`.
    ///
    /// Streams bind the configured RTP port on all interfaces.
    pub fn new(reader: R, out: W, config: &ClientConfig) -> Self {
        Self {
            lines: reader.lines(),
            out,
            media: UdpMedia::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.rtp_port),
            tick: TICK,
            toast_duration: config.toast_duration,
        }
    }

    /// Replace the media adapter.
    #[must_use]
    pub fn with_media(mut self, media: UdpMedia) -> Self {
        self.media = media;
        self
    }

    /// Everything written so far.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// The media adapter.
    pub fn media(&self) -> &UdpMedia {
        &self.media
    }

    fn on_line(&mut self, line: &str) -> Result<Option<Input>, ConsoleError> {
        if line.trim() == "help" {
            writeln!(self.out, "{}", command::HELP)?;
            return Ok(None);
        }
        match command::parse_line(line, unix_time()) {
            Ok(input) => Ok(Some(input)),
            Err(CommandError::Empty) => Ok(None),
            Err(error) => {
                writeln!(self.out, "error: {error}")?;
                Ok(None)
            },
        }
    }
}

impl<R, W> Driver for ConsoleDriver<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    type Error = ConsoleError;
    type Instant = Instant;

    async fn poll_input(&mut self) -> Result<Option<Input>, Self::Error> {
        tokio::select! {
            biased;

            line = self.lines.next_line() => match line? {
                Some(line) => self.on_line(&line),
                None => Ok(Some(Input::Quit)),
            },

            () = tokio::time::sleep(self.tick) => Ok(None),
        }
    }

    async fn send_command(&mut self, command: SignalingCommand) -> Result<(), Self::Error> {
        writeln!(self.out, "-> {command:?}")?;
        Ok(())
    }

    async fn start_stream(&mut self, endpoint: MediaEndpoint) -> Result<MediaHandle, MediaError> {
        self.media.start(endpoint).await
    }

    fn stop_stream(&mut self, handle: MediaHandle) {
        self.media.stop(handle);
    }

    fn notify(&mut self, notification: UiNotification) -> Result<(), Self::Error> {
        writeln!(self.out, "{}", render(&notification, self.toast_duration))?;
        Ok(())
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn stop(&mut self) {
        self.media.stop_all();
        if let Err(error) = self.out.flush() {
            tracing::warn!(%error, "failed to flush console output");
        }
    }
}

/// One console line for a notification.
pub fn render(notification: &UiNotification, toast_duration: Duration) -> String {
    match notification {
        UiNotification::ContactAdded { peer_id, index } => {
            format!("contact {peer_id} added at {index}")
        },
        UiNotification::ContactRemoved { peer_id } => format!("contact {peer_id} removed"),
        UiNotification::ContactReordered { peer_id, from, to } => {
            format!("contact {peer_id} moved {from} -> {to}")
        },
        UiNotification::ContactSelected { peer_id } => format!("selected {peer_id}"),
        UiNotification::PresenceIconChanged { peer_id, presence } => {
            format!("{peer_id} is {presence}")
        },
        UiNotification::OwnStatusChanged { presence } => format!("status: {presence}"),
        UiNotification::ConnectionChanged { state } => {
            let state = match state {
                ConnectionState::Offline => "offline",
                ConnectionState::Connecting => "connecting",
                ConnectionState::Online => "online",
            };
            format!("connection: {state}")
        },
        UiNotification::CallButtonState(button) => {
            let icon = match button.icon {
                CallIcon::Start => "start",
                CallIcon::Stop => "stop",
            };
            let enabled = if button.enabled { "" } else { " (disabled)" };
            format!("call button: {icon}{enabled}")
        },
        UiNotification::IncomingCallPrompt { peer_id } => {
            format!("incoming call from {peer_id}: `accept {peer_id}` or `decline {peer_id}`")
        },
        UiNotification::IncomingCallWithdrawn { peer_id } => {
            format!("call from {peer_id} withdrawn")
        },
        UiNotification::MessageAppended { peer_id, origin } => match origin {
            LineOrigin::Local => format!("chat {peer_id}: sent"),
            LineOrigin::Remote => format!("chat {peer_id}: new message"),
        },
        UiNotification::ErrorToast { title, message } => {
            format!("[{title}] {message} ({}s)", toast_duration.as_secs())
        },
    }
}

fn unix_time() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_secs())
}
