//! Local debug mode: the chat is your terminal.
//!
//! [`ConsoleConnection`] pretends to be a gateway with a single channel,
//! `#console`. Each input line becomes a message; `name: text` speaks as
//! `name` when that is one of the configured users, anything else speaks
//! as the first user. Everything the bot says is printed as plain text.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chatforge_protocol::text::{escape_text, sendable_text_to_text};
use chatforge_protocol::{ChannelId, ChannelInfo, ChatEvent, Codec, OutboundEvent, UserId, UserInfo};
use chatforge_transport::{Connection, ConnectionId, TransportError};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::sync::Mutex;

type LineReader = Lines<BufReader<Box<dyn AsyncRead + Send + Unpin>>>;
type LineWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Id of the one channel the console has.
pub const CONSOLE_CHANNEL: &str = "C0";
const CONSOLE_CHANNEL_NAME: &str = "console";

/// A [`Connection`] backed by a line reader and a writer.
pub struct ConsoleConnection<C> {
    id: ConnectionId,
    codec: C,
    users: Vec<UserInfo>,
    lines: Mutex<LineReader>,
    out: Mutex<LineWriter>,
    greeted: AtomicBool,
    next_ts: AtomicU64,
}

impl<C: Codec> ConsoleConnection<C> {
    /// A console on the process's stdin and stdout.
    pub fn stdio(user_names: &[String], codec: C) -> Self {
        Self::from_io(
            Box::new(tokio::io::stdin()),
            Box::new(tokio::io::stdout()),
            user_names,
            codec,
        )
    }

    /// A console on arbitrary streams.
    pub fn from_io(
        reader: Box<dyn AsyncRead + Send + Unpin>,
        writer: LineWriter,
        user_names: &[String],
        codec: C,
    ) -> Self {
        let mut users: Vec<UserInfo> = user_names
            .iter()
            .enumerate()
            .map(|(i, name)| UserInfo {
                id: UserId::new(format!("U{}", i + 1)),
                name: name.clone(),
                is_bot: false,
            })
            .collect();
        if users.is_empty() {
            users.push(UserInfo {
                id: UserId::new("U1"),
                name: "console".to_owned(),
                is_bot: false,
            });
        }
        Self {
            id: ConnectionId::next(),
            codec,
            users,
            lines: Mutex::new(BufReader::new(reader).lines()),
            out: Mutex::new(writer),
            greeted: AtomicBool::new(false),
            next_ts: AtomicU64::new(1),
        }
    }

    /// The roster announced to the bot when the console opens.
    fn hello(&self) -> ChatEvent {
        ChatEvent::Hello {
            users: self.users.clone(),
            channels: vec![ChannelInfo {
                id: ChannelId::new(CONSOLE_CHANNEL),
                name: CONSOLE_CHANNEL_NAME.to_owned(),
            }],
        }
    }

    /// Turns one input line into a message event.
    fn message(&self, line: &str) -> ChatEvent {
        let (user, text) = match line.split_once(':') {
            Some((name, text)) => match self.users.iter().find(|u| u.name == name.trim()) {
                Some(user) => (user, text.trim()),
                None => (&self.users[0], line),
            },
            None => (&self.users[0], line),
        };
        let ts = self.next_ts.fetch_add(1, Ordering::Relaxed);
        ChatEvent::message(
            ChannelId::new(CONSOLE_CHANNEL),
            user.id.clone(),
            escape_text(text),
            format!("{ts}.000000"),
        )
    }

    fn encode(&self, event: &ChatEvent) -> Result<Vec<u8>, TransportError> {
        self.codec
            .encode(event)
            .map_err(|e| TransportError::ReceiveFailed(io::Error::other(e)))
    }

    fn user_name(&self, id: &UserId) -> Option<String> {
        self.users
            .iter()
            .find(|u| &u.id == id)
            .map(|u| u.name.clone())
    }
}

impl<C: Codec> Connection for ConsoleConnection<C> {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let event: OutboundEvent = self
            .codec
            .decode(data)
            .map_err(|e| TransportError::SendFailed(io::Error::other(e)))?;
        let text = sendable_text_to_text(
            event.text(),
            |id| self.user_name(id),
            |_| Some(CONSOLE_CHANNEL_NAME.to_owned()),
        );

        let mut out = self.out.lock().await;
        out.write_all(format!("{text}\n").as_bytes())
            .await
            .map_err(TransportError::SendFailed)?;
        out.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        if !self.greeted.swap(true, Ordering::Relaxed) {
            return self.encode(&self.hello()).map(Some);
        }

        let mut lines = self.lines.lock().await;
        loop {
            let Some(line) = lines
                .next_line()
                .await
                .map_err(TransportError::ReceiveFailed)?
            else {
                return Ok(None);
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return self.encode(&self.message(line)).map(Some);
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.out
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatforge_protocol::JsonCodec;
    use tokio::io::AsyncReadExt;

    fn console(input: &'static str) -> (ConsoleConnection<JsonCodec>, tokio::io::DuplexStream) {
        let (writer, reader) = tokio::io::duplex(4096);
        let conn = ConsoleConnection::from_io(
            Box::new(input.as_bytes()),
            Box::new(writer),
            &["alice".to_owned(), "bob".to_owned()],
            JsonCodec,
        );
        (conn, reader)
    }

    async fn next_event(conn: &ConsoleConnection<JsonCodec>) -> Option<ChatEvent> {
        let bytes = conn.recv().await.unwrap()?;
        Some(JsonCodec.decode(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_hello_comes_first() {
        let (conn, _out) = console("");

        let Some(ChatEvent::Hello { users, channels }) = next_event(&conn).await else {
            panic!("expected hello");
        };
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].name, "bob");
        assert_eq!(channels[0].name, "console");
        assert!(next_event(&conn).await.is_none());
    }

    #[tokio::test]
    async fn test_lines_become_messages() {
        let (conn, _out) = console("bob: >\n\nhello there\nmallory: hi\n");
        next_event(&conn).await;

        let first = next_event(&conn).await.unwrap();
        assert_eq!(first.sender(), Some(&UserId::new("U2")));
        assert_eq!(first.text(), Some("&gt;"));
        assert_eq!(first.channel(), Some(&ChannelId::new(CONSOLE_CHANNEL)));

        let second = next_event(&conn).await.unwrap();
        assert_eq!(second.sender(), Some(&UserId::new("U1")));
        assert_eq!(second.text(), Some("hello there"));

        let third = next_event(&conn).await.unwrap();
        assert_eq!(third.sender(), Some(&UserId::new("U1")));
        assert_eq!(third.text(), Some("mallory: hi"));

        assert!(next_event(&conn).await.is_none());
    }

    #[tokio::test]
    async fn test_send_prints_plain_text() {
        let (conn, mut out) = console("");
        let event = OutboundEvent::message(ChannelId::new(CONSOLE_CHANNEL), "hi <@U2> &amp; all");

        conn.send(&JsonCodec.encode(&event).unwrap()).await.unwrap();
        conn.close().await.unwrap();

        let mut printed = String::new();
        out.read_to_string(&mut printed).await.unwrap();
        assert_eq!(printed, "hi @bob & all\n");
    }
}
