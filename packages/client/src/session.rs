//! WebSocket client session management.
//!
//! One [`run_session`] call covers one connection: dial, handshake, then a
//! select loop over user input and server frames until the user disconnects,
//! quits, or the transport drops. The lifecycle decisions themselves live in
//! [`ChatClient`]; this module only moves events between it and the socket.

use std::io::Write;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as WsMessage};

use idobata_shared::{
    protocol::{Message, ServerEvent},
    time::Clock,
};

use crate::{
    commands::{ClientCommand, ClientInput, format_help, parse_input},
    error::ClientError,
    formatter::MessageFormatter,
    lifecycle::ChatClient,
    reconciler::resolve_sender,
};

/// How a session ended, when it ended on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user asked to disconnect; the client keeps running.
    Disconnected,
    /// The user asked to quit the program.
    Quit,
}

/// What the caller's loop should do after a handled input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    None,
    Connect,
    Disconnect,
    Quit,
}

/// Run a single connection until it ends.
///
/// Expects `client` to be in `Connecting` (a successful [`ChatClient::connect`]).
/// Returns `Ok` when the user ended the session and `Err` when the transport
/// did; either way the client is back in `Disconnected` on return.
pub async fn run_session(
    client: &mut ChatClient,
    url: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
    clock: &dyn Clock,
    prompt: &str,
) -> Result<SessionEnd, ClientError> {
    let (ws_stream, _response) = match connect_async(url).await {
        Ok(result) => result,
        Err(e) => {
            client.transport_closed();
            return Err(ClientError::Connection(e.to_string()));
        }
    };
    tracing::info!("Connected to {}, waiting for welcome", url);

    let (mut write, mut read) = ws_stream.split();

    // The lifecycle queues outbound events here; the pusher task drains them
    let (wire_tx, mut wire_rx) = mpsc::unbounded_channel();
    client.attach_wire(wire_tx);

    let write_task = tokio::spawn(async move {
        while let Some(event) = wire_rx.recv().await {
            let frame = event.encode();
            if write.send(WsMessage::Text(frame.into())).await.is_err() {
                return;
            }
        }
        // Channel closed by a local disconnect: announce closure to the server
        let _ = write.send(WsMessage::Close(None)).await;
    });

    let outcome = loop {
        tokio::select! {
            line = input_rx.recv() => {
                let Some(line) = line else {
                    // Input thread gone (Ctrl+C / Ctrl+D)
                    client.disconnect();
                    break Ok(SessionEnd::Quit);
                };
                match handle_line(client, clock, &line) {
                    LineAction::None => {}
                    LineAction::Connect => {
                        println!("*** Already connected");
                    }
                    LineAction::Disconnect => {
                        client.disconnect();
                        break Ok(SessionEnd::Disconnected);
                    }
                    LineAction::Quit => {
                        client.disconnect();
                        break Ok(SessionEnd::Quit);
                    }
                }
            }
            frame = read.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => match ServerEvent::decode(&text) {
                    Ok(event) => handle_server_event(client, event, prompt),
                    Err(e) => tracing::warn!("Malformed frame from server: {}", e),
                },
                Some(Ok(WsMessage::Ping(_))) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    tracing::info!("Server closed the connection");
                    client.transport_closed();
                    break Err(ClientError::Connection("connection closed by server".to_string()));
                }
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    client.transport_closed();
                    break Err(ClientError::Connection(e.to_string()));
                }
                Some(Ok(_)) => {}
            }
        }
    };

    // The wire sender was dropped above, so the pusher finishes on its own
    let _ = write_task.await;

    outcome
}

/// Apply one server frame to the client and render it.
fn handle_server_event(client: &mut ChatClient, event: ServerEvent, prompt: &str) {
    match event {
        ServerEvent::Welcome { session_id } => {
            client.handshake_ack(session_id.clone());
            print!(
                "{}",
                MessageFormatter::format_connected(client.identity().name(), &session_id)
            );
            redisplay_prompt(prompt);
        }
        ServerEvent::PresenceSnapshot { users } => {
            client.apply_snapshot(users);
            print!(
                "{}",
                MessageFormatter::format_presence_line(
                    client.view().presence(),
                    client.identity().session_id()
                )
            );
            redisplay_prompt(prompt);
        }
        ServerEvent::Message { text, user_id, ts } => {
            let message = Message { text, user_id, ts };
            // Resolve against the presence list as of right now, then append
            let rendered = {
                let sender = resolve_sender(client.view().presence(), &message.user_id);
                MessageFormatter::format_chat_message(sender, &message.text, message.ts)
            };
            print!("{}", rendered);
            client.append_message(message);
            redisplay_prompt(prompt);
        }
    }
}

/// Handle one line of user input against the client.
///
/// Used both inside a session and from the disconnected prompt loop; commands
/// that change the connection itself are returned as a [`LineAction`] for the
/// caller to act on.
pub fn handle_line(client: &mut ChatClient, clock: &dyn Clock, line: &str) -> LineAction {
    match parse_input(line) {
        ClientInput::Message(text) => {
            if text.is_empty() {
                return LineAction::None;
            }
            if let Err(e) = client.send_text(&text, clock.now_millis()) {
                println!("*** {}", e);
            }
            LineAction::None
        }
        ClientInput::Command(command) => match command {
            ClientCommand::Name(name) => {
                if name.is_empty() {
                    println!("*** Usage: /name <display name>");
                } else {
                    client.set_name(name.as_str());
                    println!("*** Display name set to '{}'", name);
                }
                LineAction::None
            }
            ClientCommand::Avatar(avatar) => {
                if avatar.is_empty() {
                    client.set_avatar("");
                    println!("*** Avatar cleared");
                } else {
                    client.set_avatar(avatar.as_str());
                    println!("*** Avatar set to '{}'", avatar);
                }
                LineAction::None
            }
            ClientCommand::Who => {
                print!(
                    "{}",
                    MessageFormatter::format_roster(
                        client.view().presence(),
                        client.identity().session_id()
                    )
                );
                LineAction::None
            }
            ClientCommand::Log => {
                print!(
                    "{}",
                    MessageFormatter::format_log(client.view().presence(), client.view().log())
                );
                LineAction::None
            }
            ClientCommand::Help => {
                println!("{}", format_help());
                LineAction::None
            }
            ClientCommand::Connect => LineAction::Connect,
            ClientCommand::Disconnect => LineAction::Disconnect,
            ClientCommand::Quit => LineAction::Quit,
            ClientCommand::Unknown(cmd) => {
                println!("*** Unknown command '/{}' (try /help)", cmd);
                LineAction::None
            }
        },
    }
}

/// Redisplay the prompt after an asynchronous print.
fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use idobata_shared::{
        protocol::{ClientEvent, SessionId},
        time::FixedClock,
    };

    fn drain(rx: &mut mpsc::UnboundedReceiver<ClientEvent>) -> Vec<ClientEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn connected_client(name: &str) -> (ChatClient, mpsc::UnboundedReceiver<ClientEvent>) {
        let mut client = ChatClient::new(name, "");
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.connect().unwrap();
        client.attach_wire(tx);
        client.handshake_ack(SessionId::new("conn-1"));
        drain(&mut rx);
        (client, rx)
    }

    #[test]
    fn test_chat_line_is_sent_with_clock_timestamp() {
        // テスト項目: 通常のテキスト行が FixedClock の時刻付きで送信される
        // given (前提条件):
        let (mut client, mut rx) = connected_client("Ada");
        let clock = FixedClock::new(1672531200000);

        // when (操作):
        let action = handle_line(&mut client, &clock, "hello everyone");

        // then (期待する結果):
        assert_eq!(action, LineAction::None);
        assert_eq!(
            drain(&mut rx),
            vec![ClientEvent::SendMessage {
                text: "hello everyone".to_string(),
                user_id: SessionId::new("conn-1"),
                ts: 1672531200000,
            }]
        );
    }

    #[test]
    fn test_blank_line_sends_nothing() {
        // テスト項目: 空行は送信されない
        // given (前提条件):
        let (mut client, mut rx) = connected_client("Ada");
        let clock = FixedClock::new(0);

        // when (操作):
        let action = handle_line(&mut client, &clock, "   ");

        // then (期待する結果):
        assert_eq!(action, LineAction::None);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_name_command_updates_identity_and_pushes() {
        // テスト項目: /name コマンドで名前が変わり、接続中なら更新が送信される
        // given (前提条件):
        let (mut client, mut rx) = connected_client("Ada");
        let clock = FixedClock::new(0);

        // when (操作):
        let action = handle_line(&mut client, &clock, "/name Grace");

        // then (期待する結果):
        assert_eq!(action, LineAction::None);
        assert_eq!(client.identity().name(), "Grace");
        assert_eq!(
            drain(&mut rx),
            vec![ClientEvent::ProfileUpdate {
                id: SessionId::new("conn-1"),
                name: "Grace".to_string(),
                avatar: String::new(),
            }]
        );
    }

    #[test]
    fn test_connection_commands_become_actions() {
        // テスト項目: 接続系コマンドが対応する LineAction に変換される
        // given (前提条件):
        let (mut client, _rx) = connected_client("Ada");
        let clock = FixedClock::new(0);

        // when (操作) / then (期待する結果):
        assert_eq!(
            handle_line(&mut client, &clock, "/connect"),
            LineAction::Connect
        );
        assert_eq!(
            handle_line(&mut client, &clock, "/disconnect"),
            LineAction::Disconnect
        );
        assert_eq!(handle_line(&mut client, &clock, "/quit"), LineAction::Quit);
    }

    #[test]
    fn test_unknown_command_sends_nothing() {
        // テスト項目: 未知のコマンドは何も送信しない
        // given (前提条件):
        let (mut client, mut rx) = connected_client("Ada");
        let clock = FixedClock::new(0);

        // when (操作):
        let action = handle_line(&mut client, &clock, "/teleport home");

        // then (期待する結果):
        assert_eq!(action, LineAction::None);
        assert!(drain(&mut rx).is_empty());
    }
}
