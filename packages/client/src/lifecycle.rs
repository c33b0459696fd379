//! Connection lifecycle state machine for the chat client.
//!
//! [`ChatClient`] owns the local identity and room view and decides what goes
//! out on the wire. It is transport-free: the session layer attaches an
//! outbound channel after dialing and feeds incoming events back in, which
//! keeps every transition testable without a socket.
//!
//! Connections are explicit. A dropped link lands back in `Disconnected` and
//! stays there until the user asks to connect again; there is no automatic
//! reconnect.

use tokio::sync::mpsc;

use idobata_shared::protocol::{ClientEvent, Message, SessionId, User};

use crate::{error::ClientError, identity::SessionIdentity, reconciler::RoomView};

/// Where the client currently stands relative to the coordinator.
///
/// `Connecting` covers the window between dialing and the coordinator's
/// welcome frame; `Connected` begins when the welcome arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// The client-side protocol engine.
pub struct ChatClient {
    state: ConnectionState,
    identity: SessionIdentity,
    view: RoomView,
    wire: Option<mpsc::UnboundedSender<ClientEvent>>,
}

impl ChatClient {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            identity: SessionIdentity::new(name, avatar),
            view: RoomView::new(),
            wire: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn view(&self) -> &RoomView {
        &self.view
    }

    /// Begin connecting.
    ///
    /// Returns `Ok(false)` without side effects when a connection attempt is
    /// already underway or established. Fails validation before anything
    /// reaches the wire, leaving the client observably unchanged.
    pub fn connect(&mut self) -> Result<bool, ClientError> {
        if self.state != ConnectionState::Disconnected {
            return Ok(false);
        }
        self.identity.validate_for_connect()?;
        self.state = ConnectionState::Connecting;
        Ok(true)
    }

    /// Attach the outbound channel of a freshly dialed connection.
    pub fn attach_wire(&mut self, wire: mpsc::UnboundedSender<ClientEvent>) {
        self.wire = Some(wire);
    }

    /// Complete the handshake with the coordinator's welcome frame.
    ///
    /// Stores the assigned session identifier, enters `Connected`, and
    /// immediately pushes the full current profile so the coordinator's empty
    /// placeholder entry (including any edits made while the handshake was in
    /// flight) is filled in.
    pub fn handshake_ack(&mut self, session_id: SessionId) {
        if self.state != ConnectionState::Connecting {
            tracing::debug!("Ignoring welcome frame in state {:?}", self.state);
            return;
        }
        self.identity.assign_session(session_id);
        self.state = ConnectionState::Connected;
        self.push_profile();
    }

    /// Change the display name, pushing a profile update if connected.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.identity.set_name(name);
        if self.state == ConnectionState::Connected {
            self.push_profile();
        }
    }

    /// Change the avatar, pushing a profile update if connected.
    pub fn set_avatar(&mut self, avatar: impl Into<String>) {
        self.identity.set_avatar(avatar);
        if self.state == ConnectionState::Connected {
            self.push_profile();
        }
    }

    /// Queue a chat message for sending.
    ///
    /// `ts` is the sender-local timestamp in Unix milliseconds.
    pub fn send_text(&mut self, text: &str, ts: i64) -> Result<(), ClientError> {
        if self.state != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }
        if text.is_empty() {
            return Err(ClientError::Validation(
                "message text must not be empty".to_string(),
            ));
        }
        let Some(user_id) = self.identity.session_id().cloned() else {
            return Err(ClientError::NotConnected);
        };
        self.push(ClientEvent::SendMessage {
            text: text.to_string(),
            user_id,
            ts,
        });
        Ok(())
    }

    /// Tear down the current connection, if any.
    ///
    /// Returns `false` as a no-op when already disconnected. The cached
    /// session identifier is cleared; the next connection gets a fresh one.
    pub fn disconnect(&mut self) -> bool {
        if self.state == ConnectionState::Disconnected {
            return false;
        }
        self.reset_connection();
        true
    }

    /// The transport dropped out from under us.
    pub fn transport_closed(&mut self) {
        self.reset_connection();
    }

    /// Apply a presence snapshot from the coordinator.
    pub fn apply_snapshot(&mut self, users: Vec<User>) {
        self.view.apply_presence_snapshot(users);
    }

    /// Append a relayed message to the local log.
    pub fn append_message(&mut self, message: Message) {
        self.view.append_message(message);
    }

    fn reset_connection(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.identity.clear_session();
        self.wire = None;
        // The room view is kept; it simply goes stale until the next snapshot
    }

    fn push_profile(&mut self) {
        let Some(id) = self.identity.session_id().cloned() else {
            return;
        };
        let event = ClientEvent::ProfileUpdate {
            id,
            name: self.identity.name().to_string(),
            avatar: self.identity.avatar().to_string(),
        };
        self.push(event);
    }

    fn push(&mut self, event: ClientEvent) {
        if let Some(wire) = &self.wire
            && wire.send(event).is_err()
        {
            tracing::warn!("Outbound channel closed; event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drain everything currently queued on the outbound channel.
    fn drain(rx: &mut mpsc::UnboundedReceiver<ClientEvent>) -> Vec<ClientEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// A client taken through connect, wire attach, and handshake, with the
    /// initial profile push already drained.
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
    fn test_new_client_starts_disconnected() {
        // テスト項目: 生成直後のクライアントは未接続でセッション ID を持たない
        // given (前提条件):

        // when (操作):
        let client = ChatClient::new("Ada", "");

        // then (期待する結果):
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert_eq!(client.identity().session_id(), None);
    }

    #[test]
    fn test_connect_with_empty_name_fails_without_side_effects() {
        // テスト項目: 空の名前での接続はエラーになり、状態もイベントも変化しない
        // given (前提条件):
        let mut client = ChatClient::new("", "");
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.attach_wire(tx);

        // when (操作):
        let result = client.connect();

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_connect_enters_connecting_without_emitting() {
        // テスト項目: connect() は Connecting に遷移するだけで何も送信しない
        // given (前提条件):
        let mut client = ChatClient::new("Ada", "");
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.attach_wire(tx);

        // when (操作):
        let started = client.connect().unwrap();

        // then (期待する結果):
        assert!(started);
        assert_eq!(client.state(), ConnectionState::Connecting);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_connect_while_connected_is_noop() {
        // テスト項目: 接続中の connect() は副作用なしの no-op になる
        // given (前提条件):
        let (mut client, mut rx) = connected_client("Ada");

        // when (操作):
        let started = client.connect().unwrap();

        // then (期待する結果):
        assert!(!started);
        assert_eq!(client.state(), ConnectionState::Connected);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_handshake_ack_pushes_full_profile() {
        // テスト項目: welcome 受信で Connected になり、全プロフィールが送信される
        // given (前提条件):
        let mut client = ChatClient::new("Ada", "https://example.com/ada.png");
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.connect().unwrap();
        client.attach_wire(tx);

        // when (操作):
        client.handshake_ack(SessionId::new("conn-1"));

        // then (期待する結果):
        assert_eq!(client.state(), ConnectionState::Connected);
        assert_eq!(
            client.identity().session_id(),
            Some(&SessionId::new("conn-1"))
        );
        assert_eq!(
            drain(&mut rx),
            vec![ClientEvent::ProfileUpdate {
                id: SessionId::new("conn-1"),
                name: "Ada".to_string(),
                avatar: "https://example.com/ada.png".to_string(),
            }]
        );
    }

    #[test]
    fn test_edits_while_connecting_are_flushed_by_handshake() {
        // テスト項目: ハンドシェイク中の編集は welcome 時のプロフィール送信に反映される
        // given (前提条件):
        let mut client = ChatClient::new("Ada", "");
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.connect().unwrap();
        client.attach_wire(tx);
        client.set_name("Ada L.");
        assert!(drain(&mut rx).is_empty()); // nothing sent while Connecting

        // when (操作):
        client.handshake_ack(SessionId::new("conn-1"));

        // then (期待する結果):
        match drain(&mut rx).pop() {
            Some(ClientEvent::ProfileUpdate { name, .. }) => assert_eq!(name, "Ada L."),
            other => panic!("expected profile update, got {:?}", other),
        }
    }

    #[test]
    fn test_set_name_while_connected_pushes_update() {
        // テスト項目: 接続中の名前変更がプロフィール更新として送信される
        // given (前提条件):
        let (mut client, mut rx) = connected_client("Ada");

        // when (操作):
        client.set_name("Countess");

        // then (期待する結果):
        assert_eq!(
            drain(&mut rx),
            vec![ClientEvent::ProfileUpdate {
                id: SessionId::new("conn-1"),
                name: "Countess".to_string(),
                avatar: String::new(),
            }]
        );
    }

    #[test]
    fn test_set_name_while_disconnected_stays_local() {
        // テスト項目: 未接続時の名前変更はローカルに保持され、送信されない
        // given (前提条件):
        let mut client = ChatClient::new("Ada", "");
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.attach_wire(tx);

        // when (操作):
        client.set_name("Countess");

        // then (期待する結果):
        assert_eq!(client.identity().name(), "Countess");
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_send_text_requires_connection() {
        // テスト項目: 未接続での送信は NotConnected エラーになる
        // given (前提条件):
        let mut client = ChatClient::new("Ada", "");

        // when (操作):
        let result = client.send_text("hello", 1000);

        // then (期待する結果):
        assert_eq!(result, Err(ClientError::NotConnected));
    }

    #[test]
    fn test_send_text_rejects_empty_message() {
        // テスト項目: 空のメッセージは送信されずバリデーションエラーになる
        // given (前提条件):
        let (mut client, mut rx) = connected_client("Ada");

        // when (操作):
        let result = client.send_text("", 1000);

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_send_text_stamps_own_session_and_timestamp() {
        // テスト項目: 送信メッセージに自分のセッション ID と指定時刻が載る
        // given (前提条件):
        let (mut client, mut rx) = connected_client("Ada");

        // when (操作):
        client.send_text("hello", 1672531200000).unwrap();

        // then (期待する結果):
        assert_eq!(
            drain(&mut rx),
            vec![ClientEvent::SendMessage {
                text: "hello".to_string(),
                user_id: SessionId::new("conn-1"),
                ts: 1672531200000,
            }]
        );
    }

    #[test]
    fn test_disconnect_clears_session_and_reports_noop() {
        // テスト項目: 切断でセッション ID が消え、二度目の切断は no-op になる
        // given (前提条件):
        let (mut client, _rx) = connected_client("Ada");

        // when (操作):
        let first = client.disconnect();
        let second = client.disconnect();

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert_eq!(client.identity().session_id(), None);
    }

    #[test]
    fn test_transport_closed_detaches_wire() {
        // テスト項目: 回線断の後はプロフィール編集しても何も送信されない
        // given (前提条件):
        let (mut client, mut rx) = connected_client("Ada");

        // when (操作):
        client.transport_closed();
        client.set_name("Countess");

        // then (期待する結果):
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_view_survives_disconnect() {
        // テスト項目: 切断後もログと在席リストのローカルビューは残る
        // given (前提条件):
        let (mut client, _rx) = connected_client("Ada");
        client.apply_snapshot(vec![User {
            id: SessionId::new("conn-2"),
            name: "Grace".to_string(),
            avatar: String::new(),
        }]);
        client.append_message(Message {
            text: "hi".to_string(),
            user_id: SessionId::new("conn-2"),
            ts: 1000,
        });

        // when (操作):
        client.disconnect();

        // then (期待する結果):
        assert_eq!(client.view().presence().len(), 1);
        assert_eq!(client.view().log().len(), 1);
    }
}
