//! Client-side view of the room: presence snapshots and the message log.
//!
//! The coordinator is the source of truth for presence, so each snapshot
//! fully replaces the previous one. Messages are append-only and store only
//! the sender's session identifier; they are never rewritten when presence
//! changes. Sender details are looked up at render time with
//! [`resolve_sender`], so the same log entry can render differently before
//! and after the sender leaves.

use idobata_shared::protocol::{Message, SessionId, User};

/// Everything the client knows about the room.
#[derive(Debug, Default)]
pub struct RoomView {
    presence: Vec<User>,
    log: Vec<Message>,
}

impl RoomView {
    pub fn new() -> Self {
        Self {
            presence: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Replace the presence list with a new snapshot.
    pub fn apply_presence_snapshot(&mut self, users: Vec<User>) {
        self.presence = users;
    }

    /// Append a relayed message to the log.
    pub fn append_message(&mut self, message: Message) {
        self.log.push(message);
    }

    pub fn presence(&self) -> &[User] {
        &self.presence
    }

    pub fn log(&self) -> &[Message] {
        &self.log
    }
}

/// Look up a sender in the current presence list.
///
/// Returns `None` when the sender is no longer (or not yet) present; the
/// caller renders a fallback identity in that case.
pub fn resolve_sender<'a>(presence: &'a [User], user_id: &SessionId) -> Option<&'a User> {
    presence.iter().find(|user| &user.id == user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str) -> User {
        User {
            id: SessionId::new(id),
            name: name.to_string(),
            avatar: String::new(),
        }
    }

    fn message(text: &str, user_id: &str, ts: i64) -> Message {
        Message {
            text: text.to_string(),
            user_id: SessionId::new(user_id),
            ts,
        }
    }

    #[test]
    fn test_snapshot_fully_replaces_previous_presence() {
        // テスト項目: 新しいスナップショットが前の在席リストを完全に置き換える
        // given (前提条件):
        let mut view = RoomView::new();
        view.apply_presence_snapshot(vec![user("conn-1", "Ada"), user("conn-2", "Grace")]);

        // when (操作):
        view.apply_presence_snapshot(vec![user("conn-2", "Grace")]);

        // then (期待する結果):
        assert_eq!(view.presence().len(), 1);
        assert_eq!(view.presence()[0].id, SessionId::new("conn-2"));
    }

    #[test]
    fn test_log_is_append_only_in_arrival_order() {
        // テスト項目: メッセージログが到着順に追記される
        // given (前提条件):
        let mut view = RoomView::new();

        // when (操作):
        view.append_message(message("first", "conn-1", 1000));
        view.append_message(message("second", "conn-2", 2000));

        // then (期待する結果):
        assert_eq!(view.log().len(), 2);
        assert_eq!(view.log()[0].text, "first");
        assert_eq!(view.log()[1].text, "second");
    }

    #[test]
    fn test_log_survives_presence_changes() {
        // テスト項目: 在席リストが変わってもログのエントリは書き換わらない
        // given (前提条件):
        let mut view = RoomView::new();
        view.apply_presence_snapshot(vec![user("conn-1", "Ada")]);
        view.append_message(message("hi", "conn-1", 1000));

        // when (操作):
        view.apply_presence_snapshot(Vec::new()); // Ada left

        // then (期待する結果):
        assert_eq!(view.log().len(), 1);
        assert_eq!(view.log()[0].user_id, SessionId::new("conn-1"));
    }

    #[test]
    fn test_resolve_sender_finds_present_user() {
        // テスト項目: 在席中の送信者が解決される
        // given (前提条件):
        let presence = vec![user("conn-1", "Ada"), user("conn-2", "Grace")];

        // when (操作):
        let resolved = resolve_sender(&presence, &SessionId::new("conn-2"));

        // then (期待する結果):
        assert_eq!(resolved.map(|u| u.name.as_str()), Some("Grace"));
    }

    #[test]
    fn test_resolve_sender_returns_none_after_departure() {
        // テスト項目: 退出済みの送信者は解決されず None になる
        // given (前提条件):
        let presence = vec![user("conn-2", "Grace")];

        // when (操作):
        let resolved = resolve_sender(&presence, &SessionId::new("conn-1"));

        // then (期待する結果):
        assert!(resolved.is_none());
    }
}
