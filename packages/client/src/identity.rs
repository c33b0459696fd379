//! Local profile and session identity.

use idobata_shared::protocol::SessionId;

use crate::error::ClientError;

/// Snapshot of the local profile as it would go out on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Coordinator-assigned identifier; `None` while disconnected
    pub id: Option<SessionId>,
    pub name: String,
    pub avatar: String,
}

/// The user's profile plus the session identifier of the current connection.
///
/// Name and avatar are editable at any time, connected or not. The session
/// identifier only exists while a connection is established; it is assigned
/// by the coordinator's welcome frame and cleared the moment the connection
/// ends, because the next connection gets a fresh one.
#[derive(Debug, Clone, Default)]
pub struct SessionIdentity {
    session_id: Option<SessionId>,
    name: String,
    avatar: String,
}

impl SessionIdentity {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            session_id: None,
            name: name.into(),
            avatar: avatar.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn avatar(&self) -> &str {
        &self.avatar
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_avatar(&mut self, avatar: impl Into<String>) {
        self.avatar = avatar.into();
    }

    pub fn assign_session(&mut self, session_id: SessionId) {
        self.session_id = Some(session_id);
    }

    pub fn clear_session(&mut self) {
        self.session_id = None;
    }

    /// The profile as it stands right now.
    pub fn current_profile(&self) -> Profile {
        Profile {
            id: self.session_id.clone(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }

    /// Check the preconditions for opening a connection.
    ///
    /// An empty (or whitespace-only) display name is rejected; the avatar may
    /// be empty.
    pub fn validate_for_connect(&self) -> Result<(), ClientError> {
        if self.name.trim().is_empty() {
            return Err(ClientError::Validation(
                "display name is required before connecting".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_name() {
        // テスト項目: 空の名前では接続前バリデーションが失敗する
        // given (前提条件):
        let identity = SessionIdentity::new("", "");

        // when (操作):
        let result = identity.validate_for_connect();

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_whitespace_only_name() {
        // テスト項目: 空白のみの名前では接続前バリデーションが失敗する
        // given (前提条件):
        let identity = SessionIdentity::new("   ", "");

        // when (操作):
        let result = identity.validate_for_connect();

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_validate_accepts_name_without_avatar() {
        // テスト項目: アバターが空でも名前があればバリデーションが通る
        // given (前提条件):
        let identity = SessionIdentity::new("Ada", "");

        // when (操作):
        let result = identity.validate_for_connect();

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[test]
    fn test_current_profile_reflects_edits_and_session() {
        // テスト項目: プロフィールが編集とセッション割り当てを反映する
        // given (前提条件):
        let mut identity = SessionIdentity::new("Ada", "");

        // when (操作):
        identity.set_avatar("https://example.com/ada.png");
        identity.assign_session(SessionId::new("conn-1"));
        let profile = identity.current_profile();

        // then (期待する結果):
        assert_eq!(profile.id, Some(SessionId::new("conn-1")));
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.avatar, "https://example.com/ada.png");
    }

    #[test]
    fn test_clear_session_keeps_profile_fields() {
        // テスト項目: セッション解除後も名前とアバターは保持される
        // given (前提条件):
        let mut identity = SessionIdentity::new("Ada", "https://example.com/ada.png");
        identity.assign_session(SessionId::new("conn-1"));

        // when (操作):
        identity.clear_session();

        // then (期待する結果):
        assert_eq!(identity.session_id(), None);
        assert_eq!(identity.name(), "Ada");
        assert_eq!(identity.avatar(), "https://example.com/ada.png");
    }
}
