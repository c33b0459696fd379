//! Message formatting utilities for client display.
//!
//! All lookups from session identifier to display identity happen here, at
//! render time, against whatever presence snapshot is current. A sender who
//! has left since their message arrived renders with the fallback identity.

use idobata_shared::{
    protocol::{Message, SessionId, User},
    time::timestamp_to_rfc3339,
};

use crate::directory::DirectoryProfile;

/// Display name used when a sender cannot be resolved or has no name yet.
pub const FALLBACK_NAME: &str = "unknown";

/// Avatar reference used when a user has no avatar or cannot be resolved.
pub const PLACEHOLDER_AVATAR: &str = "https://www.gravatar.com/avatar/0?d=mp";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Pick the name to render for a user entry.
    fn display_name(name: &str) -> &str {
        if name.is_empty() { FALLBACK_NAME } else { name }
    }

    /// Pick the avatar reference to render for a user entry.
    pub fn display_avatar(avatar: &str) -> &str {
        if avatar.is_empty() {
            PLACEHOLDER_AVATAR
        } else {
            avatar
        }
    }

    /// Format the post-handshake confirmation line.
    pub fn format_connected(name: &str, session_id: &SessionId) -> String {
        format!("\n*** Connected as '{}' (session {})\n", name, session_id)
    }

    /// Format a one-line presence summary, printed when a snapshot arrives.
    pub fn format_presence_line(users: &[User], own_session: Option<&SessionId>) -> String {
        if users.is_empty() {
            return "\n*** Present (0): (no one present)\n".to_string();
        }
        let names: Vec<String> = users
            .iter()
            .map(|user| {
                let me_suffix = if Some(&user.id) == own_session {
                    " (me)"
                } else {
                    ""
                };
                format!("{}{}", Self::display_name(&user.name), me_suffix)
            })
            .collect();
        format!("\n*** Present ({}): {}\n", users.len(), names.join(", "))
    }

    /// Format the full roster for the `/who` command.
    pub fn format_roster(users: &[User], own_session: Option<&SessionId>) -> String {
        let mut output = String::new();
        output.push_str("\n============================================================\n");
        output.push_str(&format!("Present ({}):\n", users.len()));

        if users.is_empty() {
            output.push_str("(no one present)\n");
        } else {
            for user in users {
                let me_suffix = if Some(&user.id) == own_session {
                    " (me)"
                } else {
                    ""
                };
                output.push_str(&format!(
                    "{}{} - {}\n",
                    Self::display_name(&user.name),
                    me_suffix,
                    Self::display_avatar(&user.avatar)
                ));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format a single chat message block.
    ///
    /// `sender` is the result of resolving the message's session identifier
    /// against the current presence list; `None` renders the fallback
    /// identity.
    pub fn format_chat_message(sender: Option<&User>, text: &str, ts: i64) -> String {
        let name = sender.map_or(FALLBACK_NAME, |user| Self::display_name(&user.name));
        let timestamp_str = timestamp_to_rfc3339(ts);
        format!(
            "\n\n------------------------------------------------------------\n\
             @{}: {}\n\
             sent at {}\n\
             ------------------------------------------------------------\n",
            name, text, timestamp_str
        )
    }

    /// Format the whole message log for the `/log` command.
    ///
    /// Each entry is resolved against `presence` as it stands now, so the
    /// same log can render differently after senders leave.
    pub fn format_log(presence: &[User], log: &[Message]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n=== Message log ({}) ===\n", log.len()));

        if log.is_empty() {
            output.push_str("(no messages yet)\n");
        } else {
            for message in log {
                let sender = crate::reconciler::resolve_sender(presence, &message.user_id);
                let name = sender.map_or(FALLBACK_NAME, |user| Self::display_name(&user.name));
                output.push_str(&format!(
                    "[{}] {}: {}\n",
                    timestamp_to_rfc3339(message.ts),
                    name,
                    message.text
                ));
            }
        }

        output
    }

    /// Format the decorative profile directory shown at startup.
    pub fn format_directory(profiles: &[DirectoryProfile]) -> String {
        let mut output = String::new();
        output.push_str("\n=== Who else is here? ===\n");

        if profiles.is_empty() {
            output.push_str("(directory is empty)\n");
        } else {
            for profile in profiles {
                output.push_str(&format!("{} ({})\n", profile.display_name, profile.username));
            }
        }

        output
    }
}
