//! Wire types and the records built from them.
//!
//! Each endpoint response is decoded into an explicit structure. Required
//! fields are required: a search page without `messages` is a decode error,
//! not an empty page.

use crate::snowflake::Snowflake;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account id, used as the default author filter.
    pub account_id: Snowflake,
    /// Human-readable name.
    pub display_name: String,
}

/// A message found by a scan.
///
/// An immutable snapshot; purging consumes references, it never edits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReference {
    /// Message id.
    pub id: Snowflake,
    /// Channel the message lives in.
    pub channel_id: Snowflake,
    /// Message text at scan time.
    pub content: String,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
    /// Whether the message carried attachments.
    pub has_attachments: bool,
}

/// `GET /users/@me`
#[derive(Debug, Deserialize)]
pub(crate) struct UserPayload {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub global_name: Option<String>,
}

impl From<UserPayload> for Identity {
    fn from(user: UserPayload) -> Self {
        let display_name = match (&user.global_name, user.discriminator.as_deref()) {
            (_, Some(tag)) if !tag.is_empty() && tag != "0" => {
                format!("{}#{tag}", user.username)
            }
            (Some(global), _) if !global.is_empty() => global.clone(),
            _ => user.username,
        };

        Self {
            account_id: user.id,
            display_name,
        }
    }
}

/// One page of `GET /{guilds|channels}/{id}/messages/search`.
///
/// `messages` is a list of conversation groups. Each group holds the hit and,
/// on some API versions, surrounding context from other authors.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchPage {
    pub messages: Vec<Vec<RawMessage>>,
    pub total_results: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMessage {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub author: RawAuthor,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAuthor {
    pub id: Snowflake,
}

impl RawMessage {
    pub(crate) fn into_reference(self) -> MessageReference {
        MessageReference {
            id: self.id,
            channel_id: self.channel_id,
            content: self.content,
            timestamp: self.timestamp,
            has_attachments: !self.attachments.is_empty(),
        }
    }
}
