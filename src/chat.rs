//! Conversation management and the simulated support reply.
//!
//! The reply to a sent message is an explicit scheduled task: it can be
//! cancelled, and it lands only if the owning conversation still exists
//! when the delay elapses.

use std::time::Duration;

use chrono::Local;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::ChatConfig;
use crate::error::Result;
use crate::models::{ChatMessage, Conversation, IdGenerator};
use crate::repository::Collection;
use crate::store::Store;
use crate::validation::InputValidator;

/// A pending simulated reply.
///
/// Dropping the handle does not cancel the task; call [`cancel`] to abort
/// it before it fires. The reply is also dropped if the conversation was
/// deleted in the meantime.
///
/// [`cancel`]: ScheduledReply::cancel
#[derive(Debug)]
pub struct ScheduledReply {
    conversation_id: String,
    handle: JoinHandle<()>,
}

impl ScheduledReply {
    /// The conversation the reply will be appended to.
    #[must_use]
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Abort the reply before it lands.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Wait for the reply to land (or for a cancel to take effect).
    pub async fn wait(self) {
        let _ = self.handle.await;
    }
}

/// Service owning the conversations collection.
#[derive(Debug, Clone)]
pub struct ChatService {
    collection: Collection<Conversation>,
    config: ChatConfig,
}

impl ChatService {
    /// Bind to the store.
    #[must_use]
    pub fn new(store: Store, config: ChatConfig) -> Self {
        Self {
            collection: Collection::new(store),
            config,
        }
    }

    /// All conversations, most recently active first. Conversations that
    /// never received a message sort last (their activity time counts as
    /// the epoch).
    #[must_use]
    pub fn conversations(&self) -> Vec<Conversation> {
        let mut all = self.collection.list();
        all.sort_by_key(|conversation| {
            std::cmp::Reverse(
                conversation
                    .last_message_time
                    .map_or(0, |time| time.timestamp_millis()),
            )
        });
        all
    }

    /// Look up one conversation by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Conversation> {
        self.collection
            .list()
            .into_iter()
            .find(|conversation| conversation.id == id)
    }

    /// Create a new, empty conversation.
    pub fn create_conversation(&self, name: &str) -> Result<Conversation> {
        let conversation = Conversation {
            id: IdGenerator::next("conv"),
            name: name.to_string(),
            messages: Vec::new(),
            last_message: None,
            last_message_time: None,
            unread: 0,
        };
        self.collection.insert(conversation.clone())?;
        debug!(id = %conversation.id, name, "conversation created");
        Ok(conversation)
    }

    /// Delete a conversation; absent ids are a silent no-op. Any reply
    /// still scheduled against it will be dropped when it fires.
    pub fn delete_conversation(&self, id: &str) -> Result<bool> {
        self.collection.remove(id)
    }

    /// Select a conversation, resetting its unread counter. Selecting an
    /// absent id is a no-op.
    pub fn select(&self, id: &str) -> Result<Option<Conversation>> {
        let Some(mut conversation) = self.get(id) else {
            return Ok(None);
        };
        conversation.unread = 0;
        self.collection.update(id, conversation.clone())?;
        Ok(Some(conversation))
    }

    /// Append a message from the local user. Blank input and absent
    /// conversations are silent no-ops.
    pub fn send(&self, id: &str, text: &str) -> Result<Option<ChatMessage>> {
        let text = InputValidator::sanitize_text(text);
        if text.is_empty() {
            return Ok(None);
        }
        self.append(id, "You", &text)
    }

    /// Schedule the simulated support reply to a just-sent message.
    ///
    /// The delay scales with the message length, clamped to the configured
    /// bounds (the longer the question, the longer the "typing").
    #[must_use]
    pub fn schedule_reply(&self, id: &str, prompt: &str) -> ScheduledReply {
        let service = self.clone();
        let conversation_id = id.to_string();
        let task_id = conversation_id.clone();
        let reply = auto_response(prompt);
        let delay = self.reply_delay(prompt);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if service.get(&task_id).is_none() {
                debug!(id = %task_id, "conversation gone, dropping scheduled reply");
                return;
            }
            if let Err(err) = service.append_reply(&task_id, &reply) {
                debug!(id = %task_id, %err, "scheduled reply failed to persist");
            }
        });
        ScheduledReply {
            conversation_id,
            handle,
        }
    }

    fn reply_delay(&self, prompt: &str) -> Duration {
        let scaled = prompt.len() as u64 * self.config.reply_per_char_ms;
        let clamped = scaled.clamp(self.config.reply_min_delay_ms, self.config.reply_max_delay_ms);
        Duration::from_millis(clamped)
    }

    fn append_reply(&self, id: &str, text: &str) -> Result<Option<ChatMessage>> {
        let Some(conversation) = self.get(id) else {
            return Ok(None);
        };
        let sender = conversation.name.clone();
        let message = self.append(id, &sender, text)?;
        if message.is_some() {
            if let Some(mut updated) = self.get(id) {
                updated.unread += 1;
                self.collection.update(id, updated)?;
            }
        }
        Ok(message)
    }

    fn append(&self, id: &str, sender: &str, text: &str) -> Result<Option<ChatMessage>> {
        let Some(mut conversation) = self.get(id) else {
            return Ok(None);
        };
        let message = ChatMessage {
            id: IdGenerator::next("msg"),
            text: text.to_string(),
            sender: sender.to_string(),
            timestamp: Local::now(),
        };
        conversation.last_message = Some(message.text.clone());
        conversation.last_message_time = Some(message.timestamp);
        conversation.messages.push(message.clone());
        self.collection.update(id, conversation)?;
        Ok(Some(message))
    }
}

/// Canned support reply keyed on the message contents.
#[must_use]
pub fn auto_response(input: &str) -> String {
    let txt = input.to_lowercase();
    let reply = if txt.contains("refill") || txt.contains("renew") {
        "To request a refill, tap the \"Request Refill\" button on the Dashboard. I can also remind you as the date approaches."
    } else if txt.contains("hour") || txt.contains("open") {
        "Many pharmacies open 8am-9pm; some are 24/7. Check the Pharmacies tab for local hours."
    } else if txt.contains("insurance") || txt.contains("cover") || txt.contains("copay") {
        "Insurance coverage varies. Please contact your pharmacy or provider to confirm your copay."
    } else if txt.contains("hello") || txt.contains("hi") || txt.contains("hey") {
        "Hello! How can I assist with your prescriptions today?"
    } else if txt.contains("contact") || txt.contains("phone") || txt.contains("call") {
        "Select a pharmacy from the list to view contact options, including a call button."
    } else if txt.contains("side effect") || txt.contains("reaction") {
        "For urgent concerns, contact your pharmacist or healthcare provider. In emergencies, call local emergency services."
    } else {
        "I'm here to help. Could you share more details?"
    };
    reply.to_string()
}
