//! Integration tests for the chat service and the scheduled reply.

use std::time::Duration;

use pharmacare::chat::{auto_response, ChatService};
use pharmacare::config::ChatConfig;
use pharmacare::store::Store;
use tempfile::tempdir;

fn fast_config() -> ChatConfig {
    ChatConfig {
        reply_min_delay_ms: 5,
        reply_max_delay_ms: 10,
        reply_per_char_ms: 0,
        default_conversation: "Support Team".to_string(),
    }
}

fn open_service(dir: &tempfile::TempDir) -> ChatService {
    let store = Store::open(dir.path()).expect("open store");
    ChatService::new(store, fast_config())
}

#[test]
fn conversations_sort_by_activity_with_quiet_ones_last() {
    let dir = tempdir().expect("temp dir");
    let service = open_service(&dir);

    let quiet = service.create_conversation("Quiet").expect("create");
    let first = service.create_conversation("First").expect("create");
    let second = service.create_conversation("Second").expect("create");

    service.send(&first.id, "hello").expect("send");
    std::thread::sleep(Duration::from_millis(5));
    service.send(&second.id, "hi there").expect("send");

    let names: Vec<String> = service
        .conversations()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names[0], "Second");
    assert_eq!(names[1], "First");
    // Never-messaged conversations sort as the epoch.
    assert_eq!(names[2], "Quiet");
    drop(quiet);
}

#[test]
fn send_updates_last_message_and_skips_blank_input() {
    let dir = tempdir().expect("temp dir");
    let service = open_service(&dir);
    let conversation = service.create_conversation("Support Team").expect("create");

    let sent = service
        .send(&conversation.id, "  do you have my refill?  ")
        .expect("send")
        .expect("message appended");
    assert_eq!(sent.sender, "You");
    assert_eq!(sent.text, "do you have my refill?");

    let stored = service.get(&conversation.id).expect("present");
    assert_eq!(stored.messages.len(), 1);
    assert_eq!(stored.last_message.as_deref(), Some("do you have my refill?"));
    assert!(stored.last_message_time.is_some());

    assert!(service.send(&conversation.id, "   ").expect("send").is_none());
    assert!(service.send("conv_missing", "hello").expect("send").is_none());
}

#[tokio::test]
async fn scheduled_reply_lands_and_marks_unread() {
    let dir = tempdir().expect("temp dir");
    let service = open_service(&dir);
    let conversation = service.create_conversation("Support Team").expect("create");

    service.send(&conversation.id, "when do you open?").expect("send");
    let reply = service.schedule_reply(&conversation.id, "when do you open?");
    reply.wait().await;

    let stored = service.get(&conversation.id).expect("present");
    assert_eq!(stored.messages.len(), 2);
    assert_eq!(stored.messages[1].sender, "Support Team");
    assert!(stored.messages[1].text.contains("local hours"));
    assert_eq!(stored.unread, 1);

    // Selecting the conversation resets the unread counter.
    let selected = service
        .select(&conversation.id)
        .expect("select")
        .expect("present");
    assert_eq!(selected.unread, 0);
}

#[tokio::test]
async fn cancelled_reply_never_lands() {
    let dir = tempdir().expect("temp dir");
    let service = open_service(&dir);
    let conversation = service.create_conversation("Support Team").expect("create");

    service.send(&conversation.id, "hello").expect("send");
    let reply = service.schedule_reply(&conversation.id, "hello");
    reply.cancel();
    reply.wait().await;

    tokio::time::sleep(Duration::from_millis(30)).await;
    let stored = service.get(&conversation.id).expect("present");
    assert_eq!(stored.messages.len(), 1);
}

#[tokio::test]
async fn reply_is_dropped_when_the_conversation_is_deleted() {
    let dir = tempdir().expect("temp dir");
    let service = open_service(&dir);
    let conversation = service.create_conversation("Support Team").expect("create");

    service.send(&conversation.id, "hello").expect("send");
    let reply = service.schedule_reply(&conversation.id, "hello");
    assert!(service.delete_conversation(&conversation.id).expect("delete"));
    reply.wait().await;

    assert!(service.get(&conversation.id).is_none());
    assert!(service.conversations().is_empty());
}

#[test]
fn selecting_an_absent_conversation_is_a_no_op() {
    let dir = tempdir().expect("temp dir");
    let service = open_service(&dir);
    assert!(service.select("conv_missing").expect("select").is_none());
}

#[test]
fn auto_response_matches_the_keyword_table() {
    assert!(auto_response("I need a refill").contains("Request Refill"));
    assert!(auto_response("what are your HOURS?").contains("local hours"));
    assert!(auto_response("does insurance cover this?").contains("copay"));
    assert!(auto_response("hey").starts_with("Hello!"));
    assert!(auto_response("can I call someone?").contains("call button"));
    assert!(auto_response("I have a bad reaction").contains("pharmacist"));
    assert_eq!(
        auto_response("zzz"),
        "I'm here to help. Could you share more details?"
    );
}
