use huddle_client::{ChatMessage, EngineCommand, EngineEvent};

use crate::integration::init_tracing;
use crate::utils::{TestClient, TestRelay};

async fn next_chat(client: &mut TestClient) -> ChatMessage {
    client
        .expect(|event| match event {
            EngineEvent::Chat(message) => Some(message.clone()),
            _ => None,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_chat_echo_is_marked_own() {
    init_tracing();

    let relay = TestRelay::start();
    let mut a = relay.connect("r1", "A");
    a.expect_roster(&[]).await.unwrap();
    let mut b = relay.connect("r1", "B");
    b.expect_roster(&[a.id]).await.unwrap();

    a.send(EngineCommand::SendChat("hello B".into()));

    let mine = next_chat(&mut a).await;
    let theirs = next_chat(&mut b).await;

    assert!(mine.own);
    assert!(!theirs.own);
    for message in [&mine, &theirs] {
        assert_eq!(message.body, "hello B");
        assert_eq!(message.sender, "A");
        assert_eq!(message.connection_id, a.id);
    }
    assert_eq!(mine.timestamp, theirs.timestamp);
}

#[tokio::test]
async fn test_chat_keeps_arrival_order() {
    init_tracing();

    let relay = TestRelay::start();
    let mut a = relay.connect("r1", "A");
    a.expect_roster(&[]).await.unwrap();
    let mut b = relay.connect("r1", "B");
    b.expect_roster(&[a.id]).await.unwrap();

    for i in 0..5 {
        a.send(EngineCommand::SendChat(format!("a{}", i)));
    }

    let mut last_id = 0;
    for i in 0..5 {
        let message = next_chat(&mut b).await;
        assert_eq!(message.body, format!("a{}", i));
        assert!(message.id > last_id);
        last_id = message.id;
    }
}

#[tokio::test]
async fn test_blank_chat_is_not_sent() {
    init_tracing();

    let relay = TestRelay::start();
    let mut a = relay.connect("r1", "A");
    a.expect_roster(&[]).await.unwrap();

    a.send(EngineCommand::SendChat("   ".into()));
    a.send(EngineCommand::SendChat("real".into()));

    assert_eq!(next_chat(&mut a).await.body, "real");
}

#[tokio::test]
async fn test_other_rooms_do_not_see_chat() {
    init_tracing();

    let relay = TestRelay::start();
    let mut a = relay.connect("r1", "A");
    a.expect_roster(&[]).await.unwrap();
    let mut d = relay.connect("elsewhere", "D");
    d.expect_roster(&[]).await.unwrap();

    a.send(EngineCommand::SendChat("only r1".into()));
    d.send(EngineCommand::SendChat("only elsewhere".into()));

    assert_eq!(next_chat(&mut a).await.body, "only r1");
    assert_eq!(next_chat(&mut d).await.body, "only elsewhere");
}
