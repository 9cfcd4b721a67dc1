use huddle_core::{ClientSignal, ConnectionId, IceCandidate, RelaySignal, SessionDescription};
use serde_json::Value;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{drain, join_room, send, wait_for};

#[tokio::test]
async fn test_offer_answer_and_candidate_are_forwarded() {
    init_tracing();

    let (relay_tx, mut signal_rx, _signaling) = create_test_relay();

    let (a, _) = join_room(&relay_tx, &mut signal_rx, "r1", "A").await.unwrap();
    let (b, _) = join_room(&relay_tx, &mut signal_rx, "r1", "B").await.unwrap();
    drain(&mut signal_rx).await;

    let offer = SessionDescription::offer("v=0\r\no=- 1 1 IN IP4 0.0.0.0\r\n")
        .to_value()
        .unwrap();
    send(&relay_tx, a, ClientSignal::SendOffer { offer: offer.clone(), to_socket: b })
        .await
        .unwrap();

    let delivered = wait_for(&mut signal_rx, |d| Some(d.clone())).await.unwrap();
    assert_eq!(delivered.to, b);
    assert_eq!(
        delivered.signal,
        RelaySignal::ReceiveOffer { offer, from_socket: a }
    );

    let answer = SessionDescription::answer("v=0\r\n").to_value().unwrap();
    send(&relay_tx, b, ClientSignal::SendAnswer { answer: answer.clone(), to_socket: a })
        .await
        .unwrap();

    let delivered = wait_for(&mut signal_rx, |d| Some(d.clone())).await.unwrap();
    assert_eq!(delivered.to, a);
    assert_eq!(
        delivered.signal,
        RelaySignal::ReceiveAnswer { answer, from_socket: b }
    );

    let candidate = IceCandidate::new("candidate:1 1 udp 2122260223 10.0.0.1 5000 typ host")
        .to_value()
        .unwrap();
    send(
        &relay_tx,
        a,
        ClientSignal::SendIceCandidate { candidate: candidate.clone(), to_socket: b },
    )
    .await
    .unwrap();

    let delivered = wait_for(&mut signal_rx, |d| Some(d.clone())).await.unwrap();
    assert_eq!(delivered.to, b);
    assert_eq!(
        delivered.signal,
        RelaySignal::ReceiveIceCandidate { candidate, from_socket: a }
    );
}

#[tokio::test]
async fn test_null_candidate_is_forwarded_as_is() {
    init_tracing();

    let (relay_tx, mut signal_rx, _signaling) = create_test_relay();

    let (a, _) = join_room(&relay_tx, &mut signal_rx, "r1", "A").await.unwrap();
    let (b, _) = join_room(&relay_tx, &mut signal_rx, "r1", "B").await.unwrap();
    drain(&mut signal_rx).await;

    send(&relay_tx, b, ClientSignal::SendIceCandidate { candidate: Value::Null, to_socket: a })
        .await
        .unwrap();

    let delivered = wait_for(&mut signal_rx, |d| Some(d.clone())).await.unwrap();
    assert_eq!(
        delivered.signal,
        RelaySignal::ReceiveIceCandidate { candidate: Value::Null, from_socket: b }
    );
}

#[tokio::test]
async fn test_forward_to_unknown_target_does_not_stall_relay() {
    init_tracing();

    let (relay_tx, mut signal_rx, _signaling) = create_test_relay();

    let (a, _) = join_room(&relay_tx, &mut signal_rx, "r1", "A").await.unwrap();
    let ghost = ConnectionId::new();

    send(
        &relay_tx,
        a,
        ClientSignal::SendAnswer {
            answer: SessionDescription::answer("v=0\r\n").to_value().unwrap(),
            to_socket: ghost,
        },
    )
    .await
    .unwrap();

    // The mock accepts any address; the relay itself still answers the next join.
    let (_b, existing) = join_room(&relay_tx, &mut signal_rx, "r1", "B").await.unwrap();
    assert_eq!(existing.len(), 1);
    assert_eq!(existing[0].connection_id, a);
}
