use huddle_client::{LinkRole, NegotiationError, NegotiationState};
use huddle_core::{ClientSignal, ConnectionId, IceCandidate, SessionDescription};

use crate::integration::{SupervisorFixture, create_test_supervisor, init_tracing};
use crate::utils::RecordingSink;

/// Two ids, lower first.
fn ordered_ids() -> (ConnectionId, ConnectionId) {
    let (x, y) = (ConnectionId::new(), ConnectionId::new());
    if x < y { (x, y) } else { (y, x) }
}

fn supervisor_for(local_id: ConnectionId) -> SupervisorFixture {
    let mut fx = create_test_supervisor();
    fx.supervisor.set_local_id(local_id);
    fx
}

fn take_description(sink: &RecordingSink, event: &str) -> SessionDescription {
    let value = sink
        .take()
        .into_iter()
        .find_map(|signal| match signal {
            ClientSignal::SendOffer { offer, .. } if event == "send-offer" => Some(offer),
            ClientSignal::SendAnswer { answer, .. } if event == "send-answer" => Some(answer),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no {} sent", event));
    SessionDescription::from_value(value).unwrap()
}

#[tokio::test]
async fn test_simultaneous_offers_settle_on_one_session() {
    init_tracing();

    let (low, high) = ordered_ids();
    let mut low_side = supervisor_for(low);
    let mut high_side = supervisor_for(high);

    low_side.supervisor.create_link(high, LinkRole::Offerer).await.unwrap();
    high_side.supervisor.create_link(low, LinkRole::Offerer).await.unwrap();
    let low_offer = take_description(&low_side.sink, "send-offer");
    let high_offer = take_description(&high_side.sink, "send-offer");

    // The higher id keeps its own offer and ignores the other one.
    high_side
        .supervisor
        .apply_remote_offer(low, low_offer)
        .await
        .unwrap();
    let link = high_side.supervisor.link(&low).unwrap();
    assert_eq!(link.role(), LinkRole::Offerer);
    assert_eq!(link.state(), NegotiationState::HaveLocalOffer);
    assert_eq!(high_side.sink.count("send-answer"), 0);
    assert_eq!(high_side.connector.opened(), 1);

    // The lower id drops its offer and answers.
    low_side
        .supervisor
        .apply_remote_offer(high, high_offer.clone())
        .await
        .unwrap();
    let link = low_side.supervisor.link(&high).unwrap();
    assert_eq!(link.role(), LinkRole::Answerer);
    assert_eq!(link.state(), NegotiationState::Connected);
    assert_eq!(low_side.supervisor.link_count(), 1);
    assert_eq!(low_side.connector.opened(), 2);
    assert_eq!(low_side.connector.live(), 1, "The dropped offer's transport is closed");
    assert_eq!(
        low_side.connector.log(&high).unwrap().remote_offer,
        Some(high_offer)
    );

    let answer = take_description(&low_side.sink, "send-answer");
    high_side
        .supervisor
        .apply_remote_answer(low, answer)
        .await
        .unwrap();
    assert_eq!(
        high_side.supervisor.link(&low).unwrap().state(),
        NegotiationState::Connected
    );
}

#[tokio::test]
async fn test_candidates_survive_dropped_offer() {
    init_tracing();

    let (low, high) = ordered_ids();
    let mut fx = supervisor_for(low);
    let early = IceCandidate::new("candidate:1 1 udp 1 10.0.0.2 9 typ host");

    fx.supervisor.create_link(high, LinkRole::Offerer).await.unwrap();
    fx.supervisor
        .apply_remote_candidate(high, early.clone())
        .await
        .unwrap();
    assert_eq!(fx.supervisor.link(&high).unwrap().pending_candidates(), 1);

    fx.supervisor
        .apply_remote_offer(high, SessionDescription::offer("v=0 from high"))
        .await
        .unwrap();

    let link = fx.supervisor.link(&high).unwrap();
    assert_eq!(link.pending_candidates(), 0);
    assert_eq!(fx.connector.log(&high).unwrap().candidates, vec![early]);
}

#[tokio::test]
async fn test_collision_without_local_id_drops_link() {
    init_tracing();

    let mut fx = create_test_supervisor();
    let remote = ConnectionId::new();

    fx.supervisor.create_link(remote, LinkRole::Offerer).await.unwrap();
    let result = fx
        .supervisor
        .apply_remote_offer(remote, SessionDescription::offer("v=0"))
        .await;

    assert!(matches!(result, Err(NegotiationError::Glare(id)) if id == remote));
    assert_eq!(fx.supervisor.link_count(), 0);
}
