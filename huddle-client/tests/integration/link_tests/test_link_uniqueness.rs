use huddle_client::{LinkRole, NegotiationState};
use huddle_core::{ClientSignal, ConnectionId, SessionDescription};

use crate::integration::{create_test_supervisor, init_tracing};

#[tokio::test]
async fn test_create_link_twice_tracks_one_link() {
    init_tracing();

    let mut fx = create_test_supervisor();
    let remote = ConnectionId::new();

    let first_epoch = fx
        .supervisor
        .create_link(remote, LinkRole::Offerer)
        .await
        .unwrap()
        .epoch();
    let second = fx
        .supervisor
        .create_link(remote, LinkRole::Offerer)
        .await
        .unwrap();

    assert_eq!(second.epoch(), first_epoch, "Should return the existing link");
    assert_eq!(second.state(), NegotiationState::HaveLocalOffer);
    assert_eq!(fx.supervisor.link_count(), 1);
    assert_eq!(fx.connector.opened(), 1);
    assert_eq!(fx.sink.count("send-offer"), 1, "Only one initial offer");
}

#[tokio::test]
async fn test_offerer_link_sends_offer_to_remote() {
    init_tracing();

    let mut fx = create_test_supervisor();
    let remote = ConnectionId::new();

    fx.supervisor
        .create_link(remote, LinkRole::Offerer)
        .await
        .unwrap();

    match fx.sink.signals().as_slice() {
        [ClientSignal::SendOffer { offer, to_socket }] => {
            assert_eq!(*to_socket, remote);
            let offer = SessionDescription::from_value(offer.clone()).unwrap();
            assert_eq!(offer.sdp, format!("mock-offer-to-{}", remote));
        }
        other => panic!("unexpected signals {:?}", other),
    }
}

#[tokio::test]
async fn test_answerer_link_waits_for_offer() {
    init_tracing();

    let mut fx = create_test_supervisor();
    let remote = ConnectionId::new();

    let link = fx
        .supervisor
        .create_link(remote, LinkRole::Answerer)
        .await
        .unwrap();

    assert_eq!(link.role(), LinkRole::Answerer);
    assert_eq!(link.state(), NegotiationState::New);
    assert!(fx.sink.signals().is_empty());
}

#[tokio::test]
async fn test_repeated_offers_reuse_the_link() {
    init_tracing();

    let mut fx = create_test_supervisor();
    let remote = ConnectionId::new();

    fx.supervisor
        .apply_remote_offer(remote, SessionDescription::offer("v=0 first"))
        .await
        .unwrap();
    fx.supervisor
        .apply_remote_offer(remote, SessionDescription::offer("v=0 renegotiated"))
        .await
        .unwrap();

    assert_eq!(fx.supervisor.link_count(), 1);
    assert_eq!(fx.connector.opened(), 1);
    assert_eq!(fx.sink.count("send-answer"), 2);
    assert_eq!(
        fx.connector.log(&remote).unwrap().remote_offer,
        Some(SessionDescription::offer("v=0 renegotiated"))
    );
}
