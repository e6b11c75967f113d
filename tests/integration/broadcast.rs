use crate::common::{start_server, Client};

#[tokio::test]
async fn send_broadcasts_to_everyone_including_sender() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    let mut bob = Client::connect(server.addr).await;
    alice.introduce("alice").await;
    bob.introduce("bob").await;
    let _ = alice.recv_line().await; // "bob joined chat"

    alice.send("SEND hello everyone").await;

    let echoed = alice.recv_line().await;
    assert!(echoed.contains("alice: hello everyone"));
    let received = bob.recv_line().await;
    assert!(received.contains("alice: hello everyone"));
    assert_eq!(echoed, received, "both observers see the same timestamp");
}

#[tokio::test]
async fn empty_send_is_rejected() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    alice.introduce("alice").await;

    alice.send("SEND").await;
    let rejection = alice.recv_line().await;
    assert!(rejection.contains("Empty messages are restricted"));
}

#[tokio::test]
async fn send_appears_in_room_history() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    alice.introduce("alice").await;

    alice.send("SEND remember this").await;
    let _ = alice.recv_line().await;

    let mut bob = Client::connect(server.addr).await;
    bob.send("INTRODUCE bob").await;
    let replayed = bob.recv_line().await;
    assert!(replayed.contains("alice: remember this"));
}
