use crate::common::{start_server, Client};

#[tokio::test]
async fn history_is_empty_for_a_fresh_session() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    alice.introduce("alice").await;

    alice.send("HISTORY").await;
    let lines = alice.recv_lines(2).await;
    assert_eq!(lines, vec!["*** HISTORY ***", "EMPTY"]);
}

#[tokio::test]
async fn history_accumulates_sent_and_received_messages() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    let mut bob = Client::connect(server.addr).await;
    alice.introduce("alice").await;
    bob.introduce("bob").await;
    let _ = alice.recv_line().await; // "bob joined chat"

    alice.send("SEND hi there").await;
    let _ = alice.recv_line().await;
    let _ = bob.recv_line().await;

    alice.send("HISTORY").await;
    let lines = alice.recv_lines(2).await;
    assert_eq!(lines[0], "*** HISTORY ***");
    assert!(lines[1].contains("alice: hi there"));
}

#[tokio::test]
async fn history_is_personal_to_each_session() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    let mut bob = Client::connect(server.addr).await;
    alice.introduce("alice").await;
    bob.introduce("bob").await;
    let _ = alice.recv_line().await; // "bob joined chat"

    alice.send("SEND -r bob secret").await;
    let _ = alice.recv_line().await;
    let _ = bob.recv_line().await;

    bob.send("HISTORY").await;
    let lines = bob.recv_lines(2).await;
    assert!(lines[1].contains("alice->bob: secret"));

    // A third user never saw the whisper and has no history of it.
    let mut carol = Client::connect(server.addr).await;
    carol.introduce("carol").await;
    let _ = alice.recv_line().await; // "carol joined chat"
    let _ = bob.recv_line().await;
    carol.send("HISTORY").await;
    let lines = carol.recv_lines(2).await;
    assert_eq!(lines, vec!["*** HISTORY ***", "EMPTY"]);
}
