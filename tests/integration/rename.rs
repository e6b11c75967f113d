use crate::common::{start_server, Client};

#[tokio::test]
async fn rename_succeeds_and_confirms() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    alice.introduce("alice").await;

    alice.send("RENAME alicia").await;
    let confirm = alice.recv_line().await;
    assert!(confirm.contains("Your name was changed to alicia"));
}

#[tokio::test]
async fn rename_announces_to_others_with_old_name() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    let mut bob = Client::connect(server.addr).await;
    alice.introduce("alice").await;
    bob.introduce("bob").await;
    let _ = alice.recv_line().await; // "bob joined chat"

    alice.send("RENAME alicia").await;
    let announce = bob.recv_line().await;
    assert!(announce.contains("alice changed name to alicia"));
}

#[tokio::test]
async fn rename_rejects_duplicate_name_with_error_reply() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    let mut bob = Client::connect(server.addr).await;
    alice.introduce("alice").await;
    bob.introduce("bob").await;
    let _ = alice.recv_line().await; // "bob joined chat"

    bob.send("RENAME alice").await;
    let rejection = bob.recv_line().await;
    assert!(rejection.contains("Already have user with that name"));
}

#[tokio::test]
async fn rename_rejects_empty_name() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    alice.introduce("alice").await;

    alice.send("RENAME").await;
    let rejection = alice.recv_line().await;
    assert!(rejection.contains("Empty names are restricted"));
}

#[tokio::test]
async fn rename_rejects_name_with_space() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    alice.introduce("alice").await;

    alice.send("RENAME eve adams").await;
    let rejection = alice.recv_line().await;
    assert!(rejection.contains("Empty spaces are restricted in names"));
}
