use relay_chat::config::Config;

use crate::common::{start_server_with, Client};

fn spam_config() -> Config {
    Config {
        messages_limit_in_spam_period: 2,
        spam_period_secs: 30,
        ..Config::default()
    }
}

#[tokio::test]
async fn messages_under_the_limit_go_through() {
    let server = start_server_with(spam_config()).await;
    let mut alice = Client::connect(server.addr).await;
    alice.introduce("alice").await;

    alice.send("SEND one").await;
    let line = alice.recv_line().await;
    assert!(line.contains("alice: one"));

    alice.send("SEND two").await;
    let line = alice.recv_line().await;
    assert!(line.contains("alice: two"));
}

#[tokio::test]
async fn exceeding_the_limit_within_the_window_is_rejected() {
    let server = start_server_with(spam_config()).await;
    let mut alice = Client::connect(server.addr).await;
    alice.introduce("alice").await;

    alice.send("SEND one").await;
    let _ = alice.recv_line().await;
    alice.send("SEND two").await;
    let _ = alice.recv_line().await;
    alice.send("SEND three").await;
    let rejection = alice.recv_line().await;
    assert!(rejection.contains("You are spamming to much"));
}

#[tokio::test]
async fn a_rejected_message_still_counts_toward_the_limit() {
    // limit 1: the first send always succeeds, the second is rejected
    // as spam, and a third attempt stays rejected because the counter
    // kept incrementing on the rejected send too.
    let server = start_server_with(Config {
        messages_limit_in_spam_period: 1,
        spam_period_secs: 30,
        ..Config::default()
    })
    .await;
    let mut alice = Client::connect(server.addr).await;
    alice.introduce("alice").await;

    alice.send("SEND one").await;
    assert!(alice.recv_line().await.contains("alice: one"));

    alice.send("SEND two").await;
    assert!(alice.recv_line().await.contains("You are spamming to much"));

    alice.send("SEND three").await;
    assert!(alice.recv_line().await.contains("You are spamming to much"));
}
