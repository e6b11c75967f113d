use relay_chat::config::Config;

use crate::common::{start_server, start_server_with, Client};

#[tokio::test]
async fn report_broadcasts_the_running_count() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    let mut bob = Client::connect(server.addr).await;
    alice.introduce("alice").await;
    bob.introduce("bob").await;
    let _ = alice.recv_line().await; // "bob joined chat"

    alice.send("REPORT bob").await;
    let report_line = alice.recv_line().await;
    assert!(report_line.contains("User bob was reported by alice. Reports count: 1"));
    let same_line = bob.recv_line().await;
    assert_eq!(report_line, same_line);
}

#[tokio::test]
async fn reporting_twice_from_the_same_user_is_rejected() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    let mut bob = Client::connect(server.addr).await;
    alice.introduce("alice").await;
    bob.introduce("bob").await;
    let _ = alice.recv_line().await; // "bob joined chat"

    alice.send("REPORT bob").await;
    let _ = alice.recv_line().await;
    let _ = bob.recv_line().await;

    alice.send("REPORT bob").await;
    let rejection = alice.recv_line().await;
    assert_eq!(rejection, "bob was already reported by you");
}

#[tokio::test]
async fn cannot_report_yourself() {
    let server = start_server().await;
    let mut alice = Client::connect(server.addr).await;
    alice.introduce("alice").await;

    alice.send("REPORT alice").await;
    let rejection = alice.recv_line().await;
    assert_eq!(rejection, "You can't report yourself");
}

#[tokio::test]
async fn reaching_the_report_threshold_bans_the_target() {
    let server = start_server_with(Config {
        reports_for_ban: 2,
        ..Config::default()
    })
    .await;
    let mut alice = Client::connect(server.addr).await;
    let mut bob = Client::connect(server.addr).await;
    let mut carol = Client::connect(server.addr).await;
    alice.introduce("alice").await;
    bob.introduce("bob").await;
    let _ = alice.recv_line().await; // "bob joined chat"
    carol.introduce("carol").await;
    let _ = alice.recv_line().await; // "carol joined chat"
    let _ = bob.recv_line().await; // "carol joined chat"

    alice.send("REPORT bob").await;
    let _ = alice.recv_line().await;
    let _ = bob.recv_line().await;
    let _ = carol.recv_line().await;

    carol.send("REPORT bob").await;
    let _ = alice.recv_line().await; // report-count announcement
    let _ = bob.recv_line().await;
    let _ = carol.recv_line().await;

    let ban_line = alice.recv_line().await;
    assert!(ban_line.contains("User bob was banned until"));

    // A banned user's next SEND is rejected with the ban expiry.
    bob.send("SEND hi").await;
    let rejection = bob.recv_line().await;
    assert!(rejection.contains("You are banned till"));
}
