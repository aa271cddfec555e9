//! Submission lifecycle over the wire: handles, truncation, status tables.

use std::sync::Arc;
use std::time::Duration;

use siteq::MAX_URLS_PER_SUBMISSION;

use crate::common::{parse_handle, start_server, Client, ScriptedProber};

#[tokio::test]
async fn handles_increase_by_one_per_submission() {
    let server = start_server(1, Arc::new(ScriptedProber::new())).await;
    let mut client = Client::connect(server.addr).await;

    let mut previous = 0;
    for i in 0..5 {
        let reply = client.send(&format!("pingSites site{i}.example")).await;
        let handle = parse_handle(&reply);
        assert_eq!(handle, previous + 1, "handles must not skip or repeat");
        previous = handle;
        assert_eq!(server.state.registry().len() as u64, handle);
    }
}

#[tokio::test]
async fn excess_urls_beyond_ten_are_silently_dropped() {
    let server = start_server(1, Arc::new(ScriptedProber::new())).await;
    let mut client = Client::connect(server.addr).await;

    let urls: Vec<String> = (0..14).map(|i| format!("site{i}.example")).collect();
    let reply = client.send(&format!("pingSites {}", urls.join(","))).await;
    let handle = parse_handle(&reply);

    let submission = server
        .state
        .registry()
        .get(handle)
        .expect("submission registered");
    assert_eq!(submission.tasks().len(), MAX_URLS_PER_SUBMISSION);
    assert_eq!(submission.tasks()[0].url(), "site0.example");
    assert_eq!(submission.tasks()[9].url(), "site9.example");

    let status = client.send(&format!("showHandleStatus {handle}")).await;
    assert!(status.contains("site9.example"));
    assert!(!status.contains("site10.example"), "11th URL must be dropped");
}

#[tokio::test]
async fn show_handles_reports_total_submissions() {
    let server = start_server(1, Arc::new(ScriptedProber::new())).await;
    let mut client = Client::connect(server.addr).await;

    assert!(client.send("showHandles").await.contains("0"));
    client.send("pingSites a.example").await;
    client.send("pingSites b.example").await;
    let reply = client.send("showHandles").await;
    assert!(reply.contains("Total submissions created: 2"));
}

#[tokio::test]
async fn bare_show_handle_status_covers_every_handle() {
    // Slow prober keeps rows observable in pre-terminal states too.
    let prober = ScriptedProber::new().with_delay(Duration::from_millis(50));
    let server = start_server(1, Arc::new(prober)).await;
    let mut client = Client::connect(server.addr).await;

    for i in 0..4 {
        client.send(&format!("pingSites site{i}.example")).await;
    }

    let reply = client.send("showHandleStatus").await;
    for handle in server.state.registry().handles() {
        assert!(
            reply.contains(&format!("Handle {handle}:")),
            "handle {handle} missing from: {reply:?}"
        );
    }
}

#[tokio::test]
async fn error_replies_keep_the_session_open() {
    let server = start_server(1, Arc::new(ScriptedProber::new())).await;
    let mut client = Client::connect(server.addr).await;

    let reply = client.send("showHandleStatus 99").await;
    assert!(reply.contains("doesn't exist"));

    let reply = client.send("showHandleStatus notanumber").await;
    assert!(reply.contains("is not a valid handle"));

    let reply = client.send("pingSites").await;
    assert!(reply.contains("requires a comma separated list"));

    let reply = client.send("definitelyNotACommand").await;
    assert!(reply.contains("Unrecognized command"));

    // The session survived all four errors.
    let reply = client.send("help").await;
    assert!(reply.contains("Available commands"));
}
