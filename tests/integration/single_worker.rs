//! Starvation check: one worker must still drain everything.

use std::sync::Arc;
use std::time::Duration;

use crate::common::{parse_handle, start_server, wait_terminal, Client, ScriptedProber};

#[tokio::test]
async fn two_submissions_complete_with_a_single_worker() {
    let prober = ScriptedProber::new()
        .complete("first.example")
        .complete("second.example")
        .complete("third.example")
        .with_delay(Duration::from_millis(10));
    let server = start_server(1, Arc::new(prober)).await;
    let mut client = Client::connect(server.addr).await;

    let first = parse_handle(&client.send("pingSites first.example,second.example").await);
    let second = parse_handle(&client.send("pingSites third.example").await);

    // Both submissions settle within the polling bound: no deadlock, no
    // starvation, even with all tasks serialized through one worker.
    let reply = wait_terminal(&mut client, first).await;
    assert_eq!(reply.matches("COMPLETE").count(), 2);
    let reply = wait_terminal(&mut client, second).await;
    assert_eq!(reply.matches("COMPLETE").count(), 1);

    assert!(server.state.queue().is_empty());
    for handle in [first, second] {
        assert!(server
            .state
            .registry()
            .get(handle)
            .expect("submission registered")
            .is_settled());
    }
}
