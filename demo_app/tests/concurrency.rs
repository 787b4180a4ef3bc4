#[allow(unused)]
mod common;

use common::*;
use serde_json::json;
use std::collections::HashSet;

// Requests are independent tasks sharing one counter. Every mutation must be applied exactly
// once, and each response must report the value its own mutation produced.

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increments_sum() {
    let server = init_server();

    let mut handles = Vec::new();
    for amount in 1..=200_i64 {
        let mut server = server.clone();
        handles.push(tokio::spawn(async move {
            let result = call_tool(&mut server, "increment", json!({ "amount": amount })).await;
            count(&result)
        }));
    }

    let mut observed = HashSet::new();
    for handle in handles {
        assert!(observed.insert(handle.await.unwrap()));
    }

    let expected: i64 = (1..=200).sum();
    assert_eq!(server.counter().read(), expected);
    // The last mutation to land reports the final sum.
    assert!(observed.contains(&expected));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_deltas() {
    let server = init_server();

    let mut handles = Vec::new();
    for i in 0..100_i64 {
        let mut server = server.clone();
        handles.push(tokio::spawn(async move {
            let (tool, amount) = if i % 2 == 0 {
                ("increment", i)
            } else {
                ("decrement", i / 2)
            };
            call_tool(&mut server, tool, json!({ "amount": amount })).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let expected: i64 = (0..100_i64)
        .map(|i| if i % 2 == 0 { i } else { -(i / 2) })
        .sum();
    assert_eq!(server.counter().read(), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reset_after_concurrent_mutations() {
    let server = init_server();

    let mut handles = Vec::new();
    for _ in 0..50 {
        let mut server = server.clone();
        handles.push(tokio::spawn(async move {
            call_tool(&mut server, "increment", json!({})).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(server.counter().read(), 50);

    let mut server = server.clone();
    let result = call_tool(&mut server, "reset", json!({})).await;
    assert_eq!(count(&result), 0);
    assert_eq!(server.counter().read(), 0);
}
