#[allow(unused)]
mod common;

use common::*;
use demo_app::PROTOCOL_VERSION;
use demo_app_protocol::{
    jsonrpc::{Notification, RequestId, ResponseItem, SendableMessage},
    messages::{
        Implementation, InitializeResult, ResourcesCapability, ServerCapabilities,
        ToolsCapability,
    },
};
use tower::Service;

// Utility (ping): https://spec.modelcontextprotocol.io/specification/2024-11-05/basic/utilities/ping/
#[tokio::test]
async fn test_ping() {
    let mut server = init_server();

    let response = call_server(&mut server, "ping", serde_json::json!({})).await;
    assert_eq!(expect_success(response), serde_json::json!({}));
}

// Client initialisation
// Spec: https://spec.modelcontextprotocol.io/specification/2024-11-05/basic/lifecycle/#initialization
#[tokio::test]
async fn test_initialize() {
    let mut server = init_server();

    let response = call_server(
        &mut server,
        "initialize",
        serde_json::json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
              "name": "ExampleClient",
              "version": "1.0.0"
            }
        }),
    )
    .await
    .unwrap();

    match response {
        ResponseItem::Success { id, result, .. } => {
            assert_eq!(id, RequestId::Num(1));

            let actual: InitializeResult = serde_json::from_value(result).unwrap();
            let expected = InitializeResult {
                protocol_version: PROTOCOL_VERSION.to_string(),
                capabilities: ServerCapabilities {
                    resources: Some(ResourcesCapability {
                        subscribe: Some(false),
                        list_changed: Some(false),
                    }),
                    tools: Some(ToolsCapability {
                        list_changed: Some(false),
                    }),
                },
                server_info: Implementation {
                    name: "demo-app".to_string(),
                    version: "0.1.0".to_string(),
                },
                instructions: Some("Increment, decrement or reset the demo counter".to_string()),
            };
            assert_eq!(actual, expected);
        }
        ResponseItem::Error { .. } => {
            panic!("Expected success response");
        }
    }
}

// General server and JSON-RPC tests

#[tokio::test]
async fn test_unknown_method() {
    let mut server = init_server();

    let response = call_server(&mut server, "prompts/list", serde_json::json!({}))
        .await
        .unwrap();

    match response {
        ResponseItem::Success { .. } => {
            panic!("Expected error response");
        }
        ResponseItem::Error { error, .. } => {
            assert_eq!(error.code.code(), -32601);
            assert_eq!(error.message, "Method not found: prompts/list");
        }
    }
}

#[tokio::test]
async fn test_notifications_get_no_response() {
    let mut server = init_server();

    let notification = Notification::new("notifications/initialized", None);
    let response = server
        .call(SendableMessage::from(notification))
        .await
        .unwrap();
    assert!(response.is_none());

    // Even one naming a tool method is not executed
    let notification = Notification::new(
        "tools/call",
        serde_json::from_value(serde_json::json!({"name": "increment"})).unwrap(),
    );
    let response = server
        .call(SendableMessage::from(notification))
        .await
        .unwrap();
    assert!(response.is_none());
    assert_eq!(server.counter().read(), 0);
}
