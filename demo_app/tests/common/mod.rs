use demo_app::{widget::demo_widget, Dispatcher, DispatcherBuilder};
use demo_app_protocol::{
    jsonrpc::{MethodCall, Params, RequestId, ResponseItem, SendableMessage},
    messages::CallToolResult,
};
use serde_json::Value;
use tower::Service;

pub const WIDGET_HTML: &str = r#"<div id="demo-root"></div><script type="module" src="demo.js"></script>"#;

pub fn init_server() -> Dispatcher {
    DispatcherBuilder::new("demo-app", demo_widget(WIDGET_HTML))
        .with_version("0.1.0")
        .with_instructions("Increment, decrement or reset the demo counter")
        .build()
        .unwrap()
}

pub async fn call_server(
    server: &mut Dispatcher,
    method: &str,
    params: serde_json::Value,
) -> Option<ResponseItem> {
    let params = match params {
        serde_json::Value::Object(map) => Some(Params::Map(map)),
        serde_json::Value::Array(array) => Some(Params::Array(array)),
        _ => None,
    };

    let request = MethodCall::new(RequestId::Num(1), method.to_string(), params);
    let future = server.call(SendableMessage::from(request));

    future.await.unwrap()
}

/// Unwrap a success response's `result`.
pub fn expect_success(response: Option<ResponseItem>) -> Value {
    match response {
        Some(ResponseItem::Success { result, .. }) => result,
        other => panic!("Expected success response, got {other:?}"),
    }
}

/// Call a tool through `tools/call` and decode the result.
pub async fn call_tool(server: &mut Dispatcher, name: &str, arguments: Value) -> CallToolResult {
    let response = call_server(
        server,
        "tools/call",
        serde_json::json!({ "name": name, "arguments": arguments }),
    )
    .await;
    serde_json::from_value(expect_success(response)).unwrap()
}

pub fn count(result: &CallToolResult) -> i64 {
    result.structured_content.as_ref().unwrap()["count"]
        .as_i64()
        .unwrap()
}
