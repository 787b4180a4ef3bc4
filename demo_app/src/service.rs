use crate::{
    envelope::{tool_error, CounterReply},
    errors::RequestError,
    registry::{RegistryError, ResourceDescriptor, ResourceRegistry, ToolRegistry},
    schema::ToolInput,
    state::CounterStore,
    tools::{demo_tools, DecrementInput, DemoTool, IncrementInput, ResetInput, UnknownTool},
};
use chrono::Utc;
use demo_app_protocol::{
    jsonrpc::{MethodCall, Params, ResponseItem, SendableMessage},
    messages::{
        CallToolResult, Implementation, InitializeResult, ListResourcesResult, ListToolsResult,
        ReadResourceResult, ResourcesCapability, ServerCapabilities, ToolsCapability,
    },
    resource::Resource,
    tool::Tool,
};
use serde_json::{json, Map, Value};
use std::{
    convert::Infallible,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::Service;

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Routes MCP requests to the tool and resource catalogs, and owns the shared counter.
///
/// Each request is handled independently: validate the arguments, apply at most one counter
/// mutation, then assemble a response from that mutation's result. The only state shared between
/// requests is the [`CounterStore`], so clones of a `Dispatcher` can serve requests in parallel.
///
/// Nothing a client sends can make the dispatcher fail. Malformed protocol messages become
/// JSON-RPC errors, and tool or resource problems are reported inside normal results.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    server_info: Implementation,
    instructions: Option<String>,
    tools: ToolRegistry,
    resources: ResourceRegistry,
    resource_listing: Vec<Resource>,
    widget: ResourceDescriptor,
    counter: Arc<CounterStore>,
}

/// Build a [`Dispatcher`]. The catalogs are fixed once built.
pub struct DispatcherBuilder {
    name: String,
    version: String,
    instructions: Option<String>,
    widget: ResourceDescriptor,
    counter: Option<Arc<CounterStore>>,
}

impl DispatcherBuilder {
    /// `widget` is the resource every tool result embeds. Its markup must already be loaded.
    pub fn new(name: impl Into<String>, widget: ResourceDescriptor) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: None,
            widget,
            counter: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Share an existing counter. Without this, the dispatcher starts its own at 0.
    pub fn with_counter(mut self, counter: Arc<CounterStore>) -> Self {
        self.counter = Some(counter);
        self
    }

    pub fn build(self) -> Result<Dispatcher, RegistryError> {
        let tools = demo_tools()?;
        let resources = ResourceRegistry::new([self.widget.clone()])?;
        let resource_listing = resources
            .list()
            .iter()
            .map(ResourceDescriptor::to_resource)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Dispatcher {
            inner: Arc::new(Inner {
                server_info: Implementation {
                    name: self.name,
                    version: self.version,
                },
                instructions: self.instructions,
                tools,
                resources,
                resource_listing,
                widget: self.widget,
                counter: self.counter.unwrap_or_default(),
            }),
        })
    }
}

impl Dispatcher {
    pub fn counter(&self) -> &CounterStore {
        &self.inner.counter
    }

    pub fn capabilities(&self) -> ServerCapabilities {
        // Both catalogs are fixed at build time, so neither list ever changes.
        ServerCapabilities {
            tools: Some(ToolsCapability {
                list_changed: Some(false),
            }),
            resources: Some(ResourcesCapability {
                subscribe: Some(false),
                list_changed: Some(false),
            }),
        }
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        self.inner
            .tools
            .list()
            .iter()
            .map(|descriptor| descriptor.to_tool())
            .collect()
    }

    pub fn list_resources(&self) -> Vec<Resource> {
        self.inner.resource_listing.clone()
    }

    /// Read a resource by exact URI. Unknown URIs give empty contents and an error in `_meta`.
    pub fn read_resource(&self, uri: &str) -> ReadResourceResult {
        match self.inner.resources.get(uri) {
            Some(resource) => ReadResourceResult {
                contents: vec![resource.snapshot_with_meta()],
                meta: None,
            },
            None => {
                tracing::debug!(uri, "Unknown resource");
                ReadResourceResult::unknown(uri)
            }
        }
    }

    /// Call a tool by name. Always produces a result; failures have `is_error` set.
    pub fn call_tool(&self, name: &str, arguments: &Map<String, Value>) -> CallToolResult {
        let tool = match name.parse::<DemoTool>() {
            Ok(tool) => tool,
            Err(UnknownTool(name)) => {
                tracing::debug!(tool = %name, "Unknown tool");
                return tool_error(format!("Unknown tool: {name}"));
            }
        };

        let counter = &self.inner.counter;
        let reply = match tool {
            DemoTool::Increment => IncrementInput::parse(arguments).map(|input| {
                let count = counter.add(input.amount);
                CounterReply::new(
                    format!("Demo incremented by {}. Current value: {count}", input.amount),
                    count,
                )
            }),
            DemoTool::Decrement => DecrementInput::parse(arguments).map(|input| {
                let count = counter.add(input.amount.wrapping_neg());
                CounterReply::new(
                    format!("Demo decremented by {}. Current value: {count}", input.amount),
                    count,
                )
            }),
            DemoTool::Reset => ResetInput::parse(arguments)
                .map(|ResetInput| CounterReply::new("Demo has been reset to 0.", counter.reset())),
        };

        match reply {
            Ok(reply) => {
                tracing::debug!(%tool, count = reply.count, "Counter updated");
                reply.into_call_tool_result(&self.inner.widget, Utc::now())
            }
            Err(e) => {
                tracing::debug!(%tool, error = %e, "Tool arguments failed validation");
                tool_error(format!("Input validation error: {e}"))
            }
        }
    }

    /// Handle one JSON-RPC message. Notifications get no response.
    pub fn handle_message(&self, msg: SendableMessage) -> Option<ResponseItem> {
        match msg {
            SendableMessage::Request(call) => Some(self.handle_call(call)),
            SendableMessage::Notification(note) => {
                tracing::debug!(method = %note.method, "Notification received");
                None
            }
            SendableMessage::Invalid { id } => Some(ResponseItem::error(
                id,
                RequestError::InvalidRequest.into(),
            )),
        }
    }

    fn handle_call(&self, call: MethodCall) -> ResponseItem {
        let MethodCall {
            id, method, params, ..
        } = call;
        let result = match method.as_str() {
            "ping" => Ok(json!({})),
            "initialize" => self.handle_initialize(),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(params),
            "resources/list" => self.handle_resources_list(),
            "resources/read" => self.handle_resources_read(params),
            _ => Err(RequestError::MethodNotFound(method)),
        };

        match result {
            Ok(result) => ResponseItem::success(id, result),
            Err(e) => {
                tracing::debug!(error = %e, "Request failed");
                ResponseItem::error(id, e.into())
            }
        }
    }

    fn handle_initialize(&self) -> Result<Value, RequestError> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: self.capabilities(),
            server_info: self.inner.server_info.clone(),
            instructions: self.inner.instructions.clone(),
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_tools_list(&self) -> Result<Value, RequestError> {
        let result = ListToolsResult {
            tools: self.list_tools(),
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_tools_call(&self, params: Option<Params>) -> Result<Value, RequestError> {
        let params = get_request_params(params)?;

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RequestError::InvalidParams("No tool name was provided".into()))?;

        let result = match params.get("arguments") {
            None | Some(Value::Null) => self.call_tool(name, &Map::new()),
            Some(Value::Object(arguments)) => self.call_tool(name, arguments),
            Some(_) => tool_error("Input validation error: arguments must be an object"),
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_resources_list(&self) -> Result<Value, RequestError> {
        let result = ListResourcesResult {
            resources: self.list_resources(),
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_resources_read(&self, params: Option<Params>) -> Result<Value, RequestError> {
        let params = get_request_params(params)?;

        let uri = params
            .get("uri")
            .and_then(Value::as_str)
            .ok_or_else(|| RequestError::InvalidParams("Missing resource URI".into()))?;

        Ok(serde_json::to_value(self.read_resource(uri))?)
    }
}

/// Validate and return request parameters
fn get_request_params(params: Option<Params>) -> Result<Map<String, Value>, RequestError> {
    match params {
        Some(Params::Map(map)) => Ok(map),
        Some(_) => Err(RequestError::InvalidParams(
            "Parameters must be a map-like object".to_string(),
        )),
        None => Err(RequestError::InvalidParams(
            "The request was empty".to_string(),
        )),
    }
}

impl Service<SendableMessage> for Dispatcher {
    type Response = Option<ResponseItem>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, msg: SendableMessage) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { Ok(this.handle_message(msg)) })
    }
}
