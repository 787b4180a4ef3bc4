use std::{
    convert::Infallible,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use demo_app_protocol::jsonrpc::{ResponseItem, SendableMessage};
use tower::{Layer, Service};
use tracing::{Instrument, Level};

const DEFAULT_TRACE_LEVEL: Level = Level::DEBUG;

/// A service that logs incoming MCP messages
#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
}

impl<S> Service<SendableMessage> for TracingService<S>
where
    S: Service<SendableMessage, Response = Option<ResponseItem>, Error = Infallible>,
    S::Future: Send + 'static,
{
    type Response = Option<ResponseItem>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: SendableMessage) -> Self::Future {
        let method = req.method().unwrap_or("<invalid>");
        let span = match req.id() {
            Some(id) => tracing::span!(DEFAULT_TRACE_LEVEL, "request", method, id = %id),
            None => tracing::span!(DEFAULT_TRACE_LEVEL, "notification", method),
        };

        let future = {
            let _guard = span.enter();
            self.inner.call(req)
        };

        Box::pin(async move {
            let response = future.await;
            if let Ok(Some(ResponseItem::Error { error, .. })) = &response {
                tracing::debug!(
                    code = error.code.code(),
                    message = %error.message,
                    "Responding with error"
                );
            }
            response
        }
        .instrument(span))
    }
}

/// A layer that wraps services with tracing functionality
#[derive(Clone, Default)]
pub struct TracingLayer;

impl TracingLayer {
    /// Create a new tracing layer
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TracingLayer
where
    S: Service<SendableMessage, Response = Option<ResponseItem>, Error = Infallible>,
    S::Future: Send + 'static,
{
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{widget::demo_widget, DispatcherBuilder};
    use demo_app_protocol::jsonrpc::{ErrorCode, RequestId};
    use tower::ServiceExt;

    #[tokio::test]
    async fn invalid_messages_pass_through() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .try_init();

        let dispatcher = DispatcherBuilder::new("demo-app", demo_widget(""))
            .build()
            .unwrap();
        let service = TracingLayer::new().layer(dispatcher);

        let response = service
            .oneshot(SendableMessage::Invalid {
                id: RequestId::Num(9),
            })
            .await
            .unwrap();
        match response {
            Some(ResponseItem::Error { id, error, .. }) => {
                assert_eq!(id, RequestId::Num(9));
                assert_eq!(error.code, ErrorCode::InvalidRequest);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }
}
