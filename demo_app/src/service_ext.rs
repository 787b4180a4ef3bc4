use std::{
    convert::Infallible,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use demo_app_protocol::jsonrpc::{Request, RequestId, Response, ResponseItem, SendableMessage};
use futures::future::join_all;
use tower::Service;

use crate::errors::RequestError;

/// Processes everything read from one line of the transport: a single message or a batch.
///
/// Each message is handed to the inner service. Batch responses are collected in request order,
/// leaving out notifications. An empty batch is itself an invalid request.
#[derive(Clone)]
pub struct RequestService<S> {
    inner: S,
}

impl<S> RequestService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S> Service<Request> for RequestService<S>
where
    S: Service<SendableMessage, Response = Option<ResponseItem>, Error = Infallible>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Readiness of the inner service is awaited per message.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let inner = self.inner.clone();
        Box::pin(async move {
            match request {
                Request::Single(msg) => {
                    let item = tower::ServiceExt::oneshot(inner, msg).await?;
                    Ok(Response::Single(item))
                }
                Request::Batch(messages) if messages.is_empty() => {
                    let error = ResponseItem::error(
                        RequestId::Null,
                        RequestError::InvalidRequest.into(),
                    );
                    Ok(Response::Single(Some(error)))
                }
                Request::Batch(messages) => {
                    let calls = messages
                        .into_iter()
                        .map(|msg| tower::ServiceExt::oneshot(inner.clone(), msg));
                    let mut items = Vec::new();
                    for item in join_all(calls).await {
                        items.extend(item?);
                    }
                    if items.is_empty() {
                        // A batch of notifications gets no reply at all.
                        Ok(Response::Single(None))
                    } else {
                        Ok(Response::Batch(items))
                    }
                }
            }
        })
    }
}

/// Extension trait that adds additional methods to any [`Service`] that processes MCP messages.
pub trait ServiceExt<R>: Service<R> + Sized {
    /// Convert this service into a [`RequestService`], which also handles batches.
    fn into_request_service(self) -> RequestService<Self>;
}

impl<S> ServiceExt<SendableMessage> for S
where
    S: Service<SendableMessage, Response = Option<ResponseItem>, Error = Infallible>
        + Sized
        + Clone
        + 'static,
{
    fn into_request_service(self) -> RequestService<Self> {
        RequestService::new(self)
    }
}
