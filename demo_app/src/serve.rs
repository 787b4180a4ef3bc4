use crate::transport::{MessageParseError, TransportError};
use demo_app_protocol::jsonrpc::{
    ErrorCode, ErrorData, Request, RequestId, Response, ResponseItem,
};
use futures::{SinkExt, StreamExt};
use std::convert::Infallible;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tower::{Service, ServiceExt};

#[inline]
fn parse_message(line: Result<String, LinesCodecError>) -> Result<Request, MessageParseError> {
    let line = line?;
    serde_json::from_str::<Request>(&line).map_err(MessageParseError::Deserialisation)
}

/// Write a JSON-RPC response on the transport, as one line.
#[inline]
async fn write_message<T>(
    frame: &mut Framed<T, LinesCodec>,
    msg: Response,
) -> Result<(), TransportError>
where
    T: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(&msg)?;
    frame.send(json).await?;
    Ok(())
}

async fn handle_connection<S, T>(mut service: S, transport: T) -> Result<(), TransportError>
where
    S: Service<Request, Response = Response, Error = Infallible>,
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut frame = Framed::new(transport, LinesCodec::new());

    // One request per line, until the peer closes its end
    while let Some(line) = frame.next().await {
        match parse_message(line) {
            Ok(message) => {
                let response = match service.ready().await {
                    Ok(ready) => ready.call(message).await,
                    Err(never) => match never {},
                };
                let response = match response {
                    Ok(response) => response,
                    Err(never) => match never {},
                };
                if !response.is_empty() {
                    if let Err(e) = write_message(&mut frame, response).await {
                        tracing::error!(error = ?e, "Error writing response over transport");
                    }
                }
            }
            Err(MessageParseError::Deserialisation(e)) => {
                // Not JSON at all, so there's no id to echo back
                let error_data = ErrorData::new(
                    ErrorCode::ParseError,
                    "JSON parsing error when deserialising the message",
                );
                let msg = ResponseItem::error(RequestId::Null, error_data);
                write_message(&mut frame, Response::Single(Some(msg))).await?;
                tracing::debug!(error = %e, "Transport error (deserialisation)");
            }
            Err(e @ MessageParseError::LinesCodecError(_)) => {
                // Don't terminate the connection: keep reading
                tracing::error!(error = ?e, "Transport error");
            }
        }
    }

    tracing::info!("Transport closed");
    Ok(())
}

/// Serve requests read from `transport` until it closes.
///
/// Requests on one transport are processed in order. Run several `serve` calls on clones of the
/// same service to handle several connections at once.
pub async fn serve<S, T>(service: S, transport: T) -> Result<(), TransportError>
where
    S: Service<Request, Response = Response, Error = Infallible>,
    T: AsyncRead + AsyncWrite + Unpin,
{
    handle_connection(service, transport).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{service_ext::ServiceExt as _, widget::demo_widget, DispatcherBuilder};
    use serde_json::{json, Value};
    use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};

    async fn next_json<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Value {
        let line = lines.next_line().await.unwrap().unwrap();
        serde_json::from_str(&line).unwrap()
    }

    #[tokio::test]
    async fn parse_errors_do_not_end_the_session() {
        let service = DispatcherBuilder::new("demo-app", demo_widget(""))
            .build()
            .unwrap()
            .into_request_service();
        let (client, server) = tokio::io::duplex(4096);
        let server = tokio::spawn(serve(service, server));

        let (read, mut write) = tokio::io::split(client);
        let mut lines = BufReader::new(read).lines();

        write.write_all(b"{not json\n").await.unwrap();
        let reply = next_json(&mut lines).await;
        assert_eq!(reply["id"], Value::Null);
        assert_eq!(reply["error"]["code"], json!(-32700));

        write
            .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n")
            .await
            .unwrap();
        let reply = next_json(&mut lines).await;
        assert_eq!(reply, json!({"jsonrpc": "2.0", "id": 2, "result": {}}));

        write.shutdown().await.unwrap();
        drop(write);
        drop(lines);
        server.await.unwrap().unwrap();
    }
}
