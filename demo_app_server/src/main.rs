mod config;

use anyhow::{Context, Result};
use config::{Config, Transport};
use demo_app::{
    assets::{AssetDir, MarkupCache},
    middleware::tracing::TracingLayer,
    serve,
    transport::{serve_http, StdioTransport},
    widget::load_demo_widget,
    DispatcherBuilder, ServiceExt,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing_subscriber::EnvFilter;

const SERVER_NAME: &str = "demo-app";
const INSTRUCTIONS: &str = "This server keeps a shared demo counter. Use the increment, decrement \
and reset tools to change it; each result renders in the demo widget.";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    // Logging. Stdout may carry the protocol, so logs go to a file.
    let temp_log_dir;
    let log_dir = match &config.log_dir {
        Some(dir) => dir.clone(),
        None => {
            temp_log_dir = tempfile::tempdir()?;
            temp_log_dir.path().to_path_buf()
        }
    };
    let file_appender = tracing_appender::rolling::daily(&log_dir, "server.log");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(file_appender)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // The widget must be loadable before any request is served
    let cache = MarkupCache::new(AssetDir::new(config.assets_dir.clone()));
    let widget = load_demo_widget(&cache, &config.widget_name)
        .await
        .context("failed to load the widget markup")?;

    let dispatcher = DispatcherBuilder::new(SERVER_NAME, widget)
        .with_instructions(INSTRUCTIONS)
        .build()
        .context("failed to build the tool and resource catalogs")?;
    let service = ServiceBuilder::new()
        .layer(TracingLayer::new())
        .service(dispatcher)
        .into_request_service();

    match config.transport {
        Transport::Stdio => {
            tracing::info!(
                "Server started over stdin/stdout. Logging to {}. Ready to accept requests",
                log_dir.display()
            );
            Ok(serve(service, StdioTransport::new()).await?)
        }
        Transport::Http => {
            let listener = TcpListener::bind((config.host.as_str(), config.port))
                .await
                .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
            tracing::info!(
                "Server listening on http://{}/mcp. Logging to {}. Ready to accept requests",
                listener.local_addr()?,
                log_dir.display()
            );
            Ok(serve_http(listener, service, config.assets_dir).await?)
        }
    }
}
