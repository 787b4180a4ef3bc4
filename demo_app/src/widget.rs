use crate::{
    assets::{AssetError, MarkupCache, MarkupSource},
    registry::ResourceDescriptor,
};
use demo_app_protocol::Meta;
use serde_json::Value;
use std::sync::Arc;

/// Stable identifier of the demo widget. Tool results point at it as their output template.
pub const WIDGET_URI: &str = "ui://widget/demo.html";

/// HTML rendered inside the client's sandboxed widget frame.
pub const WIDGET_MIME_TYPE: &str = "text/html+skybridge";

/// Logical name of the widget's built markup.
pub const WIDGET_COMPONENT: &str = "demo";

/// The demo widget resource, carrying `html` as its markup.
pub fn demo_widget(html: impl Into<Arc<str>>) -> ResourceDescriptor {
    let mut meta = Meta::new();
    meta.insert("openai/widgetPrefersBorder".to_string(), Value::Bool(true));

    ResourceDescriptor {
        name: "demo-widget".to_string(),
        uri: WIDGET_URI.to_string(),
        title: "Demo Widget".to_string(),
        description: "Demo widget markup".to_string(),
        mime_type: WIDGET_MIME_TYPE.to_string(),
        meta,
        text: html.into(),
    }
}

/// Resolve the widget's markup once, at startup.
///
/// A missing widget is fatal for the server: it can't serve its declared resource catalog.
pub async fn load_demo_widget<S: MarkupSource>(
    cache: &MarkupCache<S>,
    component: &str,
) -> Result<ResourceDescriptor, AssetError> {
    let html = cache.get(component).await?;
    tracing::info!(component, bytes = html.len(), "Loaded widget markup");
    Ok(demo_widget(html))
}
