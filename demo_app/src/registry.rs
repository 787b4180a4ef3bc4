//! Static catalogs of tools and resources.
//!
//! Both catalogs are built once at startup and never change afterwards, so they are shared between
//! concurrent requests without locking.

use crate::schema::SchemaDescriptor;
use demo_app_protocol::{
    resource::{Resource, ResourceContents, ResourceError},
    tool::Tool,
    Meta,
};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Duplicate registry key: {0}")]
    Duplicate(String),

    #[error(transparent)]
    InvalidResource(#[from] ResourceError),
}

/// Something a registry can hold, identified by a unique key.
pub trait Descriptor {
    fn key(&self) -> &str;
}

/// An immutable, ordered catalog. Listing returns entries in the order they were declared.
#[derive(Debug)]
pub struct Registry<D> {
    entries: Vec<D>,
    index: HashMap<String, usize>,
}

impl<D: Descriptor> Registry<D> {
    /// Build a registry, rejecting duplicate keys.
    pub fn new(entries: impl IntoIterator<Item = D>) -> Result<Self, RegistryError> {
        let entries: Vec<D> = entries.into_iter().collect();
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.key().to_string(), position).is_some() {
                return Err(RegistryError::Duplicate(entry.key().to_string()));
            }
        }
        Ok(Self { entries, index })
    }

    pub fn list(&self) -> &[D] {
        &self.entries
    }

    /// Look up an entry by exact key. No case folding or normalization.
    pub fn get(&self, key: &str) -> Option<&D> {
        self.index.get(key).map(|&position| &self.entries[position])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A tool, as declared at startup.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: SchemaDescriptor,
    /// Hints for the client about how invoking this tool should be presented.
    pub invocation_meta: Meta,
}

impl Descriptor for ToolDescriptor {
    fn key(&self) -> &str {
        self.name
    }
}

impl ToolDescriptor {
    pub fn to_tool(&self) -> Tool {
        Tool::new(self.name, self.description, self.input_schema.to_json_schema())
            .with_title(self.title)
            .with_meta(self.invocation_meta.clone())
    }
}

/// A resource, as declared at startup, together with its renderable text.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    pub name: String,
    pub uri: String,
    pub title: String,
    pub description: String,
    pub mime_type: String,
    /// Rendering hints, e.g. whether the widget prefers a border.
    pub meta: Meta,
    pub text: Arc<str>,
}

impl Descriptor for ResourceDescriptor {
    fn key(&self) -> &str {
        &self.uri
    }
}

impl ResourceDescriptor {
    /// The listing form of this resource. Fails if the URI doesn't parse.
    pub fn to_resource(&self) -> Result<Resource, ResourceError> {
        Ok(Resource::new(self.uri.as_str(), self.name.as_str())?
            .with_title(self.title.as_str())
            .with_description(self.description.as_str())
            .with_mime_type(self.mime_type.as_str())
            .with_meta(self.meta.clone()))
    }

    /// A copy of the renderable contents as they are now.
    pub fn snapshot(&self) -> ResourceContents {
        ResourceContents::text(self.uri.as_str(), self.mime_type.as_str(), &*self.text)
    }

    /// Like [`snapshot`](Self::snapshot), but carrying the rendering hints in `_meta`.
    pub fn snapshot_with_meta(&self) -> ResourceContents {
        ResourceContents::TextResourceContents {
            uri: self.uri.clone(),
            mime_type: Some(self.mime_type.clone()),
            text: self.text.to_string(),
            meta: Some(self.meta.clone()),
        }
    }
}

pub type ToolRegistry = Registry<ToolDescriptor>;
pub type ResourceRegistry = Registry<ResourceDescriptor>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Named(&'static str);

    impl Descriptor for Named {
        fn key(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn listing_keeps_declaration_order() {
        let registry = Registry::new([Named("zeta"), Named("alpha"), Named("mid")]).unwrap();
        let keys: Vec<_> = registry.list().iter().map(|n| n.0).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn lookup_is_exact() {
        let registry = Registry::new([Named("ui://widget/demo.html")]).unwrap();
        assert_eq!(
            registry.get("ui://widget/demo.html"),
            Some(&Named("ui://widget/demo.html"))
        );
        assert_eq!(registry.get("UI://widget/demo.html"), None);
        assert_eq!(registry.get("ui://widget/demo.html/"), None);
    }

    #[test]
    fn duplicate_keys_rejected() {
        let err = Registry::new([Named("a"), Named("b"), Named("a")]).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(key) if key == "a"));
    }

    #[test]
    fn empty_registry() {
        let registry: Registry<Named> = Registry::new([]).unwrap();
        assert!(registry.is_empty());
        assert!(registry.list().is_empty());
    }
}
