use crate::record::FieldDef;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A field/tag name transform.
pub type NameFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Naming policy of a [`Mapper`](super::Mapper).
///
/// Canonical field names come from the field's tag when present (passed
/// through the tag transform), otherwise from the name transform applied to
/// the declared Rust name, otherwise the declared name itself.
#[derive(Clone, Default)]
pub struct MapperConfig {
    name_fn: Option<NameFn>,
    tag_fn: Option<NameFn>,
}

impl fmt::Debug for MapperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperConfig")
            .field("name_fn", &self.name_fn.is_some())
            .field("tag_fn", &self.tag_fn.is_some())
            .finish()
    }
}

impl MapperConfig {
    /// Declared names are used as-is.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowercase declared names. This is the default mapper's policy.
    pub fn lowercase() -> Self {
        Self::new().name_fn(|s| s.to_lowercase())
    }

    /// `snake_case` declared names.
    pub fn snake_case() -> Self {
        Self::new().name_fn(|s| heck::ToSnakeCase::to_snake_case(s))
    }

    /// Set the transform applied to declared field names.
    pub fn name_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.name_fn = Some(Arc::new(f));
        self
    }

    /// Set the transform applied to raw tag values before they are split.
    pub fn tag_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.tag_fn = Some(Arc::new(f));
        self
    }

    /// Resolve the canonical name of a field.
    ///
    /// Returns the tag name (if the field carries a non-empty tag name), the
    /// canonical name, and the tag options.
    pub(crate) fn field_name(
        &self,
        def: &FieldDef,
    ) -> (Option<String>, String, HashMap<String, String>) {
        let raw = def.tag.map(|t| match &self.tag_fn {
            Some(f) => f(t),
            None => t.to_string(),
        });

        let mut parts = raw.as_deref().unwrap_or("").split(',');
        let tag_name = parts.next().unwrap_or("").trim();
        let options = parse_options(parts);

        if !tag_name.is_empty() {
            return (Some(tag_name.to_string()), tag_name.to_string(), options);
        }

        let name = match &self.name_fn {
            Some(f) => f(def.name),
            None => def.name.to_string(),
        };
        (None, name, options)
    }
}

fn parse_options<'a>(parts: impl Iterator<Item = &'a str>) -> HashMap<String, String> {
    parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('=') {
            Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
            None => (p.to_string(), String::new()),
        })
        .collect()
}
