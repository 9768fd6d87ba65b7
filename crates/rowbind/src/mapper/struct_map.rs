use super::config::MapperConfig;
use crate::record::{FieldDef, RecordType};
use std::any::TypeId;
use std::collections::{HashMap, VecDeque};

/// Metadata of one reachable field.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Traversal from the record root.
    pub index: Vec<usize>,
    /// Dotted path, e.g. `address.city`.
    pub path: String,
    /// Canonical name (tag, mapped name, or declared name).
    pub name: String,
    /// Options parsed from the tag after the first comma.
    pub options: HashMap<String, String>,
    /// Whether this is an embedded sub-record.
    pub embedded: bool,
    /// Declaration; `None` only for the synthetic root.
    pub field: Option<FieldDef>,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<Option<usize>>,
}

impl FieldInfo {
    fn root() -> Self {
        Self {
            index: Vec::new(),
            path: String::new(),
            name: String::new(),
            options: HashMap::new(),
            embedded: false,
            field: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Record type of a nested or embedded sub-record.
    pub fn nested(&self) -> Option<RecordType> {
        self.field.and_then(|f| f.nested)
    }

    /// Rust type name of the field.
    pub fn type_name(&self) -> &'static str {
        self.field.map(|f| f.type_name).unwrap_or("")
    }

    /// Declared Rust field name.
    pub fn declared_name(&self) -> &'static str {
        self.field.map(|f| f.name).unwrap_or("")
    }
}

/// Field index of a record type: the field tree plus path and name lookups.
#[derive(Debug, Clone)]
pub struct StructMap {
    record_type: RecordType,
    // nodes[0] is the synthetic root
    nodes: Vec<FieldInfo>,
    index: Vec<usize>,
    paths: HashMap<String, usize>,
    names: HashMap<String, usize>,
}

struct Pending {
    ty: RecordType,
    node: usize,
    prefix: String,
    // record types of the ancestor fields of `node`, root excluded
    ancestors: Vec<TypeId>,
}

impl StructMap {
    pub(crate) fn build(record_type: RecordType, config: &MapperConfig) -> Self {
        let mut nodes = vec![FieldInfo::root()];
        let mut index = Vec::new();
        let mut queue = VecDeque::from([Pending {
            ty: record_type,
            node: 0,
            prefix: String::new(),
            ancestors: Vec::new(),
        }]);

        while let Some(item) = queue.pop_front() {
            if item.ancestors.contains(&item.ty.id()) {
                continue;
            }

            let defs = item.ty.fields();
            nodes[item.node].children = vec![None; defs.len()];

            let mut chain = item.ancestors.clone();
            if item.node != 0 {
                chain.push(item.ty.id());
            }

            for (pos, def) in defs.into_iter().enumerate() {
                let (tag, name, options) = config.field_name(&def);
                if name == "-" {
                    continue;
                }

                let path = if item.prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", item.prefix, name)
                };

                let mut traversal = nodes[item.node].index.clone();
                traversal.push(pos);

                let id = nodes.len();
                if let Some(nested) = def.nested {
                    let prefix = if def.embedded && tag.is_none() {
                        item.prefix.clone()
                    } else {
                        path.clone()
                    };
                    queue.push_back(Pending {
                        ty: nested,
                        node: id,
                        prefix,
                        ancestors: chain.clone(),
                    });
                }

                nodes.push(FieldInfo {
                    index: traversal,
                    path,
                    name,
                    options,
                    embedded: def.embedded,
                    field: Some(def),
                    parent: Some(item.node),
                    children: Vec::new(),
                });
                nodes[item.node].children[pos] = Some(id);
                index.push(id);
            }
        }

        let mut paths: HashMap<String, usize> = HashMap::new();
        let mut names: HashMap<String, usize> = HashMap::new();
        for &id in &index {
            let fi = &nodes[id];
            // an embedded container yields its path to whatever else claims it
            let replace = match paths.get(&fi.path) {
                None => true,
                Some(&existing) => nodes[existing].embedded,
            };
            if replace {
                paths.insert(fi.path.clone(), id);
                if !fi.name.is_empty() && !fi.embedded {
                    names.insert(fi.path.clone(), id);
                }
            }
        }

        Self {
            record_type,
            nodes,
            index,
            paths,
            names,
        }
    }

    /// The record type this map describes.
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// The synthetic root node.
    pub fn tree(&self) -> &FieldInfo {
        &self.nodes[0]
    }

    /// All reachable fields in breadth-first discovery order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.index.iter().map(|&id| &self.nodes[id])
    }

    /// Field at an exact dotted path.
    pub fn get_by_path(&self, path: &str) -> Option<&FieldInfo> {
        self.paths.get(path).map(|&id| &self.nodes[id])
    }

    /// Non-embedded field by canonical (dotted) name. This is the lookup used
    /// to resolve query parameter names and result columns.
    pub fn get_by_name(&self, name: &str) -> Option<&FieldInfo> {
        self.names.get(name).map(|&id| &self.nodes[id])
    }

    /// Field reached by descending the tree along `index`.
    ///
    /// Returns `None` for an empty traversal, an out-of-range position, or an
    /// excluded field at any step.
    pub fn get_by_traversal(&self, index: &[usize]) -> Option<&FieldInfo> {
        if index.is_empty() {
            return None;
        }
        let mut node = 0;
        for &i in index {
            node = (*self.nodes[node].children.get(i)?)?;
        }
        Some(&self.nodes[node])
    }

    /// Parent of `field`, or `None` for top-level fields.
    pub fn parent(&self, field: &FieldInfo) -> Option<&FieldInfo> {
        match field.parent {
            Some(0) | None => None,
            Some(id) => Some(&self.nodes[id]),
        }
    }

    /// Children of `field`, one slot per declared field, `None` for excluded.
    pub fn children<'a>(
        &'a self,
        field: &'a FieldInfo,
    ) -> impl Iterator<Item = Option<&'a FieldInfo>> + 'a {
        field
            .children
            .iter()
            .map(|c| c.map(|id| &self.nodes[id]))
    }

    /// Traversal for a canonical name; empty when there is no such field.
    pub fn traversal(&self, name: &str) -> &[usize] {
        self.get_by_name(name)
            .map(|fi| fi.index.as_slice())
            .unwrap_or(&[])
    }
}
