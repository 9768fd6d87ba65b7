use crate::dialect::BindStyle;
use crate::error::{BindError, BindResult};
use std::fmt::Write as _;

/// A named query template compiled for one bind style.
///
/// `names` lists the parameter names in the order their placeholders appear
/// in `query`, duplicates included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedQuery {
    query: String,
    names: Vec<String>,
}

impl NamedQuery {
    /// Rewritten query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Parameter names in placeholder order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.query, self.names)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Compile a `:name` template into `style` placeholders.
///
/// `::` emits a literal `:` and `:=` passes through unchanged. A `:` inside a
/// name that is not part of `::` is rejected with its byte position.
///
/// ```
/// use rowbind::{BindStyle, compile};
///
/// let q = compile("SELECT * FROM person WHERE first_name = :first", BindStyle::Dollar).unwrap();
/// assert_eq!(q.query(), "SELECT * FROM person WHERE first_name = $1");
/// assert_eq!(q.names(), ["first"]);
/// ```
pub fn compile(query: &str, style: BindStyle) -> BindResult<NamedQuery> {
    let bytes = query.as_bytes();
    let last = query.char_indices().last().map(|(i, _)| i).unwrap_or(0);

    let mut rebound = String::with_capacity(query.len());
    let mut names = Vec::new();
    let mut name = String::new();
    let mut in_name = false;
    let mut current = 1;

    for (i, c) in query.char_indices() {
        if c == ':' {
            if in_name && i > 0 && bytes[i - 1] == b':' {
                rebound.push(':');
                in_name = false;
                continue;
            } else if in_name {
                return Err(BindError::MalformedTemplate { position: i });
            }
            in_name = true;
            name.clear();
        } else if in_name && i > 0 && c == '=' && name.is_empty() {
            rebound.push_str(":=");
            in_name = false;
            continue;
        } else if in_name && is_name_char(c) && i != last {
            name.push(c);
        } else if in_name {
            in_name = false;
            // the final character still belongs to the name
            let consumed = i == last && c.is_ascii_alphanumeric();
            if consumed {
                name.push(c);
            }

            match style {
                BindStyle::Named => {
                    rebound.push(':');
                    rebound.push_str(&name);
                }
                BindStyle::Dollar => {
                    let _ = write!(rebound, "${current}");
                    current += 1;
                }
                BindStyle::At => {
                    let _ = write!(rebound, "@p{current}");
                    current += 1;
                }
                BindStyle::Question | BindStyle::Unknown => rebound.push('?'),
            }
            names.push(std::mem::take(&mut name));

            if !consumed {
                rebound.push(c);
            }
        } else {
            rebound.push(c);
        }
    }

    tracing::trace!(target: "rowbind", query = %rebound, names = ?names, "compiled named query");
    Ok(NamedQuery {
        query: rebound,
        names,
    })
}
