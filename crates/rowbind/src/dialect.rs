//! Bind-variable dialects and the `?` rebinding translator.
//!
//! Templates are written with the universal `?` placeholder and rebound to
//! whatever the target backend expects:
//!
//! | style      | placeholder |
//! |------------|-------------|
//! | `Question` | `?`         |
//! | `Dollar`   | `$1`, `$2`  |
//! | `Named`    | `:arg1`     |
//! | `At`       | `@p1`       |
//!
//! Rebinding is textual. A `?` inside a string literal is rewritten like any
//! other, so templates must not contain literal question marks.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{OnceLock, RwLock};

/// Bind-variable syntax of a SQL backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindStyle {
    /// Backend not registered; treated like `Question`.
    #[default]
    Unknown,
    /// `?`
    Question,
    /// `$1`, `$2`, ...
    Dollar,
    /// `:arg1`, `:arg2`, ... (named-only backends such as Oracle)
    Named,
    /// `@p1`, `@p2`, ...
    At,
}

impl BindStyle {
    /// Whether queries in this style are written with plain `?`.
    pub fn is_question(self) -> bool {
        matches!(self, BindStyle::Unknown | BindStyle::Question)
    }
}

const DEFAULT_BINDS: &[(BindStyle, &[&str])] = &[
    (
        BindStyle::Dollar,
        &[
            "postgres",
            "pgx",
            "pq-timeouts",
            "cloudsqlpostgres",
            "ql",
            "nrpostgres",
            "cockroach",
        ],
    ),
    (
        BindStyle::Question,
        &["mysql", "sqlite3", "nrmysql", "nrsqlite3"],
    ),
    (BindStyle::Named, &["oci8", "ora", "goracle", "godror"]),
    (BindStyle::At, &["sqlserver", "azuresql"]),
];

/// Registry mapping a backend identifier to its [`BindStyle`].
///
/// Safe for concurrent readers and writers. Concurrent registrations of the
/// same key race; the last one stored wins.
#[derive(Debug)]
pub struct DialectTable {
    binds: RwLock<HashMap<String, BindStyle>>,
}

impl Default for DialectTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl DialectTable {
    /// A table with no registrations.
    pub fn empty() -> Self {
        Self {
            binds: RwLock::new(HashMap::new()),
        }
    }

    /// A table pre-populated with the well-known backends.
    pub fn with_defaults() -> Self {
        let mut binds = HashMap::new();
        for (style, drivers) in DEFAULT_BINDS {
            for driver in *drivers {
                binds.insert((*driver).to_string(), *style);
            }
        }
        Self {
            binds: RwLock::new(binds),
        }
    }

    /// The process-wide table.
    pub fn global() -> &'static DialectTable {
        static GLOBAL: OnceLock<DialectTable> = OnceLock::new();
        GLOBAL.get_or_init(DialectTable::with_defaults)
    }

    /// Style registered for `driver`, or [`BindStyle::Unknown`].
    pub fn style(&self, driver: &str) -> BindStyle {
        self.binds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(driver)
            .copied()
            .unwrap_or_default()
    }

    /// Register (or replace) the style for `driver`.
    pub fn register(&self, driver: impl Into<String>, style: BindStyle) {
        let driver = driver.into();
        tracing::debug!(target: "rowbind", driver = %driver, ?style, "register bind style");
        self.binds
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(driver, style);
    }
}

/// Style registered for `driver` in the process-wide table.
pub fn bind_style(driver: &str) -> BindStyle {
    DialectTable::global().style(driver)
}

/// Register `driver` in the process-wide table.
pub fn register_driver(driver: impl Into<String>, style: BindStyle) {
    DialectTable::global().register(driver, style);
}

/// Rewrite every `?` in `query` into the placeholder syntax of `style`.
///
/// `Unknown` and `Question` return the query unchanged.
pub fn rebind(style: BindStyle, query: &str) -> String {
    let prefix = match style {
        BindStyle::Unknown | BindStyle::Question => return query.to_string(),
        BindStyle::Dollar => "$",
        BindStyle::Named => ":arg",
        BindStyle::At => "@p",
    };

    // Room for ten placeholders before reallocating.
    let mut out = String::with_capacity(query.len() + 10);
    let mut rest = query;
    let mut n = 0usize;
    while let Some(i) = rest.find('?') {
        out.push_str(&rest[..i]);
        n += 1;
        out.push_str(prefix);
        let _ = write!(out, "{n}");
        rest = &rest[i + 1..];
    }
    out.push_str(rest);

    tracing::trace!(target: "rowbind", ?style, placeholders = n, sql = %out, "rebind");
    out
}
