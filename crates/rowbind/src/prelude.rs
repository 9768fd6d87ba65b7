//! Convenient imports for typical `rowbind` usage.
//!
//! ```ignore
//! use rowbind::prelude::*;
//! ```

pub use crate::{
    BindError, BindResult, BindStyle, Db, DbConfig, FromValue, GenericClient, NamedArgs,
    NamedStmt, Record, Rows, ToValue, Value, bind_named, compile, expand_in, named, rebind,
};
