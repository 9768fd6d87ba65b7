//! A client bundled with its bind style, mapper and scan policy.

use crate::client::GenericClient;
use crate::dialect::{BindStyle, rebind};
use crate::error::BindResult;
use crate::expand::expand_values;
use crate::mapper::{Mapper, default_mapper};
use crate::named::{NamedArgs, NamedQuery, bind_named, compile};
use crate::pg::{PgCursor, params};
use crate::record::Record;
use crate::rows::{Rows, scan_all, scan_maps, scan_one, scan_scalar, scan_scalars};
use crate::value::{FromValue, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Configuration for [`Db`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbConfig {
    /// Placeholder syntax of the backend.
    pub style: BindStyle,
    /// Ignore result columns that have no destination field.
    pub lenient: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            style: BindStyle::Dollar,
            lenient: false,
        }
    }
}

impl DbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config for a registered backend name, e.g. `"postgres"`.
    pub fn for_driver(driver: &str) -> Self {
        Self::new().style(crate::dialect::bind_style(driver))
    }

    pub fn style(mut self, style: BindStyle) -> Self {
        self.style = style;
        self
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }
}

/// A [`GenericClient`] that speaks `?` and `:name` templates and scans into
/// records.
///
/// ```ignore
/// let db = Db::new(client);
/// let people: Vec<Person> = db
///     .select("SELECT * FROM person WHERE age > ?", &[Value::Int(30)])
///     .await?;
/// ```
pub struct Db<C> {
    client: C,
    mapper: Arc<Mapper>,
    config: DbConfig,
}

impl<C: GenericClient> Db<C> {
    pub fn new(client: C) -> Self {
        Self::with_config(client, DbConfig::default())
    }

    pub fn with_config(client: C, config: DbConfig) -> Self {
        Self {
            client,
            mapper: default_mapper(),
            config,
        }
    }

    /// Use `mapper` instead of the process-wide default.
    pub fn with_mapper(mut self, mapper: Arc<Mapper>) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn mapper(&self) -> &Arc<Mapper> {
        &self.mapper
    }

    pub fn config(&self) -> DbConfig {
        self.config
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    /// Rewrite a `?` template into this backend's placeholders.
    pub fn rebind(&self, query: &str) -> String {
        rebind(self.config.style, query)
    }

    /// Compile and bind a `:name` template for this backend.
    pub fn bind_named<A>(&self, query: &str, source: &A) -> BindResult<(String, Vec<Value>)>
    where
        A: NamedArgs + ?Sized,
    {
        bind_named(self.config.style, query, &source, &self.mapper)
    }

    /// Compile a `:name` template once for repeated execution.
    pub fn prepare_named(&self, query: &str) -> BindResult<NamedStmt> {
        Ok(NamedStmt {
            query: compile(query, self.config.style)?,
            mapper: self.mapper.clone(),
            lenient: self.config.lenient,
        })
    }

    fn rows(&self, rows: Vec<tokio_postgres::Row>) -> Rows<PgCursor> {
        Rows::with_mapper(PgCursor::new(rows), self.mapper.clone()).lenient(self.config.lenient)
    }

    async fn run(&self, query: &str, args: &[Value]) -> BindResult<Rows<PgCursor>> {
        tracing::debug!(target: "rowbind", sql = %query, args = args.len(), "query");
        let rows = self.client.query(query, &params(args)).await?;
        Ok(self.rows(rows))
    }

    /// Run a `?` template.
    pub async fn query(&self, query: &str, args: &[Value]) -> BindResult<Rows<PgCursor>> {
        self.run(&self.rebind(query), args).await
    }

    /// Run a `?` template whose list arguments expand into `IN (...)` lists.
    pub async fn query_in(&self, query: &str, args: Vec<Value>) -> BindResult<Rows<PgCursor>> {
        let (query, args) = expand_values(query, args)?;
        self.run(&self.rebind(&query), &args).await
    }

    /// Execute a `?` template and return the affected row count.
    pub async fn exec(&self, query: &str, args: &[Value]) -> BindResult<u64> {
        let query = self.rebind(query);
        tracing::debug!(target: "rowbind", sql = %query, args = args.len(), "execute");
        self.client.execute(&query, &params(args)).await
    }

    /// Every row of a `?` template as a `T`.
    pub async fn select<T>(&self, query: &str, args: &[Value]) -> BindResult<Vec<T>>
    where
        T: Record + Default,
    {
        scan_all(&mut self.query(query, args).await?)
    }

    /// The first row of a `?` template as a `T`; [`NoRows`](crate::BindError::NoRows)
    /// when empty.
    pub async fn get<T>(&self, query: &str, args: &[Value]) -> BindResult<T>
    where
        T: Record + Default,
    {
        let query = self.rebind(query);
        tracing::debug!(target: "rowbind", sql = %query, args = args.len(), "query one");
        let row = self.client.query_one(&query, &params(args)).await?;
        scan_one(&mut self.rows(vec![row]))
    }

    /// The first row of a `?` template as a `T`, if any.
    pub async fn get_opt<T>(&self, query: &str, args: &[Value]) -> BindResult<Option<T>>
    where
        T: Record + Default,
    {
        let query = self.rebind(query);
        tracing::debug!(target: "rowbind", sql = %query, args = args.len(), "query opt");
        match self.client.query_opt(&query, &params(args)).await? {
            Some(row) => scan_one(&mut self.rows(vec![row])).map(Some),
            None => Ok(None),
        }
    }

    /// Every row of a `?` template keyed by column name.
    pub async fn select_maps(
        &self,
        query: &str,
        args: &[Value],
    ) -> BindResult<Vec<HashMap<String, Value>>> {
        scan_maps(&mut self.query(query, args).await?)
    }

    /// Every row's single column as a `T`.
    pub async fn select_scalars<T: FromValue>(
        &self,
        query: &str,
        args: &[Value],
    ) -> BindResult<Vec<T>> {
        scan_scalars(&mut self.query(query, args).await?)
    }

    /// The first row's single column as a `T`.
    pub async fn get_scalar<T: FromValue>(&self, query: &str, args: &[Value]) -> BindResult<T> {
        let query = self.rebind(query);
        tracing::debug!(target: "rowbind", sql = %query, args = args.len(), "query one");
        let row = self.client.query_one(&query, &params(args)).await?;
        scan_scalar(&mut self.rows(vec![row]))
    }

    /// Run a `:name` template bound from `source`.
    pub async fn named_query<A>(&self, query: &str, source: &A) -> BindResult<Rows<PgCursor>>
    where
        A: NamedArgs + Sync + ?Sized,
    {
        let (query, args) = self.bind_named(query, source)?;
        self.run(&query, &args).await
    }

    /// Execute a `:name` template bound from `source`. Batch sources run as
    /// one multi-row statement.
    pub async fn named_exec<A>(&self, query: &str, source: &A) -> BindResult<u64>
    where
        A: NamedArgs + Sync + ?Sized,
    {
        let (query, args) = self.bind_named(query, source)?;
        tracing::debug!(target: "rowbind", sql = %query, args = args.len(), "execute");
        self.client.execute(&query, &params(&args)).await
    }

    /// Every row of a `:name` template as a `T`.
    pub async fn named_select<T, A>(&self, query: &str, source: &A) -> BindResult<Vec<T>>
    where
        T: Record + Default,
        A: NamedArgs + Sync + ?Sized,
    {
        scan_all(&mut self.named_query(query, source).await?)
    }

    /// The first row of a `:name` template as a `T`.
    pub async fn named_get<T, A>(&self, query: &str, source: &A) -> BindResult<T>
    where
        T: Record + Default,
        A: NamedArgs + Sync + ?Sized,
    {
        scan_one(&mut self.named_query(query, source).await?)
    }
}

/// A named query compiled once and executed with different sources.
#[derive(Debug, Clone)]
pub struct NamedStmt {
    query: NamedQuery,
    mapper: Arc<Mapper>,
    lenient: bool,
}

impl NamedStmt {
    pub fn new(query: NamedQuery, mapper: Arc<Mapper>) -> Self {
        Self {
            query,
            mapper,
            lenient: false,
        }
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Compiled query text.
    pub fn sql(&self) -> &str {
        self.query.query()
    }

    pub fn names(&self) -> &[String] {
        self.query.names()
    }

    /// Argument values for `source`.
    pub fn bind<A>(&self, source: &A) -> BindResult<Vec<Value>>
    where
        A: NamedArgs + ?Sized,
    {
        self.query.bind(&source, &self.mapper)
    }

    pub async fn query<C, A>(&self, client: &C, source: &A) -> BindResult<Rows<PgCursor>>
    where
        C: GenericClient,
        A: NamedArgs + Sync + ?Sized,
    {
        let args = self.bind(source)?;
        let rows = client.query(self.sql(), &params(&args)).await?;
        Ok(Rows::with_mapper(PgCursor::new(rows), self.mapper.clone()).lenient(self.lenient))
    }

    pub async fn exec<C, A>(&self, client: &C, source: &A) -> BindResult<u64>
    where
        C: GenericClient,
        A: NamedArgs + Sync + ?Sized,
    {
        let args = self.bind(source)?;
        client.execute(self.sql(), &params(&args)).await
    }

    pub async fn select<T, C, A>(&self, client: &C, source: &A) -> BindResult<Vec<T>>
    where
        T: Record + Default,
        C: GenericClient,
        A: NamedArgs + Sync + ?Sized,
    {
        scan_all(&mut self.query(client, source).await?)
    }

    pub async fn get<T, C, A>(&self, client: &C, source: &A) -> BindResult<T>
    where
        T: Record + Default,
        C: GenericClient,
        A: NamedArgs + Sync + ?Sized,
    {
        scan_one(&mut self.query(client, source).await?)
    }
}
