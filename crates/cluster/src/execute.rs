//! Statement execution against the catalog.
//!
//! Reads take `&Catalog`, everything else `&mut Catalog`, so the node can
//! serve concurrent page fetches while writes are serialized.

use crate::{
    cql::ast::{
        Batch, BatchKind, CreateTable, Delete, Insert, Literal, Operation, ParsedStatement, RelOp,
        Relation, Select, Selection, Statement, TableName, Update,
    },
    literal::resolve,
    paging::PageToken,
    schema::{Catalog, TableSchema},
    storage::RowKey,
};
use driver::{
    connection::{ChangeKind, QueryResponse, SchemaChange},
    error::QueryError,
};
use model::{
    core::{data_type::CqlType, value::Value},
    pagination::{page::ResultPage, page_size::PageSize, paging_state::PagingState},
    records::row::ColumnSpec,
};
use std::{cmp::Ordering, sync::Arc};
use uuid::Uuid;

const FILTERING_REQUIRED: &str = "Cannot execute this query as it might involve data filtering \
     and thus may have unpredictable performance. If you want to execute this query despite the \
     performance unpredictability, use ALLOW FILTERING";

/// Request-scoped inputs of a statement.
pub struct ExecutionContext<'a> {
    pub keyspace: Option<&'a str>,
    pub values: &'a [Value],
    pub page_size: PageSize,
    pub paging_state: Option<&'a PagingState>,
}

impl ExecutionContext<'_> {
    fn keyspace_for(&self, table: &TableName) -> Result<String, QueryError> {
        table
            .keyspace
            .as_deref()
            .or(self.keyspace)
            .map(str::to_string)
            .ok_or_else(|| {
                QueryError::InvalidQuery(
                    "No keyspace has been specified. USE a keyspace, or explicitly specify \
                     keyspace.tablename"
                        .to_string(),
                )
            })
    }
}

pub fn check_bound_values(parsed: &ParsedStatement, values: &[Value]) -> Result<(), QueryError> {
    if parsed.markers != values.len() {
        return Err(QueryError::InvalidQuery(format!(
            "There were {} markers(?) in CQL but {} bound variables",
            parsed.markers,
            values.len()
        )));
    }
    Ok(())
}

pub fn is_read(statement: &Statement) -> bool {
    matches!(statement, Statement::Select(_) | Statement::Use(_))
}

pub fn execute_read(
    catalog: &Catalog,
    statement: &Statement,
    ctx: &ExecutionContext,
) -> Result<QueryResponse, QueryError> {
    match statement {
        Statement::Select(select) => execute_select(catalog, select, ctx),
        Statement::Use(keyspace) => {
            catalog.keyspace(keyspace)?;
            Ok(QueryResponse::SetKeyspace(keyspace.clone()))
        }
        other => Err(QueryError::Protocol(format!(
            "statement is not a read: {other:?}"
        ))),
    }
}

pub fn execute_write(
    catalog: &mut Catalog,
    statement: &Statement,
    ctx: &ExecutionContext,
) -> Result<QueryResponse, QueryError> {
    match statement {
        Statement::CreateKeyspace {
            name,
            if_not_exists,
            replication_factor,
        } => {
            if !catalog.create_keyspace(name, *replication_factor) {
                return if *if_not_exists {
                    Ok(QueryResponse::Void)
                } else {
                    Err(QueryError::AlreadyExists {
                        keyspace: name.clone(),
                        table: String::new(),
                    })
                };
            }
            Ok(schema_change(ChangeKind::Created, name, None))
        }
        Statement::DropKeyspace { name, if_exists } => {
            if catalog.drop_keyspace(name) {
                Ok(schema_change(ChangeKind::Dropped, name, None))
            } else if *if_exists {
                Ok(QueryResponse::Void)
            } else {
                Err(QueryError::InvalidQuery(format!(
                    "Cannot drop non existing keyspace '{name}'"
                )))
            }
        }
        Statement::CreateTable(def) => create_table(catalog, def, ctx),
        Statement::DropTable { table, if_exists } => {
            let keyspace = ctx.keyspace_for(table)?;
            if catalog.drop_table(&keyspace, &table.name)? {
                Ok(schema_change(
                    ChangeKind::Dropped,
                    &keyspace,
                    Some(table.name.clone()),
                ))
            } else if *if_exists {
                Ok(QueryResponse::Void)
            } else {
                Err(QueryError::InvalidQuery(format!(
                    "Cannot drop non existing table '{}' in keyspace '{keyspace}'",
                    table.name
                )))
            }
        }
        Statement::Truncate(table) => {
            let keyspace = ctx.keyspace_for(table)?;
            catalog.table_mut(&keyspace, &table.name)?.data.clear();
            Ok(QueryResponse::Void)
        }
        Statement::CreateIndex {
            name,
            table,
            column,
            if_not_exists,
        } => {
            let keyspace = ctx.keyspace_for(table)?;
            let index_name = name
                .clone()
                .unwrap_or_else(|| format!("{}_{column}_idx", table.name));
            let existing = catalog.table(&keyspace, &table.name)?;
            let position = existing.schema.column_index(column)?;

            if existing.schema.indexes.contains_key(&position)
                || catalog.index_exists(&keyspace, &index_name)
            {
                return if *if_not_exists {
                    Ok(QueryResponse::Void)
                } else {
                    Err(QueryError::InvalidQuery(format!(
                        "Index {index_name} already exists"
                    )))
                };
            }

            catalog
                .table_mut(&keyspace, &table.name)?
                .schema
                .indexes
                .insert(position, index_name);
            Ok(schema_change(
                ChangeKind::Updated,
                &keyspace,
                Some(table.name.clone()),
            ))
        }
        Statement::Insert(insert) if insert.if_not_exists => {
            insert_if_not_exists(catalog, statement, ctx)
        }
        Statement::Insert(_) | Statement::Update(_) | Statement::Delete(_) => {
            let mutation = Mutation::resolve(catalog, statement, ctx)?;
            mutation.apply(catalog)?;
            Ok(QueryResponse::Void)
        }
        Statement::Batch(batch) => execute_batch(catalog, batch, ctx),
        Statement::Select(_) | Statement::Use(_) => execute_read(catalog, statement, ctx),
    }
}

fn schema_change(change: ChangeKind, keyspace: &str, table: Option<String>) -> QueryResponse {
    QueryResponse::SchemaChange(SchemaChange {
        change,
        keyspace: keyspace.to_string(),
        table,
        schema_version: Uuid::new_v4(),
    })
}

fn create_table(
    catalog: &mut Catalog,
    def: &CreateTable,
    ctx: &ExecutionContext,
) -> Result<QueryResponse, QueryError> {
    let keyspace = ctx.keyspace_for(&def.table)?;
    if catalog.keyspace(&keyspace)?.tables.contains_key(&def.table.name) {
        return if def.if_not_exists {
            Ok(QueryResponse::Void)
        } else {
            Err(QueryError::AlreadyExists {
                keyspace,
                table: def.table.name.clone(),
            })
        };
    }

    let schema = TableSchema::from_definition(&keyspace, def)?;
    catalog.create_table(schema)?;
    Ok(schema_change(
        ChangeKind::Created,
        &keyspace,
        Some(def.table.name.clone()),
    ))
}

fn insert_if_not_exists(
    catalog: &mut Catalog,
    statement: &Statement,
    ctx: &ExecutionContext,
) -> Result<QueryResponse, QueryError> {
    let mutation = Mutation::resolve(catalog, statement, ctx)?;
    let applied = catalog
        .table(&mutation.keyspace, &mutation.table)?
        .data
        .get(&mutation.key)
        .is_none();
    if applied {
        mutation.apply(catalog)?;
    }

    let columns: Arc<[ColumnSpec]> = Arc::from(vec![ColumnSpec::new("[applied]", CqlType::Boolean)]);
    Ok(QueryResponse::Rows(ResultPage::new(
        columns,
        vec![vec![Value::Boolean(applied)]],
        None,
    )))
}

/// Every statement of the batch is validated before any of them is applied.
fn execute_batch(
    catalog: &mut Catalog,
    batch: &Batch,
    ctx: &ExecutionContext,
) -> Result<QueryResponse, QueryError> {
    let mut mutations = Vec::with_capacity(batch.statements.len());
    for statement in &batch.statements {
        if matches!(statement, Statement::Insert(insert) if insert.if_not_exists) {
            return Err(QueryError::InvalidQuery(
                "Conditional statements are not supported in batches".to_string(),
            ));
        }

        let mutation = Mutation::resolve(catalog, statement, ctx)?;
        match (batch.kind == BatchKind::Counter, mutation.counter) {
            (true, false) => {
                return Err(QueryError::InvalidQuery(
                    "Only counter mutations are allowed in COUNTER batches".to_string(),
                ));
            }
            (false, true) => {
                return Err(QueryError::InvalidQuery(
                    "Counter mutations are only allowed in COUNTER batches".to_string(),
                ));
            }
            _ => {}
        }
        mutations.push(mutation);
    }

    for mutation in mutations {
        mutation.apply(catalog)?;
    }
    Ok(QueryResponse::Void)
}

/// A fully resolved write to a single row or partition.
struct Mutation {
    keyspace: String,
    table: String,
    key: RowKey,
    counter: bool,
    kind: MutationKind,
}

enum MutationKind {
    Upsert {
        width: usize,
        cells: Vec<(usize, Value)>,
    },
    Counter {
        width: usize,
        key_cells: Vec<(usize, Value)>,
        deltas: Vec<(usize, i64)>,
    },
    DeleteRow,
    DeletePartition,
}

impl Mutation {
    fn resolve(
        catalog: &Catalog,
        statement: &Statement,
        ctx: &ExecutionContext,
    ) -> Result<Self, QueryError> {
        let (keyspace, schema, (key, kind)) = match statement {
            Statement::Insert(insert) => {
                let (keyspace, schema) = locate(catalog, &insert.table, ctx)?;
                (keyspace, schema, resolve_insert(schema, insert, ctx)?)
            }
            Statement::Update(update) => {
                let (keyspace, schema) = locate(catalog, &update.table, ctx)?;
                (keyspace, schema, resolve_update(schema, update, ctx)?)
            }
            Statement::Delete(delete) => {
                let (keyspace, schema) = locate(catalog, &delete.table, ctx)?;
                (keyspace, schema, resolve_delete(schema, delete, ctx)?)
            }
            other => {
                return Err(QueryError::InvalidQuery(format!(
                    "not a data modification statement: {other:?}"
                )));
            }
        };

        Ok(Mutation {
            keyspace,
            table: schema.name.clone(),
            key,
            counter: schema.is_counter,
            kind,
        })
    }

    fn apply(self, catalog: &mut Catalog) -> Result<(), QueryError> {
        let data = &mut catalog.table_mut(&self.keyspace, &self.table)?.data;
        match self.kind {
            MutationKind::Upsert { width, cells } => data.upsert(self.key, width, cells),
            MutationKind::Counter {
                width,
                mut key_cells,
                deltas,
            } => {
                let current = data.get(&self.key).cloned();
                for (index, delta) in deltas {
                    // Missing rows and cells count from zero.
                    let base = current
                        .as_ref()
                        .and_then(|row| row[index].as_i64())
                        .unwrap_or(0);
                    key_cells.push((index, Value::Counter(base.wrapping_add(delta))));
                }
                data.upsert(self.key, width, key_cells);
            }
            MutationKind::DeleteRow => {
                data.remove(&self.key);
            }
            MutationKind::DeletePartition => {
                data.remove_partition(&self.key);
            }
        }
        Ok(())
    }
}

fn locate<'c>(
    catalog: &'c Catalog,
    table: &TableName,
    ctx: &ExecutionContext,
) -> Result<(String, &'c TableSchema), QueryError> {
    let keyspace = ctx.keyspace_for(table)?;
    let schema = &catalog.table(&keyspace, &table.name)?.schema;
    Ok((keyspace, schema))
}

fn resolve_insert(
    schema: &TableSchema,
    insert: &Insert,
    ctx: &ExecutionContext,
) -> Result<(RowKey, MutationKind), QueryError> {
    if schema.is_counter {
        return Err(QueryError::InvalidQuery(
            "INSERT statements are not allowed on counter tables, use UPDATE instead".to_string(),
        ));
    }
    if insert.columns.len() != insert.values.len() {
        return Err(QueryError::InvalidQuery(
            "Unmatched column names/values".to_string(),
        ));
    }

    let mut cells: Vec<(usize, Value)> = Vec::with_capacity(insert.columns.len());
    for (name, literal) in insert.columns.iter().zip(&insert.values) {
        let index = schema.column_index(name)?;
        if cells.iter().any(|(i, _)| *i == index) {
            return Err(QueryError::InvalidQuery(format!(
                "Multiple definitions found for column {name}"
            )));
        }
        let value = resolve(literal, schema.columns[index].data_type, ctx.values)?;
        cells.push((index, value));
    }

    let lookup = |index: usize| {
        cells
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, v)| v.clone())
    };
    let partition = key_values(schema, &schema.partition_key, lookup, "partition")?;
    let clustering = key_values(schema, &schema.clustering_key, lookup, "clustering")?;

    Ok((
        RowKey::new(&partition, &clustering),
        MutationKind::Upsert {
            width: schema.columns.len(),
            cells,
        },
    ))
}

fn resolve_update(
    schema: &TableSchema,
    update: &Update,
    ctx: &ExecutionContext,
) -> Result<(RowKey, MutationKind), QueryError> {
    let key_cells = key_cells(schema, &update.relations, ctx)?;
    let lookup = |index: usize| {
        key_cells
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, v)| v.clone())
    };
    let partition = key_values(schema, &schema.partition_key, lookup, "partition")?;
    let clustering = key_values(schema, &schema.clustering_key, lookup, "clustering")?;

    let mut cells = Vec::new();
    let mut deltas = Vec::new();
    for assignment in &update.assignments {
        let name = &assignment.column;
        let index = schema.column_index(name)?;
        if schema.is_primary_key(index) {
            return Err(QueryError::InvalidQuery(format!(
                "PRIMARY KEY part {name} found in SET part"
            )));
        }

        let data_type = schema.columns[index].data_type;
        match (&assignment.operation, data_type == CqlType::Counter) {
            (Operation::Set(literal), false) => {
                cells.push((index, resolve(literal, data_type, ctx.values)?));
            }
            (Operation::Set(_), true) => {
                return Err(QueryError::InvalidQuery(format!(
                    "Cannot set the value of counter column {name} (counters can only be \
                     incremented/decremented, not set)"
                )));
            }
            (Operation::Add(literal), true) => deltas.push((index, counter_delta(literal, ctx)?)),
            (Operation::Subtract(literal), true) => {
                deltas.push((index, counter_delta(literal, ctx)?.wrapping_neg()));
            }
            (Operation::Add(_) | Operation::Subtract(_), false) => {
                return Err(QueryError::InvalidQuery(format!(
                    "Invalid operation ({name} = {name} + ?) for non counter column {name}"
                )));
            }
        }
    }

    let key = RowKey::new(&partition, &clustering);
    let width = schema.columns.len();
    let kind = if schema.is_counter {
        MutationKind::Counter {
            width,
            key_cells,
            deltas,
        }
    } else {
        let mut all = key_cells;
        all.extend(cells);
        MutationKind::Upsert { width, cells: all }
    };
    Ok((key, kind))
}

fn counter_delta(literal: &Literal, ctx: &ExecutionContext) -> Result<i64, QueryError> {
    resolve(literal, CqlType::Counter, ctx.values)?
        .as_i64()
        .ok_or_else(|| {
            QueryError::InvalidQuery("Invalid null value for counter increment".to_string())
        })
}

fn resolve_delete(
    schema: &TableSchema,
    delete: &Delete,
    ctx: &ExecutionContext,
) -> Result<(RowKey, MutationKind), QueryError> {
    let key_cells = key_cells(schema, &delete.relations, ctx)?;
    let lookup = |index: usize| {
        key_cells
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, v)| v.clone())
    };
    let partition = key_values(schema, &schema.partition_key, lookup, "partition")?;

    let whole_partition = !schema.clustering_key.is_empty()
        && schema.clustering_key.iter().all(|&i| lookup(i).is_none());
    if whole_partition {
        return Ok((RowKey::new(&partition, &[]), MutationKind::DeletePartition));
    }

    let clustering = key_values(schema, &schema.clustering_key, lookup, "clustering")?;
    Ok((RowKey::new(&partition, &clustering), MutationKind::DeleteRow))
}

/// Equality restrictions of a modification's `WHERE`, which may only name
/// primary key columns.
fn key_cells(
    schema: &TableSchema,
    relations: &[Relation],
    ctx: &ExecutionContext,
) -> Result<Vec<(usize, Value)>, QueryError> {
    relations
        .iter()
        .map(|relation| {
            let name = &relation.column;
            let index = schema.column_index(name)?;
            if !schema.is_primary_key(index) {
                return Err(QueryError::InvalidQuery(format!(
                    "Non PRIMARY KEY columns found in where clause: {name}"
                )));
            }
            if relation.op != RelOp::Eq {
                return Err(QueryError::InvalidQuery(format!(
                    "Invalid operator {} for PRIMARY KEY part {name}",
                    relation.op.as_str()
                )));
            }
            let value = resolve(&relation.value, schema.columns[index].data_type, ctx.values)?;
            Ok((index, value))
        })
        .collect()
}

fn key_values<F>(
    schema: &TableSchema,
    positions: &[usize],
    lookup: F,
    part: &str,
) -> Result<Vec<Value>, QueryError>
where
    F: Fn(usize) -> Option<Value>,
{
    positions
        .iter()
        .map(|&index| {
            let name = &schema.columns[index].name;
            match lookup(index) {
                Some(Value::Null) => Err(QueryError::InvalidQuery(format!(
                    "Invalid null value for {part} key part {name}"
                ))),
                Some(value) => Ok(value),
                None => Err(QueryError::InvalidQuery(format!(
                    "Some {part} key parts are missing: {name}"
                ))),
            }
        })
        .collect()
}

struct Filter {
    index: usize,
    op: RelOp,
    value: Value,
}

impl Filter {
    fn matches(&self, row: &[Value]) -> bool {
        let cell = &row[self.index];
        if cell.is_null() {
            return false;
        }
        let Some(ordering) = cell.compare(&self.value) else {
            return false;
        };
        match self.op {
            RelOp::Eq => ordering == Ordering::Equal,
            RelOp::Lt => ordering == Ordering::Less,
            RelOp::Lte => ordering != Ordering::Greater,
            RelOp::Gt => ordering == Ordering::Greater,
            RelOp::Gte => ordering != Ordering::Less,
        }
    }
}

fn execute_select(
    catalog: &Catalog,
    select: &Select,
    ctx: &ExecutionContext,
) -> Result<QueryResponse, QueryError> {
    let keyspace = ctx.keyspace_for(&select.table)?;
    let table = catalog.table(&keyspace, &select.table.name)?;
    let schema = &table.schema;

    let filters = select
        .relations
        .iter()
        .map(|relation| {
            let index = schema.column_index(&relation.column)?;
            let value = resolve(&relation.value, schema.columns[index].data_type, ctx.values)?;
            Ok(Filter {
                index,
                op: relation.op,
                value,
            })
        })
        .collect::<Result<Vec<_>, QueryError>>()?;

    let needs_filtering = filters.iter().any(|f| {
        !schema.is_primary_key(f.index)
            && !(f.op == RelOp::Eq && schema.indexes.contains_key(&f.index))
    });
    if needs_filtering && !select.allow_filtering {
        return Err(QueryError::InvalidQuery(FILTERING_REQUIRED.to_string()));
    }

    let matches = |row: &[Value]| filters.iter().all(|f| f.matches(row));

    if select.selection == Selection::Count {
        let count = table
            .data
            .scan_after(None)
            .filter(|(_, row)| matches(row.as_slice()))
            .count();
        let count = select.limit.map_or(count, |limit| count.min(limit));
        let columns: Arc<[ColumnSpec]> = Arc::from(vec![ColumnSpec::new("count", CqlType::Bigint)]);
        return Ok(QueryResponse::Rows(ResultPage::new(
            columns,
            vec![vec![Value::Bigint(count as i64)]],
            None,
        )));
    }

    let (projection, columns): (Vec<usize>, Arc<[ColumnSpec]>) = match &select.selection {
        Selection::Columns(names) => {
            let projection = names
                .iter()
                .map(|name| schema.column_index(name))
                .collect::<Result<Vec<_>, _>>()?;
            let columns = projection.iter().map(|&i| schema.columns[i].clone()).collect();
            (projection, columns)
        }
        _ => ((0..schema.columns.len()).collect(), schema.columns.clone()),
    };

    let token = ctx.paging_state.map(PageToken::decode).transpose()?;
    let emitted = token.as_ref().map_or(0, |t| t.emitted);
    let remaining = select
        .limit
        .map_or(usize::MAX, |limit| limit.saturating_sub(emitted));
    let page_rows = ctx.page_size.take(remaining);

    let mut candidates = table
        .data
        .scan_after(token.as_ref().map(|t| &t.last_key))
        .filter(|(_, row)| matches(row.as_slice()));

    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut last_key = None;
    for (key, row) in candidates.by_ref().take(page_rows) {
        rows.push(projection.iter().map(|&i| row[i].clone()).collect());
        last_key = Some(key);
    }

    // Look one row ahead so the final page never comes back empty.
    let has_more = rows.len() < remaining && candidates.next().is_some();
    let paging_state = match (has_more, last_key) {
        (true, Some(key)) => Some(
            PageToken {
                last_key: key.clone(),
                emitted: emitted + rows.len(),
            }
            .encode()?,
        ),
        _ => None,
    };

    Ok(QueryResponse::Rows(ResultPage::new(
        columns,
        rows,
        paging_state,
    )))
}
