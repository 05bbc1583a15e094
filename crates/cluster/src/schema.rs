use crate::{cql::ast::CreateTable, storage::TableData};
use driver::error::QueryError;
use model::{core::data_type::CqlType, records::row::ColumnSpec};
use std::{collections::HashMap, sync::Arc};

#[derive(Debug, Clone)]
pub struct TableSchema {
    pub keyspace: String,
    pub name: String,
    pub columns: Arc<[ColumnSpec]>,
    /// Column positions of the partition key, in key order.
    pub partition_key: Vec<usize>,
    pub clustering_key: Vec<usize>,
    /// Indexed column positions mapped to their index names.
    pub indexes: HashMap<usize, String>,
    pub is_counter: bool,
}

impl TableSchema {
    pub fn from_definition(keyspace: &str, def: &CreateTable) -> Result<Self, QueryError> {
        let mut columns = Vec::with_capacity(def.columns.len());
        for column in &def.columns {
            if columns
                .iter()
                .any(|c: &ColumnSpec| c.name == column.name)
            {
                return Err(QueryError::InvalidQuery(format!(
                    "Multiple definition of identifier {}",
                    column.name
                )));
            }
            columns.push(ColumnSpec::new(&column.name, column.data_type));
        }

        let position = |name: &String| {
            columns.iter().position(|c| &c.name == name).ok_or_else(|| {
                QueryError::InvalidQuery(format!(
                    "Unknown definition {name} referenced in PRIMARY KEY"
                ))
            })
        };
        let partition_key = def
            .partition_key
            .iter()
            .map(position)
            .collect::<Result<Vec<_>, _>>()?;
        let clustering_key = def
            .clustering_key
            .iter()
            .map(position)
            .collect::<Result<Vec<_>, _>>()?;

        let is_key = |i: usize| partition_key.contains(&i) || clustering_key.contains(&i);
        let counters: Vec<bool> = columns
            .iter()
            .enumerate()
            .filter(|(i, _)| !is_key(*i))
            .map(|(_, c)| c.data_type == CqlType::Counter)
            .collect();

        if partition_key
            .iter()
            .chain(&clustering_key)
            .any(|&i| columns[i].data_type == CqlType::Counter)
        {
            return Err(QueryError::InvalidQuery(
                "counter type is not supported for PRIMARY KEY part".to_string(),
            ));
        }

        let is_counter = counters.iter().any(|c| *c);
        if is_counter && counters.iter().any(|c| !c) {
            return Err(QueryError::InvalidQuery(
                "Cannot mix counter and non counter columns in the same table".to_string(),
            ));
        }

        Ok(TableSchema {
            keyspace: keyspace.to_string(),
            name: def.table.name.clone(),
            columns: Arc::from(columns),
            partition_key,
            clustering_key,
            indexes: HashMap::new(),
            is_counter,
        })
    }

    pub fn column_index(&self, name: &str) -> Result<usize, QueryError> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| QueryError::InvalidQuery(format!("Undefined column name {name}")))
    }

    pub fn is_primary_key(&self, index: usize) -> bool {
        self.partition_key.contains(&index) || self.clustering_key.contains(&index)
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.keyspace, self.name)
    }
}

#[derive(Debug)]
pub struct Table {
    pub schema: TableSchema,
    pub data: TableData,
}

#[derive(Debug)]
pub struct Keyspace {
    pub replication_factor: usize,
    pub tables: HashMap<String, Table>,
}

/// All keyspaces of the cluster, shared by every node.
#[derive(Debug, Default)]
pub struct Catalog {
    keyspaces: HashMap<String, Keyspace>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_keyspace(&self, name: &str) -> bool {
        self.keyspaces.contains_key(name)
    }

    pub fn keyspace(&self, name: &str) -> Result<&Keyspace, QueryError> {
        self.keyspaces
            .get(name)
            .ok_or_else(|| QueryError::InvalidQuery(format!("Keyspace {name} does not exist")))
    }

    pub fn create_keyspace(&mut self, name: &str, replication_factor: usize) -> bool {
        if self.keyspaces.contains_key(name) {
            return false;
        }
        self.keyspaces.insert(
            name.to_string(),
            Keyspace {
                replication_factor,
                tables: HashMap::new(),
            },
        );
        true
    }

    pub fn drop_keyspace(&mut self, name: &str) -> bool {
        self.keyspaces.remove(name).is_some()
    }

    pub fn table(&self, keyspace: &str, name: &str) -> Result<&Table, QueryError> {
        self.keyspace(keyspace)?
            .tables
            .get(name)
            .ok_or_else(|| unconfigured_table(keyspace, name))
    }

    pub fn table_mut(&mut self, keyspace: &str, name: &str) -> Result<&mut Table, QueryError> {
        self.keyspaces
            .get_mut(keyspace)
            .ok_or_else(|| QueryError::InvalidQuery(format!("Keyspace {keyspace} does not exist")))?
            .tables
            .get_mut(name)
            .ok_or_else(|| unconfigured_table(keyspace, name))
    }

    /// Adds the table; `false` when a table of that name already exists.
    pub fn create_table(&mut self, schema: TableSchema) -> Result<bool, QueryError> {
        let keyspace = self.keyspaces.get_mut(&schema.keyspace).ok_or_else(|| {
            QueryError::InvalidQuery(format!("Keyspace {} does not exist", schema.keyspace))
        })?;
        if keyspace.tables.contains_key(&schema.name) {
            return Ok(false);
        }
        keyspace.tables.insert(
            schema.name.clone(),
            Table {
                schema,
                data: TableData::default(),
            },
        );
        Ok(true)
    }

    pub fn drop_table(&mut self, keyspace: &str, name: &str) -> Result<bool, QueryError> {
        let keyspace = self
            .keyspaces
            .get_mut(keyspace)
            .ok_or_else(|| QueryError::InvalidQuery(format!("Keyspace {keyspace} does not exist")))?;
        Ok(keyspace.tables.remove(name).is_some())
    }

    pub fn index_exists(&self, keyspace: &str, index: &str) -> bool {
        self.keyspaces.get(keyspace).is_some_and(|ks| {
            ks.tables
                .values()
                .any(|t| t.schema.indexes.values().any(|name| name == index))
        })
    }
}

fn unconfigured_table(keyspace: &str, name: &str) -> QueryError {
    QueryError::InvalidQuery(format!("unconfigured table {name} in keyspace {keyspace}"))
}
