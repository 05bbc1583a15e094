use model::core::value::Value;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    hash::{DefaultHasher, Hash, Hasher},
    ops::Bound,
};

/// Position of a row in a table: partitions are ordered by the hash of their
/// key, rows within a partition by their clustering columns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey {
    pub token: u64,
    pub partition: Vec<u8>,
    pub clustering: Vec<Vec<u8>>,
}

impl RowKey {
    pub fn new(partition: &[Value], clustering: &[Value]) -> Self {
        let partition = partition.iter().fold(Vec::new(), |mut acc, value| {
            let encoded = encode_value(value);
            acc.extend_from_slice(&(encoded.len() as u32).to_be_bytes());
            acc.extend_from_slice(&encoded);
            acc
        });

        let mut hasher = DefaultHasher::new();
        partition.hash(&mut hasher);

        RowKey {
            token: hasher.finish(),
            partition,
            clustering: clustering.iter().map(encode_value).collect(),
        }
    }

    pub fn same_partition(&self, other: &RowKey) -> bool {
        self.token == other.token && self.partition == other.partition
    }
}

/// Byte encoding whose lexicographic order follows the value order for
/// numeric, textual and binary types. Decimal and varint keys sort by their
/// text form.
pub fn encode_value(value: &Value) -> Vec<u8> {
    match value {
        Value::Null => Vec::new(),
        Value::Boolean(v) => vec![*v as u8],
        Value::Tinyint(_)
        | Value::Smallint(_)
        | Value::Int(_)
        | Value::Bigint(_)
        | Value::Counter(_) => {
            let v = value.as_i64().unwrap_or_default();
            ((v as u64) ^ (1 << 63)).to_be_bytes().to_vec()
        }
        Value::Timestamp(v) => ((v.timestamp_millis() as u64) ^ (1 << 63))
            .to_be_bytes()
            .to_vec(),
        Value::Float(v) => ordered_float_bits(*v as f64).to_be_bytes().to_vec(),
        Value::Double(v) => ordered_float_bits(*v).to_be_bytes().to_vec(),
        Value::Decimal(v) => v.to_string().into_bytes(),
        Value::Varint(v) => v.to_string().into_bytes(),
        Value::Ascii(v) | Value::Text(v) => v.as_bytes().to_vec(),
        Value::Blob(v) => v.clone(),
        Value::Uuid(v) | Value::Timeuuid(v) => v.as_bytes().to_vec(),
    }
}

fn ordered_float_bits(v: f64) -> u64 {
    let bits = v.to_bits();
    if bits >> 63 == 1 { !bits } else { bits ^ (1 << 63) }
}

/// Rows of one table in key order.
#[derive(Debug, Default)]
pub struct TableData {
    rows: BTreeMap<RowKey, Vec<Value>>,
}

impl TableData {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &RowKey) -> Option<&Vec<Value>> {
        self.rows.get(key)
    }

    /// Writes the non-`None` cells of `cells` into the row at `key`,
    /// creating it with nulls first when missing.
    pub fn upsert(&mut self, key: RowKey, width: usize, cells: Vec<(usize, Value)>) {
        let row = self
            .rows
            .entry(key)
            .or_insert_with(|| vec![Value::Null; width]);
        for (index, value) in cells {
            row[index] = value;
        }
    }

    pub fn remove(&mut self, key: &RowKey) -> bool {
        self.rows.remove(key).is_some()
    }

    /// Removes every row of the partition `key` belongs to.
    pub fn remove_partition(&mut self, key: &RowKey) -> usize {
        let before = self.rows.len();
        self.rows.retain(|k, _| !k.same_partition(key));
        before - self.rows.len()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Rows strictly after `after`, or from the start when `None`.
    pub fn scan_after<'a>(
        &'a self,
        after: Option<&RowKey>,
    ) -> impl Iterator<Item = (&'a RowKey, &'a Vec<Value>)> + 'a {
        let lower = match after {
            Some(key) => Bound::Excluded(key.clone()),
            None => Bound::Unbounded,
        };
        self.rows.range((lower, Bound::Unbounded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(partition: i32, clustering: i32) -> RowKey {
        RowKey::new(&[Value::Int(partition)], &[Value::Int(clustering)])
    }

    #[test]
    fn test_integer_encoding_preserves_order() {
        let values = [i64::MIN, -5, -1, 0, 1, 42, i64::MAX];
        let encoded: Vec<Vec<u8>> = values
            .iter()
            .map(|v| encode_value(&Value::Bigint(*v)))
            .collect();
        assert!(encoded.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_float_encoding_preserves_order() {
        let values = [f64::NEG_INFINITY, -2.5, -0.0, 0.0, 1e-300, 3.0, f64::INFINITY];
        let encoded: Vec<Vec<u8>> = values
            .iter()
            .map(|v| encode_value(&Value::Double(*v)))
            .collect();
        assert!(encoded.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_rows_cluster_within_partition() {
        let mut data = TableData::default();
        for c in [3, 1, 2] {
            data.upsert(key(7, c), 2, vec![(0, Value::Int(7)), (1, Value::Int(c))]);
        }
        data.upsert(key(8, 1), 2, vec![(0, Value::Int(8))]);

        let partition: Vec<i32> = data
            .scan_after(None)
            .filter(|(k, _)| k.same_partition(&key(7, 0)))
            .map(|(_, row)| row[1].as_i64().unwrap() as i32)
            .collect();
        assert_eq!(partition, vec![1, 2, 3]);

        assert_eq!(data.remove_partition(&key(7, 0)), 3);
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_scan_after_excludes_key() {
        let mut data = TableData::default();
        for p in 0..10 {
            data.upsert(key(p, 0), 1, vec![(0, Value::Int(p))]);
        }
        let first: Vec<RowKey> = data.scan_after(None).take(4).map(|(k, _)| k.clone()).collect();
        let rest = data.scan_after(first.last()).count();
        assert_eq!(rest, 6);
    }

    #[test]
    fn test_upsert_merges_cells() {
        let mut data = TableData::default();
        data.upsert(key(1, 1), 3, vec![(2, Value::Text("a".into()))]);
        data.upsert(key(1, 1), 3, vec![(1, Value::Boolean(true))]);
        assert_eq!(
            data.get(&key(1, 1)).unwrap(),
            &vec![Value::Null, Value::Boolean(true), Value::Text("a".into())]
        );
    }
}
