// SPDX-License-Identifier: MPL-2.0

//! In-memory `DirectoryStore` used by tests.

use crate::supabase::{ClientError, DirectoryStore, Query, Table};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Select(Table),
    Insert(Table),
    Update(Table, String),
    Delete(Table, String),
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    failing: Mutex<HashSet<Table>>,
    ops: Mutex<Vec<Op>>,
    next_id: Mutex<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, table: Table, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(table)
            .or_default()
            .push(row);
    }

    /// Make every operation on `table` fail like a dropped connection
    pub fn fail(&self, table: Table) {
        self.failing.lock().unwrap().insert(table);
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    fn check(&self, table: Table, op: Op) -> Result<(), ClientError> {
        self.ops.lock().unwrap().push(op);
        if self.failing.lock().unwrap().contains(&table) {
            return Err(ClientError::Network(format!("{table} unreachable")));
        }
        Ok(())
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

impl DirectoryStore for MemoryStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>, ClientError> {
        self.check(table, Op::Select(table))?;
        let mut rows: Vec<Value> = self
            .rows(table)
            .into_iter()
            .filter(|row| query.matches(row))
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(&order.column), b.get(&order.column));
                if order.ascending { ord } else { ord.reverse() }
            });
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: &Value) -> Result<(), ClientError> {
        self.check(table, Op::Insert(table))?;
        let mut row = row.clone();
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("gen-{}", *next)
        };
        if let Value::Object(map) = &mut row {
            map.entry("id").or_insert(Value::String(id));
            map.entry("created_at")
                .or_insert(Value::String("2024-06-01T00:00:00+00:00".to_string()));
        }
        self.seed(table, row);
        Ok(())
    }

    async fn update(&self, table: Table, id: &str, row: &Value) -> Result<(), ClientError> {
        self.check(table, Op::Update(table, id.to_string()))?;
        let mut tables = self.tables.lock().unwrap();
        let by_id = Query::new().eq("id", id);
        for existing in tables.entry(table).or_default().iter_mut() {
            if by_id.matches(existing)
                && let (Value::Object(target), Value::Object(patch)) = (existing, row)
            {
                for (k, v) in patch {
                    target.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), ClientError> {
        self.check(table, Op::Delete(table, id.to_string()))?;
        let by_id = Query::new().eq("id", id);
        self.tables
            .lock()
            .unwrap()
            .entry(table)
            .or_default()
            .retain(|row| !by_id.matches(row));
        Ok(())
    }
}
