//! 测试用的内存 `PriceStore`
//!
//! 在预置的行上执行 `RowQuery` 的过滤、排序和分页

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::RwLock;

use super::store::{Direction, Filter, FilterOp, PriceStore, Row, RowQuery};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: RwLock<Vec<Row>>,
    calls: AtomicUsize,
    fail_with: Option<String>,
}

impl InMemoryStore {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: RwLock::new(rows),
            ..Self::default()
        }
    }

    /// 每次查询都返回 Malformed 错误
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// 已执行的查询次数
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }
}

fn compare(value: &Value, target: &str) -> Option<Ordering> {
    match value {
        Value::String(s) => Some(s.as_str().cmp(target)),
        Value::Number(n) => n.as_f64()?.partial_cmp(&target.parse::<f64>().ok()?),
        _ => None,
    }
}

fn matches(row: &Row, filter: &Filter) -> bool {
    let Some(ordering) = row.get(filter.column).and_then(|v| compare(v, &filter.value)) else {
        return false;
    };
    match filter.op {
        FilterOp::Eq => ordering == Ordering::Equal,
        FilterOp::Gte => ordering != Ordering::Less,
        FilterOp::Lte => ordering != Ordering::Greater,
        FilterOp::Lt => ordering == Ordering::Less,
    }
}

fn sort_key(row: &Row, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl PriceStore for InMemoryStore {
    async fn select(&self, query: &RowQuery) -> Result<Vec<Row>, StoreError> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if let Some(message) = &self.fail_with {
            return Err(StoreError::Malformed(message.clone()));
        }

        let rows = self.rows.read().unwrap();
        let mut selected: Vec<Row> = rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            .cloned()
            .collect();

        if !query.order.is_empty() {
            selected.sort_by(|a, b| {
                query
                    .order
                    .iter()
                    .map(|order| {
                        let ordering = sort_key(a, order.column).cmp(&sort_key(b, order.column));
                        match order.direction {
                            Direction::Asc => ordering,
                            Direction::Desc => ordering.reverse(),
                        }
                    })
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let selected = selected
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|row| {
                if query.columns.is_empty() {
                    return row;
                }
                row.into_iter()
                    .filter(|(k, _)| query.columns.contains(&k.as_str()))
                    .collect()
            })
            .collect();

        Ok(selected)
    }
}
