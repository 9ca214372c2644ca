//! 数据源抽象
//!
//! 业务逻辑只构造 `RowQuery`，交给应用启动时注入的 `PriceStore` 执行

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// 数据源返回的原始行，以列名为键
pub type Row = Map<String, Value>;

pub const COL_SYMBOL: &str = "Symbol";
pub const COL_DATE: &str = "Date";
pub const COL_OPEN: &str = "Open";
pub const COL_HIGH: &str = "High";
pub const COL_LOW: &str = "Low";
pub const COL_CLOSE: &str = "Close";
pub const COL_VOLUME: &str = "Volume";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    Lt,
}

impl FilterOp {
    /// PostgREST 操作符
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gte => "gte",
            FilterOp::Lte => "lte",
            FilterOp::Lt => "lt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub op: FilterOp,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub direction: Direction,
}

/// 行情表查询
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowQuery {
    pub columns: Vec<&'static str>,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl RowQuery {
    pub fn select(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
            ..Self::default()
        }
    }

    fn filter(mut self, column: &'static str, op: FilterOp, value: impl Into<String>) -> Self {
        self.filters.push(Filter {
            column,
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: &'static str, value: impl Into<String>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn gte(self, column: &'static str, value: impl Into<String>) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    pub fn lte(self, column: &'static str, value: impl Into<String>) -> Self {
        self.filter(column, FilterOp::Lte, value)
    }

    pub fn lt(self, column: &'static str, value: impl Into<String>) -> Self {
        self.filter(column, FilterOp::Lt, value)
    }

    /// 追加排序键，先添加的优先
    pub fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
        self.order.push(Order { column, direction });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// 日线行情表的只读访问
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// 执行查询；未设置 `limit` 时必须返回全部匹配行
    async fn select(&self, query: &RowQuery) -> Result<Vec<Row>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_filters_in_order() {
        let query = RowQuery::select(&[COL_DATE, COL_CLOSE])
            .eq(COL_SYMBOL, "AAPL")
            .lt(COL_DATE, "2024-01-03")
            .order_by(COL_DATE, Direction::Desc)
            .limit(1);

        assert_eq!(query.columns, vec!["Date", "Close"]);
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[0].op, FilterOp::Eq);
        assert_eq!(query.filters[1].column, "Date");
        assert_eq!(query.filters[1].op.as_str(), "lt");
        assert_eq!(
            query.order,
            vec![Order {
                column: "Date",
                direction: Direction::Desc
            }]
        );
        assert_eq!(query.limit, Some(1));
        assert_eq!(query.offset, None);
    }
}
