//! Supabase (PostgREST) 数据源实现
//!
//! 请求 `{url}/rest/v1/{table}`，服务密钥同时放在 `apikey` 头和 Bearer Token 中

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use url::Url;

use super::store::{Direction, PriceStore, Row, RowQuery};
use crate::config::StoreConfig;
use crate::error::StoreError;

pub struct SupabaseStore {
    client: Client,
    endpoint: Url,
    key: String,
    page_size: usize,
}

impl SupabaseStore {
    pub fn new(config: &StoreConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: table_endpoint(&config.url, &config.table)?,
            key: config.key.clone(),
            page_size: config.page_size.max(1),
        })
    }

    async fn fetch(&self, query: &RowQuery) -> Result<Vec<Row>, StoreError> {
        let params = query_params(query);
        log::debug!("GET {} {:?}", self.endpoint, params);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&params)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        rows_from_body(body)
    }
}

#[async_trait]
impl PriceStore for SupabaseStore {
    async fn select(&self, query: &RowQuery) -> Result<Vec<Row>, StoreError> {
        if query.limit.is_some() {
            return self.fetch(query).await;
        }
        collect_pages(query, self.page_size, |page| async move { self.fetch(&page).await }).await
    }
}

/// 分页拉取不带 limit 的查询，直到返回空页
///
/// 服务端 max-rows 可能小于 `page_size`，所以短页不代表结束。
/// 没有排序的查询按所选列升序排序，保证 offset 分页稳定。
async fn collect_pages<F, Fut>(
    query: &RowQuery,
    page_size: usize,
    mut fetch_page: F,
) -> Result<Vec<Row>, StoreError>
where
    F: FnMut(RowQuery) -> Fut,
    Fut: Future<Output = Result<Vec<Row>, StoreError>>,
{
    let mut base = query.clone();
    if base.order.is_empty() {
        for &column in &query.columns {
            base = base.order_by(column, Direction::Asc);
        }
    }

    let mut rows = Vec::new();
    let mut offset = query.offset.unwrap_or(0);
    loop {
        let mut page = base.clone();
        page.limit = Some(page_size);
        page.offset = Some(offset);

        let fetched = fetch_page(page).await?;
        if fetched.is_empty() {
            break;
        }
        offset += fetched.len();
        rows.extend(fetched);
    }
    Ok(rows)
}

/// 拼接 `{base}/rest/v1/{table}`
fn table_endpoint(base: &str, table: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("rest/v1/")?.join(table)
}

/// 将 `RowQuery` 转换为 PostgREST 查询参数
fn query_params(query: &RowQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if !query.columns.is_empty() {
        params.push(("select".to_string(), query.columns.join(",")));
    }
    for filter in &query.filters {
        params.push((
            filter.column.to_string(),
            format!("{}.{}", filter.op.as_str(), filter.value),
        ));
    }
    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|o| {
                let direction = match o.direction {
                    Direction::Asc => "asc",
                    Direction::Desc => "desc",
                };
                format!("{}.{}", o.column, direction)
            })
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(offset) = query.offset {
        params.push(("offset".to_string(), offset.to_string()));
    }

    params
}

fn rows_from_body(body: Value) -> Result<Vec<Row>, StoreError> {
    let Value::Array(items) = body else {
        return Err(StoreError::Malformed("expected a JSON array".to_string()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(row) => Ok(row),
            other => Err(StoreError::Malformed(format!(
                "row {} is not an object: {}",
                i, other
            ))),
        })
        .collect()
}
