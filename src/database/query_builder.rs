use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{self, postgres::PgArguments, FromRow, PgPool, Row};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{BootcampSummary, Course};
use crate::filter::types::SqlResult;
use crate::filter::{Filter, FilterData, Pagination, Schema};

/// Related records attached to each listed item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// Bootcamps get their `courses`
    Courses,
    /// Courses and reviews get `bootcamp: {id, name, description}`
    BootcampSummary,
}

impl Expansion {
    fn key(&self) -> &'static str {
        match self {
            Expansion::Courses => "courses",
            Expansion::BootcampSummary => "bootcamp",
        }
    }
}

/// One page of a list query
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub data: Vec<Value>,
    pub count: usize,
    pub total: i64,
    pub pagination: Pagination,
}

pub struct QueryBuilder<T> {
    schema: &'static Schema,
    expansion: Option<Expansion>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin + Serialize,
{
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            expansion: None,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn expand(mut self, expansion: Expansion) -> Self {
        self.expansion = Some(expansion);
        self
    }

    /// Filter, sort and paginate, then expand relations and apply field selection
    pub async fn page(&self, pool: &PgPool, data: &FilterData) -> Result<Page, DatabaseError> {
        let filter = Filter::new(self.schema, data);
        let select_sql = filter.to_sql().map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let count_sql = filter.to_count_sql().map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        tracing::debug!("List query on {}: {}", self.schema.table, select_sql.query);

        let rows = self.select_all(pool, &select_sql).await?;
        let total = count(pool, &count_sql).await?;

        let mut items = rows
            .iter()
            .map(|row| serde_json::to_value(row).map_err(|e| DatabaseError::QueryError(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        match self.expansion {
            Some(Expansion::Courses) => attach_courses(pool, &mut items).await?,
            Some(Expansion::BootcampSummary) => attach_bootcamp_summaries(pool, &mut items).await?,
            None => {}
        }

        if !data.select.is_empty() {
            let keep_extra = self.expansion.map(|e| e.key());
            for item in items.iter_mut() {
                project(item, &data.select, keep_extra);
            }
        }

        Ok(Page {
            count: items.len(),
            data: items,
            total,
            pagination: Pagination::compute(data.page, data.limit, total),
        })
    }

    async fn select_all(&self, pool: &PgPool, sql: &SqlResult) -> Result<Vec<T>, DatabaseError> {
        let mut q = sqlx::query_as::<_, T>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(pool).await?)
    }
}

async fn count(pool: &PgPool, sql: &SqlResult) -> Result<i64, DatabaseError> {
    let mut q = sqlx::query(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query(q, p);
    }
    let row = q.fetch_one(pool).await?;
    let count: i64 = row.try_get("count")?;
    Ok(count)
}

/// Keep only the selected top-level keys, plus `id` and the expansion key
fn project(item: &mut Value, select: &[String], keep_extra: Option<&str>) {
    if let Value::Object(map) = item {
        let kept: Map<String, Value> = std::mem::take(map)
            .into_iter()
            .filter(|(k, _)| k == "id" || select.iter().any(|s| s == k) || Some(k.as_str()) == keep_extra)
            .collect();
        *map = kept;
    }
}

fn id_at(item: &Value, key: &str) -> Option<Uuid> {
    item.get(key).and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok())
}

async fn attach_courses(pool: &PgPool, items: &mut [Value]) -> Result<(), DatabaseError> {
    let ids: Vec<Uuid> = items.iter().filter_map(|i| id_at(i, "id")).collect();
    if ids.is_empty() {
        return Ok(());
    }

    let courses = sqlx::query_as::<_, Course>(
        "SELECT * FROM courses WHERE bootcamp_id = ANY($1) ORDER BY created_at ASC, id ASC",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_bootcamp: HashMap<Uuid, Vec<Value>> = HashMap::new();
    for course in courses {
        let bootcamp_id = course.bootcamp_id;
        let value = serde_json::to_value(course).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        by_bootcamp.entry(bootcamp_id).or_default().push(value);
    }

    for item in items.iter_mut() {
        let courses = id_at(item, "id").and_then(|id| by_bootcamp.remove(&id)).unwrap_or_default();
        if let Value::Object(map) = item {
            map.insert("courses".to_string(), Value::Array(courses));
        }
    }
    Ok(())
}

async fn attach_bootcamp_summaries(pool: &PgPool, items: &mut [Value]) -> Result<(), DatabaseError> {
    let mut ids: Vec<Uuid> = items.iter().filter_map(|i| id_at(i, "bootcamp")).collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Ok(());
    }

    let summaries: HashMap<Uuid, BootcampSummary> =
        sqlx::query_as::<_, BootcampSummary>("SELECT id, name, description FROM bootcamps WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

    for item in items.iter_mut() {
        let Some(summary) = id_at(item, "bootcamp").and_then(|id| summaries.get(&id)) else {
            continue;
        };
        let value = serde_json::to_value(summary).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        if let Value::Object(map) = item {
            map.insert("bootcamp".to_string(), value);
        }
    }
    Ok(())
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => q.bind(None::<String>),
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // Lists are expanded to one placeholder per element before binding
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => q.bind(None::<String>),
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}
