use super::error::FilterError;
use super::schema::Schema;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `sort=name,-createdAt` into column orderings. A leading `-` means descending.
    pub fn parse(schema: &Schema, raw: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in raw.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            let (name, sort) = match trimmed.strip_prefix('-') {
                Some(rest) => (rest, SortDirection::Desc),
                None => (trimmed.strip_prefix('+').unwrap_or(trimmed), SortDirection::Asc),
            };
            let field = schema.field(name)?;
            out.push(FilterOrderInfo { column: field.column.to_string(), sort });
        }
        Ok(out)
    }

    /// Newest first
    pub fn default_order() -> Vec<FilterOrderInfo> {
        vec![FilterOrderInfo { column: "created_at".to_string(), sort: SortDirection::Desc }]
    }

    /// Always ends with an `id` tie-breaker so identical queries return identical order
    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        let mut parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        if !infos.iter().any(|i| i.column == "id") {
            parts.push("\"id\" ASC".to_string());
        }
        format!("ORDER BY {}", parts.join(", "))
    }
}
