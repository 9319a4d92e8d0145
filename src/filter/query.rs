use crate::config::FilterConfig;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::schema::Schema;
use super::types::{FilterClause, FilterData, FilterOp};

/// Parameter names that control the query itself and are never filters
pub const RESERVED_PARAMS: &[&str] = &["select", "sort", "page", "limit"];

/// Turn a flat query string (`careers=Business&averageCost[lte]=10000&sort=-name&page=2`)
/// into validated `FilterData` for `schema`.
pub fn parse_query(
    schema: &Schema,
    params: &[(String, String)],
    limits: &FilterConfig,
) -> Result<FilterData, FilterError> {
    let mut data = FilterData {
        page: 1,
        limit: limits.default_limit,
        order: FilterOrder::default_order(),
        ..Default::default()
    };

    for (key, raw) in params {
        match key.as_str() {
            "select" => {
                for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    let output_key = schema.output_key(name)?;
                    if !data.select.iter().any(|s| s == output_key) {
                        data.select.push(output_key.to_string());
                    }
                }
            }
            "sort" => {
                let order = FilterOrder::parse(schema, raw)?;
                if !order.is_empty() {
                    data.order = order;
                }
            }
            "page" => data.page = positive_or(raw, 1),
            "limit" => data.limit = positive_or(raw, limits.default_limit).min(limits.max_limit),
            _ => {
                let (name, op) = split_operator(key)?;
                let field = schema.field(name)?;
                let value = schema.coerce(field, op, raw)?;
                data.clauses.push(FilterClause::new(field.name, op, value));
            }
        }
    }

    Ok(data)
}

/// `field` → (field, Eq); `field[gte]` → (field, Gte). The bracket must hold a whole operator token.
fn split_operator(key: &str) -> Result<(&str, FilterOp), FilterError> {
    let Some(open) = key.find('[') else {
        return Ok((key, FilterOp::Eq));
    };
    let token = key[open + 1..]
        .strip_suffix(']')
        .ok_or_else(|| FilterError::MalformedParameter(key.to_string()))?;
    let op = FilterOp::from_token(token).ok_or_else(|| FilterError::UnsupportedOperator(token.to_string()))?;
    Ok((&key[..open], op))
}

fn positive_or(raw: &str, fallback: i64) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => n,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::schema::{FieldDef, FieldKind};
    use crate::filter::types::SortDirection;
    use serde_json::json;

    const FIELDS: &[FieldDef] = &[
        FieldDef::new("id", "id", FieldKind::Uuid),
        FieldDef::new("name", "name", FieldKind::Text),
        FieldDef::new("description", "description", FieldKind::Text),
        FieldDef::new("careers", "careers", FieldKind::TextArray),
        FieldDef::new("averageCost", "average_cost", FieldKind::Number),
        FieldDef::new("location.city", "city", FieldKind::Text),
        FieldDef::new("createdAt", "created_at", FieldKind::Timestamp),
    ];
    const SCHEMA: Schema = Schema { table: "bootcamps", fields: FIELDS };

    fn limits() -> FilterConfig {
        FilterConfig { default_limit: 25, max_limit: 100 }
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn list_example_parses() {
        let data = parse_query(
            &SCHEMA,
            &params(&[
                ("careers[in]", "Business"),
                ("select", "name,description"),
                ("sort", "-name"),
                ("page", "2"),
                ("limit", "2"),
            ]),
            &limits(),
        )
        .unwrap();

        assert_eq!(data.clauses, vec![FilterClause::new("careers", FilterOp::In, json!(["Business"]))]);
        assert_eq!(data.select, vec!["name", "description"]);
        assert_eq!(data.order[0].column, "name");
        assert_eq!(data.order[0].sort, SortDirection::Desc);
        assert_eq!((data.page, data.limit, data.offset()), (2, 2, 2));
    }

    #[test]
    fn values_containing_operator_words_are_untouched() {
        let data = parse_query(&SCHEMA, &params(&[("name", "gt-ingest")]), &limits()).unwrap();
        assert_eq!(data.clauses, vec![FilterClause::eq("name", "gt-ingest")]);
    }

    #[test]
    fn partial_operator_tokens_are_rejected() {
        let err = parse_query(&SCHEMA, &params(&[("averageCost[gtx]", "1")]), &limits()).unwrap_err();
        assert_eq!(err, FilterError::UnsupportedOperator("gtx".into()));

        let err = parse_query(&SCHEMA, &params(&[("averageCost[lte", "1")]), &limits()).unwrap_err();
        assert!(matches!(err, FilterError::MalformedParameter(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse_query(&SCHEMA, &params(&[("password", "x")]), &limits()).unwrap_err();
        assert_eq!(err, FilterError::UnknownField("password".into()));
    }

    #[test]
    fn bad_pagination_falls_back_to_defaults() {
        let data = parse_query(&SCHEMA, &params(&[("page", "zero"), ("limit", "-4")]), &limits()).unwrap();
        assert_eq!((data.page, data.limit), (1, 25));
    }

    #[test]
    fn limit_is_capped() {
        let data = parse_query(&SCHEMA, &params(&[("limit", "5000")]), &limits()).unwrap();
        assert_eq!(data.limit, 100);
    }

    #[test]
    fn default_sort_is_newest_first() {
        let data = parse_query(&SCHEMA, &[], &limits()).unwrap();
        assert_eq!(data.order, FilterOrder::default_order());
        assert!(data.clauses.is_empty());
    }

    #[test]
    fn nested_select_keeps_parent() {
        let data = parse_query(&SCHEMA, &params(&[("select", "location.city,name,location")]), &limits()).unwrap();
        assert_eq!(data.select, vec!["location", "name"]);
    }
}
