//! URL and query-string encoding for the hosted REST layer.
//!
//! Filters become `column=op.value` pairs (`eq`, `gt`, `gte`, `lt`, `lte`,
//! `in`, and `is` for nulls), ordering becomes `order=column.asc|desc`.
//! The pairs are left unescaped; the HTTP client percent-encodes them.

use serde_json::Value;
use store::{Filter, Query};

pub fn table_url(base_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{table}", base_url.trim_end_matches('/'))
}

pub fn object_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/{bucket}/{path}",
        base_url.trim_end_matches('/')
    )
}

pub fn public_object_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{bucket}/{path}",
        base_url.trim_end_matches('/')
    )
}

pub fn auth_url(base_url: &str, endpoint: &str) -> String {
    format!("{}/auth/v1/{endpoint}", base_url.trim_end_matches('/'))
}

/// Query pairs for a select.
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(filter_params(&query.filters));
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".into(), format!("{}.{direction}", order.column)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".into(), limit.to_string()));
    }
    params
}

pub fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| (f.column().to_string(), filter_value(f)))
        .collect()
}

fn filter_value(filter: &Filter) -> String {
    match filter {
        Filter::Eq(_, Value::Null) => "is.null".into(),
        Filter::Eq(_, v) => format!("eq.{}", scalar(v)),
        Filter::Gt(_, v) => format!("gt.{}", scalar(v)),
        Filter::Gte(_, v) => format!("gte.{}", scalar(v)),
        Filter::Lt(_, v) => format!("lt.{}", scalar(v)),
        Filter::Lte(_, v) => format!("lte.{}", scalar(v)),
        Filter::In(_, values) => {
            let items: Vec<String> = values.iter().map(list_item).collect();
            format!("in.({})", items.join(","))
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".into(),
        other => other.to_string(),
    }
}

/// Items of an `in.(...)` list are quoted when they contain reserved characters.
fn list_item(value: &Value) -> String {
    let raw = scalar(value);
    if raw.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw
    }
}

/// Human-readable message from an error body. PostgREST uses `message`,
/// the auth service `error_description` or `msg`.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error_description", "msg", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn select_params_in_order() {
        let query = Query::table("events")
            .filter(Filter::gte("start_date", "2025-05-10T18:30:00+00:00"))
            .eq("event_type", "webinar")
            .filter(Filter::eq("max_attendees", 50))
            .order_by("start_date", true)
            .limit(10);
        assert_eq!(
            pairs(&query_params(&query)),
            vec![
                ("select", "*"),
                ("start_date", "gte.2025-05-10T18:30:00+00:00"),
                ("event_type", "eq.webinar"),
                ("max_attendees", "eq.50"),
                ("order", "start_date.asc"),
                ("limit", "10"),
            ]
        );
    }

    #[test]
    fn in_lists_and_nulls() {
        let filters = vec![
            Filter::any_of("id", ["a1", "b 2", "c,3"]),
            Filter::Eq("deleted_at".into(), Value::Null),
            Filter::eq("is_virtual", json!(true)),
        ];
        assert_eq!(
            pairs(&filter_params(&filters)),
            vec![
                ("id", "in.(a1,\"b 2\",\"c,3\")"),
                ("deleted_at", "is.null"),
                ("is_virtual", "eq.true"),
            ]
        );
    }

    #[test]
    fn urls_tolerate_trailing_slash() {
        assert_eq!(
            table_url("https://x.example.co/", "events"),
            "https://x.example.co/rest/v1/events"
        );
        assert_eq!(
            public_object_url("https://x.example.co", "resumes", "u1/1-a.pdf"),
            "https://x.example.co/storage/v1/object/public/resumes/u1/1-a.pdf"
        );
        assert_eq!(
            auth_url("https://x.example.co", "token?grant_type=password"),
            "https://x.example.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn error_messages_from_bodies() {
        assert_eq!(
            error_message(r#"{"code":"42501","message":"permission denied"}"#),
            "permission denied"
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }
}
