// SPDX-License-Identifier: MPL-2.0

//! Minimal PostgREST query builder: equality filters, an any-of filter over
//! one column, and a single ordering column.

use std::fmt;

/// Tables of the hosted store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Companies,
    Alerts,
    OnCall,
    AdminSettings,
    Notifications,
    Banners,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Companies,
        Table::Alerts,
        Table::OnCall,
        Table::AdminSettings,
        Table::Notifications,
        Table::Banners,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Companies => "companies",
            Table::Alerts => "alerts",
            Table::OnCall => "on_call",
            Table::AdminSettings => "admin_settings",
            Table::Notifications => "notifications",
            Table::Banners => "banners",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: String },
    /// `column = v1 OR column = v2 ...`
    AnyOf { column: String, values: Vec<String> },
}

impl Filter {
    /// Whether a row (as JSON) passes this filter. Numbers and booleans are
    /// compared by their text form, the way PostgREST compares query params.
    pub fn matches(&self, row: &serde_json::Value) -> bool {
        let text = |column: &str| match row.get(column) {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        match self {
            Filter::Eq { column, value } => text(column).as_deref() == Some(value.as_str()),
            Filter::AnyOf { column, values } => {
                text(column).is_some_and(|v| values.iter().any(|candidate| *candidate == v))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters.push(Filter::Eq {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn any_of(mut self, column: &str, values: &[&str]) -> Self {
        self.filters.push(Filter::AnyOf {
            column: column.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    /// Query-string pairs understood by PostgREST
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];

        for filter in &self.filters {
            match filter {
                Filter::Eq { column, value } => {
                    params.push((column.clone(), format!("eq.{value}")));
                }
                Filter::AnyOf { column, values } => {
                    let alternatives: Vec<String> =
                        values.iter().map(|v| format!("{column}.eq.{v}")).collect();
                    params.push(("or".to_string(), format!("({})", alternatives.join(","))));
                }
            }
        }

        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }

        params
    }

    pub fn matches(&self, row: &serde_json::Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_for_city_scoped_ordered_select() {
        let query = Query::new().eq("city", "ipaussu").order("name", true);
        assert_eq!(
            query.to_params(),
            vec![
                ("select".to_string(), "*".to_string()),
                ("city".to_string(), "eq.ipaussu".to_string()),
                ("order".to_string(), "name.asc".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_for_any_of() {
        let query = Query::new()
            .any_of("city", &["ourinhos", "all"])
            .order("order_index", true);
        let params = query.to_params();
        assert!(params.contains(&(
            "or".to_string(),
            "(city.eq.ourinhos,city.eq.all)".to_string()
        )));
    }

    #[test]
    fn test_descending_order() {
        let query = Query::new().order("created_at", false);
        assert_eq!(
            query.to_params().last(),
            Some(&("order".to_string(), "created_at.desc".to_string()))
        );
    }

    #[test]
    fn test_matches_rows() {
        let query = Query::new().any_of("city", &["chavantes", "all"]);
        assert!(query.matches(&json!({"city": "all"})));
        assert!(query.matches(&json!({"city": "chavantes"})));
        assert!(!query.matches(&json!({"city": "ourinhos"})));
        assert!(!query.matches(&json!({"title": "no city"})));

        let by_id = Query::new().eq("id", "7");
        assert!(by_id.matches(&json!({"id": 7})));
    }
}
