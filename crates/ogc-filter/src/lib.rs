//! CQL filter construction for WFS requests.
//!
//! Builds `CQL_FILTER` expressions from typed calls or from a declarative
//! [`FilterSpec`]. Values that parse as numbers render bare; everything
//! else is single-quoted with embedded quotes doubled.

use serde::Deserialize;
use serde_json::Value;

use ogc_common::{BoundingBox, OgcError, OgcResult};

/// Connective used when more than one clause is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    fn as_str(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

const COMPARISON_OPERATORS: [&str; 7] = ["=", "<>", "!=", "<", ">", "<=", ">="];

/// Chainable CQL filter builder.
#[derive(Debug, Clone, Default)]
pub struct CqlFilterBuilder {
    clauses: Vec<String>,
    logic: Logic,
}

impl CqlFilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connective for multi-clause filters.
    pub fn logic(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self
    }

    /// `attribute <op> value`.
    pub fn compare(mut self, attribute: &str, operator: &str, value: &str) -> Self {
        self.clauses
            .push(format!("{} {} {}", attribute, operator, format_value(value)));
        self
    }

    /// `attribute LIKE 'pattern'`. The pattern is always quoted.
    pub fn like(mut self, attribute: &str, pattern: &str) -> Self {
        self.clauses
            .push(format!("{} LIKE {}", attribute, quote(pattern)));
        self
    }

    /// `attribute BETWEEN low AND high`.
    pub fn between(mut self, attribute: &str, low: &str, high: &str) -> Self {
        self.clauses.push(format!(
            "{} BETWEEN {} AND {}",
            attribute,
            format_value(low),
            format_value(high)
        ));
        self
    }

    /// `BBOX(column, minx, miny, maxx, maxy[, 'crs'])`.
    pub fn bbox(mut self, geometry_column: &str, bbox: BoundingBox, crs: Option<&str>) -> Self {
        let mut clause = format!(
            "BBOX({}, {}, {}, {}, {}",
            geometry_column, bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y
        );
        if let Some(crs) = crs {
            clause.push_str(&format!(", {}", quote(crs)));
        }
        clause.push(')');
        self.clauses.push(clause);
        self
    }

    /// Render the filter; `None` when no clause was added.
    pub fn build(self) -> Option<String> {
        match self.clauses.len() {
            0 => None,
            1 => Some(self.clauses.into_iter().next().unwrap_or_default()),
            _ => {
                let joined = self
                    .clauses
                    .iter()
                    .map(|c| format!("({})", c))
                    .collect::<Vec<_>>()
                    .join(&format!(" {} ", self.logic.as_str()));
                Some(joined)
            }
        }
    }

    /// Build from a declarative spec, validating operators and arity.
    pub fn from_spec(spec: &FilterSpec) -> OgcResult<Self> {
        let logic = match spec.logic.as_deref() {
            None => Logic::And,
            Some(s) if s.eq_ignore_ascii_case("and") => Logic::And,
            Some(s) if s.eq_ignore_ascii_case("or") => Logic::Or,
            Some(other) => {
                return Err(OgcError::InvalidFilter(format!(
                    "unknown logic connective: {}",
                    other
                )))
            }
        };

        let mut builder = Self::new().logic(logic);
        for condition in &spec.conditions {
            builder = builder.apply_condition(condition)?;
        }
        Ok(builder)
    }

    fn apply_condition(self, condition: &ConditionSpec) -> OgcResult<Self> {
        let operator = condition.operator.trim().to_uppercase();

        if COMPARISON_OPERATORS.contains(&operator.as_str()) {
            let value = condition.single_value()?;
            return Ok(self.compare(&condition.attribute, &operator, &value));
        }

        match operator.as_str() {
            "LIKE" => {
                let value = condition.single_value()?;
                Ok(self.like(&condition.attribute, &value))
            }
            "BETWEEN" => {
                let values = condition.values.as_deref().unwrap_or_default();
                if values.len() != 2 {
                    return Err(OgcError::InvalidFilter(format!(
                        "BETWEEN on {} requires exactly two values, got {}",
                        condition.attribute,
                        values.len()
                    )));
                }
                Ok(self.between(
                    &condition.attribute,
                    &value_to_string(&values[0]),
                    &value_to_string(&values[1]),
                ))
            }
            "BBOX" => {
                let values = condition.values.as_deref().unwrap_or_default();
                let coords: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
                if coords.len() != 4 {
                    return Err(OgcError::InvalidFilter(format!(
                        "BBOX on {} requires four numeric values",
                        condition.attribute
                    )));
                }
                Ok(self.bbox(
                    &condition.attribute,
                    BoundingBox::new(coords[0], coords[1], coords[2], coords[3]),
                    condition.crs.as_deref(),
                ))
            }
            other => Err(OgcError::InvalidFilter(format!(
                "unknown operator: {}",
                other
            ))),
        }
    }
}

/// Declarative filter form accepted from configuration or request bodies.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterSpec {
    /// `and` (default) or `or`.
    pub logic: Option<String>,
    pub conditions: Vec<ConditionSpec>,
}

/// One condition within a [`FilterSpec`].
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionSpec {
    pub attribute: String,
    pub operator: String,
    /// Single operand for comparisons and LIKE.
    pub value: Option<Value>,
    /// Operand list for BETWEEN and BBOX.
    pub values: Option<Vec<Value>>,
    /// Optional CRS for BBOX.
    pub crs: Option<String>,
}

impl ConditionSpec {
    fn single_value(&self) -> OgcResult<String> {
        match &self.value {
            Some(v) => Ok(value_to_string(v)),
            None => Err(OgcError::InvalidFilter(format!(
                "{} {} requires a value",
                self.attribute, self.operator
            ))),
        }
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric-looking values render bare; everything else is quoted.
fn format_value(value: &str) -> String {
    if value.parse::<f64>().is_ok() {
        value.to_string()
    } else {
        quote(value)
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_comparison_unquoted() {
        let filter = CqlFilterBuilder::new()
            .compare("POP", ">", "1000")
            .build()
            .unwrap();
        assert_eq!(filter, "POP > 1000");
    }

    #[test]
    fn test_string_values_quoted_and_escaped() {
        let filter = CqlFilterBuilder::new()
            .compare("name", "=", "O'Brien")
            .build()
            .unwrap();
        assert_eq!(filter, "name = 'O''Brien'");
    }

    #[test]
    fn test_multi_clause_join() {
        let filter = CqlFilterBuilder::new()
            .logic(Logic::Or)
            .compare("state", "=", "CA")
            .compare("state", "=", "NV")
            .build()
            .unwrap();
        assert_eq!(filter, "(state = 'CA') OR (state = 'NV')");
    }

    #[test]
    fn test_between_and_like() {
        let filter = CqlFilterBuilder::new()
            .between("elevation", "100", "500")
            .like("name", "Mount%")
            .build()
            .unwrap();
        assert_eq!(
            filter,
            "(elevation BETWEEN 100 AND 500) AND (name LIKE 'Mount%')"
        );
    }

    #[test]
    fn test_bbox_clause() {
        let filter = CqlFilterBuilder::new()
            .bbox(
                "geom",
                BoundingBox::new(-10.0, -5.0, 10.0, 5.0),
                Some("EPSG:4326"),
            )
            .build()
            .unwrap();
        assert_eq!(filter, "BBOX(geom, -10, -5, 10, 5, 'EPSG:4326')");
    }

    #[test]
    fn test_empty_builder_yields_none() {
        assert!(CqlFilterBuilder::new().build().is_none());
    }

    #[test]
    fn test_from_spec() {
        let spec: FilterSpec = serde_json::from_value(json!({
            "logic": "and",
            "conditions": [
                {"attribute": "POP", "operator": ">", "value": 1000},
                {"attribute": "name", "operator": "LIKE", "value": "San%"}
            ]
        }))
        .unwrap();

        let filter = CqlFilterBuilder::from_spec(&spec).unwrap().build().unwrap();
        assert_eq!(filter, "(POP > 1000) AND (name LIKE 'San%')");
    }

    #[test]
    fn test_from_spec_unknown_operator() {
        let spec: FilterSpec = serde_json::from_value(json!({
            "conditions": [
                {"attribute": "POP", "operator": "~", "value": 1}
            ]
        }))
        .unwrap();
        let err = CqlFilterBuilder::from_spec(&spec).unwrap_err();
        assert!(matches!(err, OgcError::InvalidFilter(_)));
    }

    #[test]
    fn test_from_spec_between_arity() {
        let spec: FilterSpec = serde_json::from_value(json!({
            "conditions": [
                {"attribute": "elevation", "operator": "BETWEEN", "values": [100]}
            ]
        }))
        .unwrap();
        let err = CqlFilterBuilder::from_spec(&spec).unwrap_err();
        assert!(matches!(err, OgcError::InvalidFilter(_)));
    }
}
