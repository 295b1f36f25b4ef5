use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;
use sqlparser::ast::{BinaryOperator, Expr, UnaryOperator, Value as SqlValue};
use tracing::debug;

use crate::error::{InfoSchemaError, Result};

/// Lower-cased column name to text value, `None` for NULL cells. Every
/// column of the table is present.
pub type RowData = HashMap<String, Option<String>>;

/// Evaluates WHERE clauses against system table rows with SQL's
/// three-valued logic: `None` is UNKNOWN.
pub struct WhereEvaluator;

impl WhereEvaluator {
    /// Whether the row qualifies; UNKNOWN rejects it
    pub fn matches(expr: &Expr, row_data: &RowData) -> Result<bool> {
        Ok(Self::evaluate(expr, row_data)? == Some(true))
    }

    pub fn evaluate(expr: &Expr, row_data: &RowData) -> Result<Option<bool>> {
        match expr {
            Expr::Nested(inner) => Self::evaluate(inner, row_data),
            Expr::BinaryOp { left, op, right } => Self::evaluate_binary_op(left, op, right, row_data),
            Expr::UnaryOp { op, expr } => match op {
                UnaryOperator::Not => Ok(Self::evaluate(expr, row_data)?.map(|b| !b)),
                _ => Err(unsupported(expr)),
            },
            Expr::InList { expr, list, negated } => {
                let value = Self::get_expression_value(expr, row_data)?;
                let mut items = Vec::with_capacity(list.len());
                for item in list {
                    items.push(Self::get_expression_value(item, row_data)?);
                }
                let Some(value) = value else {
                    return Ok(None);
                };
                let found = items
                    .iter()
                    .flatten()
                    .any(|item| Self::compare_values(&value, item) == Ordering::Equal);
                if found {
                    Ok(Some(!*negated))
                } else if items.iter().any(Option::is_none) {
                    // x IN (.., NULL) is UNKNOWN when nothing matched
                    Ok(None)
                } else {
                    Ok(Some(*negated))
                }
            }
            Expr::Between { expr, negated, low, high } => {
                let (Some(value), Some(low), Some(high)) = (
                    Self::get_expression_value(expr, row_data)?,
                    Self::get_expression_value(low, row_data)?,
                    Self::get_expression_value(high, row_data)?,
                ) else {
                    return Ok(None);
                };
                let inside = Self::compare_values(&value, &low) != Ordering::Less
                    && Self::compare_values(&value, &high) != Ordering::Greater;
                Ok(Some(inside != *negated))
            }
            Expr::IsNull(expr) => Ok(Some(Self::get_expression_value(expr, row_data)?.is_none())),
            Expr::IsNotNull(expr) => Ok(Some(Self::get_expression_value(expr, row_data)?.is_some())),
            Expr::Like { expr, pattern, negated, .. } => {
                Ok(Self::evaluate_like(expr, pattern, false, row_data)?.map(|m| m != *negated))
            }
            Expr::ILike { expr, pattern, negated, .. } => {
                Ok(Self::evaluate_like(expr, pattern, true, row_data)?.map(|m| m != *negated))
            }
            Expr::Value(val) => match &val.value {
                SqlValue::Boolean(b) => Ok(Some(*b)),
                SqlValue::Null => Ok(None),
                _ => Err(unsupported(expr)),
            },
            Expr::Identifier(_) | Expr::CompoundIdentifier(_) => {
                Ok(Self::get_column_value(expr, row_data)?.map(|text| text == "t"))
            }
            _ => Err(unsupported(expr)),
        }
    }

    fn evaluate_binary_op(
        left: &Expr,
        op: &BinaryOperator,
        right: &Expr,
        row_data: &RowData,
    ) -> Result<Option<bool>> {
        match op {
            // Both sides are always evaluated so unknown columns surface
            BinaryOperator::And => {
                let (left, right) = (Self::evaluate(left, row_data)?, Self::evaluate(right, row_data)?);
                Ok(match (left, right) {
                    (Some(false), _) | (_, Some(false)) => Some(false),
                    (Some(true), Some(true)) => Some(true),
                    _ => None,
                })
            }
            BinaryOperator::Or => {
                let (left, right) = (Self::evaluate(left, row_data)?, Self::evaluate(right, row_data)?);
                Ok(match (left, right) {
                    (Some(true), _) | (_, Some(true)) => Some(true),
                    (Some(false), Some(false)) => Some(false),
                    _ => None,
                })
            }
            BinaryOperator::PGRegexMatch | BinaryOperator::PGRegexNotMatch => {
                let matched = Self::evaluate_regex_match(left, right, row_data)?;
                Ok(matched.map(|m| m == matches!(op, BinaryOperator::PGRegexMatch)))
            }
            BinaryOperator::Eq
            | BinaryOperator::NotEq
            | BinaryOperator::Lt
            | BinaryOperator::LtEq
            | BinaryOperator::Gt
            | BinaryOperator::GtEq => {
                if !is_operand(left) || !is_operand(right) {
                    return Err(unsupported(if is_operand(left) { right } else { left }));
                }
                let (Some(left_val), Some(right_val)) = (
                    Self::get_expression_value(left, row_data)?,
                    Self::get_expression_value(right, row_data)?,
                ) else {
                    return Ok(None);
                };
                let ordering = Self::compare_values(&left_val, &right_val);
                Ok(Some(match op {
                    BinaryOperator::Eq => ordering == Ordering::Equal,
                    BinaryOperator::NotEq => ordering != Ordering::Equal,
                    BinaryOperator::Lt => ordering == Ordering::Less,
                    BinaryOperator::LtEq => ordering != Ordering::Greater,
                    BinaryOperator::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }))
            }
            _ => {
                debug!("Unsupported binary operator: {:?}", op);
                Err(InfoSchemaError::NotSupported(format!("operator {op} in WHERE")))
            }
        }
    }

    fn evaluate_like(
        expr: &Expr,
        pattern: &Expr,
        case_insensitive: bool,
        row_data: &RowData,
    ) -> Result<Option<bool>> {
        let (Some(value), Some(pattern)) = (
            Self::get_expression_value(expr, row_data)?,
            Self::get_expression_value(pattern, row_data)?,
        ) else {
            return Ok(None);
        };
        let matches = if case_insensitive {
            like_match(&value.to_lowercase(), &pattern.to_lowercase())
        } else {
            like_match(&value, &pattern)
        };
        debug!("LIKE evaluation: '{}' LIKE '{}' = {}", value, pattern, matches);
        Ok(Some(matches))
    }

    fn evaluate_regex_match(expr: &Expr, pattern: &Expr, row_data: &RowData) -> Result<Option<bool>> {
        let (Some(value), Some(pattern)) = (
            Self::get_expression_value(expr, row_data)?,
            Self::get_expression_value(pattern, row_data)?,
        ) else {
            return Ok(None);
        };
        let regex = Regex::new(&pattern).map_err(|e| {
            InfoSchemaError::NotSupported(format!("invalid regular expression {pattern}: {e}"))
        })?;
        Ok(Some(regex.is_match(&value)))
    }

    fn get_column_value(expr: &Expr, row_data: &RowData) -> Result<Option<String>> {
        let name = match expr {
            Expr::Identifier(ident) => &ident.value,
            // t.column and information_schema.tables.column resolve by the last part
            Expr::CompoundIdentifier(parts) => match parts.last() {
                Some(last) => &last.value,
                None => return Err(unsupported(expr)),
            },
            _ => return Err(unsupported(expr)),
        };
        match row_data.get(&name.to_lowercase()) {
            Some(value) => Ok(value.clone()),
            None => Err(InfoSchemaError::Catalog(format!("column {name} does not exist"))),
        }
    }

    fn get_expression_value(expr: &Expr, row_data: &RowData) -> Result<Option<String>> {
        match expr {
            Expr::Value(val) => match &val.value {
                SqlValue::SingleQuotedString(s) => Ok(Some(s.clone())),
                SqlValue::Number(n, _) => Ok(Some(n.clone())),
                SqlValue::Boolean(b) => Ok(Some(if *b { "t".to_string() } else { "f".to_string() })),
                _ => Ok(None),
            },
            Expr::Nested(inner) => Self::get_expression_value(inner, row_data),
            Expr::Identifier(_) | Expr::CompoundIdentifier(_) => Self::get_column_value(expr, row_data),
            _ => Ok(None),
        }
    }

    /// Numeric comparison when both sides parse as numbers, text otherwise
    fn compare_values(left: &str, right: &str) -> Ordering {
        if let (Ok(l), Ok(r)) = (left.parse::<i64>(), right.parse::<i64>()) {
            l.cmp(&r)
        } else if let (Ok(l), Ok(r)) = (left.parse::<f64>(), right.parse::<f64>()) {
            l.partial_cmp(&r).unwrap_or(Ordering::Equal)
        } else {
            left.cmp(right)
        }
    }
}

/// Literals and column references, possibly parenthesized
fn is_operand(expr: &Expr) -> bool {
    match expr {
        Expr::Nested(inner) => is_operand(inner),
        Expr::Value(_) | Expr::Identifier(_) | Expr::CompoundIdentifier(_) => true,
        _ => false,
    }
}

fn unsupported(expr: &Expr) -> InfoSchemaError {
    debug!("Unsupported WHERE expression: {:?}", expr);
    InfoSchemaError::NotSupported(format!("WHERE expression {expr}"))
}

/// SQL LIKE: `%` matches any run of characters, `_` exactly one
pub(crate) fn like_match(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    like_match_from(&value, &pattern)
}

fn like_match_from(value: &[char], pattern: &[char]) -> bool {
    match pattern.split_first() {
        None => value.is_empty(),
        Some(('%', rest)) => (0..=value.len()).any(|skip| like_match_from(&value[skip..], rest)),
        Some(('_', rest)) => !value.is_empty() && like_match_from(&value[1..], rest),
        Some((c, rest)) => value.first() == Some(c) && like_match_from(&value[1..], rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::dialect::PostgreSqlDialect;
    use sqlparser::parser::Parser;

    fn where_clause(sql: &str) -> Expr {
        Parser::new(&PostgreSqlDialect {})
            .try_with_sql(sql)
            .unwrap()
            .parse_expr()
            .unwrap()
    }

    fn row() -> RowData {
        let mut row_data = HashMap::new();
        row_data.insert("table_schema".to_string(), Some("PUBLIC".to_string()));
        row_data.insert("table_name".to_string(), Some("ORDERS_2024".to_string()));
        row_data.insert("ordinal_position".to_string(), Some("12".to_string()));
        row_data.insert("read_only".to_string(), Some("f".to_string()));
        row_data.insert("remarks".to_string(), None);
        row_data
    }

    fn matches(sql: &str) -> bool {
        WhereEvaluator::matches(&where_clause(sql), &row()).unwrap()
    }

    #[test]
    fn test_simple_equality() {
        assert!(matches("table_schema = 'PUBLIC'"));
        assert!(!matches("table_schema <> 'PUBLIC'"));
    }

    #[test]
    fn test_numeric_comparison_is_not_lexical() {
        assert!(matches("ordinal_position > 9"));
        assert!(matches("ordinal_position BETWEEN 10 AND 12"));
    }

    #[test]
    fn test_null_never_compares_equal() {
        assert!(!matches("remarks = 'x' OR remarks <> 'x'"));
        assert!(matches("remarks IS NULL"));
    }

    #[test]
    fn test_negation_keeps_unknown() {
        let row = row();
        assert_eq!(WhereEvaluator::evaluate(&where_clause("NOT (remarks = 'x')"), &row).unwrap(), None);
        assert!(!matches("NOT (remarks = 'x')"));
        assert!(!matches("remarks <> 'x'"));
        assert!(!matches("remarks NOT IN ('x', 'y')"));
        assert!(!matches("table_name NOT IN ('x', NULL)"));
        assert!(!matches("NOT (remarks LIKE 'x%')"));
    }

    #[test]
    fn test_unknown_in_and_or() {
        assert!(matches("remarks = 'x' OR table_schema = 'PUBLIC'"));
        assert!(!matches("NOT (remarks = 'x' AND table_schema = 'PUBLIC')"));
        assert!(matches("NOT (remarks = 'x' AND table_schema = 'SYS')"));
    }

    #[test]
    fn test_in_list_and_boolean_logic() {
        assert!(matches("table_schema IN ('SYS', 'PUBLIC') AND NOT (read_only = TRUE)"));
        assert!(matches("table_schema NOT IN ('SYS', 'INFORMATION_SCHEMA')"));
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        for sql in ["no_such_column IS NULL", "table_schema = 'X' AND no_such_column = 1"] {
            assert!(matches!(
                WhereEvaluator::evaluate(&where_clause(sql), &row()),
                Err(InfoSchemaError::Catalog(_))
            ));
        }
    }

    #[test]
    fn test_like_patterns() {
        assert!(like_match("ORDERS_2024", "ORDERS%"));
        assert!(like_match("test", "t_st"));
        assert!(!like_match("test", "t_s"));
        assert!(like_match("", "%"));
        assert!(matches("table_name ILIKE 'orders%'"));
        assert!(!matches("table_name NOT LIKE 'ORD%'"));
    }

    #[test]
    fn test_regex_match() {
        assert!(matches("table_name ~ '^ORDERS_[0-9]+$'"));
        assert!(matches("table_name !~ '^X'"));
    }

    #[test]
    fn test_unsupported_expression_is_an_error() {
        let expr = where_clause("upper(table_name) = 'X'");
        assert!(matches!(
            WhereEvaluator::evaluate(&expr, &row()),
            Err(InfoSchemaError::NotSupported(_))
        ));
    }
}
