use std::cmp::Ordering;
use std::collections::HashSet;

use sqlparser::ast::{
    Distinct, Expr, GroupByExpr, LimitClause, ObjectName, OrderByKind, Query, Select, SelectItem,
    SetExpr, Statement, TableFactor, Value as SqlValue,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use super::QueryResult;
use super::where_evaluator::{RowData, WhereEvaluator};
use crate::error::{InfoSchemaError, Result};
use crate::session::Session;
use crate::system::{InformationSchema, Row, SystemTableDescriptor};
use crate::types::Value;

/// Answers single-table `SELECT`s over the system tables
pub struct SystemTableInterceptor;

impl SystemTableInterceptor {
    /// Handles `sql` when it selects from one system table. Statements
    /// over anything else are left to the caller as `None`.
    pub fn intercept_query(
        engine: &InformationSchema,
        session: &mut Session,
        sql: &str,
    ) -> Result<Option<QueryResult>> {
        let dialect = PostgreSqlDialect {};
        let mut statements = Parser::parse_sql(&dialect, sql)?;
        if statements.len() != 1 {
            return Ok(None);
        }
        let Statement::Query(query) = statements.remove(0) else {
            return Ok(None);
        };
        let SetExpr::Select(select) = query.body.as_ref() else {
            return Ok(None);
        };
        let Some(name) = Self::single_table(select) else {
            return Ok(None);
        };
        let Some(id) = engine.registry().id_of(&name) else {
            return Ok(None);
        };

        debug!("Intercepting system table query on {}: {}", id, sql);
        let Some(instance) = engine.fetch_id(session, id)? else {
            // Declared but without content: an empty, columnless result
            return Ok(Some(QueryResult::default()));
        };
        let descriptor = instance.descriptor();
        Self::reject_aggregation(select)?;

        let projection = Self::get_projected_columns(select, descriptor)?;
        let mut rows: Vec<&Row> = Vec::new();
        match &select.selection {
            Some(selection) => {
                // Resolves every WHERE column even when the table is empty
                WhereEvaluator::evaluate(selection, &Self::null_row(descriptor))?;
                for row in instance.rows() {
                    if WhereEvaluator::matches(selection, &Self::row_data(descriptor, row))? {
                        rows.push(row);
                    }
                }
            }
            None => rows.extend(instance.rows()),
        }

        Self::apply_order_by(&query, descriptor, &mut rows)?;
        let (offset, limit) = Self::limit_and_offset(&query)?;
        let max_rows = session.info().max_rows;
        let limit = match (limit, max_rows) {
            (Some(limit), 0) => Some(limit),
            (Some(limit), max) => Some(limit.min(max as usize)),
            (None, 0) => None,
            (None, max) => Some(max as usize),
        };

        let mut projected: Vec<Vec<Value>> = rows
            .into_iter()
            .map(|row| projection.iter().map(|(_, i)| row[*i].clone()).collect())
            .collect();
        if select.distinct.is_some() {
            let mut seen = HashSet::new();
            projected.retain(|row| seen.insert(row.clone()));
        }
        let rows = projected
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect();

        Ok(Some(QueryResult {
            columns: projection.into_iter().map(|(name, _)| name).collect(),
            rows,
        }))
    }

    /// GROUP BY, HAVING and DISTINCT ON are not evaluated
    fn reject_aggregation(select: &Select) -> Result<()> {
        if let Some(Distinct::On(_)) = &select.distinct {
            return Err(InfoSchemaError::NotSupported("DISTINCT ON".into()));
        }
        let grouped = match &select.group_by {
            GroupByExpr::All(_) => true,
            GroupByExpr::Expressions(exprs, modifiers) => !exprs.is_empty() || !modifiers.is_empty(),
        };
        if grouped {
            return Err(InfoSchemaError::NotSupported("GROUP BY".into()));
        }
        if select.having.is_some() {
            return Err(InfoSchemaError::NotSupported("HAVING".into()));
        }
        Ok(())
    }

    /// Name of the only table in the FROM clause; joins are not handled
    fn single_table(select: &Select) -> Option<String> {
        let [table_ref] = select.from.as_slice() else {
            return None;
        };
        if !table_ref.joins.is_empty() {
            return None;
        }
        match &table_ref.relation {
            TableFactor::Table { name, .. } => Some(Self::object_name(name)),
            _ => None,
        }
    }

    fn object_name(name: &ObjectName) -> String {
        name.0
            .iter()
            .map(|part| part.to_string().trim_matches('"').to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Output column names with the descriptor index each reads
    fn get_projected_columns(
        select: &Select,
        descriptor: &SystemTableDescriptor,
    ) -> Result<Vec<(String, usize)>> {
        let mut columns = Vec::new();
        for item in &select.projection {
            match item {
                SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => {
                    columns.extend(
                        descriptor
                            .columns
                            .iter()
                            .enumerate()
                            .map(|(i, c)| (c.name.to_string(), i)),
                    );
                }
                SelectItem::UnnamedExpr(expr) => {
                    let index = Self::column_index(expr, descriptor)?;
                    columns.push((descriptor.columns[index].name.to_string(), index));
                }
                SelectItem::ExprWithAlias { expr, alias } => {
                    let index = Self::column_index(expr, descriptor)?;
                    columns.push((alias.value.clone(), index));
                }
            }
        }
        Ok(columns)
    }

    fn column_index(expr: &Expr, descriptor: &SystemTableDescriptor) -> Result<usize> {
        let name = match expr {
            Expr::Identifier(ident) => &ident.value,
            Expr::CompoundIdentifier(parts) => match parts.last() {
                Some(last) => &last.value,
                None => return Err(InfoSchemaError::NotSupported(format!("select item {expr}"))),
            },
            _ => return Err(InfoSchemaError::NotSupported(format!("select item {expr}"))),
        };
        descriptor.column_index(name).ok_or_else(|| {
            InfoSchemaError::Catalog(format!("column {} does not exist in {}", name, descriptor.name))
        })
    }

    fn row_data(descriptor: &SystemTableDescriptor, row: &Row) -> RowData {
        descriptor
            .columns
            .iter()
            .zip(row.values())
            .map(|(column, value)| (column.name.to_lowercase(), value.to_text()))
            .collect()
    }

    fn null_row(descriptor: &SystemTableDescriptor) -> RowData {
        descriptor
            .columns
            .iter()
            .map(|column| (column.name.to_lowercase(), None))
            .collect()
    }

    fn apply_order_by(query: &Query, descriptor: &SystemTableDescriptor, rows: &mut [&Row]) -> Result<()> {
        let Some(order_by) = &query.order_by else {
            return Ok(());
        };
        let OrderByKind::Expressions(exprs) = &order_by.kind else {
            return Err(InfoSchemaError::NotSupported("ORDER BY ALL".into()));
        };
        let mut keys = Vec::with_capacity(exprs.len());
        for order_expr in exprs {
            let index = Self::column_index(&order_expr.expr, descriptor)?;
            keys.push((index, order_expr.options.asc.unwrap_or(true)));
        }
        rows.sort_by(|a, b| {
            keys.iter()
                .map(|&(index, asc)| {
                    let ordering = a[index].cmp(&b[index]);
                    if asc { ordering } else { ordering.reverse() }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        Ok(())
    }

    fn limit_and_offset(query: &Query) -> Result<(usize, Option<usize>)> {
        match &query.limit_clause {
            None => Ok((0, None)),
            Some(LimitClause::LimitOffset { limit, offset, .. }) => {
                let limit = limit.as_ref().map(Self::count).transpose()?;
                let offset = offset.as_ref().map(|o| Self::count(&o.value)).transpose()?;
                Ok((offset.unwrap_or(0), limit))
            }
            Some(LimitClause::OffsetCommaLimit { offset, limit }) => {
                Ok((Self::count(offset)?, Some(Self::count(limit)?)))
            }
        }
    }

    fn count(expr: &Expr) -> Result<usize> {
        match expr {
            Expr::Value(val) => match &val.value {
                SqlValue::Number(n, _) => n
                    .parse()
                    .map_err(|_| InfoSchemaError::NotSupported(format!("row count {n}"))),
                _ => Err(InfoSchemaError::NotSupported(format!("row count {expr}"))),
            },
            _ => Err(InfoSchemaError::NotSupported(format!("row count {expr}"))),
        }
    }
}
