//! Filter predicates and sort orders over mapped entity fields.
//!
//! Predicates name struct fields, never columns; the schema mapping table
//! translates them when SQL is built. All values are bound, never inlined.

use crate::repo::entity_store::{StoreError, StoreResult};
use crate::repo::schema::{EntitySchema, ID_COLUMN};
use rusqlite::types::Value;

/// Row filter for [`crate::repo::entity_store::EntityStore::get_all_objects`].
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-sensitive substring match. NULL columns never match.
    Contains { field: &'static str, needle: String },
    Equals { field: &'static str, value: Value },
    /// Half-open interval `[start, end)`.
    Range {
        field: &'static str,
        start: Value,
        end: Value,
    },
    /// Field equals any of `values`. Empty means "match nothing".
    In {
        field: &'static str,
        values: Vec<Value>,
    },
    /// All inner predicates must hold. Empty means "match everything".
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn contains(field: &'static str, needle: impl Into<String>) -> Self {
        Self::Contains {
            field,
            needle: needle.into(),
        }
    }

    pub fn equals(field: &'static str, value: impl Into<Value>) -> Self {
        Self::Equals {
            field,
            value: value.into(),
        }
    }

    pub fn any_of<V: Into<Value>>(field: &'static str, values: impl IntoIterator<Item = V>) -> Self {
        Self::In {
            field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(field: &'static str, start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self::Range {
            field,
            start: start.into(),
            end: end.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: &'static str,
    pub ascending: bool,
}

impl SortOrder {
    pub fn ascending(field: &'static str) -> Self {
        Self {
            field,
            ascending: true,
        }
    }

    pub fn descending(field: &'static str) -> Self {
        Self {
            field,
            ascending: false,
        }
    }
}

/// Builds `SELECT ... FROM table [WHERE ...] [ORDER BY ...]` and its bind values.
pub(crate) fn build_select(
    schema: &EntitySchema,
    predicate: Option<&Predicate>,
    sort: Option<&SortOrder>,
) -> StoreResult<(String, Vec<Value>)> {
    let mut sql = format!("SELECT {} FROM {}", schema.select_list(), schema.table);
    let mut binds = Vec::new();

    if let Some(predicate) = predicate {
        let clause = build_clause(schema, predicate, &mut binds)?;
        sql.push_str(" WHERE ");
        sql.push_str(&clause);
    }

    if let Some(sort) = sort {
        let column = resolve(schema, sort.field)?;
        let direction = if sort.ascending { "ASC" } else { "DESC" };
        sql.push_str(&format!(" ORDER BY {column} {direction}, {ID_COLUMN} ASC"));
    }

    Ok((sql, binds))
}

fn build_clause(
    schema: &EntitySchema,
    predicate: &Predicate,
    binds: &mut Vec<Value>,
) -> StoreResult<String> {
    match predicate {
        Predicate::Contains { field, needle } => {
            let column = resolve(schema, field)?;
            binds.push(Value::Text(needle.clone()));
            Ok(format!("instr({column}, ?) > 0"))
        }
        Predicate::Equals { field, value } => {
            let column = resolve(schema, field)?;
            binds.push(value.clone());
            Ok(format!("{column} = ?"))
        }
        Predicate::Range { field, start, end } => {
            let column = resolve(schema, field)?;
            binds.push(start.clone());
            binds.push(end.clone());
            Ok(format!("({column} >= ? AND {column} < ?)"))
        }
        Predicate::In { field, values } => {
            let column = resolve(schema, field)?;
            if values.is_empty() {
                return Ok("0 = 1".to_string());
            }
            binds.extend(values.iter().cloned());
            let placeholders = vec!["?"; values.len()].join(", ");
            Ok(format!("{column} IN ({placeholders})"))
        }
        Predicate::And(inner) => {
            if inner.is_empty() {
                return Ok("1 = 1".to_string());
            }
            let clauses = inner
                .iter()
                .map(|predicate| build_clause(schema, predicate, binds))
                .collect::<StoreResult<Vec<_>>>()?;
            Ok(format!("({})", clauses.join(" AND ")))
        }
    }
}

fn resolve(schema: &EntitySchema, field_name: &str) -> StoreResult<&'static str> {
    schema
        .column(field_name)
        .ok_or_else(|| StoreError::UnknownField {
            entity: schema.entity_name,
            field: field_name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::{build_select, Predicate, SortOrder};
    use crate::repo::entity_store::StoreError;
    use crate::repo::schema::{field, EntityKind};
    use rusqlite::types::Value;

    #[test]
    fn builds_and_of_contains_and_range() {
        let predicate = Predicate::And(vec![
            Predicate::contains(field::NAME, "run"),
            Predicate::range(field::TIME, 10_i64, 20_i64),
        ]);
        let (sql, binds) = build_select(
            EntityKind::LogEntry.schema(),
            Some(&predicate),
            Some(&SortOrder::descending(field::TIME)),
        )
        .unwrap();

        assert_eq!(
            sql,
            "SELECT id, name, time_ms, timezone, productivity, notes FROM log_entries \
             WHERE (instr(name, ?) > 0 AND (time_ms >= ? AND time_ms < ?)) \
             ORDER BY time_ms DESC, id ASC"
        );
        assert_eq!(
            binds,
            vec![
                Value::Text("run".to_string()),
                Value::Integer(10),
                Value::Integer(20)
            ]
        );
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let (sql, binds) = build_select(
            EntityKind::LogEntryPreset.schema(),
            Some(&Predicate::any_of::<String>(field::ID, Vec::new())),
            None,
        )
        .unwrap();
        assert!(sql.ends_with("WHERE 0 = 1"));
        assert!(binds.is_empty());
    }

    #[test]
    fn unknown_field_is_a_query_fault() {
        let err = build_select(
            EntityKind::LogEntryPreset.schema(),
            Some(&Predicate::contains(field::NOTES, "x")),
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnknownField { entity: "LogEntryPreset", ref field } if field == "notes"
        ));
    }
}
