use serde_json::Value;

use super::error::FilterError;
use super::types::SqlResult;

/// AND-combined predicate builder with Postgres `$n` placeholders.
///
/// Placeholders are numbered from `starting_param_index + 1` so the fragment
/// can sit behind parameters the surrounding statement already uses.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<String>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    /// Static predicate with no parameters
    pub fn raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.conditions.push(sql.into());
        self
    }

    pub fn eq(&mut self, column: &str, value: impl Into<Value>) -> Result<&mut Self, FilterError> {
        Self::validate_column(column)?;
        let value = value.into();
        if value.is_null() {
            // Nulls never travel as parameters
            self.conditions.push(format!("{} IS NULL", column));
        } else {
            let placeholder = self.param(value);
            self.conditions.push(format!("{} = {}", column, placeholder));
        }
        Ok(self)
    }

    /// `eq` when the value is present, nothing otherwise
    pub fn eq_opt<T: Into<Value>>(&mut self, column: &str, value: Option<T>) -> Result<&mut Self, FilterError> {
        match value {
            Some(v) => self.eq(column, v),
            None => Ok(self),
        }
    }

    /// Flags are stored as 1/0
    pub fn flag_opt(&mut self, column: &str, value: Option<bool>) -> Result<&mut Self, FilterError> {
        self.eq_opt(column, value.map(|b| if b { 1 } else { 0 }))
    }

    pub fn is_null(&mut self, column: &str) -> Result<&mut Self, FilterError> {
        Self::validate_column(column)?;
        self.conditions.push(format!("{} IS NULL", column));
        Ok(self)
    }

    /// Case-insensitive substring match of `term` against any of `columns`.
    /// One parameter per column, sub-terms OR'd inside a single group.
    pub fn ilike_any(&mut self, columns: &[&str], term: &str) -> Result<&mut Self, FilterError> {
        if columns.is_empty() {
            return Err(FilterError::InvalidOperatorData("search requires at least one column".to_string()));
        }
        let pattern = format!("%{}%", escape_like(term));
        let mut parts = Vec::with_capacity(columns.len());
        for column in columns {
            Self::validate_column(column)?;
            let placeholder = self.param(Value::String(pattern.clone()));
            parts.push(format!("{} ILIKE {}", column, placeholder));
        }
        self.conditions.push(format!("({})", parts.join(" OR ")));
        Ok(self)
    }

    /// `a OR b` group where `b` compares against a parameter
    pub fn either_or_eq(&mut self, predicate: &str, column: &str, value: impl Into<Value>) -> Result<&mut Self, FilterError> {
        Self::validate_column(column)?;
        let placeholder = self.param(value.into());
        self.conditions.push(format!("({} OR {} = {})", predicate, column, placeholder));
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Index of the last placeholder handed out
    pub fn param_index(&self) -> usize {
        self.param_index
    }

    pub fn build(self) -> SqlResult {
        let where_clause = if self.conditions.is_empty() {
            "1=1".to_string()
        } else {
            self.conditions.join(" AND ")
        };
        SqlResult::new(where_clause, self.param_values)
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    /// Accepts `column` or `alias.column`
    fn validate_column(column: &str) -> Result<(), FilterError> {
        let valid = !column.is_empty()
            && column.split('.').count() <= 2
            && column.split('.').all(|part| {
                !part.is_empty()
                    && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                    && !part.starts_with(|c: char| c.is_ascii_digit())
            });
        if valid {
            Ok(())
        } else {
            Err(FilterError::InvalidColumn(column.to_string()))
        }
    }
}

/// Escape LIKE metacharacters so user text matches literally
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_builder_yields_tautology() {
        let sql = FilterWhere::new(0).build();
        assert_eq!(sql.query, "1=1");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn placeholders_continue_from_starting_index() {
        let mut w = FilterWhere::new(2);
        w.raw("v.is_active = 1");
        w.eq("v.category_id", 4).unwrap();
        w.eq_opt::<i64>("v.genre_id", None).unwrap();
        w.flag_opt("v.is_featured", Some(true)).unwrap();
        let sql = w.build();

        assert_eq!(sql.query, "v.is_active = 1 AND v.category_id = $3 AND v.is_featured = $4");
        assert_eq!(sql.params, vec![json!(4), json!(1)]);
    }

    #[test]
    fn search_terms_are_or_grouped_and_escaped() {
        let mut w = FilterWhere::new(0);
        w.ilike_any(&["v.title", "v.description"], "50%_off").unwrap();
        let sql = w.build();

        assert_eq!(sql.query, "(v.title ILIKE $1 OR v.description ILIKE $2)");
        assert_eq!(sql.params, vec![json!("%50\\%\\_off%"), json!("%50\\%\\_off%")]);
    }

    #[test]
    fn null_equality_is_inlined() {
        let mut w = FilterWhere::new(0);
        w.eq("v.series_id", Value::Null).unwrap();
        let sql = w.build();
        assert_eq!(sql.query, "v.series_id IS NULL");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn rejects_injected_column_names() {
        let mut w = FilterWhere::new(0);
        assert!(w.eq("title; DROP TABLE videos", 1).is_err());
        assert!(w.eq("a.b.c", 1).is_err());
        assert!(w.eq("1abc", 1).is_err());
    }
}
