//! Sparse UPDATE composition.
//!
//! Each mutable resource lists its columns as [`Patch`] fields; [`UpdateSet`]
//! turns the present ones into `"col" = $n` assignments, appends
//! `"updated_at" = NOW()` and binds the key last.

pub mod patch;
pub mod resources;

use serde_json::Value;

use crate::filter::SqlResult;
pub use patch::{Assignable, Flag, Float, Int, JsonField, Patch};
pub use resources::*;

pub struct UpdateSet {
    table: &'static str,
    assignments: Vec<String>,
    params: Vec<Value>,
    cleared_required: Vec<&'static str>,
}

impl UpdateSet {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: vec![],
            params: vec![],
            cleared_required: vec![],
        }
    }

    pub fn set<T: Assignable>(&mut self, column: &'static str, patch: &Patch<T>) -> &mut Self {
        match patch {
            Patch::Absent => {}
            Patch::Null => match T::null_value() {
                Some(value) => self.push(column, value, None),
                None => self.assignments.push(format!("\"{}\" = NULL", column)),
            },
            Patch::Value(v) => match v.to_param() {
                Some((value, cast)) => self.push(column, value, cast),
                None => {
                    tracing::warn!("Skipping {}.{}: value could not be parsed", self.table, column);
                }
            },
        }
        self
    }

    /// `set` for a NOT NULL column: an explicit null is not assigned but
    /// recorded, and the update is refused
    pub fn require<T: Assignable>(&mut self, column: &'static str, patch: &Patch<T>) -> &mut Self {
        if matches!(patch, Patch::Null) {
            self.cleared_required.push(column);
            return self;
        }
        self.set(column, patch)
    }

    /// NOT NULL columns the input tried to clear
    pub fn cleared_required(&self) -> &[&'static str] {
        &self.cleared_required
    }

    fn push(&mut self, column: &str, value: Value, cast: Option<&str>) {
        self.params.push(value);
        let placeholder = match cast {
            Some(cast) => format!("${}::{}", self.params.len(), cast),
            None => format!("${}", self.params.len()),
        };
        self.assignments.push(format!("\"{}\" = {}", column, placeholder));
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Column names assigned so far, in order
    pub fn columns(&self) -> Vec<&str> {
        self.assignments
            .iter()
            .filter_map(|a| a.split('"').nth(1))
            .collect()
    }

    /// `None` when nothing was assigned: the update is a no-op
    pub fn finish(mut self, key_column: &str, key: impl Into<Value>) -> Option<SqlResult> {
        if self.assignments.is_empty() {
            return None;
        }
        self.assignments.push("\"updated_at\" = NOW()".to_string());
        self.params.push(key.into());
        let query = format!(
            "UPDATE \"{}\" SET {} WHERE \"{}\" = ${}",
            self.table,
            self.assignments.join(", "),
            key_column,
            self.params.len()
        );
        Some(SqlResult::new(query, self.params))
    }
}

/// Column list for an INSERT. Absent values are left out so column
/// defaults apply.
pub struct InsertSet {
    table: &'static str,
    columns: Vec<&'static str>,
    placeholders: Vec<String>,
    params: Vec<Value>,
}

impl InsertSet {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            columns: vec![],
            placeholders: vec![],
            params: vec![],
        }
    }

    pub fn value<T: Assignable>(&mut self, column: &'static str, value: Option<&T>) -> &mut Self {
        if let Some((param, cast)) = value.and_then(|v| v.to_param()) {
            self.params.push(param);
            self.columns.push(column);
            self.placeholders.push(match cast {
                Some(cast) => format!("${}::{}", self.params.len(), cast),
                None => format!("${}", self.params.len()),
            });
        }
        self
    }

    /// `INSERT ... RETURNING id`
    pub fn finish(self) -> SqlResult {
        let query = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING id",
            self.table,
            self.columns
                .iter()
                .map(|c| format!("\"{}\"", c))
                .collect::<Vec<_>>()
                .join(", "),
            self.placeholders.join(", ")
        );
        SqlResult::new(query, self.params)
    }
}

/// A resource's mutable-field allow-list
pub trait PartialUpdate {
    const TABLE: &'static str;
    const KEY_COLUMN: &'static str = "id";

    fn assign(&self, set: &mut UpdateSet);

    fn compose(&self, key: i64) -> Option<SqlResult> {
        let mut set = UpdateSet::new(Self::TABLE);
        self.assign(&mut set);
        set.finish(Self::KEY_COLUMN, key)
    }

    /// First NOT NULL column sent as null, if any
    fn cleared_required(&self) -> Option<&'static str> {
        let mut set = UpdateSet::new(Self::TABLE);
        self.assign(&mut set);
        set.cleared_required().first().copied()
    }

    fn is_noop(&self) -> bool {
        let mut set = UpdateSet::new(Self::TABLE);
        self.assign(&mut set);
        set.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_set_is_noop() {
        let set = UpdateSet::new("videos");
        assert!(set.finish("id", 1).is_none());
    }

    #[test]
    fn assignments_then_timestamp_then_key() {
        let mut set = UpdateSet::new("videos");
        set.set("title", &Patch::Value("Sintel".to_string()))
            .set("description", &Patch::<String>::Null)
            .set("genre_id", &Patch::<Int>::Absent)
            .set("is_active", &Patch::Value(Flag(true)));
        let sql = set.finish("id", 9).unwrap();

        assert_eq!(
            sql.query,
            "UPDATE \"videos\" SET \"title\" = $1, \"description\" = NULL, \"is_active\" = $2, \
             \"updated_at\" = NOW() WHERE \"id\" = $3"
        );
        assert_eq!(sql.params, vec![json!("Sintel"), json!(1), json!(9)]);
    }

    #[test]
    fn null_flag_is_stored_as_zero() {
        let mut set = UpdateSet::new("series");
        set.set("is_featured", &Patch::<Flag>::Null);
        let sql = set.finish("id", 1).unwrap();
        assert!(sql.query.contains("\"is_featured\" = $1"));
        assert_eq!(sql.params[0], json!(0));
    }

    #[test]
    fn unparseable_json_field_is_skipped_not_fatal() {
        let mut set = UpdateSet::new("videos");
        set.set("cast", &Patch::Value(JsonField::Unparseable("{oops".to_string())))
            .set("title", &Patch::Value("Kept".to_string()));
        assert_eq!(set.columns(), vec!["title"]);
        let sql = set.finish("id", 2).unwrap();
        assert_eq!(sql.params, vec![json!("Kept"), json!(2)]);
    }

    #[test]
    fn only_unparseable_json_is_a_noop() {
        let mut set = UpdateSet::new("videos");
        set.set("tags", &Patch::Value(JsonField::Unparseable("nope".to_string())));
        assert!(set.finish("id", 2).is_none());
    }

    #[test]
    fn null_for_required_column_is_recorded_not_assigned() {
        let mut set = UpdateSet::new("videos");
        set.require("title", &Patch::<String>::Null)
            .require("video_url", &Patch::Value("https://cdn/v.mp4".to_string()))
            .set("description", &Patch::<String>::Null);
        assert_eq!(set.cleared_required(), &["title"]);
        assert_eq!(set.columns(), vec!["video_url", "description"]);

        let sql = set.finish("id", 4).unwrap();
        assert!(!sql.query.contains("\"title\""));
    }

    #[test]
    fn inserts_skip_absent_values() {
        let mut insert = InsertSet::new("videos");
        insert
            .value("title", Some(&"Sintel".to_string()))
            .value::<String>("description", None)
            .value("tags", Some(&JsonField::Parsed(json!(["fantasy"]))))
            .value("cast", Some(&JsonField::Unparseable("[".to_string())))
            .value("is_active", Some(&Flag(true)));
        let sql = insert.finish();
        assert_eq!(
            sql.query,
            "INSERT INTO \"videos\" (\"title\", \"tags\", \"is_active\") VALUES ($1, $2::jsonb, $3) RETURNING id"
        );
        assert_eq!(sql.params, vec![json!("Sintel"), json!("[\"fantasy\"]"), json!(1)]);
    }

    #[test]
    fn casts_are_appended_to_placeholders() {
        let mut set = UpdateSet::new("videos");
        set.set("tags", &Patch::Value(JsonField::Parsed(json!(["drama"]))));
        set.set(
            "release_date",
            &Patch::Value(chrono::NaiveDate::from_ymd_opt(2010, 9, 30).unwrap()),
        );
        let sql = set.finish("id", 5).unwrap();
        assert!(sql.query.contains("\"tags\" = $1::jsonb"));
        assert!(sql.query.contains("\"release_date\" = $2::date"));
        assert_eq!(sql.params[1], json!("2010-09-30"));
    }
}
