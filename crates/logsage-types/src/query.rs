//! Tabular query result types.
//!
//! A query result exists only for the duration of one turn: it is fetched,
//! serialized into a compact grounding form for the answer-synthesis prompt,
//! and discarded. Nothing here is persisted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single column of a query result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: String,
}

/// Tabular result of an analytic query: ordered columns, ordered rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryTable {
    #[serde(default)]
    pub name: String,
    pub columns: Vec<QueryColumn>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryTable {
    /// Serialize the table into the compact JSON used to ground the
    /// answer-synthesis prompt.
    ///
    /// Rows become objects keyed by column name; null and empty-string
    /// cells are omitted so the prompt carries only populated fields.
    /// An empty table serializes to an empty `rows` array, which the
    /// answer prompt interprets as "no matching records".
    pub fn to_grounding_json(&self) -> String {
        let rows: Vec<serde_json::Map<String, Value>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row.iter())
                    .filter(|(_, cell)| !cell.is_null() && cell.as_str() != Some(""))
                    .map(|(col, cell)| (col.name.clone(), cell.clone()))
                    .collect()
            })
            .collect();

        serde_json::json!({ "name": self.name, "rows": rows }).to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
