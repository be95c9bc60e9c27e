//! Dataframe bodies parsed into a displayable grid.
//!
//! The wire shape is a JSON *string* encoding `column -> (index -> value)`,
//! the column-oriented dump a dataframe library produces. Header cells come
//! from the column keys in arrival order; the row count is the index
//! cardinality of the first column; each cell is looked up by its row index
//! as a string key.

use serde_json::{Map, Value};

use crate::config::ThemeColor;
use crate::display::{DisplayNode, Grid};
use crate::error::MalformedBody;

use super::{body_str, value_text};

pub fn dataframe(body: &Value, _theme: &ThemeColor) -> Result<DisplayNode, MalformedBody> {
    let raw = body_str(body, "dataframe")?;
    let data: Map<String, Value> = serde_json::from_str(raw)
        .map_err(|e| MalformedBody::new("dataframe", format!("body is not a JSON object: {e}")))?;

    let columns: Vec<String> = data.keys().cloned().collect();
    let first = columns
        .first()
        .ok_or_else(|| MalformedBody::new("dataframe", "no columns"))?;

    let num_rows = column_cells(&data, first)?.len();
    let mut rows = Vec::with_capacity(num_rows);
    for i in 0..num_rows {
        let key = i.to_string();
        let mut row = Vec::with_capacity(columns.len());
        for column in &columns {
            let cell = column_cells(&data, column)?.get(&key).ok_or_else(|| {
                MalformedBody::new("dataframe", format!("column `{column}` has no row {key}"))
            })?;
            row.push(value_text(cell));
        }
        rows.push(row);
    }

    Ok(DisplayNode::Table(Grid { columns, rows }))
}

fn column_cells<'a>(
    data: &'a Map<String, Value>,
    column: &str,
) -> Result<&'a Map<String, Value>, MalformedBody> {
    data.get(column)
        .and_then(Value::as_object)
        .ok_or_else(|| MalformedBody::new("dataframe", format!("column `{column}` is not an object")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(raw: &str) -> Result<Grid, MalformedBody> {
        match dataframe(&Value::String(raw.into()), &ThemeColor::DEFAULT)? {
            DisplayNode::Table(grid) => Ok(grid),
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn two_columns_two_rows() {
        let grid = render(r#"{"a":{"0":"x","1":"y"},"b":{"0":"1","1":"2"}}"#).unwrap();
        assert_eq!(grid.columns, vec!["a", "b"]);
        assert_eq!(grid.rows.len(), 2);
        assert_eq!(grid.rows[0], vec!["x", "1"]);
        assert_eq!(grid.rows[1], vec!["y", "2"]);
    }

    #[test]
    fn numeric_cells_are_stringified() {
        let grid = render(r#"{"n":{"0":3.5,"1":7}}"#).unwrap();
        assert_eq!(grid.rows[0], vec!["3.5"]);
        assert_eq!(grid.rows[1], vec!["7"]);
    }

    #[test]
    fn row_count_comes_from_the_first_column() {
        let grid = render(r#"{"a":{"0":"x"},"b":{"0":"1","1":"stray"}}"#).unwrap();
        assert_eq!(grid.rows.len(), 1);
    }

    #[test]
    fn missing_cell_is_malformed() {
        let err = render(r#"{"a":{"0":"x","1":"y"},"b":{"0":"1"}}"#).unwrap_err();
        assert!(err.to_string().contains("no row 1"));
    }

    #[test]
    fn non_object_body_is_malformed() {
        assert!(render("[]").is_err());
        assert!(render("not json").is_err());
        assert!(render(r#"{"a":"flat"}"#).is_err());
        assert!(render("{}").is_err());
    }
}
