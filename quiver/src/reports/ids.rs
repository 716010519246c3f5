//! Ids command report data structures.

use super::output::{Output, Report};

/// Operation ids, in document order.
#[derive(Debug)]
pub struct IdsReport {
    pub rows: Vec<IdRow>,
}

#[derive(Debug)]
pub struct IdRow {
    pub name: String,
    pub operation_type: String,
    pub id: String,
}

impl Report for IdsReport {
    fn render(&self, out: &mut dyn Output) {
        let name_width = self.rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
        let type_width = self
            .rows
            .iter()
            .map(|r| r.operation_type.len())
            .max()
            .unwrap_or(0);

        for row in &self.rows {
            out.preformatted(&format!(
                "{:name_width$}  {:type_width$}  {}",
                row.name, row.operation_type, row.id
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::BufferOutput;

    #[test]
    fn test_columns_are_aligned() {
        let row = |name: &str, operation_type: &str, id: &str| IdRow {
            name: name.to_string(),
            operation_type: operation_type.to_string(),
            id: id.to_string(),
        };
        let report = IdsReport {
            rows: vec![
                row("Hero", "query", "aaa"),
                row("CreateReview", "mutation", "bbb"),
            ],
        };
        assert_eq!(
            BufferOutput::render(&report),
            "Hero          query     aaa\nCreateReview  mutation  bbb"
        );
    }
}
