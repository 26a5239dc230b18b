//! Column set recorded by `fit`

use serde::{Deserialize, Serialize};

/// Columns surviving fit, plus the numeric columns eligible for imputation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainedSchema {
    columns: Vec<String>,
    numeric_columns: Vec<String>,
    pruned_columns: Vec<String>,
}

impl TrainedSchema {
    pub fn new(
        columns: Vec<String>,
        numeric_columns: Vec<String>,
        pruned_columns: Vec<String>,
    ) -> Self {
        Self {
            columns,
            numeric_columns,
            pruned_columns,
        }
    }

    /// Column names after pruning and binning failures, in training order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Numeric columns seen at fit, before pruning
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    /// Constant columns removed at fit
    pub fn pruned_columns(&self) -> &[String] {
        &self.pruned_columns
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let schema = TrainedSchema::new(
            vec!["price".into(), "brand".into()],
            vec!["price".into(), "stock".into()],
            vec!["stock".into()],
        );
        assert!(schema.contains("brand"));
        assert!(!schema.contains("stock"));
        assert!(schema.is_numeric("stock"));
        assert_eq!(schema.len(), 2);
    }
}
