//! Heuristic column-role classification.
//!
//! Column roles are inferred from column names and a bounded sample of cell
//! values. The heuristic is intentionally fuzzy (substring matching on names,
//! "at least one parseable number" for numeric columns); it sits behind the
//! [`FieldClassifier`] trait so a stricter schema-driven classifier can be
//! substituted without touching clustering or naming.

use serde::Serialize;

use crate::dataset::Dataset;

/// Rows sampled per column when probing for numeric content.
const CLASSIFY_SAMPLE_ROWS: usize = 100;

/// Name fragments marking a column as monetary.
const MONETARY_HINTS: [&str; 4] = ["amount", "revenue", "value", "total"];

/// Name fragments marking a column as temporal.
const TEMPORAL_HINTS: [&str; 3] = ["date", "time", "created"];

/// Role tags for the columns of one dataset.
///
/// Recomputed per dataset, never persisted. Roles may overlap: a
/// `total_amount` column is typically both monetary and numeric.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnRoles {
    /// Record-identity column: first name containing "email", else the first
    /// column in header order.
    pub identifier: String,
    /// Columns whose name suggests money, in header order.
    pub monetary: Vec<String>,
    /// Columns whose name suggests a date or timestamp, in header order.
    pub temporal: Vec<String>,
    /// Columns with at least one parseable finite number in the sample.
    pub numeric: Vec<String>,
}

impl ColumnRoles {
    /// The primary monetary field driving segment naming and revenue metrics.
    pub fn primary_monetary(&self) -> Option<&str> {
        self.monetary.first().map(String::as_str)
    }

    /// The primary temporal field driving monthly-trend bucketing.
    pub fn primary_temporal(&self) -> Option<&str> {
        self.temporal.first().map(String::as_str)
    }
}

/// Seam for column-role inference.
pub trait FieldClassifier {
    /// Classify the columns of a non-empty dataset.
    ///
    /// Behavior is undefined for empty datasets; the analysis pipeline
    /// rejects those before classification runs.
    fn classify(&self, dataset: &Dataset) -> ColumnRoles;
}

/// Default name/content classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl FieldClassifier for HeuristicClassifier {
    fn classify(&self, dataset: &Dataset) -> ColumnRoles {
        let columns = dataset.columns();

        let identifier = columns
            .iter()
            .find(|c| c.to_lowercase().contains("email"))
            .or_else(|| columns.first())
            .cloned()
            .unwrap_or_default();

        let monetary = columns_matching(columns, &MONETARY_HINTS);
        let temporal = columns_matching(columns, &TEMPORAL_HINTS);

        let sample_rows = dataset.len().min(CLASSIFY_SAMPLE_ROWS);
        let numeric = columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| {
                (0..sample_rows).any(|row| dataset.value_at(row, *idx).as_number().is_some())
            })
            .map(|(_, name)| name.clone())
            .collect();

        let roles = ColumnRoles {
            identifier,
            monetary,
            temporal,
            numeric,
        };
        log::debug!(
            "classified columns: identifier={}, monetary={:?}, temporal={:?}, numeric={:?}",
            roles.identifier,
            roles.monetary,
            roles.temporal,
            roles.numeric
        );
        roles
    }
}

fn columns_matching(columns: &[String], hints: &[&str]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| {
            let lowered = c.to_lowercase();
            hints.iter().any(|h| lowered.contains(h))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;

    fn dataset_from_csv(csv: &str) -> Dataset {
        Dataset::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_identifier_prefers_email_column() {
        let dataset = dataset_from_csv("id,Contact_Email,total\n1,a@x.com,10\n");
        let roles = HeuristicClassifier.classify(&dataset);
        assert_eq!(roles.identifier, "Contact_Email");
    }

    #[test]
    fn test_identifier_falls_back_to_first_column() {
        let dataset = dataset_from_csv("customer_id,name\nc1,Ann\n");
        let roles = HeuristicClassifier.classify(&dataset);
        assert_eq!(roles.identifier, "customer_id");
    }

    #[test]
    fn test_monetary_and_temporal_hints() {
        let dataset = dataset_from_csv(
            "name,Total_Amount,revenue_q1,signup_date,last_login_time\nAnn,10,5,2024-01-01,2024-01-02\n",
        );
        let roles = HeuristicClassifier.classify(&dataset);
        assert_eq!(roles.monetary, vec!["Total_Amount", "revenue_q1"]);
        assert_eq!(roles.primary_monetary(), Some("Total_Amount"));
        assert_eq!(roles.temporal, vec!["signup_date", "last_login_time"]);
        assert_eq!(roles.primary_temporal(), Some("signup_date"));
    }

    #[test]
    fn test_numeric_requires_one_parseable_value() {
        let mut dataset = Dataset::new(vec![
            "name".to_string(),
            "age".to_string(),
            "notes".to_string(),
        ]);
        dataset.push_row(vec![
            Value::Text("Ann".to_string()),
            Value::Missing,
            Value::Text("vip".to_string()),
        ]);
        dataset.push_row(vec![
            Value::Text("Bob".to_string()),
            Value::Number(41.0),
            Value::Text("new".to_string()),
        ]);
        let roles = HeuristicClassifier.classify(&dataset);
        assert_eq!(roles.numeric, vec!["age"]);
    }

    #[test]
    fn test_numeric_sampling_is_bounded() {
        let mut dataset = Dataset::new(vec!["score".to_string()]);
        // Numeric content only past the sample window must not qualify.
        for _ in 0..CLASSIFY_SAMPLE_ROWS {
            dataset.push_row(vec![Value::Text("pending".to_string())]);
        }
        dataset.push_row(vec![Value::Number(1.0)]);
        let roles = HeuristicClassifier.classify(&dataset);
        assert!(roles.numeric.is_empty());
    }
}
