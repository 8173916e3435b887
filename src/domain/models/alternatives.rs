//! Products commonly bought instead of the one being analysed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::agent::SearchRecord;

/// Fewest alternatives an accepted submission may hold.
pub const MIN_ALTERNATIVES: usize = 3;

/// Most alternatives an accepted submission may hold.
pub const MAX_ALTERNATIVES: usize = 5;

/// One alternative product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    /// Product name and model number.
    pub name: String,
    /// Current retail price, e.g. `$199`.
    pub price: String,
    /// One sentence on why to consider it instead.
    pub note: String,
}

#[derive(Deserialize)]
struct Submission {
    alternatives: Vec<Alternative>,
}

impl Alternative {
    /// Validate a `submit_alternatives` input: 3-5 entries, every field non-empty.
    pub fn parse_submission(input: &Value) -> Result<Vec<Self>, String> {
        let submission: Submission = serde_json::from_value(input.clone())
            .map_err(|e| format!("submission does not match the schema: {e}"))?;
        let count = submission.alternatives.len();
        if !(MIN_ALTERNATIVES..=MAX_ALTERNATIVES).contains(&count) {
            return Err(format!(
                "expected {MIN_ALTERNATIVES}-{MAX_ALTERNATIVES} alternatives, got {count}"
            ));
        }
        submission
            .alternatives
            .into_iter()
            .enumerate()
            .map(|(index, alt)| alt.normalized(index))
            .collect()
    }

    fn normalized(self, index: usize) -> Result<Self, String> {
        let field = |name: &str, value: String| {
            let value = value.trim().to_string();
            if value.is_empty() {
                Err(format!("alternative {} has an empty `{name}`", index + 1))
            } else {
                Ok(value)
            }
        };
        Ok(Self {
            name: field("name", self.name)?,
            price: field("price", self.price)?,
            note: field("note", self.note)?,
        })
    }
}

/// Output of the alternatives agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativesResult {
    /// Empty when the agent finished without an accepted submission.
    pub alternatives: Vec<Alternative>,
    pub searches: Vec<SearchRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str) -> Value {
        json!({"name": name, "price": "$199", "note": "Folds flat."})
    }

    #[test]
    fn test_accepts_three_to_five() {
        for count in 3..=5 {
            let items: Vec<Value> = (0..count).map(|i| entry(&format!("Product {i}"))).collect();
            let parsed = Alternative::parse_submission(&json!({ "alternatives": items })).unwrap();
            assert_eq!(parsed.len(), count);
        }
    }

    #[test]
    fn test_rejects_wrong_counts() {
        let two = json!({"alternatives": [entry("a"), entry("b")]});
        assert!(Alternative::parse_submission(&two).unwrap_err().contains("got 2"));
        let six: Vec<Value> = (0..6).map(|i| entry(&i.to_string())).collect();
        assert!(Alternative::parse_submission(&json!({ "alternatives": six })).is_err());
    }

    #[test]
    fn test_rejects_missing_or_empty_fields() {
        let missing = json!({"alternatives": [entry("a"), entry("b"), {"name": "c", "price": "$1"}]});
        assert!(Alternative::parse_submission(&missing).is_err());

        let empty = json!({"alternatives": [entry("a"), entry("b"), entry("  ")]});
        let err = Alternative::parse_submission(&empty).unwrap_err();
        assert!(err.contains("alternative 3"));
    }

    #[test]
    fn test_trims_fields() {
        let items = json!({"alternatives": [entry(" Bose QC "), entry("b"), entry("c")]});
        let parsed = Alternative::parse_submission(&items).unwrap();
        assert_eq!(parsed[0].name, "Bose QC");
    }
}
