use serde::{Deserialize, Serialize};

/// One externally sourced development project or tender, annotated with
/// AI-derived scores. Read-only once fetched — never mutated client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveOpportunityItem {
    pub project_name: String,
    pub country: String,
    pub sector: String,
    pub value: String,
    pub summary: String,
    pub source_url: String,
    /// 0–100.
    pub ai_feasibility_score: u8,
    pub ai_risk_assessment: String,
}

/// Wire shape of the live opportunities feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityFeed {
    pub items: Vec<LiveOpportunityItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_round_trip_keeps_snake_case_fields() {
        let feed = OpportunityFeed {
            items: vec![LiveOpportunityItem {
                project_name: "Mindanao Agri-Corridor".to_string(),
                country: "Philippines".to_string(),
                sector: "AgriTech".to_string(),
                value: "$120M".to_string(),
                summary: "Cold-chain and logistics upgrade tender".to_string(),
                source_url: "https://www.worldbank.org/example".to_string(),
                ai_feasibility_score: 78,
                ai_risk_assessment: "Moderate execution risk".to_string(),
            }],
        };
        let value = serde_json::to_value(&feed).unwrap();
        assert_eq!(value["items"][0]["project_name"], "Mindanao Agri-Corridor");
        assert_eq!(value["items"][0]["ai_feasibility_score"], 78);

        let recovered: OpportunityFeed = serde_json::from_value(value).unwrap();
        assert_eq!(recovered, feed);
    }

    #[test]
    fn test_feed_with_non_array_items_is_rejected() {
        let result: Result<OpportunityFeed, _> =
            serde_json::from_value(serde_json::json!({ "items": "not-a-list" }));
        assert!(result.is_err());
    }
}
