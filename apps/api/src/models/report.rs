use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Depth levels for a market analysis report.
/// Wire labels are the customer-facing tier names — do not change between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketAnalysisTier {
    #[serde(rename = "Tier A: Economic Snapshot")]
    EconomicSnapshot,
    #[serde(rename = "Tier B: Competitive Landscape")]
    CompetitiveLandscape,
    #[serde(rename = "Tier C: Investment Deep-Dive")]
    InvestmentDeepDive,
}

impl MarketAnalysisTier {
    pub const ALL: [MarketAnalysisTier; 3] = [
        MarketAnalysisTier::EconomicSnapshot,
        MarketAnalysisTier::CompetitiveLandscape,
        MarketAnalysisTier::InvestmentDeepDive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MarketAnalysisTier::EconomicSnapshot => "Tier A: Economic Snapshot",
            MarketAnalysisTier::CompetitiveLandscape => "Tier B: Competitive Landscape",
            MarketAnalysisTier::InvestmentDeepDive => "Tier C: Investment Deep-Dive",
        }
    }
}

impl fmt::Display for MarketAnalysisTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Depth levels for a partner finding report.
/// Tier 3 was retired before launch; the gap in numbering is intentional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartnerFindingTier {
    #[serde(rename = "Tier 1: Partnership Blueprint")]
    PartnershipBlueprint,
    #[serde(rename = "Tier 2: Transformation Simulator")]
    TransformationSimulator,
    #[serde(rename = "Tier 4: Valuation & Risk Assessment")]
    ValuationRisk,
}

impl PartnerFindingTier {
    pub const ALL: [PartnerFindingTier; 3] = [
        PartnerFindingTier::PartnershipBlueprint,
        PartnerFindingTier::TransformationSimulator,
        PartnerFindingTier::ValuationRisk,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PartnerFindingTier::PartnershipBlueprint => "Tier 1: Partnership Blueprint",
            PartnerFindingTier::TransformationSimulator => "Tier 2: Transformation Simulator",
            PartnerFindingTier::ValuationRisk => "Tier 4: Valuation & Risk Assessment",
        }
    }
}

impl fmt::Display for PartnerFindingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A tier from either family, as held by the wizard before submission.
/// `ReportParameters` itself never carries this type — the tagged union below
/// keeps cross-family assignments unrepresentable on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTier {
    Market(MarketAnalysisTier),
    Partner(PartnerFindingTier),
}

impl ReportTier {
    pub fn label(&self) -> &'static str {
        match self {
            ReportTier::Market(t) => t.label(),
            ReportTier::Partner(t) => t.label(),
        }
    }
}

/// The two report goals a requester can pursue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisMode {
    #[serde(rename = "analysis")]
    Analysis,
    #[serde(rename = "matchmaking")]
    Matchmaking,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Analysis => f.write_str("analysis"),
            AnalysisMode::Matchmaking => f.write_str("matchmaking"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    #[serde(rename = "government")]
    Government,
    #[serde(rename = "non-government")]
    NonGovernment,
}

/// Fields common to both report variants. `user_department` holds either a
/// government department or an organization label depending on `user_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBasics {
    pub user_name: String,
    pub user_type: UserType,
    pub user_department: String,
    pub user_country: String,
    pub custom_objective: String,
    pub industry: String,
    /// "City, Country" — assembled by the wizard at submission.
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysisParameters {
    #[serde(flatten)]
    pub basics: ReportBasics,
    pub tier: MarketAnalysisTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerFindingParameters {
    #[serde(flatten)]
    pub basics: ReportBasics,
    pub tier: PartnerFindingTier,
    pub company_size: String,
    pub key_technologies: Vec<String>,
    pub target_market: Vec<String>,
}

/// Immutable parameters of one commissioned report, produced exactly once per
/// wizard submission. The `analysisMode` tag discriminates the variants, so a
/// tier can never be paired with the wrong mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "analysisMode")]
pub enum ReportParameters {
    #[serde(rename = "analysis")]
    Analysis(MarketAnalysisParameters),
    #[serde(rename = "matchmaking")]
    Matchmaking(PartnerFindingParameters),
}

impl ReportParameters {
    pub fn basics(&self) -> &ReportBasics {
        match self {
            ReportParameters::Analysis(p) => &p.basics,
            ReportParameters::Matchmaking(p) => &p.basics,
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        match self {
            ReportParameters::Analysis(_) => AnalysisMode::Analysis,
            ReportParameters::Matchmaking(_) => AnalysisMode::Matchmaking,
        }
    }

    pub fn tier_label(&self) -> &'static str {
        match self {
            ReportParameters::Analysis(p) => p.tier.label(),
            ReportParameters::Matchmaking(p) => p.tier.label(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LetterRequestError {
    #[error("Letter generation is only available for 'Find a Partner' reports")]
    NotMatchmaking,

    #[error("Report content is not available")]
    EmptyReport,
}

/// Request to draft an outreach letter from a finished matchmaking report.
/// Holds `PartnerFindingParameters` directly — an analysis-mode report cannot
/// be turned into a letter request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterRequest {
    pub report_parameters: PartnerFindingParameters,
    pub report_content: String,
}

impl LetterRequest {
    /// Builds a letter request from submitted parameters and the assembled
    /// report buffer. Fails for analysis-mode reports or an empty buffer.
    pub fn new(
        parameters: ReportParameters,
        report_content: String,
    ) -> Result<Self, LetterRequestError> {
        if report_content.trim().is_empty() {
            return Err(LetterRequestError::EmptyReport);
        }
        match parameters {
            ReportParameters::Matchmaking(report_parameters) => Ok(LetterRequest {
                report_parameters,
                report_content,
            }),
            ReportParameters::Analysis(_) => Err(LetterRequestError::NotMatchmaking),
        }
    }
}
