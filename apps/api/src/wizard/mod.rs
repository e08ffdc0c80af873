//! Report wizard — the step state machine that materializes exactly one
//! well-formed `ReportParameters` per submission.
//!
//! Five fixed steps: Profile → Goal → Scope → Tier → Finalize. The Goal step
//! branches the rest of the flow by analysis mode, and the Finalize step's
//! required fields differ by mode. Validation failures block the transition
//! and are reported as values; they never escape as panics.

pub mod catalog;
pub mod lookup;

use thiserror::Error;

use crate::models::report::{
    AnalysisMode, MarketAnalysisParameters, PartnerFindingParameters, ReportBasics,
    ReportParameters, ReportTier, UserType,
};

/// Shown when a lookup resolves successfully but empty.
const NO_CITIES_MESSAGE: &str = "No regional centers found. Please enter manually.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Profile,
    Goal,
    Scope,
    Tier,
    Finalize,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Profile => 1,
            WizardStep::Goal => 2,
            WizardStep::Scope => 3,
            WizardStep::Tier => 4,
            WizardStep::Finalize => 5,
        }
    }

    fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Profile => Some(WizardStep::Goal),
            WizardStep::Goal => Some(WizardStep::Scope),
            WizardStep::Scope => Some(WizardStep::Tier),
            WizardStep::Tier => Some(WizardStep::Finalize),
            WizardStep::Finalize => None,
        }
    }

    fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Profile => None,
            WizardStep::Goal => Some(WizardStep::Profile),
            WizardStep::Scope => Some(WizardStep::Goal),
            WizardStep::Tier => Some(WizardStep::Scope),
            WizardStep::Finalize => Some(WizardStep::Tier),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Choose a report goal before continuing")]
    ModeNotChosen,

    #[error("Select a report tier before submitting")]
    TierNotChosen,

    #[error("The tier '{0}' does not belong to the selected goal")]
    TierMismatch(&'static str),

    #[error("Describe your core objective before submitting")]
    MissingObjective,

    #[error("Select at least one key technology")]
    MissingKeyTechnologies,

    #[error("Select at least one target market")]
    MissingTargetMarkets,

    #[error("Already at the final step")]
    AtFinalStep,
}

/// Display state of the regional-city lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CityLookupState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// The wizard's accumulated field state.
///
/// Picklist fields keep their manual-override twin exactly as the original
/// form does: the toggle decides which value wins at submission.
#[derive(Debug)]
pub struct ReportWizard {
    step: WizardStep,

    // Step 1: Profile
    pub user_type: UserType,
    pub user_name: String,
    pub user_department: String,
    pub manual_department: bool,
    pub user_country: String,

    // Step 2: Goal
    analysis_mode: Option<AnalysisMode>,

    // Step 3: Scope
    target_country: String,
    pub regional_city: String,
    pub manual_city_entry: bool,
    pub industry: String,
    pub manual_industry_text: String,
    pub manual_industry: bool,

    // Step 4: Tier
    tier: Option<ReportTier>,

    // Step 5: Finalize
    pub custom_objective: String,
    pub company_size: String,
    pub key_technologies: Vec<String>,
    pub manual_key_technologies_text: String,
    pub manual_key_technologies: bool,
    pub target_market: Vec<String>,

    // City lookup bookkeeping
    regional_cities: Vec<String>,
    city_lookup: CityLookupState,
    lookup_generation: u64,
}

impl Default for ReportWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportWizard {
    pub fn new() -> Self {
        ReportWizard {
            step: WizardStep::Profile,
            user_type: UserType::Government,
            user_name: String::new(),
            user_department: catalog::GOVERNMENT_DEPARTMENTS[0].to_string(),
            manual_department: false,
            user_country: "Australia".to_string(),
            analysis_mode: None,
            target_country: "Philippines".to_string(),
            regional_city: String::new(),
            manual_city_entry: false,
            industry: catalog::INDUSTRIES[4].to_string(),
            manual_industry_text: String::new(),
            manual_industry: false,
            tier: None,
            custom_objective: String::new(),
            company_size: catalog::COMPANY_SIZES[0].to_string(),
            key_technologies: Vec::new(),
            manual_key_technologies_text: String::new(),
            manual_key_technologies: false,
            target_market: Vec::new(),
            regional_cities: Vec::new(),
            city_lookup: CityLookupState::default(),
            lookup_generation: 0,
        }
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Moves forward one step. The Goal step blocks until a mode is chosen.
    pub fn advance(&mut self) -> Result<(), WizardError> {
        if self.step == WizardStep::Goal && self.analysis_mode.is_none() {
            return Err(WizardError::ModeNotChosen);
        }
        match self.step.next() {
            Some(next) => {
                self.step = next;
                Ok(())
            }
            None => Err(WizardError::AtFinalStep),
        }
    }

    /// Moves back one step, saturating at Profile.
    pub fn back(&mut self) {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
    }

    /// Chooses the report goal, resets any previously chosen tier (the tier
    /// families differ per mode), and moves to Scope.
    pub fn select_mode(&mut self, mode: AnalysisMode) {
        self.analysis_mode = Some(mode);
        self.tier = None;
        self.step = WizardStep::Scope;
    }

    pub fn mode(&self) -> Option<AnalysisMode> {
        self.analysis_mode
    }

    /// Chooses a tier from the family matching the current mode and jumps
    /// straight to Finalize.
    pub fn select_tier(&mut self, tier: ReportTier) -> Result<(), WizardError> {
        let mode = self.analysis_mode.ok_or(WizardError::ModeNotChosen)?;
        match (mode, tier) {
            (AnalysisMode::Analysis, ReportTier::Market(_))
            | (AnalysisMode::Matchmaking, ReportTier::Partner(_)) => {
                self.tier = Some(tier);
                self.step = WizardStep::Finalize;
                Ok(())
            }
            _ => Err(WizardError::TierMismatch(tier.label())),
        }
    }

    pub fn selected_tier(&self) -> Option<ReportTier> {
        self.tier
    }

    // ── Profile ─────────────────────────────────────────────────────────────

    /// Switching requester type resets the department to the first entry of
    /// the type-appropriate catalog and clears the manual override.
    pub fn set_user_type(&mut self, user_type: UserType) {
        self.user_type = user_type;
        self.user_department = match user_type {
            UserType::Government => catalog::GOVERNMENT_DEPARTMENTS[0].to_string(),
            UserType::NonGovernment => catalog::NON_GOV_ORG_TYPES[0].to_string(),
        };
        self.manual_department = false;
    }

    // ── Scope / city lookup ─────────────────────────────────────────────────

    pub fn target_country(&self) -> &str {
        &self.target_country
    }

    pub fn regional_cities(&self) -> &[String] {
        &self.regional_cities
    }

    pub fn city_lookup(&self) -> &CityLookupState {
        &self.city_lookup
    }

    /// Changing the target country invalidates any loaded city list and
    /// starts a new lookup generation. Returns the generation token to
    /// schedule; any in-flight lookup with an older token is now stale.
    pub fn set_target_country(&mut self, country: impl Into<String>) -> u64 {
        self.target_country = country.into();
        self.manual_city_entry = false;
        self.begin_city_lookup()
    }

    /// Toggles manual city entry. Enabling it cancels any pending lookup;
    /// disabling it starts a fresh one and returns the generation to
    /// schedule.
    pub fn set_manual_city_entry(&mut self, manual: bool) -> Option<u64> {
        self.manual_city_entry = manual;
        if manual {
            self.lookup_generation += 1;
            self.regional_cities.clear();
            self.city_lookup = CityLookupState::Idle;
            None
        } else {
            Some(self.begin_city_lookup())
        }
    }

    fn begin_city_lookup(&mut self) -> u64 {
        self.lookup_generation += 1;
        self.regional_cities.clear();
        self.regional_city.clear();
        self.city_lookup = CityLookupState::Loading;
        self.lookup_generation
    }

    /// Applies a finished lookup. Outcomes from a superseded generation are
    /// discarded — only the lookup for the most recent country is ever
    /// reflected in wizard state. A failed or empty lookup degrades to
    /// manual entry without blocking any step.
    pub fn apply_city_lookup(&mut self, generation: u64, result: Result<Vec<String>, String>) {
        if generation != self.lookup_generation {
            return;
        }
        match result {
            Ok(cities) if !cities.is_empty() => {
                self.regional_city = cities[0].clone();
                self.regional_cities = cities;
                self.city_lookup = CityLookupState::Loaded;
            }
            Ok(_) => {
                self.city_lookup = CityLookupState::Failed(NO_CITIES_MESSAGE.to_string());
                self.manual_city_entry = true;
            }
            Err(message) => {
                self.city_lookup = CityLookupState::Failed(message);
                self.manual_city_entry = true;
            }
        }
    }

    // ── Submission ──────────────────────────────────────────────────────────

    fn effective_industry(&self) -> &str {
        if self.manual_industry {
            &self.manual_industry_text
        } else {
            &self.industry
        }
    }

    /// Key technologies after the manual override: free text splits on
    /// commas, entries are trimmed, empties dropped.
    fn effective_key_technologies(&self) -> Vec<String> {
        if self.manual_key_technologies {
            self.manual_key_technologies_text
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        } else {
            self.key_technologies.clone()
        }
    }

    /// Builds the immutable `ReportParameters` from accumulated state.
    /// Manual-override toggles take precedence over picklist values for
    /// department, industry, and key technologies.
    pub fn submit(&self) -> Result<ReportParameters, WizardError> {
        let mode = self.analysis_mode.ok_or(WizardError::ModeNotChosen)?;
        let tier = self.tier.ok_or(WizardError::TierNotChosen)?;

        if self.custom_objective.trim().is_empty() {
            return Err(WizardError::MissingObjective);
        }

        let basics = ReportBasics {
            user_name: self.user_name.clone(),
            user_type: self.user_type,
            user_department: self.user_department.clone(),
            user_country: self.user_country.clone(),
            custom_objective: self.custom_objective.clone(),
            industry: self.effective_industry().to_string(),
            region: format!("{}, {}", self.regional_city, self.target_country),
        };

        match (mode, tier) {
            (AnalysisMode::Analysis, ReportTier::Market(tier)) => {
                Ok(ReportParameters::Analysis(MarketAnalysisParameters {
                    basics,
                    tier,
                }))
            }
            (AnalysisMode::Matchmaking, ReportTier::Partner(tier)) => {
                let key_technologies = self.effective_key_technologies();
                if key_technologies.is_empty() {
                    return Err(WizardError::MissingKeyTechnologies);
                }
                if self.target_market.is_empty() {
                    return Err(WizardError::MissingTargetMarkets);
                }
                Ok(ReportParameters::Matchmaking(PartnerFindingParameters {
                    basics,
                    tier,
                    company_size: self.company_size.clone(),
                    key_technologies,
                    target_market: self.target_market.clone(),
                }))
            }
            // select_mode resets the tier, so a cross-family pair can only
            // mean the struct was mutated by hand.
            (_, tier) => Err(WizardError::TierMismatch(tier.label())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{MarketAnalysisTier, PartnerFindingTier};

    /// Walks a wizard to the Finalize step in analysis mode with the
    /// scenario fields from the acceptance checklist.
    fn analysis_wizard() -> ReportWizard {
        let mut wizard = ReportWizard::new();
        wizard.user_name = "Jane Doe".to_string();
        wizard.advance().unwrap();
        wizard.select_mode(AnalysisMode::Analysis);
        let generation = wizard.set_target_country("Philippines");
        wizard.apply_city_lookup(generation, Ok(vec!["Cebu".to_string()]));
        wizard.manual_industry = true;
        wizard.manual_industry_text = "AgriTech".to_string();
        wizard.advance().unwrap();
        wizard
            .select_tier(ReportTier::Market(MarketAnalysisTier::EconomicSnapshot))
            .unwrap();
        wizard.custom_objective = "test".to_string();
        wizard
    }

    fn matchmaking_wizard() -> ReportWizard {
        let mut wizard = ReportWizard::new();
        wizard.user_name = "Jane Doe".to_string();
        wizard.advance().unwrap();
        wizard.select_mode(AnalysisMode::Matchmaking);
        let generation = wizard.set_target_country("Vietnam");
        wizard.apply_city_lookup(generation, Ok(vec!["Da Nang".to_string()]));
        wizard
            .select_tier(ReportTier::Partner(PartnerFindingTier::PartnershipBlueprint))
            .unwrap();
        wizard.custom_objective = "attract a technology partner".to_string();
        wizard.key_technologies = vec!["Precision Agriculture".to_string()];
        wizard.target_market = vec!["Global/Any".to_string()];
        wizard
    }

    #[test]
    fn test_goal_step_blocks_advance_without_mode() {
        let mut wizard = ReportWizard::new();
        wizard.advance().unwrap();
        assert_eq!(wizard.step(), WizardStep::Goal);
        assert_eq!(wizard.advance(), Err(WizardError::ModeNotChosen));
        assert_eq!(wizard.step(), WizardStep::Goal);
    }

    #[test]
    fn test_back_saturates_at_profile() {
        let mut wizard = ReportWizard::new();
        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Profile);
    }

    #[test]
    fn test_select_mode_jumps_to_scope_and_resets_tier() {
        let mut wizard = ReportWizard::new();
        wizard.advance().unwrap();
        wizard.select_mode(AnalysisMode::Analysis);
        wizard
            .select_tier(ReportTier::Market(MarketAnalysisTier::EconomicSnapshot))
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::Finalize);

        // Changing the goal abandons the tier from the old family.
        wizard.select_mode(AnalysisMode::Matchmaking);
        assert_eq!(wizard.step(), WizardStep::Scope);
        assert_eq!(wizard.selected_tier(), None);
    }

    #[test]
    fn test_select_tier_rejects_cross_family_tier() {
        let mut wizard = ReportWizard::new();
        wizard.advance().unwrap();
        wizard.select_mode(AnalysisMode::Analysis);
        let result =
            wizard.select_tier(ReportTier::Partner(PartnerFindingTier::ValuationRisk));
        assert_eq!(
            result,
            Err(WizardError::TierMismatch(
                "Tier 4: Valuation & Risk Assessment"
            ))
        );
        assert_eq!(wizard.step(), WizardStep::Scope);
        assert_eq!(wizard.selected_tier(), None);
    }

    #[test]
    fn test_select_tier_jumps_to_finalize() {
        let mut wizard = ReportWizard::new();
        wizard.advance().unwrap();
        wizard.select_mode(AnalysisMode::Matchmaking);
        wizard
            .select_tier(ReportTier::Partner(PartnerFindingTier::TransformationSimulator))
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::Finalize);
    }

    #[test]
    fn test_analysis_submission_scenario() {
        let wizard = analysis_wizard();
        let params = wizard.submit().unwrap();

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["analysisMode"], "analysis");
        assert_eq!(value["tier"], "Tier A: Economic Snapshot");
        assert_eq!(value["region"], "Cebu, Philippines");
        assert_eq!(value["industry"], "AgriTech");
        assert_eq!(value["customObjective"], "test");
        assert!(value.get("companySize").is_none());
        assert!(value.get("keyTechnologies").is_none());
        assert!(value.get("targetMarket").is_none());
    }

    #[test]
    fn test_submit_requires_objective_in_both_modes() {
        let mut wizard = analysis_wizard();
        wizard.custom_objective = "  ".to_string();
        assert_eq!(wizard.submit(), Err(WizardError::MissingObjective));

        let mut wizard = matchmaking_wizard();
        wizard.custom_objective = String::new();
        assert_eq!(wizard.submit(), Err(WizardError::MissingObjective));
    }

    #[test]
    fn test_matchmaking_requires_technologies_and_markets() {
        let mut wizard = matchmaking_wizard();
        wizard.key_technologies.clear();
        assert_eq!(wizard.submit(), Err(WizardError::MissingKeyTechnologies));

        let mut wizard = matchmaking_wizard();
        wizard.target_market.clear();
        assert_eq!(wizard.submit(), Err(WizardError::MissingTargetMarkets));
    }

    #[test]
    fn test_manual_key_technologies_split_on_commas() {
        let mut wizard = matchmaking_wizard();
        wizard.manual_key_technologies = true;
        wizard.manual_key_technologies_text = "drone swarms, soil sensors,, irrigation AI ".to_string();

        let params = wizard.submit().unwrap();
        match params {
            ReportParameters::Matchmaking(p) => {
                assert_eq!(
                    p.key_technologies,
                    vec!["drone swarms", "soil sensors", "irrigation AI"]
                );
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_manual_key_technologies_all_blank_fails_validation() {
        let mut wizard = matchmaking_wizard();
        wizard.manual_key_technologies = true;
        wizard.manual_key_technologies_text = " , , ".to_string();
        assert_eq!(wizard.submit(), Err(WizardError::MissingKeyTechnologies));
    }

    #[test]
    fn test_submit_without_tier_fails() {
        let mut wizard = ReportWizard::new();
        wizard.advance().unwrap();
        wizard.select_mode(AnalysisMode::Analysis);
        wizard.custom_objective = "test".to_string();
        assert_eq!(wizard.submit(), Err(WizardError::TierNotChosen));
    }

    #[test]
    fn test_user_type_switch_resets_department() {
        let mut wizard = ReportWizard::new();
        wizard.manual_department = true;
        wizard.user_department = "Office of the Mayor".to_string();

        wizard.set_user_type(UserType::NonGovernment);
        assert_eq!(wizard.user_department, catalog::NON_GOV_ORG_TYPES[0]);
        assert!(!wizard.manual_department);
    }

    #[test]
    fn test_country_change_discards_stale_lookup() {
        let mut wizard = ReportWizard::new();
        let stale = wizard.set_target_country("Vietnam");
        let fresh = wizard.set_target_country("Philippines");

        // The stale lookup resolves late; its cities must not appear.
        wizard.apply_city_lookup(stale, Ok(vec!["Da Nang".to_string()]));
        assert!(wizard.regional_cities().is_empty());
        assert_eq!(*wizard.city_lookup(), CityLookupState::Loading);

        wizard.apply_city_lookup(fresh, Ok(vec!["Cebu".to_string()]));
        assert_eq!(wizard.regional_cities(), ["Cebu".to_string()]);
        assert_eq!(wizard.regional_city, "Cebu");
        assert_eq!(*wizard.city_lookup(), CityLookupState::Loaded);
    }

    #[test]
    fn test_failed_lookup_degrades_to_manual_entry() {
        let mut wizard = ReportWizard::new();
        let generation = wizard.set_target_country("Vietnam");
        wizard.apply_city_lookup(generation, Err("API unavailable".to_string()));

        assert!(wizard.manual_city_entry);
        assert_eq!(
            *wizard.city_lookup(),
            CityLookupState::Failed("API unavailable".to_string())
        );

        // Navigation is not blocked by the failure.
        let mut wizard2 = analysis_wizard();
        let generation = wizard2.set_target_country("Philippines");
        wizard2.apply_city_lookup(generation, Err("API unavailable".to_string()));
        wizard2.regional_city = "Cebu".to_string();
        assert!(wizard2.submit().is_ok());
    }

    #[test]
    fn test_empty_lookup_counts_as_failure() {
        let mut wizard = ReportWizard::new();
        let generation = wizard.set_target_country("Vietnam");
        wizard.apply_city_lookup(generation, Ok(vec![]));
        assert!(wizard.manual_city_entry);
        assert!(matches!(wizard.city_lookup(), CityLookupState::Failed(_)));
    }

    #[test]
    fn test_manual_city_entry_toggle_cancels_and_restarts_lookup() {
        let mut wizard = ReportWizard::new();
        let generation = wizard.set_target_country("Vietnam");

        assert_eq!(wizard.set_manual_city_entry(true), None);
        // The canceled lookup's late result is ignored.
        wizard.apply_city_lookup(generation, Ok(vec!["Da Nang".to_string()]));
        assert!(wizard.regional_cities().is_empty());

        let restarted = wizard.set_manual_city_entry(false).unwrap();
        wizard.apply_city_lookup(restarted, Ok(vec!["Da Nang".to_string()]));
        assert_eq!(wizard.regional_cities(), ["Da Nang".to_string()]);
    }

    #[test]
    fn test_tier_family_catalog_matches_mode() {
        // Every tier in each family is accepted by its own mode and rejected
        // by the other.
        for tier in MarketAnalysisTier::ALL {
            let mut wizard = ReportWizard::new();
            wizard.advance().unwrap();
            wizard.select_mode(AnalysisMode::Analysis);
            assert!(wizard.select_tier(ReportTier::Market(tier)).is_ok());

            let mut wizard = ReportWizard::new();
            wizard.advance().unwrap();
            wizard.select_mode(AnalysisMode::Matchmaking);
            assert!(wizard.select_tier(ReportTier::Market(tier)).is_err());
        }
        for tier in PartnerFindingTier::ALL {
            let mut wizard = ReportWizard::new();
            wizard.advance().unwrap();
            wizard.select_mode(AnalysisMode::Matchmaking);
            assert!(wizard.select_tier(ReportTier::Partner(tier)).is_ok());
        }
    }
}
