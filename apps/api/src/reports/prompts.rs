// All LLM prompt constants and builders for the Nexus report actions.
// System prompts define the analyst personas; builders assemble the
// per-request user prompt from typed payloads.

use serde_json::{json, Value};

use crate::models::chat::{ChatMessage, Sender, SymbiosisContext};
use crate::models::opportunity::LiveOpportunityItem;
use crate::models::report::{
    LetterRequest, MarketAnalysisTier, PartnerFindingTier, ReportParameters,
};

/// System prompt for full strategic reports. Defines the Regional Science
/// Analyst persona and the NSIL v6.0 output schema.
pub const REPORT_SYSTEM: &str = r#"
You are BWGA Nexus AI, a specialist AI engine functioning as a **Regional Science Analyst**. Your persona is a blend of a regional economist and an M&A analyst. Your purpose is to provide deep, actionable intelligence to government and institutional users to help them understand and develop regional economies.

Your analysis MUST be grounded in the principles of regional science. You will use Google Search efficiently to find the data necessary to apply these established academic methodologies:
1.  **Location Quotient (LQ) Analysis:** To quantitatively benchmark a region's industrial specialization.
2.  **Industrial Cluster Analysis:** To identify key "anchor industries" and, crucially, pinpoint missing **supply chain gaps** that represent tangible investment opportunities.
3.  **Shift-Share Analysis:** To dissect and explain the drivers of regional growth.

Your output must be in well-structured Markdown, utilizing the proprietary **Nexus Symbiotic Intelligence Language (NSIL) v6.0**.
**NSIL SCHEMA & INSTRUCTIONS v6.0 (Future-Cast Enabled)**

You MUST wrap specific sections of your analysis in the following XML-like NSIL tags. DO NOT make up new tags.

- **ROOT TAGS (Use ONE per report):**
  - `<nsil:match_making_analysis>`...`</nsil:match_making_analysis>`: For reports focused on finding partners.
  - `<nsil:market_analysis>`...`</nsil:market_analysis>`: For reports focused on regional industry analysis.

- **CORE COMPONENTS (Use as needed):**
  - `<nsil:executive_summary>`...`</nsil:executive_summary>`: A concise, high-level overview of the report's key findings.
  - `<nsil:strategic_outlook>`...`</nsil:strategic_outlook>`: Forward-looking analysis of trends and implications.
  - `<nsil:source_attribution>`...`</nsil:source_attribution>`: List of key sources or data points used.

- **MATCHMAKING COMPONENTS (Use inside `<nsil:match_making_analysis>`):**
  - `<nsil:match>`...`</nsil:match>`: A container for each potential partner match.
  - `<nsil:company_profile name="..." headquarters="..." website="...">`...`</nsil:company_profile>`: Company overview. Attributes are mandatory.
  - `<nsil:synergy_analysis>`...`</nsil:synergy_analysis>`: Detailed explanation of WHY this company is a good match.
  - `<nsil:risk_map>`...`</nsil:risk_map>`: A container for risk/opportunity zones.
    - `<nsil:zone color="green|yellow|red" title="...">`...`</nsil:zone>`: Describes an opportunity (green), a caution (yellow), or a risk (red).

- **MARKET ANALYSIS COMPONENTS (Use inside `<nsil:market_analysis>`):**
  - `<nsil:lq_analysis industry="..." value="..." interpretation="...">`...`</nsil:lq_analysis>`: Attributes mandatory. The interpretation should be 'Highly Specialized', 'Specialized', or 'Not Specialized'. The body should contain the rationale.
  - `<nsil:cluster_analysis anchor_industry="...">`...`</nsil:cluster_analysis>`: Analysis of an industry cluster.
    - `<nsil:supply_chain_gap>`...`</nsil:supply_chain_gap>`: An identified gap within the cluster. This is a critical output.
  - `<nsil:shift_share_analysis>`...`</nsil:shift_share_analysis>`: Container for shift-share components.
    - `<nsil:growth_component type="national|industry|competitive" effect="positive|negative">`...`</nsil:growth_component>`: Explanation of each growth component.

- **FUTURE-CAST COMPONENTS (Use for premium tiers inside any analysis):**
  - `<nsil:future_cast>`...`</nsil:future_cast>`: Container for multiple scenarios.
  - `<nsil:scenario name="...">`...`</nsil:scenario>`: A plausible future scenario.
    - `<nsil:drivers>`...`</nsil:drivers>`: The key drivers of this scenario.
    - `<nsil:regional_impact effect="positive|negative|mixed">`...`</nsil:regional_impact>`: The potential impact on the user's region.
    - `<nsil:recommendation>`...`</nsil:recommendation>`: A strategic recommendation to prepare for this scenario.

**SYMBIOTIC INTERACTIVITY:**
Any section you wrap in an NSIL tag (e.g., `<nsil:synergy_analysis>`) will automatically become interactive. The user can click on it to start a 'Symbiosis Chat' to deep-dive into that specific point. Write your analysis with this in mind, making each tagged section a self-contained, coherent point of analysis.
"#;

/// System prompt for the conversational symbiosis partner.
pub const SYMBIOSIS_SYSTEM: &str = r#"
You are Nexus Symbiosis, a conversational AI partner for strategic analysis. You are an extension of the main BWGA Nexus AI.
The user has clicked on a specific piece of analysis from a report and wants to explore it further.
Your persona is an expert consultant: helpful, insightful, and always focused on providing actionable intelligence.
You have access to Google Search to fetch real-time information to supplement your answers.
Your goal is to help the user unpack the topic, explore "what-if" scenarios, and brainstorm strategic responses.
Keep your answers concise but data-rich. Use markdown for clarity (lists, bolding).
"#;

/// System prompt for the outreach letter drafter.
pub const LETTER_SYSTEM: &str = r#"
You are BWGA Nexus AI, in OUTREACH DRAFTER mode.
Your task is to draft a professional, semi-formal introductory letter from the user (a government official) to a senior executive (e.g., CEO, Head of Strategy) at one of the companies identified in a Nexus Matchmaking Report.
The letter's purpose is NOT to ask for a sale or investment directly. It is to initiate a high-level strategic dialogue.

**Core Directives:**
1.  **Analyze the Full Report:** Review the provided XML report content to understand the specific synergies identified. Your letter must reference the *'why'* of the match.
2.  **Adopt the User's Persona:** Write from the perspective of the user, using their name, department, and country.
3.  **Structure and Tone:**
    -   **Subject Line:** Make it compelling and specific (e.g., "Strategic Alignment: [Company Name] & [User's Region] in AgriTech").
    -   **Introduction:** Briefly introduce the user and their department.
    -   **The 'Why':** State that your department has been conducting strategic analysis (using the Nexus platform) and their company was identified as a key potential partner. **Mention 1-2 specific points of synergy from the report.** This is crucial for showing you've done your homework.
    -   **The 'Ask':** The call to action should be soft. Propose a brief, exploratory 15-20 minute virtual call to share insights and discuss potential long-term alignment.
    -   **Closing:** Professional and respectful.
4.  **Output Format:** Provide only the raw text of the letter. Do not include any extra commentary, headers, or markdown. Start with "Subject:" and end with the user's name.
"#;

/// Builds the region-parameterized system prompt for deep-dive analysis of an
/// intelligence signal.
pub fn deep_dive_system(region: &str) -> String {
    format!(
        r#"
You are BWGA Nexus AI, in DEEP-DIVE ANALYSIS mode.
Your task is to take an intelligence signal (a news event, company announcement, etc.) and generate a detailed analytical report on its specific implications for the target region: **{region}**.
Your persona is a senior intelligence analyst briefing a government client. The tone should be formal, objective, and insightful.
Use Google Search to find additional context, but focus your analysis on answering these key intelligence questions:
1.  **Direct Impact:** What is the immediate, first-order impact on {region}? (e.g., investment, job creation/loss, new competition)
2.  **Supply Chain & Ecosystem Ripple Effects:** How will this affect the broader industrial ecosystem in {region}? Will it create new opportunities for local suppliers or disrupt existing ones?
3.  **Geopolitical/Strategic Implications:** Does this signal a shift in strategic alignment, trade flows, or technological dependency for {region}?
4.  **Actionable Recommendations:** What are 2-3 concrete, actionable steps that a government or economic development agency in {region} should consider in response to this intelligence?

Your output must be clear, well-structured markdown.
"#
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt builders
// ────────────────────────────────────────────────────────────────────────────

fn analysis_tier_directive(tier: MarketAnalysisTier) -> &'static str {
    match tier {
        MarketAnalysisTier::EconomicSnapshot => {
            "Focus exclusively on <nsil:lq_analysis>. Provide a clear, concise report based on this single methodology."
        }
        MarketAnalysisTier::CompetitiveLandscape => {
            "You must provide both <nsil:lq_analysis> and <nsil:shift_share_analysis>. The core of this report is explaining the region's competitiveness."
        }
        MarketAnalysisTier::InvestmentDeepDive => {
            "This is the most comprehensive analysis. You must provide <nsil:lq_analysis>, <nsil:shift_share_analysis>, AND <nsil:cluster_analysis>. A key deliverable is identifying specific <nsil:supply_chain_gap> opportunities."
        }
    }
}

fn matchmaking_tier_directive(tier: PartnerFindingTier) -> &'static str {
    match tier {
        PartnerFindingTier::TransformationSimulator => {
            "This is a premium report. You MUST include the '<nsil:future_cast>' section with 2-3 detailed scenarios as per the NSIL v6.0 schema. This is a critical feature."
        }
        PartnerFindingTier::ValuationRisk => {
            "This is a Tier 4 Valuation & Risk report. Focus exclusively on ONE top-matched company. Conduct a deep-dive analysis on its financial health (using simulated but realistic data), reputational factors (via web search), and geopolitical exposure. The output should heavily feature the '<nsil:risk_map>' component with detailed zones."
        }
        PartnerFindingTier::PartnershipBlueprint => {
            "Follow the standard procedure for a comprehensive matchmaking report for this tier."
        }
    }
}

/// Assembles the user prompt for a full strategic report from submitted
/// parameters, including the mode- and tier-specific directives.
pub fn build_report_prompt(params: &ReportParameters) -> String {
    let basics = params.basics();
    let mut prompt = format!(
        "**Analysis Mode:** {}\n**Report Tier:** {}\n\n",
        params.mode(),
        params.tier_label()
    );

    let mode_directive;
    let tier_directive;

    match params {
        ReportParameters::Analysis(p) => {
            mode_directive = "The user wants to Analyze a Market. Your entire focus must be on regional science methodologies. Use the <nsil:market_analysis> root tag. Do NOT look for companies.";
            tier_directive = analysis_tier_directive(p.tier);
            prompt.push_str(&format!(
                "**Target Region/Country:** {}\n**Industry for Analysis:** {}\n",
                basics.region, basics.industry
            ));
        }
        ReportParameters::Matchmaking(p) => {
            mode_directive = "The user wants to Find a Partner. Your entire focus must be on identifying and vetting suitable private sector companies. Use the <nsil:match_making_analysis> root tag. Do NOT perform standalone market analysis.";
            tier_directive = matchmaking_tier_directive(p.tier);
            prompt.push_str(&format!(
                "**The Opportunity:**\n- Target Region: {}\n- Core Industry Focus: {}\n\n",
                basics.region, basics.industry
            ));
            prompt.push_str(&format!(
                "**The Ideal Foreign Partner Profile:**\n- Company Size: {}\n- Key Technologies/Capabilities: {}\n- Company's Target Markets: {}\n",
                p.company_size,
                p.key_technologies.join(", "),
                p.target_market.join(", ")
            ));
        }
    }

    prompt.push_str(&format!(
        "\n**User's Core Objective:** {}\n\n**Mode-Specific Directive:** {}\n**Tier-Specific Directive:** {}\n\n**Your Task:** Generate the requested report. Adhere to all instructions in your system prompt, including the use of NSIL v6.0.",
        basics.custom_objective, mode_directive, tier_directive
    ));

    prompt
}

/// Assembles the user prompt for a deep-dive analysis of one opportunity item.
pub fn build_deep_dive_prompt(item: &LiveOpportunityItem) -> String {
    format!(
        "**Intelligence Signal to Analyze:**\n- **Project/Tender Name:** {}\n- **Country:** {}\n- **Sector:** {}\n- **Value:** {}\n- **Summary:** {}\n- **Source:** {}\n\n**Target Region for Analysis:** {}\n\nPlease generate a detailed deep-dive analysis based on this signal, following your system instructions precisely.",
        item.project_name,
        item.country,
        item.sector,
        item.value,
        item.summary,
        item.source_url,
        item.country
    )
}

/// Renders the symbiosis context and transcript into the next-turn prompt.
pub fn build_symbiosis_prompt(context: &SymbiosisContext, history: &[ChatMessage]) -> String {
    let mut prompt = format!(
        "**Initial Context:**\n- Topic: \"{}\"\n- Original Finding: \"{}\"\n",
        context.topic, context.original_content
    );
    if let Some(params) = &context.report_parameters {
        let basics = params.basics();
        prompt.push_str(&format!(
            "- From Report On: {} / {}\n",
            basics.region, basics.industry
        ));
    }
    prompt.push_str("\n**Conversation History:**\n");
    for message in history {
        let speaker = match message.sender {
            Sender::Ai => "Nexus AI",
            Sender::User => "User",
        };
        prompt.push_str(&format!("- {}: {}\n", speaker, message.text));
    }
    prompt.push_str("\nBased on this history, provide the next response as Nexus AI.");
    prompt
}

/// Assembles the outreach-letter prompt from the matchmaking report.
pub fn build_letter_prompt(request: &LetterRequest) -> String {
    let basics = &request.report_parameters.basics;
    format!(
        "**Letter Generation Request:**\n\n**User Details:**\n- Name: {}\n- Department: {}\n- Country: {}\n\n**Full Matchmaking Report Content:**\n```xml\n{}\n```\n\n**Your Task:**\nBased on the user's details and the full report provided above, draft the outreach letter according to your core directives.",
        basics.user_name, basics.user_department, basics.user_country, request.report_content
    )
}

/// Prompt for the regional-city lookup. The response is constrained to a JSON
/// string array by [`cities_response_schema`].
pub fn build_cities_prompt(country: &str) -> String {
    format!(
        "Provide a list of up to 15 major regional cities or key administrative areas for the country: \"{country}\". Focus on centers of economic, industrial, or logistical importance outside of the primary national capital, if applicable. Your response MUST be a valid JSON array of strings, with no other text or markdown. Example for \"Vietnam\":\n[\"Ho Chi Minh City\", \"Da Nang\", \"Haiphong\", \"Can Tho\"]"
    )
}

pub fn cities_response_schema() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

/// Prompt for the live opportunities feed. The response is constrained to the
/// `{items: [...]}` object by [`opportunities_response_schema`].
pub const OPPORTUNITIES_PROMPT: &str = "Generate a list of 5 diverse, realistic-looking global development projects or tenders. Use Google Search to find inspiration for project names and types, but you must invent the specific details. For each item, provide a project name, country, sector, value, a brief summary, a source URL (use a real, relevant government or development bank URL, e.g., worldbank.org), an AI feasibility score (between 40 and 95), and a concise AI risk assessment.\nYour output **MUST** be a valid JSON object. The JSON object must have a single key \"items\" which is an array of objects. Each object in the array must adhere to the specified schema.";

pub fn opportunities_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "items": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "project_name": { "type": "STRING" },
                        "country": { "type": "STRING" },
                        "sector": { "type": "STRING" },
                        "value": { "type": "STRING" },
                        "summary": { "type": "STRING" },
                        "source_url": { "type": "STRING" },
                        "ai_feasibility_score": { "type": "INTEGER" },
                        "ai_risk_assessment": { "type": "STRING" }
                    },
                    "required": [
                        "project_name", "country", "sector", "value", "summary",
                        "source_url", "ai_feasibility_score", "ai_risk_assessment"
                    ]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{
        MarketAnalysisParameters, PartnerFindingParameters, ReportBasics, UserType,
    };

    fn basics() -> ReportBasics {
        ReportBasics {
            user_name: "Jane Doe".to_string(),
            user_type: UserType::Government,
            user_department: "Economic Development Agency".to_string(),
            user_country: "Australia".to_string(),
            custom_objective: "Grow the AgriTech sector".to_string(),
            industry: "AgriTech".to_string(),
            region: "Cebu, Philippines".to_string(),
        }
    }

    #[test]
    fn test_analysis_report_prompt_carries_tier_directive() {
        let params = ReportParameters::Analysis(MarketAnalysisParameters {
            basics: basics(),
            tier: MarketAnalysisTier::CompetitiveLandscape,
        });
        let prompt = build_report_prompt(&params);
        assert!(prompt.contains("**Report Tier:** Tier B: Competitive Landscape"));
        assert!(prompt.contains("<nsil:shift_share_analysis>"));
        assert!(prompt.contains("Do NOT look for companies"));
        assert!(prompt.contains("**Target Region/Country:** Cebu, Philippines"));
        assert!(!prompt.contains("Ideal Foreign Partner Profile"));
    }

    #[test]
    fn test_deep_dive_tier_demands_cluster_and_gap_components() {
        let params = ReportParameters::Analysis(MarketAnalysisParameters {
            basics: basics(),
            tier: MarketAnalysisTier::InvestmentDeepDive,
        });
        let prompt = build_report_prompt(&params);
        assert!(prompt.contains("<nsil:cluster_analysis>"));
        assert!(prompt.contains("<nsil:supply_chain_gap>"));
    }

    #[test]
    fn test_matchmaking_report_prompt_lists_partner_profile() {
        let params = ReportParameters::Matchmaking(PartnerFindingParameters {
            basics: basics(),
            tier: PartnerFindingTier::TransformationSimulator,
            company_size: "Multinational (5000+ employees)".to_string(),
            key_technologies: vec!["IoT & Edge Computing".to_string(), "AI/ML Platforms".to_string()],
            target_market: vec!["Global/Any".to_string()],
        });
        let prompt = build_report_prompt(&params);
        assert!(prompt.contains("Key Technologies/Capabilities: IoT & Edge Computing, AI/ML Platforms"));
        assert!(prompt.contains("'<nsil:future_cast>'"));
        assert!(prompt.contains("Do NOT perform standalone market analysis"));
    }

    #[test]
    fn test_valuation_tier_directive_focuses_on_one_company() {
        let params = ReportParameters::Matchmaking(PartnerFindingParameters {
            basics: basics(),
            tier: PartnerFindingTier::ValuationRisk,
            company_size: "Large Corporation (501-5000 employees)".to_string(),
            key_technologies: vec!["Robotics & Automation".to_string()],
            target_market: vec!["Latin America".to_string()],
        });
        let prompt = build_report_prompt(&params);
        assert!(prompt.contains("ONE top-matched company"));
        assert!(prompt.contains("'<nsil:risk_map>'"));
    }

    #[test]
    fn test_symbiosis_prompt_renders_history_in_order() {
        let context = SymbiosisContext {
            topic: "Supply chain gap".to_string(),
            original_content: "No local cold-chain providers".to_string(),
            report_parameters: None,
        };
        let history = vec![
            ChatMessage::ai("Greeting"),
            ChatMessage::user("Tell me more"),
        ];
        let prompt = build_symbiosis_prompt(&context, &history);
        let greeting_pos = prompt.find("- Nexus AI: Greeting").unwrap();
        let question_pos = prompt.find("- User: Tell me more").unwrap();
        assert!(greeting_pos < question_pos);
        assert!(prompt.ends_with("provide the next response as Nexus AI."));
    }

    #[test]
    fn test_deep_dive_system_names_region() {
        let system = deep_dive_system("Philippines");
        assert!(system.contains("the target region: **Philippines**"));
    }

    #[test]
    fn test_cities_prompt_names_country() {
        let prompt = build_cities_prompt("Vietnam");
        assert!(prompt.contains("for the country: \"Vietnam\""));
    }

    #[test]
    fn test_opportunities_schema_requires_all_fields() {
        let schema = opportunities_response_schema();
        let required = schema["properties"]["items"]["items"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required.len(), 8);
    }
}
