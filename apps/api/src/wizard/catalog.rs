//! Static picklist catalogs feeding the report wizard.

pub const INDUSTRIES: &[&str] = &[
    "Advanced Manufacturing & Robotics",
    "Agriculture & Aquaculture Technology (AgriTech)",
    "Artificial Intelligence (AI) & Machine Learning",
    "Biotechnology & Life Sciences",
    "Clean Technology & Renewable Energy",
    "Critical Minerals & Rare Earth Elements",
    "Cybersecurity",
    "Digital Infrastructure (Data Centers, 5G)",
    "Financial Technology (FinTech)",
    "Logistics & Supply Chain Tech",
    "Medical Technology & Healthcare Innovation",
    "Space Technology & Exploration",
    "Sustainable Materials",
    "Water Technology & Management",
];

pub const COUNTRIES: &[&str] = &[
    "Australia",
    "Brazil",
    "Canada",
    "Chile",
    "Egypt",
    "Estonia",
    "Finland",
    "Germany",
    "Ghana",
    "India",
    "Indonesia",
    "Israel",
    "Japan",
    "Kenya",
    "Malaysia",
    "Mexico",
    "Morocco",
    "Netherlands",
    "New Zealand",
    "Nigeria",
    "Norway",
    "Oman",
    "Philippines",
    "Poland",
    "Portugal",
    "Qatar",
    "Rwanda",
    "Saudi Arabia",
    "Singapore",
    "South Africa",
    "South Korea",
    "Spain",
    "Sweden",
    "Switzerland",
    "Taiwan",
    "Tanzania",
    "Thailand",
    "Turkey",
    "United Arab Emirates",
    "United Kingdom",
    "United States",
    "Uruguay",
    "Vietnam",
];

pub const GOVERNMENT_DEPARTMENTS: &[&str] = &[
    "Department of Trade & Industry",
    "Foreign Affairs / State Department",
    "Economic Development Agency",
    "Investment Promotion Agency",
    "Department of Agriculture",
    "Department of Science & Technology",
    "National Security Council",
    "Other",
];

pub const NON_GOV_ORG_TYPES: &[&str] = &[
    "Private Corporation",
    "Investment Firm / Venture Capital",
    "Industry Association / Chamber of Commerce",
    "Research Institute / Academia",
    "Consulting Firm",
    "Non-Profit / NGO",
    "Other",
];

pub const COMPANY_SIZES: &[&str] = &[
    "Startup (1-50 employees)",
    "Small-Medium Enterprise (51-500 employees)",
    "Large Corporation (501-5000 employees)",
    "Multinational (5000+ employees)",
];

pub const KEY_TECHNOLOGIES: &[&str] = &[
    "AI/ML Platforms",
    "IoT & Edge Computing",
    "Blockchain & DLT",
    "Advanced Materials",
    "Robotics & Automation",
    "Gene Editing/CRISPR",
    "Quantum Computing",
    "5G/6G Communications",
    "Battery & Energy Storage",
    "Carbon Capture, Utilization, and Storage (CCUS)",
    "Precision Agriculture",
    "Digital Twin Technology",
];

pub const TARGET_MARKETS: &[&str] = &[
    "Developed Economies (e.g., North America, Western Europe)",
    "Emerging Asia (e.g., Southeast Asia, India)",
    "Latin America",
    "Middle East & North Africa (MENA)",
    "Sub-Saharan Africa",
    "Global/Any",
];
