//! Scope types and the option catalog.
//!
//! A scope type names one kind of filter clause ("States", "Billing Codes", ...). Every scope
//! type has an ordered list of candidate values that tag input is resolved against. The order
//! matters: prefix and substring resolution return the *first* candidate that matches.
//!
//! Scope types come in two families. The contracts family (plural labels) is used by the Clear
//! Contracts product; the MRF family (singular labels) is used by MRF Search.

use crate::{RuleError, RuleResult};
use scope_types::fold_case;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Closed set of scope types.
///
/// Serialises as the display label and deserialises from it ignoring case, the same way
/// [`FromStr`] parses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ScopeType {
    #[serde(rename = "Providers")]
    Providers,
    #[serde(rename = "Payers")]
    Payers,
    #[serde(rename = "Networks")]
    Networks,
    #[serde(rename = "States")]
    States,
    #[serde(rename = "CBSAs")]
    Cbsas,
    #[serde(rename = "Billing Codes")]
    BillingCodes,
    #[serde(rename = "Billing Code Types")]
    BillingCodeTypes,
    #[serde(rename = "Provider Types")]
    ProviderTypes,
    #[serde(rename = "Health Systems")]
    HealthSystems,
    #[serde(rename = "Plan Types")]
    PlanTypes,
    #[serde(rename = "State")]
    State,
    #[serde(rename = "Billing Code")]
    BillingCode,
    #[serde(rename = "CBSA")]
    Cbsa,
    #[serde(rename = "NPI")]
    Npi,
}

impl ScopeType {
    /// Every scope type, contracts family first.
    pub const ALL: [ScopeType; 14] = [
        ScopeType::Providers,
        ScopeType::Payers,
        ScopeType::Networks,
        ScopeType::States,
        ScopeType::Cbsas,
        ScopeType::BillingCodes,
        ScopeType::BillingCodeTypes,
        ScopeType::ProviderTypes,
        ScopeType::HealthSystems,
        ScopeType::PlanTypes,
        ScopeType::State,
        ScopeType::BillingCode,
        ScopeType::Cbsa,
        ScopeType::Npi,
    ];

    /// Display label, identical to the serialised form.
    pub fn label(self) -> &'static str {
        match self {
            ScopeType::Providers => "Providers",
            ScopeType::Payers => "Payers",
            ScopeType::Networks => "Networks",
            ScopeType::States => "States",
            ScopeType::Cbsas => "CBSAs",
            ScopeType::BillingCodes => "Billing Codes",
            ScopeType::BillingCodeTypes => "Billing Code Types",
            ScopeType::ProviderTypes => "Provider Types",
            ScopeType::HealthSystems => "Health Systems",
            ScopeType::PlanTypes => "Plan Types",
            ScopeType::State => "State",
            ScopeType::BillingCode => "Billing Code",
            ScopeType::Cbsa => "CBSA",
            ScopeType::Npi => "NPI",
        }
    }

    pub fn family(self) -> ScopeFamily {
        match self {
            ScopeType::State | ScopeType::BillingCode | ScopeType::Cbsa | ScopeType::Npi => {
                ScopeFamily::MrfSearch
            }
            _ => ScopeFamily::Contracts,
        }
    }

    /// Looks a scope type up by label, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = fold_case(label.trim());
        Self::ALL
            .into_iter()
            .find(|t| fold_case(t.label()) == wanted)
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScopeType {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| RuleError::UnknownScopeType(s.to_string()))
    }
}

impl TryFrom<String> for ScopeType {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Grouping of scope types offered together by one product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeFamily {
    Contracts,
    MrfSearch,
}

impl ScopeFamily {
    /// Scope types in this family, in the order they are offered.
    pub fn scope_types(self) -> Vec<ScopeType> {
        ScopeType::ALL
            .into_iter()
            .filter(|t| t.family() == self)
            .collect()
    }

    pub fn allows(self, scope_type: ScopeType) -> bool {
        scope_type.family() == self
    }
}

const STATES: &[&str] = &[
    "Alabama",
    "Arizona",
    "California",
    "Colorado",
    "Florida",
    "Georgia",
    "Illinois",
    "Massachusetts",
    "Michigan",
    "New Jersey",
    "New York",
    "North Carolina",
    "Ohio",
    "Pennsylvania",
    "Texas",
    "Virginia",
    "Washington",
];

const CBSAS: &[&str] = &[
    "Atlanta-Sandy Springs-Alpharetta GA (12060)",
    "Boston-Cambridge-Newton MA-NH (14460)",
    "Chicago-Naperville-Elgin IL-IN-WI (16980)",
    "Dallas-Fort Worth-Arlington TX (19100)",
    "Houston-The Woodlands-Sugar Land TX (26420)",
    "Los Angeles-Long Beach-Anaheim CA (31080)",
    "New York-Newark-Jersey City NY-NJ-PA (35620)",
    "Phoenix-Mesa-Chandler AZ (38060)",
];

const BILLING_CODES: &[&str] = &[
    "CPT 27130",
    "CPT 27447",
    "CPT 29881",
    "CPT 43239",
    "CPT 45378",
    "CPT 66984",
    "CPT 70551",
    "CPT 99213",
    "CPT 99214",
    "HCPCS C9741",
    "HCPCS J0897",
    "HCPCS J1745",
    "HCPCS J9271",
    "HCPCS L8699",
    "MS-DRG 470",
    "MS-DRG 871",
    "REV 0450",
];

const PROVIDERS: &[&str] = &[
    "Ascension Health",
    "Baylor Scott & White",
    "Cedars-Sinai Medical Center",
    "Cleveland Clinic",
    "HCA Healthcare",
    "Kaiser Permanente",
    "Mayo Clinic",
    "Mount Sinai Hospital",
    "NYU Langone Health",
    "Stanford Health Care",
];

const PAYERS: &[&str] = &[
    "Aetna",
    "Anthem Blue Cross",
    "Blue Cross Blue Shield",
    "Cigna",
    "Humana",
    "Kaiser Foundation Health Plan",
    "Molina Healthcare",
    "UnitedHealthcare",
];

const NETWORKS: &[&str] = &[
    "Aetna Open Access",
    "Blue Choice PPO",
    "Cigna OAP",
    "Humana Gold Plus HMO",
    "UHC Choice Plus",
];

const BILLING_CODE_TYPES: &[&str] = &[
    "CPT",
    "HCPCS",
    "MS-DRG",
    "APR-DRG",
    "Revenue Code",
    "ICD-10-PCS",
    "NDC",
];

const PROVIDER_TYPES: &[&str] = &[
    "Hospital",
    "Ambulatory Surgery Center",
    "Physician Group",
    "Imaging Center",
    "Laboratory",
    "Skilled Nursing Facility",
    "Home Health Agency",
    "Durable Medical Equipment Supplier",
];

const HEALTH_SYSTEMS: &[&str] = &[
    "AdventHealth",
    "Advocate Health",
    "Atrium Health",
    "CommonSpirit Health",
    "Providence",
    "Sutter Health",
    "Tenet Healthcare",
    "Trinity Health",
];

const PLAN_TYPES: &[&str] = &[
    "Commercial",
    "Medicare Advantage",
    "Medicaid Managed Care",
    "Exchange",
    "Self-Funded",
    "PPO",
    "HMO",
    "EPO",
    "POS",
];

const NPIS: &[&str] = &[
    "1003000126",
    "1013912578",
    "1215930367",
    "1306849450",
    "1427051473",
    "1548280001",
    "1659307107",
    "1760458963",
];

fn builtin_options(scope_type: ScopeType) -> &'static [&'static str] {
    match scope_type {
        ScopeType::Providers => PROVIDERS,
        ScopeType::Payers => PAYERS,
        ScopeType::Networks => NETWORKS,
        ScopeType::States | ScopeType::State => STATES,
        ScopeType::Cbsas | ScopeType::Cbsa => CBSAS,
        ScopeType::BillingCodes | ScopeType::BillingCode => BILLING_CODES,
        ScopeType::BillingCodeTypes => BILLING_CODE_TYPES,
        ScopeType::ProviderTypes => PROVIDER_TYPES,
        ScopeType::HealthSystems => HEALTH_SYSTEMS,
        ScopeType::PlanTypes => PLAN_TYPES,
        ScopeType::Npi => NPIS,
    }
}

/// Ordered candidate values per scope type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionCatalog {
    options: BTreeMap<ScopeType, Vec<String>>,
}

impl Default for OptionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl OptionCatalog {
    /// The catalog shipped with the binary.
    pub fn builtin() -> Self {
        let options = ScopeType::ALL
            .into_iter()
            .map(|t| {
                let values = builtin_options(t).iter().map(|v| v.to_string()).collect();
                (t, values)
            })
            .collect();
        Self { options }
    }

    /// Builds a catalog from explicit values, validating each list.
    ///
    /// Scope types missing from `options` have no candidates, so every tag typed for them is
    /// kept as free text.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidCatalog`] if any value is blank or two values of one scope
    /// type are equal ignoring case.
    pub fn from_options(options: BTreeMap<ScopeType, Vec<String>>) -> RuleResult<Self> {
        let mut cleaned = BTreeMap::new();
        for (scope_type, values) in options {
            let mut seen: Vec<String> = Vec::with_capacity(values.len());
            let mut kept = Vec::with_capacity(values.len());
            for value in values {
                let value = value.trim().to_string();
                if value.is_empty() {
                    return Err(RuleError::InvalidCatalog(format!(
                        "blank value for scope type {scope_type}"
                    )));
                }
                let folded = fold_case(&value);
                if seen.contains(&folded) {
                    return Err(RuleError::InvalidCatalog(format!(
                        "duplicate value '{value}' for scope type {scope_type}"
                    )));
                }
                seen.push(folded);
                kept.push(value);
            }
            cleaned.insert(scope_type, kept);
        }
        Ok(Self { options: cleaned })
    }

    /// Candidate values for `scope_type`, empty when none are configured.
    pub fn options(&self, scope_type: ScopeType) -> &[String] {
        self.options
            .get(&scope_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Candidate values for a scope type given by label.
    ///
    /// An unrecognised label yields an empty list rather than an error.
    pub fn options_for_label(&self, label: &str) -> &[String] {
        match ScopeType::from_label(label) {
            Some(t) => self.options(t),
            None => &[],
        }
    }

    /// Iterates configured scope types with their values.
    pub fn iter(&self) -> impl Iterator<Item = (ScopeType, &[String])> {
        self.options.iter().map(|(t, v)| (*t, v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_reads_labels_like_from_str() {
        let parsed: ScopeType = serde_json::from_str("\"billing codes\"").unwrap();
        assert_eq!(parsed, ScopeType::BillingCodes);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"Billing Codes\"");

        let err = serde_json::from_str::<ScopeType>("\"Zip Codes\"").unwrap_err();
        assert!(err.to_string().contains("Zip Codes"));
    }

    #[test]
    fn labels_round_trip_case_insensitively() {
        for t in ScopeType::ALL {
            assert_eq!(ScopeType::from_label(t.label()), Some(t));
            assert_eq!(ScopeType::from_label(&t.label().to_uppercase()), Some(t));
            assert_eq!(t.label().parse::<ScopeType>().unwrap(), t);
        }
        assert_eq!(ScopeType::from_label(" billing codes "), Some(ScopeType::BillingCodes));
        assert!(matches!(
            "Zip Codes".parse::<ScopeType>(),
            Err(RuleError::UnknownScopeType(_))
        ));
    }

    #[test]
    fn serde_uses_display_labels() {
        let json = serde_json::to_string(&ScopeType::BillingCodes).unwrap();
        assert_eq!(json, "\"Billing Codes\"");
        let back: ScopeType = serde_json::from_str("\"NPI\"").unwrap();
        assert_eq!(back, ScopeType::Npi);
    }

    #[test]
    fn families_partition_scope_types() {
        let contracts = ScopeFamily::Contracts.scope_types();
        let mrf = ScopeFamily::MrfSearch.scope_types();

        assert_eq!(contracts.len(), 10);
        assert_eq!(
            mrf,
            vec![
                ScopeType::State,
                ScopeType::BillingCode,
                ScopeType::Cbsa,
                ScopeType::Npi
            ]
        );
        assert!(ScopeFamily::Contracts.allows(ScopeType::States));
        assert!(!ScopeFamily::Contracts.allows(ScopeType::State));
    }

    #[test]
    fn builtin_catalog_covers_every_type_without_duplicates() {
        let catalog = OptionCatalog::builtin();
        for t in ScopeType::ALL {
            let values = catalog.options(t);
            assert!(!values.is_empty(), "{t} has no options");

            let mut folded: Vec<String> = values.iter().map(|v| fold_case(v)).collect();
            folded.sort();
            folded.dedup();
            assert_eq!(folded.len(), values.len(), "{t} has duplicate options");
        }
    }

    #[test]
    fn options_for_unknown_label_is_empty() {
        let catalog = OptionCatalog::builtin();
        assert!(catalog.options_for_label("Zip Codes").is_empty());
        assert_eq!(catalog.options_for_label("states")[2], "California");
    }

    #[test]
    fn from_options_rejects_case_insensitive_duplicates() {
        let mut options = BTreeMap::new();
        options.insert(
            ScopeType::States,
            vec!["Texas".to_string(), "TEXAS".to_string()],
        );
        let err = OptionCatalog::from_options(options).unwrap_err();
        assert!(matches!(err, RuleError::InvalidCatalog(msg) if msg.contains("TEXAS")));
    }

    #[test]
    fn from_options_leaves_missing_types_empty() {
        let mut options = BTreeMap::new();
        options.insert(ScopeType::States, vec![" Utah ".to_string()]);
        let catalog = OptionCatalog::from_options(options).unwrap();

        assert_eq!(catalog.options(ScopeType::States), ["Utah".to_string()]);
        assert!(catalog.options(ScopeType::Payers).is_empty());
    }
}
