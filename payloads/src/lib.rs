use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod api_client;
pub mod chat;
pub mod requests;
pub mod responses;

pub use api_client::{AssistantClient, ClientError, DirectoryClient};

/// Component counts below this many units are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 3;

/// Reserved district id meaning "no district filter applied".
pub const DISTRICT_ANY: &str = "-1";

/// Blood type selector value meaning "any type".
pub const BLOOD_TYPE_ALL: &str = "all";

/// A state as reported by the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub state_id: String,
    pub state_name: String,
    pub state_code: String,
}

/// A district, scoped to exactly one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub district_id: String,
    pub district_name: String,
    pub district_code: String,
    pub state_id: String,
}

/// One blood bank's reported inventory snapshot.
///
/// `blood_groups` maps raw component labels (e.g. "A+Ve") to unit counts.
/// The raw label is the map key everywhere; only display formatting strips
/// the "Ve" suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BloodStock {
    pub blood_bank_name: String,
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub units_available: Option<u32>,
    #[serde(default)]
    pub blood_groups: Option<BTreeMap<String, u32>>,
    pub address: String,
    pub contact: String,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl BloodStock {
    /// Sum of all component counts, 0 when the bank reported none.
    pub fn total_units(&self) -> u32 {
        self.blood_groups
            .as_ref()
            .map(|groups| groups.values().sum())
            .unwrap_or(0)
    }

    /// True when any single component is below [`LOW_STOCK_THRESHOLD`].
    pub fn has_low_stock(&self) -> bool {
        self.blood_groups
            .as_ref()
            .is_some_and(|groups| {
                groups.values().any(|qty| *qty < LOW_STOCK_THRESHOLD)
            })
    }
}

/// Normalize a raw component label for display: "A+Ve" becomes "A+".
///
/// The stored map key is never rewritten; this is formatting only.
pub fn display_blood_type(label: &str) -> String {
    label.strip_suffix("Ve").unwrap_or(label).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(groups: &[(&str, u32)]) -> BloodStock {
        BloodStock {
            blood_bank_name: "Test Bank".into(),
            address: "Somewhere".into(),
            contact: "000".into(),
            blood_groups: Some(
                groups
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn total_units_sums_components() {
        assert_eq!(stock(&[("O+Ve", 5), ("A+Ve", 2)]).total_units(), 7);
        assert_eq!(stock(&[]).total_units(), 0);
    }

    #[test]
    fn total_units_is_zero_without_groups() {
        let bare = BloodStock {
            blood_bank_name: "No Data Bank".into(),
            address: "Nowhere".into(),
            contact: "000".into(),
            ..Default::default()
        };
        assert_eq!(bare.total_units(), 0);
        assert!(!bare.has_low_stock());
    }

    #[test]
    fn low_stock_flags_any_component_below_threshold() {
        assert!(stock(&[("O+Ve", 10), ("B-Ve", 2)]).has_low_stock());
        assert!(!stock(&[("O+Ve", 3)]).has_low_stock());
    }

    #[test]
    fn display_labels_strip_the_ve_suffix() {
        assert_eq!(display_blood_type("A+Ve"), "A+");
        assert_eq!(display_blood_type("AB-Ve"), "AB-");
        assert_eq!(display_blood_type("O+"), "O+");
    }

    #[test]
    fn stock_deserializes_camel_case_wire_shape() {
        let json = r#"{
            "bloodBankName": "Apollo Blood Center",
            "address": "Apollo Hospital, Sector 5",
            "contact": "011-1234",
            "bloodGroups": {"A+Ve": 4, "O+Ve": 1},
            "distance": 2.5
        }"#;
        let stock: BloodStock = serde_json::from_str(json).unwrap();
        assert_eq!(stock.blood_bank_name, "Apollo Blood Center");
        assert_eq!(stock.total_units(), 5);
        assert!(stock.has_low_stock());
        assert_eq!(stock.latitude, None);
    }
}
