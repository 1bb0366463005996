use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// The fixed set of home-service types. Each category selects an assistant
/// credential, a booking sheet range, and (for some) a price-list worksheet.
/// Immutable at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceCategory {
    #[serde(rename = "Aircon Cleaning")]
    AirconCleaning,
    #[serde(rename = "Aircon Installation")]
    AirconInstallation,
    #[serde(rename = "Aircon Troubleshooting")]
    AirconTroubleshooting,
    #[serde(rename = "Appliance Repair")]
    ApplianceRepair,
    #[serde(rename = "Curtain Making")]
    CurtainMaking,
    #[serde(rename = "Electrician & Wiring")]
    ElectricianWiring,
    #[serde(rename = "Home Cleaning")]
    HomeCleaning,
    #[serde(rename = "Laundry")]
    Laundry,
    #[serde(rename = "Locksmith")]
    Locksmith,
    #[serde(rename = "Others")]
    Others,
    #[serde(rename = "Plumbing")]
    Plumbing,
    #[serde(rename = "Pest Control")]
    PestControl,
    #[serde(rename = "Renovation")]
    Renovation,
    #[serde(rename = "Upholstery Cleaning")]
    UpholsteryCleaning,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 14] = [
        Self::AirconCleaning,
        Self::AirconInstallation,
        Self::AirconTroubleshooting,
        Self::ApplianceRepair,
        Self::CurtainMaking,
        Self::ElectricianWiring,
        Self::HomeCleaning,
        Self::Laundry,
        Self::Locksmith,
        Self::Others,
        Self::Plumbing,
        Self::PestControl,
        Self::Renovation,
        Self::UpholsteryCleaning,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::AirconCleaning => "Aircon Cleaning",
            Self::AirconInstallation => "Aircon Installation",
            Self::AirconTroubleshooting => "Aircon Troubleshooting",
            Self::ApplianceRepair => "Appliance Repair",
            Self::CurtainMaking => "Curtain Making",
            Self::ElectricianWiring => "Electrician & Wiring",
            Self::HomeCleaning => "Home Cleaning",
            Self::Laundry => "Laundry",
            Self::Locksmith => "Locksmith",
            Self::Others => "Others",
            Self::Plumbing => "Plumbing",
            Self::PestControl => "Pest Control",
            Self::Renovation => "Renovation",
            Self::UpholsteryCleaning => "Upholstery Cleaning",
        }
    }

    /// Environment variable that holds this category's assistant credential.
    pub fn assistant_env_key(&self) -> &'static str {
        match self {
            Self::AirconCleaning => "AIRCON_CLEANING_ASSISTANT_ID",
            Self::AirconInstallation => "AIRCON_INSTALLATION_ASSISTANT_ID",
            Self::AirconTroubleshooting => "AIRCON_TROUBLESHOOTING_ASSISTANT_ID",
            Self::ApplianceRepair => "APPLIANCE_REPAIR_ASSISTANT_ID",
            Self::CurtainMaking => "CURTAIN_MAKING_ASSISTANT_ID",
            Self::ElectricianWiring => "ELECTRICAL_ASSISTANT_ID",
            Self::HomeCleaning => "HOME_CLEANING_ASSISTANT_ID",
            Self::Laundry => "LAUNDRY_ASSISTANT_ID",
            Self::Locksmith => "LOCKSMITH_ASSISTANT_ID",
            Self::Others => "OTHERS_ASSISTANT_ID",
            Self::Plumbing => "PLUMBING_ASSISTANT_ID",
            Self::PestControl => "PEST_CONTROL_ASSISTANT_ID",
            Self::Renovation => "RENOVATION_ASSISTANT_ID",
            Self::UpholsteryCleaning => "UPHOLSTERY_CLEANING_ASSISTANT_ID",
        }
    }

    /// Key used for this category in the `[assistants]` config table.
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::AirconCleaning => "aircon_cleaning",
            Self::AirconInstallation => "aircon_installation",
            Self::AirconTroubleshooting => "aircon_troubleshooting",
            Self::ApplianceRepair => "appliance_repair",
            Self::CurtainMaking => "curtain_making",
            Self::ElectricianWiring => "electrician_wiring",
            Self::HomeCleaning => "home_cleaning",
            Self::Laundry => "laundry",
            Self::Locksmith => "locksmith",
            Self::Others => "others",
            Self::Plumbing => "plumbing",
            Self::PestControl => "pest_control",
            Self::Renovation => "renovation",
            Self::UpholsteryCleaning => "upholstery_cleaning",
        }
    }

    /// Worksheet title in the price-list spreadsheet, for categories with
    /// tabular rates. Categories priced ad hoc have none.
    pub fn price_worksheet(&self) -> Option<&'static str> {
        match self {
            Self::AirconCleaning => Some("Aircon Cleaning"),
            Self::ApplianceRepair => Some("Appliance Repair"),
            Self::HomeCleaning => Some("Home Cleaning"),
            Self::Laundry => Some("Laundry"),
            Self::PestControl => Some("Pest Control"),
            _ => None,
        }
    }
}

impl std::str::FromStr for ServiceCategory {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| {
                category.label().eq_ignore_ascii_case(trimmed)
                    || category.config_key().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| DomainError::UnknownCategory(trimmed.to_owned()))
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Chinese,
    Malay,
}

impl Language {
    /// Fixed message used to open a fresh conversation in this language.
    pub fn opening_prompt(&self) -> &'static str {
        match self {
            Self::English => "Hi. I'd like to book a service.",
            Self::Chinese => "您好，我想预定服务。",
            Self::Malay => "Hai, saya ingin menempah perkhidmatan.",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = DomainError;

    // Unknown selections fall back to English rather than failing the session.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim().to_ascii_lowercase().as_str() {
            "chinese" => Self::Chinese,
            "malay" => Self::Malay,
            _ => Self::English,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Language, ServiceCategory};

    #[test]
    fn every_category_has_distinct_label_and_env_key() {
        let mut labels: Vec<_> =
            ServiceCategory::ALL.iter().map(ServiceCategory::label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), ServiceCategory::ALL.len());

        let mut keys: Vec<_> =
            ServiceCategory::ALL.iter().map(ServiceCategory::assistant_env_key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ServiceCategory::ALL.len());
    }

    #[test]
    fn parses_display_label_and_config_key() {
        assert_eq!(
            "Electrician & Wiring".parse::<ServiceCategory>().unwrap(),
            ServiceCategory::ElectricianWiring
        );
        assert_eq!(
            "pest_control".parse::<ServiceCategory>().unwrap(),
            ServiceCategory::PestControl
        );
        assert!("Roof Repair".parse::<ServiceCategory>().is_err());
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let language: Language = "Klingon".parse().unwrap();
        assert_eq!(language, Language::English);
        assert_eq!(language.opening_prompt(), "Hi. I'd like to book a service.");
    }
}
