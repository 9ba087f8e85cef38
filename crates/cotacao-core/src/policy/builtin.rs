use crate::error::CotacaoError;
use crate::policy::schema::PolicyDef;
use crate::policy::validate_policy;

const MEAN_OF_OTHERS_JSON: &str = include_str!("../../../../policies/mean-of-others.json");
const MEDIAN_BAND_JSON: &str = include_str!("../../../../policies/median-band.json");
const IQR_JSON: &str = include_str!("../../../../policies/iqr.json");

/// Available predefined policies.
pub const PRESETS: &[&str] = &["mean-of-others", "median-band", "iqr"];

/// Policy used when the caller names none.
pub const DEFAULT_PRESET: &str = "mean-of-others";

/// Load a predefined policy by name.
pub fn load_preset(name: &str) -> Result<PolicyDef, CotacaoError> {
    let json = match name {
        "mean-of-others" => MEAN_OF_OTHERS_JSON,
        "median-band" => MEDIAN_BAND_JSON,
        "iqr" => IQR_JSON,
        _ => {
            return Err(CotacaoError::PolicyInvalid(format!(
                "unknown preset '{}'. Available: {}",
                name,
                PRESETS.join(", ")
            )))
        }
    };
    let policy: PolicyDef = serde_json::from_str(json)?;
    validate_policy(&policy)?;
    Ok(policy)
}

pub fn default_policy() -> Result<PolicyDef, CotacaoError> {
    load_preset(DEFAULT_PRESET)
}
