//! Licence codes to display metadata

use serde::Serialize;

/// Display metadata for a licence code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    pub code: String,
    pub label: String,
    /// Licence text, for known codes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<&'static str>,
    pub requires_attribution: bool,
    pub note: &'static str,
}

impl LicenseInfo {
    pub fn is_public_domain(&self) -> bool {
        self.code == "CC0"
    }
}

/// Resolve a licence code, case-insensitively.
///
/// Unknown codes are echoed back as their own label, with no link and
/// attribution assumed.
pub fn license_info(code: &str) -> LicenseInfo {
    let code = code.trim().to_uppercase();

    let known = |label: &str, href: &'static str, requires_attribution: bool, note: &'static str| {
        LicenseInfo {
            code: code.clone(),
            label: label.to_string(),
            href: Some(href),
            requires_attribution,
            note,
        }
    };

    match code.as_str() {
        "CC0" => known(
            "CC0 (Public Domain)",
            "https://creativecommons.org/publicdomain/zero/1.0/",
            false,
            "Attribution appreciated but not required.",
        ),
        "CC-BY" => known(
            "CC-BY 4.0",
            "https://creativecommons.org/licenses/by/4.0/",
            true,
            "Attribution required.",
        ),
        "CC-BY-NC" => known(
            "CC-BY-NC 4.0",
            "https://creativecommons.org/licenses/by-nc/4.0/",
            true,
            "Non-commercial use only; attribution required.",
        ),
        "OGL" => known(
            "OGL v3.0",
            "https://www.nationalarchives.gov.uk/doc/open-government-licence/version/3/",
            true,
            "Attribution required.",
        ),
        "" => LicenseInfo {
            code: "Unknown".to_string(),
            label: "Unknown licence".to_string(),
            href: None,
            requires_attribution: true,
            note: "",
        },
        _ => LicenseInfo {
            code: code.clone(),
            label: code.clone(),
            href: None,
            requires_attribution: true,
            note: "",
        },
    }
}
