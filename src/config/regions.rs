//! Region naming: the display form shown to users, the ARM location used by
//! the compute API, and the pricing region used in the rate card.

/// (display name, ARM location, pricing region)
static REGIONS: &[(&str, &str, &str)] = &[
    ("East Asia", "eastasia", "AP East"),
    ("Southeast Asia", "southeastasia", "AP Southeast"),
    ("Australia East", "australiaeast", "AU East"),
    ("Australia Southeast", "australiasoutheast", "AU Southeast"),
    ("Brazil South", "brazilsouth", "BR South"),
    ("Canada Central", "canadacentral", "CA Central"),
    ("Canada East", "canadaeast", "CA East"),
    ("North Europe", "northeurope", "EU North"),
    ("West Europe", "westeurope", "EU West"),
    ("Central India", "centralindia", "IN Central"),
    ("South India", "southindia", "IN South"),
    ("West India", "westindia", "IN West"),
    ("Japan East", "japaneast", "JA East"),
    ("Japan West", "japanwest", "JA West"),
    ("Korea Central", "koreacentral", "KR Central"),
    ("Korea South", "koreasouth", "KR South"),
    ("UK South", "uksouth", "UK South"),
    ("UK West", "ukwest", "UK West"),
    ("Central US", "centralus", "US Central"),
    ("East US", "eastus", "US East"),
    ("East US 2", "eastus2", "US East 2"),
    ("North Central US", "northcentralus", "US North Central"),
    ("South Central US", "southcentralus", "US South Central"),
    ("West US", "westus", "US West"),
    ("West US 2", "westus2", "US West 2"),
    ("West Central US", "westcentralus", "US West Central"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub display: &'static str,
    pub location: &'static str,
    pub pricing: &'static str,
}

/// Look a region up by any of its three names, ignoring case.
pub fn lookup(name: &str) -> Option<Region> {
    let name = name.trim();
    REGIONS
        .iter()
        .find(|(d, l, p)| {
            d.eq_ignore_ascii_case(name) || l.eq_ignore_ascii_case(name) || p.eq_ignore_ascii_case(name)
        })
        .map(|&(display, location, pricing)| Region {
            display,
            location,
            pricing,
        })
}

pub fn display_names() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().map(|(d, _, _)| *d)
}
