//! Pétala (business vertical) identity and detection
//!
//! Exactly one vertical is active per session. Detection tries, in order:
//!
//! | Step | Signal | Example |
//! |------|--------|---------|
//! | 1 | Subdomain in [`SUBDOMAIN_TABLE`] | `fashion.magicsaas.com` |
//! | 2 | Path prefix `/petalas/<type>/` | `/petalas/restaurant/menu` |
//! | 3 | Custom-domain table | `shop.acme.com` -> `retail` |
//! | 4 | `<meta name="magicsaas:petala">` | `content="beauty"` |
//! | 5 | Default vertical | `fashion` |

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::environment::subdomain;

/// Path segment under which every vertical is mounted
pub const PETALAS_PREFIX: &str = "/petalas";

/// Meta tag consulted when hostname and path carry no vertical
pub const PETALA_META_TAG: &str = "magicsaas:petala";

/// Fixed enumeration of verticals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PetalaType {
    Fashion,
    Restaurant,
    Healthcare,
    RealEstate,
    Education,
    Fitness,
    Beauty,
    Legal,
    Automotive,
    Hospitality,
    Events,
    Retail,
    Travel,
}

impl PetalaType {
    /// Every vertical, in declaration order
    pub const ALL: [PetalaType; 13] = [
        Self::Fashion,
        Self::Restaurant,
        Self::Healthcare,
        Self::RealEstate,
        Self::Education,
        Self::Fitness,
        Self::Beauty,
        Self::Legal,
        Self::Automotive,
        Self::Hospitality,
        Self::Events,
        Self::Retail,
        Self::Travel,
    ];

    /// URL slug, also the `X-Petala-Type` header value
    pub fn slug(self) -> &'static str {
        match self {
            Self::Fashion => "fashion",
            Self::Restaurant => "restaurant",
            Self::Healthcare => "healthcare",
            Self::RealEstate => "real-estate",
            Self::Education => "education",
            Self::Fitness => "fitness",
            Self::Beauty => "beauty",
            Self::Legal => "legal",
            Self::Automotive => "automotive",
            Self::Hospitality => "hospitality",
            Self::Events => "events",
            Self::Retail => "retail",
            Self::Travel => "travel",
        }
    }

    /// Human-readable name, also the `X-Petala-Name` header value
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Fashion => "Fashion",
            Self::Restaurant => "Restaurant",
            Self::Healthcare => "Healthcare",
            Self::RealEstate => "Real Estate",
            Self::Education => "Education",
            Self::Fitness => "Fitness",
            Self::Beauty => "Beauty",
            Self::Legal => "Legal",
            Self::Automotive => "Automotive",
            Self::Hospitality => "Hospitality",
            Self::Events => "Events",
            Self::Retail => "Retail",
            Self::Travel => "Travel",
        }
    }

    /// `/petalas/<slug>`
    pub fn base_path(self) -> String {
        format!("{PETALAS_PREFIX}/{}", self.slug())
    }

    /// Look up a subdomain label in [`SUBDOMAIN_TABLE`]
    pub fn from_subdomain(label: &str) -> Option<Self> {
        let label = label.to_ascii_lowercase();
        SUBDOMAIN_TABLE
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, petala)| *petala)
    }
}

impl fmt::Display for PetalaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for PetalaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.slug() == wanted)
            .ok_or_else(|| format!("unknown petala type: {s}"))
    }
}

/// Subdomain label -> vertical
pub const SUBDOMAIN_TABLE: &[(&str, PetalaType)] = &[
    ("fashion", PetalaType::Fashion),
    ("moda", PetalaType::Fashion),
    ("restaurant", PetalaType::Restaurant),
    ("restaurante", PetalaType::Restaurant),
    ("food", PetalaType::Restaurant),
    ("healthcare", PetalaType::Healthcare),
    ("health", PetalaType::Healthcare),
    ("saude", PetalaType::Healthcare),
    ("clinic", PetalaType::Healthcare),
    ("real-estate", PetalaType::RealEstate),
    ("realestate", PetalaType::RealEstate),
    ("imoveis", PetalaType::RealEstate),
    ("education", PetalaType::Education),
    ("edu", PetalaType::Education),
    ("escola", PetalaType::Education),
    ("fitness", PetalaType::Fitness),
    ("gym", PetalaType::Fitness),
    ("academia", PetalaType::Fitness),
    ("beauty", PetalaType::Beauty),
    ("beleza", PetalaType::Beauty),
    ("salon", PetalaType::Beauty),
    ("legal", PetalaType::Legal),
    ("law", PetalaType::Legal),
    ("advocacia", PetalaType::Legal),
    ("automotive", PetalaType::Automotive),
    ("auto", PetalaType::Automotive),
    ("hospitality", PetalaType::Hospitality),
    ("hotel", PetalaType::Hospitality),
    ("events", PetalaType::Events),
    ("eventos", PetalaType::Events),
    ("retail", PetalaType::Retail),
    ("loja", PetalaType::Retail),
    ("shop", PetalaType::Retail),
    ("travel", PetalaType::Travel),
    ("viagens", PetalaType::Travel),
    ("turismo", PetalaType::Travel),
];

/// Which signal selected the active vertical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PetalaSource {
    Subdomain,
    PathPrefix,
    CustomDomain,
    MetaTag,
    ServerOverride,
    Default,
}

/// The active vertical
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetalaIdentity {
    pub name: String,
    #[serde(rename = "type")]
    pub petala_type: PetalaType,
    pub base_path: String,
    pub detected_by: PetalaSource,
}

impl PetalaIdentity {
    pub fn new(petala_type: PetalaType, detected_by: PetalaSource) -> Self {
        Self {
            name: petala_type.display_name().to_string(),
            petala_type,
            base_path: petala_type.base_path(),
            detected_by,
        }
    }
}

/// Signals available to [`detect_petala`]
#[derive(Debug, Clone, Copy)]
pub struct PetalaSignals<'a> {
    pub hostname: &'a str,
    pub pathname: &'a str,
    pub meta_tag: Option<&'a str>,
}

/// Resolve the active vertical; the first matching signal wins.
pub fn detect_petala(
    signals: PetalaSignals<'_>,
    custom_domains: &HashMap<String, PetalaType>,
    fallback: PetalaType,
) -> PetalaIdentity {
    if let Some(petala) = subdomain(signals.hostname)
        .as_deref()
        .and_then(PetalaType::from_subdomain)
    {
        return PetalaIdentity::new(petala, PetalaSource::Subdomain);
    }

    if let Some(petala) = petala_from_path(signals.pathname) {
        return PetalaIdentity::new(petala, PetalaSource::PathPrefix);
    }

    let host = signals.hostname.trim().to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if let Some(petala) = custom_domains.get(host) {
        return PetalaIdentity::new(*petala, PetalaSource::CustomDomain);
    }

    if let Some(petala) = signals.meta_tag.and_then(|m| m.parse().ok()) {
        return PetalaIdentity::new(petala, PetalaSource::MetaTag);
    }

    PetalaIdentity::new(fallback, PetalaSource::Default)
}

/// `/petalas/<slug>` or `/petalas/<slug>/...`
fn petala_from_path(pathname: &str) -> Option<PetalaType> {
    let rest = pathname.strip_prefix(PETALAS_PREFIX)?.strip_prefix('/')?;
    let slug = rest.split(['/', '?', '#']).next()?;
    slug.parse().ok()
}
