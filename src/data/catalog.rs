//! Fixed country catalog and the DBnomics series behind each indicator.
//!
//! GDP growth comes from the IMF World Economic Outlook (April 2024 vintage),
//! trade balance as % of GDP from CEPII CHELEM.

use crate::domain::Indicator;
use crate::error::AppError;

const GDP_DATASET: &str = "IMF/WEO:2024-04";
const TRADE_DATASET: &str = "CEPII/CHELEM-TRADE-INDIC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Country {
    /// Display name, also the entity key in aligned series.
    pub name: &'static str,
    /// ISO 3166-1 alpha-3 code used in the series ids.
    pub iso3: &'static str,
}

pub const CATALOG: [Country; 6] = [
    Country { name: "USA", iso3: "USA" },
    Country { name: "China", iso3: "CHN" },
    Country { name: "Japan", iso3: "JPN" },
    Country { name: "UK", iso3: "GBR" },
    Country { name: "France", iso3: "FRA" },
    Country { name: "Germany", iso3: "DEU" },
];

impl Country {
    pub fn series_id(self, indicator: Indicator) -> String {
        match indicator {
            Indicator::GdpGrowth => format!("{GDP_DATASET}/{}.NGDP_RPCH.pcent_change", self.iso3),
            Indicator::TradeBalance => format!("{TRADE_DATASET}/{}.BALGDP.TOTAL.TTGS", self.iso3),
        }
    }
}

/// A data source listed by `gtb sources`.
#[derive(Debug, Clone, Copy)]
pub struct SourceInfo {
    pub indicator: Indicator,
    pub dataset: &'static str,
    pub url: &'static str,
}

pub const SOURCES: [SourceInfo; 2] = [
    SourceInfo {
        indicator: Indicator::GdpGrowth,
        dataset: GDP_DATASET,
        url: "https://db.nomics.world/IMF/WEO:2024-04?tab=list",
    },
    SourceInfo {
        indicator: Indicator::TradeBalance,
        dataset: TRADE_DATASET,
        url: "https://db.nomics.world/CEPII/CHELEM-TRADE-INDIC?tab=list",
    },
];

/// Resolve user-supplied names against the catalog.
///
/// Matching is case-insensitive; an empty selection means the whole catalog.
/// Repeated names are collapsed, keeping the first occurrence.
pub fn resolve(names: &[String]) -> Result<Vec<Country>, AppError> {
    if names.is_empty() {
        return Ok(CATALOG.to_vec());
    }

    let mut out: Vec<Country> = Vec::with_capacity(names.len());
    for raw in names {
        let name = raw.trim();
        let Some(country) = CATALOG.iter().find(|c| c.name.eq_ignore_ascii_case(name)) else {
            let valid: Vec<&str> = CATALOG.iter().map(|c| c.name).collect();
            return Err(AppError::new(
                2,
                format!("Unknown country '{name}'. Valid choices: {}.", valid.join(", ")),
            ));
        };
        if !out.contains(country) {
            out.push(*country);
        }
    }
    Ok(out)
}

/// `(entity, series_id)` pairs for one indicator, in the given order.
pub fn series_requests(countries: &[Country], indicator: Indicator) -> Vec<(String, String)> {
    countries
        .iter()
        .map(|c| (c.name.to_string(), c.series_id(indicator)))
        .collect()
}
