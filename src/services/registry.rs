// src/services/registry.rs
use log::debug;

use crate::error::{ProjectionError, Result};
use crate::models::{Frequency, SeriesRef, Units};

macro_rules! series {
    ($name:literal, $code:literal, $freq:ident, $units:ident, $desc:literal) => {
        SeriesRef {
            canonical_name: $name,
            source_code: $code,
            frequency: Frequency::$freq,
            units: Units::$units,
            description: $desc,
        }
    };
}

/// Every series the dashboard knows about, keyed by canonical name.
static SERIES: [SeriesRef; 28] = [
    // Balance sheet and liabilities
    series!("fed_total_assets", "WALCL", Weekly, MillionsUsd, "Fed total assets"),
    series!("fed_treasury_holdings", "TREAST", Weekly, MillionsUsd, "Treasury securities held outright"),
    series!("fed_mbs_holdings", "WSHOMCB", Weekly, MillionsUsd, "Mortgage-backed securities held outright"),
    series!("bank_reserves", "TOTRESNS", Monthly, BillionsUsd, "Total reserves of depository institutions"),
    series!("reserve_balances", "WRESBAL", Weekly, BillionsUsd, "Reserve balances with Federal Reserve Banks"),
    series!("overnight_reverse_repo", "RRPONTSYD", Daily, BillionsUsd, "Overnight reverse repurchase agreements"),
    series!("treasury_general_account", "WTREGEN", Weekly, MillionsUsd, "Treasury General Account"),
    series!("monetary_base", "BOGMBASE", Monthly, BillionsUsd, "Monetary base"),
    series!("m2_money_supply", "M2SL", Monthly, BillionsUsd, "M2 money stock"),
    // Policy and money-market rates
    series!("fed_funds_rate", "FEDFUNDS", Monthly, Percent, "Effective federal funds rate, monthly"),
    series!("fed_funds_daily", "DFF", Daily, Percent, "Effective federal funds rate, daily"),
    series!("interest_on_reserves", "IORB", Daily, Percent, "Interest rate on reserve balances"),
    series!("sofr", "SOFR", Daily, Percent, "Secured overnight financing rate"),
    // Treasury curve and inflation expectations
    series!("treasury_2y", "DGS2", Daily, Percent, "2-year Treasury constant maturity"),
    series!("treasury_10y", "DGS10", Daily, Percent, "10-year Treasury constant maturity"),
    series!("treasury_30y", "DGS30", Daily, Percent, "30-year Treasury constant maturity"),
    series!("tips_10y", "DFII10", Daily, Percent, "10-year TIPS yield"),
    series!("breakeven_10y", "T10YIE", Daily, Percent, "10-year breakeven inflation"),
    series!("breakeven_5y", "T5YIE", Daily, Percent, "5-year breakeven inflation"),
    // Credit, housing and risk assets
    series!("mortgage_30y", "MORTGAGE30US", Weekly, Percent, "30-year fixed mortgage average"),
    series!("corporate_spread", "BAMLC0A0CM", Daily, Percent, "ICE BofA US corporate OAS"),
    series!("sp500", "SP500", Daily, Index, "S&P 500 index"),
    series!("vix", "VIXCLS", Daily, Index, "CBOE volatility index"),
    series!("dollar_broad", "DTWEXBGS", Daily, Index, "Nominal broad dollar index"),
    series!("financial_conditions", "NFCI", Weekly, Index, "Chicago Fed national financial conditions"),
    // Macro
    series!("cpi", "CPIAUCSL", Monthly, Index, "Consumer price index, all urban"),
    series!("unemployment_rate", "UNRATE", Monthly, Percent, "Civilian unemployment rate"),
    series!("nominal_gdp", "GDP", Quarterly, BillionsUsd, "Gross domestic product"),
];

pub fn all() -> &'static [SeriesRef] {
    &SERIES
}

pub fn lookup(canonical_name: &str) -> Result<&'static SeriesRef> {
    debug!("Looking up series {}", canonical_name);
    SERIES
        .iter()
        .find(|s| s.canonical_name == canonical_name)
        .ok_or_else(|| ProjectionError::UnknownSeries(canonical_name.to_string()))
}

/// Reverse lookup by the data source's identifier (e.g. "WALCL").
pub fn lookup_code(source_code: &str) -> Result<&'static SeriesRef> {
    SERIES
        .iter()
        .find(|s| s.source_code.eq_ignore_ascii_case(source_code))
        .ok_or_else(|| ProjectionError::UnknownSeries(source_code.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn finds_known_series() {
        let s = lookup("fed_total_assets").unwrap();
        assert_eq!(s.source_code, "WALCL");
        assert_eq!(s.frequency, Frequency::Weekly);
        assert_eq!(lookup("treasury_10y").unwrap().source_code, "DGS10");
    }

    #[test]
    fn unknown_name_fails() {
        assert_eq!(
            lookup("NOT_A_SERIES"),
            Err(ProjectionError::UnknownSeries("NOT_A_SERIES".into()))
        );
    }

    #[test]
    fn codes_and_names_are_unique() {
        let names: HashSet<_> = all().iter().map(|s| s.canonical_name).collect();
        let codes: HashSet<_> = all().iter().map(|s| s.source_code).collect();
        assert_eq!(names.len(), all().len());
        assert_eq!(codes.len(), all().len());
    }

    #[test]
    fn reverse_lookup_ignores_case() {
        assert_eq!(lookup_code("m2sl").unwrap().canonical_name, "m2_money_supply");
        assert!(lookup_code("XYZ").is_err());
    }
}
