// src/countries/mod.rs
//
// Hand-curated alias maps reconciling country naming across the three
// sources. The roster, the EdStats country table and the per-country stats
// table each spell a handful of countries differently; everything not
// listed here already agrees.

use once_cell::sync::Lazy;
use polars::prelude::*;
use std::borrow::Cow;
use std::collections::HashMap;

/// Roster `country` → EdStats `Short Name`.
pub static COUNTRY_TO_SHORT_NAME: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Hong Kong", "Hong Kong SAR, China"),
        ("South Korea", "Korea"),
        ("Eswatini (Swaziland)", "Swaziland"),
        ("Bahamas", "The Bahamas"),
        ("British Virgin Islands", "Virgin Islands"),
        ("Guernsey", "Channel Islands"),
        ("Slovakia", "Slovak Republic"),
    ])
});

/// EdStats `Short Name` → roster `country`. Inverse of
/// [`COUNTRY_TO_SHORT_NAME`], used when the indicator table is pulled back
/// to the roster's naming convention instead.
pub static SHORT_NAME_TO_COUNTRY: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    COUNTRY_TO_SHORT_NAME
        .iter()
        .map(|(k, v)| (*v, *k))
        .collect()
});

/// Roster `countryOfCitizenship` → the `Country` key of the stats table.
/// Dependent territories fold into their sovereign state; the rest are
/// spelling fixes.
pub static CITIZENSHIP_TO_SOVEREIGN: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Hong Kong", "China"),
        ("Macau", "China"),
        ("Guernsey", "United Kingdom"),
        ("Jersey", "United Kingdom"),
        ("Isle of Man", "United Kingdom"),
        ("British Virgin Islands", "United Kingdom"),
        ("Cayman Islands", "United Kingdom"),
        ("Bermuda", "United Kingdom"),
        ("Gibraltar", "United Kingdom"),
        ("Czechia", "Czech Republic"),
        ("Eswatini (Swaziland)", "Eswatini"),
    ])
});

/// Map every value of `ca` through `aliases`. Unmapped values pass through
/// unchanged and nulls stay null.
pub fn apply_alias_map(
    ca: &StringChunked,
    aliases: &HashMap<&'static str, &'static str>,
) -> StringChunked {
    ca.apply(|opt| {
        opt.map(|v| match aliases.get(v) {
            Some(mapped) => Cow::Owned((*mapped).to_string()),
            None => Cow::Borrowed(v),
        })
    })
}
