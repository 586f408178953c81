// src/merge/mod.rs
//
// Country reconciliation and the left joins that attach country-level
// indicator columns to each roster row.

use polars::prelude::*;
use tracing::debug;

use crate::countries::{
    apply_alias_map, CITIZENSHIP_TO_SOVEREIGN, COUNTRY_TO_SHORT_NAME, SHORT_NAME_TO_COUNTRY,
};

/// Helper key derived from `countryOfCitizenship` for the second join.
/// Dropped again before the merged table is returned.
const CITIZENSHIP_KEY: &str = "_citizenship_key";

/// Attach country indicators to every roster row.
///
/// With two tables, the roster's `country` column is normalized to the
/// indicator table's `Short Name` convention and left-joined on it.
///
/// With a third `country_stats` table, the indicator table's `Short Name`
/// is instead pulled back to the roster's convention via the inverse map,
/// joined, and then a second corrective map folds `countryOfCitizenship`
/// into sovereign-state names for a left join against `country_stats` on
/// its `Country` key.
///
/// Either way every roster row survives; rows without a match carry nulls
/// in the indicator columns.
#[tracing::instrument(level = "debug", skip_all, fields(rows = billionaires.height()))]
pub fn merge_billionaires_ed_stats(
    billionaires: &DataFrame,
    ed_stats_country: &DataFrame,
    country_stats: Option<&DataFrame>,
) -> PolarsResult<DataFrame> {
    match country_stats {
        None => merge_two(billionaires, ed_stats_country),
        Some(stats) => merge_three(billionaires, ed_stats_country, stats),
    }
}

fn merge_two(billionaires: &DataFrame, ed_stats_country: &DataFrame) -> PolarsResult<DataFrame> {
    let mut roster = billionaires.clone();
    let mapped = apply_alias_map(roster.column("country")?.str()?, &COUNTRY_TO_SHORT_NAME);
    roster.replace("country", mapped.into_series())?;

    let merged = roster.join(
        ed_stats_country,
        ["country"],
        ["Short Name"],
        JoinType::Left.into(),
        None,
    )?;
    debug!(
        rows = merged.height(),
        cols = merged.width(),
        "joined roster against ed-stats"
    );
    Ok(merged)
}

fn merge_three(
    billionaires: &DataFrame,
    ed_stats_country: &DataFrame,
    country_stats: &DataFrame,
) -> PolarsResult<DataFrame> {
    // Pull the indicator naming back to the roster's convention, so the
    // roster's `country` column is left untouched this time.
    let mut indicators = ed_stats_country.clone();
    let renamed = apply_alias_map(indicators.column("Short Name")?.str()?, &SHORT_NAME_TO_COUNTRY);
    indicators.replace("Short Name", renamed.into_series())?;

    let mut merged = billionaires.join(
        &indicators,
        ["country"],
        ["Short Name"],
        JoinType::Left.into(),
        None,
    )?;

    let key = apply_alias_map(
        merged.column("countryOfCitizenship")?.str()?,
        &CITIZENSHIP_TO_SOVEREIGN,
    )
    .into_series()
    .with_name(CITIZENSHIP_KEY.into());
    merged.with_column(key)?;

    let merged = merged.join(
        country_stats,
        [CITIZENSHIP_KEY],
        ["Country"],
        JoinType::Left.into(),
        None,
    )?;
    debug!(
        rows = merged.height(),
        cols = merged.width(),
        "joined roster against ed-stats and country stats"
    );
    merged.drop(CITIZENSHIP_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> DataFrame {
        df!(
            "personName" => ["Alice", "Bob", "Carol", "Dan"],
            "country" => [Some("Bahamas"), Some("Hong Kong"), Some("France"), None],
            "countryOfCitizenship" => [Some("Bahamas"), Some("Hong Kong"), Some("France"), Some("Atlantis")],
        )
        .unwrap()
    }

    fn ed_stats() -> DataFrame {
        df!(
            "Short Name" => ["The Bahamas", "Hong Kong SAR, China", "France", "Germany"],
            "Region" => ["Latin America & Caribbean", "East Asia & Pacific", "Europe & Central Asia", "Europe & Central Asia"],
            "Income Group" => ["High income", "High income", "High income", "High income"],
        )
        .unwrap()
    }

    fn country_stats() -> DataFrame {
        df!(
            "Country" => ["China", "France", "The Bahamas"],
            "gdp_rank" => [2i64, 7, 130],
        )
        .unwrap()
    }

    fn find_row(df: &DataFrame, who: &str) -> usize {
        df.column("personName")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .position(|v| v == Some(who))
            .expect("row present")
    }

    #[test]
    fn left_join_preserves_row_count() {
        let merged = merge_billionaires_ed_stats(&roster(), &ed_stats(), None).unwrap();
        assert_eq!(merged.height(), roster().height());
    }

    #[test]
    fn aliased_countries_pick_up_indicators() {
        let merged = merge_billionaires_ed_stats(&roster(), &ed_stats(), None).unwrap();
        let region = merged.column("Region").unwrap().str().unwrap().clone();

        let alice = find_row(&merged, "Alice");
        assert_eq!(region.get(alice), Some("Latin America & Caribbean"));
        let bob = find_row(&merged, "Bob");
        assert_eq!(region.get(bob), Some("East Asia & Pacific"));
    }

    #[test]
    fn unmatched_rows_carry_nulls() {
        let merged = merge_billionaires_ed_stats(&roster(), &ed_stats(), None).unwrap();
        let region = merged.column("Region").unwrap().str().unwrap().clone();
        let dan = find_row(&merged, "Dan");
        assert_eq!(region.get(dan), None);
    }

    #[test]
    fn three_table_variant_joins_both_sides() {
        let merged =
            merge_billionaires_ed_stats(&roster(), &ed_stats(), Some(&country_stats())).unwrap();
        assert_eq!(merged.height(), roster().height());

        // Indicator names were pulled back to the roster convention, so
        // "Hong Kong" matched without touching the roster column.
        let bob = find_row(&merged, "Bob");
        let region = merged.column("Region").unwrap().str().unwrap().clone();
        assert_eq!(region.get(bob), Some("East Asia & Pacific"));
        let country = merged.column("country").unwrap().str().unwrap().clone();
        assert_eq!(country.get(bob), Some("Hong Kong"));

        // Citizenship folded to the sovereign state for the second join.
        let rank = merged.column("gdp_rank").unwrap().i64().unwrap().clone();
        assert_eq!(rank.get(bob), Some(2));
        let carol = find_row(&merged, "Carol");
        assert_eq!(rank.get(carol), Some(7));
        let dan = find_row(&merged, "Dan");
        assert_eq!(rank.get(dan), None);
    }

    #[test]
    fn helper_key_is_dropped() {
        let merged =
            merge_billionaires_ed_stats(&roster(), &ed_stats(), Some(&country_stats())).unwrap();
        assert!(!merged
            .get_column_names()
            .iter()
            .any(|c| c.as_str() == CITIZENSHIP_KEY));
    }
}
