// src/clean/mod.rs
//
// Field cleaning and null imputation over the merged table. Every column
// named in the policy lists below comes out non-null with a normalized
// dtype; columns absent from the input surface as lookup errors.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

/// Fallback for dates that are missing or unparseable.
pub static PLACEHOLDER_DATE: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid placeholder date"));

const PLACEHOLDER_DATE_ISO: &str = "2024-03-01";

/// Sentinel for missing integer-coded date parts.
pub const MISSING_DATE_PART: i32 = -1;

/// High-null or redundant columns removed outright.
pub const DROP_COLUMNS: &[&str] = &[
    "organization",
    "title",
    "state",
    "residenceStateRegion",
    "Other groups",
    "Alternative conversion factor",
    "External debt Reporting status",
    "Latest industrial data",
    "Latest water withdrawal data",
];

/// Free-text date columns parsed as `%m/%d/%Y %H:%M`.
pub const DATE_COLUMNS: &[&str] = &["birthDate", "date"];

/// Integer-coded date parts.
pub const DATE_PART_COLUMNS: &[&str] = &["birthYear", "birthMonth", "birthDay"];

/// EdStats columns holding partial or garbled date text; only the first
/// 4-digit substring is trustworthy, and is read as a year.
pub const YEAR_TEXT_COLUMNS: &[&str] = &[
    "National accounts base year",
    "Latest population census",
    "Latest household survey",
    "Latest agricultural census",
];

/// Numeric columns; text-encoded ones carry `%`, thousands separators and
/// currency symbols that are stripped before the cast.
pub const NUMERIC_COLUMNS: &[&str] = &[
    "finalWorth",
    "age",
    "cpi_country",
    "cpi_change_country",
    "gdp_country",
    "gross_tertiary_education_enrollment",
    "gross_primary_education_enrollment_country",
    "life_expectancy_country",
    "tax_revenue_country_country",
    "total_tax_rate_country",
    "population_country",
    "latitude_country",
    "longitude_country",
];

/// Categorical descriptors; missing values become an explicit "Unknown"
/// category.
pub const CATEGORICAL_COLUMNS: &[&str] = &[
    "category",
    "country",
    "countryOfCitizenship",
    "city",
    "source",
    "industries",
    "status",
    "gender",
    "Region",
    "Income Group",
    "Currency Unit",
];

/// Free-text columns with bespoke fallback fills.
pub const TEXT_FILLS: &[(&str, &str)] = &[("lastName", "Unknown"), ("Special Notes", "None")];

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("valid year regex"));

/// Every column the cleaning pass guarantees to be non-null afterwards.
pub fn guaranteed_columns() -> impl Iterator<Item = &'static str> {
    DATE_COLUMNS
        .iter()
        .chain(DATE_PART_COLUMNS)
        .chain(YEAR_TEXT_COLUMNS)
        .chain(NUMERIC_COLUMNS)
        .chain(CATEGORICAL_COLUMNS)
        .copied()
        .chain(TEXT_FILLS.iter().map(|(name, _)| *name))
}

/// Drop the low-value columns, normalize dates and numeric text, and fill
/// every remaining gap per the fixed per-column policies.
///
/// Numeric gaps are imputed with each column's own mean. An earlier
/// revision filled every numeric column with the mean of `age`; that was
/// a bug and is intentionally not reproduced.
#[tracing::instrument(level = "debug", skip(df), fields(rows = df.height(), cols = df.width()))]
pub fn clean_and_prepare_df(df: DataFrame) -> PolarsResult<DataFrame> {
    let mut df = df.drop_many(DROP_COLUMNS.iter().copied());

    // Year-text columns are rebuilt eagerly; the regex extraction has no
    // tidy expression equivalent. CSV inference turns all-digit columns
    // into integers, so force text first.
    for &name in YEAR_TEXT_COLUMNS {
        let column = df.column(name)?;
        let text = if column.dtype() == &DataType::String {
            column.str()?.clone()
        } else {
            column.cast(&DataType::String)?.str()?.clone()
        };
        let parsed = year_text_to_date(&text)?;
        df.replace(name, parsed)?;
    }

    let mut exprs: Vec<Expr> = Vec::new();

    for &name in DATE_COLUMNS {
        exprs.push(
            col(name)
                .str()
                .to_date(StrptimeOptions {
                    format: Some("%m/%d/%Y %H:%M".into()),
                    strict: false,
                    exact: true,
                    cache: true,
                })
                .fill_null(lit(*PLACEHOLDER_DATE).cast(DataType::Date)),
        );
    }

    for &name in DATE_PART_COLUMNS {
        exprs.push(
            col(name)
                .cast(DataType::Int32)
                .fill_null(lit(MISSING_DATE_PART)),
        );
    }

    for &name in NUMERIC_COLUMNS {
        let numeric = if df.column(name)?.dtype() == &DataType::String {
            debug!(column = name, "stripping formatting from numeric text");
            col(name)
                .str()
                .replace_all(lit(r"[%$€£,\s]"), lit(""), false)
                .cast(DataType::Float64)
        } else {
            col(name).cast(DataType::Float64)
        };
        exprs.push(numeric.clone().fill_null(numeric.mean()));
    }

    for &name in CATEGORICAL_COLUMNS {
        exprs.push(
            col(name)
                .fill_null(lit("Unknown"))
                .cast(DataType::Categorical(None, CategoricalOrdering::Physical)),
        );
    }

    for &(name, fill) in TEXT_FILLS {
        exprs.push(col(name).fill_null(lit(fill)));
    }

    df.lazy().with_columns(exprs).collect()
}

/// Read the first 4-digit substring as a year and produce `year-01-01`;
/// anything without one, nulls included, becomes the placeholder date.
fn year_text_to_date(ca: &StringChunked) -> PolarsResult<Series> {
    let iso: StringChunked = ca.apply(|opt| {
        let year = opt.and_then(|v| YEAR_RE.find(v)).map(|m| m.as_str());
        Some(match year {
            Some(y) => Cow::Owned(format!("{y}-01-01")),
            None => Cow::Borrowed(PLACEHOLDER_DATE_ISO),
        })
    });
    Ok(iso.as_date(Some("%Y-%m-%d"), false)?.into_series())
}
