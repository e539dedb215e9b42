//! Region Processor Module
//! Filters snapshot tables down to Russian regions and extracts typed rows.

use polars::prelude::*;

/// Country whose sub-regions are tracked.
pub const TRACKED_COUNTRY: &str = "Russia";

/// One snapshot row with the columns this crate reads.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRow {
    pub province: Option<String>,
    pub country: String,
    pub confirmed: Option<i64>,
    pub deaths: Option<i64>,
    pub recovered: Option<i64>,
    pub last_update: Option<String>,
    pub combined_key: Option<String>,
}

/// Row selection and extraction shared by the checker and the charts.
pub struct RegionFilter;

impl RegionFilter {
    /// Rows of the tracked country that name a sub-region.
    pub fn russian_regions(df: &DataFrame) -> PolarsResult<DataFrame> {
        let province = col("Province_State").cast(DataType::String);
        df.clone()
            .lazy()
            .filter(
                col("Country_Region")
                    .cast(DataType::String)
                    .eq(lit(TRACKED_COUNTRY))
                    .and(province.clone().is_not_null())
                    .and(province.neq(lit(""))),
            )
            .collect()
    }

    /// All rows of one country, with or without a sub-region.
    pub fn country(df: &DataFrame, country: &str) -> PolarsResult<DataFrame> {
        df.clone()
            .lazy()
            .filter(col("Country_Region").cast(DataType::String).eq(lit(country)))
            .collect()
    }

    /// Extract typed rows. Counts that are missing, fractional or not numeric come back as `None`.
    pub fn rows(df: &DataFrame) -> PolarsResult<Vec<CaseRow>> {
        let provinces = Self::strings(df, "Province_State")?;
        let countries = Self::strings(df, "Country_Region")?;
        let confirmed = Self::counts(df, "Confirmed")?;
        let deaths = Self::counts(df, "Deaths")?;
        let recovered = Self::counts(df, "Recovered")?;
        let last_updates = Self::optional_strings(df, "Last_Update")?;
        let combined_keys = Self::optional_strings(df, "Combined_Key")?;

        let rows = (0..df.height())
            .map(|i| CaseRow {
                province: provinces[i].clone().filter(|p| !p.is_empty()),
                country: countries[i].clone().unwrap_or_default(),
                confirmed: confirmed[i],
                deaths: deaths[i],
                recovered: recovered[i],
                last_update: last_updates[i].clone(),
                combined_key: combined_keys[i].clone(),
            })
            .collect();
        Ok(rows)
    }

    fn strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
        let column = df.column(name)?.cast(&DataType::String)?;
        Ok(column
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.trim().to_string()))
            .collect())
    }

    fn optional_strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
        if df.get_column_index(name).is_some() {
            Self::strings(df, name)
        } else {
            Ok(vec![None; df.height()])
        }
    }

    /// Whole counts only: fractional values come back as `None`.
    fn counts(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
        let column = df.column(name)?;
        if column.dtype().is_float() {
            let values = column.cast(&DataType::Float64)?;
            return Ok(values
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| x.fract() == 0.0).map(|x| x as i64))
                .collect());
        }
        let column = column.cast(&DataType::Int64)?;
        Ok(column.i64()?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "Province_State" => [Some("Moscow"), None, Some("Altai Krai"), Some("Lombardia"), Some("")],
            "Country_Region" => ["Russia", "Russia", "Russia", "Italy", "Russia"],
            "Confirmed" => [Some(10i64), Some(12), None, Some(500), Some(1)],
            "Deaths" => [0i64, 0, 0, 20, 0],
            "Recovered" => [1i64, 1, 0, 40, 0],
        )
        .unwrap()
    }

    #[test]
    fn keeps_only_named_russian_regions() {
        let ru = RegionFilter::russian_regions(&sample()).unwrap();
        let rows = RegionFilter::rows(&ru).unwrap();
        let names: Vec<_> = rows.iter().filter_map(|r| r.province.clone()).collect();
        assert_eq!(names, ["Moscow", "Altai Krai"]);
    }

    #[test]
    fn country_keeps_rows_without_region() {
        let ru = RegionFilter::country(&sample(), "Russia").unwrap();
        assert_eq!(ru.height(), 4);
    }

    #[test]
    fn fractional_counts_are_none() {
        let df = df!(
            "Province_State" => ["Moscow", "Saint Petersburg"],
            "Country_Region" => ["Russia", "Russia"],
            "Confirmed" => [12.0f64, 3.9],
            "Deaths" => [0i64, 0],
            "Recovered" => [1i64, 0],
        )
        .unwrap();

        let rows = RegionFilter::rows(&df).unwrap();
        assert_eq!(rows[0].confirmed, Some(12));
        assert_eq!(rows[1].confirmed, None);
    }

    #[test]
    fn missing_counts_and_columns_are_none() {
        let rows = RegionFilter::rows(&sample()).unwrap();
        assert_eq!(rows[2].confirmed, None);
        assert_eq!(rows[0].confirmed, Some(10));
        assert!(rows.iter().all(|r| r.last_update.is_none()));
        assert_eq!(rows[4].province, None);
    }
}
