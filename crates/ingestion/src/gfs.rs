//! GFS 1° surface fields over OPeNDAP ASCII.
//!
//! A request names one variable and one forecast step of one model cycle:
//!
//! ```text
//! {base}/gfs20240115/gfs_1p00_12z.ascii?tmp2m[1:1:1][0:1:179][0:1:359]
//! ```
//!
//! The response is a header line `tmp2m, [1][180][360]`, one line per
//! latitude row (`[0][j], v0, v1, ...`), then coordinate blocks
//! (`tmp2m.lat, [180]` followed by the values, likewise for `lon`).
//!
//! Cycles are published with a delay, so acquisition starts from the most
//! recent 6-hour cycle and steps back one cycle at a time until both fields
//! load or the lookback window is exhausted.

use crate::config::{GfsConfig, GFS_CYCLE_HOURS};
use crate::error::{IngestionError, Result};
use crate::fetch::{HttpFetcher, TextFetcher};
use crate::source::GridSource;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};
use geo_common::{GeoError, GridSample, GridSampleSet, PRESSURE, TEMPERATURE};
use std::time::Duration as StdDuration;
use tracing::{debug, info, instrument, warn};

/// Kelvin to Celsius offset.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Pascal to standard atmosphere factor.
pub const PASCAL_TO_ATM: f64 = 9.868e-6;

/// Magnitudes at or above this are OPeNDAP fill values.
pub const FILL_THRESHOLD: f64 = 1e20;

/// One model run plus the forecast step to read from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GfsCycle {
    pub run: DateTime<Utc>,
    /// 0 for the analysis, 1 for the first forecast hour.
    pub forecast_index: u32,
}

impl GfsCycle {
    /// The newest cycle at or before `now`.
    ///
    /// More than 3 hours into a cycle, the first forecast step is closer to
    /// `now` than the analysis, so it is read instead.
    pub fn latest(now: DateTime<Utc>) -> Self {
        let offset = now.hour() % GFS_CYCLE_HOURS;
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        Self {
            run: midnight + Duration::hours(i64::from(now.hour() - offset)),
            forecast_index: u32::from(offset > 3),
        }
    }

    /// The cycle before this one, reading the same forecast step.
    pub fn previous(&self) -> Self {
        Self {
            run: self.run - Duration::hours(i64::from(GFS_CYCLE_HOURS)),
            forecast_index: self.forecast_index,
        }
    }

    /// Display label, e.g. `2024-01-15 12z`.
    pub fn label(&self) -> String {
        self.run.format("%Y-%m-%d %Hz").to_string()
    }

    pub fn dataset_url(&self, base_url: &str) -> String {
        format!(
            "{}/gfs{}/gfs_1p00_{}z",
            base_url.trim_end_matches('/'),
            self.run.format("%Y%m%d"),
            self.run.format("%H")
        )
    }

    /// ASCII query for one variable over a `rows × cols` grid.
    pub fn query_url(&self, base_url: &str, variable: &str, rows: usize, cols: usize) -> String {
        let i = self.forecast_index;
        format!(
            "{}.ascii?{}[{}:1:{}][0:1:{}][0:1:{}]",
            self.dataset_url(base_url),
            variable,
            i,
            i,
            rows.saturating_sub(1),
            cols.saturating_sub(1)
        )
    }
}

/// One variable parsed from an OPeNDAP ASCII response.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    pub variable: String,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    /// `rows[j][i]` is the value at `latitudes[j]`, `longitudes[i]`.
    pub rows: Vec<Vec<f64>>,
}

fn parse_err(msg: impl Into<String>) -> IngestionError {
    IngestionError::AsciiParse(msg.into())
}

fn parse_values<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<Vec<f64>> {
    tokens
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f64>()
                .map_err(|_| parse_err(format!("invalid number '{}'", t)))
        })
        .collect()
}

/// Numbers inside brackets, e.g. `[1][180][360]` → `[1, 180, 360]`.
fn bracket_indices(s: &str) -> Result<Vec<usize>> {
    s.split(|c| c == '[' || c == ']')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<usize>()
                .map_err(|_| parse_err(format!("invalid index '{}' in '{}'", t, s)))
        })
        .collect()
}

fn coordinate_block(lines: &[&str], name: &str) -> Result<Vec<f64>> {
    let pos = lines
        .iter()
        .position(|l| l.split(',').next().map(str::trim) == Some(name))
        .ok_or_else(|| parse_err(format!("missing coordinate block '{}'", name)))?;
    let values = lines
        .get(pos + 1)
        .ok_or_else(|| parse_err(format!("coordinate block '{}' has no values", name)))?;
    parse_values(values.split(','))
}

/// Parse a single-variable OPeNDAP ASCII response.
pub fn parse_ascii(text: &str) -> Result<AsciiGrid> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let header = lines.first().ok_or_else(|| parse_err("empty response"))?;
    let (variable, dims) = header
        .split_once(',')
        .ok_or_else(|| parse_err(format!("malformed header '{}'", header)))?;
    let variable = variable.trim().to_string();
    let dims = bracket_indices(dims)?;
    if dims.len() < 2 {
        return Err(parse_err(format!("expected at least 2 dimensions, got {:?}", dims)));
    }
    let (n_rows, n_cols) = (dims[dims.len() - 2], dims[dims.len() - 1]);

    let mut rows = Vec::with_capacity(n_rows);
    for line in lines[1..].iter().take_while(|l| l.starts_with('[')) {
        let mut tokens = line.split(',');
        let label = tokens.next().unwrap_or_default();
        let j = bracket_indices(label)?
            .last()
            .copied()
            .ok_or_else(|| parse_err(format!("row label '{}' has no index", label)))?;
        if j != rows.len() {
            return Err(parse_err(format!("row {} out of order (expected {})", j, rows.len())));
        }
        rows.push(parse_values(tokens)?);
    }

    let latitudes = coordinate_block(&lines, &format!("{}.lat", variable))?;
    let longitudes = coordinate_block(&lines, &format!("{}.lon", variable))?;

    if rows.len() != n_rows || latitudes.len() != n_rows {
        return Err(parse_err(format!(
            "{}: header declares {} rows, got {} data rows and {} latitudes",
            variable,
            n_rows,
            rows.len(),
            latitudes.len()
        )));
    }
    if longitudes.len() != n_cols {
        return Err(parse_err(format!(
            "{}: header declares {} columns, got {} longitudes",
            variable,
            n_cols,
            longitudes.len()
        )));
    }
    if let Some((j, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        return Err(parse_err(format!(
            "{}: row {} has {} values, expected {}",
            variable,
            j,
            row.len(),
            n_cols
        )));
    }

    Ok(AsciiGrid {
        variable,
        latitudes,
        longitudes,
        rows,
    })
}

fn is_fill(v: f64) -> bool {
    !v.is_finite() || v.abs() >= FILL_THRESHOLD
}

/// Combine temperature (K) and pressure (Pa) grids into a sample set in
/// °C and atm. Fill values leave the variable unset; a cell with neither
/// variable is dropped, which makes the set incomplete.
pub fn build_sample_set(
    timestamp: &str,
    temperature: &AsciiGrid,
    pressure: &AsciiGrid,
) -> Result<GridSampleSet> {
    if temperature.latitudes != pressure.latitudes || temperature.longitudes != pressure.longitudes {
        return Err(parse_err(format!(
            "{} and {} are on different grids",
            temperature.variable, pressure.variable
        )));
    }

    let mut samples = Vec::with_capacity(temperature.latitudes.len() * temperature.longitudes.len());
    let mut filled = 0usize;
    let mut dropped = 0usize;
    for (j, &lat) in temperature.latitudes.iter().enumerate() {
        for (i, &lon) in temperature.longitudes.iter().enumerate() {
            let mut sample = GridSample::new(lat, lon);
            let t = temperature.rows[j][i];
            let p = pressure.rows[j][i];
            if !is_fill(t) {
                sample = sample.with_value(TEMPERATURE, t - KELVIN_OFFSET);
            }
            if !is_fill(p) {
                sample = sample.with_value(PRESSURE, p * PASCAL_TO_ATM);
            }
            if is_fill(t) || is_fill(p) {
                filled += 1;
            }
            if sample.values.is_empty() {
                dropped += 1;
            } else {
                samples.push(sample);
            }
        }
    }
    if filled > 0 {
        debug!(filled = filled, dropped = dropped, "Cells with fill values");
    }
    if dropped > 0 {
        return Err(GeoError::data_incomplete(format!(
            "{} of {} cells hold only fill values",
            dropped,
            temperature.latitudes.len() * temperature.longitudes.len()
        ))
        .into());
    }

    let set = GridSampleSet::new(timestamp, samples)?;
    set.ensure_complete()?;
    Ok(set)
}

/// Acquires the newest available GFS temperature/pressure snapshot.
pub struct GfsGridSource<F: TextFetcher = HttpFetcher> {
    fetcher: F,
    config: GfsConfig,
}

impl GfsGridSource<HttpFetcher> {
    pub fn new(config: GfsConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(StdDuration::from_secs(config.request_timeout_secs))?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: TextFetcher> GfsGridSource<F> {
    pub fn with_fetcher(config: GfsConfig, fetcher: F) -> Result<Self> {
        config.validate()?;
        Ok(Self { fetcher, config })
    }

    pub fn config(&self) -> &GfsConfig {
        &self.config
    }

    /// Full request URL for one variable of a cycle, proxy included.
    pub fn request_url(&self, cycle: &GfsCycle, variable: &str) -> String {
        let url = cycle.query_url(&self.config.base_url, variable, self.config.rows, self.config.cols);
        match &self.config.proxy_url {
            Some(proxy) => format!("{}{}", proxy, url),
            None => url,
        }
    }

    async fn load_cycle(&self, cycle: &GfsCycle) -> Result<GridSampleSet> {
        let temp_url = self.request_url(cycle, &self.config.temperature_var);
        let pres_url = self.request_url(cycle, &self.config.pressure_var);

        info!(url = %temp_url, "Fetching GFS temperature");
        let temp_text = self.fetcher.fetch(&temp_url).await?;
        debug!(url = %pres_url, "Fetching GFS pressure");
        let pres_text = self.fetcher.fetch(&pres_url).await?;

        let temperature = parse_ascii(&temp_text)?;
        let pressure = parse_ascii(&pres_text)?;
        build_sample_set(&cycle.label(), &temperature, &pressure)
    }

    /// Walk back from the cycle current at `now` until one loads.
    #[instrument(skip(self), fields(lookback_hours = self.config.lookback_hours))]
    pub async fn acquire_at(&self, now: DateTime<Utc>) -> Result<GridSampleSet> {
        let attempts = self.config.attempts();
        let mut cycle = GfsCycle::latest(now);

        for attempt in 1..=attempts {
            match self.load_cycle(&cycle).await {
                Ok(set) => {
                    info!(
                        cycle = %cycle.label(),
                        forecast_index = cycle.forecast_index,
                        samples = set.len(),
                        attempt = attempt,
                        "Loaded GFS snapshot"
                    );
                    return Ok(set);
                }
                Err(e) => {
                    warn!(cycle = %cycle.label(), attempt = attempt, error = %e, "No GFS data for cycle");
                    cycle = cycle.previous();
                }
            }
        }

        Err(IngestionError::NoDataInWindow {
            hours: self.config.lookback_hours,
            attempts,
        })
    }
}

#[async_trait]
impl<F: TextFetcher> GridSource for GfsGridSource<F> {
    async fn acquire(&self) -> Result<GridSampleSet> {
        self.acquire_at(Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_utils::opendap_ascii;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_latest_cycle_rounds_down() {
        let cycle = GfsCycle::latest(at(2024, 1, 15, 14, 30));
        assert_eq!(cycle.run, at(2024, 1, 15, 12, 0));
        assert_eq!(cycle.forecast_index, 0);
    }

    #[test]
    fn test_late_in_cycle_uses_first_forecast_step() {
        let cycle = GfsCycle::latest(at(2024, 1, 15, 16, 5));
        assert_eq!(cycle.run, at(2024, 1, 15, 12, 0));
        assert_eq!(cycle.forecast_index, 1);
        assert_eq!(GfsCycle::latest(at(2024, 1, 15, 15, 59)).forecast_index, 0);
    }

    #[test]
    fn test_previous_crosses_midnight() {
        let cycle = GfsCycle::latest(at(2024, 3, 1, 2, 0)).previous();
        assert_eq!(cycle.run, at(2024, 2, 29, 18, 0));
        assert_eq!(cycle.label(), "2024-02-29 18z");
    }

    #[test]
    fn test_query_url() {
        let cycle = GfsCycle::latest(at(2024, 1, 5, 10, 0));
        assert_eq!(
            cycle.query_url("https://nomads.ncep.noaa.gov/dods/gfs_1p00/", "tmp2m", 180, 360),
            "https://nomads.ncep.noaa.gov/dods/gfs_1p00/gfs20240105/gfs_1p00_06z.ascii?tmp2m[1:1:1][0:1:179][0:1:359]"
        );
    }

    #[test]
    fn test_parse_ascii() {
        let text = opendap_ascii("tmp2m", &[-90.0, 0.0], &[0.0, 120.0, 240.0], |lat, lon| {
            280.0 + lat / 10.0 + lon / 120.0
        });
        let grid = parse_ascii(&text).unwrap();
        assert_eq!(grid.variable, "tmp2m");
        assert_eq!(grid.latitudes, vec![-90.0, 0.0]);
        assert_eq!(grid.longitudes, vec![0.0, 120.0, 240.0]);
        assert_eq!(grid.rows[0], vec![271.0, 272.0, 273.0]);
        assert_eq!(grid.rows[1], vec![280.0, 281.0, 282.0]);
    }

    #[test]
    fn test_parse_ascii_rejects_short_row() {
        let text = "tmp2m, [1][1][3]\n[0][0], 1.0, 2.0\n\ntmp2m.lat, [1]\n0.0\ntmp2m.lon, [3]\n0.0, 1.0, 2.0\n";
        assert!(matches!(parse_ascii(text), Err(IngestionError::AsciiParse(_))));
    }

    #[test]
    fn test_parse_ascii_rejects_error_page() {
        let text = "<html><body>Error { code = 404; message = \"not found\" }</body></html>";
        assert!(parse_ascii(text).is_err());
    }

    #[test]
    fn test_build_sample_set_converts_units() {
        let lats = [0.0];
        let lons = [0.0, 180.0];
        let t = parse_ascii(&opendap_ascii("tmp2m", &lats, &lons, |_, _| 300.0)).unwrap();
        let p = parse_ascii(&opendap_ascii("pressfc", &lats, &lons, |_, _| 101_325.0)).unwrap();

        let set = build_sample_set("2024-01-15 12z", &t, &p).unwrap();
        let cell = set.lookup(0.0, 180.0).unwrap();
        assert!((cell.value(TEMPERATURE).unwrap() - 26.85).abs() < 1e-9);
        assert!((cell.value(PRESSURE).unwrap() - 0.999875).abs() < 1e-6);
        assert_eq!(set.timestamp(), "2024-01-15 12z");
    }

    #[test]
    fn test_fill_values_make_set_incomplete() {
        let lats = [0.0];
        let lons = [0.0, 180.0];
        let fill = |_: f64, lon: f64| if lon == 0.0 { 9.999e20 } else { 300.0 };
        let t = parse_ascii(&opendap_ascii("tmp2m", &lats, &lons, fill)).unwrap();
        let p = parse_ascii(&opendap_ascii("pressfc", &lats, &lons, fill)).unwrap();

        let err = build_sample_set("t", &t, &p).unwrap_err();
        assert!(matches!(
            err,
            IngestionError::Grid(geo_common::GeoError::DataIncomplete(_))
        ));
    }
}
