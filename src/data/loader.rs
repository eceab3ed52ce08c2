use std::collections::HashMap;
use std::path::Path;

use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::distance::{travel_time_hours, BaseLocation, Coordinates, RegionBounds, DEFAULT_ROAD_SPEED_KMH};
use super::error::DataLoadError;
use super::model::{Property, PropertyDataset, Status};

// ---------------------------------------------------------------------------
// Column schema
// ---------------------------------------------------------------------------

pub mod columns {
    pub const NAME: &str = "Property_Name";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
    pub const PROVINCE: &str = "Province";
    pub const DISTRICT: &str = "Clean_District";
    pub const PRIMARY_COMMODITY: &str = "Primary_Commodity";
    pub const COMMODITY_2: &str = "Commodity_2";
    pub const COMMODITY_3: &str = "Commodity_3";
    pub const STATUS: &str = "Status";
    pub const DISTANCE: &str = "Distance_From_Chingola_km";
    pub const TRAVEL_TIME: &str = "Travel_Time_From_Chingola_Hours";
    pub const TOWN: &str = "District/Town";
    pub const RESERVES: &str = "Reserves";
    pub const GEOLOGY_CLASSIFICATION: &str = "Geology_Classification";
    pub const GEOLOGY_DESCRIPTION: &str = "Geology_Description";
    pub const QUESTIONABLE: &str = "Coordinates_Questionable";

    /// Columns the loader refuses to work without.
    pub const REQUIRED: [&str; 9] = [
        NAME,
        LATITUDE,
        LONGITUDE,
        PROVINCE,
        DISTRICT,
        PRIMARY_COMMODITY,
        COMMODITY_2,
        COMMODITY_3,
        STATUS,
    ];
}

/// Cell contents that mean "no value" in exported spreadsheets.
const MISSING_MARKERS: [&str; 5] = ["nan", "none", "null", "n/a", "<na>"];

// ---------------------------------------------------------------------------
// Loader settings
// ---------------------------------------------------------------------------

/// How derived columns are filled in while loading.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderSettings {
    pub base: BaseLocation,
    pub road_speed_kmh: f64,
    /// Properties outside this box are flagged as having questionable
    /// coordinates. `None` disables the check.
    pub region: Option<RegionBounds>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            base: BaseLocation::default(),
            road_speed_kmh: DEFAULT_ROAD_SPEED_KMH,
            region: Some(RegionBounds::default()),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a property dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the documented column names (recommended)
/// * `.json`    – `[{ "Property_Name": "...", "Latitude": -12.5, ... }, ...]`
/// * `.parquet` – one column per attribute, any primitive type
pub fn load_file(path: &Path, settings: &LoaderSettings) -> Result<PropertyDataset, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    let dataset = build_dataset(&table, settings)?;
    log::info!(
        "Loaded {} properties from {} ({} with questionable coordinates)",
        dataset.len(),
        path.display(),
        dataset.questionable_count()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Raw table: header names + normalised string cells
// ---------------------------------------------------------------------------

/// Format-independent intermediate form: every cell trimmed, with missing
/// markers turned into `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

fn normalize_cell(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let lower = s.to_ascii_lowercase();
    if MISSING_MARKERS.contains(&lower.as_str()) {
        return None;
    }
    Some(s.to_string())
}

fn io_error(path: &Path, source: std::io::Error) -> DataLoadError {
    DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable, DataLoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(normalize_cell).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')` layout.
/// Keys missing from a record read as empty cells.
fn read_json(path: &Path) -> Result<RawTable, DataLoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| DataLoadError::Malformed("expected a top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataLoadError::Malformed(format!("record {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !positions.contains_key(key) {
                positions.insert(key.clone(), headers.len());
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            let mut row = vec![None; headers.len()];
            for (key, val) in obj {
                row[positions[key]] = json_cell(val);
            }
            row
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => normalize_cell(s),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Parquet files written by Pandas or Polars. Every column is rendered to
/// text and goes through the same coercion as CSV cells.
fn read_parquet(path: &Path) -> Result<RawTable, DataLoadError> {
    let file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(batch.num_columns());
            for col in batch.columns() {
                if col.is_null(row) {
                    cells.push(None);
                } else {
                    cells.push(normalize_cell(&array_value_to_string(col, row)?));
                }
            }
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// RawTable → PropertyDataset
// ---------------------------------------------------------------------------

/// Positions of the known columns within a table's header row.
struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    const OPTIONAL: [&'static str; 7] = [
        columns::DISTANCE,
        columns::TRAVEL_TIME,
        columns::TOWN,
        columns::RESERVES,
        columns::GEOLOGY_CLASSIFICATION,
        columns::GEOLOGY_DESCRIPTION,
        columns::QUESTIONABLE,
    ];

    fn resolve(headers: &[String]) -> Result<Self, DataLoadError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = columns::REQUIRED
            .into_iter()
            .filter(|&c| find(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataLoadError::MissingColumns(missing));
        }

        let positions = columns::REQUIRED
            .into_iter()
            .chain(Self::OPTIONAL)
            .filter_map(|c| find(c).map(|i| (c, i)))
            .collect();
        Ok(ColumnIndex { positions })
    }

    fn cell<'r>(&self, row: &'r [Option<String>], column: &str) -> Option<&'r str> {
        let i = *self.positions.get(column)?;
        row.get(i)?.as_deref()
    }
}

/// Coerce a raw table into properties.
///
/// Rows whose coordinates are missing or unparseable are dropped (with a
/// warning). Any other malformed value fails the whole load.
pub fn build_dataset(table: &RawTable, settings: &LoaderSettings) -> Result<PropertyDataset, DataLoadError> {
    let index = ColumnIndex::resolve(&table.headers)?;

    let mut properties = Vec::with_capacity(table.rows.len());
    let mut dropped = 0usize;

    for (i, row) in table.rows.iter().enumerate() {
        // 1-based data row number, as a spreadsheet user would count it.
        let row_no = i + 1;

        let Some(coords) = parse_coordinates(&index, row) else {
            log::warn!("Row {row_no}: dropping property with unusable coordinates");
            dropped += 1;
            continue;
        };

        let required_text = |column: &str| -> Result<String, DataLoadError> {
            index
                .cell(row, column)
                .map(str::to_string)
                .ok_or_else(|| DataLoadError::InvalidValue {
                    row: row_no,
                    column: column.to_string(),
                    value: String::new(),
                })
        };
        let optional_text = |column: &str| index.cell(row, column).map(str::to_string);

        let status_cell = index.cell(row, columns::STATUS);
        let status = Status::parse(status_cell).unwrap_or_else(|| {
            log::warn!(
                "Row {row_no}: unrecognised status '{}', treating as Unknown",
                status_cell.unwrap_or_default()
            );
            Status::Unknown
        });

        let distance_from_base_km = match index.cell(row, columns::DISTANCE) {
            Some(raw) => parse_non_negative(raw, row_no, columns::DISTANCE)?,
            None => settings.base.distance_to(coords),
        };
        let travel_time_hours = match index.cell(row, columns::TRAVEL_TIME) {
            Some(raw) => parse_non_negative(raw, row_no, columns::TRAVEL_TIME)?,
            None => travel_time_hours(distance_from_base_km, settings.road_speed_kmh),
        };

        let flagged_in_source = index
            .cell(row, columns::QUESTIONABLE)
            .is_some_and(is_truthy);
        let outside_region = settings.region.is_some_and(|r| !r.contains(coords));

        properties.push(Property {
            name: required_text(columns::NAME)?,
            latitude: coords.latitude,
            longitude: coords.longitude,
            province: required_text(columns::PROVINCE)?,
            district: required_text(columns::DISTRICT)?,
            primary_commodity: required_text(columns::PRIMARY_COMMODITY)?,
            commodity_2: optional_text(columns::COMMODITY_2),
            commodity_3: optional_text(columns::COMMODITY_3),
            status,
            distance_from_base_km,
            travel_time_hours,
            town: optional_text(columns::TOWN),
            reserves: optional_text(columns::RESERVES),
            geology_classification: optional_text(columns::GEOLOGY_CLASSIFICATION),
            geology_description: optional_text(columns::GEOLOGY_DESCRIPTION),
            coordinates_questionable: flagged_in_source || outside_region,
        });
    }

    if dropped > 0 {
        log::warn!("Dropped {dropped} row(s) without usable coordinates");
    }
    if properties.is_empty() {
        return Err(DataLoadError::NoRows);
    }

    Ok(PropertyDataset::from_properties(properties))
}

fn parse_coordinates(index: &ColumnIndex, row: &[Option<String>]) -> Option<Coordinates> {
    let lat: f64 = index.cell(row, columns::LATITUDE)?.parse().ok()?;
    let lon: f64 = index.cell(row, columns::LONGITUDE)?.parse().ok()?;
    let valid = lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon);
    valid.then(|| Coordinates::new(lat, lon))
}

fn parse_non_negative(raw: &str, row: usize, column: &str) -> Result<f64, DataLoadError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(DataLoadError::InvalidValue {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "questionable"
    )
}
