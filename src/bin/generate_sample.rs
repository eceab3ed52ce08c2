use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use geo::{Distance, Haversine, Point};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const BASE: (f64, f64) = (-12.5333, 27.85);
const ROAD_SPEED_KMH: f64 = 70.0;

/// (province, rows, centre latitude, centre longitude, districts)
const PROVINCES: [(&str, usize, f64, f64, &[&str]); 10] = [
    ("Central Province", 25, -14.4, 28.4, &["Kabwe", "Mkushi", "Serenje", "Kapiri Mposhi", "Mumbwa"]),
    ("Copperbelt Province", 30, -12.8, 28.2, &["Chingola", "Kitwe", "Ndola", "Mufulira", "Chililabombwe", "Luanshya"]),
    ("Eastern Province", 18, -13.6, 32.6, &["Chipata", "Petauke", "Lundazi", "Katete"]),
    ("Luapula Province", 20, -11.2, 29.0, &["Mansa", "Samfya", "Kawambwa", "Nchelenge"]),
    ("Lusaka Province", 22, -15.4, 28.3, &["Lusaka", "Chongwe", "Kafue", "Luangwa"]),
    ("Muchinga Province", 15, -11.0, 31.7, &["Chinsali", "Mpika", "Isoka", "Nakonde"]),
    ("Northern Province", 24, -10.2, 31.2, &["Kasama", "Mbala", "Mpulungu", "Luwingu"]),
    ("North-Western Province", 35, -12.2, 26.0, &["Solwezi", "Kasempa", "Mwinilunga", "Kabompo"]),
    ("Southern Province", 28, -16.8, 27.0, &["Choma", "Livingstone", "Mazabuka", "Monze"]),
    ("Western Province", 22, -15.3, 23.1, &["Mongu", "Kaoma", "Senanga", "Sesheke"]),
];

const COMMODITIES: [&str; 16] = [
    "Copper", "Cobalt", "Gold", "Emerald", "Amethyst", "Manganese", "Lead", "Zinc", "Nickel",
    "Uranium", "Iron", "Coal", "Limestone", "Tin", "Silver", "Graphite",
];

const STATUSES: [&str; 3] = ["Active", "Inactive", "Unknown"];

const GEOLOGY: [(&str, &str); 4] = [
    ("Sediment-hosted", "Stratiform copper-cobalt mineralisation in Katanga Supergroup shales."),
    ("Pegmatite", "Zoned granitic pegmatite with gemstone pockets."),
    ("Greenstone", "Quartz veining along sheared greenstone contacts."),
    ("Carbonate-hosted", "Lead-zinc replacement bodies in dolomite."),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// One output row, with the same headers the dashboard expects.
#[derive(Debug, Serialize)]
struct Row {
    #[serde(rename = "Property_Name")]
    name: String,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Province")]
    province: String,
    #[serde(rename = "Clean_District")]
    district: String,
    #[serde(rename = "District/Town")]
    town: String,
    #[serde(rename = "Primary_Commodity")]
    primary_commodity: String,
    #[serde(rename = "Commodity_2")]
    commodity_2: Option<String>,
    #[serde(rename = "Commodity_3")]
    commodity_3: Option<String>,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Distance_From_Chingola_km")]
    distance_km: f64,
    #[serde(rename = "Travel_Time_From_Chingola_Hours")]
    travel_time_hours: f64,
    #[serde(rename = "Reserves")]
    reserves: Option<String>,
    #[serde(rename = "Geology_Classification")]
    geology_classification: String,
    #[serde(rename = "Geology_Description")]
    geology_description: String,
    #[serde(rename = "Coordinates_Questionable")]
    coordinates_questionable: bool,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let base = Point::new(BASE.1, BASE.0);
    let mut rows = Vec::new();

    for (province, count, lat, lon, districts) in PROVINCES {
        let short = province.trim_end_matches(" Province");
        for k in 0..count {
            let latitude = lat + rng.uniform(-0.9, 0.9);
            let longitude = lon + rng.uniform(-0.9, 0.9);
            let distance_km = Haversine.distance(base, Point::new(longitude, latitude)) / 1000.0;

            let primary = if province == "Copperbelt Province" && rng.chance(0.7) {
                "Copper"
            } else {
                rng.pick(&COMMODITIES)
            };
            let secondary = rng
                .chance(0.6)
                .then(|| rng.pick(&COMMODITIES))
                .filter(|c| *c != primary);
            let tertiary = secondary
                .filter(|_| rng.chance(0.4))
                .map(|_| rng.pick(&COMMODITIES))
                .filter(|c| *c != primary && Some(*c) != secondary);
            let (classification, description) = GEOLOGY[(rng.next_u64() % GEOLOGY.len() as u64) as usize];
            let district = rng.pick(districts);

            rows.push(Row {
                name: format!("{short} Prospect {}", k + 1),
                latitude,
                longitude,
                province: province.to_string(),
                district: district.to_string(),
                town: district.to_string(),
                primary_commodity: primary.to_string(),
                commodity_2: secondary.map(str::to_string),
                commodity_3: tertiary.map(str::to_string),
                status: rng.pick(&STATUSES).to_string(),
                distance_km: (distance_km * 10.0).round() / 10.0,
                travel_time_hours: (distance_km / ROAD_SPEED_KMH * 100.0).round() / 100.0,
                reserves: rng
                    .chance(0.3)
                    .then(|| format!("{:.1} Mt", rng.uniform(0.5, 120.0))),
                geology_classification: classification.to_string(),
                geology_description: description.to_string(),
                coordinates_questionable: rng.chance(0.1),
            });
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[Row]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> anyhow::Result<()> {
    fn text(rows: &[Row], f: impl Fn(&Row) -> Option<&str>) -> ArrayRef {
        Arc::new(rows.iter().map(f).collect::<StringArray>())
    }
    fn number(rows: &[Row], f: impl Fn(&Row) -> f64) -> ArrayRef {
        Arc::new(rows.iter().map(|r| Some(f(r))).collect::<Float64Array>())
    }

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("Property_Name", text(rows, |r| Some(r.name.as_str()))),
        ("Latitude", number(rows, |r| r.latitude)),
        ("Longitude", number(rows, |r| r.longitude)),
        ("Province", text(rows, |r| Some(r.province.as_str()))),
        ("Clean_District", text(rows, |r| Some(r.district.as_str()))),
        ("District/Town", text(rows, |r| Some(r.town.as_str()))),
        ("Primary_Commodity", text(rows, |r| Some(r.primary_commodity.as_str()))),
        ("Commodity_2", text(rows, |r| r.commodity_2.as_deref())),
        ("Commodity_3", text(rows, |r| r.commodity_3.as_deref())),
        ("Status", text(rows, |r| Some(r.status.as_str()))),
        ("Distance_From_Chingola_km", number(rows, |r| r.distance_km)),
        ("Travel_Time_From_Chingola_Hours", number(rows, |r| r.travel_time_hours)),
        ("Reserves", text(rows, |r| r.reserves.as_deref())),
        ("Geology_Classification", text(rows, |r| Some(r.geology_classification.as_str()))),
        ("Geology_Description", text(rows, |r| Some(r.geology_description.as_str()))),
        (
            "Coordinates_Questionable",
            Arc::new(rows.iter().map(|r| Some(r.coordinates_questionable)).collect::<BooleanArray>()) as ArrayRef,
        ),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, a)| a).collect())
        .context("failed to assemble record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let csv_path = Path::new("sample_properties.csv");
    write_csv(csv_path, &rows)?;
    let parquet_path = Path::new("sample_properties.parquet");
    write_parquet(parquet_path, &rows)?;

    let questionable = rows.iter().filter(|r| r.coordinates_questionable).count();
    println!(
        "Wrote {} properties ({questionable} with questionable coordinates) to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_every_province() {
        let rows = generate(&mut SimpleRng::new(7));
        assert_eq!(rows.len(), 239);
        assert_eq!(
            rows.iter().filter(|r| r.province == "Copperbelt Province").count(),
            30
        );
        assert!(rows.iter().all(|r| r.distance_km >= 0.0));
        assert!(rows
            .iter()
            .all(|r| r.commodity_2.as_deref() != Some(r.primary_commodity.as_str())));
    }

    #[test]
    fn same_seed_same_output() {
        let a = generate(&mut SimpleRng::new(42));
        let b = generate(&mut SimpleRng::new(42));
        assert!(a.iter().zip(&b).all(|(x, y)| x.name == y.name && x.latitude == y.latitude));
    }
}
