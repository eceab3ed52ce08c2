//! In-memory reference dataset shared by the unit tests: 239 properties over
//! the ten provinces, 30 of them in Copperbelt Province and 28 with
//! questionable coordinates.

use super::distance::{travel_time_hours, BaseLocation, Coordinates, DEFAULT_ROAD_SPEED_KMH};
use super::model::{Property, PropertyDataset, Status};

/// (province, rows, centre latitude, centre longitude, districts)
pub const PROVINCES: [(&str, usize, f64, f64, &[&str]); 10] = [
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

pub const COMMODITIES: [&str; 20] = [
    "Copper", "Cobalt", "Gold", "Emerald", "Amethyst", "Manganese", "Lead", "Zinc", "Nickel",
    "Uranium", "Iron", "Coal", "Limestone", "Tin", "Silver", "Aquamarine", "Tourmaline",
    "Graphite", "Phosphate", "Fluorite",
];

/// A plain property with neutral defaults; tests override what they need.
pub fn property(name: &str, province: &str, district: &str) -> Property {
    Property {
        name: name.to_string(),
        latitude: -13.0,
        longitude: 28.0,
        province: province.to_string(),
        district: district.to_string(),
        primary_commodity: "Copper".to_string(),
        commodity_2: None,
        commodity_3: None,
        status: Status::Active,
        distance_from_base_km: 100.0,
        travel_time_hours: 100.0 / DEFAULT_ROAD_SPEED_KMH,
        town: None,
        reserves: None,
        geology_classification: None,
        geology_description: None,
        coordinates_questionable: false,
    }
}

pub fn reference_dataset() -> PropertyDataset {
    let base = BaseLocation::default();
    let mut properties = Vec::with_capacity(239);
    let mut g = 0usize;

    for (province, rows, lat, lon, districts) in PROVINCES {
        let short = province.trim_end_matches(" Province");
        for k in 0..rows {
            let mut p = property(
                &format!("{short} Prospect {}", k + 1),
                province,
                districts[k % districts.len()],
            );
            p.latitude = lat + ((k % 5) as f64 - 2.0) * 0.15;
            p.longitude = lon + ((k % 7) as f64 - 3.0) * 0.15;
            p.primary_commodity = if province == "Copperbelt Province" {
                let c = if k % 2 == 0 { "Copper" } else { "Cobalt" };
                c.to_string()
            } else {
                COMMODITIES[(g * 5 + k) % COMMODITIES.len()].to_string()
            };
            p.commodity_2 = (g % 3 == 0).then(|| COMMODITIES[(g + 7) % COMMODITIES.len()].to_string());
            p.commodity_3 = (g % 5 == 0).then(|| COMMODITIES[(g + 13) % COMMODITIES.len()].to_string());
            p.status = match g % 4 {
                0 | 1 => Status::Active,
                2 => Status::Inactive,
                _ => Status::Unknown,
            };
            p.distance_from_base_km = base.distance_to(Coordinates::new(p.latitude, p.longitude));
            p.travel_time_hours = travel_time_hours(p.distance_from_base_km, DEFAULT_ROAD_SPEED_KMH);
            p.coordinates_questionable = g % 8 == 3 && g < 220;
            properties.push(p);
            g += 1;
        }
    }

    PropertyDataset::from_properties(properties)
}
