use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::aggregate::MapMarker;
use crate::data::model::{PropertyDataset, Status};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Fixed status colours, so "Active" reads the same on every chart.
pub fn status_color(status: Status) -> Color32 {
    match status {
        Status::Active => Color32::from_rgb(46, 160, 67),
        Status::Inactive => Color32::from_rgb(207, 34, 46),
        Status::Unknown => Color32::GRAY,
    }
}

// ---------------------------------------------------------------------------
// Colour-by dimension for map markers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBy {
    Status,
    Province,
    Commodity,
}

impl ColorBy {
    pub const ALL: [ColorBy; 3] = [ColorBy::Status, ColorBy::Province, ColorBy::Commodity];

    pub fn label(&self) -> &'static str {
        match self {
            ColorBy::Status => "Status",
            ColorBy::Province => "Province",
            ColorBy::Commodity => "Primary commodity",
        }
    }

    /// The category a marker falls into for this dimension.
    pub fn category<'a>(&self, marker: &'a MapMarker) -> &'a str {
        match self {
            ColorBy::Status => marker.status.as_str(),
            ColorBy::Province => &marker.province,
            ColorBy::Commodity => &marker.primary_commodity,
        }
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of a chosen dimension to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub dimension: ColorBy,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map over the full dataset universe, so colours stay
    /// put while filters change.
    pub fn new(dimension: ColorBy, dataset: &PropertyDataset) -> Self {
        let mapping: BTreeMap<String, Color32> = match dimension {
            ColorBy::Status => Status::ALL
                .iter()
                .map(|s| (s.as_str().to_string(), status_color(*s)))
                .collect(),
            ColorBy::Province => Self::spread(&dataset.universe.provinces),
            ColorBy::Commodity => {
                let primaries: BTreeSet<String> = dataset
                    .properties
                    .iter()
                    .map(|p| p.primary_commodity.clone())
                    .collect();
                Self::spread(&primaries)
            }
        };

        ColorMap {
            dimension,
            mapping,
            default_color: Color32::GRAY,
        }
    }

    fn spread(categories: &BTreeSet<String>) -> BTreeMap<String, Color32> {
        let palette = generate_palette(categories.len());
        categories.iter().cloned().zip(palette).collect()
    }

    /// Look up the colour for a given category.
    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping
            .get(category)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (category label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping.iter().map(|(k, c)| (k.clone(), *c)).collect()
    }
}
