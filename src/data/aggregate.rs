use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::distance::Coordinates;
use super::filter::FilteredView;
use super::model::{Property, PropertyDataset, Status};

/// Number of commodities shown in the commodity chart unless configured.
pub const DEFAULT_TOP_COMMODITIES: usize = 10;

/// Histogram bucket width in kilometres unless configured.
pub const DEFAULT_BUCKET_WIDTH_KM: f64 = 50.0;

/// Narrowest bucket width a configuration may ask for.
pub const MIN_BUCKET_WIDTH_KM: f64 = 0.1;

/// Upper bound on the number of histogram buckets.
pub const MAX_HISTOGRAM_BUCKETS: usize = 1000;

// ---------------------------------------------------------------------------
// Chart datasets
// ---------------------------------------------------------------------------

/// Commodity frequency, most common first.
///
/// A property counts once per distinct commodity it names in any of its three
/// commodity slots. Ties keep the order in which commodities were first seen.
pub fn commodity_distribution<'a, I>(subset: I, top_n: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a Property>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut slot: HashMap<&'a str, usize> = HashMap::new();

    for property in subset {
        let mut seen: Vec<&str> = Vec::with_capacity(3);
        for commodity in property.commodities() {
            if seen.contains(&commodity) {
                continue;
            }
            seen.push(commodity);
            match slot.get(commodity) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    slot.insert(commodity, counts.len());
                    counts.push((commodity.to_string(), 1));
                }
            }
        }
    }

    // Stable sort keeps first-encountered order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(top_n);
    counts
}

/// Count per status. All three statuses are always present.
pub fn status_distribution<'a, I>(subset: I) -> BTreeMap<Status, usize>
where
    I: IntoIterator<Item = &'a Property>,
{
    let mut counts: BTreeMap<Status, usize> = Status::ALL.iter().map(|s| (*s, 0)).collect();
    for property in subset {
        *counts.entry(property.status).or_default() += 1;
    }
    counts
}

/// Count per province, keyed by every province of the unfiltered dataset.
pub fn province_distribution<'a, I>(
    subset: I,
    provinces: &BTreeSet<String>,
) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a Property>,
{
    let mut counts: BTreeMap<String, usize> = provinces.iter().map(|p| (p.clone(), 0)).collect();
    for property in subset {
        if let Some(n) = counts.get_mut(&property.province) {
            *n += 1;
        }
    }
    counts
}

/// Distance histogram as `(bucket_lower_bound_km, count)` pairs.
///
/// Buckets cover `0..=axis_max_km`, where `axis_max_km` is the maximum
/// distance of the full dataset so the axis does not move when filters
/// change. A value equal to the upper edge lands in the last bucket.
/// A non-positive or non-finite bucket width, or one so narrow that the axis
/// would need more than `MAX_HISTOGRAM_BUCKETS` buckets, yields no buckets.
pub fn distance_histogram<'a, I>(
    subset: I,
    bucket_width_km: f64,
    axis_max_km: f64,
) -> Vec<(f64, usize)>
where
    I: IntoIterator<Item = &'a Property>,
{
    if !bucket_width_km.is_finite() || bucket_width_km <= 0.0 {
        return Vec::new();
    }
    let axis_max = if axis_max_km.is_finite() { axis_max_km.max(0.0) } else { 0.0 };
    let wanted = (axis_max / bucket_width_km).ceil();
    if wanted > MAX_HISTOGRAM_BUCKETS as f64 {
        log::warn!(
            "Histogram bucket width {bucket_width_km} km needs {wanted} buckets, more than {MAX_HISTOGRAM_BUCKETS}"
        );
        return Vec::new();
    }
    let n_buckets = (wanted as usize).max(1);

    let mut buckets: Vec<(f64, usize)> = (0..n_buckets)
        .map(|i| (i as f64 * bucket_width_km, 0))
        .collect();

    for property in subset {
        let d = property.distance_from_base_km.max(0.0);
        let idx = ((d / bucket_width_km).floor() as usize).min(n_buckets - 1);
        buckets[idx].1 += 1;
    }
    buckets
}

// ---------------------------------------------------------------------------
// Map dataset
// ---------------------------------------------------------------------------

/// One marker on the overview map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    /// Row index in the dataset.
    pub index: usize,
    pub name: String,
    pub position: Coordinates,
    pub status: Status,
    pub province: String,
    pub primary_commodity: String,
    pub questionable: bool,
}

pub fn map_markers(dataset: &PropertyDataset, view: &FilteredView) -> Vec<MapMarker> {
    view.indices
        .iter()
        .map(|&index| {
            let p = &dataset.properties[index];
            MapMarker {
                index,
                name: p.name.clone(),
                position: p.coordinates(),
                status: p.status,
                province: p.province.clone(),
                primary_commodity: p.primary_commodity.clone(),
                questionable: p.coordinates_questionable,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// DerivedViews – everything the charts and map draw from
// ---------------------------------------------------------------------------

/// Parameters that shape the derived views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateSettings {
    pub top_commodities: usize,
    pub bucket_width_km: f64,
}

impl Default for AggregateSettings {
    fn default() -> Self {
        Self {
            top_commodities: DEFAULT_TOP_COMMODITIES,
            bucket_width_km: DEFAULT_BUCKET_WIDTH_KM,
        }
    }
}

/// All derived views for one filter state, recomputed in full on every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedViews {
    pub markers: Vec<MapMarker>,
    pub commodities: Vec<(String, usize)>,
    pub statuses: BTreeMap<Status, usize>,
    pub provinces: BTreeMap<String, usize>,
    pub histogram: Vec<(f64, usize)>,
}

impl DerivedViews {
    pub fn compute(
        dataset: &PropertyDataset,
        view: &FilteredView,
        settings: &AggregateSettings,
    ) -> Self {
        DerivedViews {
            markers: map_markers(dataset, view),
            commodities: commodity_distribution(view.properties(dataset), settings.top_commodities),
            statuses: status_distribution(view.properties(dataset)),
            provinces: province_distribution(view.properties(dataset), &dataset.universe.provinces),
            histogram: distance_histogram(
                view.properties(dataset),
                settings.bucket_width_km,
                dataset.universe.max_distance_km,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, filtered_indices, FilterCriteria};
    use crate::data::fixtures;
    use proptest::prelude::*;

    fn with_commodities(name: &str, primary: &str, c2: Option<&str>, c3: Option<&str>) -> Property {
        let mut p = fixtures::property(name, "Central Province", "Kabwe");
        p.primary_commodity = primary.into();
        p.commodity_2 = c2.map(Into::into);
        p.commodity_3 = c3.map(Into::into);
        p
    }

    #[test]
    fn commodity_ranking_breaks_ties_by_first_seen() {
        let props = vec![
            with_commodities("a", "Gold", Some("Copper"), None),
            with_commodities("b", "Copper", None, None),
            with_commodities("c", "Emerald", Some("Gold"), None),
            with_commodities("d", "Manganese", None, None),
            with_commodities("e", "Emerald", None, None),
        ];
        let dist = commodity_distribution(&props, 10);
        assert_eq!(
            dist,
            vec![
                ("Gold".to_string(), 2),
                ("Copper".to_string(), 2),
                ("Emerald".to_string(), 2),
                ("Manganese".to_string(), 1),
            ]
        );

        let top2 = commodity_distribution(&props, 2);
        assert_eq!(top2.len(), 2);
        assert_eq!(top2[0].0, "Gold");
        assert_eq!(top2[1].0, "Copper");
    }

    #[test]
    fn commodity_counted_once_per_property() {
        let props = vec![with_commodities("a", "Copper", Some("Copper"), Some("Cobalt"))];
        let dist = commodity_distribution(&props, 10);
        assert_eq!(
            dist,
            vec![("Copper".to_string(), 1), ("Cobalt".to_string(), 1)]
        );
    }

    #[test]
    fn filtered_commodity_counts_every_row() {
        let ds = fixtures::reference_dataset();
        let criteria = FilterCriteria {
            commodity: Some("Copper".into()),
            ..Default::default()
        };
        let subset = apply(&ds.properties, &criteria);
        let dist = commodity_distribution(subset.iter().copied(), 50);
        let copper = dist.iter().find(|(c, _)| c == "Copper").map(|(_, n)| *n);
        assert_eq!(copper, Some(subset.len()));
        assert_eq!(dist[0].1, subset.len());
    }

    #[test]
    fn status_distribution_includes_empty_categories() {
        let mut p = fixtures::property("only", "Central Province", "Kabwe");
        p.status = Status::Active;
        let dist = status_distribution(std::iter::once(&p));
        assert_eq!(dist.len(), 3);
        assert_eq!(dist[&Status::Active], 1);
        assert_eq!(dist[&Status::Inactive], 0);
        assert_eq!(dist[&Status::Unknown], 0);

        let empty = status_distribution(std::iter::empty::<&Property>());
        assert_eq!(empty.values().sum::<usize>(), 0);
        assert_eq!(empty.len(), 3);
    }

    #[test]
    fn province_distribution_keeps_universe_keys() {
        let ds = fixtures::reference_dataset();
        let criteria = FilterCriteria {
            province: Some("Copperbelt Province".into()),
            ..Default::default()
        };
        let subset = apply(&ds.properties, &criteria);
        let dist = province_distribution(subset.iter().copied(), &ds.universe.provinces);
        assert_eq!(dist.len(), 10);
        assert_eq!(dist["Copperbelt Province"], 30);
        assert_eq!(dist["Lusaka Province"], 0);
    }

    #[test]
    fn histogram_axis_follows_full_dataset() {
        let mut near = fixtures::property("near", "Central Province", "Kabwe");
        near.distance_from_base_km = 10.0;
        let mut edge = fixtures::property("edge", "Central Province", "Kabwe");
        edge.distance_from_base_km = 200.0;
        let mut mid = fixtures::property("mid", "Central Province", "Kabwe");
        mid.distance_from_base_km = 50.0;
        let props = vec![near, edge, mid];

        let hist = distance_histogram(&props, 50.0, 200.0);
        assert_eq!(hist, vec![(0.0, 1), (50.0, 1), (100.0, 0), (150.0, 1)]);

        // Filtering down to one row keeps the same buckets.
        let hist = distance_histogram(&props[..1], 50.0, 200.0);
        assert_eq!(hist.len(), 4);
        assert_eq!(hist[0], (0.0, 1));
    }

    #[test]
    fn histogram_rejects_bad_width() {
        let props = vec![fixtures::property("p", "Central Province", "Kabwe")];
        assert!(distance_histogram(&props, 0.0, 100.0).is_empty());
        assert!(distance_histogram(&props, f64::NAN, 100.0).is_empty());
        assert_eq!(distance_histogram(&props, 25.0, 0.0), vec![(0.0, 1)]);
    }

    #[test]
    fn histogram_refuses_absurd_bucket_counts() {
        let ds = fixtures::reference_dataset();
        let axis = ds.universe.max_distance_km;
        assert!(distance_histogram(&ds.properties, 1e-300, axis).is_empty());
        assert!(distance_histogram(&ds.properties, 1e-6, axis).is_empty());

        let exact = distance_histogram(&ds.properties, 1.0, MAX_HISTOGRAM_BUCKETS as f64);
        assert_eq!(exact.len(), MAX_HISTOGRAM_BUCKETS);
        assert_eq!(exact.iter().map(|(_, n)| n).sum::<usize>(), ds.len());
    }

    #[test]
    fn derived_views_line_up_with_filter() {
        let ds = fixtures::reference_dataset();
        let criteria = FilterCriteria {
            status: Some(Status::Active),
            ..Default::default()
        };
        let view = filtered_indices(&ds, &criteria);
        let derived = DerivedViews::compute(&ds, &view, &AggregateSettings::default());

        assert_eq!(derived.markers.len(), view.len());
        assert!(derived.markers.iter().all(|m| m.status == Status::Active));
        assert_eq!(derived.statuses[&Status::Active], view.len());
        assert_eq!(derived.provinces.values().sum::<usize>(), view.len());
        assert_eq!(derived.histogram.iter().map(|(_, n)| n).sum::<usize>(), view.len());
        assert!(derived.commodities.len() <= DEFAULT_TOP_COMMODITIES);
    }

    proptest! {
        #[test]
        fn distributions_sum_to_subset_len(
            province in proptest::option::of(proptest::sample::select(vec![
                "Copperbelt Province".to_string(),
                "Lusaka Province".to_string(),
                "Southern Province".to_string(),
            ])),
            max_distance_km in proptest::option::of(0.0f64..1200.0),
        ) {
            let ds = fixtures::reference_dataset();
            let criteria = FilterCriteria { province, max_distance_km, ..Default::default() };
            let subset = apply(&ds.properties, &criteria);

            let statuses = status_distribution(subset.iter().copied());
            prop_assert_eq!(statuses.values().sum::<usize>(), subset.len());

            let provinces = province_distribution(subset.iter().copied(), &ds.universe.provinces);
            prop_assert_eq!(provinces.values().sum::<usize>(), subset.len());

            let hist = distance_histogram(subset.iter().copied(), 50.0, ds.universe.max_distance_km);
            prop_assert_eq!(hist.iter().map(|(_, n)| n).sum::<usize>(), subset.len());
        }
    }
}
