use super::distance::{midpoint, route_points, BaseLocation, Coordinates};
use super::error::NotFoundError;
use super::model::Property;

/// Find the selected property within the current filtered subset.
///
/// Names are not guaranteed unique; the first match in subset order wins.
/// A property that has been filtered out cannot be resolved.
pub fn resolve<'a, I>(subset: I, name: &str) -> Result<&'a Property, NotFoundError>
where
    I: IntoIterator<Item = &'a Property>,
{
    subset
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| NotFoundError {
            name: name.to_string(),
        })
}

/// Everything the detail card and the route mini-map show for one property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDetail<'a> {
    pub property: &'a Property,
    pub base_name: String,
    /// Base first, property second.
    pub route: [Coordinates; 2],
    /// Centre of the route mini-map.
    pub center: Coordinates,
    pub distance_km: f64,
    pub travel_time_hours: f64,
}

impl<'a> PropertyDetail<'a> {
    pub fn new(property: &'a Property, base: &BaseLocation) -> Self {
        let route = route_points(base.coordinates(), property.coordinates());
        PropertyDetail {
            property,
            base_name: base.name.clone(),
            route,
            center: midpoint(route[0], route[1]),
            distance_km: property.distance_from_base_km,
            travel_time_hours: property.travel_time_hours,
        }
    }

    /// `(label, value)` rows for the commodity section; missing slots are
    /// shown as "None".
    pub fn commodity_rows(&self) -> [(&'static str, &str); 3] {
        let p = self.property;
        [
            ("Primary", p.primary_commodity.as_str()),
            ("Secondary", p.commodity_2.as_deref().unwrap_or("None")),
            ("Tertiary", p.commodity_3.as_deref().unwrap_or("None")),
        ]
    }
}
