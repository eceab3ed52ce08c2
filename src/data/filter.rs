use super::error::InvalidFilterValue;
use super::model::{Property, PropertyDataset, Status, Universe};

// ---------------------------------------------------------------------------
// Filter criteria: one optional value per dimension
// ---------------------------------------------------------------------------

/// The user's active filter selections.
///
/// Every dimension left at `None` (or `false`) contributes no predicate; the
/// remaining predicates combine with logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub province: Option<String>,
    /// Only meaningful together with `province`; must be one of its districts.
    pub district: Option<String>,
    /// Matched against the primary and both secondary commodities.
    pub commodity: Option<String>,
    /// `Unknown` also matches properties whose status cell was empty.
    pub status: Option<Status>,
    /// Inclusive upper bound. `None` is equivalent to the dataset maximum.
    pub max_distance_km: Option<f64>,
    pub exclude_questionable: bool,
}

impl FilterCriteria {
    /// Whether no dimension is active.
    pub fn is_empty(&self) -> bool {
        self.province.is_none()
            && self.district.is_none()
            && self.commodity.is_none()
            && self.status.is_none()
            && self.max_distance_km.is_none()
            && !self.exclude_questionable
    }

    /// Check every option against the dataset universe.
    ///
    /// Returns all problems found, in dimension order.
    pub fn validate(&self, universe: &Universe) -> Vec<InvalidFilterValue> {
        let mut errors = Vec::new();

        let province_ok = match &self.province {
            Some(p) if !universe.provinces.contains(p) => {
                errors.push(InvalidFilterValue::Province(p.clone()));
                false
            }
            _ => true,
        };

        if let Some(d) = &self.district {
            let belongs = province_ok
                && self
                    .province
                    .as_deref()
                    .is_some_and(|p| universe.district_in_province(p, d));
            if !belongs {
                errors.push(InvalidFilterValue::District {
                    district: d.clone(),
                    province: self.province.clone(),
                });
            }
        }

        if let Some(c) = &self.commodity {
            if !universe.commodities.contains(c) {
                errors.push(InvalidFilterValue::Commodity(c.clone()));
            }
        }

        if let Some(max) = self.max_distance_km {
            if !max.is_finite() || max < 0.0 {
                errors.push(InvalidFilterValue::MaxDistance(max));
            }
        }

        errors
    }

    /// Reset every invalid dimension to "no filter" and report what was reset.
    ///
    /// An invalid province also drops the district, since the district choice
    /// depends on it.
    pub fn sanitize(&mut self, universe: &Universe) -> Vec<InvalidFilterValue> {
        let errors = self.validate(universe);
        for err in &errors {
            match err {
                InvalidFilterValue::Province(_) => {
                    self.province = None;
                    self.district = None;
                }
                InvalidFilterValue::District { .. } => self.district = None,
                InvalidFilterValue::Commodity(_) => self.commodity = None,
                InvalidFilterValue::MaxDistance(_) => self.max_distance_km = None,
            }
        }
        errors
    }

    /// Change the province and drop a district that no longer belongs to it.
    pub fn set_province(&mut self, province: Option<String>, universe: &Universe) {
        self.province = province;
        if let Some(d) = &self.district {
            let keep = self
                .province
                .as_deref()
                .is_some_and(|p| universe.district_in_province(p, d));
            if !keep {
                self.district = None;
            }
        }
    }

    /// Evaluate every active predicate against one property.
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(p) = &self.province {
            if property.province != *p {
                return false;
            }
        }
        if let Some(d) = &self.district {
            if property.district != *d {
                return false;
            }
        }
        if let Some(c) = &self.commodity {
            if !property.has_commodity(c) {
                return false;
            }
        }
        if let Some(s) = self.status {
            if property.status != s {
                return false;
            }
        }
        if let Some(max) = self.max_distance_km {
            if property.distance_from_base_km > max {
                return false;
            }
        }
        if self.exclude_questionable && property.coordinates_questionable {
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Applying criteria
// ---------------------------------------------------------------------------

/// Return the properties that pass `criteria`, preserving their relative order.
pub fn apply<'a, I>(properties: I, criteria: &FilterCriteria) -> Vec<&'a Property>
where
    I: IntoIterator<Item = &'a Property>,
{
    properties
        .into_iter()
        .filter(|p| criteria.matches(p))
        .collect()
}

/// Indices of the dataset rows passing the current criteria.
///
/// `filtered` records whether any criterion was active, so an empty result
/// ("nothing matches") is never confused with "no filter applied".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    pub indices: Vec<usize>,
    pub filtered: bool,
}

impl FilteredView {
    /// A view over every row with no criteria applied.
    pub fn unfiltered(dataset: &PropertyDataset) -> Self {
        FilteredView {
            indices: (0..dataset.len()).collect(),
            filtered: false,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    /// Resolve the view against its dataset.
    pub fn properties<'a>(
        &'a self,
        dataset: &'a PropertyDataset,
    ) -> impl Iterator<Item = &'a Property> + 'a {
        self.indices.iter().map(move |&i| &dataset.properties[i])
    }
}

pub fn filtered_indices(dataset: &PropertyDataset, criteria: &FilterCriteria) -> FilteredView {
    if criteria.is_empty() {
        return FilteredView::unfiltered(dataset);
    }
    let indices = dataset
        .properties
        .iter()
        .enumerate()
        .filter(|(_, p)| criteria.matches(p))
        .map(|(i, _)| i)
        .collect();
    FilteredView {
        indices,
        filtered: true,
    }
}
