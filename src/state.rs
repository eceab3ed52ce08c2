use std::path::Path;
use std::sync::Arc;

use crate::color::{ColorBy, ColorMap};
use crate::config::DashboardConfig;
use crate::data::aggregate::DerivedViews;
use crate::data::detail::{resolve, PropertyDetail};
use crate::data::error::{DataLoadError, NotFoundError};
use crate::data::filter::{filtered_indices, FilterCriteria, FilteredView};
use crate::data::model::{Property, PropertyDataset, Status};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering.
///
/// Every filter or selection change goes through a method here, which
/// recomputes the filtered view and all derived views in one pass.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file loads). Shared read-only.
    pub dataset: Option<Arc<PropertyDataset>>,

    /// Active filter selections.
    pub criteria: FilterCriteria,

    /// Rows passing the current filters.
    pub view: FilteredView,

    /// Map markers and chart datasets for `view`.
    pub derived: DerivedViews,

    /// Dataset row of the selected property, always inside `view`.
    pub selected: Option<usize>,

    /// Which dimension colours the map markers.
    pub color_by: ColorBy,

    /// Active colour map.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            criteria: FilterCriteria::default(),
            view: FilteredView::default(),
            derived: DerivedViews::default(),
            selected: None,
            color_by: ColorBy::Status,
            color_map: None,
            status_message: None,
        }
    }

    /// Load a file with the configured loader settings and ingest it.
    ///
    /// On failure the previous dataset (if any) stays in place and the error
    /// is surfaced in the status line.
    pub fn load_path(&mut self, path: &Path) -> Result<(), DataLoadError> {
        match crate::data::loader::load_file(path, &self.config.loader_settings()) {
            Ok(dataset) => {
                self.set_dataset(Arc::new(dataset));
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Ingest a newly loaded dataset, reset filters and selection.
    pub fn set_dataset(&mut self, dataset: Arc<PropertyDataset>) {
        self.criteria = FilterCriteria::default();
        self.selected = None;
        self.color_map = Some(ColorMap::new(self.color_by, &dataset));
        self.dataset = Some(dataset);
        self.refilter();
    }

    pub fn set_color_by(&mut self, color_by: ColorBy) {
        self.color_by = color_by;
        if let Some(ds) = &self.dataset {
            self.color_map = Some(ColorMap::new(color_by, ds));
        }
    }

    /// Recompute the filtered view, derived views and selection validity.
    ///
    /// Invalid filter values are reset to "no filter"; a selection that is no
    /// longer visible is cleared.
    pub fn refilter(&mut self) {
        let Some(ds) = self.dataset.clone() else {
            return;
        };

        // Messages describe the previous interaction only.
        self.status_message = None;
        let recovered = self.criteria.sanitize(&ds.universe);
        if !recovered.is_empty() {
            let msg = recovered
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            log::warn!("Reset invalid filter value(s): {msg}");
            self.status_message = Some(format!("Filter reset: {msg}"));
        }

        self.view = filtered_indices(&ds, &self.criteria);
        self.derived = DerivedViews::compute(&ds, &self.view, &self.config.aggregate_settings());
        log::debug!(
            "Filtered {} of {} properties with {:?}",
            self.view.len(),
            ds.len(),
            self.criteria
        );

        if let Some(index) = self.selected {
            if !self.view.indices.contains(&index) {
                log::warn!("Clearing selection: row {index} is no longer visible");
                self.selected = None;
            }
        }
    }

    // ---- filter mutations ----

    pub fn set_province(&mut self, province: Option<String>) {
        if let Some(ds) = self.dataset.clone() {
            self.criteria.set_province(province, &ds.universe);
        } else {
            self.criteria.province = province;
        }
        self.refilter();
    }

    /// Set the district filter. A district outside the selected province is
    /// rejected by `refilter` and reset.
    pub fn set_district(&mut self, district: Option<String>) {
        self.criteria.district = district;
        self.refilter();
    }

    pub fn set_commodity(&mut self, commodity: Option<String>) {
        self.criteria.commodity = commodity;
        self.refilter();
    }

    pub fn set_status(&mut self, status: Option<Status>) {
        self.criteria.status = status;
        self.refilter();
    }

    /// A bound at or above the dataset maximum is stored as "no bound".
    pub fn set_max_distance(&mut self, max_distance_km: Option<f64>) {
        let at_max = match (&self.dataset, max_distance_km) {
            (Some(ds), Some(v)) => v >= ds.universe.max_distance_km,
            _ => false,
        };
        self.criteria.max_distance_km = if at_max { None } else { max_distance_km };
        self.refilter();
    }

    pub fn set_exclude_questionable(&mut self, exclude: bool) {
        self.criteria.exclude_questionable = exclude;
        self.refilter();
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.refilter();
    }

    // ---- selection ----

    /// Select a property by name. Only properties in the current filtered
    /// view can be selected; anything else clears the selection. With
    /// duplicate names the first visible row wins.
    pub fn select(&mut self, name: &str) -> Result<(), NotFoundError> {
        let Some(ds) = self.dataset.clone() else {
            self.selected = None;
            return Err(NotFoundError {
                name: name.to_string(),
            });
        };
        match resolve(self.view.properties(&ds), name) {
            Ok(p) => {
                self.selected = self
                    .view
                    .indices
                    .iter()
                    .copied()
                    .find(|&i| std::ptr::eq(&ds.properties[i], p));
                Ok(())
            }
            Err(e) => {
                log::warn!("Selection rejected: {e}");
                self.selected = None;
                Err(e)
            }
        }
    }

    /// Select a specific dataset row, as clicked in the table or on the map.
    /// The row must be part of the current view.
    pub fn select_row(&mut self, index: usize) -> Result<(), NotFoundError> {
        if self.view.indices.contains(&index) {
            self.selected = Some(index);
            return Ok(());
        }
        let name = self
            .dataset
            .as_deref()
            .and_then(|ds| ds.properties.get(index))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("row {index}"));
        let err = NotFoundError { name };
        log::warn!("Selection rejected: {err}");
        self.selected = None;
        Err(err)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The selected property. `refilter` keeps it inside the view.
    pub fn selected_property(&self) -> Option<&Property> {
        let ds = self.dataset.as_deref()?;
        let index = self.selected?;
        ds.properties.get(index)
    }

    pub fn selected_detail(&self) -> Option<PropertyDetail<'_>> {
        self.selected_property()
            .map(|p| PropertyDetail::new(p, &self.config.base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(Arc::new(fixtures::reference_dataset()));
        state
    }

    #[test]
    fn fresh_dataset_shows_everything() {
        let state = loaded();
        assert_eq!(state.view.len(), 239);
        assert!(!state.view.is_filtered());
        assert_eq!(state.derived.markers.len(), 239);
        assert_eq!(state.derived.provinces.values().sum::<usize>(), 239);
    }

    #[test]
    fn province_then_commodity_narrows() {
        let mut state = loaded();
        state.set_province(Some("Copperbelt Province".into()));
        assert_eq!(state.view.len(), 30);
        state.set_commodity(Some("Copper".into()));
        assert!(state.view.len() <= 30);
        assert_eq!(state.derived.markers.len(), state.view.len());
    }

    #[test]
    fn selecting_filtered_out_property_fails_and_clears() {
        let mut state = loaded();
        state.select("Lusaka Prospect 1").unwrap();
        assert_eq!(
            state.selected_property().map(|p| p.name.as_str()),
            Some("Lusaka Prospect 1")
        );

        state.set_province(Some("Copperbelt Province".into()));
        // The old selection is no longer visible.
        assert_eq!(state.selected, None);

        let err = state.select("Lusaka Prospect 1").unwrap_err();
        assert_eq!(err.name, "Lusaka Prospect 1");
        assert_eq!(state.selected, None);
        assert!(state.selected_detail().is_none());
    }

    #[test]
    fn selection_survives_compatible_filters() {
        let mut state = loaded();
        state.select("Copperbelt Prospect 1").unwrap();
        state.set_province(Some("Copperbelt Province".into()));
        let detail = state.selected_detail().expect("still selected");
        assert_eq!(detail.property.name, "Copperbelt Prospect 1");
        assert_eq!(detail.route[0], state.config.base.coordinates());
    }

    #[test]
    fn duplicate_names_select_the_clicked_row() {
        let mut a = fixtures::property("Twin", "Central Province", "Kabwe");
        a.reserves = Some("first".into());
        let mut b = fixtures::property("Twin", "Central Province", "Mkushi");
        b.reserves = Some("second".into());
        let mut state = AppState::default();
        state.set_dataset(Arc::new(PropertyDataset::from_properties(vec![a, b])));

        state.select_row(1).unwrap();
        assert_eq!(state.selected, Some(1));
        let detail = state.selected_detail().expect("selected");
        assert_eq!(detail.property.reserves.as_deref(), Some("second"));

        // Selecting by name still follows the first-match rule.
        state.select("Twin").unwrap();
        assert_eq!(state.selected, Some(0));

        // Row 1 is filtered out by district; clicking it is rejected.
        state.set_province(Some("Central Province".into()));
        state.set_district(Some("Kabwe".into()));
        assert!(state.select_row(1).is_err());
        assert_eq!(state.selected, None);
    }

    #[test]
    fn foreign_district_is_reset() {
        let mut state = loaded();
        state.set_province(Some("Lusaka Province".into()));
        state.set_district(Some("Chingola".into()));
        assert_eq!(state.criteria.district, None);
        assert_eq!(state.criteria.province.as_deref(), Some("Lusaka Province"));
        assert_eq!(state.view.len(), 22);
        assert!(state.status_message.is_some());
    }

    #[test]
    fn filter_reset_message_clears_on_next_valid_change() {
        let mut state = loaded();
        state.set_province(Some("Lusaka Province".into()));
        state.set_district(Some("Chingola".into()));
        assert!(state.status_message.is_some());

        state.set_status(Some(Status::Active));
        assert_eq!(state.status_message, None);
    }

    #[test]
    fn switching_province_drops_district() {
        let mut state = loaded();
        state.set_province(Some("Copperbelt Province".into()));
        state.set_district(Some("Chingola".into()));
        assert_eq!(state.view.len(), 5);
        state.set_province(Some("Southern Province".into()));
        assert_eq!(state.criteria.district, None);
        assert_eq!(state.view.len(), 28);
    }

    #[test]
    fn slider_at_maximum_means_no_bound() {
        let mut state = loaded();
        let max = state.dataset.as_ref().unwrap().universe.max_distance_km;
        state.set_max_distance(Some(max));
        assert_eq!(state.criteria.max_distance_km, None);
        assert!(!state.view.is_filtered());

        state.set_max_distance(Some(200.0));
        assert_eq!(state.criteria.max_distance_km, Some(200.0));
        let ds = state.dataset.clone().unwrap();
        assert!(state
            .view
            .properties(&ds)
            .all(|p| p.distance_from_base_km <= 200.0));
    }

    #[test]
    fn questionable_toggle() {
        let mut state = loaded();
        state.set_exclude_questionable(true);
        assert_eq!(state.view.len(), 211);
        state.clear_filters();
        assert_eq!(state.view.len(), 239);
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = loaded();
        let err = state.load_path(Path::new("/definitely/not/here.csv"));
        assert!(matches!(err, Err(DataLoadError::NotFound { .. })));
        assert_eq!(state.view.len(), 239);
        assert!(state.status_message.is_some());
    }
}
