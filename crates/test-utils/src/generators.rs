//! Synthetic swath granule generators.
//!
//! Values follow simple predictable patterns so tests can check exactly which
//! samples were masked or relabelled.

use granule_model::{Attributes, Granule, Variable};
use ndarray::Array2;

pub const ALONG_TRACK: &str = "along_track";
pub const CROSS_TRACK: &str = "cross_track";

fn lon_grid(n_along: usize, n_cross: usize) -> Array2<f64> {
    Array2::from_shape_fn((n_along, n_cross), |(along, cross)| {
        -60.0 + 0.1 * cross as f64 + 0.05 * along as f64
    })
}

fn lat_grid(n_along: usize, n_cross: usize) -> Array2<f64> {
    Array2::from_shape_fn((n_along, n_cross), |(along, _cross)| -30.0 + 0.1 * along as f64)
}

/// Longitudes for a swath: `-60 + 0.1 * cross + 0.05 * along`.
///
/// Row-major over `(along_track, cross_track)`.
pub fn create_lon_grid(n_along: usize, n_cross: usize) -> Vec<f64> {
    lon_grid(n_along, n_cross).iter().copied().collect()
}

/// Latitudes for a swath: `-30 + 0.1 * along`, constant across track.
pub fn create_lat_grid(n_along: usize, n_cross: usize) -> Vec<f64> {
    lat_grid(n_along, n_cross).iter().copied().collect()
}

/// A field whose value encodes its position: `along * 1000 + cross`.
///
/// # Example
///
/// ```
/// use test_utils::create_index_field;
///
/// let field = create_index_field(2, 3);
/// assert_eq!(field, vec![0.0, 1.0, 2.0, 1000.0, 1001.0, 1002.0]);
/// ```
pub fn create_index_field(n_along: usize, n_cross: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(n_along * n_cross);
    for along in 0..n_along {
        for cross in 0..n_cross {
            data.push((along * 1000 + cross) as f64);
        }
    }
    data
}

/// Reflectivity-like profiles in dBZ, decreasing with range bin from 50 to 10.
///
/// Row-major over `(along_track, cross_track, range)`.
pub fn create_reflectivity_profiles(n_along: usize, n_cross: usize, n_range: usize) -> Vec<f64> {
    let step = if n_range > 1 {
        40.0 / (n_range - 1) as f64
    } else {
        0.0
    };
    (0..n_along * n_cross)
        .flat_map(|_| (0..n_range).map(move |bin| 50.0 - step * bin as f64))
        .collect()
}

/// Builder for swath granules with `lon` / `lat` coordinates over
/// `(along_track, cross_track)`.
///
/// # Example
///
/// ```
/// use test_utils::SwathBuilder;
///
/// let granule = SwathBuilder::new(2, 3)
///     .lat_at(0, 1, 95.0)
///     .with_field("Tc", vec![250.0; 6])
///     .build();
/// assert_eq!(granule.dim_size("cross_track"), Some(3));
/// ```
#[derive(Debug, Clone)]
pub struct SwathBuilder {
    n_along: usize,
    n_cross: usize,
    lon: Option<Array2<f64>>,
    lat: Option<Array2<f64>>,
    variables: Vec<(String, Variable)>,
    attrs: Attributes,
}

impl SwathBuilder {
    pub fn new(n_along: usize, n_cross: usize) -> Self {
        Self {
            n_along,
            n_cross,
            lon: Some(lon_grid(n_along, n_cross)),
            lat: Some(lat_grid(n_along, n_cross)),
            variables: Vec::new(),
            attrs: Attributes::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.n_along * self.n_cross
    }

    /// Override one latitude sample.
    pub fn lat_at(mut self, along: usize, cross: usize, value: f64) -> Self {
        if let Some(lat) = self.lat.as_mut() {
            lat[[along, cross]] = value;
        }
        self
    }

    /// Override one longitude sample.
    pub fn lon_at(mut self, along: usize, cross: usize, value: f64) -> Self {
        if let Some(lon) = self.lon.as_mut() {
            lon[[along, cross]] = value;
        }
        self
    }

    /// Drop the `lon` / `lat` coordinates.
    pub fn without_geolocation(mut self) -> Self {
        self.lon = None;
        self.lat = None;
        self
    }

    /// Add a `(along_track, cross_track)` data variable.
    pub fn with_field(self, name: &str, values: Vec<f64>) -> Self {
        self.with_field_attrs(name, values, Attributes::new())
    }

    pub fn with_field_attrs(mut self, name: &str, values: Vec<f64>, attrs: Attributes) -> Self {
        let var = shaped(name, [ALONG_TRACK, CROSS_TRACK], [self.n_along, self.n_cross], values)
            .with_attrs(attrs);
        self.variables.push((name.to_string(), var));
        self
    }

    /// Add a `(along_track, cross_track, dim)` data variable.
    pub fn with_profile(mut self, name: &str, dim: &str, size: usize, values: Vec<f64>) -> Self {
        let var = shaped(
            name,
            [ALONG_TRACK, CROSS_TRACK, dim],
            [self.n_along, self.n_cross, size],
            values,
        );
        self.variables.push((name.to_string(), var));
        self
    }

    /// Add an arbitrary data variable.
    pub fn with_variable(mut self, name: &str, var: Variable) -> Self {
        self.variables.push((name.to_string(), var));
        self
    }

    pub fn with_global_attr(mut self, key: &str, value: impl Into<granule_model::AttrValue>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Granule {
        let dims = [ALONG_TRACK, CROSS_TRACK];
        let mut granule = Granule::new();
        granule.attrs = self.attrs;
        if let Some(lon) = self.lon {
            granule
                .insert_coord("lon", Variable::new(dims, lon.into_dyn()))
                .expect("lon fits the swath");
        }
        if let Some(lat) = self.lat {
            granule
                .insert_coord("lat", Variable::new(dims, lat.into_dyn()))
                .expect("lat fits the swath");
        }
        for (name, var) in self.variables {
            if let Err(e) = granule.insert_data_var(name.as_str(), var) {
                panic!("invalid test variable '{}': {}", name, e);
            }
        }
        granule
    }
}

fn shaped<const N: usize>(name: &str, dims: [&str; N], shape: [usize; N], values: Vec<f64>) -> Variable {
    match Variable::from_shape_vec(dims, shape, values) {
        Ok(var) => var,
        Err(e) => panic!("invalid test variable '{}': {}", name, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geolocation_grids_are_valid() {
        let lon = create_lon_grid(100, 49);
        let lat = create_lat_grid(100, 49);
        assert_eq!(lon.len(), 4900);
        assert!(lon.iter().all(|v| (-180.0..=180.0).contains(v)));
        assert!(lat.iter().all(|v| (-90.0..=90.0).contains(v)));
    }

    #[test]
    fn test_reflectivity_profiles() {
        let profiles = create_reflectivity_profiles(1, 2, 5);
        assert_eq!(profiles, vec![50.0, 40.0, 30.0, 20.0, 10.0, 50.0, 40.0, 30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_builder_overrides() {
        let granule = SwathBuilder::new(2, 2)
            .lat_at(1, 0, 95.0)
            .lon_at(0, 1, 200.0)
            .build();
        assert_eq!(granule.coord("lat").unwrap().values().unwrap()[2], 95.0);
        assert_eq!(granule.coord("lon").unwrap().values().unwrap()[1], 200.0);
    }

    #[test]
    fn test_builder_without_geolocation() {
        let granule = SwathBuilder::new(2, 2)
            .without_geolocation()
            .with_field("Tc", vec![1.0; 4])
            .build();
        assert!(granule.coord("lat").is_none());
        assert!(granule.has_dim(CROSS_TRACK));
    }
}
