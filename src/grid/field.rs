//! Gridded variables with named dimensions.
//!
//! A [`Field`] is one named variable with flat C-order storage and an
//! ordered dimension list drawn from time, lev, lat, lon. Rank runs from
//! 1 (a plain time series) to 4 (time x lev x lat x lon); the statistics
//! routines dispatch on the dimension list. Missing values are NaN.

use std::fmt;

use crate::grid::{GridError, GridWindow};

/// Named dimension of a gridded variable.
///
/// The variants are ordered the way they appear in storage, so a valid
/// dimension list is always strictly increasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DimKind {
    Time,
    Lev,
    Lat,
    Lon,
}

impl DimKind {
    /// Conventional axis name, e.g. `"lat"`.
    pub fn name(&self) -> &'static str {
        match self {
            DimKind::Time => "time",
            DimKind::Lev => "lev",
            DimKind::Lat => "lat",
            DimKind::Lon => "lon",
        }
    }
}

impl fmt::Display for DimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One gridded variable: metadata plus flat C-order data.
///
/// # Example
///
/// ```
/// use clpost_rs::grid::{DimKind, Field};
///
/// let field = Field::new(
///     "HCl_total",
///     "Mg/grid/month",
///     vec![DimKind::Lat, DimKind::Lon],
///     vec![2, 3],
///     vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
/// )
/// .unwrap();
///
/// assert_eq!(field.rank(), 2);
/// assert_eq!(field.get(&[1, 2]), 6.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Variable name as stored in the dataset.
    pub name: String,
    /// Units string from the `units` attribute (empty when absent).
    pub units: String,
    /// Optional descriptive name from the `long_name` attribute.
    pub long_name: Option<String>,
    dims: Vec<DimKind>,
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Field {
    /// Create a field.
    ///
    /// `dims` must be strictly increasing in storage order
    /// (time, lev, lat, lon) and `data.len()` must equal the product
    /// of `shape`.
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        dims: Vec<DimKind>,
        shape: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self, GridError> {
        let name = name.into();
        if dims.is_empty() || dims.len() != shape.len() {
            return Err(GridError::BadDims {
                name,
                reason: format!("{} dims vs {} shape entries", dims.len(), shape.len()),
            });
        }
        if dims.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(GridError::BadDims {
                name,
                reason: format!("dimensions {:?} not in storage order", dims),
            });
        }
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(GridError::ShapeMismatch {
                name,
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            name,
            units: units.into(),
            long_name: None,
            dims,
            shape,
            data,
        })
    }

    /// Set the descriptive name (builder style).
    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    #[inline]
    pub fn dims(&self) -> &[DimKind] {
        &self.dims
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    pub fn into_values(self) -> Vec<f64> {
        self.data
    }

    /// Whether the field has the given dimension.
    pub fn has_dim(&self, dim: DimKind) -> bool {
        self.dims.contains(&dim)
    }

    /// Length of the given dimension, if present.
    pub fn dim_len(&self, dim: DimKind) -> Option<usize> {
        self.axis_of(dim).map(|axis| self.shape[axis])
    }

    /// Axis position of the given dimension, if present.
    pub fn axis_of(&self, dim: DimKind) -> Option<usize> {
        self.dims.iter().position(|d| *d == dim)
    }

    /// Flat index for a multi-index.
    #[inline]
    pub fn index(&self, idx: &[usize]) -> usize {
        debug_assert_eq!(idx.len(), self.shape.len());
        let mut flat = 0;
        for (axis, &i) in idx.iter().enumerate() {
            debug_assert!(i < self.shape[axis], "index out of range on axis {}", axis);
            flat = flat * self.shape[axis] + i;
        }
        flat
    }

    /// Value at a multi-index.
    #[inline]
    pub fn get(&self, idx: &[usize]) -> f64 {
        self.data[self.index(idx)]
    }

    /// Whether the two trailing dimensions are lat and lon.
    pub fn is_horizontal(&self) -> bool {
        self.dims.len() >= 2 && self.dims[self.dims.len() - 2..] == [DimKind::Lat, DimKind::Lon]
    }

    /// Number of values in one horizontal slab (`n_lat * n_lon`).
    ///
    /// # Panics
    ///
    /// Panics when the field has no trailing lat/lon dimensions.
    pub fn horizontal_len(&self) -> usize {
        assert!(self.is_horizontal(), "field '{}' has no lat/lon slab", self.name);
        self.shape[self.shape.len() - 2] * self.shape[self.shape.len() - 1]
    }

    /// Iterate over the horizontal slabs, one per leading index combination.
    pub fn horizontal_slabs(&self) -> std::slice::ChunksExact<'_, f64> {
        let len = self.horizontal_len();
        self.data.chunks_exact(len)
    }

    /// Mutable variant of [`Field::horizontal_slabs`].
    pub fn horizontal_slabs_mut(&mut self) -> std::slice::ChunksExactMut<'_, f64> {
        let len = self.horizontal_len();
        self.data.chunks_exact_mut(len)
    }

    /// Multiply every value in place.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// Replace NaN values in place.
    pub fn fill_nan(&mut self, value: f64) {
        for v in &mut self.data {
            if v.is_nan() {
                *v = value;
            }
        }
    }

    /// Combine two fields element-wise into a new one.
    ///
    /// The fields must have identical dimensions and shape; this is the
    /// alignment contract for arithmetic between datasets.
    pub fn zip_with(
        &self,
        other: &Field,
        name: impl Into<String>,
        units: impl Into<String>,
        mut f: impl FnMut(f64, f64) -> f64,
    ) -> Result<Field, GridError> {
        if self.dims != other.dims || self.shape != other.shape {
            return Err(GridError::FieldMismatch {
                left: self.summary(),
                right: other.summary(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Field::new(name, units, self.dims.clone(), self.shape.clone(), data)
    }

    /// Subset along one dimension, keeping the listed indices in order.
    pub fn select_indices(&self, dim: DimKind, indices: &[usize]) -> Result<Field, GridError> {
        let axis = self
            .axis_of(dim)
            .ok_or_else(|| GridError::MissingDim {
                name: self.name.clone(),
                dim,
            })?;
        let (outer, mid, inner) = self.split_at_axis(axis);
        if let Some(&bad) = indices.iter().find(|&&i| i >= mid) {
            return Err(GridError::BadDims {
                name: self.name.clone(),
                reason: format!("index {} out of range for {} (len {})", bad, dim, mid),
            });
        }

        let mut data = Vec::with_capacity(outer * indices.len() * inner);
        for o in 0..outer {
            for &m in indices {
                let start = (o * mid + m) * inner;
                data.extend_from_slice(&self.data[start..start + inner]);
            }
        }
        let mut shape = self.shape.clone();
        shape[axis] = indices.len();
        let mut out = Field::new(&self.name, &self.units, self.dims.clone(), shape, data)?;
        out.long_name = self.long_name.clone();
        Ok(out)
    }

    /// Extract one index along a dimension, dropping that dimension.
    pub fn select_level(&self, dim: DimKind, index: usize) -> Result<Field, GridError> {
        let axis = self
            .axis_of(dim)
            .ok_or_else(|| GridError::MissingDim {
                name: self.name.clone(),
                dim,
            })?;
        let (outer, mid, inner) = self.split_at_axis(axis);
        if index >= mid {
            return Err(GridError::BadDims {
                name: self.name.clone(),
                reason: format!("index {} out of range for {} (len {})", index, dim, mid),
            });
        }

        let mut data = Vec::with_capacity(outer * inner);
        for o in 0..outer {
            let start = (o * mid + index) * inner;
            data.extend_from_slice(&self.data[start..start + inner]);
        }
        let mut dims = self.dims.clone();
        let mut shape = self.shape.clone();
        dims.remove(axis);
        shape.remove(axis);
        let mut out = Field::new(&self.name, &self.units, dims, shape, data)?;
        out.long_name = self.long_name.clone();
        Ok(out)
    }

    /// Average along one dimension, dropping it. NaN values are omitted;
    /// a position with no valid values becomes NaN.
    pub fn mean_along(&self, dim: DimKind) -> Result<Field, GridError> {
        let axis = self
            .axis_of(dim)
            .ok_or_else(|| GridError::MissingDim {
                name: self.name.clone(),
                dim,
            })?;
        let (outer, mid, inner) = self.split_at_axis(axis);

        let mut sums = vec![0.0; outer * inner];
        let mut counts = vec![0usize; outer * inner];
        for o in 0..outer {
            for m in 0..mid {
                let start = (o * mid + m) * inner;
                for i in 0..inner {
                    let v = self.data[start + i];
                    if !v.is_nan() {
                        sums[o * inner + i] += v;
                        counts[o * inner + i] += 1;
                    }
                }
            }
        }
        let data = sums
            .into_iter()
            .zip(counts)
            .map(|(s, n)| if n > 0 { s / n as f64 } else { f64::NAN })
            .collect();

        let mut dims = self.dims.clone();
        let mut shape = self.shape.clone();
        dims.remove(axis);
        shape.remove(axis);
        let mut out = Field::new(&self.name, &self.units, dims, shape, data)?;
        out.long_name = self.long_name.clone();
        Ok(out)
    }

    /// Crop the horizontal dimensions to a grid window.
    pub fn crop(&self, window: &GridWindow) -> Result<Field, GridError> {
        if !self.is_horizontal() {
            return Err(GridError::MissingDim {
                name: self.name.clone(),
                dim: DimKind::Lat,
            });
        }
        let lat_indices: Vec<usize> = window.lat.clone().collect();
        let lon_indices: Vec<usize> = window.lon.clone().collect();
        self.select_indices(DimKind::Lat, &lat_indices)?
            .select_indices(DimKind::Lon, &lon_indices)
    }

    /// One-line description for logs and errors.
    pub fn summary(&self) -> String {
        let dims: Vec<String> = self
            .dims
            .iter()
            .zip(&self.shape)
            .map(|(d, s)| format!("{}={}", d, s))
            .collect();
        if self.units.is_empty() {
            format!("{} [{}]", self.name, dims.join(", "))
        } else {
            format!("{} [{}] ({})", self.name, dims.join(", "), self.units)
        }
    }

    /// Split the shape at an axis into (outer, mid, inner) products.
    fn split_at_axis(&self, axis: usize) -> (usize, usize, usize) {
        let outer: usize = self.shape[..axis].iter().product();
        let mid = self.shape[axis];
        let inner: usize = self.shape[axis + 1..].iter().product();
        (outer, mid, inner)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
