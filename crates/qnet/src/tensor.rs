use crate::error::{QNetError, Result};
use compute::BufferView;

/// Dense row-major `f32` tensor living on the host.
///
/// The shape is fixed once the tensor exists: values may be overwritten in
/// place through [`Tensor::data_mut`], but never resized.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl Tensor {
    /// Builds a tensor, checking that `data` fills `shape` exactly.
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let Some(expected) = shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)) else {
            return Err(QNetError::InvalidShape(format!("shape {shape:?} is too large")));
        };
        if shape.is_empty() || expected != data.len() {
            return Err(QNetError::InvalidShape(format!(
                "shape {shape:?} needs {expected} values, got {}",
                data.len()
            )));
        }
        Ok(Self { data, shape })
    }

    /// A rank-1 tensor over `data`.
    #[must_use]
    pub fn vector(data: Vec<f32>) -> Self {
        Self { shape: vec![data.len()], data }
    }

    /// Stacks equal-length rank-1 tensors into a `[rows, dim]` batch.
    pub fn stack(rows: &[Tensor]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(QNetError::InvalidShape("cannot stack an empty batch".into()));
        };
        let dim = first.len();
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            if row.rank() != 1 || row.len() != dim {
                return Err(QNetError::InvalidShape(format!(
                    "cannot stack row of shape {:?} into rows of length {dim}",
                    row.shape
                )));
            }
            data.extend_from_slice(&row.data);
        }
        Self::from_vec(vec![rows.len(), dim], data)
    }

    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    #[must_use]
    pub fn last_dim(&self) -> usize {
        self.shape.last().copied().unwrap_or(0)
    }

    /// Number of rows when viewed as a batch; a rank-1 tensor is one row.
    /// Tensors of any other rank have no rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        match self.shape.as_slice() {
            [_] => 1,
            [rows, _] => *rows,
            _ => 0,
        }
    }

    /// The `i`-th row of a rank-1 or rank-2 tensor viewed as a batch.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        let dim = self.last_dim();
        if i >= self.rows() {
            return None;
        }
        self.data.get(i * dim..(i + 1) * dim)
    }

    /// Same values under a new shape with the same element count.
    pub fn reshape(self, shape: Vec<usize>) -> Result<Self> {
        Self::from_vec(shape, self.data)
    }

    /// Index of the largest value, first one on ties.
    #[must_use]
    pub fn argmax(&self) -> Option<usize> {
        self.data
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((i, v)),
            })
            .map(|(i, _)| i)
    }

    pub fn to_buffer_view(&self) -> BufferView {
        BufferView::from_f32(&self.data, self.shape.clone())
    }

    /// Wraps the primary output of a kernel dispatch.
    pub fn from_output(shape: Vec<usize>, bytes: &[u8]) -> Result<Self> {
        Self::from_vec(shape, compute::f32_values(bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_checks_element_count() {
        assert!(Tensor::from_vec(vec![2, 2], vec![1.0; 4]).is_ok());
        assert!(matches!(
            Tensor::from_vec(vec![2, 3], vec![1.0; 4]),
            Err(QNetError::InvalidShape(_))
        ));
    }

    #[test]
    fn rows_of_vector_and_matrix() {
        let v = Tensor::vector(vec![1.0, 2.0]);
        assert_eq!(v.rows(), 1);
        assert_eq!(v.row(0), Some(&[1.0, 2.0][..]));
        assert_eq!(v.row(1), None);

        let m = Tensor::from_vec(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m.row(1), Some(&[3.0, 4.0][..]));
    }

    #[test]
    fn higher_ranks_have_no_rows() {
        let t = Tensor::from_vec(vec![2, 2, 3], vec![1.0; 12]).unwrap();
        assert_eq!(t.rows(), 0);
        assert_eq!(t.row(0), None);
    }

    #[test]
    fn overflowing_shape_is_rejected() {
        assert!(matches!(
            Tensor::from_vec(vec![usize::MAX, 2], Vec::new()),
            Err(QNetError::InvalidShape(_))
        ));
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(Tensor::vector(vec![0.5, 2.0, 2.0]).argmax(), Some(1));
        assert_eq!(Tensor::vector(Vec::new()).argmax(), None);
    }
}
