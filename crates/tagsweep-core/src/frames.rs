//! # Frames
//!
//! Row-major `f32` matrices with a shape checked at construction. Encoded
//! sentences are `[time_steps, word_vector_size]` frames, encoded tag
//! sequences `[time_steps, tag_encoding_size]` frames.

use candle_core::{Device, Tensor};

use crate::error::{Result, TagsweepError};

/// A dense `rows x cols` matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Frames {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Frames {
    /// Wrap `data` as a `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(TagsweepError::ShapeMismatch {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Stack equally sized rows into a matrix.
    pub fn from_rows<R: AsRef<[f32]>>(cols: usize, rows: &[R]) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(TagsweepError::ShapeMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact(0) panics, and a zero-width matrix has no observable rows
        self.data.chunks_exact(self.cols.max(1))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Copy rows `start..start + len` into a new matrix.
    pub fn window(&self, start: usize, len: usize) -> Result<Self> {
        if start + len > self.rows {
            return Err(TagsweepError::ShapeMismatch {
                expected: start + len,
                actual: self.rows,
            });
        }
        Self::new(
            len,
            self.cols,
            self.data[start * self.cols..(start + len) * self.cols].to_vec(),
        )
    }

    /// Convert to a `[rows, cols]` tensor.
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor> {
        Ok(Tensor::from_slice(&self.data, (self.rows, self.cols), device)?)
    }
}

/// Stack same-shaped frames into one `[n, rows, cols]` tensor.
pub fn stack_frames(frames: &[Frames], device: &Device) -> Result<Tensor> {
    let Some(first) = frames.first() else {
        return Err(TagsweepError::ShapeMismatch {
            expected: 1,
            actual: 0,
        });
    };
    let (rows, cols) = first.shape();
    let mut data = Vec::with_capacity(frames.len() * rows * cols);
    for f in frames {
        if f.shape() != (rows, cols) {
            return Err(TagsweepError::ShapeMismatch {
                expected: rows * cols,
                actual: f.rows * f.cols,
            });
        }
        data.extend_from_slice(&f.data);
    }
    Ok(Tensor::from_vec(data, (frames.len(), rows, cols), device)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        assert!(Frames::new(2, 3, vec![0.0; 5]).is_err());
        assert!(Frames::from_rows(2, &[vec![0.0f32, 1.0], vec![1.0]]).is_err());
    }

    #[test]
    fn rows_and_windows() {
        let f = Frames::from_rows(2, &[[1.0f32, 0.0], [0.0, 1.0], [0.5, 0.5]]).unwrap();
        assert_eq!(f.shape(), (3, 2));
        assert_eq!(f.row(1), &[0.0, 1.0]);
        assert_eq!(f.iter_rows().count(), 3);

        let w = f.window(1, 2).unwrap();
        assert_eq!(w.row(0), &[0.0, 1.0]);
        assert_eq!(w.row(1), &[0.5, 0.5]);
        assert!(f.window(2, 2).is_err());
    }

    #[test]
    fn stacks_into_batch_tensor() {
        let a = Frames::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Frames::new(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let t = stack_frames(&[a, b], &Device::Cpu).unwrap();
        assert_eq!(t.dims(), &[2, 2, 2]);
        let v: Vec<Vec<Vec<f32>>> = t.to_vec3().unwrap();
        assert_eq!(v[1][0], vec![5.0, 6.0]);
    }

    #[test]
    fn stack_rejects_mixed_shapes() {
        let a = Frames::new(2, 2, vec![0.0; 4]).unwrap();
        let b = Frames::new(1, 2, vec![0.0; 2]).unwrap();
        assert!(stack_frames(&[a, b], &Device::Cpu).is_err());
        assert!(stack_frames(&[], &Device::Cpu).is_err());
    }
}
