use thiserror::Error;

/// An error type for tensor operations.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// The number of elements does not match the requested shape.
    #[error("Shape mismatch: expected {expected} elements for shape, but got {actual} elements in data")]
    InvalidShape {
        /// Expected number of elements based on shape
        expected: usize,
        /// Actual number of elements in the data
        actual: usize,
    },

    /// Index exceeds tensor bounds.
    #[error("Index {index} is out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The offending index
        index: usize,
        /// The size of the dimension
        size: usize,
    },

    /// The axes passed to a permutation are not a permutation of `0..N`.
    #[error("Invalid axes permutation {0:?}")]
    InvalidPermutation(Vec<usize>),
}

impl TensorError {
    /// Shorthand for [`TensorError::InvalidShape`].
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }
}

/// Compute the row-major strides for a given shape.
///
/// # Examples
///
/// ```rust
/// use yolox_tensor::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape([2, 3]), [3, 1]);
/// assert_eq!(get_strides_from_shape([2, 3, 4]), [12, 4, 1]);
/// ```
pub fn get_strides_from_shape<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides: [usize; N] = [0; N];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// A multi-dimensional array with owned, contiguous, row-major data.
///
/// # Type Parameters
///
/// * `T` - The element type stored in the tensor
/// * `N` - The number of dimensions
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<T, const N: usize> {
    data: Vec<T>,
    /// The shape of the tensor.
    pub shape: [usize; N],
    /// The strides of the tensor data in memory.
    pub strides: [usize; N],
}

impl<T, const N: usize> Tensor<T, N> {
    /// Creates a new `Tensor` with the given shape and data.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape of the tensor, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use yolox_tensor::Tensor2;
    ///
    /// let t = Tensor2::<u8>::from_shape_vec([2, 2], vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(t.shape, [2, 2]);
    /// ```
    pub fn from_shape_vec(shape: [usize; N], data: Vec<T>) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }
        let strides = get_strides_from_shape(shape);
        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    /// Creates a new `Tensor` with the given shape filled with `value`.
    ///
    /// ```
    /// use yolox_tensor::Tensor3;
    ///
    /// let t = Tensor3::<u8>::from_shape_val([2, 1, 3], 2);
    /// assert_eq!(t.as_slice(), &[2, 2, 2, 2, 2, 2]);
    /// ```
    pub fn from_shape_val(shape: [usize; N], value: T) -> Self
    where
        T: Clone,
    {
        let numel = shape.iter().product::<usize>();
        Self {
            data: vec![value; numel],
            shape,
            strides: get_strides_from_shape(shape),
        }
    }

    /// Creates a new `Tensor` generating each element from its index.
    ///
    /// ```
    /// use yolox_tensor::Tensor2;
    ///
    /// let t = Tensor2::<u8>::from_shape_fn([2, 2], |[i, j]| (i * 2 + j) as u8);
    /// assert_eq!(t.as_slice(), &[0, 1, 2, 3]);
    /// ```
    pub fn from_shape_fn<F>(shape: [usize; N], f: F) -> Self
    where
        F: Fn([usize; N]) -> T,
    {
        let numel = shape.iter().product::<usize>();
        let data = (0..numel)
            .map(|i| {
                let mut index = [0; N];
                let mut j = i;
                for k in (0..N).rev() {
                    index[k] = j % shape[k];
                    j /= shape[k];
                }
                f(index)
            })
            .collect();
        Self {
            data,
            shape,
            strides: get_strides_from_shape(shape),
        }
    }

    /// Creates a tensor filled with `T::default()`, i.e. zeros or `false`.
    pub fn zeros(shape: [usize; N]) -> Self
    where
        T: Clone + Default,
    {
        Self::from_shape_val(shape, T::default())
    }

    /// Returns the number of elements in the tensor.
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Get the data of the tensor as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the data of the tensor as a mutable slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the tensor and returns its data.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Iterate over the elements in memory order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Returns the memory offset for the given index, or `None` if out of bounds.
    pub fn get_iter_offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for ((&idx, &dim_size), &stride) in index.iter().zip(self.shape.iter()).zip(&self.strides)
        {
            if idx >= dim_size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Get the element at the given index, checking bounds.
    ///
    /// ```
    /// use yolox_tensor::Tensor2;
    ///
    /// let t = Tensor2::<u8>::from_shape_vec([2, 2], vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(t.get([1, 0]), Some(&3));
    /// assert!(t.get([2, 0]).is_none());
    /// ```
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.get_iter_offset(index).map(|i| &self.data[i])
    }

    /// Get the element at the given index without checking each dimension.
    ///
    /// # Panics
    ///
    /// Panics if the computed offset exceeds the storage length.
    pub fn get_unchecked(&self, index: [usize; N]) -> &T {
        let offset = index
            .iter()
            .zip(self.strides.iter())
            .fold(0, |acc, (&i, &s)| acc + i * s);
        &self.data[offset]
    }

    /// Apply `f` to every element, producing a tensor of the same shape.
    ///
    /// ```
    /// use yolox_tensor::Tensor1;
    ///
    /// let t = Tensor1::<u8>::from_shape_vec([4], vec![1, 2, 3, 4]).unwrap();
    /// let t2 = t.map(|x| *x as f32 / 2.0);
    /// assert_eq!(t2.as_slice(), &[0.5, 1.0, 1.5, 2.0]);
    /// ```
    pub fn map<U, F>(&self, f: F) -> Tensor<U, N>
    where
        F: Fn(&T) -> U,
    {
        Tensor {
            data: self.data.iter().map(f).collect(),
            shape: self.shape,
            strides: self.strides,
        }
    }

    /// Reorder the axes of the tensor, returning a contiguous copy.
    ///
    /// `axes[i]` is the source axis that becomes axis `i` of the output, so
    /// `[2, 0, 1]` turns an `(H, W, C)` tensor into `(C, H, W)`.
    ///
    /// # Errors
    ///
    /// If `axes` is not a permutation of `0..N`, an error is returned.
    pub fn permute_axes(&self, axes: [usize; N]) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        let mut seen = [false; N];
        for &axis in axes.iter() {
            if axis >= N || seen[axis] {
                return Err(TensorError::InvalidPermutation(axes.to_vec()));
            }
            seen[axis] = true;
        }

        let mut shape = [0; N];
        let mut src_strides = [0; N];
        for (i, &axis) in axes.iter().enumerate() {
            shape[i] = self.shape[axis];
            src_strides[i] = self.strides[axis];
        }

        let numel = self.numel();
        let mut data = Vec::with_capacity(numel);
        let mut index = [0usize; N];
        for _ in 0..numel {
            let offset = index
                .iter()
                .zip(src_strides.iter())
                .fold(0, |acc, (&i, &s)| acc + i * s);
            data.push(self.data[offset].clone());

            // advance the output index in row-major order
            for k in (0..N).rev() {
                index[k] += 1;
                if index[k] < shape[k] {
                    break;
                }
                index[k] = 0;
            }
        }

        Tensor::from_shape_vec(shape, data)
    }
}
