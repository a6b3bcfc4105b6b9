use rayon::prelude::*;

use yolox_image::Image;
use yolox_tensor::Tensor2;

/// Apply a function to each pixel in the image in parallel.
///
/// `src` and `dst` must have the same number of columns; rows are processed
/// concurrently and pixels within a row sequentially.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
{
    let cols = src.cols();
    if cols == 0 {
        return;
    }
    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Fill every destination pixel from a pair of sampling maps in parallel.
///
/// `map_x` and `map_y` hold, for each destination pixel, the source
/// coordinates to sample from.
pub fn par_iter_rows_resample<T, const C: usize>(
    dst: &mut Image<T, C>,
    map_x: &Tensor2<f32>,
    map_y: &Tensor2<f32>,
    f: impl Fn(&f32, &f32, &mut [T]) + Send + Sync,
) where
    T: Send + Sync,
{
    let cols = dst.cols();
    if cols == 0 {
        return;
    }
    let map_x_slice = map_x.as_slice();
    let map_y_slice = map_y.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(C * cols)
        .zip(map_x_slice.par_chunks_exact(cols))
        .zip(map_y_slice.par_chunks_exact(cols))
        .for_each(|((dst_chunk, map_x_chunk), map_y_chunk)| {
            dst_chunk
                .chunks_exact_mut(C)
                .zip(map_x_chunk.iter().zip(map_y_chunk.iter()))
                .for_each(|(dst_pixel, (x, y))| {
                    f(x, y, dst_pixel);
                });
        });
}
