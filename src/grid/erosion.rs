//! Minimum-filter erosion of the belief raster.
//!
//! A drivable-map pixel must not report more freedom than the least-free
//! belief pixel inside a robot-sized neighborhood, so each output pixel is
//! the minimum over a square kernel. The 2D filter decomposes into two
//! separable 1D passes (rows, then columns), each a sliding-window minimum
//! over a monotonic deque, so the cost is independent of the kernel size.

use std::collections::VecDeque;

/// Erode `src` into `dst` with a square kernel of side `kernel`.
///
/// Both buffers are row-major `width × height`. The kernel is anchored at
/// `kernel / 2` and truncated at the image border.
pub fn erode_min(src: &[u8], dst: &mut [u8], width: usize, height: usize, kernel: usize) {
    assert_eq!(src.len(), width * height, "source buffer size mismatch");
    assert_eq!(dst.len(), src.len(), "destination buffer size mismatch");
    assert!(kernel > 0, "kernel must be nonzero");

    if kernel == 1 {
        dst.copy_from_slice(src);
        return;
    }

    // Horizontal pass.
    let mut rows = vec![0u8; src.len()];
    for y in 0..height {
        let range = y * width..(y + 1) * width;
        sliding_min(&src[range.clone()], &mut rows[range], kernel);
    }

    // Vertical pass, one column at a time through gather buffers.
    let mut column = vec![0u8; height];
    let mut eroded = vec![0u8; height];
    for x in 0..width {
        for y in 0..height {
            column[y] = rows[y * width + x];
        }
        sliding_min(&column, &mut eroded, kernel);
        for y in 0..height {
            dst[y * width + x] = eroded[y];
        }
    }
}

/// 1D sliding-window minimum.
///
/// Output `i` covers input `[i - kernel/2, i + (kernel-1)/2]`, clamped to
/// the slice. The deque keeps candidate indices with increasing values;
/// the front is always the window minimum.
fn sliding_min(src: &[u8], dst: &mut [u8], kernel: usize) {
    let n = src.len();
    let reach_back = kernel / 2;
    let reach_ahead = kernel - 1 - reach_back;

    let mut window: VecDeque<usize> = VecDeque::with_capacity(kernel);
    let mut next = 0;
    for i in 0..n {
        let last = (i + reach_ahead).min(n - 1);
        while next <= last {
            while window.back().is_some_and(|&b| src[next] <= src[b]) {
                window.pop_back();
            }
            window.push_back(next);
            next += 1;
        }
        let first = i.saturating_sub(reach_back);
        while window.front().is_some_and(|&f| f < first) {
            window.pop_front();
        }
        dst[i] = src[window[0]];
    }
}
