use ndarray::{ArrayView3, ArrayViewMut3};

/// A single video/image frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; everything inside the
/// pipeline works on this one representation. The `index` is the position
/// the pipeline assigned to the frame, not anything parsed from a filename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the rectangle `[x0, x1) × [y0, y1)` into a new frame.
    ///
    /// Coordinates are clamped to the frame; the crop inherits this frame's
    /// sequence index.
    pub fn crop(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> Frame {
        let x0 = x0.min(self.width);
        let y0 = y0.min(self.height);
        let x1 = x1.clamp(x0, self.width);
        let y1 = y1.clamp(y0, self.height);

        let cw = (x1 - x0) as usize;
        let ch = (y1 - y0) as usize;
        let c = self.channels as usize;
        let row_len = self.width as usize * c;

        let mut data = Vec::with_capacity(cw * ch * c);
        for row in y0 as usize..y1 as usize {
            let start = row * row_len + x0 as usize * c;
            data.extend_from_slice(&self.data[start..start + cw * c]);
        }
        Frame::new(data, cw as u32, ch as u32, self.channels, self.index)
    }

    /// Overwrites the region at `(x, y)` with `patch`, clipping at the
    /// frame edges. Channel counts must agree.
    pub fn paste(&mut self, patch: &Frame, x: u32, y: u32) {
        debug_assert_eq!(self.channels, patch.channels, "channel mismatch in paste");
        if x >= self.width || y >= self.height {
            return;
        }
        let c = self.channels as usize;
        let copy_w = patch.width.min(self.width - x) as usize;
        let copy_h = patch.height.min(self.height - y) as usize;
        let dst_row_len = self.width as usize * c;
        let src_row_len = patch.width as usize * c;

        for row in 0..copy_h {
            let dst_start = (y as usize + row) * dst_row_len + x as usize * c;
            let src_start = row * src_row_len;
            self.data[dst_start..dst_start + copy_w * c]
                .copy_from_slice(&patch.data[src_start..src_start + copy_w * c]);
        }
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(w: u32, h: u32) -> Frame {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                data.push(x as u8);
                data.push(y as u8);
                data.push(0);
            }
        }
        Frame::new(data, w, h, 3, 0)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_data_mut_allows_modification() {
        let data = vec![0u8; 6]; // 2x1x3
        let mut frame = Frame::new(data, 2, 1, 3, 0);
        frame.data_mut()[0] = 255;
        assert_eq!(frame.data()[0], 255);
    }

    #[test]
    fn test_clone_is_independent() {
        let data = vec![100u8; 12];
        let frame = Frame::new(data, 2, 2, 3, 0);
        let mut cloned = frame.clone();
        cloned.data_mut()[0] = 0;
        assert_eq!(frame.data()[0], 100);
        assert_eq!(cloned.data()[0], 0);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3, 0);
    }

    #[test]
    fn test_as_ndarray_shape() {
        let data = vec![0u8; 24]; // 2x4x3
        let frame = Frame::new(data, 4, 2, 3, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 4, 3]); // (height, width, channels)
    }

    #[test]
    fn test_crop_extracts_expected_pixels() {
        let frame = gradient_frame(10, 8);
        let crop = frame.crop(2, 3, 6, 7);
        assert_eq!(crop.width(), 4);
        assert_eq!(crop.height(), 4);
        // Top-left pixel of the crop came from (2, 3)
        assert_eq!(crop.data()[0], 2);
        assert_eq!(crop.data()[1], 3);
    }

    #[test]
    fn test_crop_clamps_to_frame_bounds() {
        let frame = gradient_frame(10, 8);
        let crop = frame.crop(6, 4, 100, 100);
        assert_eq!(crop.width(), 4);
        assert_eq!(crop.height(), 4);
    }

    #[test]
    fn test_crop_keeps_index() {
        let frame = Frame::new(vec![0; 12], 2, 2, 3, 7);
        assert_eq!(frame.crop(0, 0, 1, 1).index(), 7);
    }

    #[test]
    fn test_paste_overwrites_region() {
        let mut frame = gradient_frame(10, 8);
        let patch = Frame::new(vec![200u8; 2 * 2 * 3], 2, 2, 3, 0);
        frame.paste(&patch, 3, 4);

        let arr = frame.as_ndarray();
        assert_eq!(arr[[4, 3, 0]], 200);
        assert_eq!(arr[[5, 4, 2]], 200);
        // Neighboring pixels untouched
        assert_eq!(arr[[4, 2, 0]], 2);
        assert_eq!(arr[[6, 3, 0]], 3);
    }

    #[test]
    fn test_paste_clips_at_edges() {
        let mut frame = gradient_frame(4, 4);
        let patch = Frame::new(vec![99u8; 3 * 3 * 3], 3, 3, 3, 0);
        frame.paste(&patch, 2, 2);

        let arr = frame.as_ndarray();
        assert_eq!(arr[[2, 2, 0]], 99);
        assert_eq!(arr[[3, 3, 0]], 99);
        // Out-of-range rows/cols simply don't exist; nothing panicked.
    }

    #[test]
    fn test_paste_outside_frame_is_noop() {
        let mut frame = gradient_frame(4, 4);
        let before = frame.clone();
        let patch = Frame::new(vec![99u8; 3], 1, 1, 3, 0);
        frame.paste(&patch, 10, 10);
        assert_eq!(frame, before);
    }
}
