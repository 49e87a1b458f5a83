use log::debug;

use crate::constants::{LINE_ALIGNMENT_PAD, UT_COLOR_PLANES};
use crate::error::{Error, Result};

/// A decoder instance bound to one frame geometry. Plane buffers and the
/// output buffer are allocated once at construction and reused across
/// `decode_frame` calls.
pub struct Decoder {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) slices: u32,
    pub(crate) stride: usize,
    pub(crate) planes: [Vec<u8>; UT_COLOR_PLANES],
    pub(crate) output: Vec<u32>,
}

impl Decoder {
    /// Validates `(width, height, slices)` and allocates the reusable
    /// plane and output buffers.
    pub fn new(width: u32, height: u32, slices: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidData(format!(
                "invalid dimensions: {width}x{height}"
            )));
        }
        if slices == 0 {
            return Err(Error::InvalidData("slice count must be at least 1".into()));
        }

        let stride = width as usize + LINE_ALIGNMENT_PAD;
        let plane_len = stride * height as usize;
        debug!("new decoder: {width}x{height}, {slices} slices, stride {stride}");

        Ok(Decoder {
            width,
            height,
            slices,
            stride,
            planes: [
                vec![0u8; plane_len],
                vec![0u8; plane_len],
                vec![0u8; plane_len],
            ],
            output: vec![0u32; width as usize * height as usize],
        })
    }

    /// The BGRA pixels produced by the most recent [`Decoder::decode_frame`]
    /// call, `width * height` elements, row-major with no padding.
    pub fn frame(&self) -> &[u32] {
        &self.output
    }
}
