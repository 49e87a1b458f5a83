use crate::bytereader::ByteReader;
use crate::error::{Error, Result};

/// Inclusive-exclusive row range covered by one slice of a plane, computed
/// the same way for every plane: evenly dividing `height` into `slices`
/// bands, last band absorbing the remainder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SliceRows {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

pub(crate) fn slice_row_range(height: usize, slices: usize, slice: usize) -> SliceRows {
    SliceRows {
        start: height * slice / slices,
        end: height * (slice + 1) / slices,
    }
}

/// The cumulative little-endian slice-end-offset table that follows a
/// plane's 256-byte code-length header.
pub(crate) struct SliceOffsets {
    ends: Vec<u32>,
}

impl SliceOffsets {
    pub(crate) fn parse(buf: &[u8], slices: usize) -> Result<Self> {
        if buf.len() < slices * 4 {
            return Err(Error::InvalidData("truncated slice offset table".into()));
        }
        let mut r = ByteReader::new(buf);
        let ends = (0..slices).map(|_| r.get_u32_le_u()).collect();
        Ok(SliceOffsets { ends })
    }

    /// Byte range `[start, end)` of one slice's compressed data, relative
    /// to the start of the plane's slice data (immediately after the
    /// offset table).
    pub(crate) fn range(&self, slice: usize) -> Result<(u32, u32)> {
        let start = if slice == 0 { 0 } else { self.ends[slice - 1] };
        let end = self.ends[slice];
        if end <= start {
            return Err(Error::InvalidData("incorrect slice size".into()));
        }
        Ok((start, end))
    }
}
