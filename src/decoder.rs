use log::{debug, trace, warn};

use crate::bitreader::BitReader;
use crate::bytereader::ByteReader;
use crate::constants::{PLANE_END_PAD, PREDICTOR_SEED, UT_COLOR_PLANES, UT_HUFF_ELEMS, VLC_MULTI_MAX_SYMBOLS};
use crate::context::Decoder;
use crate::error::{Error, Result};
use crate::huffman::{build_from_lengths, read_multi, read_single, LengthTable};
use crate::plane::{slice_row_range, SliceOffsets};
use crate::pred::{apply_left_predictor, fill_slice};
use crate::rgb_restore;

impl Decoder {
    /// Decodes one intra frame's payload into the reusable output buffer
    /// (see [`Decoder::frame`]), returning the number of bytes consumed
    /// (always the whole payload on success).
    pub fn decode_frame(&mut self, payload: &[u8]) -> Result<usize> {
        debug!(
            "decode_frame: {}x{}, {} slices",
            self.width, self.height, self.slices
        );

        let slices = self.slices as usize;
        let mut plane_starts = [0usize; UT_COLOR_PLANES + 1];
        let mut cursor = 0usize;

        for start in plane_starts.iter_mut().take(UT_COLOR_PLANES) {
            *start = cursor;
            let header_len = UT_HUFF_ELEMS + 4 * slices;
            if payload.len() < cursor + header_len {
                warn!("insufficient data for a plane");
                return Err(Error::InvalidData("insufficient data for a plane".into()));
            }

            let mut r = ByteReader::new(&payload[cursor + UT_HUFF_ELEMS..cursor + header_len]);
            let mut slice_end = 0u32;
            for _ in 0..slices {
                let next_end = r.get_u32_le_u();
                if next_end < slice_end {
                    warn!("incorrect slice size");
                    return Err(Error::InvalidData("incorrect slice size".into()));
                }
                slice_end = next_end;
            }
            if payload.len() - (cursor + header_len) < slice_end as usize {
                warn!("incorrect slice size");
                return Err(Error::InvalidData("incorrect slice size".into()));
            }

            cursor += header_len + slice_end as usize;
        }
        plane_starts[UT_COLOR_PLANES] = cursor;

        let width = self.width as usize;
        let height = self.height as usize;
        let stride = self.stride;

        for i in 0..UT_COLOR_PLANES {
            let header = &payload[plane_starts[i]..plane_starts[i + 1]];
            if let Err(err) =
                decode_plane(&mut self.planes[i], stride, width, height, slices, header)
            {
                warn!("plane {i} failed: {err}");
                return Err(err);
            }
        }

        rgb_restore::restore(
            &self.planes[0],
            &self.planes[1],
            &self.planes[2],
            stride,
            width,
            height,
            &mut self.output,
        );

        debug!("decode_frame: consumed {cursor} bytes");
        Ok(cursor)
    }
}

/// Decodes one plane's header (length table + slice offsets + payload)
/// into `dst`, a `stride * height` buffer.
fn decode_plane(
    dst: &mut [u8],
    stride: usize,
    width: usize,
    height: usize,
    slices: usize,
    header: &[u8],
) -> Result<()> {
    let mut raw = [0u8; UT_HUFF_ELEMS];
    raw.copy_from_slice(&header[..UT_HUFF_ELEMS]);

    match build_from_lengths(&raw)? {
        LengthTable::Fill(sym) => {
            for slice in 0..slices {
                let rows = slice_row_range(height, slices, slice);
                let start_off = rows.start * stride;
                let end_off = rows.end * stride;
                fill_slice(
                    &mut dst[start_off..end_off],
                    width,
                    stride,
                    rows.end - rows.start,
                    sym,
                );
            }
            Ok(())
        }
        LengthTable::Tables(tables) => {
            let offsets_buf = &header[UT_HUFF_ELEMS..UT_HUFF_ELEMS + 4 * slices];
            let offsets = SliceOffsets::parse(offsets_buf, slices)?;
            let payload = &header[UT_HUFF_ELEMS + 4 * slices..];

            let mut residual = vec![0u8; width + PLANE_END_PAD];
            let limit = width.saturating_sub(PLANE_END_PAD);

            for slice in 0..slices {
                let rows = slice_row_range(height, slices, slice);
                let (start, end) = offsets.range(slice)?;
                let slice_data = &payload[start as usize..end as usize];
                trace!(
                    "slice {slice}: rows {}..{}, {} bytes",
                    rows.start,
                    rows.end,
                    slice_data.len()
                );

                let mut br = BitReader::new(slice_data, (slice_data.len() as u32) * 8)?;
                let mut prev = PREDICTOR_SEED;

                for row in rows.start..rows.end {
                    let mut i = 0usize;
                    while i < limit {
                        let mut syms = [0u8; VLC_MULTI_MAX_SYMBOLS];
                        let n = read_multi(&tables, &mut br, &mut syms)?;
                        if n == 0 {
                            return Err(Error::InvalidData(
                                "read_multi made no progress".into(),
                            ));
                        }
                        residual[i..i + n].copy_from_slice(&syms[..n]);
                        i += n;
                    }
                    while i < width {
                        residual[i] = read_single(&tables.single, &mut br)?;
                        i += 1;
                    }

                    let row_off = row * stride;
                    prev = apply_left_predictor(
                        &mut dst[row_off..row_off + width],
                        &residual[..width],
                        prev,
                    );
                }
            }
            Ok(())
        }
    }
}
