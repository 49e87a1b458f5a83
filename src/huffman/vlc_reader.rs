use crate::bitreader::BitReader;
use crate::constants::{UT_VLC_BITS, VLC_MULTI_MAX_SYMBOLS};
use crate::error::{Error, Result};

use super::builder::{HuffmanTables, VlcEntry};

/// Looks `base + peek(width)` up in `table`, returning its raw `(sym, len)`.
fn probe(table: &[VlcEntry], br: &mut BitReader, base: i16, width: u32) -> (i16, i16) {
    let idx = br.peek(width) as usize + base as usize;
    (table[idx].sym, table[idx].len)
}

/// Decodes one symbol, walking at most two subtable hops (primary table +
/// up to `UT_MAX_VLC_DEPTH - 1` subtables) deep.
pub(crate) fn read_single(table: &[VlcEntry], br: &mut BitReader) -> Result<u8> {
    let idx = br.peek(UT_VLC_BITS) as usize;
    let mut code = table[idx].sym;
    let mut n = table[idx].len;

    if n < 0 {
        br.skip(UT_VLC_BITS);
        let width = (-n) as u32;
        let (c, nn) = probe(table, br, code, width);
        code = c;
        n = nn;

        if n < 0 {
            br.skip(width);
            let width2 = (-n) as u32;
            let (c2, nn2) = probe(table, br, code, width2);
            code = c2;
            n = nn2;
        }
    }

    if n <= 0 {
        return Err(Error::InvalidData("invalid huffman code".into()));
    }
    br.skip(n as u32);
    Ok(code as u8)
}

/// Decodes one joint-table lookup's worth of symbols into `dst`, returning
/// how many were written (1 for the single-symbol fallback path, or the
/// joint table's combined count on a direct multi-symbol hit).
pub(crate) fn read_multi(
    tables: &HuffmanTables,
    br: &mut BitReader,
    dst: &mut [u8; VLC_MULTI_MAX_SYMBOLS],
) -> Result<usize> {
    let idx = br.peek(UT_VLC_BITS) as usize;
    let entry = &tables.multi[idx];
    let mut n = entry.len as i32;

    let ret = if entry.num > 0 {
        *dst = entry.val;
        entry.num as usize
    } else {
        let single = &tables.single;
        let mut code = single[idx].sym;
        n = single[idx].len as i32;

        if n < 0 {
            br.skip(UT_VLC_BITS);
            let width = (-n) as u32;
            let (c, nn) = probe(single, br, code, width);
            code = c;
            n = nn as i32;

            if n < 0 {
                br.skip(width);
                let width2 = (-n) as u32;
                let (c2, nn2) = probe(single, br, code, width2);
                code = c2;
                n = nn2 as i32;
            }
        }

        if n <= 0 {
            return Err(Error::InvalidData("invalid huffman code".into()));
        }
        dst[0] = code as u8;
        1
    };

    br.skip(n.max(0) as u32);
    Ok(ret)
}
