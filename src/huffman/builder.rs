use crate::constants::{UT_HUFF_ELEMS, UT_MAX_VLC_DEPTH, UT_VLC_BITS, VLC_MULTI_MAX_SYMBOLS};
use crate::error::{Error, Result};

/// One slot of the flattened primary-table-plus-subtables array.
///
/// `len > 0`: a resolved leaf, `sym` is the decoded symbol.
/// `len < 0`: a pointer to a subtable of `-len` bits, `sym` is the
/// subtable's start index within the same array.
/// `len == 0`: unused slot, never assigned a code (`sym == -1`).
#[derive(Clone, Copy, Debug)]
pub(crate) struct VlcEntry {
    pub(crate) len: i16,
    pub(crate) sym: i16,
}

impl Default for VlcEntry {
    fn default() -> Self {
        VlcEntry { len: 0, sym: -1 }
    }
}

/// One slot of the joint table. `num > 0` means `val[..num]` are `num`
/// symbols decoded directly from this one lookup; `num == 0` mirrors the
/// single-symbol table's entry at the same index (`read_multi` falls back
/// to walking `single` via `len`/`sym` without a second table access).
#[derive(Clone, Debug)]
pub(crate) struct MultiEntry {
    pub(crate) val: [u8; VLC_MULTI_MAX_SYMBOLS],
    pub(crate) len: i16,
    pub(crate) num: u8,
}

impl Default for MultiEntry {
    fn default() -> Self {
        MultiEntry {
            val: [0; VLC_MULTI_MAX_SYMBOLS],
            len: 0,
            num: 0,
        }
    }
}

/// Either the fully-built lookup tables, or the "this plane/slice is one
/// constant value" shortcut signalled by a zero length-table byte.
pub(crate) enum LengthTable {
    Fill(u8),
    Tables(HuffmanTables),
}

pub(crate) struct HuffmanTables {
    pub(crate) single: Vec<VlcEntry>,
    pub(crate) multi: Vec<MultiEntry>,
}

struct Code {
    bits: u8,
    symbol: u8,
    code: u32,
}

/// Parses a 256-byte plane-header code-length table and builds the VLC
/// lookup tables, or detects the fill-symbol shortcut.
///
/// Byte values: `0` means "this plane is constant, fill with symbol `i`"
/// (no further bytes are consulted once this is seen); `255` means
/// "symbol `i` is unused"; `1..=32` is a canonical code length in bits.
pub(crate) fn build_from_lengths(raw: &[u8; UT_HUFF_ELEMS]) -> Result<LengthTable> {
    let mut lens = [0u8; UT_HUFF_ELEMS];
    for (i, &v) in raw.iter().enumerate() {
        match v {
            0 => return Ok(LengthTable::Fill(i as u8)),
            255 => lens[i] = 0,
            1..=32 => lens[i] = v,
            _ => return Err(Error::InvalidData(format!("bad code length byte {v}"))),
        }
    }

    if lens.iter().all(|&l| l == 0) {
        return Err(Error::InvalidData("empty huffman table".into()));
    }

    // Canonical order: descending length, then ascending symbol within a
    // length. This places longer codes on the left of the canonical tree
    // and matches the encoder's symbol order.
    let mut entries: Vec<(u8, u8)> = lens
        .iter()
        .enumerate()
        .filter(|&(_, &l)| l != 0)
        .map(|(sym, &l)| (l, sym as u8))
        .collect();
    entries.sort_unstable_by_key(|&(len, sym)| (std::cmp::Reverse(len), sym));

    let codes = assign_canonical_codes(&entries)?;

    let mut single = Vec::new();
    build_table(&mut single, UT_VLC_BITS, &codes, 1)?;
    let multi = build_joint_table(&single, &codes);

    Ok(LengthTable::Tables(HuffmanTables { single, multi }))
}

/// Assigns MSB-aligned 32-bit canonical codes to `entries`, taken in the
/// order given by the caller (descending length, ascending symbol within a
/// length). `code` never resets across a length boundary; it is simply
/// incremented by `2^(32-len)` at every step, which keeps the resulting
/// codes monotonically increasing and already sorted for `build_table`'s
/// contiguous-subtable grouping, regardless of the order entries arrive in.
fn assign_canonical_codes(entries: &[(u8, u8)]) -> Result<Vec<Code>> {
    let mut code: u64 = 0;
    let mut out = Vec::with_capacity(entries.len());
    for &(len, sym) in entries {
        if code >= (1u64 << 32) {
            return Err(Error::InvalidData("overdetermined huffman tree".into()));
        }
        let step = 1u64 << (32 - len as u32);
        if code & (step - 1) != 0 {
            return Err(Error::InvalidData("invalid canonical code length".into()));
        }
        out.push(Code {
            bits: len,
            symbol: sym,
            code: code as u32,
        });
        code += step;
        if code > (1u64 << 32) {
            return Err(Error::InvalidData("overdetermined huffman tree".into()));
        }
    }
    if code != (1u64 << 32) {
        return Err(Error::InvalidData("incomplete huffman tree".into()));
    }
    Ok(out)
}

/// Builds a `table_nb_bits`-wide lookup table for `codes` (already sorted
/// ascending by code), recursing into subtables for codes longer than
/// `table_nb_bits`. Returns the index within `table` where this level's
/// table begins.
fn build_table(
    table: &mut Vec<VlcEntry>,
    table_nb_bits: u32,
    codes: &[Code],
    depth: u32,
) -> Result<usize> {
    debug_assert!(depth <= UT_MAX_VLC_DEPTH, "subtable recursion ran deeper than expected");
    let table_size = 1usize << table_nb_bits;
    let table_index = table.len();
    table.resize(table_index + table_size, VlcEntry::default());

    let mut i = 0usize;
    while i < codes.len() {
        let n = codes[i].bits as u32;
        let code = codes[i].code;
        let symbol = codes[i].symbol;

        if n <= table_nb_bits {
            let j0 = (code >> (32 - table_nb_bits)) as usize;
            let span = 1usize << (table_nb_bits - n);
            for k in 0..span {
                let slot = &mut table[table_index + j0 + k];
                if (slot.len != 0 || slot.sym != -1)
                    && (slot.len != n as i16 || slot.sym != symbol as i16)
                {
                    return Err(Error::InvalidData("overlapping huffman codes".into()));
                }
                slot.len = n as i16;
                slot.sym = symbol as i16;
            }
            i += 1;
        } else {
            let code_prefix = code >> (32 - table_nb_bits);
            let mut subtable_bits = n - table_nb_bits;
            let mut sub = vec![Code {
                bits: (n - table_nb_bits) as u8,
                symbol,
                code: code << table_nb_bits,
            }];

            let mut k = i + 1;
            while k < codes.len() {
                let nk = codes[k].bits as i32 - table_nb_bits as i32;
                let ck = codes[k].code;
                if nk <= 0 || (ck >> (32 - table_nb_bits)) != code_prefix {
                    break;
                }
                subtable_bits = subtable_bits.max(nk as u32);
                sub.push(Code {
                    bits: nk as u8,
                    symbol: codes[k].symbol,
                    code: ck << table_nb_bits,
                });
                k += 1;
            }
            subtable_bits = subtable_bits.min(table_nb_bits);

            let sub_index = build_table(table, subtable_bits, &sub, depth + 1)?;
            let slot = &mut table[table_index + code_prefix as usize];
            slot.len = -(subtable_bits as i16);
            slot.sym = sub_index as i16;
            if slot.sym as usize != sub_index {
                return Err(Error::Unsupported("subtable index out of range".into()));
            }

            i = k;
        }
    }

    Ok(table_index)
}

/// Builds the joint table: seeded from the single-symbol table (so every
/// index has a valid one-symbol fallback), then overlaid with multi-symbol
/// combinations composed depth-first from codes short enough to fit
/// several per `UT_VLC_BITS`-wide lookup.
///
/// The reference algorithm restricts which codes may start a combination
/// to those no longer than the shortest code in the table, purely to skip
/// candidates it already knows cannot fit once composed — a performance
/// shortcut. We instead try every code `<= UT_VLC_BITS` bits at each
/// recursion depth and let the per-step budget check (`curlen + len <=
/// UT_VLC_BITS`) prune identically; the resulting table is the same.
fn build_joint_table(single: &[VlcEntry], codes: &[Code]) -> Vec<MultiEntry> {
    let size = 1usize << UT_VLC_BITS;
    let mut table = vec![MultiEntry::default(); size];
    for (j, slot) in table.iter_mut().enumerate() {
        let e = single[j];
        slot.len = e.len;
        slot.num = if e.len > 0 { 1 } else { 0 };
        slot.val[0] = e.sym.max(0) as u8;
    }

    let short_codes: Vec<&Code> = codes
        .iter()
        .filter(|c| c.bits as u32 <= UT_VLC_BITS)
        .collect();
    let mut val = [0u8; VLC_MULTI_MAX_SYMBOLS];
    add_level(&mut table, &short_codes, &mut val, 0, 0, 0);
    table
}

fn add_level(
    table: &mut [MultiEntry],
    short_codes: &[&Code],
    val: &mut [u8; VLC_MULTI_MAX_SYMBOLS],
    curcode: u32,
    curlen: u32,
    curlevel: usize,
) {
    if curlevel >= VLC_MULTI_MAX_SYMBOLS {
        return;
    }
    for c in short_codes {
        let len = c.bits as u32;
        if curlen + len > UT_VLC_BITS {
            continue;
        }
        let code = curcode + (c.code >> curlen);
        let total_len = curlen + len;
        val[curlevel] = c.symbol;

        // A single composed symbol duplicates the seeded single-table
        // fallback above, so only 2-or-more-symbol combinations get
        // written here.
        if curlevel > 0 {
            let idx = (code >> (32 - UT_VLC_BITS)) as usize;
            let span = 1usize << (UT_VLC_BITS - total_len);
            for slot in &mut table[idx..idx + span] {
                slot.val = *val;
                slot.len = total_len as i16;
                slot.num = (curlevel + 1) as u8;
            }
        }

        if total_len < UT_VLC_BITS {
            add_level(table, short_codes, val, code, total_len, curlevel + 1);
        }
    }
}
