use utvid::Decoder;

fn length_table_two_symbols() -> [u8; 256] {
    let mut t = [255u8; 256];
    t[0] = 1;
    t[1] = 1;
    t
}

fn length_table_fill(sym: u8) -> [u8; 256] {
    let mut t = [255u8; 256];
    t[sym as usize] = 0;
    t
}

fn length_table_overdetermined() -> [u8; 256] {
    let mut t = [255u8; 256];
    t[0] = 1;
    t[1] = 1;
    t[2] = 1;
    t
}

/// Builds one plane header: 256-byte length table, `slice_bytes.len()`
/// cumulative LE offsets, then the slices' payload bytes back to back.
fn plane_header(lengths: &[u8; 256], slice_bytes: &[u8]) -> Vec<u8> {
    let mut v = lengths.to_vec();
    let mut end = 0u32;
    for chunk in slice_bytes {
        end += 1;
        v.extend_from_slice(&end.to_le_bytes());
        let _ = chunk;
    }
    v.extend_from_slice(slice_bytes);
    v
}

/// Builds a plane header for a fill-mode plane: no payload bytes are ever
/// read, so every slice offset is zero.
fn plane_header_fill(sym: u8, slices: usize) -> Vec<u8> {
    let mut v = length_table_fill(sym).to_vec();
    for _ in 0..slices {
        v.extend_from_slice(&0u32.to_le_bytes());
    }
    v
}

fn frame_of_three_identical_planes(header: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    for _ in 0..3 {
        payload.extend_from_slice(header);
    }
    payload
}

// Scenario 1: W=8, H=1, S=1, two length-1 codes (symbol 0 and symbol 1),
// payload `0b10101010`. Residuals 1,0,1,0,1,0,1,0 reconstruct to
// 0x81,0x81,0x82,0x82,0x83,0x83,0x84,0x84 under the left predictor.
#[test_log::test]
fn scenario_1_two_symbol_huffman_row() {
    let header = plane_header(&length_table_two_symbols(), &[0b1010_1010]);
    let payload = frame_of_three_identical_planes(&header);

    let mut dec = Decoder::new(8, 1, 1).unwrap();
    let consumed = dec.decode_frame(&payload).unwrap();
    assert_eq!(consumed, payload.len());

    // G = B = R = [0x81,0x81,0x82,0x82,0x83,0x83,0x84,0x84]; since all three
    // planes are identical, b' = r' = 2*g - 128 (mod 256) at every pixel.
    let expected: [u32; 8] = [
        0xFF82_8182,
        0xFF82_8182,
        0xFF84_8284,
        0xFF84_8284,
        0xFF86_8386,
        0xFF86_8386,
        0xFF88_8488,
        0xFF88_8488,
    ];
    assert_eq!(dec.frame(), &expected);
}

// Scenario 2 + 3: fill mode with a zero residual on all three planes
// reproduces the constant 0x80 plane (running sum of 0, seeded at 0x80),
// which restore_rgb turns into a flat neutral-gray frame.
#[test]
fn scenario_2_and_3_fill_mode_round_trips_to_neutral_gray() {
    let width = 4;
    let height = 2;
    let slices = 1;
    let header = plane_header_fill(0, slices as usize);
    let payload = frame_of_three_identical_planes(&header);

    let mut dec = Decoder::new(width, height, slices).unwrap();
    dec.decode_frame(&payload).unwrap();

    assert!(dec.frame().iter().all(|&px| px == 0xFF80_8080));
}

// Scenario 6: an overdetermined length table (three length-1 codes) is
// rejected before any bitstream bits are consulted.
#[test]
fn scenario_6_overdetermined_huffman_table_is_rejected() {
    // The failure happens while building the Huffman table, well before
    // any slice offset or bitstream bit is consulted.
    let mut header = length_table_overdetermined().to_vec();
    header.extend_from_slice(&0u32.to_le_bytes()); // one slice, offset 0
    let payload = frame_of_three_identical_planes(&header);

    let mut dec = Decoder::new(8, 1, 1).unwrap();
    assert!(dec.decode_frame(&payload).is_err());
}

// Scenario 5: two slices split a 4-row frame into rows 0-1 and rows 2-3.
// Corrupting slice 1's payload must not change the decoded rows 0-1.
#[test_log::test]
fn scenario_5_corrupting_one_slice_leaves_other_slices_rows_untouched() {
    let width = 4;
    let height = 4;
    let slices = 2;

    let clean_bytes = [0b1011_0100u8, 0b0110_1001u8];
    let clean_header = plane_header(&length_table_two_symbols(), &clean_bytes);
    let clean_payload = frame_of_three_identical_planes(&clean_header);

    let mut dec = Decoder::new(width, height, slices).unwrap();
    dec.decode_frame(&clean_payload).unwrap();
    let clean_rows_0_1 = dec.frame()[0..(width as usize) * 2].to_vec();

    let mut corrupted_bytes = clean_bytes;
    corrupted_bytes[1] ^= 0xFF;
    let corrupted_header = plane_header(&length_table_two_symbols(), &corrupted_bytes);
    let corrupted_payload = frame_of_three_identical_planes(&corrupted_header);

    let mut dec2 = Decoder::new(width, height, slices).unwrap();
    dec2.decode_frame(&corrupted_payload).unwrap();
    let corrupted_rows_0_1 = &dec2.frame()[0..(width as usize) * 2];

    assert_eq!(clean_rows_0_1, corrupted_rows_0_1);
}

#[test]
fn truncated_payload_is_rejected() {
    let header = plane_header(&length_table_two_symbols(), &[0b1010_1010]);
    let mut payload = frame_of_three_identical_planes(&header);
    payload.truncate(payload.len() - 1);

    let mut dec = Decoder::new(8, 1, 1).unwrap();
    assert!(dec.decode_frame(&payload).is_err());
}
