use exediff_core::rodata::{RoDataBuffer, RoSlot};

const DUMP: &str = "\
a.out:     file format elf64-x86-64

Contents of section .rodata:
 2000 41424344 00000000 48656c6c 6f000000  ABCD....Hello...
 2010 576f726c 64210000 01000000 00000000  World!..........
";

fn buffer() -> RoDataBuffer {
    RoDataBuffer::from_hex_dump(DUMP.as_bytes()).expect("hex dump")
}

#[test]
fn decoding_reproduces_the_byte_vector_exactly() {
    let ro = buffer();
    assert_eq!(ro.base(), 0x2000);
    let expected: Vec<u8> = vec![
        0x41, 0x42, 0x43, 0x44, 0x00, 0x00, 0x00, 0x00, //
        0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x00, 0x00, 0x00, //
        0x57, 0x6f, 0x72, 0x6c, 0x64, 0x21, 0x00, 0x00, //
        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    ];
    assert_eq!(ro.bytes(), expected.as_slice());
}

#[test]
fn lines_before_the_section_banner_are_ignored() {
    // the file-format preamble contains hex-looking tokens; none of them
    // may leak into the buffer
    let ro = buffer();
    assert_eq!(ro.bytes().len(), 32);
}

#[test]
fn literal_strings_resolve_up_to_the_first_nul() {
    let ro = buffer();
    assert_eq!(ro.resolve_literal(0x2008), Some(RoSlot::Literal("Hello".to_string())));
    assert_eq!(ro.resolve_literal(0x2010), Some(RoSlot::Literal("World!".to_string())));
}

#[test]
fn literal_resolution_works_mid_string() {
    let ro = buffer();
    assert_eq!(ro.resolve_literal(0x200a), Some(RoSlot::Literal("llo".to_string())));
}

#[test]
fn offset_guard_rejects_packed_integer_slots() {
    // [41 42 43 44 00 00 00 00] reads as a 4-byte integer in an 8-byte
    // field, not as the string "ABCD"
    let ro = buffer();
    assert_eq!(ro.resolve_literal(0x2000), Some(RoSlot::PackedOffset));
    assert_eq!(ro.resolve_literal(0x2018), Some(RoSlot::PackedOffset));
}

#[test]
fn addresses_outside_the_section_do_not_resolve() {
    let ro = buffer();
    assert_eq!(ro.resolve_literal(0x1fff), None);
    assert_eq!(ro.resolve_literal(0x2020), None);
    assert_eq!(ro.resolve_literal(0), None);
}

#[test]
fn short_tail_near_the_end_is_treated_as_a_literal() {
    let ro = RoDataBuffer::new(0x3000, b"Hi\0".to_vec());
    assert_eq!(ro.resolve_literal(0x3000), Some(RoSlot::Literal("Hi".to_string())));
}

#[test]
fn unterminated_literal_runs_to_the_end_of_the_buffer() {
    let ro = RoDataBuffer::new(0x3000, b"abc".to_vec());
    assert_eq!(ro.resolve_literal(0x3000), Some(RoSlot::Literal("abc".to_string())));
}

#[test]
fn empty_dump_yields_an_empty_buffer() {
    let ro = RoDataBuffer::from_hex_dump("a.out: nothing here\n".as_bytes()).expect("hex dump");
    assert_eq!(ro.base(), 0);
    assert!(ro.bytes().is_empty());
    assert_eq!(ro.resolve_literal(0), None);
}
