use exediff_core::index::AddressIndex;
use exediff_core::model::{SymbolRecord, SymbolTable};
use exediff_core::rodata::RoDataBuffer;
use exediff_core::sanitize::{
    neutralize_addresses, parse_hex_prefix, resolve_address, sanitize_line, sanitize_text,
    Dialect, Resolution,
};

fn empty_index() -> AddressIndex {
    AddressIndex::build(&SymbolTable::new())
}

fn index_with(name: &str, start_address: u64, length: u64) -> AddressIndex {
    let mut table = SymbolTable::new();
    table.insert_unique(name, SymbolRecord { start_address, length, text: String::new() });
    AddressIndex::build(&table)
}

#[test]
fn parse_hex_prefix_stops_at_the_first_non_hex_character() {
    assert_eq!(parse_hex_prefix("401000 <main>:"), 0x401000);
    assert_eq!(parse_hex_prefix("0x2fe8(%rip)"), 0x2fe8);
    assert_eq!(parse_hex_prefix("4137ac:"), 0x4137ac);
    assert_eq!(parse_hex_prefix("zz"), 0);
    assert_eq!(parse_hex_prefix(""), 0);
}

#[test]
fn neutralizer_collapses_long_hex_constants() {
    assert_eq!(neutralize_addresses("callq\t0x100003f60", Dialect::Otool), "callq\t0x?");
    assert_eq!(neutralize_addresses("jmp 0xdead,0xbeef", Dialect::Otool), "jmp 0x?,0x?");
}

#[test]
fn neutralizer_leaves_short_constants_alone() {
    // fewer than 4 hex digits and no (%r following: not a pointer
    assert_eq!(neutralize_addresses("add $0x18,%rsp", Dialect::Otool), "add $0x18,%rsp");
    assert_eq!(neutralize_addresses("mov 0x12,%eax", Dialect::Objdump), "mov 0x12,%eax");
}

#[test]
fn neutralizer_catches_short_rip_relative_offsets() {
    assert_eq!(
        neutralize_addresses("leaq\t0x5(%rip), %rax", Dialect::Otool),
        "leaq\t0x?(%rip), %rax"
    );
}

#[test]
fn hash_comment_operands_are_an_objdump_only_trigger() {
    assert_eq!(
        neutralize_addresses("lea 0x2fe8(%rip),%rax # 4005e8", Dialect::Objdump),
        "lea 0x?(%rip),%rax 0x?"
    );
    assert_eq!(neutralize_addresses("# 4005e8", Dialect::Otool), "# 4005e8");
}

#[test]
fn neutralizer_does_not_touch_bare_hex_operands() {
    // objdump call targets carry no 0x prefix; they are resolved later by
    // the sanitizer instead
    assert_eq!(
        neutralize_addresses("call   401000 <_init>", Dialect::Objdump),
        "call   401000 <_init>"
    );
}

#[test]
fn negative_offsets_pass_through_the_sanitizer() {
    let line = sanitize_line("-0x20", Dialect::Otool, &empty_index(), None);
    assert_eq!(line, "-0x20");

    let line = sanitize_line("mov %rax,-0x8(%rbp)", Dialect::Otool, &empty_index(), None);
    assert_eq!(line, "mov %rax,-0x8(%rbp)");
}

#[test]
fn unresolvable_addresses_are_left_untouched() {
    let line = sanitize_line("mov 0x1000,%rax", Dialect::Otool, &empty_index(), None);
    assert_eq!(line, "mov 0x1000,%rax");
}

#[test]
fn rodata_literals_are_substituted() {
    let ro = RoDataBuffer::new(0x1000, b"Hello\0".to_vec());
    let line = sanitize_line("mov 0x1000,%rax", Dialect::Otool, &empty_index(), Some(&ro));
    assert_eq!(line, "mov {Hello},%rax");
}

#[test]
fn packed_offset_slots_substitute_the_sentinel() {
    let bytes = vec![0x41, 0x42, 0x43, 0x44, 0, 0, 0, 0];
    let ro = RoDataBuffer::new(0x2000, bytes);
    let line = sanitize_line("mov 0x2000,%rax", Dialect::Otool, &empty_index(), Some(&ro));
    assert_eq!(line, "mov {(offset)},%rax");
}

#[test]
fn call_targets_expand_to_symbol_names() {
    let index = index_with("bar", 0x3ff0, 0x30);
    let line = sanitize_line("call 0x4000 <bar+0x10>", Dialect::Otool, &index, None);
    assert_eq!(line, "call bar <bar>");
}

#[test]
fn objdump_bare_hex_operands_expand_to_symbol_names() {
    let index = index_with("bar", 0x4005d0, 0x8);
    let line = sanitize_line("call   4005d0 <bar>", Dialect::Objdump, &index, None);
    // the space introducing the operand is consumed along with the address
    assert_eq!(line, "call  bar <bar>");
}

#[test]
fn rodata_wins_over_the_symbol_index() {
    let ro = RoDataBuffer::new(0x1000, b"Hi\0".to_vec());
    let index = index_with("shadow", 0x1000, 0x10);
    assert_eq!(
        resolve_address(0x1000, &index, Some(&ro)),
        Resolution::Literal("{Hi}".to_string())
    );
    assert_eq!(resolve_address(0x1000, &index, None), Resolution::Symbol("shadow".to_string()));
    assert_eq!(resolve_address(0x9999, &index, Some(&ro)), Resolution::Unresolved);
}

#[test]
fn trailing_reference_offsets_are_truncated() {
    let line = sanitize_line("<main+0x9b6>", Dialect::Otool, &empty_index(), None);
    assert_eq!(line, "<main>");
}

#[test]
fn plain_trailing_references_are_unchanged() {
    let line = sanitize_line("<main>", Dialect::Otool, &empty_index(), None);
    assert_eq!(line, "<main>");
}

#[test]
fn a_plus_before_the_bracket_does_not_truncate() {
    let line = sanitize_line("add+sub <main>", Dialect::Otool, &empty_index(), None);
    assert_eq!(line, "add+sub <main>");
}

#[test]
fn embedded_newlines_are_escaped() {
    let line = sanitize_line("ab\ncd", Dialect::Otool, &empty_index(), None);
    assert_eq!(line, "ab\\ncd");
}

#[test]
fn sanitizing_already_sanitized_text_is_a_no_op() {
    let index = index_with("bar", 0x3ff0, 0x30);
    let ro = RoDataBuffer::new(0x1000, b"Hello\0".to_vec());
    let text = "mov 0x1000,%rax\ncall 0x4000 <bar+0x10>\nleaq 0x?(%rip), %rdi\n-0x20\n";

    let once = sanitize_text(text, Dialect::Otool, &index, Some(&ro));
    let twice = sanitize_text(&once, Dialect::Otool, &index, Some(&ro));
    assert_eq!(once, twice);
}

#[test]
fn sanitize_text_keeps_one_line_per_line() {
    let text = "one\ntwo\n\n";
    let out = sanitize_text(text, Dialect::Otool, &empty_index(), None);
    assert_eq!(out, "one\ntwo\n\n");
}
