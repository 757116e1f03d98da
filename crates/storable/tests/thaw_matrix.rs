use proptest::prelude::*;
use storable::{
    thaw, thaw_with, thaw_with_preamble, Preamble, ThawError, ThawOptions, UnknownTagPolicy,
    Value, NATIVE_MAGIC, NATIVE_MARKER,
};

// Wire builders -------------------------------------------------------------

fn frozen(body: &[u8]) -> Vec<u8> {
    let mut out = vec![0x05, 0x07];
    out.extend_from_slice(body);
    out
}

fn small_str(s: &[u8]) -> Vec<u8> {
    assert!(s.len() <= 255);
    let mut out = vec![0x0a, s.len() as u8];
    out.extend_from_slice(s);
    out
}

fn large_str(s: &[u8]) -> Vec<u8> {
    let mut out = vec![0x01];
    out.extend_from_slice(&(s.len() as u32).to_be_bytes());
    out.extend_from_slice(s);
    out
}

fn array(items: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![0x02];
    out.extend_from_slice(&(items.len() as u32).to_be_bytes());
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

fn hash(entries: &[(&[u8], Vec<u8>)]) -> Vec<u8> {
    let mut out = vec![0x03];
    out.extend_from_slice(&(entries.len() as u32).to_be_bytes());
    for (key, value) in entries {
        out.extend_from_slice(value);
        out.extend_from_slice(&(key.len() as u32).to_be_bytes());
        out.extend_from_slice(key);
    }
    out
}

fn back_ref(slot: u32) -> Vec<u8> {
    let mut out = vec![0x00];
    out.extend_from_slice(&slot.to_be_bytes());
    out
}

fn reference(inner: Vec<u8>) -> Vec<u8> {
    let mut out = vec![0x04];
    out.extend(inner);
    out
}

fn bless(class: &[u8], inner: Vec<u8>) -> Vec<u8> {
    let mut out = vec![0x11, class.len() as u8];
    out.extend_from_slice(class);
    out.extend(inner);
    out
}

fn ix_bless(index: u8, inner: Vec<u8>) -> Vec<u8> {
    let mut out = vec![0x12, index];
    out.extend(inner);
    out
}

fn items(value: &Value) -> Vec<Value> {
    value.as_array().expect("array").borrow().clone()
}

// Scalars and containers ----------------------------------------------------

#[test]
fn array_of_strings_keeps_order_and_bytes() {
    let strings: Vec<&[u8]> = vec![b"alpha", b"", b"\xff\x00bin", b"omega"];
    let body = array(&strings.iter().map(|s| small_str(s)).collect::<Vec<_>>());
    let value = thaw(&frozen(&body)).unwrap();
    let decoded = items(&value);
    assert_eq!(decoded.len(), strings.len());
    for (item, expected) in decoded.iter().zip(&strings) {
        assert_eq!(item.as_bytes(), Some(*expected));
    }
}

#[test]
fn hash_reads_value_before_key() {
    let body = hash(&[(b"k1", small_str(b"v1")), (b"k2", small_str(b"v2"))]);
    let value = thaw(&frozen(&body)).unwrap();
    let map = value.as_hash().unwrap().borrow();
    assert_eq!(map.len(), 2);
    assert_eq!(map[&b"k1"[..]].as_bytes(), Some(&b"v1"[..]));
    assert_eq!(map[&b"k2"[..]].as_bytes(), Some(&b"v2"[..]));
    assert!(!map.contains_key(&b"v1"[..]));
}

#[test]
fn hash_keys_are_raw_bytes() {
    let body = hash(&[(b"\xfe\xff", vec![0x08, 0x80])]);
    let value = thaw(&frozen(&body)).unwrap();
    let map = value.as_hash().unwrap().borrow();
    assert_eq!(map[&b"\xfe\xff"[..]].as_i64(), Some(0));
}

#[test]
fn signed_byte_bias() {
    for (byte, expected) in [(0x00u8, -128i64), (0xff, 127), (0x80, 0)] {
        let value = thaw(&frozen(&[0x08, byte])).unwrap();
        assert_eq!(value.as_i64(), Some(expected), "byte 0x{byte:02x}");
    }
}

#[test]
fn small_and_large_strings_decode_identically() {
    let content = vec![b'z'; 255];
    let small = thaw(&frozen(&small_str(&content))).unwrap();
    let large = thaw(&frozen(&large_str(&content))).unwrap();
    assert_eq!(small.as_bytes(), Some(&content[..]));
    assert_eq!(small.as_bytes(), large.as_bytes());

    let mut utf8 = vec![0x18];
    utf8.extend_from_slice(&(content.len() as u32).to_be_bytes());
    utf8.extend_from_slice(&content);
    assert_eq!(thaw(&frozen(&utf8)).unwrap().as_bytes(), Some(&content[..]));
}

#[test]
fn nested_containers() {
    let body = hash(&[
        (b"list", reference(array(&[vec![0x08, 0x81], vec![0x05]]))),
        (b"empty", reference(hash(&[]))),
    ]);
    let value = thaw(&frozen(&body)).unwrap();
    let map = value.as_hash().unwrap().borrow();
    let list = items(&map[&b"list"[..]]);
    assert_eq!(list[0].as_i64(), Some(1));
    assert!(list[1].is_null());
    assert!(map[&b"empty"[..]].as_hash().unwrap().borrow().is_empty());
}

// Back-references -----------------------------------------------------------

#[test]
fn self_reference_builds_a_cycle() {
    // Slot 0 is the array; its only element points back at it.
    let body = array(&[back_ref(0)]);
    let value = thaw(&frozen(&body)).unwrap();
    let first = value.as_array().unwrap().borrow()[0].clone();
    assert!(first.ptr_eq(&value));
}

#[test]
fn shared_reference_is_one_instance() {
    // Slot 0: outer array, slot 1: Ref, slot 2: inner array, slot 3: its
    // element, slot 4: hash.
    let body = array(&[
        reference(array(&[small_str(b"shared")])),
        hash(&[(b"a", back_ref(2)), (b"b", back_ref(2))]),
    ]);
    let value = thaw(&frozen(&body)).unwrap();
    let outer = items(&value);
    let map = outer[1].as_hash().unwrap().borrow();
    let a = map[&b"a"[..]].clone();
    let b = map[&b"b"[..]].clone();
    assert!(a.ptr_eq(&b));
    assert!(a.ptr_eq(&outer[0]));

    a.as_array().unwrap().borrow_mut().push(Value::Integer(9));
    assert_eq!(b.as_array().unwrap().borrow().len(), 2);
    assert_eq!(outer[0].as_array().unwrap().borrow()[1].as_i64(), Some(9));
}

#[test]
fn hash_value_referring_to_enclosing_reference() {
    // Slot 0: Ref wrapping slot 1: hash { self => BackRef(0) }.
    let body = reference(hash(&[(b"self", back_ref(0))]));
    let value = thaw(&frozen(&body)).unwrap();
    let this = value.as_hash().unwrap().borrow()[&b"self"[..]].clone();
    assert!(this.ptr_eq(&value));
}

#[test]
fn later_duplicate_key_replaces_pending_back_reference() {
    // Slot 0: Ref wrapping slot 1: hash { k => BackRef(0), k => 5 }.
    let body = reference(hash(&[(b"k", back_ref(0)), (b"k", vec![0x08, 0x85])]));
    let value = thaw(&frozen(&body)).unwrap();
    let map = value.as_hash().unwrap().borrow();
    assert_eq!(map.len(), 1);
    assert_eq!(map[&b"k"[..]].as_i64(), Some(5));
}

#[test]
fn later_pending_back_reference_replaces_earlier_value() {
    let body = reference(hash(&[(b"k", vec![0x08, 0x85]), (b"k", back_ref(0))]));
    let value = thaw(&frozen(&body)).unwrap();
    let this = value.as_hash().unwrap().borrow()[&b"k"[..]].clone();
    assert!(this.ptr_eq(&value));
}

#[test]
fn back_reference_to_scalar_copies_it() {
    let body = array(&[small_str(b"x"), back_ref(1)]);
    let value = thaw(&frozen(&body)).unwrap();
    let list = items(&value);
    assert_eq!(list[1].as_bytes(), Some(&b"x"[..]));
}

#[test]
fn back_reference_past_known_slots_fails() {
    let body = array(&[back_ref(5)]);
    assert_eq!(
        thaw(&frozen(&body)).unwrap_err(),
        ThawError::InvalidBackReference(5)
    );
}

#[test]
fn tied_wrappers_take_no_slot() {
    // Slot 0: array, tied scalar takes none, slot 1: the byte.
    let body = array(&[vec![0x0d, 0x08, 0x90], back_ref(1)]);
    let value = thaw(&frozen(&body)).unwrap();
    let list = items(&value);
    assert_eq!(list[0].as_i64(), Some(16));
    assert_eq!(list[1].as_i64(), Some(16));
}

// Bless ---------------------------------------------------------------------

#[test]
fn bless_by_index_after_inline_bless() {
    let body = array(&[
        bless(b"Foo", reference(hash(&[]))),
        ix_bless(0, reference(array(&[]))),
    ]);
    let value = thaw(&frozen(&body)).unwrap();
    let list = items(&value);
    assert!(list[0].as_hash().is_some());
    assert!(list[1].as_array().is_some());
}

#[test]
fn bless_index_out_of_range() {
    let body = array(&[
        bless(b"Foo", reference(hash(&[]))),
        ix_bless(1, reference(array(&[]))),
    ]);
    assert_eq!(
        thaw(&frozen(&body)).unwrap_err(),
        ThawError::InvalidBlessIndex(1)
    );
}

// Preamble and malformed input ----------------------------------------------

#[test]
fn native_preamble_decodes_the_same_body() {
    let mut input = NATIVE_MAGIC.to_vec();
    input.extend_from_slice(&NATIVE_MARKER);
    input.extend(small_str(b"ok"));
    let (preamble, value) = thaw_with_preamble(&input).unwrap();
    assert_eq!(preamble, Preamble::Native { marker_ok: true });
    assert_eq!(value.as_str(), Some("ok"));
}

#[test]
fn unknown_preamble_is_tolerated() {
    let mut input = vec![0x02, 0x09];
    input.extend(small_str(b"ok"));
    let (preamble, value) = thaw_with_preamble(&input).unwrap();
    assert_eq!(preamble, Preamble::Unknown([0x02, 0x09]));
    assert_eq!(value.as_str(), Some("ok"));
}

#[test]
fn truncated_array_count() {
    let err = thaw(&[0x05, 0x07, 0x02]).unwrap_err();
    assert!(matches!(err, ThawError::TruncatedInput(_)), "{err:?}");
}

#[test]
fn truncated_string_body() {
    let err = thaw(&frozen(&[0x0a, 0x05, b'a', b'b'])).unwrap_err();
    assert!(matches!(err, ThawError::TruncatedInput(_)), "{err:?}");
}

#[test]
fn empty_body_is_truncated() {
    let err = thaw(&[0x05, 0x07]).unwrap_err();
    assert!(matches!(err, ThawError::TruncatedInput(_)), "{err:?}");
}

#[test]
fn unknown_tag_errors_by_default() {
    let body = array(&[vec![0x13]]);
    assert_eq!(thaw(&frozen(&body)).unwrap_err(), ThawError::UnknownTag(0x13));

    let options = ThawOptions {
        unknown_tag: UnknownTagPolicy::Null,
    };
    let value = thaw_with(&frozen(&body), &options).unwrap();
    assert!(items(&value)[0].is_null());
}

#[test]
fn decoded_tree_converts_to_json() {
    let body = hash(&[
        (b"name", small_str(b"storable")),
        (b"tags", reference(array(&[vec![0x08, 0x81], vec![0x0e]]))),
    ]);
    let json = thaw(&frozen(&body)).unwrap().to_json().unwrap();
    assert_eq!(json, serde_json::json!({"name": "storable", "tags": [1, null]}));
}

// Properties ----------------------------------------------------------------

proptest! {
    #[test]
    fn any_signed_byte_is_unbiased(byte in any::<u8>()) {
        let value = thaw(&frozen(&[0x08, byte])).unwrap();
        prop_assert_eq!(value.as_i64(), Some(byte as i64 - 128));
    }

    #[test]
    fn string_arrays_decode_in_order(
        strings in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..300),
            0..16,
        )
    ) {
        let encoded: Vec<Vec<u8>> = strings
            .iter()
            .map(|s| if s.len() <= 255 { small_str(s) } else { large_str(s) })
            .collect();
        let value = thaw(&frozen(&array(&encoded))).unwrap();
        let decoded = items(&value);
        prop_assert_eq!(decoded.len(), strings.len());
        for (item, expected) in decoded.iter().zip(&strings) {
            prop_assert_eq!(item.as_bytes(), Some(&expected[..]));
        }
    }

    #[test]
    fn arbitrary_input_never_panics(data in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _ = thaw(&data);
    }

    #[test]
    fn every_strict_prefix_is_truncated(cut in 0usize..26) {
        let body = hash(&[(b"k", reference(array(&[small_str(b"abc"), vec![0x08, 0x01]])))]);
        let input = frozen(&body);
        prop_assume!(cut < input.len());
        let err = thaw(&input[..cut]).unwrap_err();
        prop_assert!(matches!(err, ThawError::TruncatedInput(_)));
    }
}
