use super::*;

#[test]
fn shorthand_and_case_collapse_to_one_entry() {
    let list = normalize_hex_list(&["f00", "#FF0000", "ff0000"]);
    assert_eq!(list, vec![Rgb8::new(255, 0, 0)]);
    assert_eq!(list[0].to_string(), "#ff0000");
}

#[test]
fn invalid_entries_are_dropped_silently() {
    let list = normalize_hex_list(&["", "  ", "#12345", "zzzzzz", "#abcd", "0a0a0a", "#GGG"]);
    assert_eq!(list, vec![Rgb8::new(10, 10, 10)]);
}

#[test]
fn normalization_is_idempotent() {
    let input = ["#ABC", " 123456 ", "aabbcc", "#aabbcc", "nope", "#0015FF"];
    let once = normalize_hex_list(&input);
    let hex: Vec<String> = once.iter().map(|c| c.to_hex()).collect();
    let twice = normalize_hex_list(&hex);
    assert_eq!(once, twice);

    for h in &hex {
        assert_eq!(h.len(), 7);
        assert!(h.starts_with('#'));
        assert!(
            h[1..]
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        );
    }
    let mut dedup = hex.clone();
    dedup.dedup();
    assert_eq!(dedup.len(), hex.len());
}

#[test]
fn comma_separated_text_list() {
    let list = parse_color_list("#fff, 000 ,#63C8FF,,bad");
    assert_eq!(
        list,
        vec![
            Rgb8::new(255, 255, 255),
            Rgb8::new(0, 0, 0),
            Rgb8::new(0x63, 0xc8, 0xff)
        ]
    );
}

#[test]
fn from_str_rejects_invalid_single_color() {
    assert_eq!("#0A0A0A".parse::<Rgb8>().unwrap(), Rgb8::new(10, 10, 10));
    assert!("not-a-color".parse::<Rgb8>().is_err());
}

#[test]
fn serde_uses_canonical_hex_strings() {
    let c: Rgb8 = serde_json::from_str("\"#AFCFD9\"").unwrap();
    assert_eq!(c, Rgb8::new(0xaf, 0xcf, 0xd9));
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#afcfd9\"");
    assert!(serde_json::from_str::<Rgb8>("\"#12\"").is_err());
}
