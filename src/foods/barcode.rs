use lazy_static::lazy_static;
use regex::Regex;

/// EAN-8 through GTIN-14, digits only.
pub fn is_valid_barcode(code: &str) -> bool {
    lazy_static! {
        static ref BARCODE_RE: Regex = Regex::new(r"^[0-9]{8,14}$").unwrap();
    }
    BARCODE_RE.is_match(code)
}
