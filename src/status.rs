//! Two-way mapping between the wire attendance codes and the display
//! vocabulary shown to the teacher. Both directions are total.

pub const DISPLAY_PRESENT: &str = "Katıldı";
pub const DISPLAY_ABSENT: &str = "Katılmadı";
pub const DISPLAY_EXCUSED: &str = "Geç Geldi";
pub const DISPLAY_NO_DATA: &str = "Veri yok";

pub const CODE_PRESENT: &str = "PRESENT";
pub const CODE_ABSENT: &str = "ABSENT";
pub const CODE_EXCUSED: &str = "EXCUSED";

/// The options offered in the status dropdown, in display order.
pub const DISPLAY_OPTIONS: [&str; 3] = [DISPLAY_PRESENT, DISPLAY_ABSENT, DISPLAY_EXCUSED];

/// Display vocabulary -> wire code. Unrecognized input falls back to
/// `PRESENT`, which is the seeded default for an unmarked student.
pub fn externalize(display: &str) -> &'static str {
    match display {
        DISPLAY_PRESENT => CODE_PRESENT,
        DISPLAY_ABSENT => CODE_ABSENT,
        DISPLAY_EXCUSED => CODE_EXCUSED,
        _ => CODE_PRESENT,
    }
}

/// Wire code -> display vocabulary. Unrecognized input surfaces as the
/// "no data" sentinel rather than an error.
pub fn internalize(code: &str) -> &'static str {
    match code {
        CODE_PRESENT => DISPLAY_PRESENT,
        CODE_ABSENT => DISPLAY_ABSENT,
        CODE_EXCUSED => DISPLAY_EXCUSED,
        _ => DISPLAY_NO_DATA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_canonical_status() {
        for display in DISPLAY_OPTIONS {
            assert_eq!(internalize(externalize(display)), display);
        }
    }

    #[test]
    fn unknown_code_maps_to_no_data_sentinel() {
        assert_eq!(internalize("LATE"), DISPLAY_NO_DATA);
        assert_eq!(internalize(""), DISPLAY_NO_DATA);
    }

    #[test]
    fn unknown_display_defaults_to_present_code() {
        assert_eq!(externalize("Veri yok"), CODE_PRESENT);
        assert_eq!(externalize("anything"), CODE_PRESENT);
    }
}
