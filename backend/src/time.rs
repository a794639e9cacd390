use chrono::{DateTime, Local};

/// Layout used when a selection time is rendered for clients,
/// e.g. `Mon Jan  2 15:04:05 2006`.
pub const DISPLAY_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

pub fn now() -> DateTime<Local> {
    Local::now()
}

pub fn display(ts: &DateTime<Local>) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_pads_single_digit_day_with_space() {
        let ts = Local.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
        assert_eq!(display(&ts), "Mon Jan  2 15:04:05 2006");
    }

    #[test]
    fn display_keeps_two_digit_day() {
        let ts = Local.with_ymd_and_hms(2024, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(display(&ts), "Thu Mar 14 09:26:53 2024");
    }
}
