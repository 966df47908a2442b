use calamine::{Data, Range};
use chrono::{Days, NaiveDate, NaiveDateTime};

/// A sheet as read from the workbook: the header row and the cells below it.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Data>>) -> Self {
        Self { headers, rows }
    }

    /// Treat the first row of the range as headers.
    pub fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|header| header.iter().map(cell_text).collect())
            .unwrap_or_default();
        let rows = rows.map(|row| row.to_vec()).collect();
        Self { headers, rows }
    }

    /// Index of the header matching `name`, ignoring case and surrounding whitespace.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(name))
    }

    /// Rows that carry at least one non-blank cell.
    pub fn data_rows(&self) -> impl Iterator<Item = &[Data]> {
        self.rows
            .iter()
            .map(Vec::as_slice)
            .filter(|row| row.iter().any(|cell| !is_blank(cell)))
    }
}

pub(crate) fn cell<'a>(row: &'a [Data], index: usize) -> &'a Data {
    static EMPTY: Data = Data::Empty;
    row.get(index).unwrap_or(&EMPTY)
}

pub(crate) fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            text.trim().to_string()
        }
        Data::Int(value) => value.to_string(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{value:.0}")
        }
        Data::Float(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        _ => String::new(),
    }
}

/// Numeric value of a cell; `None` when the cell is empty or not a number.
pub(crate) fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(value) => Some(*value as f64),
        Data::Float(value) => Some(*value),
        Data::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
        Data::DateTime(value) => Some(value.as_f64()),
        Data::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Calendar date of a cell; `None` for anything that does not read as a date.
pub(crate) fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(value) => serial_to_date(value.as_f64()),
        Data::Float(value) => serial_to_date(*value),
        Data::Int(value) => serial_to_date(*value as f64),
        Data::String(text) | Data::DateTimeIso(text) => parse_date(text),
        _ => None,
    }
}

const LAST_SERIAL: f64 = 2_958_466.0;

/// Excel serial day number (1900 date system) to a calendar date.
pub(crate) fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..LAST_SERIAL).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

pub(crate) fn date_to_serial(date: NaiveDate) -> f64 {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .map(|epoch| (date - epoch).num_days() as f64)
        .unwrap_or(f64::NAN)
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%d %b %Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const MONTH_FORMATS: [&str; 2] = ["%d %b %Y", "%d %B %Y"];

pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| {
            // "Mar 2024" style labels resolve to the first of the month.
            let padded = format!("1 {text}");
            MONTH_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(&padded, format).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_date_spellings() {
        assert_eq!(parse_date("2024-03-31"), Some(date(2024, 3, 31)));
        assert_eq!(parse_date("2024-03-31 00:00:00"), Some(date(2024, 3, 31)));
        assert_eq!(parse_date("2024-03-31T00:00:00.000"), Some(date(2024, 3, 31)));
        assert_eq!(parse_date("03/31/2024"), Some(date(2024, 3, 31)));
        assert_eq!(parse_date("31-Mar-2024"), Some(date(2024, 3, 31)));
        assert_eq!(parse_date("Mar 2024"), Some(date(2024, 3, 1)));
        assert_eq!(parse_date("  "), None);
        assert_eq!(parse_date("Q1 FY24"), None);
    }

    #[test]
    fn serial_numbers_map_to_dates() {
        assert_eq!(serial_to_date(45382.0), Some(date(2024, 3, 31)));
        assert_eq!(date_to_serial(date(2024, 3, 31)), 45382.0);
        assert_eq!(serial_to_date(0.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn numbers_coerce_from_text_or_fail() {
        assert_eq!(cell_number(&Data::String(" 12.5 ".into())), Some(12.5));
        assert_eq!(cell_number(&Data::String("N/A".into())), None);
        assert_eq!(cell_number(&Data::Int(7)), Some(7.0));
        assert_eq!(cell_number(&Data::Empty), None);
    }

    #[test]
    fn headers_match_case_insensitively() {
        let table = RawTable::new(
            vec!["Company_symbol".into(), " quarter_date ".into()],
            vec![
                vec![Data::String("AAA".into()), Data::Empty],
                vec![Data::Empty, Data::String("   ".into())],
            ],
        );
        assert_eq!(table.column("company_SYMBOL"), Some(0));
        assert_eq!(table.column("quarter_date"), Some(1));
        assert_eq!(table.column("industry"), None);
        assert_eq!(table.data_rows().count(), 1);
    }
}
