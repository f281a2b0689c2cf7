//! Row mapping for the Northwind CSV exports.
//!
//! Rows are split on `,` only. There is no quoting support, so a field with
//! an embedded comma shifts every later column of that row.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ByteRecord, ReaderBuilder};
use northwind_core::{CoreError, CoreResult, Customer, Order};

/// Rows with fewer fields are discarded.
pub const CUSTOMER_MIN_COLUMNS: usize = 10;
pub const ORDER_MIN_COLUMNS: usize = 7;

const CUSTOMER_ID: usize = 0;
const COMPANY_NAME: usize = 1;
const CONTACT_NAME: usize = 2;
const COUNTRY: usize = 8;
const PHONE: usize = 9;
const FAX: usize = 10;

const ORDER_ID: usize = 0;
const ORDER_CUSTOMER_ID: usize = 1;
const ORDER_DATE: usize = 3;
const SHIPPED_DATE: usize = 5;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Result of reading one file: mapped rows plus the number discarded.
pub(crate) struct Parsed<T> {
    pub rows: Vec<T>,
    pub discarded: usize,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            discarded: 0,
        }
    }
}

/// Reads every data line of `path` (header skipped), mapping each with
/// `map_row`. `None` from the mapper counts as a discarded row.
pub(crate) fn read_rows<T>(
    path: &Path,
    map_row: impl Fn(&[String]) -> Option<T>,
) -> CoreResult<Parsed<T>> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(file);

    let mut parsed = Parsed::default();
    let mut record = ByteRecord::new();

    loop {
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let cols: Vec<String> = record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect();

                if cols.iter().all(|c| c.trim().is_empty()) {
                    continue;
                }

                match map_row(&cols) {
                    Some(row) => parsed.rows.push(row),
                    None => parsed.discarded += 1,
                }
            }
            Err(err) if err.is_io_error() => {
                return Err(CoreError::internal(format!(
                    "failed to read {}: {err}",
                    path.display()
                )));
            }
            Err(_) => parsed.discarded += 1,
        }
    }

    Ok(parsed)
}

pub(crate) fn customer_from_columns(cols: &[String]) -> Option<Customer> {
    if cols.len() < CUSTOMER_MIN_COLUMNS {
        return None;
    }

    Some(Customer {
        customer_id: cols[CUSTOMER_ID].clone(),
        company_name: cols[COMPANY_NAME].clone(),
        contact_name: Some(cols[CONTACT_NAME].clone()),
        country: Some(cols[COUNTRY].clone()),
        phone: Some(cols[PHONE].clone()),
        fax: cols.get(FAX).cloned(),
    })
}

pub(crate) fn order_from_columns(cols: &[String]) -> Option<Order> {
    if cols.len() < ORDER_MIN_COLUMNS {
        return None;
    }

    let order_id = cols[ORDER_ID].trim().parse::<i32>().ok()?;

    Some(
        Order::new(order_id, Some(cols[ORDER_CUSTOMER_ID].clone()))
            .with_order_date(parse_csv_date(&cols[ORDER_DATE]))
            .with_shipped_date(parse_csv_date(&cols[SHIPPED_DATE])),
    )
}

/// Parses a date cell from the orders export.
///
/// Blank cells and the literal `NULL` (any case) mean "no value"; text in
/// none of the accepted formats also yields `None` rather than an error.
#[must_use]
pub fn parse_csv_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("NULL") {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.naive_utc());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn cols(line: &str) -> Vec<String> {
        line.split(',').map(str::to_string).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn customer_row_with_fax() {
        let row = cols("ALFKI,Alfreds Futterkiste,Maria Anders,Sales Representative,Obere Str. 57,Berlin,,12209,Germany,030-0074321,030-0076545");
        let customer = customer_from_columns(&row).unwrap();
        assert_eq!(customer.customer_id, "ALFKI");
        assert_eq!(customer.contact_name.as_deref(), Some("Maria Anders"));
        assert_eq!(customer.country.as_deref(), Some("Germany"));
        assert_eq!(customer.phone.as_deref(), Some("030-0074321"));
        assert_eq!(customer.fax.as_deref(), Some("030-0076545"));
    }

    #[test]
    fn customer_row_without_fax_column() {
        let row = cols("ANATR,Ana Trujillo,Ana Trujillo,Owner,Avda. 2222,México D.F.,,05021,Mexico,(5) 555-4729");
        let customer = customer_from_columns(&row).unwrap();
        assert_eq!(customer.fax, None);
    }

    #[test]
    fn short_customer_row_is_discarded() {
        assert!(customer_from_columns(&cols("ALFKI,Alfreds,Maria,Germany")).is_none());
    }

    #[test]
    fn order_row_mapping() {
        let row = cols("10643,ALFKI,6,1997-08-25,1997-09-22,1997-09-02,1,29.46");
        let order = order_from_columns(&row).unwrap();
        assert_eq!(order.order_id, 10643);
        assert_eq!(order.customer_id.as_deref(), Some("ALFKI"));
        assert_eq!(order.order_date, Some(date(1997, 8, 25)));
        assert_eq!(order.shipped_date, Some(date(1997, 9, 2)));
    }

    #[test]
    fn order_with_unparsable_id_is_discarded() {
        let row = cols("abc,ALFKI,6,1997-08-25,1997-09-22,1997-09-02,1");
        assert!(order_from_columns(&row).is_none());
    }

    #[test]
    fn date_tokens() {
        assert_eq!(parse_csv_date(""), None);
        assert_eq!(parse_csv_date("NULL"), None);
        assert_eq!(parse_csv_date("null"), None);
        assert_eq!(parse_csv_date("not a date"), None);
        assert_eq!(parse_csv_date("1997-09-02"), Some(date(1997, 9, 2)));
        assert_eq!(
            parse_csv_date("1997-09-02 00:00:00.000"),
            Some(date(1997, 9, 2))
        );
        assert_eq!(parse_csv_date("9/2/1997"), Some(date(1997, 9, 2)));
    }
}
