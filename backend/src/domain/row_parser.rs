//! Validation of raw CSV records into typed expense rows.
//!
//! Parsing never fails the caller: every record either becomes a
//! [`ValidatedRow`] or a [`RowRejection`] explaining which check failed.

use chrono::NaiveDate;
use shared::RawRecord;

use crate::domain::models::expense::ValidatedRow;
use crate::error::RowRejection;

/// Column names shared by the import and export CSV layouts
pub mod columns {
    pub const DATE: &str = "Date";
    pub const AMOUNT: &str = "Amount";
    pub const CATEGORY: &str = "Expense Category";
    pub const DESCRIPTION: &str = "Expense Description";
    pub const GROUP: &str = "Expense Group";
    pub const PAYER: &str = "Payer";
    pub const PAYMENT_MODE: &str = "Payment mode";

    /// Keys that must be present on every imported record
    pub const REQUIRED: [&str; 6] = [DATE, AMOUNT, CATEGORY, GROUP, PAYER, PAYMENT_MODE];

    /// Column order of exported files
    pub const EXPORT_ORDER: [&str; 7] = [DATE, AMOUNT, CATEGORY, DESCRIPTION, GROUP, PAYER, PAYMENT_MODE];
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Display format used in CSV files, e.g. `05-Jan-2024`
const DISPLAY_FORMAT: &str = "%d-%b-%Y";

/// Parse a `D-Mon-YYYY` or `DD-Mon-YYYY` date
pub fn parse_source_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.trim().split('-').collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };

    if day.is_empty() || day.len() > 2 || !day.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = day.parse().ok()?;
    if !(1..=31).contains(&day) {
        return None;
    }

    let month = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(month))
        .map(|index| index as u32 + 1)?;

    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;

    // Rejects days the month does not have, e.g. 31-Feb
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Format a stored date back into the `DD-Mon-YYYY` file format
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|amount| amount.is_finite())
}

fn required_text(record: &RawRecord, column: &'static str) -> Result<String, RowRejection> {
    let value = record
        .get(column)
        .ok_or(RowRejection::MissingColumn { column })?
        .trim();
    if value.is_empty() {
        return Err(RowRejection::EmptyField { column });
    }
    Ok(value.to_string())
}

/// Validate one raw record
pub fn parse_row(record: &RawRecord) -> Result<ValidatedRow, RowRejection> {
    if let Some(column) = columns::REQUIRED.into_iter().find(|c| !record.contains_key(*c)) {
        return Err(RowRejection::MissingColumn { column });
    }

    let raw_date = &record[columns::DATE];
    let date = parse_source_date(raw_date).ok_or_else(|| RowRejection::InvalidDate {
        value: raw_date.clone(),
    })?;

    let raw_amount = &record[columns::AMOUNT];
    let amount = parse_amount(raw_amount).ok_or_else(|| RowRejection::InvalidAmount {
        value: raw_amount.clone(),
    })?;

    let category = required_text(record, columns::CATEGORY)?;
    let group = required_text(record, columns::GROUP)?;
    let payer = required_text(record, columns::PAYER)?;
    let payment_mode = required_text(record, columns::PAYMENT_MODE)?;

    let description = record
        .get(columns::DESCRIPTION)
        .map(|d| d.trim().to_string())
        .unwrap_or_default();

    Ok(ValidatedRow {
        date,
        amount,
        category,
        group,
        payer,
        payment_mode,
        description,
        original: record.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid_record() -> RawRecord {
        record(&[
            ("Date", "5-Jan-2024"),
            ("Amount", " 12.50 "),
            ("Expense Category", " Food "),
            ("Expense Description", " Lunch "),
            ("Expense Group", "Home"),
            ("Payer", "Alice"),
            ("Payment mode", "Card"),
        ])
    }

    #[test]
    fn test_date_round_trip() {
        let date = parse_source_date("05-Jan-2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(format_display_date(date), "05-Jan-2024");

        // Single-digit days are padded on the way out
        let date = parse_source_date("5-Jan-2024").unwrap();
        assert_eq!(format_display_date(date), "05-Jan-2024");
    }

    #[test]
    fn test_date_rejections() {
        for raw in [
            "2024-01-05",
            "32-Jan-2024",
            "05-Xyz-2024",
            "0-Jan-2024",
            "05-Jan-24",
            "05-Jan-20245",
            "005-Jan-2024",
            "05/Jan/2024",
            "05-Jan",
            "aa-Jan-2024",
            "31-Feb-2024",
            "",
        ] {
            assert!(parse_source_date(raw).is_none(), "{} should be rejected", raw);
        }
    }

    #[test]
    fn test_month_names_ignore_case() {
        assert_eq!(
            parse_source_date("15-dec-2023"),
            NaiveDate::from_ymd_opt(2023, 12, 15)
        );
        assert_eq!(
            parse_source_date("29-FEB-2024"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }

    #[test]
    fn test_parse_row_trims_fields() {
        let row = parse_row(&valid_record()).unwrap();

        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(row.amount, 12.5);
        assert_eq!(row.category, "Food");
        assert_eq!(row.description, "Lunch");
        assert_eq!(row.group, "Home");
        assert_eq!(row.payer, "Alice");
        assert_eq!(row.payment_mode, "Card");
        assert_eq!(row.original, valid_record());
    }

    #[test]
    fn test_description_is_optional() {
        let mut rec = valid_record();
        rec.remove("Expense Description");

        let row = parse_row(&rec).unwrap();
        assert_eq!(row.description, "");
    }

    #[test]
    fn test_zero_and_negative_amounts_are_accepted() {
        let mut rec = valid_record();
        rec.insert("Amount".to_string(), "0".to_string());
        assert_eq!(parse_row(&rec).unwrap().amount, 0.0);

        rec.insert("Amount".to_string(), "-20.25".to_string());
        assert_eq!(parse_row(&rec).unwrap().amount, -20.25);
    }

    #[test]
    fn test_bad_amounts_are_rejected() {
        for raw in ["abc", "", "   ", "12abc", "inf", "NaN"] {
            let mut rec = valid_record();
            rec.insert("Amount".to_string(), raw.to_string());
            assert_eq!(
                parse_row(&rec),
                Err(RowRejection::InvalidAmount { value: raw.to_string() }),
                "amount {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_missing_column_is_reported() {
        let mut rec = valid_record();
        rec.remove("Payer");

        assert_eq!(
            parse_row(&rec),
            Err(RowRejection::MissingColumn { column: "Payer" })
        );
    }

    #[test]
    fn test_blank_required_field_is_rejected() {
        let mut rec = valid_record();
        rec.insert("Payment mode".to_string(), "   ".to_string());

        assert_eq!(
            parse_row(&rec),
            Err(RowRejection::EmptyField { column: "Payment mode" })
        );
    }

    #[test]
    fn test_bad_date_carries_raw_value() {
        let mut rec = valid_record();
        rec.insert("Date".to_string(), "2024-01-05".to_string());

        assert_eq!(
            parse_row(&rec),
            Err(RowRejection::InvalidDate { value: "2024-01-05".to_string() })
        );
    }
}
