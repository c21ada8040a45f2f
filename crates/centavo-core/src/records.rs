//! Typed records stored in the collections.
//!
//! The store itself treats records as opaque JSON; these types give the
//! command layer a typed view. Wire field names are the bot's historical
//! Spanish ones — existing data files must keep parsing.

use crate::clock;
use crate::store::{Collection, Store};
use chrono::{DateTime, Local, NaiveDate, SecondsFormat};
use chrono_tz::Tz;
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One recorded expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,

    /// RFC 3339 timestamp localized to the configured timezone.
    #[serde(rename = "fecha")]
    pub date: String,

    /// Whole currency units.
    #[serde(rename = "monto")]
    pub amount: i64,

    #[serde(rename = "categoria")]
    pub category: String,

    #[serde(rename = "detalle")]
    pub detail: String,
}

impl Expense {
    pub fn new(amount: i64, category: &str, detail: &str, now: DateTime<Tz>) -> Self {
        Self {
            id: new_record_id("g"),
            date: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            amount,
            category: category.to_string(),
            detail: detail.to_string(),
        }
    }

    /// The recorded timestamp, reinterpreted in `tz`.
    pub fn date_in(&self, tz: Tz) -> Option<DateTime<Tz>> {
        clock::parse_stored(&self.date, tz)
    }
}

/// One scheduled payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPayment {
    pub id: String,

    #[serde(rename = "nombre")]
    pub name: String,

    /// Whole currency units.
    #[serde(rename = "monto")]
    pub amount: i64,

    /// Due date, `YYYY-MM-DD`.
    #[serde(rename = "vencimiento")]
    pub due_date: String,

    #[serde(rename = "pagado", default)]
    pub paid: bool,
}

impl PendingPayment {
    pub fn new(name: &str, amount: i64, due_date: NaiveDate) -> Self {
        Self {
            id: new_record_id("p"),
            name: name.to_string(),
            amount,
            due_date: due_date.format("%Y-%m-%d").to_string(),
            paid: false,
        }
    }
}

/// Generate a record id: `<prefix>-<YYYYMMDD>-<uuid8>`.
pub fn new_record_id(prefix: &str) -> String {
    let date_part = Local::now().format("%Y%m%d");
    let uuid = Uuid::new_v4().to_string();
    format!("{prefix}-{date_part}-{}", &uuid[..8])
}

impl Store {
    /// All expenses, in insertion order. Malformed records are skipped with
    /// a warning rather than failing the whole read.
    pub fn expenses(&self) -> Vec<Expense> {
        decode_records(self.records(Collection::Expenses), "expense")
    }

    /// Persist one expense. `false` means "not persisted".
    pub fn append_expense(&self, expense: &Expense) -> bool {
        self.append_typed(Collection::Expenses, expense)
    }

    /// All scheduled payments, paid or not, in insertion order.
    pub fn payments(&self) -> Vec<PendingPayment> {
        decode_records(self.records(Collection::Payments), "payment")
    }

    /// Persist one scheduled payment. `false` means "not persisted".
    pub fn append_payment(&self, payment: &PendingPayment) -> bool {
        self.append_typed(Collection::Payments, payment)
    }

    fn append_typed<T: Serialize>(&self, collection: Collection, record: &T) -> bool {
        match serde_json::to_value(record) {
            Ok(value) => self.append(collection, value),
            Err(e) => {
                error!("could not serialize record: {e}");
                false
            }
        }
    }
}

fn decode_records<T: DeserializeOwned>(values: Vec<Value>, kind: &str) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("skipping malformed {kind} record: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use chrono::TimeZone;
    use chrono_tz::America::Bogota;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_now() -> DateTime<Tz> {
        Bogota.with_ymd_and_hms(2025, 11, 12, 10, 30, 0).unwrap()
    }

    #[test]
    fn expense_uses_wire_field_names() {
        let expense = Expense::new(15_000, "varios", "almuerzo", test_now());
        let value = serde_json::to_value(&expense).unwrap();

        assert_eq!(value["monto"], json!(15_000));
        assert_eq!(value["categoria"], json!("varios"));
        assert_eq!(value["detalle"], json!("almuerzo"));
        assert_eq!(value["fecha"], json!("2025-11-12T10:30:00-05:00"));
        assert!(value["id"].as_str().unwrap().starts_with("g-"));
    }

    #[test]
    fn payment_uses_wire_field_names() {
        let due = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let payment = PendingPayment::new("internet", 80_000, due);
        let value = serde_json::to_value(&payment).unwrap();

        assert_eq!(value["nombre"], json!("internet"));
        assert_eq!(value["monto"], json!(80_000));
        assert_eq!(value["vencimiento"], json!("2025-12-01"));
        assert_eq!(value["pagado"], json!(false));
        assert!(value["id"].as_str().unwrap().starts_with("p-"));
    }

    #[test]
    fn payment_missing_paid_flag_defaults_to_unpaid() {
        let payment: PendingPayment = serde_json::from_value(json!({
            "id": "p-1",
            "nombre": "luz",
            "monto": 50000,
            "vencimiento": "2025-12-31"
        }))
        .unwrap();
        assert!(!payment.paid);
    }

    #[test]
    fn record_id_format() {
        let id = new_record_id("g");
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "g");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn record_ids_are_unique() {
        assert_ne!(new_record_id("g"), new_record_id("g"));
    }

    #[test]
    fn expense_round_trip_through_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::new(StoreConfig::new(temp_dir.path()));

        let expense = Expense::new(15_000, "transporte", "bus", test_now());
        assert!(store.append_expense(&expense));

        let expenses = store.expenses();
        assert_eq!(expenses, vec![expense]);
    }

    #[test]
    fn payment_round_trip_through_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::new(StoreConfig::new(temp_dir.path()));

        let due = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let payment = PendingPayment::new("luz", 50_000, due);
        assert!(store.append_payment(&payment));

        assert_eq!(store.payments(), vec![payment]);
    }

    #[test]
    fn malformed_records_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::new(StoreConfig::new(temp_dir.path()));

        assert!(store.append(Collection::Expenses, json!({"not": "an expense"})));
        let expense = Expense::new(5_000, "varios", "cafe", test_now());
        assert!(store.append_expense(&expense));

        let expenses = store.expenses();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].detail, "cafe");
    }

    #[test]
    fn expense_date_reparses_in_timezone() {
        let expense = Expense::new(1_000, "varios", "x", test_now());
        let parsed = expense.date_in(Bogota).unwrap();
        assert_eq!(clock::day_key(&parsed), "2025-11-12");
    }
}
