//! Behaviour of the generated field tables
use gridcrate::{FieldKind, FieldValue, GridRecord, GridValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq, GridValue)]
enum Status {
    Open,
    #[grid(rename = "on-hold")]
    OnHold,
}

#[derive(Clone, Debug, GridRecord)]
struct Account {
    id: i32,
    #[grid(rename = "AccountNumber")]
    account_number: String,
    #[grid(column = "balance_cents")]
    balance: Option<i64>,
    status: Status,
    #[grid(skip)]
    #[allow(dead_code)]
    notes: String,
}

fn account() -> Account {
    Account {
        id: 7,
        account_number: "12-34".to_string(),
        balance: None,
        status: Status::OnHold,
        notes: "hidden".to_string(),
    }
}

#[test]
fn test_descriptors_follow_declaration_order() {
    let fields = Account::field_descriptors();
    let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["id", "AccountNumber", "balance", "status"]);

    let indexes: Vec<usize> = fields.iter().map(|f| f.index()).collect();
    assert_eq!(indexes, vec![0, 1, 2, 3]);
}

#[test]
fn test_kinds_columns_and_optionality() {
    let resolver = Account::resolver();
    let balance = resolver.resolve("BALANCE").unwrap();
    assert_eq!(balance.column(), "balance_cents");
    assert_eq!(balance.kind(), FieldKind::Integer);
    assert!(balance.is_optional());

    let number = resolver.resolve("accountnumber").unwrap();
    assert_eq!(number.column(), "account_number");
    assert!(!number.is_optional());

    assert_eq!(
        resolver.resolve("status").unwrap().kind(),
        FieldKind::Enum(&["Open", "on-hold"])
    );
    assert!(resolver.find("notes").is_none());
}

#[test]
fn test_field_values() {
    let account = account();
    assert_eq!(account.field_value(0), FieldValue::Integer(7));
    assert_eq!(account.field_value(1), FieldValue::Text("12-34".into()));
    assert_eq!(account.field_value(2), FieldValue::Null);
    assert_eq!(account.field_value(3), FieldValue::Enum("on-hold"));
    assert_eq!(account.field_value(99), FieldValue::Null);
}

#[test]
fn test_enum_value_kind() {
    assert_eq!(Status::KIND, FieldKind::Enum(&["Open", "on-hold"]));
    assert_eq!(Status::Open.to_field_value(), FieldValue::Enum("Open"));
    assert!(!Status::OPTIONAL);
}
