//! Integration tests for the Introspectable derive and the accessors macro.
//!
//! These tests run the generated code through the graphbind runtime:
//! normalization, copying and metadata hooks.

use graphbind::{
    accessors, copy, BindError, ConversionError, FieldContext, FromValue, Introspectable,
    Normalized, ObjectCopyExt, Serializer, ToValue, Value,
};

#[derive(Debug, Clone, Default, Introspectable)]
#[introspect(accessors)]
struct Customer {
    #[allow(non_snake_case)]
    pub Id: i64,
    _name: String,
    #[introspect(readonly)]
    pub created: String,
    #[introspect(skip)]
    pub scratch: Vec<u8>,
}

#[accessors]
impl Customer {
    fn get_name(&self) -> String {
        self._name.clone()
    }

    fn set_name(&mut self, name: String) {
        self._name = name;
    }

    #[accessor(skip)]
    #[allow(dead_code)]
    fn get_scratch_len(&self) -> usize {
        self.scratch.len()
    }
}

fn customer() -> Customer {
    Customer {
        Id: 10,
        _name: "Joao".to_string(),
        created: "2020-01-01".to_string(),
        scratch: vec![1, 2, 3],
    }
}

// =============================================================================
// Normalization Tests
// =============================================================================

#[test]
fn test_public_fields_and_accessors() {
    let out = Serializer::new(&customer()).to_normalized();
    assert_eq!(out.keys(), vec!["Id", "name", "created"]);
    assert_eq!(out.get("name"), Some(&Normalized::from("Joao")));
}

#[test]
fn test_restricted_field_without_accessor_is_hidden() {
    #[derive(Clone, Introspectable)]
    struct Account {
        pub owner: String,
        balance: i64,
    }

    let account = Account {
        owner: "Ana".to_string(),
        balance: 100,
    };
    assert_eq!(account.balance, 100);

    let out = Serializer::new(&account).to_normalized();
    assert_eq!(out.keys(), vec!["owner"]);
}

#[test]
fn test_raw_identifier_field() {
    #[derive(Clone, Introspectable)]
    struct Token {
        pub r#type: String,
    }

    let json = Serializer::new(&Token {
        r#type: "bearer".to_string(),
    })
    .to_json()
    .unwrap();
    assert_eq!(json, r#"{"type":"bearer"}"#);
}

#[test]
fn test_nested_records() {
    #[derive(Clone, Introspectable)]
    struct Order {
        pub number: i64,
        pub customer: Customer,
        pub lines: Vec<String>,
    }

    let order = Order {
        number: 7,
        customer: customer(),
        lines: vec!["a".to_string(), "b".to_string()],
    };

    let json = Serializer::new(&order).to_json().unwrap();
    assert_eq!(
        json,
        r#"{"number":7,"customer":{"Id":10,"name":"Joao","created":"2020-01-01"},"lines":["a","b"]}"#
    );

    let shallow = Serializer::new(&order).with_stop_at_first_level().to_normalized();
    assert!(shallow.get("customer").and_then(Normalized::as_opaque).is_some());
    assert_eq!(shallow.get("number"), Some(&Normalized::from(7)));
}

#[test]
fn test_generic_record() {
    #[derive(Clone, Introspectable)]
    struct Wrapper<T> {
        pub inner: T,
    }

    let out = Serializer::new(&Wrapper { inner: 5_i64 }).to_json().unwrap();
    assert_eq!(out, r#"{"inner":5}"#);
}

// =============================================================================
// Dynamic Shape Tests
// =============================================================================

#[derive(Clone, Introspectable)]
#[introspect(dynamic)]
struct Profile {
    pub nickname: String,
    pub full_name: String,
    first: String,
    last: String,
}

#[accessors]
impl Profile {
    fn get_full_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }

    #[allow(non_snake_case)]
    fn getInitials(&self) -> String {
        let first = self.first.chars().next().unwrap_or_default();
        let last = self.last.chars().next().unwrap_or_default();
        format!("{first}{last}")
    }
}

#[test]
fn test_dynamic_accessors_come_first() {
    let profile = Profile {
        nickname: "jj".to_string(),
        full_name: "ignored".to_string(),
        first: "Joao".to_string(),
        last: "Gilberto".to_string(),
    };

    let out = Serializer::new(&profile).to_normalized();
    assert_eq!(out.keys(), vec!["full_name", "initials", "nickname"]);
    assert_eq!(out.get("full_name"), Some(&Normalized::from("Joao Gilberto")));
    assert_eq!(out.get("initials"), Some(&Normalized::from("JG")));
}

// =============================================================================
// Copy Tests
// =============================================================================

#[test]
fn test_copy_uses_setters_and_fields() {
    let source = Value::map([
        ("Id", Value::from(5)),
        ("name", Value::from("Maria")),
        ("created", Value::from("never")),
        ("unknown", Value::from(true)),
    ]);

    let mut target = Customer::default();
    copy(&source, &mut target, None).unwrap();

    assert_eq!(target.Id, 5);
    assert_eq!(target.get_name(), "Maria");
    assert_eq!(target.created, "");
}

#[test]
fn test_copy_case_insensitive_field() {
    let source = Value::map([("id", Value::from("42"))]);
    let target = Customer::create_from(&source, None).unwrap();
    assert_eq!(target.Id, 42);
}

#[test]
fn test_copy_between_records() {
    let mut target = Customer::default();
    customer().copy_to(&mut target, None).unwrap();
    assert_eq!(target.Id, 10);
    assert_eq!(target.get_name(), "Joao");
    assert!(target.scratch.is_empty());
}

#[test]
fn test_copy_reports_conversion_errors() {
    let source = Value::map([("Id", Value::from("not a number"))]);
    let mut target = Customer::default();
    let err = target.bind_from(&source).unwrap_err();
    assert!(err.to_string().contains("Id"));
}

#[test]
fn test_failed_copy_leaves_target_unchanged() {
    let source = Value::map([
        ("name", Value::from("changed")),
        ("Id", Value::from("abc")),
    ]);
    let mut target = customer();

    let err = copy(&source, &mut target, None).unwrap_err();

    assert!(matches!(err, BindError::Conversion { ref field, .. } if field == "Id"));
    assert_eq!(target.Id, 10);
    assert_eq!(target.get_name(), "Joao");
}

#[derive(Debug, Clone, Default, Introspectable)]
#[introspect(accessors)]
struct Subscriber {
    pub name: String,
    _email: String,
}

#[accessors]
impl Subscriber {
    fn get_email(&self) -> String {
        self._email.clone()
    }

    fn set_email(&mut self, email: String) -> Result<(), String> {
        if !email.contains('@') {
            return Err(format!("'{email}' is not an address"));
        }
        self._email = email;
        Ok(())
    }
}

#[test]
fn test_fallible_setter_accepts_valid_value() {
    let source = Value::map([("email", Value::from("ana@example.com"))]);
    let target = Subscriber::create_from(&source, None).unwrap();
    assert_eq!(target.get_email(), "ana@example.com");
}

#[test]
fn test_fallible_setter_error_is_propagated() {
    let source = Value::map([("email", Value::from("nope"))]);
    let mut target = Subscriber {
        name: "Ana".to_string(),
        _email: "ana@example.com".to_string(),
    };

    let err = target.bind_from(&source).unwrap_err();

    match err {
        BindError::Conversion { field, source } => {
            assert_eq!(field, "email");
            assert_eq!(
                source,
                ConversionError::Rejected {
                    setter: "set_email",
                    message: "'nope' is not an address".to_string(),
                }
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(target.get_email(), "ana@example.com");
}

// =============================================================================
// Value Conversion Tests
// =============================================================================

#[test]
fn test_record_value_round_trip() {
    let value = customer().to_value();
    assert!(value.as_record().is_some());

    let back = Customer::from_value(value).unwrap();
    assert_eq!(back.Id, 10);
    assert_eq!(back.scratch, vec![1, 2, 3]);

    let err = Customer::from_value(Value::from(1)).unwrap_err();
    assert!(matches!(err, ConversionError::TypeMismatch { .. }));
}

// =============================================================================
// Metadata Tests
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Label(&'static str);

#[derive(Debug, Clone, PartialEq)]
struct Hidden;

#[derive(Debug, Clone, PartialEq)]
struct Code(String);

impl Code {
    fn parse(raw: &str) -> Result<Code, String> {
        if raw.is_empty() {
            Err("empty code".to_string())
        } else {
            Ok(Code(raw.to_string()))
        }
    }
}

#[derive(Clone, Introspectable)]
struct Tagged {
    #[introspect(meta = Label("identifier"))]
    pub id: i64,
    #[introspect(meta = Hidden)]
    pub secret: String,
    #[introspect(try_meta = Code::parse(""), try_meta = Code::parse("X1"))]
    pub code: String,
    #[introspect(try_meta = Code::parse("X1"))]
    pub sku: String,
    pub plain: bool,
}

fn tagged() -> Tagged {
    Tagged {
        id: 1,
        secret: "s3cr3t".to_string(),
        code: "raw".to_string(),
        sku: "raw".to_string(),
        plain: true,
    }
}

#[test]
fn test_metadata_hook_rewrites_values() {
    let out = Serializer::new(&tagged()).parse_attributes::<Label, _>(
        |label: Option<&Label>, value, _context: &FieldContext<'_>| match label {
            Some(label) => Normalized::from(label.0),
            None => value,
        },
    );

    assert_eq!(out.get("id"), Some(&Normalized::from("identifier")));
    assert_eq!(out.get("plain"), Some(&Normalized::from(true)));
}

#[test]
fn test_metadata_hook_can_drop_fields() {
    let out = Serializer::new(&tagged())
        .with_drop_nulls(true)
        .parse_attributes::<Hidden, _>(|hidden: Option<&Hidden>, value, _context: &FieldContext<'_>| {
            if hidden.is_some() {
                Normalized::NULL
            } else {
                value
            }
        });

    assert_eq!(out.keys(), vec!["id", "code", "sku", "plain"]);
}

#[test]
fn test_failing_metadata_is_skipped() {
    let out = Serializer::new(&tagged()).parse_attributes::<Code, _>(
        |code: Option<&Code>, value, context: &FieldContext<'_>| match code {
            Some(code) => Normalized::from(format!("{}={}", context.public_name, code.0)),
            None => value,
        },
    );

    assert_eq!(out.get("sku"), Some(&Normalized::from("sku=X1")));
    // one failing factory leaves the whole field without metadata
    assert_eq!(out.get("code"), Some(&Normalized::from("raw")));
    assert_eq!(out.get("secret"), Some(&Normalized::from("s3cr3t")));
}
