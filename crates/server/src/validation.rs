//! Declarative request validation.
//!
//! Each endpoint declares a per-field rule set that is evaluated against the
//! raw JSON payload before the body is deserialized and before any store
//! operation runs. On any violation the request is rejected with the full
//! list of per-field messages and the store layer is never reached.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use quickmeds_core::PaymentMethod;

/// A single per-field validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

/// A single declarative check applied to one field.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// String value, non-empty after trimming.
    NotEmpty,
    /// String length bounds, in characters.
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    /// Numeric value with an optional lower bound.
    Float { min: Option<f64> },
    /// Integer value with an optional lower bound.
    Int { min: Option<i64> },
    /// Array value with at least one element.
    NonEmptyArray,
    /// String value drawn from a fixed set.
    OneOf(&'static [&'static str]),
    /// String value matching a regex pattern.
    Matches(&'static str),
}

/// The rule set for one field of a payload.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    /// Optional fields are skipped when absent or null.
    pub optional: bool,
    pub rules: &'static [Rule],
}

impl FieldRules {
    const fn required(field: &'static str, rules: &'static [Rule]) -> Self {
        Self {
            field,
            optional: false,
            rules,
        }
    }

    const fn optional(field: &'static str, rules: &'static [Rule]) -> Self {
        Self {
            field,
            optional: true,
            rules,
        }
    }
}

/// Rule set for `POST /products`.
pub const PRODUCT_CREATE: &[FieldRules] = &[
    FieldRules::required(
        "name",
        &[
            Rule::NotEmpty,
            Rule::Length {
                min: Some(3),
                max: Some(100),
            },
        ],
    ),
    FieldRules::required("category", &[Rule::NotEmpty]),
    FieldRules::required("price", &[Rule::Float { min: Some(0.0) }]),
    FieldRules::required(
        "description",
        &[
            Rule::NotEmpty,
            Rule::Length {
                min: Some(10),
                max: None,
            },
        ],
    ),
    FieldRules::optional("stock", &[Rule::Int { min: Some(0) }]),
    FieldRules::optional("image", &[Rule::NotEmpty]),
];

/// Rule set for `PATCH /products/:id` (same constraints, every field optional).
pub const PRODUCT_UPDATE: &[FieldRules] = &[
    FieldRules::optional(
        "name",
        &[
            Rule::NotEmpty,
            Rule::Length {
                min: Some(3),
                max: Some(100),
            },
        ],
    ),
    FieldRules::optional("category", &[Rule::NotEmpty]),
    FieldRules::optional("price", &[Rule::Float { min: Some(0.0) }]),
    FieldRules::optional(
        "description",
        &[
            Rule::NotEmpty,
            Rule::Length {
                min: Some(10),
                max: None,
            },
        ],
    ),
    FieldRules::optional("stock", &[Rule::Int { min: Some(0) }]),
    FieldRules::optional("image", &[Rule::NotEmpty]),
];

/// Rule set for `POST /orders`.
pub const ORDER_CREATE: &[FieldRules] = &[
    FieldRules::required("user", &[Rule::NotEmpty]),
    FieldRules::required("items", &[Rule::NonEmptyArray]),
    FieldRules::required("totalAmount", &[Rule::Float { min: Some(0.0) }]),
    FieldRules::required("shippingAddress", &[Rule::NotEmpty]),
    FieldRules::required("paymentMethod", &[Rule::OneOf(PaymentMethod::ALL)]),
];

/// Evaluate a rule set against a JSON payload.
///
/// # Errors
///
/// Returns every violation found, so a response can report all failing
/// fields at once.
pub fn validate(payload: &Value, rules: &[FieldRules]) -> Result<(), Vec<FieldViolation>> {
    let Some(object) = payload.as_object() else {
        return Err(vec![FieldViolation::new(
            "body",
            "expected a JSON object",
        )]);
    };

    let mut violations = Vec::new();
    for field_rules in rules {
        let value = object.get(field_rules.field).filter(|v| !v.is_null());
        match value {
            None if field_rules.optional => {}
            None => violations.push(FieldViolation::new(
                field_rules.field,
                format!("{} is required", field_rules.field),
            )),
            Some(value) => {
                for rule in field_rules.rules {
                    if let Some(violation) = check(field_rules.field, value, rule) {
                        violations.push(violation);
                    }
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check(field: &str, value: &Value, rule: &Rule) -> Option<FieldViolation> {
    match rule {
        Rule::NotEmpty => match value.as_str() {
            Some(s) if !s.trim().is_empty() => None,
            Some(_) => Some(FieldViolation::new(field, format!("{field} must not be empty"))),
            None => Some(FieldViolation::new(field, format!("{field} must be a string"))),
        },
        Rule::Length { min, max } => {
            let Some(s) = value.as_str() else {
                return Some(FieldViolation::new(field, format!("{field} must be a string")));
            };
            let len = s.chars().count();
            if min.is_some_and(|min| len < min) || max.is_some_and(|max| len > max) {
                let bounds = match (min, max) {
                    (Some(min), Some(max)) => format!("between {min} and {max}"),
                    (Some(min), None) => format!("at least {min}"),
                    (None, Some(max)) => format!("at most {max}"),
                    (None, None) => return None,
                };
                return Some(FieldViolation::new(
                    field,
                    format!("{field} must be {bounds} characters"),
                ));
            }
            None
        }
        Rule::Float { min } => {
            let Some(n) = value.as_f64() else {
                return Some(FieldViolation::new(field, format!("{field} must be a number")));
            };
            if min.is_some_and(|min| n < min) {
                return Some(FieldViolation::new(
                    field,
                    format!("{field} must be at least {}", min.unwrap_or(0.0)),
                ));
            }
            None
        }
        Rule::Int { min } => {
            let Some(n) = value.as_i64() else {
                return Some(FieldViolation::new(
                    field,
                    format!("{field} must be an integer"),
                ));
            };
            if min.is_some_and(|min| n < min) {
                return Some(FieldViolation::new(
                    field,
                    format!("{field} must be at least {}", min.unwrap_or(0)),
                ));
            }
            None
        }
        Rule::NonEmptyArray => match value.as_array() {
            Some(items) if !items.is_empty() => None,
            Some(_) => Some(FieldViolation::new(
                field,
                format!("{field} must not be empty"),
            )),
            None => Some(FieldViolation::new(field, format!("{field} must be an array"))),
        },
        Rule::OneOf(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => None,
            _ => Some(FieldViolation::new(
                field,
                format!("{field} must be one of: {}", allowed.join(", ")),
            )),
        },
        Rule::Matches(pattern) => {
            let Some(s) = value.as_str() else {
                return Some(FieldViolation::new(field, format!("{field} must be a string")));
            };
            // Patterns are compile-time constants; an invalid one is a bug.
            let regex = Regex::new(pattern).ok()?;
            if regex.is_match(s) {
                None
            } else {
                Some(FieldViolation::new(field, format!("{field} has an invalid format")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_create_accepts_valid_payload() {
        let payload = json!({
            "name": "Paracetamol 500mg",
            "category": "Pain Relief",
            "price": 25.0,
            "description": "Fast-acting pain and fever relief.",
            "stock": 50
        });
        assert_eq!(validate(&payload, PRODUCT_CREATE), Ok(()));
    }

    #[test]
    fn test_product_create_reports_every_violation() {
        let payload = json!({
            "name": "ab",
            "price": -1,
            "description": "short"
        });
        let violations = validate(&payload, PRODUCT_CREATE).expect_err("invalid payload");
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["name", "category", "price", "description"]);
    }

    #[test]
    fn test_optional_fields_are_skipped_when_absent() {
        let payload = json!({
            "name": "Ibuprofen 200mg",
            "category": "Pain Relief",
            "price": 18.5,
            "description": "Anti-inflammatory pain relief."
        });
        assert_eq!(validate(&payload, PRODUCT_CREATE), Ok(()));

        let payload = json!({ "stock": -3 });
        let violations = validate(&payload, PRODUCT_UPDATE).expect_err("negative stock");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.first().map(|v| v.field.as_str()), Some("stock"));
    }

    #[test]
    fn test_order_create_checks_payment_method_membership() {
        let payload = json!({
            "user": "5e0a7e3a-7d2b-4f6e-9f6a-3a1d2b4c5d6e",
            "items": [{ "product": "x", "quantity": 1 }],
            "totalAmount": 10.0,
            "shippingAddress": "12 High Street",
            "paymentMethod": "cash_on_delivery"
        });
        let violations = validate(&payload, ORDER_CREATE).expect_err("unknown method");
        assert!(violations.iter().any(|v| v.field == "paymentMethod"));
    }

    #[test]
    fn test_order_create_rejects_empty_items() {
        let payload = json!({
            "user": "u1",
            "items": [],
            "totalAmount": 0.0,
            "shippingAddress": "12 High Street",
            "paymentMethod": "upi"
        });
        let violations = validate(&payload, ORDER_CREATE).expect_err("empty items");
        assert!(violations.iter().any(|v| v.field == "items"));
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let violations = validate(&json!([1, 2, 3]), ORDER_CREATE).expect_err("array body");
        assert_eq!(violations.first().map(|v| v.field.as_str()), Some("body"));
    }

    #[test]
    fn test_pattern_rule_matches() {
        const PHONE: &[FieldRules] =
            &[FieldRules::optional("phone", &[Rule::Matches("^[0-9]{10}$")])];
        assert_eq!(validate(&json!({ "phone": "9876543210" }), PHONE), Ok(()));
        assert!(validate(&json!({ "phone": "123" }), PHONE).is_err());
        assert_eq!(validate(&json!({}), PHONE), Ok(()));
    }
}
