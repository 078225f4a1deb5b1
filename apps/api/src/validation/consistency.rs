//! Cross-field arithmetic checks for invoices. These only add issues; field
//! scores are never touched.

use crate::parsing::parse_amount;
use crate::validation::models::{ExtractionOutput, RawValue, ValidationIssue};

pub const AMOUNT_TOLERANCE: f64 = 0.02;

fn amount(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Number(n) => Some(*n),
        RawValue::Text(s) => parse_amount(s),
        _ => None,
    }
}

fn field_amount(output: &ExtractionOutput, name: &str) -> Option<f64> {
    output.fields.get(name).and_then(amount)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= AMOUNT_TOLERANCE
}

/// All invoice consistency checks, in a fixed order.
pub fn check_invoice(output: &ExtractionOutput) -> Vec<ValidationIssue> {
    let mut issues = check_line_items(output);
    issues.extend(check_totals(output));
    issues
}

/// `subtotal + tax - discount + shipping` should equal `total_amount`.
pub fn check_totals(output: &ExtractionOutput) -> Option<ValidationIssue> {
    let subtotal = field_amount(output, "subtotal")?;
    let total = field_amount(output, "total_amount")?;
    let tax = field_amount(output, "tax_amount").unwrap_or(0.0);
    let discount = field_amount(output, "discount_amount").unwrap_or(0.0);
    let shipping = field_amount(output, "shipping_amount").unwrap_or(0.0);

    let expected = subtotal + tax - discount + shipping;
    if close(expected, total) {
        return None;
    }
    Some(
        ValidationIssue::info(
            "total_amount",
            format!("Total {total:.2} does not match computed {expected:.2}"),
        )
        .with_suggestion("Verify subtotal, tax, discount and shipping amounts"),
    )
}

/// Per-item `quantity * unit_price` and the item sum against `subtotal`.
pub fn check_line_items(output: &ExtractionOutput) -> Vec<ValidationIssue> {
    let Some(RawValue::List(items)) = output.fields.get("line_items") else {
        return Vec::new();
    };
    let mut issues = Vec::new();
    let mut sum = 0.0;
    let mut all_priced = true;

    for (i, item) in items.iter().enumerate() {
        let RawValue::Record(record) = item else {
            issues.push(ValidationIssue::warning(
                "line_items",
                format!("Line item {} is a {}, not a record", i + 1, item.kind()),
            ));
            all_priced = false;
            continue;
        };
        let line_amount = record.get("amount").and_then(amount);
        let quantity = record.get("quantity").and_then(amount);
        let unit_price = record.get("unit_price").and_then(amount);

        match line_amount {
            Some(a) => sum += a,
            None => {
                all_priced = false;
                issues.push(ValidationIssue::warning(
                    "line_items",
                    format!("Line item {} has no amount", i + 1),
                ));
            }
        }
        if let (Some(a), Some(q), Some(p)) = (line_amount, quantity, unit_price) {
            if !close(q * p, a) {
                issues.push(
                    ValidationIssue::warning(
                        "line_items",
                        format!("Line item {}: {q} x {p:.2} != {a:.2}", i + 1),
                    )
                    .with_suggestion("Check quantity and unit price"),
                );
            }
        }
    }

    if all_priced && !items.is_empty() {
        if let Some(subtotal) = field_amount(output, "subtotal") {
            if !close(sum, subtotal) {
                issues.push(ValidationIssue::warning(
                    "subtotal",
                    format!("Line items sum to {sum:.2} but subtotal is {subtotal:.2}"),
                ));
            }
        }
    }
    issues
}
