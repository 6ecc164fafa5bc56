//! Validator/filter
//!
//! Applies the business rules to a candidate and either produces a
//! `ValidatedTransaction` or a `Rejection` naming the first rule that failed.
//!
//! # Rule Order
//!
//! Rules run in this order and the first failing rule decides the rejection
//! reason, so a record that breaks two rules is always reported the same way:
//!
//! 1. required fields present and non-empty
//! 2. quantity is an integer, at least `min_quantity`
//! 3. unit price is an exact decimal, at least `min_price`
//! 4. region (case-insensitive) is in `valid_regions`
//! 5. product id is well formed
//!
//! Numbers are plain digits with an optional sign (and a fractional part for
//! prices). `,` is only accepted as a thousands separator grouping the
//! integer part in threes. Prices with more fractional digits than `Decimal`
//! holds exactly are non-numeric rather than rounded.
//!
//! Validation is stateless per record. A `Validator` can be shared by
//! reference across threads.

use crate::config::PipelineConfig;
use crate::types::{Rejection, RejectionReason, TransactionCandidate, ValidatedTransaction};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::str::FromStr;
use tracing::debug;

/// Values the rules parsed on the way to accepting a candidate
struct Checked {
    quantity: i64,
    unit_price: Decimal,
    region: String,
}

/// A number split into its normalized text and fractional digit count
struct NumberText<'a> {
    text: Cow<'a, str>,
    fraction_digits: usize,
}

/// Stateless business-rule checker built from a `PipelineConfig`
#[derive(Debug, Clone)]
pub struct Validator {
    config: PipelineConfig,
}

impl Validator {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validate one candidate
    ///
    /// # Returns
    ///
    /// * `Ok(ValidatedTransaction)` - every rule passed
    /// * `Err(Rejection)` - the candidate and the reason of the first failing rule
    pub fn validate(
        &self,
        candidate: TransactionCandidate,
    ) -> Result<ValidatedTransaction, Rejection> {
        match self.check(&candidate) {
            Ok(checked) => Ok(ValidatedTransaction {
                line_no: candidate.line_no,
                transaction_id: candidate.transaction_id,
                product_id: candidate.product_id,
                quantity: checked.quantity,
                unit_price: checked.unit_price,
                region: checked.region,
                timestamp: candidate.timestamp,
            }),
            Err(reason) => {
                debug!(line = candidate.line_no, reason = %reason, "record rejected");
                Err(Rejection { candidate, reason })
            }
        }
    }

    fn check(&self, c: &TransactionCandidate) -> Result<Checked, RejectionReason> {
        self.check_required_fields(c)?;
        let quantity = self.check_quantity(c)?;
        let unit_price = self.check_price(c)?;
        let region = self.check_region(c)?;
        self.check_product_id(c)?;
        Ok(Checked {
            quantity,
            unit_price,
            region,
        })
    }

    fn check_required_fields(&self, c: &TransactionCandidate) -> Result<(), RejectionReason> {
        let fields = [
            &c.transaction_id,
            &c.product_id,
            &c.quantity,
            &c.unit_price,
            &c.region,
            &c.timestamp,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(RejectionReason::MissingField);
        }
        Ok(())
    }

    fn check_quantity(&self, c: &TransactionCandidate) -> Result<i64, RejectionReason> {
        let quantity = self
            .parse_quantity(&c.quantity)
            .ok_or(RejectionReason::NonNumericQuantity)?;
        if quantity < self.config.min_quantity {
            return Err(RejectionReason::QuantityBelowMinimum);
        }
        Ok(quantity)
    }

    fn check_price(&self, c: &TransactionCandidate) -> Result<Decimal, RejectionReason> {
        let price = self
            .parse_price(&c.unit_price)
            .ok_or(RejectionReason::NonNumericPrice)?;
        if price < self.config.min_price {
            return Err(RejectionReason::PriceBelowMinimum);
        }
        Ok(price)
    }

    fn check_region(&self, c: &TransactionCandidate) -> Result<String, RejectionReason> {
        self.config
            .canonical_region(&c.region)
            .map(str::to_string)
            .ok_or(RejectionReason::InvalidRegion)
    }

    fn check_product_id(&self, c: &TransactionCandidate) -> Result<(), RejectionReason> {
        let id = c.product_id.as_str();
        let well_formed = !id.is_empty()
            && !id.contains(self.config.delimiter)
            && !id.chars().any(|ch| ch.is_whitespace() || ch.is_control())
            && self
                .config
                .product_id_prefix
                .as_deref()
                .map_or(true, |prefix| id.starts_with(prefix) && id.len() > prefix.len());
        if well_formed {
            Ok(())
        } else {
            Err(RejectionReason::InvalidProductId)
        }
    }

    fn separators_allowed(&self) -> bool {
        self.config.strip_thousands_separators && self.config.delimiter != ','
    }

    /// Check the shape of a number and drop its thousands separators
    fn normalize_number<'a>(&self, raw: &'a str, allow_fraction: bool) -> Option<NumberText<'a>> {
        let raw = raw.trim();
        let unsigned = raw.strip_prefix(&['-', '+'][..]).unwrap_or(raw);
        let (integer, fraction) = match unsigned.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (unsigned, None),
        };

        let fraction_digits = match fraction {
            None => 0,
            Some(f) if allow_fraction && is_digits(f) => f.len(),
            Some(_) => return None,
        };

        let text = if is_digits(integer) {
            Cow::Borrowed(raw)
        } else if self.separators_allowed() && is_grouped_in_threes(integer) {
            Cow::Owned(raw.replace(',', ""))
        } else {
            return None;
        };

        Some(NumberText {
            text,
            fraction_digits,
        })
    }

    fn parse_quantity(&self, raw: &str) -> Option<i64> {
        self.normalize_number(raw, false)?.text.parse::<i64>().ok()
    }

    fn parse_price(&self, raw: &str) -> Option<Decimal> {
        let number = self.normalize_number(raw, true)?;
        // from_str rounds digits it cannot hold; a changed scale means the value is not exact
        Decimal::from_str(&number.text)
            .ok()
            .filter(|price| price.scale() as usize == number.fraction_digits)
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `1,234` or `12,345,678`: a leading group of one to three digits, then groups of three
fn is_grouped_in_threes(s: &str) -> bool {
    let mut groups = s.split(',');
    let leading = groups
        .next()
        .is_some_and(|g| g.len() <= 3 && is_digits(g));
    let mut trailing = 0;
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return false;
        }
        trailing += 1;
    }
    leading && trailing > 0
}
