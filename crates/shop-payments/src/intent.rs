//! Payment Intents
//!
//! Wire types for `POST /payment/create` and the processor seam the
//! server calls to create an intent.
//!
//! The amount is trusted as supplied by the caller. Nothing here checks
//! it against a stored basket.

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::confirm::ClientSecret;
use crate::error::{PaymentError, Result};

/// Currency every intent is created in
pub const CURRENCY: &str = "usd";

/// Rejection message for missing, zero or negative totals
pub const TOTAL_NOT_POSITIVE: &str = "total must be greater than 0";

/// Rejection message for fractional totals
pub const TOTAL_NOT_WHOLE: &str = "total must be a whole number of minor units";

/// Rejection message for whole totals that do not fit in an `i64`
pub const TOTAL_TOO_LARGE: &str = "total is too large";

/// Largest integer an `f64` carries exactly (2^53)
const MAX_EXACT_F64: f64 = 9_007_199_254_740_992.0;

/// Body variant of the intent request
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    /// Amount in minor units
    #[serde(default)]
    pub total: Option<serde_json::Value>,
}

/// Successful intent response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentIntentResponse {
    #[serde(rename = "clientSecret")]
    pub client_secret: ClientSecret,
}

/// An intent created by the processor
#[derive(Clone, Debug)]
pub struct CreatedIntent {
    /// Processor intent id (`pi_...`)
    pub id: String,

    /// Secret the client confirms with
    pub client_secret: ClientSecret,

    /// Amount in minor units
    pub amount: i64,
}

/// Payment processor trait (server side)
///
/// Implement this for each processor; `StripeClient` is the production one.
#[async_trait]
pub trait IntentProcessor: Send + Sync {
    /// Create a payment intent for `amount` minor units in [`CURRENCY`]
    async fn create_intent(&self, amount: i64) -> Result<CreatedIntent>;

    /// Processor name
    fn name(&self) -> &str;
}

/// Parse and validate a raw total.
///
/// Anything that is not a positive whole number is rejected before a
/// processor is ever involved. Decimal and exponent forms are parsed
/// exactly, so the accepted amount is always the one that was sent.
pub fn parse_total(raw: &str) -> Result<i64> {
    let raw = raw.trim();

    if let Ok(total) = raw.parse::<i64>() {
        return positive(total);
    }

    let Some(value) = parse_decimal(raw) else {
        return Err(PaymentError::InvalidAmount(unparsable(raw).into()));
    };

    if value <= Decimal::ZERO {
        return Err(PaymentError::InvalidAmount(TOTAL_NOT_POSITIVE.into()));
    }
    if !value.fract().is_zero() {
        return Err(PaymentError::InvalidAmount(TOTAL_NOT_WHOLE.into()));
    }

    value
        .to_i64()
        .map_or_else(|| Err(PaymentError::InvalidAmount(TOTAL_TOO_LARGE.into())), positive)
}

/// Validate a total taken from a JSON body (number or numeric string)
///
/// Float-encoded numbers past 2^53 have already lost precision during
/// JSON decoding and are rejected.
pub fn parse_json_total(value: &serde_json::Value) -> Result<i64> {
    match value {
        serde_json::Value::Number(n) => {
            if n.as_f64().is_some_and(|v| n.is_f64() && v.abs() > MAX_EXACT_F64) {
                return Err(PaymentError::InvalidAmount(TOTAL_NOT_WHOLE.into()));
            }
            parse_total(&n.to_string())
        }
        serde_json::Value::String(s) => parse_total(s),
        _ => Err(PaymentError::InvalidAmount(TOTAL_NOT_POSITIVE.into())),
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str_exact(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Rejection for numbers `Decimal` cannot hold exactly
fn unparsable(raw: &str) -> &'static str {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 1.0 && !raw.contains('.') => TOTAL_TOO_LARGE,
        Ok(value) if value.is_finite() && value > 0.0 => TOTAL_NOT_WHOLE,
        _ => TOTAL_NOT_POSITIVE,
    }
}

fn positive(total: i64) -> Result<i64> {
    if total > 0 {
        Ok(total)
    } else {
        Err(PaymentError::InvalidAmount(TOTAL_NOT_POSITIVE.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_totals() {
        assert_eq!(parse_total("2550").unwrap(), 2550);
        assert_eq!(parse_total(" 1 ").unwrap(), 1);
        assert_eq!(parse_total("2550.0").unwrap(), 2550);
    }

    #[test]
    fn test_reject_non_positive_totals() {
        for raw in ["0", "-1", "-2550", "", "abc", "NaN", "-0.5", "inf"] {
            let err = parse_total(raw).unwrap_err();
            assert!(
                matches!(&err, PaymentError::InvalidAmount(msg) if msg == TOTAL_NOT_POSITIVE),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_reject_fractional_totals() {
        let err = parse_total("25.5").unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount(msg) if msg == TOTAL_NOT_WHOLE));
    }

    #[test]
    fn test_near_whole_fraction_is_not_truncated() {
        let err = parse_total("2550.0000000000001").unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount(msg) if msg == TOTAL_NOT_WHOLE));
    }

    #[test]
    fn test_large_whole_total_is_exact() {
        assert_eq!(parse_total("9007199254740993.0").unwrap(), 9_007_199_254_740_993);
        assert_eq!(parse_total("2.55e3").unwrap(), 2550);
    }

    #[test]
    fn test_total_beyond_i64_is_too_large() {
        for raw in ["18446744073709551615", "9223372036854775808.0"] {
            let err = parse_total(raw).unwrap_err();
            assert!(
                matches!(&err, PaymentError::InvalidAmount(msg) if msg == TOTAL_TOO_LARGE),
                "{raw:?} gave {err:?}"
            );
        }

        let err = parse_json_total(&serde_json::json!(u64::MAX)).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount(msg) if msg == TOTAL_TOO_LARGE));
    }

    #[test]
    fn test_imprecise_json_float_is_rejected() {
        let err = parse_json_total(&serde_json::json!(9_007_199_254_740_994.0)).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount(msg) if msg == TOTAL_NOT_WHOLE));
        assert_eq!(parse_json_total(&serde_json::json!(2550.0)).unwrap(), 2550);
    }

    #[test]
    fn test_parse_json_total() {
        assert_eq!(parse_json_total(&serde_json::json!(2550)).unwrap(), 2550);
        assert_eq!(parse_json_total(&serde_json::json!("2550")).unwrap(), 2550);
        assert!(parse_json_total(&serde_json::json!(null)).is_err());
        assert!(parse_json_total(&serde_json::json!([1])).is_err());
    }

    #[test]
    fn test_response_field_name() {
        let response = PaymentIntentResponse {
            client_secret: ClientSecret::new("pi_1_secret_abc"),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"clientSecret": "pi_1_secret_abc"}));
    }
}
