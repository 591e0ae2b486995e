use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use seller_finance_core::amortization::{build_schedule, AmortizationRow};
use seller_finance_core::analysis::{analyze, recompute};
use seller_finance_core::export::schedule_csv;
use seller_finance_core::sensitivity::{run_sensitivity, SensitivityMetric, SensitivityVariable};
use seller_finance_core::share::{decode_share_link, encode_share_link, share_url};
use seller_finance_core::tax::all_cash::{taxes_all_cash, AllCashTaxInput};
use seller_finance_core::tax::installment::{build_installment_taxes, InstallmentTaxInput};
use seller_finance_core::time_value::npv_monthly;
use seller_finance_core::types::CashFlow;
use seller_finance_core::DealInputs;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Deal inputs from a flat JSON object, read leniently over the defaults.
fn parse_deal(input_json: &str) -> NapiResult<DealInputs> {
    let value: Value = serde_json::from_str(input_json).map_err(to_napi_error)?;
    if !value.is_object() {
        return Err(napi::Error::from_reason("deal input must be a JSON object"));
    }
    Ok(DealInputs::from_value_lenient(&value, &DealInputs::default()))
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ScheduleRequest {
    principal: Decimal,
    annual_rate_pct: Decimal,
    term_years: Decimal,
    #[serde(default)]
    balloon: Decimal,
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let req: ScheduleRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let schedule = build_schedule(req.principal, req.annual_rate_pct, req.term_years, req.balloon);
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

#[napi]
pub fn all_cash_taxes(input_json: String) -> NapiResult<String> {
    let input: AllCashTaxInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    serde_json::to_string(&taxes_all_cash(&input)).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct InstallmentRequest {
    schedule: Vec<AmortizationRow>,
    #[serde(flatten)]
    tax: InstallmentTaxInput,
}

#[napi]
pub fn installment_taxes(input_json: String) -> NapiResult<String> {
    let req: InstallmentRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    serde_json::to_string(&build_installment_taxes(&req.schedule, &req.tax))
        .map_err(to_napi_error)
}

#[derive(Deserialize)]
struct NpvRequest {
    discount_rate: Decimal,
    cash_flows: Vec<CashFlow>,
}

#[napi]
pub fn monthly_npv(input_json: String) -> NapiResult<String> {
    let req: NpvRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let npv = npv_monthly(&req.cash_flows, req.discount_rate);
    serde_json::to_string(&npv).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Deal
// ---------------------------------------------------------------------------

/// Bare derived figures, for recomputing on every form edit.
#[napi]
pub fn recompute_deal(input_json: String) -> NapiResult<String> {
    let inputs = parse_deal(&input_json)?;
    serde_json::to_string(&recompute(&inputs)).map_err(to_napi_error)
}

#[napi]
pub fn analyze_deal(input_json: String) -> NapiResult<String> {
    let inputs = parse_deal(&input_json)?;
    let output = analyze(&inputs).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn export_schedule_csv(input_json: String) -> NapiResult<String> {
    let inputs = parse_deal(&input_json)?;
    schedule_csv(&recompute(&inputs)).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct SensitivityRequest {
    #[serde(default)]
    base: Value,
    var1: SensitivityVariable,
    var2: Option<SensitivityVariable>,
    metric: SensitivityMetric,
}

#[napi]
pub fn deal_sensitivity(input_json: String) -> NapiResult<String> {
    let req: SensitivityRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let base = match req.base {
        Value::Null => DealInputs::default(),
        ref value => DealInputs::from_value_lenient(value, &DealInputs::default()),
    };
    let output = run_sensitivity(&base, &req.var1, req.var2.as_ref(), req.metric)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Share links
// ---------------------------------------------------------------------------

#[napi]
pub fn encode_share_token(input_json: String) -> NapiResult<String> {
    let inputs = parse_deal(&input_json)?;
    encode_share_link(&inputs).map_err(to_napi_error)
}

#[napi]
pub fn decode_share_token(token: String) -> NapiResult<String> {
    let inputs = decode_share_link(&token).map_err(to_napi_error)?;
    serde_json::to_string(&inputs).map_err(to_napi_error)
}

#[napi]
pub fn build_share_url(base_url: String, input_json: String) -> NapiResult<String> {
    let inputs = parse_deal(&input_json)?;
    share_url(&base_url, &inputs).map_err(to_napi_error)
}
