use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analysis::{recompute, DerivedResult};
use crate::error::CalcError;
use crate::inputs::{DealInputs, FIELD_NAMES};
use crate::CalcResult;

/// Most grid points a single axis may produce.
const MAX_STEPS: usize = 1_000;

/// One axis of a sensitivity grid over a `DealInputs` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityVariable {
    pub name: String,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Headline figure reported for each grid point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityMetric {
    NpvAdvantage,
    NpvFinancing,
    NpvAllCash,
    MonthlyPayment,
    InstallmentTaxAdvantage,
}

impl SensitivityMetric {
    pub fn label(self) -> &'static str {
        match self {
            Self::NpvAdvantage => "npv_advantage",
            Self::NpvFinancing => "npv_financing",
            Self::NpvAllCash => "npv_all_cash",
            Self::MonthlyPayment => "monthly_payment",
            Self::InstallmentTaxAdvantage => "installment_tax_advantage",
        }
    }

    fn pick(self, result: &DerivedResult) -> Decimal {
        match self {
            Self::NpvAdvantage => result.npv_advantage,
            Self::NpvFinancing => result.financing.npv,
            Self::NpvAllCash => result.all_cash.npv,
            Self::MonthlyPayment => result.financing.monthly_payment,
            Self::InstallmentTaxAdvantage => result.installment_tax_advantage,
        }
    }
}

impl std::str::FromStr for SensitivityMetric {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "npv_advantage" | "advantage" => Ok(Self::NpvAdvantage),
            "npv_financing" => Ok(Self::NpvFinancing),
            "npv_all_cash" => Ok(Self::NpvAllCash),
            "monthly_payment" | "payment" => Ok(Self::MonthlyPayment),
            "installment_tax_advantage" | "tax_advantage" => Ok(Self::InstallmentTaxAdvantage),
            other => Err(CalcError::InvalidInput {
                field: "metric".into(),
                reason: format!("Unknown metric '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub var1_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var2_value: Option<Decimal>,
    pub output_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub metric: String,
    pub var1_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var2_name: Option<String>,
    pub results: Vec<SensitivityRow>,
}

/// Parse `name:min:max:step`, e.g. `interest_rate:4:9:0.5`.
pub fn parse_variable(axis: &str) -> CalcResult<SensitivityVariable> {
    let parts: Vec<&str> = axis.split(':').collect();
    if parts.len() != 4 {
        return Err(CalcError::InvalidInput {
            field: "variable".into(),
            reason: format!("Sensitivity variable must be name:min:max:step, got '{axis}'"),
        });
    }

    let number = |s: &str| {
        s.trim().parse::<Decimal>().map_err(|e| CalcError::InvalidInput {
            field: parts[0].into(),
            reason: format!("'{s}' is not a number: {e}"),
        })
    };

    Ok(SensitivityVariable {
        name: parts[0].trim().to_string(),
        min: number(parts[1])?,
        max: number(parts[2])?,
        step: number(parts[3])?,
    })
}

/// Recompute the deal across one or two axes, holding everything else at
/// `base`. Rows are ordered with `var2` varying fastest.
pub fn run_sensitivity(
    base: &DealInputs,
    var1: &SensitivityVariable,
    var2: Option<&SensitivityVariable>,
    metric: SensitivityMetric,
) -> CalcResult<SensitivityOutput> {
    let range1 = generate_range(var1)?;
    let range2 = var2.map(generate_range).transpose()?;

    let base_json = serde_json::to_value(base)?;
    let run = |v1: Decimal, v2: Option<Decimal>| {
        let mut json = base_json.clone();
        set_json_field(&mut json, &var1.name, v1);
        if let (Some(v2_var), Some(v2_val)) = (var2, v2) {
            set_json_field(&mut json, &v2_var.name, v2_val);
        }
        let inputs = DealInputs::from_value_lenient(&json, base);
        SensitivityRow {
            var1_value: v1,
            var2_value: v2,
            output_value: metric.pick(&recompute(&inputs)),
        }
    };

    let mut results = Vec::new();
    for &v1 in &range1 {
        match &range2 {
            Some(values) => results.extend(values.iter().map(|&v2| run(v1, Some(v2)))),
            None => results.push(run(v1, None)),
        }
    }

    Ok(SensitivityOutput {
        metric: metric.label().to_string(),
        var1_name: var1.name.clone(),
        var2_name: var2.map(|v| v.name.clone()),
        results,
    })
}

fn generate_range(var: &SensitivityVariable) -> CalcResult<Vec<Decimal>> {
    if !FIELD_NAMES.contains(&var.name.as_str()) {
        return Err(CalcError::InvalidInput {
            field: var.name.clone(),
            reason: format!("Unknown deal field. Available: {}", FIELD_NAMES.join(", ")),
        });
    }
    if var.step <= Decimal::ZERO {
        return Err(CalcError::InvalidInput {
            field: var.name.clone(),
            reason: "Step must be positive".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = Some(var.min);
    while let Some(value) = current.filter(|v| *v <= var.max) {
        if values.len() == MAX_STEPS {
            return Err(CalcError::InvalidInput {
                field: var.name.clone(),
                reason: format!("Range produces more than {MAX_STEPS} points"),
            });
        }
        values.push(value);
        // past Decimal::MAX the range simply ends
        current = value.checked_add(var.step);
    }
    if values.is_empty() {
        values.push(var.min);
    }
    Ok(values)
}

fn set_json_field(obj: &mut serde_json::Value, field: &str, value: Decimal) {
    if let Some(map) = obj.as_object_mut() {
        map.insert(field.to_string(), serde_json::Value::String(value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_variable() {
        let v = parse_variable("interest_rate:4:9:0.5").unwrap();
        assert_eq!(v.name, "interest_rate");
        assert_eq!(v.min, dec!(4));
        assert_eq!(v.step, dec!(0.5));
        assert!(parse_variable("interest_rate:4:9").is_err());
        assert!(parse_variable("interest_rate:a:9:1").is_err());
    }

    #[test]
    fn test_one_axis_payment_rises_with_rate() {
        let var = parse_variable("interest_rate:4:8:1").unwrap();
        let out = run_sensitivity(
            &DealInputs::default(),
            &var,
            None,
            SensitivityMetric::MonthlyPayment,
        )
        .unwrap();
        assert_eq!(out.results.len(), 5);
        for pair in out.results.windows(2) {
            assert!(pair[1].output_value > pair[0].output_value);
        }
    }

    #[test]
    fn test_two_axis_grid() {
        let v1 = parse_variable("interest_rate:5:7:1").unwrap();
        let v2 = parse_variable("discount_rate:3:6:1.5").unwrap();
        let out = run_sensitivity(
            &DealInputs::default(),
            &v1,
            Some(&v2),
            SensitivityMetric::NpvAdvantage,
        )
        .unwrap();
        assert_eq!(out.results.len(), 9);
        assert_eq!(out.results[1].var2_value, Some(dec!(4.5)));
    }

    #[test]
    fn test_unknown_field_and_bad_step() {
        let base = DealInputs::default();
        let bad = parse_variable("color:1:2:1").unwrap();
        assert!(run_sensitivity(&base, &bad, None, SensitivityMetric::NpvAdvantage).is_err());
        let flat = parse_variable("price:1:2:0").unwrap();
        assert!(run_sensitivity(&base, &flat, None, SensitivityMetric::NpvAdvantage).is_err());
    }

    #[test]
    fn test_range_ends_at_decimal_limit() {
        let var = SensitivityVariable {
            name: "price".into(),
            min: Decimal::ZERO,
            max: Decimal::MAX,
            step: Decimal::MAX,
        };
        assert_eq!(generate_range(&var).unwrap(), vec![Decimal::ZERO, Decimal::MAX]);

        let out = run_sensitivity(
            &DealInputs::default(),
            &var,
            None,
            SensitivityMetric::NpvAdvantage,
        )
        .unwrap();
        assert_eq!(out.results.len(), 2);
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!(
            "advantage".parse::<SensitivityMetric>().unwrap(),
            SensitivityMetric::NpvAdvantage
        );
        assert!("irr".parse::<SensitivityMetric>().is_err());
    }
}
