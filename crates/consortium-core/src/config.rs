use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::category::FeeSchedule;
use crate::error::ConsortiumError;
use crate::types::{Percent, Rate};
use crate::ConsortiumResult;

/// What to do when the embedded bid exceeds the bid required for contemplation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidPayablePolicy {
    /// Report `bid_required - bid_embedded` as is, negative included, with a warning.
    #[default]
    Surface,
    /// Floor the payable bid at zero, with a warning recording the clamp.
    ClampAtZero,
}

/// Business rules applied on top of the fee tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationPolicy {
    /// Share of the total with charges that a bid must reach to be contemplated.
    pub bid_fraction: Rate,
    pub bid_payable: BidPayablePolicy,
    /// Embedded bid percent used when the caller asks for an embedded bid
    /// without giving a percent.
    pub default_embedded_bid_percent: Percent,
    /// Group term. Plans solved beyond it are reported with a warning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_installment_count: Option<u32>,
}

impl Default for SimulationPolicy {
    fn default() -> Self {
        Self {
            bid_fraction: dec!(0.53),
            bid_payable: BidPayablePolicy::Surface,
            default_embedded_bid_percent: dec!(15),
            max_installment_count: Some(100),
        }
    }
}

impl SimulationPolicy {
    pub fn validate(&self) -> ConsortiumResult<()> {
        if self.bid_fraction < Decimal::ZERO || self.bid_fraction > Decimal::ONE {
            return Err(ConsortiumError::InvalidInput {
                field: "policy.bid_fraction".into(),
                reason: format!("Bid fraction must be in [0, 1], got {}", self.bid_fraction),
            });
        }
        if self.default_embedded_bid_percent < Decimal::ZERO
            || self.default_embedded_bid_percent >= dec!(100)
        {
            return Err(ConsortiumError::InvalidInput {
                field: "policy.default_embedded_bid_percent".into(),
                reason: "Default embedded bid percent must be in [0, 100)".into(),
            });
        }
        if self.max_installment_count == Some(0) {
            return Err(ConsortiumError::InvalidInput {
                field: "policy.max_installment_count".into(),
                reason: "Group term must be at least one installment".into(),
            });
        }
        Ok(())
    }
}

/// Everything a simulation needs besides the client's own figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub fees: FeeSchedule,
    pub policy: SimulationPolicy,
}

impl SimulationConfig {
    pub fn validate(&self) -> ConsortiumResult<()> {
        self.fees.validate()?;
        self.policy.validate()
    }
}

/// Operator-supplied configuration, as read from a file or an API request.
///
/// `fees` overlays the built-in tables category by category; `policy`
/// replaces the default policy, its missing fields taking default values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<FeeSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<SimulationPolicy>,
}

impl ConfigOverrides {
    /// Built-in configuration with these overrides applied, validated.
    pub fn apply(self) -> ConsortiumResult<SimulationConfig> {
        let mut config = SimulationConfig::default();
        if let Some(fees) = self.fees {
            config.fees.merge(fees);
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    #[test]
    fn test_default_policy() {
        let policy = SimulationPolicy::default();
        assert_eq!(policy.bid_fraction, dec!(0.53));
        assert_eq!(policy.bid_payable, BidPayablePolicy::Surface);
        assert_eq!(policy.default_embedded_bid_percent, dec!(15));
        assert_eq!(policy.max_installment_count, Some(100));
        policy.validate().unwrap();
    }

    #[test]
    fn test_bid_fraction_out_of_range() {
        let policy = SimulationPolicy {
            bid_fraction: dec!(1.2),
            ..SimulationPolicy::default()
        };
        let err = policy.validate().unwrap_err();
        match err {
            ConsortiumError::InvalidInput { field, .. } => {
                assert_eq!(field, "policy.bid_fraction")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: SimulationConfig = serde_json::from_str(
            r#"{ "policy": { "bid_fraction": "0.45", "bid_payable": "clamp_at_zero" } }"#,
        )
        .unwrap();
        assert_eq!(config.policy.bid_fraction, dec!(0.45));
        assert_eq!(config.policy.bid_payable, BidPayablePolicy::ClampAtZero);
        assert_eq!(config.policy.default_embedded_bid_percent, dec!(15));
        assert_eq!(config.fees.len(), Category::ALL.len());
    }

    #[test]
    fn test_overrides_keep_untouched_categories() {
        let overrides: ConfigOverrides = serde_json::from_str(
            r#"{ "fees": { "boat": {
                "reserve_fund_rate": "0.01",
                "admin_tax_rate": "0.18",
                "life_insurance_rate": "0.0012",
                "damage_insurance_rate": "0.001"
            } } }"#,
        )
        .unwrap();
        let config = overrides.apply().unwrap();
        assert_eq!(config.fees.len(), Category::ALL.len());
        assert_eq!(
            config.fees.table_for(Category::Boat).unwrap().admin_tax_rate,
            dec!(0.18)
        );
        assert_eq!(config.policy, SimulationPolicy::default());
    }

    #[test]
    fn test_overrides_are_validated() {
        let overrides = ConfigOverrides {
            fees: None,
            policy: Some(SimulationPolicy {
                bid_fraction: dec!(-0.1),
                ..SimulationPolicy::default()
            }),
        };
        assert!(overrides.apply().is_err());
    }

    #[test]
    fn test_zero_group_term_rejected() {
        let config = SimulationConfig {
            policy: SimulationPolicy {
                max_installment_count: Some(0),
                ..SimulationPolicy::default()
            },
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
