//! Paint Estimator
//!
//! Pure arithmetic that turns the five validated answers into paint
//! quantities. No state, no I/O: the same input always yields the same
//! result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Estimator contract violation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// An input or parameter is outside the accepted range
    #[error("invalid estimator input: {0}")]
    InvalidInput(String),
}

/// Which surfaces of the buildings get painted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Interior walls only
    Interior,
    /// Facade only
    Exterior,
    /// Interior and facade
    Both,
}

impl Scope {
    /// Paintable wall area per m² of declared building area
    #[must_use]
    pub fn factor(&self) -> f64 {
        match self {
            Self::Interior => 3.5,
            Self::Exterior => 1.2,
            Self::Both => 4.7,
        }
    }

    /// Lower-case name, as typed by the user
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interior => "interior",
            Self::Exterior => "exterior",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interior" => Ok(Self::Interior),
            "exterior" => Ok(Self::Exterior),
            "both" => Ok(Self::Both),
            other => Err(EstimateError::InvalidInput(format!("unknown scope: {other}"))),
        }
    }
}

/// Fixed constants of the estimate
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimateParams {
    /// Litres per can
    pub can_volume: f64,
    /// Fractional overhead for waste and spillage
    pub loss_rate: f64,
    /// m² covered by one litre
    pub coverage: f64,
    /// Fraction of wall area taken by doors and windows
    pub openings_rate: f64,
}

impl Default for EstimateParams {
    fn default() -> Self {
        Self {
            can_volume: 20.0,
            loss_rate: 0.05,
            coverage: 10.0,
            openings_rate: 0.12,
        }
    }
}

impl EstimateParams {
    /// Check that the parameters describe a meaningful estimate
    pub fn validate(&self) -> Result<(), EstimateError> {
        if !(self.can_volume.is_finite() && self.can_volume > 0.0) {
            return Err(EstimateError::InvalidInput(format!(
                "can volume must be positive, got {}",
                self.can_volume
            )));
        }
        if !(self.coverage.is_finite() && self.coverage > 0.0) {
            return Err(EstimateError::InvalidInput(format!(
                "coverage must be positive, got {}",
                self.coverage
            )));
        }
        if !(self.loss_rate.is_finite() && self.loss_rate >= 0.0) {
            return Err(EstimateError::InvalidInput(format!(
                "loss rate must be non-negative, got {}",
                self.loss_rate
            )));
        }
        if !(0.0..1.0).contains(&self.openings_rate) {
            return Err(EstimateError::InvalidInput(format!(
                "openings rate must be in [0, 1), got {}",
                self.openings_rate
            )));
        }
        Ok(())
    }
}

/// Validated answers fed to the estimator
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimateInput {
    /// Painting scope
    pub scope: Scope,
    /// Number of buildings
    pub buildings: u32,
    /// Average wall area per building (m²)
    pub avg_area: f64,
    /// Average floors per building
    pub floors: u32,
    /// Coats of paint, at most 3
    pub coats: f64,
}

/// Maximum number of coats the estimator accepts
pub const MAX_COATS: f64 = 3.0;

/// Derived paint quantities
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    /// Gross paintable area (m²)
    pub area_paint: f64,
    /// Area after excluding openings (m²)
    pub net_area: f64,
    /// Litres for all coats
    pub liters_needed: f64,
    /// Litres including waste
    pub liters_with_loss: f64,
    /// Cans to buy
    pub cans: u64,
}

/// Compute the estimate
///
/// # Errors
///
/// Returns [`EstimateError::InvalidInput`] when called outside the contract:
/// zero buildings or floors, a non-positive area, coats outside `(0, 3]`,
/// invalid parameters, or answers so large that the litres overflow or the
/// can count is no longer exact.
pub fn compute(
    input: &EstimateInput,
    params: &EstimateParams,
) -> Result<EstimateResult, EstimateError> {
    params.validate()?;

    if input.buildings == 0 {
        return Err(EstimateError::InvalidInput(
            "buildings must be at least 1".to_string(),
        ));
    }
    if input.floors == 0 {
        return Err(EstimateError::InvalidInput(
            "floors must be at least 1".to_string(),
        ));
    }
    if !(input.avg_area.is_finite() && input.avg_area > 0.0) {
        return Err(EstimateError::InvalidInput(format!(
            "average area must be positive, got {}",
            input.avg_area
        )));
    }
    if !(input.coats > 0.0 && input.coats <= MAX_COATS) {
        return Err(EstimateError::InvalidInput(format!(
            "coats must be in (0, {MAX_COATS}], got {}",
            input.coats
        )));
    }

    let area_paint = input.scope.factor()
        * input.avg_area
        * f64::from(input.floors)
        * f64::from(input.buildings);
    let net_area = area_paint * (1.0 - params.openings_rate);
    let liters_needed = net_area * input.coats / params.coverage;
    let liters_with_loss = liters_needed * (1.0 + params.loss_rate);
    if !liters_with_loss.is_finite() {
        return Err(EstimateError::InvalidInput(
            "the answers are too large to estimate".to_string(),
        ));
    }
    let cans = cans_for(liters_with_loss, params.can_volume)?;

    Ok(EstimateResult {
        area_paint,
        net_area,
        liters_needed,
        liters_with_loss,
        cans,
    })
}

/// Largest can count that is exact as an `f64` (2^53)
const MAX_CANS: f64 = 9_007_199_254_740_992.0;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cans_for(liters: f64, can_volume: f64) -> Result<u64, EstimateError> {
    let cans = (liters / can_volume).ceil();
    if cans > MAX_CANS {
        return Err(EstimateError::InvalidInput(format!(
            "{cans} cans is more than can be counted"
        )));
    }
    Ok(cans as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn input(scope: Scope, buildings: u32, avg_area: f64, floors: u32, coats: f64) -> EstimateInput {
        EstimateInput {
            scope,
            buildings,
            avg_area,
            floors,
            coats,
        }
    }

    #[test]
    fn test_both_scope_scenario() {
        let result = compute(
            &input(Scope::Both, 2, 500.0, 3, 2.0),
            &EstimateParams::default(),
        )
        .unwrap();

        assert!((result.area_paint - 14100.0).abs() < EPS);
        assert!((result.net_area - 12408.0).abs() < EPS);
        assert!((result.liters_needed - 2481.6).abs() < EPS);
        assert!((result.liters_with_loss - 2605.68).abs() < EPS);
        assert_eq!(result.cans, 131);
    }

    #[test]
    fn test_scope_factors() {
        let params = EstimateParams::default();
        for (scope, factor) in [
            (Scope::Interior, 3.5),
            (Scope::Exterior, 1.2),
            (Scope::Both, 4.7),
        ] {
            let result = compute(&input(scope, 1, 100.0, 1, 1.0), &params).unwrap();
            assert!((result.area_paint - factor * 100.0).abs() < EPS);
        }
    }

    #[test]
    fn test_compute_is_deterministic() {
        let params = EstimateParams::default();
        let req = input(Scope::Interior, 7, 123.45, 4, 2.5);
        let first = compute(&req, &params).unwrap();
        for _ in 0..10 {
            assert_eq!(compute(&req, &params).unwrap(), first);
        }
    }

    #[test]
    fn test_cans_bound_liters_with_loss() {
        let params = EstimateParams::default();
        for scope in [Scope::Interior, Scope::Exterior, Scope::Both] {
            for buildings in [1, 3, 17] {
                for area in [0.5, 10.0, 333.3, 2500.0] {
                    for floors in [1, 2, 9] {
                        for coats in [1.0, 2.0, 3.0] {
                            let r = compute(&input(scope, buildings, area, floors, coats), &params)
                                .unwrap();
                            let cans = r.cans as f64;
                            assert!(cans * params.can_volume >= r.liters_with_loss);
                            assert!(r.liters_with_loss > (cans - 1.0) * params.can_volume);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_huge_area_rejected_instead_of_saturating() {
        let params = EstimateParams::default();
        let err = compute(&input(Scope::Both, 1, 1e30, 1, 1.0), &params).unwrap_err();
        assert!(matches!(err, EstimateError::InvalidInput(_)));
    }

    #[test]
    fn test_overflowing_area_rejected() {
        let params = EstimateParams::default();
        let req = input(Scope::Both, 4_000_000_000, 1e300, 4_000_000_000, 3.0);
        assert!(matches!(
            compute(&req, &params),
            Err(EstimateError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_cans_bound_holds_for_large_cities() {
        let params = EstimateParams::default();
        let r = compute(&input(Scope::Both, 1, 123_456_789.0, 1, 1.0), &params).unwrap();
        assert_eq!(r.cans, 2_680_741);
        let cans = r.cans as f64;
        assert!(cans * params.can_volume >= r.liters_with_loss);
        assert!(r.liters_with_loss > (cans - 1.0) * params.can_volume);
    }

    #[test]
    fn test_exact_multiple_does_not_round_up() {
        let params = EstimateParams {
            can_volume: 20.0,
            loss_rate: 0.0,
            coverage: 10.0,
            openings_rate: 0.0,
        };
        let r = compute(&input(Scope::Interior, 1, 400.0, 1, 2.0), &params).unwrap();
        // 3.5 * 400 * 2 / 10 = 280 litres = 14 cans exactly
        assert!((r.liters_with_loss - 280.0).abs() < EPS);
        assert_eq!(r.cans, 14);
    }

    #[test]
    fn test_rejects_out_of_contract_input() {
        let params = EstimateParams::default();
        assert!(compute(&input(Scope::Both, 0, 100.0, 1, 1.0), &params).is_err());
        assert!(compute(&input(Scope::Both, 1, 0.0, 1, 1.0), &params).is_err());
        assert!(compute(&input(Scope::Both, 1, f64::NAN, 1, 1.0), &params).is_err());
        assert!(compute(&input(Scope::Both, 1, 100.0, 0, 1.0), &params).is_err());
        assert!(compute(&input(Scope::Both, 1, 100.0, 1, 4.0), &params).is_err());
        assert!(compute(&input(Scope::Both, 1, 100.0, 1, 0.0), &params).is_err());
    }

    #[test]
    fn test_rejects_bad_params() {
        let req = input(Scope::Both, 1, 100.0, 1, 1.0);
        let bad = [
            EstimateParams {
                can_volume: 0.0,
                ..Default::default()
            },
            EstimateParams {
                coverage: -1.0,
                ..Default::default()
            },
            EstimateParams {
                loss_rate: -0.1,
                ..Default::default()
            },
            EstimateParams {
                openings_rate: 1.0,
                ..Default::default()
            },
        ];
        for params in bad {
            assert!(matches!(
                compute(&req, &params),
                Err(EstimateError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("both".parse::<Scope>().unwrap(), Scope::Both);
        assert_eq!("interior".parse::<Scope>().unwrap(), Scope::Interior);
        assert!("Both".parse::<Scope>().is_err());
    }
}
