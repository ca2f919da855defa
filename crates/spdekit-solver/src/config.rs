//! Validation helpers shared by the integrator builders.

use spdekit_core::ConfigError;

pub(crate) fn required<T>(name: &'static str, value: Option<T>) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingParameter { name })
}

/// `N >= 1`, `kappa >= 1` and `kappa | N`.
pub(crate) fn require_steps(steps: usize, kappa: usize) -> Result<(), ConfigError> {
    if steps == 0 {
        return Err(ConfigError::InvalidResolution {
            name: "N",
            value: 0,
            reason: "must be at least 1",
        });
    }
    if kappa == 0 {
        return Err(ConfigError::InvalidResolution {
            name: "kappa",
            value: 0,
            reason: "must be at least 1",
        });
    }
    if steps % kappa != 0 {
        return Err(ConfigError::InvalidResolution {
            name: "N",
            value: steps,
            reason: "must be a multiple of kappa",
        });
    }
    Ok(())
}

pub(crate) fn require_even(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value < 2 || value % 2 != 0 {
        return Err(ConfigError::InvalidResolution {
            name,
            value,
            reason: "must be even and at least 2",
        });
    }
    Ok(())
}

pub(crate) fn require_at_least(
    name: &'static str,
    value: usize,
    min: usize,
    reason: &'static str,
) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::InvalidResolution {
            name,
            value,
            reason,
        });
    }
    Ok(())
}

pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        });
    }
    Ok(())
}

/// Every entry of an initial condition must be finite.
pub(crate) fn require_finite_state(name: &'static str, u0: &[f64]) -> Result<(), ConfigError> {
    match u0.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(ConfigError::InvalidParameter {
            name,
            value,
            reason: "initial condition must be finite",
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_must_divide() {
        assert!(require_steps(100, 4).is_ok());
        assert_eq!(
            require_steps(10, 3),
            Err(ConfigError::InvalidResolution {
                name: "N",
                value: 10,
                reason: "must be a multiple of kappa",
            })
        );
        assert!(require_steps(0, 1).is_err());
        assert!(require_steps(4, 0).is_err());
    }

    #[test]
    fn missing_is_reported_by_name() {
        assert_eq!(
            required::<f64>("T", None),
            Err(ConfigError::MissingParameter { name: "T" })
        );
    }

    #[test]
    fn non_finite_initial_condition() {
        assert!(require_finite_state("u0", &[0.0, 1.0]).is_ok());
        assert!(require_finite_state("u0", &[0.0, f64::NAN]).is_err());
    }
}
