use crate::error::{Result, SearchError};

/// Cost-model settings shared by every search of a tracing session.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TracingParameters {
    /// Fraction of the field's `[min, max]` range below which a cell is
    /// impassable. Must be in `[0, 1]`.
    pub threshold: f64,
    /// Extra cost for dim but passable cells. Must be `>= 0`.
    pub penalty: f64,
}

impl Default for TracingParameters {
    /// The settings an [`AStar2D`](crate::AStar2D) starts with: threshold
    /// 0.5 and penalty 10.
    fn default() -> Self {
        Self {
            threshold: 0.5,
            penalty: 10.0,
        }
    }
}

impl TracingParameters {
    pub fn new(threshold: f64, penalty: f64) -> Result<Self> {
        let p = Self { threshold, penalty };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<()> {
        check_threshold(self.threshold)?;
        check_penalty(self.penalty)
    }
}

pub(crate) fn check_threshold(threshold: f64) -> Result<()> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(SearchError::InvalidParameter {
            name: "threshold",
            value: threshold,
        })
    }
}

pub(crate) fn check_penalty(penalty: f64) -> Result<()> {
    if penalty >= 0.0 && penalty.is_finite() {
        Ok(())
    } else {
        Err(SearchError::InvalidParameter {
            name: "intensity penalty",
            value: penalty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = TracingParameters::default();
        assert_eq!(p.threshold, 0.5);
        assert_eq!(p.penalty, 10.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(TracingParameters::new(1.5, 0.0).is_err());
        assert!(TracingParameters::new(-0.1, 0.0).is_err());
        assert!(TracingParameters::new(f64::NAN, 0.0).is_err());
        assert!(TracingParameters::new(0.2, -1.0).is_err());
        assert!(TracingParameters::new(0.2, f64::INFINITY).is_err());
        assert!(TracingParameters::new(0.0, 0.0).is_ok());
        assert!(TracingParameters::new(1.0, 3.0).is_ok());
    }
}
