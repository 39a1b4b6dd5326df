//! Dispatch strategies.

use std::fmt;
use std::str::FromStr;

use crate::error::UnknownOption;

/// How providers are called for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStrategy {
    /// Call every eligible provider concurrently and wait for all of them.
    ParallelAll,
    /// Call providers one at a time in priority order until one succeeds.
    SequentialFallback,
    /// Answer from the local rule engine without any network call.
    LocalOnly,
}

impl DispatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStrategy::ParallelAll => "parallel",
            DispatchStrategy::SequentialFallback => "sequential",
            DispatchStrategy::LocalOnly => "local",
        }
    }
}

impl fmt::Display for DispatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured strategy, before the eligible provider count is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyChoice {
    /// `LocalOnly` when no provider is eligible, otherwise `ParallelAll`.
    #[default]
    Auto,
    Parallel,
    Sequential,
    Local,
}

impl StrategyChoice {
    /// Settle the strategy once the number of eligible providers is known.
    ///
    /// Explicit network strategies are kept even with zero eligible
    /// providers; every request then fails as exhausted.
    pub fn resolve(self, eligible: usize) -> DispatchStrategy {
        match self {
            StrategyChoice::Auto if eligible == 0 => DispatchStrategy::LocalOnly,
            StrategyChoice::Auto | StrategyChoice::Parallel => DispatchStrategy::ParallelAll,
            StrategyChoice::Sequential => DispatchStrategy::SequentialFallback,
            StrategyChoice::Local => DispatchStrategy::LocalOnly,
        }
    }
}

impl FromStr for StrategyChoice {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(StrategyChoice::Auto),
            "parallel" | "parallel_all" => Ok(StrategyChoice::Parallel),
            "sequential" | "fallback" => Ok(StrategyChoice::Sequential),
            "local" | "local_only" => Ok(StrategyChoice::Local),
            other => Err(UnknownOption {
                kind: "strategy",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_resolution() {
        assert_eq!(StrategyChoice::Auto.resolve(0), DispatchStrategy::LocalOnly);
        assert_eq!(StrategyChoice::Auto.resolve(2), DispatchStrategy::ParallelAll);
    }

    #[test]
    fn test_explicit_choices_kept() {
        assert_eq!(StrategyChoice::Parallel.resolve(0), DispatchStrategy::ParallelAll);
        assert_eq!(
            StrategyChoice::Sequential.resolve(0),
            DispatchStrategy::SequentialFallback
        );
        assert_eq!(StrategyChoice::Local.resolve(3), DispatchStrategy::LocalOnly);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Sequential".parse::<StrategyChoice>().unwrap(), StrategyChoice::Sequential);
        assert_eq!("".parse::<StrategyChoice>().unwrap(), StrategyChoice::Auto);
        assert!("round-robin".parse::<StrategyChoice>().is_err());
    }
}
