use std::fmt;
use std::str::FromStr;

/// A top-level section of the application state.
///
/// Subscriptions are keyed by slice; updating one slice never notifies the
/// subscribers of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Foods,
    Diary,
    Exercises,
    Weights,
    Goals,
}

impl Slice {
    pub const ALL: [Slice; 5] = [
        Slice::Foods,
        Slice::Diary,
        Slice::Exercises,
        Slice::Weights,
        Slice::Goals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slice::Foods => "foods",
            Slice::Diary => "diary",
            Slice::Exercises => "exercises",
            Slice::Weights => "weights",
            Slice::Goals => "goals",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Slice::Foods => 0,
            Slice::Diary => 1,
            Slice::Exercises => 2,
            Slice::Weights => 3,
            Slice::Goals => 4,
        }
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "foods" => Ok(Slice::Foods),
            "diary" => Ok(Slice::Diary),
            "exercises" => Ok(Slice::Exercises),
            "weights" => Ok(Slice::Weights),
            "goals" => Ok(Slice::Goals),
            _ => Err(format!("Unknown state slice: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_names_round_trip() {
        for slice in Slice::ALL {
            assert_eq!(slice.as_str().parse::<Slice>().unwrap(), slice);
        }
        assert!("meals".parse::<Slice>().is_err());
    }

    #[test]
    fn test_slice_indices_are_distinct() {
        let mut seen = [false; 5];
        for slice in Slice::ALL {
            assert!(!seen[slice.index()]);
            seen[slice.index()] = true;
        }
    }
}
