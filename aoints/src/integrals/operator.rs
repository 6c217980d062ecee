use super::IntegralError;
use basis::shell::cartesian_components;
use nalgebra::Vector3;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Overlap,
    /// overlap + dipole
    EMultipole1,
    /// overlap + dipole + quadrupole
    EMultipole2,
    /// overlap + dipole + quadrupole + octupole
    EMultipole3,
    Kinetic,
    Nuclear,
}

const MULTIPOLE_LABELS: [&str; 20] = [
    "S", "x", "y", "z", "xx", "xy", "xz", "yy", "yz", "zz", "xxx", "xxy", "xxz", "xyy", "xyz",
    "xzz", "yyy", "yyz", "yzz", "zzz",
];

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Overlap,
        Operator::EMultipole1,
        Operator::EMultipole2,
        Operator::EMultipole3,
        Operator::Kinetic,
        Operator::Nuclear,
    ];

    pub fn n_components(self) -> usize {
        match self {
            Operator::Overlap | Operator::Kinetic | Operator::Nuclear => 1,
            Operator::EMultipole1 => 4,
            Operator::EMultipole2 => 10,
            Operator::EMultipole3 => 20,
        }
    }

    /// Component labels in output order.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Operator::Overlap => &MULTIPOLE_LABELS[..1],
            Operator::EMultipole1 => &MULTIPOLE_LABELS[..4],
            Operator::EMultipole2 => &MULTIPOLE_LABELS[..10],
            Operator::EMultipole3 => &MULTIPOLE_LABELS[..],
            Operator::Kinetic => &["T"],
            Operator::Nuclear => &["V"],
        }
    }

    /// Highest multipole order, for the overlap/multipole family.
    pub fn multipole_order(self) -> Option<i32> {
        match self {
            Operator::Overlap => Some(0),
            Operator::EMultipole1 => Some(1),
            Operator::EMultipole2 => Some(2),
            Operator::EMultipole3 => Some(3),
            Operator::Kinetic | Operator::Nuclear => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Overlap => "overlap",
            Operator::EMultipole1 => "emultipole1",
            Operator::EMultipole2 => "emultipole2",
            Operator::EMultipole3 => "emultipole3",
            Operator::Kinetic => "kinetic",
            Operator::Nuclear => "nuclear",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operator {
    type Err = IntegralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| IntegralError::UnknownOperator(s.to_string()))
    }
}

/// Cartesian powers (i, j, k) of x^i y^j z^k for every multipole up to
/// `max_order`, grouped by order: S, x, y, z, xx, xy, ...
pub fn multipole_powers(max_order: i32) -> Vec<Vector3<i32>> {
    (0..=max_order).flat_map(cartesian_components).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_counts_match_labels() {
        for op in Operator::ALL {
            assert_eq!(op.labels().len(), op.n_components(), "{}", op);
            if let Some(order) = op.multipole_order() {
                assert_eq!(multipole_powers(order).len(), op.n_components());
            }
        }
    }

    #[test]
    fn test_powers_follow_labels() {
        let powers = multipole_powers(3);
        for (p, label) in powers.iter().zip(Operator::EMultipole3.labels()) {
            let count = |c: char| label.chars().filter(|&x| x == c).count() as i32;
            if *label == "S" {
                assert_eq!(*p, Vector3::new(0, 0, 0));
            } else {
                assert_eq!(*p, Vector3::new(count('x'), count('y'), count('z')), "{}", label);
            }
        }
    }

    #[test]
    fn test_parse_operator() {
        assert_eq!("Kinetic".parse::<Operator>().unwrap(), Operator::Kinetic);
        assert_eq!(
            "emultipole2".parse::<Operator>().unwrap(),
            Operator::EMultipole2
        );
        assert_eq!(
            "coulomb".parse::<Operator>().unwrap_err(),
            IntegralError::UnknownOperator("coulomb".to_string())
        );
    }
}
