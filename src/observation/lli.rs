//! Loss of Lock Indicator (LLI) of phase tracking
use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct LliFlags: u8 {
        /// Lock lost between previous and current observation,
        /// cycle slip is possible
        const LOCK_LOSS = 0x01;
        /// Half cycle ambiguity or slip possible
        const HALF_CYCLE_SLIP = 0x02;
        /// Observing under anti spoofing
        const UNDER_ANTI_SPOOFING = 0x04;
    }
}

impl LliFlags {
    /// Decodes a single digit LLI field. Blank or invalid fields are absent.
    pub(crate) fn from_field(field: &str) -> Option<Self> {
        let value = field.trim().parse::<u8>().ok()?;
        Self::from_bits(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn lli_fields() {
        assert_eq!(LliFlags::from_field(" "), None);
        assert_eq!(LliFlags::from_field("0"), Some(LliFlags::empty()));
        assert_eq!(LliFlags::from_field("1"), Some(LliFlags::LOCK_LOSS));
        let flags = LliFlags::from_field("5").unwrap();
        assert!(flags.contains(LliFlags::LOCK_LOSS));
        assert!(flags.contains(LliFlags::UNDER_ANTI_SPOOFING));
        assert!(!flags.contains(LliFlags::HALF_CYCLE_SLIP));
        assert_eq!(LliFlags::from_field("8"), None);
        assert_eq!(LliFlags::from_field("x"), None);
    }
}
