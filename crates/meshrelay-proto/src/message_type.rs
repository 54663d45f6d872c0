//! The five protocol message variants.

/// Which of the five protocol messages a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Flooded to every reachable node; delivered locally and rebroadcast.
    Broadcast = 0,
    /// Addressed to a single `original_target`, forwarded hop by hop.
    Unicast = 1,
    /// End-to-end acknowledgement of a prior Unicast's `message_id`.
    DeliveryConfirm = 2,
    /// Flooded route discovery for an unresolved `original_target`.
    SearchRequest = 3,
    /// Flooded reply teaching the searcher a reverse path.
    SearchResponse = 4,
}

impl MessageType {
    /// Decode from the wire byte. `None` for any value outside `0..=4`.
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Broadcast),
            1 => Some(Self::Unicast),
            2 => Some(Self::DeliveryConfirm),
            3 => Some(Self::SearchRequest),
            4 => Some(Self::SearchResponse),
            _ => None,
        }
    }

    /// Encode to the wire byte.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// True for the two message types that are always sent to
    /// [`crate::Hwid::BROADCAST`] regardless of `original_target`.
    #[must_use]
    pub fn is_flooded(self) -> bool {
        matches!(self, Self::Broadcast | Self::SearchRequest | Self::SearchResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_all_variants() {
        for mt in [
            MessageType::Broadcast,
            MessageType::Unicast,
            MessageType::DeliveryConfirm,
            MessageType::SearchRequest,
            MessageType::SearchResponse,
        ] {
            assert_eq!(MessageType::from_u8(mt.to_u8()), Some(mt));
        }
    }

    #[test]
    fn rejects_unknown_byte() {
        assert_eq!(MessageType::from_u8(5), None);
        assert_eq!(MessageType::from_u8(255), None);
    }
}
