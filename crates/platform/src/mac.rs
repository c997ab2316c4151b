//! Device MAC address provisioning.
//!
//! The node needs one EUI-48 address before either backhaul variant can
//! register with the mesh stack. It comes from exactly one of two sources,
//! selected in [`crate::config::MacSource`]: a byte-shuffling transform of
//! the 96-bit silicon unique ID, or a fixed configured value.
//!
//! A missing UID source produces a zero-filled address rather than an error;
//! callers treat an all-zero address as suspect ([`Eui48::is_suspect`]) and
//! log it, but the node still boots — a lab bench with a blank OTP area is
//! not a reason to brick the board.

use crate::config::MacSource;

/// A 6-byte EUI-48 hardware address.
///
/// Created once at startup by [`provision`], read-only thereafter. Owned by
/// the bring-up orchestrator and borrowed by the backhaul initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Eui48([u8; 6]);

impl Eui48 {
    /// The zero-filled address produced when no UID source is available.
    pub const ZERO: Eui48 = Eui48([0; 6]);

    /// Wrap raw octets.
    pub const fn from_octets(octets: [u8; 6]) -> Self {
        Eui48(octets)
    }

    /// The raw octets, most significant first.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// `true` when the address is all-zero — the unspecified value the
    /// provisioner yields when the silicon UID could not be read. Such an
    /// address is syntactically valid but guaranteed non-unique.
    pub fn is_suspect(&self) -> bool {
        self.0 == [0; 6]
    }

    /// `true` when the locally-administered bit is set in the first octet.
    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & 0x02 != 0
    }

    /// `true` when the multicast bit is clear (a device address must be
    /// unicast).
    pub fn is_unicast(&self) -> bool {
        self.0[0] & 0x01 == 0
    }
}

/// Resolve the device MAC address from the configured source.
///
/// - `MacSource::DeviceUid`: shuffle bytes of the silicon UID's mid and low
///   words into six octets (see [`derive_from_uid`]). `uid == None` yields
///   [`Eui48::ZERO`] — unspecified, not an error.
/// - `MacSource::Fixed(..)`: copy the configured octets verbatim.
///   Deterministic: two calls return identical sequences.
pub fn provision(source: &MacSource, uid: Option<&[u8; 12]>) -> Eui48 {
    match source {
        MacSource::DeviceUid => match uid {
            Some(uid) => derive_from_uid(uid),
            None => Eui48::ZERO,
        },
        MacSource::Fixed(octets) => Eui48::from_octets(*octets),
    }
}

/// Derive an EUI-48 from the 96-bit device unique ID.
///
/// Takes the UID mid word (bytes 4..8) and low word (bytes 0..4) and
/// shuffles them around, spreading wafer X/Y coordinate entropy across all
/// six octets. The first octet is forced locally-administered and unicast so
/// the result can never collide with an IEEE-assigned OUI.
pub fn derive_from_uid(uid: &[u8; 12]) -> Eui48 {
    let octet0 = (uid[7] ^ uid[3]) | 0x02;
    Eui48([
        octet0 & 0xFE, // locally administered, unicast
        uid[5],
        uid[2] ^ uid[6],
        uid[0],
        uid[4],
        uid[1],
    ])
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE_UID: [u8; 12] = [
        0x33, 0x00, 0x5A, 0x10, 0x47, 0x51, 0x35, 0x36, 0x30, 0x36, 0x47, 0x04,
    ];

    #[test]
    fn test_fixed_source_is_deterministic() {
        let source = MacSource::Fixed([0x02, 0x00, 0x5E, 0x10, 0x00, 0x01]);
        let first = provision(&source, None);
        let second = provision(&source, None);
        assert_eq!(first.octets(), second.octets());
        assert_eq!(first.octets(), [0x02, 0x00, 0x5E, 0x10, 0x00, 0x01]);
    }

    #[test]
    fn test_uid_source_is_deterministic() {
        let first = provision(&MacSource::DeviceUid, Some(&SAMPLE_UID));
        let second = provision(&MacSource::DeviceUid, Some(&SAMPLE_UID));
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_uid_yields_suspect_zero_address() {
        let mac = provision(&MacSource::DeviceUid, None);
        assert_eq!(mac, Eui48::ZERO);
        assert!(mac.is_suspect());
    }

    #[test]
    fn test_derived_address_is_locally_administered_unicast() {
        let mac = derive_from_uid(&SAMPLE_UID);
        assert!(mac.is_locally_administered());
        assert!(mac.is_unicast());
    }

    #[test]
    fn test_derived_address_is_not_suspect_for_real_uid() {
        let mac = derive_from_uid(&SAMPLE_UID);
        assert!(!mac.is_suspect());
    }

    #[test]
    fn test_distinct_uids_give_distinct_addresses() {
        let mut other = SAMPLE_UID;
        other[5] ^= 0xFF; // differs in a byte the shuffle actually uses
        assert_ne!(derive_from_uid(&SAMPLE_UID), derive_from_uid(&other));
    }

    #[test]
    fn test_fixed_source_ignores_uid() {
        let octets = [0x02, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE];
        let mac = provision(&MacSource::Fixed(octets), Some(&SAMPLE_UID));
        assert_eq!(mac.octets(), octets);
    }

    #[test]
    fn test_eui48_is_six_bytes() {
        assert_eq!(core::mem::size_of::<Eui48>(), 6);
    }
}
