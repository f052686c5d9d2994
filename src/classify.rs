// src/classify.rs
//
// Online-state classification. Pure functions over persisted state,
// re-evaluated on every read; nothing here is cached.
use crate::models::server::ServerRecord;

/// Addresses matching any of these substrings are demo/seed/test entries and
/// must never render as live, whatever their stored state says.
const FAKE_ADDRESS_PATTERNS: &[&str] = &[
    "test",
    "example",
    "fake",
    "localhost",
    "invalid",
    "127.0.0.1",
];

pub fn is_fake_address(address: &str) -> bool {
    let address = address.to_ascii_lowercase();
    FAKE_ADDRESS_PATTERNS
        .iter()
        .any(|pattern| address.contains(pattern))
}

/// A server shows as online only when all three hold: a successful contact is
/// recorded, that contact is within the staleness window, and the contact
/// carried a player count. Fake addresses are forced offline.
pub fn is_online(record: &ServerRecord, staleness_window_secs: u64, now: u64) -> bool {
    if is_fake_address(&record.address) {
        return false;
    }
    let Some(contact) = record.last_successful_contact else {
        return false;
    };
    if contact > now || now - contact > staleness_window_secs {
        return false;
    }
    record.players_online.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::server::{ApprovalStatus, Platform, ServerRecord};

    const WINDOW: u64 = 7200;
    const NOW: u64 = 1_700_000_000;

    fn record(address: &str) -> ServerRecord {
        let mut record = ServerRecord::new(address, Some(25565), Platform::Java, NOW - 86400);
        record.status = ApprovalStatus::Approved;
        record
    }

    #[test]
    fn no_contact_is_offline_regardless_of_counts() {
        let mut r = record("play.hub.net");
        r.players_online = Some(42);
        r.players_max = Some(100);
        r.last_successful_contact = None;
        assert!(!is_online(&r, WINDOW, NOW));
    }

    #[test]
    fn fresh_contact_with_players_is_online() {
        let mut r = record("play.hub.net");
        r.players_online = Some(5);
        r.last_successful_contact = Some(NOW - 60);
        assert!(is_online(&r, WINDOW, NOW));
    }

    #[test]
    fn fresh_contact_without_players_is_offline() {
        let mut r = record("play.hub.net");
        r.players_online = None;
        r.last_successful_contact = Some(NOW - 60);
        assert!(!is_online(&r, WINDOW, NOW));
    }

    #[test]
    fn stale_contact_is_offline() {
        let mut r = record("play.hub.net");
        r.players_online = Some(5);
        r.last_successful_contact = Some(NOW - WINDOW - 1);
        assert!(!is_online(&r, WINDOW, NOW));
    }

    #[test]
    fn contact_exactly_at_window_edge_is_online() {
        let mut r = record("play.hub.net");
        r.players_online = Some(5);
        r.last_successful_contact = Some(NOW - WINDOW);
        assert!(is_online(&r, WINDOW, NOW));
    }

    #[test]
    fn fake_addresses_are_forced_offline() {
        for address in [
            "test.server.net",
            "mc.example.com",
            "fakeserver.io",
            "localhost",
            "my-invalid-host.net",
            "127.0.0.1",
        ] {
            let mut r = record(address);
            r.players_online = Some(10);
            r.last_successful_contact = Some(NOW - 1);
            assert!(!is_online(&r, WINDOW, NOW), "{} should be offline", address);
        }
    }
}
