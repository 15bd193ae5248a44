//! Deterministic aggregate identity for counting-circle results.

use common::{AggregateId, CountingCircleId, PoliticalBusinessId};
use uuid::Uuid;

/// Fixed namespace UUID for deterministic result ID derivation.
///
/// Result IDs are UUID v5 values derived from this namespace and the
/// canonical `"{business}/{circle}/{phase}"` string, so the same business
/// keys always map to the same aggregate stream regardless of which process
/// performs the mapping. No other field ever feeds the derivation.
const RESULT_NAMESPACE: Uuid = Uuid::from_bytes([
    0x5e, 0x30, 0xa8, 0x91, 0x7c, 0x44, 0x4b, 0x02, 0x9d, 0x1f, 0x62, 0xe8, 0x0c, 0x57, 0xb3, 0x6a,
]);

/// Derives the deterministic identifier for a counting-circle result.
///
/// A political business is tabulated twice per counting circle: once during
/// the contest's testing phase and once live after the testing-phase
/// deadline. The `testing_phase_ended` flag keeps those two epochs on
/// distinct, non-colliding streams.
pub fn result_id(
    political_business_id: PoliticalBusinessId,
    counting_circle_id: CountingCircleId,
    testing_phase_ended: bool,
) -> AggregateId {
    let name = format!("{political_business_id}/{counting_circle_id}/{testing_phase_ended}");
    AggregateId::from_uuid(Uuid::new_v5(&RESULT_NAMESPACE, name.as_bytes()))
}
