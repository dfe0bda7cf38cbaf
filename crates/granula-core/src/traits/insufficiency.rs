/// Decides whether a generated answer is an honest "no information available".
///
/// Such answers end the loop instead of triggering another retry.
pub trait InsufficiencyDetector: Send + Sync {
    fn is_insufficient(&self, answer: &str) -> bool;
}
