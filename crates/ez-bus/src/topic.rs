//! Topic matching.

/// Whether a subscription's topic accepts a message's topic.
///
/// Exact string equality. Topics follow a `module/event` convention, but
/// no prefix or wildcard matching is done here.
#[must_use]
pub fn topic_matches(pattern: &str, topic: &str) -> bool {
    pattern == topic
}
