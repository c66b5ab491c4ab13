//! Recorded events and the ordered sequence they are replayed from

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;

/// One recorded event.
///
/// The payload is kept as the JSON document it was parsed from; no schema is
/// imposed, and key order survives the decode/encode round trip.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From, derive_more::Into,
)]
#[serde(transparent)]
pub struct Event(Value);

impl Event {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Immutable, ordered list of events shared by every session.
///
/// Cloning is cheap: all clones point at the same backing slice.
#[derive(Debug)]
pub struct EventSequence<E = Event>(Arc<[E]>);

impl<E> EventSequence<E> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.0.get(index)
    }
}

impl<E> Clone for EventSequence<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> From<Vec<E>> for EventSequence<E> {
    fn from(events: Vec<E>) -> Self {
        Self(events.into())
    }
}

impl<E> Deref for EventSequence<E> {
    type Target = [E];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_serializes_transparently() {
        let event = Event::from(json!({"type": "append", "text": "Hello"}));
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"type":"append","text":"Hello"}"#
        );
    }

    #[test]
    fn test_event_preserves_key_order() {
        let raw = r#"{"z":1,"a":[true,null,"x"],"m":{"b":2.5,"a":-1}}"#;
        let event: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&event).unwrap(), raw);
    }

    #[test]
    fn test_sequence_clones_share_storage() {
        let sequence = EventSequence::from(vec![Event::from(json!(1)), Event::from(json!(2))]);
        let clone = sequence.clone();

        assert_eq!(clone.len(), 2);
        assert!(std::ptr::eq(sequence.as_ptr(), clone.as_ptr()));
        assert_eq!(clone.get(1).map(Event::as_value), Some(&json!(2)));
        assert!(clone.get(2).is_none());
    }
}
