//! Pluggable transport interface: callers only require `publish(event)`,
//! `subscribe(filter, handler)`, and an encrypted `direct_message(to,
//! bytes)` primitive.

use covenant_core::{CovenantError, Identifier};

pub trait Transport: Send + Sync {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), CovenantError>;

    /// Registers `handler` to be invoked for every future publish on
    /// `topic`. The default transport fans this out from its gossipsub
    /// inbound queue; test doubles may call it synchronously.
    fn subscribe(&self, topic: &str, handler: Box<dyn Fn(Vec<u8>) + Send + Sync>) -> Result<(), CovenantError>;

    /// Sends `payload` pre-sealed for `to`; the transport carries opaque
    /// ciphertext and does not interpret it.
    fn direct_message(&self, to: &Identifier, sealed_payload: Vec<u8>) -> Result<(), CovenantError>;
}

#[cfg(test)]
pub mod test_double {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    type Handler = Box<dyn Fn(Vec<u8>) + Send + Sync>;

    #[derive(Default)]
    pub struct InMemoryTransport {
        subscribers: Mutex<HashMap<String, Vec<Handler>>>,
        direct: Mutex<Vec<(Identifier, Vec<u8>)>>,
    }

    impl InMemoryTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn direct_messages(&self) -> Vec<(Identifier, Vec<u8>)> {
            self.direct.lock().unwrap().clone()
        }
    }

    impl Transport for InMemoryTransport {
        fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), CovenantError> {
            let subscribers = self.subscribers.lock().unwrap();
            if let Some(handlers) = subscribers.get(topic) {
                for handler in handlers {
                    handler(payload.clone());
                }
            }
            Ok(())
        }

        fn subscribe(&self, topic: &str, handler: Box<dyn Fn(Vec<u8>) + Send + Sync>) -> Result<(), CovenantError> {
            self.subscribers.lock().unwrap().entry(topic.to_string()).or_default().push(handler);
            Ok(())
        }

        fn direct_message(&self, to: &Identifier, sealed_payload: Vec<u8>) -> Result<(), CovenantError> {
            self.direct.lock().unwrap().push((to.clone(), sealed_payload));
            Ok(())
        }
    }

    #[test]
    fn publish_fans_out_to_subscribers() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let transport = InMemoryTransport::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        transport.subscribe("topic-a", Box::new(move |_| { count_clone.fetch_add(1, Ordering::SeqCst); })).unwrap();
        transport.publish("topic-a", vec![1, 2, 3]).unwrap();
        transport.publish("topic-b", vec![4, 5, 6]).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn direct_messages_are_recorded_per_recipient() {
        let transport = InMemoryTransport::new();
        transport.direct_message(&Identifier::new("bob"), vec![9]).unwrap();
        let sent = transport.direct_messages();
        assert_eq!(sent, vec![(Identifier::new("bob"), vec![9])]);
    }
}
