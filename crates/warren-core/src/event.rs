// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Generic event channel decoupling pool bookkeeping from its observers.

use log;

/// A generic event channel transporting values of type `T`.
///
/// The channel is generic so that `warren-core` stays decoupled from the
/// concrete event types defined in higher-level crates. Senders are
/// cheap clones handed to the producers; the owner of the bus holds the
/// single receiver and drains it, so delivery order always matches
/// emission order.
#[derive(Debug)]
pub struct EventBus<T: Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> EventBus<T> {
    /// Creates a new bus backed by an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Sends an event, logging an error if the receiver is disconnected.
    pub fn publish(&self, event: T) {
        if self.sender.send(event).is_err() {
            log::error!("Failed to publish event: receiver disconnected.");
        }
    }

    /// Returns a clone of the sender end of the channel, for producers
    /// that emit events on the owner's behalf.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Drains every event currently queued, in emission order, without
    /// blocking.
    pub fn drain(&self) -> flume::TryIter<'_, T> {
        self.receiver.try_iter()
    }

    /// Returns a reference to the receiver end of the channel.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }
}

impl<T: Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Opened(u32),
        Closed(u32),
    }

    #[test]
    fn test_new_bus_is_empty() {
        let bus = EventBus::<TestEvent>::new();
        assert!(bus.receiver().is_empty());
        assert_eq!(bus.drain().count(), 0);
    }

    #[test]
    fn test_drain_preserves_emission_order() {
        let bus = EventBus::new();
        bus.publish(TestEvent::Opened(1));
        bus.publish(TestEvent::Opened(2));
        bus.publish(TestEvent::Closed(1));

        let drained: Vec<_> = bus.drain().collect();
        assert_eq!(
            drained,
            vec![
                TestEvent::Opened(1),
                TestEvent::Opened(2),
                TestEvent::Closed(1)
            ]
        );
        assert!(bus.receiver().is_empty());
    }

    #[test]
    fn test_cloned_senders_feed_one_receiver() {
        let bus = EventBus::new();
        let sender1 = bus.sender();
        let sender2 = bus.sender();

        sender1.send(TestEvent::Opened(7)).expect("send 1");
        sender2.send(TestEvent::Closed(7)).expect("send 2");

        assert_eq!(bus.drain().count(), 2);
    }
}
