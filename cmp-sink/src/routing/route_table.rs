/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Keyed publish/subscribe tables that route decoded messages to handlers.
//!
//! One coarse lock guards the key → handler map. Publishing holds the lock only
//! long enough to copy the handler list for the key, then invokes handlers with
//! the lock released. Handlers may therefore subscribe or unsubscribe (on this
//! table too) while being called. A handler removed concurrently with a publish
//! may still receive that one in-flight call, never a later one.

use crate::message::{CmpMessage, DeviceId};
use crate::observability::counters::{DropCounters, DropReason};
use crate::observability::events;
use crate::routing::handler::{HandlerRef, MessageHandler};
use crate::routing::route_key::RouteKey;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

const COMPONENT: &str = "route_table";

/// Multimap from a routing key to the handlers subscribed under it.
pub struct SubscriberTable<K> {
    name: &'static str,
    subscribers: Mutex<HashMap<K, Vec<HandlerRef>>>,
    counters: Arc<DropCounters>,
}

/// Routes stream-level data by `(device, interface, stream)`.
pub type RouteTable = SubscriberTable<RouteKey>;

/// Routes capture-module status by device id.
pub type DeviceRouteTable = SubscriberTable<DeviceId>;

impl<K> SubscriberTable<K>
where
    K: Copy + Debug + Display + Eq + Hash,
{
    /// Creates an empty table whose drops are recorded in `counters`.
    pub fn new(name: &'static str, counters: Arc<DropCounters>) -> Self {
        Self {
            name,
            subscribers: Mutex::new(HashMap::new()),
            counters,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Vec<HandlerRef>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `handler` under `key`. Subscribing the same pair twice keeps two entries.
    pub fn subscribe(&self, key: K, handler: &Arc<dyn MessageHandler>) {
        let mut subscribers = self.lock();
        subscribers
            .entry(key)
            .or_default()
            .push(HandlerRef::new(handler));
        debug!(
            event = events::ROUTE_SUBSCRIBE,
            component = COMPONENT,
            table = self.name,
            route_key = %key,
            "handler subscribed"
        );
    }

    /// Removes one `(key, handler)` pair. Unknown pairs are ignored.
    pub fn unsubscribe(&self, key: K, handler: &Arc<dyn MessageHandler>) -> bool {
        let mut subscribers = self.lock();
        let Some(handlers) = subscribers.get_mut(&key) else {
            trace!(
                event = events::ROUTE_UNSUBSCRIBE_MISSING,
                component = COMPONENT,
                table = self.name,
                route_key = %key,
                "no subscription to remove"
            );
            return false;
        };

        let Some(position) = handlers.iter().position(|entry| entry.refers_to(handler)) else {
            trace!(
                event = events::ROUTE_UNSUBSCRIBE_MISSING,
                component = COMPONENT,
                table = self.name,
                route_key = %key,
                "handler not subscribed under key"
            );
            return false;
        };

        handlers.remove(position);
        if handlers.is_empty() {
            subscribers.remove(&key);
        }
        debug!(
            event = events::ROUTE_UNSUBSCRIBE,
            component = COMPONENT,
            table = self.name,
            route_key = %key,
            "handler unsubscribed"
        );
        true
    }

    fn handlers_for(&self, key: &K) -> Vec<HandlerRef> {
        let subscribers = self.lock();
        subscribers.get(key).cloned().unwrap_or_default()
    }

    fn record_no_subscriber(&self, key: K, count: usize) {
        self.counters
            .record_many(DropReason::NoSubscriber, count as u64);
        trace!(
            event = events::ROUTE_PUBLISH_NO_SUBSCRIBER,
            component = COMPONENT,
            table = self.name,
            route_key = %key,
            batch_len = count,
            reason = DropReason::NoSubscriber.as_str(),
            "dropping message without subscriber"
        );
    }

    /// Delivers one message to every handler under `key`, in subscription order.
    ///
    /// Returns how many handlers were invoked.
    pub fn publish(&self, key: K, message: &Arc<CmpMessage>) -> usize {
        let handlers = self.handlers_for(&key);
        let mut delivered = 0;
        for handler in handlers.iter().filter_map(HandlerRef::upgrade) {
            handler.process_one(message);
            delivered += 1;
        }

        if delivered == 0 {
            self.record_no_subscriber(key, 1);
        }
        delivered
    }

    /// Delivers the whole ordered batch to each handler under `key` in one call.
    pub fn publish_batch(&self, key: K, messages: &[Arc<CmpMessage>]) -> usize {
        if messages.is_empty() {
            return 0;
        }

        let handlers = self.handlers_for(&key);
        let mut delivered = 0;
        for handler in handlers.iter().filter_map(HandlerRef::upgrade) {
            handler.process_many(messages);
            delivered += 1;
        }

        if delivered == 0 {
            self.record_no_subscriber(key, messages.len());
        }
        delivered
    }

    /// Number of handlers currently subscribed under `key`.
    pub fn subscriber_count(&self, key: K) -> usize {
        self.lock().get(&key).map_or(0, Vec::len)
    }

    /// Number of keys with at least one subscriber.
    pub fn key_count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<K> Debug for SubscriberTable<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberTable")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceRouteTable, RouteTable};
    use crate::message::{CmpMessage, Payload};
    use crate::observability::counters::DropCounters;
    use crate::routing::handler::MessageHandler;
    use crate::routing::route_key::RouteKey;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingHandler {
        one_calls: AtomicUsize,
        many_calls: Mutex<Vec<usize>>,
    }

    impl CountingHandler {
        fn one_calls(&self) -> usize {
            self.one_calls.load(Ordering::SeqCst)
        }
    }

    impl MessageHandler for CountingHandler {
        fn process_one(&self, _message: &Arc<CmpMessage>) {
            self.one_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn process_many(&self, messages: &[Arc<CmpMessage>]) {
            self.many_calls.lock().unwrap().push(messages.len());
        }
    }

    fn table() -> (RouteTable, Arc<DropCounters>) {
        let counters = Arc::new(DropCounters::new());
        (RouteTable::new("test", counters.clone()), counters)
    }

    fn message(key: RouteKey) -> Arc<CmpMessage> {
        Arc::new(CmpMessage::data(key, 0, Payload::Undefined))
    }

    #[test]
    fn publish_reaches_subscriber_once_and_stops_after_unsubscribe() {
        let (table, counters) = table();
        let key = RouteKey::new(1, 2, 3);
        let counting = Arc::new(CountingHandler::default());
        let handler: Arc<dyn MessageHandler> = counting.clone();

        table.subscribe(key, &handler);
        assert_eq!(table.publish(key, &message(key)), 1);
        assert_eq!(counting.one_calls(), 1);

        assert!(table.unsubscribe(key, &handler));
        assert_eq!(table.publish(key, &message(key)), 0);
        assert_eq!(counting.one_calls(), 1);
        assert_eq!(counters.snapshot().no_subscriber, 1);
        assert!(table.is_empty());
    }

    #[test]
    fn unsubscribe_of_unknown_pair_is_noop() {
        let (table, _) = table();
        let key = RouteKey::new(1, 2, 3);
        let subscribed: Arc<dyn MessageHandler> = Arc::new(CountingHandler::default());
        let stranger: Arc<dyn MessageHandler> = Arc::new(CountingHandler::default());

        assert!(!table.unsubscribe(key, &subscribed));
        table.subscribe(key, &subscribed);
        assert!(!table.unsubscribe(key, &stranger));
        assert!(!table.unsubscribe(RouteKey::new(9, 9, 9), &subscribed));
        assert_eq!(table.subscriber_count(key), 1);
    }

    #[test]
    fn publish_batch_calls_process_many_once_per_handler() {
        let (table, _) = table();
        let key = RouteKey::new(5, 10, 20);
        let first = Arc::new(CountingHandler::default());
        let second = Arc::new(CountingHandler::default());
        let first_handler: Arc<dyn MessageHandler> = first.clone();
        let second_handler: Arc<dyn MessageHandler> = second.clone();
        table.subscribe(key, &first_handler);
        table.subscribe(key, &second_handler);

        let batch: Vec<_> = (0..5).map(|_| message(key)).collect();
        assert_eq!(table.publish_batch(key, &batch), 2);

        assert_eq!(*first.many_calls.lock().unwrap(), vec![5]);
        assert_eq!(*second.many_calls.lock().unwrap(), vec![5]);
        assert_eq!(first.one_calls(), 0);
    }

    #[test]
    fn publish_batch_without_subscriber_counts_every_message() {
        let (table, counters) = table();
        let key = RouteKey::new(1, 1, 1);
        let batch: Vec<_> = (0..4).map(|_| message(key)).collect();

        assert_eq!(table.publish_batch(key, &batch), 0);
        assert_eq!(counters.snapshot().no_subscriber, 4);
    }

    #[test]
    fn dropped_owner_is_never_invoked() {
        let (table, counters) = table();
        let key = RouteKey::new(1, 0, 0);
        let handler: Arc<dyn MessageHandler> = Arc::new(CountingHandler::default());
        table.subscribe(key, &handler);
        drop(handler);

        assert_eq!(table.publish(key, &message(key)), 0);
        assert_eq!(counters.snapshot().no_subscriber, 1);
    }

    #[test]
    fn device_table_routes_by_device_id() {
        let counters = Arc::new(DropCounters::new());
        let table = DeviceRouteTable::new("device", counters);
        let counting = Arc::new(CountingHandler::default());
        let handler: Arc<dyn MessageHandler> = counting.clone();
        table.subscribe(7, &handler);

        let status = Arc::new(CmpMessage::capture_module_status(7, Default::default()));
        assert_eq!(table.publish(7, &status), 1);
        assert_eq!(table.publish(8, &status), 0);
        assert_eq!(counting.one_calls(), 1);
    }

    struct ReentrantHandler {
        table: Arc<RouteTable>,
        key: RouteKey,
        me: Mutex<Option<Arc<dyn MessageHandler>>>,
        calls: AtomicUsize,
    }

    impl MessageHandler for ReentrantHandler {
        fn process_one(&self, _message: &Arc<CmpMessage>) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(me) = self.me.lock().unwrap().take() {
                self.table.unsubscribe(self.key, &me);
                self.table.subscribe(self.key.with_stream(99), &me);
            }
        }

        fn process_many(&self, _messages: &[Arc<CmpMessage>]) {}
    }

    #[test]
    fn handler_may_mutate_the_same_table_while_being_called() {
        let counters = Arc::new(DropCounters::new());
        let table = Arc::new(RouteTable::new("reentrant", counters));
        let key = RouteKey::new(1, 1, 1);
        let reentrant = Arc::new(ReentrantHandler {
            table: table.clone(),
            key,
            me: Mutex::new(None),
            calls: AtomicUsize::new(0),
        });
        let handler: Arc<dyn MessageHandler> = reentrant.clone();
        *reentrant.me.lock().unwrap() = Some(handler.clone());
        table.subscribe(key, &handler);

        assert_eq!(table.publish(key, &message(key)), 1);
        assert_eq!(table.subscriber_count(key), 0);
        assert_eq!(table.subscriber_count(key.with_stream(99)), 1);
        assert_eq!(reentrant.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_publishers_stop_reaching_handler_after_unsubscribe() {
        const PUBLISHERS: usize = 4;

        let counters = Arc::new(DropCounters::new());
        let table = Arc::new(RouteTable::new("concurrent", counters));
        let key = RouteKey::new(3, 3, 3);
        let counting = Arc::new(CountingHandler::default());
        let handler: Arc<dyn MessageHandler> = counting.clone();
        table.subscribe(key, &handler);

        let stop = Arc::new(AtomicBool::new(false));
        let iterations: Arc<Vec<AtomicU64>> =
            Arc::new((0..PUBLISHERS).map(|_| AtomicU64::new(0)).collect());

        let publishers: Vec<_> = (0..PUBLISHERS)
            .map(|index| {
                let table = table.clone();
                let stop = stop.clone();
                let iterations = iterations.clone();
                thread::spawn(move || {
                    let msg = message(key);
                    while !stop.load(Ordering::SeqCst) {
                        table.publish(key, &msg);
                        iterations[index].fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        let churn = {
            let table = table.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                let other: Arc<dyn MessageHandler> = Arc::new(CountingHandler::default());
                while !stop.load(Ordering::SeqCst) {
                    table.subscribe(key.with_stream(4), &other);
                    table.unsubscribe(key.with_stream(4), &other);
                }
            })
        };

        thread::sleep(Duration::from_millis(20));
        assert!(table.unsubscribe(key, &handler));

        let wait_for_rounds = |rounds: u64| {
            let marks: Vec<u64> = iterations
                .iter()
                .map(|count| count.load(Ordering::SeqCst))
                .collect();
            for (count, mark) in iterations.iter().zip(marks) {
                while count.load(Ordering::SeqCst) < mark + rounds {
                    thread::yield_now();
                }
            }
        };

        wait_for_rounds(2);
        let settled = counting.one_calls();
        wait_for_rounds(50);
        assert_eq!(counting.one_calls(), settled);

        stop.store(true, Ordering::SeqCst);
        for publisher in publishers {
            publisher.join().expect("publisher thread should not panic");
        }
        churn.join().expect("churn thread should not panic");
    }
}
