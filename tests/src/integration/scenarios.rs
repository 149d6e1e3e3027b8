//! # Publish/Consume Scenarios
//!
//! Walkthroughs of the bus from a producer's post to a consumer's release:
//!
//! 1. **Fan-out to tag and wildcard**: both subscribers get the same message
//! 2. **Full inbox**: one delivery dropped, the rest unaffected
//! 3. **No subscribers**: message destroyed straight away
//! 4. **Unsubscribe after delivery**: queued message still readable

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use message_bus::{Bus, BusConfig, Message, Terminal, WILDCARD};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Message whose cleanup bumps `freed`.
    fn tracked<P: Send + Sync + 'static>(
        kind: &str,
        payload: P,
        freed: &Arc<AtomicUsize>,
    ) -> Message<P> {
        let freed = Arc::clone(freed);
        Message::with_cleanup(kind, payload, move |_| {
            freed.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn freed_count(freed: &Arc<AtomicUsize>) -> usize {
        freed.load(Ordering::SeqCst)
    }

    // =============================================================================
    // SCENARIO 1: tag + wildcard fan-out
    // =============================================================================

    #[test]
    fn test_score_reaches_tag_and_wildcard_subscribers() {
        let bus = Bus::new();
        let producer = Terminal::named(&bus, "game");
        let a = Terminal::named(&bus, "a");
        let b = Terminal::named(&bus, "b");
        a.subscribe("score");
        b.subscribe(WILDCARD);

        let freed = Arc::new(AtomicUsize::new(0));
        producer.post(tracked("score", 42u32, &freed)).unwrap();
        let report = bus.drain_and_publish();
        assert_eq!(report.messages, 1);
        assert_eq!(report.delivered, 2);

        assert_eq!(a.inbox_len(), 1);
        assert_eq!(b.inbox_len(), 1);
        assert_eq!(producer.inbox_len(), 0);

        let from_a = a.get_message().unwrap();
        let from_b = b.get_message().unwrap();
        assert_eq!(from_a.active_refs(), 2);
        assert_eq!(from_a.payload(), Some(&42));
        assert_eq!(from_b.payload(), Some(&42));

        from_a.release();
        assert_eq!(freed_count(&freed), 0);
        from_b.release();
        assert_eq!(freed_count(&freed), 1);
    }

    // =============================================================================
    // SCENARIO 2: full inbox
    // =============================================================================

    #[test]
    fn test_full_inbox_drops_one_delivery_only() {
        let bus = Bus::with_config(BusConfig::default().with_inbox_capacity(3)).unwrap();
        let c = Terminal::named(&bus, "c");
        let other = Terminal::named(&bus, "other");
        c.subscribe("hit");
        other.subscribe("hit");

        let freed = Arc::new(AtomicUsize::new(0));
        for i in 0..3u32 {
            bus.publish(tracked("hit", i, &freed));
        }
        while let Some(d) = other.get_message() {
            d.release();
        }
        let before = c.dump_inbox();

        let outcome = bus.publish(tracked("hit", 99u32, &freed));
        assert_eq!(outcome.matched, 2);
        assert_eq!(outcome.delivered, 1);
        assert_eq!(outcome.dropped, 1);

        // C untouched
        assert_eq!(c.dump_inbox(), before);
        let held: Vec<u32> = std::iter::from_fn(|| c.get_message())
            .map(|d| *d.payload().unwrap())
            .collect();
        assert_eq!(held, vec![0, 1, 2]);

        // The other terminal still got #99 and holds the only reference.
        let d = other.get_message().unwrap();
        assert_eq!(d.payload(), Some(&99));
        assert_eq!(d.active_refs(), 1);
        d.release();
        assert_eq!(freed_count(&freed), 4);
    }

    // =============================================================================
    // SCENARIO 3: nobody listening
    // =============================================================================

    #[test]
    fn test_unsubscribed_type_is_freed_immediately() {
        let bus = Bus::new();
        let listener = Terminal::new(&bus);
        listener.subscribe("score");

        let freed = Arc::new(AtomicUsize::new(0));
        let outcome = bus.publish(tracked("explosion", (), &freed));

        assert!(outcome.is_unrouted());
        assert_eq!(outcome.delivered, 0);
        assert_eq!(freed_count(&freed), 1);
        assert_eq!(listener.inbox_len(), 0);
    }

    #[test]
    fn test_unsubscribed_type_via_inbound_queue() {
        let bus = Bus::new();
        let producer = Terminal::new(&bus);

        let freed = Arc::new(AtomicUsize::new(0));
        producer.post(tracked("explosion", (), &freed)).unwrap();
        assert_eq!(freed_count(&freed), 0);

        let report = bus.drain_and_publish();
        assert_eq!(report.unrouted, 1);
        assert_eq!(freed_count(&freed), 1);
    }

    // =============================================================================
    // SCENARIO 4: unsubscribe after delivery
    // =============================================================================

    #[test]
    fn test_unsubscribe_does_not_recall_queued_message() {
        let bus = Bus::new();
        let d = Terminal::named(&bus, "d");
        d.subscribe("alert");

        bus.publish(Message::new("alert", "reactor temperature"));
        d.unsubscribe("alert");
        assert!(!d.is_subscribed("alert"));

        let delivery = d.get_message().expect("queued before unsubscribe");
        assert_eq!(delivery.kind(), "alert");
        assert_eq!(delivery.payload(), Some(&"reactor temperature"));
        delivery.release();

        // Future publishes no longer arrive.
        let outcome = bus.publish(Message::new("alert", "second"));
        assert!(outcome.is_unrouted());
        assert!(d.get_message().is_none());
    }

    // =============================================================================
    // MIXED TRAFFIC
    // =============================================================================

    #[test]
    fn test_each_subscriber_sees_only_its_types() {
        let bus: Bus<u32> = Bus::new();
        let producer = Terminal::new(&bus);
        let scores = Terminal::new(&bus);
        let alerts = Terminal::new(&bus);
        let everything = Terminal::new(&bus);
        scores.subscribe("score");
        alerts.subscribe("alert");
        everything.subscribe(WILDCARD);

        let kinds = ["score", "alert", "score", "explosion", "alert", "score"];
        for (i, kind) in kinds.iter().enumerate() {
            producer.post(Message::new(*kind, i as u32)).unwrap();
        }
        bus.drain_and_publish();

        let drain = |t: &Terminal<u32>| -> Vec<(String, u32)> {
            std::iter::from_fn(|| t.get_message())
                .map(|d| (d.kind().to_string(), *d.payload().unwrap()))
                .collect()
        };

        assert_eq!(
            drain(&scores),
            vec![("score".into(), 0), ("score".into(), 2), ("score".into(), 5)]
        );
        assert_eq!(drain(&alerts), vec![("alert".into(), 1), ("alert".into(), 4)]);
        assert_eq!(drain(&everything).len(), kinds.len());
        assert!(drain(&producer).is_empty());
    }

    #[test]
    fn test_wildcard_and_exact_subscription_deliver_once() {
        let bus: Bus<()> = Bus::new();
        let t = Terminal::new(&bus);
        t.subscribe("score");
        t.subscribe(WILDCARD);

        let outcome = bus.publish(Message::signal("score"));
        assert_eq!(outcome.delivered, 1);
        assert_eq!(t.inbox_len(), 1);
    }
}
