//! # Delivery Semantics
//!
//! Ordering, capacity, drain-time membership, callback isolation and the
//! echo loopback, observed from Lua subscribers.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::integration::harness::Harness;

    const RECORDER: &str = r#"
        log = {}
        function record(topic, data)
            log[#log + 1] = topic .. "=" .. tostring(data)
        end
    "#;

    fn log(h: &Harness) -> Vec<String> {
        h.eval::<Vec<String>>("log")
    }

    // =========================================================================
    // FIFO & CAPACITY
    // =========================================================================

    #[test]
    fn test_fifo_across_topics() {
        let h = Harness::new();
        h.run(RECORDER);
        h.run(
            r#"
            ez.bus.subscribe("mesh/packet", record)
            ez.bus.subscribe("screen/pushed", record)
            ez.bus.post("screen/pushed", "a")
            ez.bus.post("mesh/packet", "b")
            ez.bus.post("screen/pushed", "c")
            "#,
        );
        h.bus().post("mesh/packet", "d");
        h.tick();

        assert_eq!(
            log(&h),
            vec![
                "screen/pushed=a",
                "mesh/packet=b",
                "screen/pushed=c",
                "mesh/packet=d"
            ]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_lua_sees_post_order(posts in proptest::collection::vec((0usize..2, 0u32..1000), 0..60)) {
            const TOPICS: [&str; 2] = ["a", "b"];
            let h = Harness::new();
            h.run(RECORDER);
            h.run("ez.bus.subscribe('a', record); ez.bus.subscribe('b', record)");

            for (topic, n) in &posts {
                h.bus().post(TOPICS[*topic], &n.to_string());
            }
            h.tick();

            let expected: Vec<String> = posts
                .iter()
                .map(|(topic, n)| format!("{}={n}", TOPICS[*topic]))
                .collect();
            prop_assert_eq!(log(&h), expected);
        }
    }

    #[test]
    fn test_capacity_bound() {
        let h = Harness::new();
        h.run(RECORDER);
        h.run(
            r#"
            ez.bus.subscribe("t", record)
            for i = 1, 70 do ez.bus.post("t", tostring(i)) end
            assert(ez.bus.pending_count() == 64)
            "#,
        );
        assert_eq!(h.bus().pending_count(), 64);

        let report = h.tick();
        assert_eq!(report.messages, 64);
        let seen = log(&h);
        assert_eq!(seen.len(), 64);
        assert_eq!(seen.first().map(String::as_str), Some("t=1"));
        assert_eq!(seen.last().map(String::as_str), Some("t=64"));

        // The six dropped posts never show up later.
        assert_eq!(h.tick().messages, 0);
        assert_eq!(h.bus().metrics().snapshot().dropped, 6);
    }

    // =========================================================================
    // MEMBERSHIP AT DRAIN TIME
    // =========================================================================

    #[test]
    fn test_late_subscribe_still_receives() {
        let h = Harness::new();
        h.run(RECORDER);
        h.run(
            r#"
            ez.bus.post("t", "x")
            ez.bus.subscribe("t", record)
            "#,
        );
        h.tick();
        assert_eq!(log(&h), vec!["t=x"]);
    }

    #[test]
    fn test_pre_drain_unsubscribe_suppresses_delivery() {
        let h = Harness::new();
        h.run(RECORDER);
        h.run(
            r#"
            local id = ez.bus.subscribe("t", record)
            ez.bus.post("t", "x")
            assert(ez.bus.unsubscribe(id))
            "#,
        );
        h.tick();
        assert!(log(&h).is_empty());
    }

    #[test]
    fn test_has_subscribers_lifecycle() {
        let h = Harness::new();
        h.run(
            r#"
            assert(ez.bus.has_subscribers("t") == false)
            local id = ez.bus.subscribe("t", function() end)
            assert(ez.bus.has_subscribers("t") == true)
            ez.bus.unsubscribe(id)
            assert(ez.bus.has_subscribers("t") == false)
            "#,
        );
    }

    #[test]
    fn test_subscribe_during_delivery_waits_for_next_message() {
        let h = Harness::new();
        h.run(RECORDER);
        h.run(
            r#"
            ez.bus.subscribe("t", function(topic, data)
                if data == "first" then ez.bus.subscribe("t", record) end
            end)
            ez.bus.post("t", "first")
            ez.bus.post("t", "second")
            "#,
        );
        h.tick();

        // Recipients are resolved per message: the new subscriber misses the
        // message that created it but sees the next one in the same drain.
        assert_eq!(log(&h), vec!["t=second"]);
    }

    // =========================================================================
    // ISOLATION
    // =========================================================================

    #[test]
    fn test_callback_isolation() {
        let h = Harness::new();
        h.run(RECORDER);
        h.run(
            r#"
            ez.bus.subscribe("t", function() error("subscriber exploded") end)
            ez.bus.subscribe("t", record)
            ez.bus.subscribe("u", record)
            ez.bus.post("t", "1")
            "#,
        );
        let report = h.tick();
        assert_eq!(report.failures, 1);
        assert_eq!(log(&h), vec!["t=1"]);

        h.run(r#"ez.bus.post("u", "2")"#);
        h.tick();
        assert_eq!(log(&h), vec!["t=1", "u=2"]);
    }

    #[test]
    fn test_callback_error_of_any_type_contained() {
        let h = Harness::new();
        h.run(RECORDER);
        h.run(
            r#"
            ez.bus.subscribe("t", function() error({ code = 7 }) end)
            ez.bus.subscribe("t", function() local x = nil; return x.field end)
            ez.bus.subscribe("t", record)
            ez.bus.post("t", "ok")
            "#,
        );
        let report = h.tick();
        assert_eq!(report.failures, 2);
        assert_eq!(log(&h), vec!["t=ok"]);
    }

    // =========================================================================
    // ECHO
    // =========================================================================

    #[test]
    fn test_echo_round_trip() {
        let h = Harness::new();
        h.run(RECORDER);
        h.run(
            r#"
            ez.bus.subscribe("bus/echo", record)
            ez.bus.post("bus/ping", "ping-1")
            "#,
        );

        h.tick();
        assert!(log(&h).is_empty());
        assert_eq!(h.bus().pending_count(), 1);

        h.tick();
        assert_eq!(log(&h), vec!["bus/echo=ping-1"]);
    }

    #[test]
    fn test_echo_of_table_degrades_to_empty_text() {
        let h = Harness::new();
        h.run(RECORDER);
        h.run(
            r#"
            ez.bus.subscribe("bus/echo", record)
            ez.bus.post("bus/ping", { "not", "text" })
            "#,
        );
        h.tick();
        h.tick();
        assert_eq!(log(&h), vec!["bus/echo="]);
    }
}
