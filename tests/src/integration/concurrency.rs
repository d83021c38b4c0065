//! # Cross-Thread Producers
//!
//! Native producers post from their own threads while the script thread
//! drains. Native subscribers run on the script thread too.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use ez_bus::{topics, BusConfig, GroupPacket, NodeDiscovered, UiEvent};
    use ez_script::{post_group_packet, post_node_discovered, LuaHost};
    use parking_lot::Mutex;

    use crate::integration::harness::Harness;

    #[test]
    fn test_producers_interleave_with_drains() {
        let h = Harness::with_config(BusConfig {
            queue_capacity: 4096,
            ..BusConfig::default()
        });
        h.run(r#"count = 0; ez.bus.subscribe("radio/rx", function() count = count + 1 end)"#);

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let bus = Arc::clone(h.bus());
                thread::spawn(move || {
                    for i in 0..250 {
                        bus.post("radio/rx", &format!("{p}-{i}"));
                        if i % 50 == 0 {
                            thread::sleep(Duration::from_millis(1));
                        }
                    }
                })
            })
            .collect();

        // Drain while the producers are still running.
        while producers.iter().any(|p| !p.is_finished()) {
            h.tick();
        }
        for producer in producers {
            producer.join().unwrap();
        }
        h.tick();

        assert_eq!(h.eval::<i64>("count"), 1000);
        assert_eq!(h.bus().metrics().snapshot().dropped, 0);
    }

    #[test]
    fn test_native_subscriber_runs_before_scripts() {
        let h = Harness::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let native_order = Arc::clone(&order);
        h.bus().subscribe_native(topics::SETTINGS_CHANGED, move |host: &LuaHost, _, data| {
            let seen_by_script: bool = host.globals().get("script_ran").unwrap_or(false);
            native_order
                .lock()
                .push(format!("native:{}:{seen_by_script}", data.as_str().unwrap_or("")));
        });
        h.run(r#"ez.bus.subscribe("settings/changed", function() script_ran = true end)"#);

        h.bus().post_ui(&UiEvent::SettingChanged {
            name: "brightness".into(),
            value: "80".into(),
        });
        h.tick();

        assert_eq!(*order.lock(), vec!["native:brightness=80:false"]);
        assert!(h.eval::<bool>("script_ran"));
    }

    #[test]
    fn test_mesh_producers_from_radio_thread() {
        let h = Harness::new();
        h.run(
            r#"
            ez.bus.subscribe("mesh/node_discovered", function(_, n) node_name = n.name end)
            ez.bus.subscribe("mesh/group_packet", function(_, p) group_len = #p.data end)
            "#,
        );

        let bus = Arc::clone(h.bus());
        thread::spawn(move || {
            let node = NodeDiscovered {
                path_hash: 1,
                name: "hilltop".into(),
                rssi: -70.0,
                snr: 8.0,
                role: 2,
                advert_timestamp: 10,
                age_seconds: 0,
                last_seen: 10,
                pub_key_hex: None,
                has_location: false,
                lat: None,
                lon: None,
            };
            post_node_discovered(&bus, &node).unwrap();
            post_group_packet(
                &bus,
                GroupPacket {
                    channel_hash: 9,
                    data: vec![1, 2, 3, 4],
                    sender_hash: 3,
                    rssi: -70.0,
                    snr: 8.0,
                },
            );
        })
        .join()
        .unwrap();

        h.tick();
        assert_eq!(h.eval::<String>("node_name"), "hilltop");
        assert_eq!(h.eval::<i64>("group_len"), 4);
    }

    #[test]
    fn test_bus_outlives_script_runtime() {
        let delivered = Arc::new(AtomicUsize::new(0));
        let bus = {
            let h = Harness::new();
            h.run(r#"ez.bus.subscribe("t", function() end)"#);
            let counter = Arc::clone(&delivered);
            h.bus().subscribe_native("t", move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            h.bus().post_foreign("t", h.runtime().lua().create_registry_value(1).unwrap());
            Arc::clone(h.bus())
        };

        // The Lua state is gone; dropping its keys must still be safe.
        assert_eq!(bus.pending_count(), 1);
        bus.clear_all();
        assert_eq!(bus.pending_count(), 0);
        assert_eq!(delivered.load(Ordering::SeqCst), 0);
    }
}
