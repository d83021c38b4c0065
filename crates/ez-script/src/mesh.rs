//! Mesh producers.
//!
//! Radio callbacks run outside the script thread, so packet tables are built
//! lazily: the producer copies the packet into a builder, and the table is
//! created inside the drain. Binary fields become Lua strings.

use std::time::{Duration, Instant};

use ez_bus::{topics, BusError, GroupPacket, MeshPacket, NodeDiscovered, ScriptHost};
use mlua::RegistryKey;

use crate::host::LuaHost;
use crate::ScriptBus;

/// Post a node advert on `mesh/node_discovered`.
///
/// The record is serialized now; its `age_seconds` is advanced by the time
/// spent in the queue when the table is built.
pub fn post_node_discovered(bus: &ScriptBus, node: &NodeDiscovered) -> Result<(), BusError> {
    let record = serde_json::to_value(node)?;
    let age = node.age_seconds;
    let posted_at = Instant::now();
    bus.post_deferred(topics::MESH_NODE_DISCOVERED, move |host: &LuaHost| {
        node_table(host, record, age, posted_at.elapsed())
    });
    Ok(())
}

/// Post a group channel packet on `mesh/group_packet`.
pub fn post_group_packet(bus: &ScriptBus, packet: GroupPacket) {
    bus.post_deferred(topics::MESH_GROUP_PACKET, move |host: &LuaHost| {
        group_packet_table(host, &packet)
    });
}

/// Post a parsed packet on `mesh/packet`.
pub fn post_mesh_packet(bus: &ScriptBus, packet: MeshPacket) {
    bus.post_deferred(topics::MESH_PACKET, move |host: &LuaHost| {
        mesh_packet_table(host, &packet)
    });
}

fn node_table(
    host: &LuaHost,
    mut record: serde_json::Value,
    age: u32,
    queued: Duration,
) -> mlua::Result<RegistryKey> {
    let waited = u32::try_from(queued.as_secs()).unwrap_or(u32::MAX);
    record["age_seconds"] = age.saturating_add(waited).into();
    host.import(&record)
}

fn group_packet_table(host: &LuaHost, packet: &GroupPacket) -> mlua::Result<RegistryKey> {
    let table = host.create_table()?;
    table.set("channel_hash", packet.channel_hash)?;
    table.set("data", host.create_string(&packet.data)?)?;
    table.set("sender_hash", packet.sender_hash)?;
    table.set("rssi", packet.rssi)?;
    table.set("snr", packet.snr)?;
    host.create_registry_value(table)
}

fn mesh_packet_table(host: &LuaHost, packet: &MeshPacket) -> mlua::Result<RegistryKey> {
    let table = host.create_table()?;
    table.set("route_type", packet.route_type)?;
    table.set("payload_type", packet.payload_type)?;
    table.set("version", packet.version)?;
    table.set("path", host.create_string(&packet.path)?)?;
    table.set("payload", host.create_string(&packet.payload)?)?;
    table.set("rssi", packet.rssi)?;
    table.set("snr", packet.snr)?;
    table.set("timestamp", packet.timestamp)?;
    host.create_registry_value(table)
}
