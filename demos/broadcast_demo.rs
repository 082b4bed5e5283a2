//! Group broadcast and keep-alive walkthrough over in-memory connections
//!
//! Run with: cargo run --example broadcast_demo
//!
//! No sockets involved: a handful of in-memory connections join a
//! server group, chat through the message handler (which re-broadcasts,
//! exercising reentrant traversal), then a couple of probe ticks reap
//! the member that never answers, and the group closes down.

use std::time::Duration;

use bytes::Bytes;

use ws_group::{Connection, Group, GroupConfig, LoopContext, OpCode, PreparedMessage, Role, UpgradeInfo};

/// In-memory stand-in for a transport-owned connection
struct DemoConn {
    name: &'static str,
}

impl Connection for DemoConn {
    fn send_prepared(&mut self, msg: &PreparedMessage) {
        println!(
            "  -> {} receives {:?} frame ({} bytes on the wire)",
            self.name,
            msg.opcode(),
            msg.frame().len()
        );
    }

    fn terminate(&mut self) {
        println!("  !! {} hard-terminated", self.name);
    }

    fn close(&mut self, code: u16, reason: &[u8]) {
        println!(
            "  -- {} sent close frame {} ({})",
            self.name,
            code,
            String::from_utf8_lossy(reason)
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ws_group=debug".into()),
        )
        .init();

    let config = GroupConfig::default()
        .ping_interval(Duration::from_secs(10))
        .ping_payload(Bytes::from_static(b"still there?"));
    let mut group = Group::new(Role::Server, config, LoopContext::default());

    group.on_connection(|group, _id, info| {
        println!("connection established on {} ({} members)", info.path, group.len());
    });
    group.on_message(|group, _id, data, opcode| {
        println!("message received, re-broadcasting to {} members", group.len());
        let payload = data.to_vec();
        group.broadcast(&payload, opcode);
    });
    group.on_disconnection(|group, _id, code, _reason| {
        println!("member left with code {} ({} remain)", code, group.len());
    });

    let info = UpgradeInfo {
        path: "/chat".into(),
        host: "localhost".into(),
    };
    let alice = group.handle_connection(DemoConn { name: "alice" }, &info);
    let bob = group.handle_connection(DemoConn { name: "bob" }, &info);
    let _carol = group.handle_connection(DemoConn { name: "carol" }, &info);

    println!("\n--- alice says hello (handler re-broadcasts) ---");
    group.handle_message(alice, b"hello everyone", OpCode::Text);

    println!("\n--- probe tick 1: everyone gets the custom ping ---");
    group.on_probe_tick();

    println!("\n--- alice and carol answer; bob stays silent ---");
    group.handle_pong(alice, b"");
    group.acknowledge_pong(_carol);

    println!("\n--- probe tick 2: bob is reaped, survivors pinged ---");
    group.on_probe_tick();
    assert!(!group.contains(bob));

    println!("\n--- graceful close ---");
    group.close(1001, b"demo over");
    println!("done, {} members still in close handshake", group.len());
}
