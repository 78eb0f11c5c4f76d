//! Basic stack wiring example
//!
//! This example shows how the pieces fit together on a host:
//! - A RAM-backed parameter store shared by the stack and the engine adapter
//! - A loopback engine standing in for a real LoRaWAN MAC
//! - OTAA join with hex credentials
//! - Periodic one-byte uplinks with a completion callback
//!
//! On a device the loopback engine is replaced by a binding to the real MAC
//! and the store by a driver for EEPROM, FRAM or flash.

use lorastack::{
    config::{FrequencyPlan, StackConfig},
    engine::{EngineEvent, MacEngine, Provisioning, StoreAdapter},
    store::{RamStore, SessionInfo},
    stack::LoraStack,
};

// Replace with your own from the network console
const DEV_EUI: &str = "0001020304050607";
const APP_EUI: &str = "0001020304050607";
const APP_KEY: &str = "000102030405060708090A0B0C0D0E0F";

/// Engine that joins immediately and acknowledges every uplink
struct LoopbackEngine<P: Provisioning> {
    provisioning: P,
    pending: Option<EngineEvent>,
    fcnt_up: u32,
}

impl<P: Provisioning> LoopbackEngine<P> {
    fn new(provisioning: P) -> Self {
        Self {
            provisioning,
            pending: None,
            fcnt_up: 0,
        }
    }
}

impl<P: Provisioning> MacEngine for LoopbackEngine<P> {
    type Error = ();

    fn begin(&mut self, config: &StackConfig) -> bool {
        println!("engine: begin {:?}", config.frequency_plan);
        if let Some(session) = self.provisioning.saved_session_info() {
            self.fcnt_up = session.fcnt_up;
        }
        true
    }

    fn start_joining(&mut self) -> bool {
        let Some(otaa) = self.provisioning.otaa_provisioning_info() else {
            return false;
        };
        println!("engine: joining as DevEUI (LSB) {:02x?}", otaa.dev_eui);
        let session = SessionInfo::new(0x13, 0x2601_1BDA, [0x11; 16], [0x22; 16]);
        self.provisioning.save_session_info(&session);
        self.pending = Some(EngineEvent::Joined);
        true
    }

    fn send_buffer(&mut self, payload: &[u8], port: u8, _confirmed: bool) -> nb::Result<(), ()> {
        if self.pending.is_some() {
            return Err(nb::Error::WouldBlock);
        }
        println!("engine: uplink {:02x?} on port {}", payload, port);
        self.fcnt_up += 1;
        self.provisioning.save_fcnt_up(self.fcnt_up);
        self.pending = Some(EngineEvent::TxComplete { success: true });
        Ok(())
    }

    fn poll(&mut self) -> Option<EngineEvent> {
        self.pending.take()
    }
}

fn on_joined(success: bool) {
    println!("app: joined = {}", success);
}

fn on_sent(success: bool) {
    println!("app: sent = {}", success);
}

fn on_message(payload: &[u8], port: u8) {
    println!("app: received {:02x?} on port {}", payload, port);
}

fn main() {
    let store: RamStore<16> = RamStore::new();
    let config = StackConfig::new(FrequencyPlan::US915);

    let engine = LoopbackEngine::new(StoreAdapter::new(&store, config.net_id));
    let mut stack = LoraStack::new(engine, &store, config);

    stack.on_join(on_joined);
    stack.on_message(on_message);

    if let Err(e) = stack.join_with(APP_EUI, DEV_EUI, APP_KEY) {
        eprintln!("Failed to provision device: {}", e);
        std::process::exit(1);
    }

    let mut led_on = false;
    for _ in 0..5 {
        // Call often to do LoRaWAN work
        stack.service();

        led_on = !led_on;
        let payload = [led_on as u8];
        match stack.send_bytes(&payload, 1, false, Some(on_sent)) {
            Ok(()) => {}
            Err(e) => println!("app: {}", e),
        }
        stack.service();
    }
}
