//! Two remotes sharing one emitter.
//!
//! Each remote keeps its own identity and rolling code, while the shared
//! transmitter guarantees their waveforms never overlap on the pin.
//!
//! ```text
//! cargo run -p somfyrts --example shared-pin
//! ```

use std::sync::Arc;
use std::thread;

use somfyrts::frame::Button;
use somfyrts::remote::{Remote, RemoteConfig};
use somfyrts::store::MemoryStore;
use somfyrts::transport::{DryRunTransmitter, SharedTransmitter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let emitter = SharedTransmitter::new(DryRunTransmitter::new());

    let living_room = Remote::new(RemoteConfig::new(0x11_2233), store.clone(), emitter.clone())?;
    let bedroom = Remote::new(RemoteConfig::new(0x44_5566), store.clone(), emitter.clone())?;

    let handles: Vec<_> = [(living_room, Button::Down), (bedroom, Button::Up)]
        .into_iter()
        .map(|(mut remote, button)| {
            thread::spawn(move || -> Result<(), somfyrts::remote::RemoteError> {
                for _ in 0..3 {
                    let report = remote.send(button)?;
                    println!(
                        "{:#08x} {:<4} code {:>3} frame {}",
                        report.identity, report.button, report.rolling_code, report.frame
                    );
                }
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        handle
            .join()
            .map_err(|_| "sender thread panicked")??;
    }

    let sent = emitter.lock()?.sent().len();
    println!("{sent} waveforms played on the shared pin");
    Ok(())
}
