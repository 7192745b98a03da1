use std::fmt;

use serde::Serialize;
use somfyrts_frame::{
    encode_frame, generate_waveform, Button, Frame, RemoteIdentity, RollingCode,
};
use somfyrts_store::RollingCodeStore;
use somfyrts_transport::Transmitter;
use tracing::{debug, info, warn};

use crate::config::{CommitPolicy, RemoteConfig};
use crate::error::{RemoteError, Result};

/// Where a send currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendState {
    Idle,
    Encoding,
    Transmitting,
    CommittingCode,
    Failed,
}

impl fmt::Display for SendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SendState::Idle => "idle",
            SendState::Encoding => "encoding",
            SendState::Transmitting => "transmitting",
            SendState::CommittingCode => "committing_code",
            SendState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful [`Remote::send`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SendReport {
    pub identity: RemoteIdentity,
    pub button: Button,
    /// Code carried by the transmitted frame.
    pub rolling_code: RollingCode,
    /// Code the next send will use.
    pub next_code: RollingCode,
    pub frame: Frame,
    pub pulses: usize,
    pub duration_us: u64,
    /// False when the new code could not be written. The in-memory code is
    /// still correct, but a restart before the next successful save would
    /// replay an old code.
    pub persisted: bool,
}

/// A simulated remote: one identity, its rolling code, and the pin it drives.
///
/// `send` takes `&mut self`, so a remote never has two sends in flight.
/// Remotes sharing a pin should share a
/// [`SharedTransmitter`](somfyrts_transport::SharedTransmitter).
pub struct Remote<S, T> {
    identity: RemoteIdentity,
    config: RemoteConfig,
    store: S,
    transmitter: T,
    code: RollingCode,
    state: SendState,
}

impl<S: RollingCodeStore, T: Transmitter> Remote<S, T> {
    /// Validate `config` and load the remote's current code from `store`.
    pub fn new(config: RemoteConfig, store: S, transmitter: T) -> Result<Self> {
        let identity = config.validate()?;
        let code = store.load(identity);
        debug!(%identity, %code, "remote ready");
        Ok(Self {
            identity,
            config,
            store,
            transmitter,
            code,
            state: SendState::Idle,
        })
    }

    pub fn identity(&self) -> RemoteIdentity {
        self.identity
    }

    /// Code the next send will transmit.
    pub fn rolling_code(&self) -> RollingCode {
        self.code
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn transmitter(&self) -> &T {
        &self.transmitter
    }

    pub fn transmitter_mut(&mut self) -> &mut T {
        &mut self.transmitter
    }

    pub fn into_parts(self) -> (S, T) {
        (self.store, self.transmitter)
    }

    /// Press `button` once.
    ///
    /// Blocks for the whole waveform. On transmitter failure the rolling code
    /// is left untouched (under [`CommitPolicy::AfterTransmit`]) and the error
    /// is returned. A failed save after a good transmission is logged and
    /// flagged in the report but is not an error.
    pub fn send(&mut self, button: Button) -> Result<SendReport> {
        let code = self.code;
        let Some(next) = code.successor() else {
            return Err(RemoteError::CodeExhausted(code));
        };
        debug!(identity = %self.identity, %code, %button, "send");

        self.transition(SendState::Encoding);
        let frame = encode_frame(self.identity, code, button);
        let waveform = match generate_waveform(&frame, self.config.repetitions, self.config.pin)
        {
            Ok(waveform) => waveform,
            Err(err) => return Err(self.fail(err.into())),
        };

        if self.config.commit_policy == CommitPolicy::ReserveBeforeTransmit {
            if let Err(err) = self.store.save(self.identity, next) {
                return Err(self.fail(err.into()));
            }
            self.code = next;
        }

        self.transition(SendState::Transmitting);
        if let Err(err) = self
            .transmitter
            .transmit(&waveform, self.config.transmit_timeout)
        {
            return Err(self.fail(err.into()));
        }

        self.transition(SendState::CommittingCode);
        let persisted = match self.config.commit_policy {
            CommitPolicy::AfterTransmit => {
                self.code = next;
                match self.store.save(self.identity, self.code) {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(
                            identity = %self.identity,
                            code = %self.code,
                            error = %err,
                            "rolling code not persisted; receiver may desync after restart"
                        );
                        false
                    }
                }
            }
            CommitPolicy::ReserveBeforeTransmit => true,
        };
        self.transition(SendState::Idle);

        info!(
            identity = %self.identity,
            %button,
            %code,
            next = %self.code,
            persisted,
            "sent"
        );

        Ok(SendReport {
            identity: self.identity,
            button,
            rolling_code: code,
            next_code: self.code,
            frame,
            pulses: waveform.len(),
            duration_us: waveform.total_duration().as_micros() as u64,
            persisted,
        })
    }

    /// Set the rolling code by hand, e.g. after the receiver's window was
    /// exceeded. Moving backwards requires `force`.
    pub fn resync(&mut self, code: RollingCode, force: bool) -> Result<()> {
        if code < self.code && !force {
            return Err(RemoteError::CodeRegression {
                current: self.code,
                requested: code,
            });
        }
        self.store.save(self.identity, code)?;
        info!(identity = %self.identity, from = %self.code, to = %code, "rolling code resynced");
        self.code = code;
        Ok(())
    }

    fn transition(&mut self, next: SendState) {
        debug!(identity = %self.identity, from = %self.state, to = %next, "state");
        self.state = next;
    }

    fn fail(&mut self, err: RemoteError) -> RemoteError {
        self.transition(SendState::Failed);
        warn!(identity = %self.identity, code = %self.code, error = %err, "send failed");
        self.transition(SendState::Idle);
        err
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use somfyrts_frame::decode_frame;
    use somfyrts_store::MemoryStore;
    use somfyrts_transport::{DryRunTransmitter, SharedTransmitter, TransportError};

    use super::*;

    const ID: u32 = 0x123456;

    fn identity() -> RemoteIdentity {
        RemoteIdentity::new(ID).unwrap()
    }

    fn remote_with(
        store: Arc<MemoryStore>,
        config: RemoteConfig,
    ) -> Remote<Arc<MemoryStore>, DryRunTransmitter> {
        Remote::new(config, store, DryRunTransmitter::new()).unwrap()
    }

    /// Decode the frame carried by a recorded waveform (first repetition).
    fn sent_code(waveform: &somfyrts_frame::Waveform) -> u16 {
        // wake (2) + 2 hw sync pairs (4) + sw sync (2)
        let payload = &waveform.pulses()[8..8 + 112];
        let mut bytes = [0u8; 7];
        for (i, half_bits) in payload.chunks(2).enumerate() {
            if half_bits[1].is_asserted() {
                bytes[i / 8] |= 1 << (7 - i % 8);
            }
        }
        decode_frame(&Frame::from_bytes(bytes)).unwrap().rolling_code
    }

    #[test]
    fn fresh_remote_starts_at_one() {
        let remote = remote_with(Arc::new(MemoryStore::new()), RemoteConfig::new(ID));
        assert_eq!(remote.rolling_code(), RollingCode::INITIAL);
        assert_eq!(remote.state(), SendState::Idle);
    }

    #[test]
    fn invalid_identity_is_fatal_at_construction() {
        let result = Remote::new(
            RemoteConfig::new(0x1_000_000),
            MemoryStore::new(),
            DryRunTransmitter::new(),
        );
        assert!(matches!(result, Err(RemoteError::Configuration(_))));
    }

    #[test]
    fn consecutive_sends_are_monotonic_and_persisted() {
        let store = Arc::new(MemoryStore::new());
        store.save(identity(), RollingCode::new(40)).unwrap();
        let mut remote = remote_with(Arc::clone(&store), RemoteConfig::new(ID));

        let buttons = [Button::Up, Button::My, Button::Down, Button::Up, Button::Prog];
        for (offset, button) in buttons.into_iter().enumerate() {
            let report = remote.send(button).unwrap();
            assert_eq!(report.rolling_code, RollingCode::new(40 + offset as u32));
            assert_eq!(report.next_code, RollingCode::new(41 + offset as u32));
            assert!(report.persisted);
            assert_eq!(report.pulses, 508);
        }

        assert_eq!(store.load(identity()), RollingCode::new(45));
        let codes: Vec<u16> = remote.transmitter().sent().iter().map(sent_code).collect();
        assert_eq!(codes, vec![40, 41, 42, 43, 44]);
    }

    #[test]
    fn transmission_failure_does_not_advance_code() {
        let store = Arc::new(MemoryStore::new());
        let mut remote = remote_with(Arc::clone(&store), RemoteConfig::new(ID));
        remote.send(Button::Up).unwrap();

        remote.transmitter_mut().fail_next("rf fault");
        let err = remote.send(Button::Down).unwrap_err();
        assert!(matches!(
            err,
            RemoteError::Transmission(TransportError::Driver(_))
        ));
        assert_eq!(remote.state(), SendState::Idle);
        assert_eq!(remote.rolling_code(), RollingCode::new(2));
        assert_eq!(store.load(identity()), RollingCode::new(2));

        let report = remote.send(Button::Down).unwrap();
        assert_eq!(report.rolling_code, RollingCode::new(2));
    }

    #[test]
    fn hung_transmitter_times_out_without_advancing() {
        let store = Arc::new(MemoryStore::new());
        let config = RemoteConfig::new(ID).with_transmit_timeout(Duration::from_millis(20));
        let mut remote = remote_with(Arc::clone(&store), config);

        remote.transmitter_mut().set_stuck(true);
        let err = remote.send(Button::Up).unwrap_err();
        assert!(matches!(
            err,
            RemoteError::Transmission(TransportError::Timeout(_))
        ));
        assert_eq!(remote.rolling_code(), RollingCode::INITIAL);
        assert!(store.read(identity()).unwrap().is_none());
    }

    #[test]
    fn persistence_failure_keeps_in_memory_code_authoritative() {
        let store = Arc::new(MemoryStore::new());
        let mut remote = remote_with(Arc::clone(&store), RemoteConfig::new(ID));
        remote.send(Button::Up).unwrap();

        store.set_fail_writes(true);
        let report = remote.send(Button::Up).unwrap();
        assert!(!report.persisted);
        assert_eq!(report.next_code, RollingCode::new(3));
        assert_eq!(store.load(identity()), RollingCode::new(2));

        store.set_fail_writes(false);
        let report = remote.send(Button::Up).unwrap();
        assert_eq!(report.rolling_code, RollingCode::new(3));
        assert!(report.persisted);
        assert_eq!(store.load(identity()), RollingCode::new(4));
    }

    #[test]
    fn reserve_policy_persists_before_transmitting() {
        let store = Arc::new(MemoryStore::new());
        let config = RemoteConfig::new(ID).with_commit_policy(CommitPolicy::ReserveBeforeTransmit);
        let mut remote = remote_with(Arc::clone(&store), config);

        let report = remote.send(Button::Up).unwrap();
        assert_eq!(report.rolling_code, RollingCode::new(1));
        assert_eq!(store.load(identity()), RollingCode::new(2));

        // A failed transmission still burns the reserved code.
        remote.transmitter_mut().fail_next("rf fault");
        assert!(remote.send(Button::Up).is_err());
        assert_eq!(remote.rolling_code(), RollingCode::new(3));
        assert_eq!(store.load(identity()), RollingCode::new(3));
    }

    #[test]
    fn reserve_policy_refuses_to_transmit_without_persistence() {
        let store = Arc::new(MemoryStore::new());
        let config = RemoteConfig::new(ID).with_commit_policy(CommitPolicy::ReserveBeforeTransmit);
        let mut remote = remote_with(Arc::clone(&store), config);

        store.set_fail_writes(true);
        let err = remote.send(Button::Up).unwrap_err();
        assert!(matches!(err, RemoteError::Persistence(_)));
        assert!(remote.transmitter().sent().is_empty());
        assert_eq!(remote.rolling_code(), RollingCode::INITIAL);
    }

    #[test]
    fn restart_resumes_from_persisted_code() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut remote = remote_with(Arc::clone(&store), RemoteConfig::new(ID));
            for _ in 0..3 {
                remote.send(Button::Up).unwrap();
            }
        }
        let remote = remote_with(Arc::clone(&store), RemoteConfig::new(ID));
        assert_eq!(remote.rolling_code(), RollingCode::new(4));
    }

    #[test]
    fn resync_refuses_regression_unless_forced() {
        let store = Arc::new(MemoryStore::new());
        store.save(identity(), RollingCode::new(100)).unwrap();
        let mut remote = remote_with(Arc::clone(&store), RemoteConfig::new(ID));

        assert!(matches!(
            remote.resync(RollingCode::new(50), false),
            Err(RemoteError::CodeRegression { .. })
        ));
        remote.resync(RollingCode::new(150), false).unwrap();
        assert_eq!(store.load(identity()), RollingCode::new(150));

        remote.resync(RollingCode::new(50), true).unwrap();
        assert_eq!(remote.rolling_code(), RollingCode::new(50));
    }

    #[test]
    fn exhausted_counter_refuses_to_send() {
        let store = Arc::new(MemoryStore::new());
        store.save(identity(), RollingCode::new(u32::MAX)).unwrap();
        let mut remote = remote_with(Arc::clone(&store), RemoteConfig::new(ID));

        assert!(matches!(
            remote.send(Button::Up),
            Err(RemoteError::CodeExhausted(code)) if code == RollingCode::new(u32::MAX)
        ));
        assert!(remote.transmitter().sent().is_empty());
        assert_eq!(remote.state(), SendState::Idle);

        remote.resync(RollingCode::INITIAL, true).unwrap();
        assert_eq!(remote.send(Button::Up).unwrap().rolling_code, RollingCode::INITIAL);
    }

    #[test]
    fn custom_repetitions_shorten_the_waveform() {
        let config = RemoteConfig::new(ID).with_repetitions(1).with_pin(17);
        let mut remote = remote_with(Arc::new(MemoryStore::new()), config);
        let report = remote.send(Button::Prog).unwrap();
        assert_eq!(report.pulses, 121);
        assert_eq!(remote.transmitter().sent()[0].pin(), 17);
    }

    #[test]
    fn remotes_on_one_pin_share_a_transmitter() {
        let store = Arc::new(MemoryStore::new());
        let pin = SharedTransmitter::new(DryRunTransmitter::new());

        let mut living_room =
            Remote::new(RemoteConfig::new(0x000001), Arc::clone(&store), pin.clone()).unwrap();
        let mut bedroom =
            Remote::new(RemoteConfig::new(0x000002), Arc::clone(&store), pin.clone()).unwrap();

        living_room.send(Button::Down).unwrap();
        bedroom.send(Button::Down).unwrap();
        living_room.send(Button::Up).unwrap();

        assert_eq!(pin.lock().unwrap().sent().len(), 3);
        assert_eq!(store.load(RemoteIdentity::new(1).unwrap()), RollingCode::new(3));
        assert_eq!(store.load(RemoteIdentity::new(2).unwrap()), RollingCode::new(2));
    }

    #[test]
    fn report_serializes_for_cli_output() {
        let mut remote = remote_with(Arc::new(MemoryStore::new()), RemoteConfig::new(ID));
        let report = remote.send(Button::Up).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["identity"], ID);
        assert_eq!(json["button"], "up");
        assert_eq!(json["rolling_code"], 1);
        assert_eq!(json["frame"], "a78e8e8fd9edff");
        assert_eq!(json["persisted"], true);
    }
}
