//! Session actor driving the verification machine

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use av_shared::utils::mask_phone_number;

use crate::domain::entities::{SessionId, SessionStatus};
use crate::domain::value_objects::{FinalizeOutcome, InitiateOutcome};
use crate::errors::{VerificationError, VerificationResult};

use super::config::VerificationServiceConfig;
use super::machine::VerificationMachine;
use super::traits::{DeviceInfoTrait, TokenProviderTrait, VerificationTransportTrait};
use super::types::{MachineAction, SessionEvent, SessionSnapshot, Ticket};

const COMMAND_BUFFER: usize = 32;

type Reply = oneshot::Sender<VerificationResult<()>>;

enum Command {
    SubmitPhoneNumber { phone_number: String, reply: Reply },
    SubmitCode { code: String, reply: Reply },
    Resend { reply: Reply },
    Cancel { reply: Reply },
}

/// Completions delivered back onto the actor task
enum Completion {
    Initiate {
        ticket: Ticket,
        result: VerificationResult<InitiateOutcome>,
    },
    Finalize {
        ticket: Ticket,
        result: VerificationResult<FinalizeOutcome>,
    },
    Tick {
        session_id: SessionId,
    },
}

/// Verification service owning the single active session.
///
/// All state changes happen on one spawned task. Network calls run on worker
/// tasks and the countdown on a timer task; both report back through a
/// channel and are checked against the current session before they apply.
pub struct VerificationService {
    machine: VerificationMachine,
    token_provider: Arc<dyn TokenProviderTrait>,
    transport: Arc<dyn VerificationTransportTrait>,
    device_info: Option<Arc<dyn DeviceInfoTrait>>,
    config: VerificationServiceConfig,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    countdown: Option<JoinHandle<()>>,
    in_flight: Option<JoinHandle<()>>,
}

impl VerificationService {
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `token_provider` - Source of bearer tokens for initiate
    /// * `transport` - Verification backend client
    /// * `config` - Service configuration
    pub fn new(
        token_provider: Arc<dyn TokenProviderTrait>,
        transport: Arc<dyn VerificationTransportTrait>,
        config: VerificationServiceConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());

        let service = Self {
            machine: VerificationMachine::new(config.resend_cooldown),
            token_provider,
            transport,
            device_info: None,
            config,
            completions_tx,
            completions_rx,
            events_tx,
            snapshot_tx,
            countdown: None,
            in_flight: None,
        };
        (service, events_rx)
    }

    /// Attach a device metadata source for initiate requests
    pub fn with_device_info(mut self, device_info: Arc<dyn DeviceInfoTrait>) -> Self {
        self.device_info = Some(device_info);
        self
    }

    /// Start the actor on the current tokio runtime.
    ///
    /// The actor stops once every [`SessionHandle`] has been dropped.
    pub fn spawn(self) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = SessionHandle {
            commands: commands_tx,
            snapshots: self.snapshot_tx.subscribe(),
        };
        tokio::spawn(self.run(commands_rx));
        handle
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        tracing::debug!(event = "service_started", "Verification service started");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(completion) = self.completions_rx.recv() => self.handle_completion(completion),
            }
        }
        self.shutdown();
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SubmitPhoneNumber { phone_number, reply } => {
                let result = self.machine.submit_phone_number(&phone_number);
                self.respond(result, reply);
            }
            Command::SubmitCode { code, reply } => {
                let result = self.machine.submit_code(&code);
                self.respond(result, reply);
            }
            Command::Resend { reply } => {
                let result = self.machine.resend(now());
                self.respond(result, reply);
            }
            Command::Cancel { reply } => {
                let actions = self.machine.cancel();
                self.execute(actions);
                let _ = reply.send(Ok(()));
            }
        }
    }

    fn respond(&mut self, result: VerificationResult<Vec<MachineAction>>, reply: Reply) {
        let reply_result = match result {
            Ok(actions) => {
                self.execute(actions);
                Ok(())
            }
            Err(error) => {
                tracing::debug!(error = %error, event = "command_rejected", "Command rejected");
                Err(error)
            }
        };
        // The caller may have stopped waiting
        let _ = reply.send(reply_result);
    }

    fn handle_completion(&mut self, completion: Completion) {
        let actions = match completion {
            Completion::Initiate { ticket, result } => {
                self.machine.initiate_completed(ticket, result, now())
            }
            Completion::Finalize { ticket, result } => {
                self.machine.finalize_completed(ticket, result)
            }
            Completion::Tick { session_id } => self.machine.tick(session_id, now()),
        };
        self.execute(actions);
    }

    fn execute(&mut self, actions: Vec<MachineAction>) {
        for action in actions {
            match action {
                MachineAction::Initiate {
                    ticket,
                    phone_number,
                } => self.spawn_initiate(ticket, phone_number),
                MachineAction::Finalize {
                    ticket,
                    request_id,
                    code,
                } => self.spawn_finalize(ticket, request_id, code),
                MachineAction::StartCountdown { session_id } => self.start_countdown(session_id),
                MachineAction::StopCountdown => {
                    if let Some(countdown) = self.countdown.take() {
                        countdown.abort();
                    }
                }
                MachineAction::CancelInFlight => {
                    if let Some(in_flight) = self.in_flight.take() {
                        in_flight.abort();
                    }
                }
                MachineAction::Emit(event) => {
                    if self.events_tx.send(event).is_err() {
                        tracing::debug!(event = "event_dropped", "No event receiver attached");
                    }
                }
            }
        }
        self.snapshot_tx.send_replace(self.machine.snapshot(now()));
    }

    fn spawn_initiate(&mut self, ticket: Ticket, phone_number: String) {
        let token_provider = Arc::clone(&self.token_provider);
        let transport = Arc::clone(&self.transport);
        let customer_id = self.config.customer_id.clone();
        let metadata = match (&self.device_info, self.config.send_device_metadata) {
            (Some(device_info), true) => Some(device_info.collect()),
            _ => None,
        };
        let completions = self.completions_tx.clone();

        tracing::debug!(
            ticket = ticket.value(),
            phone = %mask_phone_number(&phone_number),
            with_metadata = metadata.is_some(),
            event = "initiate_dispatched",
            "Dispatching initiate request"
        );

        self.in_flight = Some(tokio::spawn(async move {
            let result = async {
                let token = token_provider.obtain_token(&customer_id).await?;
                transport
                    .initiate(&token, &phone_number, metadata.as_ref())
                    .await
            }
            .await;
            let _ = completions.send(Completion::Initiate { ticket, result });
        }));
    }

    fn spawn_finalize(&mut self, ticket: Ticket, request_id: String, code: String) {
        let transport = Arc::clone(&self.transport);
        let completions = self.completions_tx.clone();

        tracing::debug!(
            ticket = ticket.value(),
            event = "finalize_dispatched",
            "Dispatching finalize request"
        );

        self.in_flight = Some(tokio::spawn(async move {
            let result = transport.finalize(&request_id, &code).await;
            let _ = completions.send(Completion::Finalize { ticket, result });
        }));
    }

    fn start_countdown(&mut self, session_id: SessionId) {
        if let Some(previous) = self.countdown.take() {
            previous.abort();
        }

        let period = self.config.tick_interval;
        let completions = self.completions_tx.clone();
        self.countdown = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if completions.send(Completion::Tick { session_id }).is_err() {
                    break;
                }
            }
        }));
    }

    fn shutdown(&mut self) {
        for task in [self.countdown.take(), self.in_flight.take()].into_iter().flatten() {
            task.abort();
        }
        tracing::debug!(event = "service_stopped", "Verification service stopped");
    }
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

/// Cloneable handle to a running [`VerificationService`]
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Start verifying a sanitised phone number
    pub async fn submit_phone_number(&self, phone_number: impl Into<String>) -> VerificationResult<()> {
        let phone_number = phone_number.into();
        self.request(|reply| Command::SubmitPhoneNumber {
            phone_number,
            reply,
        })
        .await
    }

    /// Submit the code received by SMS
    pub async fn submit_code(&self, code: impl Into<String>) -> VerificationResult<()> {
        let code = code.into();
        self.request(|reply| Command::SubmitCode { code, reply }).await
    }

    /// Request a new code once the cooldown has elapsed
    pub async fn resend(&self) -> VerificationResult<()> {
        self.request(|reply| Command::Resend { reply }).await
    }

    /// Abandon the current session
    pub async fn cancel(&self) -> VerificationResult<()> {
        self.request(|reply| Command::Cancel { reply }).await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.snapshots.borrow().status
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    async fn request(&self, build: impl FnOnce(Reply) -> Command) -> VerificationResult<()> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| VerificationError::ServiceStopped)?;
        response.await.map_err(|_| VerificationError::ServiceStopped)?
    }
}
