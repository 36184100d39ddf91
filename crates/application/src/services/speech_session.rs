//! Speech session - Request/response façade over the event-driven engine
//!
//! A session owns one pending request table, one pipeline controller and one
//! event loop task. Every caller request registers in the table before it
//! reaches the engine; the event loop completes it when the matching engine
//! event arrives.
//!
//! ```text
//! caller ──► SpeechSession ──► PipelineController ──► engine
//!                 ▲                                     │ events
//!                 │ oneshot                             ▼
//!          PendingRequests ◄── EventCoordinator ◄── event loop ──► NotificationPublisher ──► host
//! ```

use std::fmt;
use std::sync::Arc;

use domain::entities::{
    ClassificationResult, EngineEvent, FeatureSet, SessionConfig, SynthesisRequest,
};
use domain::value_objects::{Credentials, OperationKind, SessionId, TtsFormat};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{
    AudioPlayerPort, EngineEventSink, EngineFactoryPort, HostBridgePort, ModelCachePort,
    ModelDownloaderPort, NetworkMonitorPort,
};
use crate::services::{
    AssetProvisioner, ConfigTranslator, Dispatch, DuplicateRequestPolicy, EventCoordinator,
    InitializationGate, NotificationPublisher, PendingRequests, PipelineController,
    PipelinePhase, RequestOutcome, TranslatedConfig,
};

/// Adapters a session is wired with
#[derive(Clone)]
pub struct SessionDependencies {
    pub engine_factory: Arc<dyn EngineFactoryPort>,
    pub model_cache: Arc<dyn ModelCachePort>,
    pub model_downloader: Arc<dyn ModelDownloaderPort>,
    pub network_monitor: Arc<dyn NetworkMonitorPort>,
    pub host_bridge: Arc<dyn HostBridgePort>,
    pub audio_player: Arc<dyn AudioPlayerPort>,
}

impl fmt::Debug for SessionDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionDependencies").finish_non_exhaustive()
    }
}

/// Behavioural options for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub duplicate_requests: DuplicateRequestPolicy,
}

/// One speech session
///
/// Dropping the session stops a built engine and rejects requests that are
/// still pending with `SessionClosed`.
pub struct SpeechSession {
    id: SessionId,
    translator: ConfigTranslator,
    provisioner: AssetProvisioner,
    controller: Arc<PipelineController>,
    pending: Arc<PendingRequests>,
    events: EngineEventSink,
    event_loop: JoinHandle<()>,
    provisioning: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for SpeechSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechSession")
            .field("id", &self.id)
            .field("phase", &self.controller.phase())
            .field("pending", &self.pending.pending_kinds())
            .finish_non_exhaustive()
    }
}

impl SpeechSession {
    /// Create a session and spawn its event loop
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(dependencies: SessionDependencies, options: SessionOptions) -> Self {
        let id = SessionId::new();
        let (events, receiver) = EngineEventSink::channel();
        let pending = Arc::new(PendingRequests::new(options.duplicate_requests));
        let controller = Arc::new(PipelineController::new(dependencies.engine_factory));
        let coordinator = EventCoordinator::new(
            Arc::clone(&pending),
            dependencies.audio_player,
            events.clone(),
        );
        let publisher = NotificationPublisher::new(dependencies.host_bridge);

        let event_loop = tokio::spawn(
            run_event_loop(receiver, Arc::clone(&controller), coordinator, publisher)
                .instrument(info_span!("speech_session", session_id = %id)),
        );

        info!(session_id = %id, policy = ?pending.policy(), "Speech session created");

        Self {
            id,
            translator: ConfigTranslator::new(),
            provisioner: AssetProvisioner::new(
                dependencies.model_cache,
                dependencies.model_downloader,
                dependencies.network_monitor,
            ),
            controller,
            pending,
            events,
            event_loop,
            provisioning: Mutex::new(None),
        }
    }

    pub const fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> PipelinePhase {
        self.controller.phase()
    }

    /// Features the engine was built with
    pub fn features(&self) -> FeatureSet {
        self.controller.features()
    }

    /// Kinds of request currently awaiting an engine event
    pub fn pending_kinds(&self) -> Vec<OperationKind> {
        self.pending.pending_kinds()
    }

    /// Translate the configuration, provision its models and build the engine
    ///
    /// Resolves once the engine is built. Calling it again after a successful
    /// build resolves immediately without rebuilding; after a failed build it
    /// fails with `SessionFailed`.
    #[instrument(skip(self, client_secret, config), fields(session_id = %self.id))]
    pub async fn initialize(
        &self,
        client_id: &str,
        client_secret: &str,
        config: &SessionConfig,
    ) -> Result<(), ApplicationError> {
        let credentials = Credentials::new(client_id, client_secret)?;
        let translated = self.translator.translate(credentials, config)?;

        match self.controller.phase() {
            phase if phase.is_built() => {
                debug!("Engine already built");
                return Ok(());
            },
            PipelinePhase::Failed => {
                if let InitializationGate::Failed(cause) = self.controller.begin_initialization() {
                    return Err(ApplicationError::SessionFailed(cause));
                }
            },
            _ => {},
        }

        let request = self.pending.register(OperationKind::Initialize)?;

        match self.controller.begin_initialization() {
            InitializationGate::Begin => {
                info!(
                    assets = translated.asset_requests.len(),
                    "Provisioning models"
                );
                let task = tokio::spawn(
                    provision_and_build(
                        self.provisioner.clone(),
                        Arc::clone(&self.controller),
                        translated,
                        self.events.clone(),
                    )
                    .instrument(info_span!("provisioning", session_id = %self.id)),
                );
                *self.provisioning.lock() = Some(task);
            },
            InitializationGate::InProgress => {
                debug!("Joining initialization already in progress");
            },
            InitializationGate::AlreadyBuilt => {
                self.pending
                    .resolve(OperationKind::Initialize, RequestOutcome::Completed);
            },
            InitializationGate::Failed(cause) => {
                self.pending
                    .reject(OperationKind::Initialize, ApplicationError::SessionFailed(cause));
            },
        }

        request.wait().await.map(|_| ())
    }

    /// Start the pipeline; resolves when the engine reports it started
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn start(&self) -> Result<(), ApplicationError> {
        self.dispatch(OperationKind::Start, PipelineController::start)
            .await
            .map(|_| ())
    }

    /// Stop the pipeline; resolves immediately if there is no engine
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn stop(&self) -> Result<(), ApplicationError> {
        self.dispatch(OperationKind::Stop, PipelineController::stop)
            .await
            .map(|_| ())
    }

    /// Activate the pipeline; the pipeline must be running
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn activate(&self) -> Result<(), ApplicationError> {
        self.dispatch(OperationKind::Activate, PipelineController::activate)
            .await
            .map(|_| ())
    }

    /// Deactivate the pipeline; resolves immediately if there is no engine
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn deactivate(&self) -> Result<(), ApplicationError> {
        self.dispatch(OperationKind::Deactivate, PipelineController::deactivate)
            .await
            .map(|_| ())
    }

    /// Synthesize speech and return a URL to the audio
    ///
    /// `format` is the host's integer code (0 text, 1 SSML, 2 Speech Markdown).
    #[instrument(skip(self, text), fields(session_id = %self.id, text_len = text.len()))]
    pub async fn synthesize(
        &self,
        text: &str,
        format: i64,
        voice: &str,
    ) -> Result<String, ApplicationError> {
        let request = SynthesisRequest::new(text, TtsFormat::try_from(format)?, voice);
        let outcome = self
            .dispatch(OperationKind::Synthesize, |controller| {
                controller.synthesize(&request, OperationKind::Synthesize)
            })
            .await?;
        match outcome {
            RequestOutcome::Synthesized { url } => Ok(url),
            other => Err(unexpected(OperationKind::Synthesize, &other)),
        }
    }

    /// Synthesize speech and play it; resolves when playback has begun
    #[instrument(skip(self, text), fields(session_id = %self.id, text_len = text.len()))]
    pub async fn speak(
        &self,
        text: &str,
        format: i64,
        voice: &str,
    ) -> Result<(), ApplicationError> {
        let request = SynthesisRequest::new(text, TtsFormat::try_from(format)?, voice);
        self.dispatch(OperationKind::Speak, |controller| {
            controller.synthesize(&request, OperationKind::Speak)
        })
        .await
        .map(|_| ())
    }

    /// Classify an utterance; NLU must have been enabled at initialization
    #[instrument(skip(self, utterance), fields(session_id = %self.id))]
    pub async fn classify(
        &self,
        utterance: &str,
    ) -> Result<ClassificationResult, ApplicationError> {
        let outcome = self
            .dispatch(OperationKind::Classify, |controller| {
                controller.classify(utterance)
            })
            .await?;
        match outcome {
            RequestOutcome::Classified(result) => Ok(result),
            other => Err(unexpected(OperationKind::Classify, &other)),
        }
    }

    /// Register a request of `kind`, make the engine call and await the outcome
    ///
    /// The request is registered first so that an event raised by the call
    /// itself cannot arrive before its table entry exists.
    async fn dispatch(
        &self,
        kind: OperationKind,
        call: impl FnOnce(&PipelineController) -> Result<Dispatch, ApplicationError>,
    ) -> Result<RequestOutcome, ApplicationError> {
        let request = self.pending.register(kind)?;

        match call(&self.controller) {
            Ok(Dispatch::AwaitEvent) => debug!(%kind, "Awaiting engine event"),
            Ok(Dispatch::Immediate) => {
                self.pending.resolve(kind, RequestOutcome::Completed);
            },
            Err(e) => {
                if e.is_engine_fault() {
                    warn!(%kind, error = %e, "Engine refused request");
                } else {
                    debug!(%kind, error = %e, "Request failed before reaching the engine");
                }
                self.pending.reject(kind, e);
            },
        }

        request.wait().await
    }
}

impl Drop for SpeechSession {
    fn drop(&mut self) {
        if let Some(task) = self.provisioning.lock().take() {
            task.abort();
        }
        self.event_loop.abort();
        self.controller.shutdown();
        let closed = self.pending.reject_all(|_| ApplicationError::SessionClosed);
        debug!(session_id = %self.id, closed, "Speech session closed");
    }
}

fn unexpected(kind: OperationKind, outcome: &RequestOutcome) -> ApplicationError {
    ApplicationError::Internal(format!("Unexpected outcome for {kind}: {outcome:?}"))
}

async fn run_event_loop(
    mut receiver: mpsc::UnboundedReceiver<EngineEvent>,
    controller: Arc<PipelineController>,
    coordinator: EventCoordinator,
    publisher: NotificationPublisher,
) {
    while let Some(event) = receiver.recv().await {
        debug!(event = event.name(), "Engine event");
        controller.observe(&event);
        coordinator.route(&event);
        publisher.publish(&event);
    }
}

async fn provision_and_build(
    provisioner: AssetProvisioner,
    controller: Arc<PipelineController>,
    translated: TranslatedConfig,
    events: EngineEventSink,
) {
    match build_engine(&provisioner, &controller, translated, &events).await {
        Ok(_) => {
            events.dispatch(EngineEvent::Initialized);
        },
        Err(e) => {
            // Surfaces as an engine fault to every pending request
            let cause = match e {
                ApplicationError::EngineFault { cause, .. } => cause,
                other => other.to_string(),
            };
            warn!(%cause, "Initialization failed");
            controller.fail(cause.clone());
            events.dispatch(EngineEvent::Error { cause });
        },
    }
}

async fn build_engine(
    provisioner: &AssetProvisioner,
    controller: &PipelineController,
    translated: TranslatedConfig,
    events: &EngineEventSink,
) -> Result<bool, ApplicationError> {
    let TranslatedConfig {
        mut configuration,
        features,
        asset_requests,
        network_policy,
    } = translated;

    for asset in provisioner
        .provision_all(asset_requests, network_policy)
        .await?
    {
        configuration.set_model_path(asset.slot, asset.path);
    }

    controller.build(&configuration, features, events.clone())
}
