//! Pipeline lifecycle controller
//!
//! Owns the engine instance and the lifecycle phase. The engine is built at
//! most once per controller. Phase changes that depend on the engine follow
//! the events it reports, not the calls made to it.

use std::fmt;
use std::sync::Arc;

use domain::entities::{EngineConfiguration, EngineEvent, FeatureSet, SynthesisRequest};
use domain::value_objects::{Feature, OperationKind};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::ApplicationError;
use crate::ports::{EngineEventSink, EngineFactoryPort, SpeechEnginePort};

/// Lifecycle phase of a speech pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelinePhase {
    #[default]
    Uninitialized,
    Provisioning,
    /// Built and idle
    Ready,
    Running,
    Activated,
    /// Initialization failed; terminal
    Failed,
}

impl PipelinePhase {
    /// Whether the engine instance exists in this phase
    pub const fn is_built(self) -> bool {
        matches!(self, Self::Ready | Self::Running | Self::Activated)
    }
}

/// Outcome of asking to begin initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitializationGate {
    /// The caller must provision assets and build the engine
    Begin,
    /// Another caller is already provisioning
    InProgress,
    AlreadyBuilt,
    Failed(String),
}

/// How a dispatched engine call completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The engine will report the outcome as an event
    AwaitEvent,
    /// Nothing to do; the request is complete
    Immediate,
}

struct ControllerState {
    phase: PipelinePhase,
    engine: Option<Arc<dyn SpeechEnginePort>>,
    features: FeatureSet,
    failure: Option<String>,
}

/// Builds the engine and forwards lifecycle calls to it
pub struct PipelineController {
    factory: Arc<dyn EngineFactoryPort>,
    state: Mutex<ControllerState>,
}

impl fmt::Debug for PipelineController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PipelineController")
            .field("phase", &state.phase)
            .field("features", &state.features)
            .finish_non_exhaustive()
    }
}

impl PipelineController {
    pub fn new(factory: Arc<dyn EngineFactoryPort>) -> Self {
        Self {
            factory,
            state: Mutex::new(ControllerState {
                phase: PipelinePhase::Uninitialized,
                engine: None,
                features: FeatureSet::default(),
                failure: None,
            }),
        }
    }

    pub fn phase(&self) -> PipelinePhase {
        self.state.lock().phase
    }

    /// Features the engine was built with
    pub fn features(&self) -> FeatureSet {
        self.state.lock().features
    }

    /// Move from `Uninitialized` to `Provisioning`
    ///
    /// Only the first caller gets [`InitializationGate::Begin`].
    pub fn begin_initialization(&self) -> InitializationGate {
        let mut state = self.state.lock();
        match state.phase {
            PipelinePhase::Uninitialized => {
                state.phase = PipelinePhase::Provisioning;
                InitializationGate::Begin
            },
            PipelinePhase::Provisioning => InitializationGate::InProgress,
            PipelinePhase::Failed => InitializationGate::Failed(
                state
                    .failure
                    .clone()
                    .unwrap_or_else(|| "unknown failure".to_string()),
            ),
            PipelinePhase::Ready | PipelinePhase::Running | PipelinePhase::Activated => {
                InitializationGate::AlreadyBuilt
            },
        }
    }

    /// Build the engine once provisioning is complete
    ///
    /// Returns `Ok(false)` without calling the factory if the engine already
    /// exists. A factory error moves the controller to `Failed`.
    pub fn build(
        &self,
        configuration: &EngineConfiguration,
        requested: FeatureSet,
        events: EngineEventSink,
    ) -> Result<bool, ApplicationError> {
        let mut state = self.state.lock();
        match state.phase {
            PipelinePhase::Provisioning => {},
            phase if phase.is_built() => {
                debug!(?phase, "Engine already built, ignoring build request");
                return Ok(false);
            },
            PipelinePhase::Failed => {
                return Err(ApplicationError::SessionFailed(
                    state.failure.clone().unwrap_or_default(),
                ));
            },
            phase => {
                return Err(ApplicationError::Internal(format!(
                    "Cannot build engine while {phase:?}"
                )));
            },
        }

        // Supplied but unresolved models disable the feature
        let features = FeatureSet {
            wakeword: requested.wakeword && configuration.has_models_for(Feature::Wakeword),
            nlu: requested.nlu && configuration.has_models_for(Feature::Nlu),
        };

        match self.factory.build(configuration, features, events) {
            Ok(engine) => {
                state.engine = Some(engine);
                state.features = features;
                state.phase = PipelinePhase::Ready;
                info!(
                    profile = %configuration.profile,
                    wakeword = features.wakeword,
                    nlu = features.nlu,
                    "Speech engine built"
                );
                Ok(true)
            },
            Err(e) => {
                warn!(error = %e, "Speech engine construction failed");
                state.phase = PipelinePhase::Failed;
                state.failure = Some(e.message.clone());
                Err(e.into_fault(OperationKind::Initialize))
            },
        }
    }

    /// Enter the terminal failure phase
    pub fn fail(&self, cause: impl Into<String>) {
        let mut state = self.state.lock();
        if state.phase.is_built() {
            return;
        }
        let cause = cause.into();
        warn!(%cause, "Speech pipeline initialization failed");
        state.phase = PipelinePhase::Failed;
        state.failure = Some(cause);
    }

    /// Track phase changes reported by the engine
    pub fn observe(&self, event: &EngineEvent) {
        let mut state = self.state.lock();
        if !state.phase.is_built() {
            return;
        }
        let next = match event {
            EngineEvent::Started | EngineEvent::Deactivated | EngineEvent::Timeout => {
                PipelinePhase::Running
            },
            EngineEvent::Activated => PipelinePhase::Activated,
            EngineEvent::Stopped => PipelinePhase::Ready,
            _ => return,
        };
        // A late deactivation after stop must not resurrect the pipeline
        if state.phase == PipelinePhase::Ready
            && next == PipelinePhase::Running
            && !matches!(event, EngineEvent::Started)
        {
            return;
        }
        if state.phase != next {
            debug!(from = ?state.phase, to = ?next, event = event.name(), "Pipeline phase changed");
            state.phase = next;
        }
    }

    /// Start the pipeline; requires a built engine
    pub fn start(&self) -> Result<Dispatch, ApplicationError> {
        let engine = self.engine().ok_or(ApplicationError::NotInitialized)?;
        engine
            .start()
            .map_err(|e| e.into_fault(OperationKind::Start))?;
        Ok(Dispatch::AwaitEvent)
    }

    /// Stop the pipeline; a no-op without an engine
    pub fn stop(&self) -> Result<Dispatch, ApplicationError> {
        let Some(engine) = self.engine() else {
            return Ok(Dispatch::Immediate);
        };
        engine.stop().map_err(|e| e.into_fault(OperationKind::Stop))?;
        Ok(Dispatch::AwaitEvent)
    }

    /// Activate the pipeline; requires it to be running
    pub fn activate(&self) -> Result<Dispatch, ApplicationError> {
        let engine = {
            let state = self.state.lock();
            if !matches!(
                state.phase,
                PipelinePhase::Running | PipelinePhase::Activated
            ) {
                return Err(ApplicationError::NotStarted);
            }
            state.engine.clone().ok_or(ApplicationError::NotStarted)?
        };
        engine
            .activate()
            .map_err(|e| e.into_fault(OperationKind::Activate))?;
        Ok(Dispatch::AwaitEvent)
    }

    /// Deactivate the pipeline; a no-op without an engine
    pub fn deactivate(&self) -> Result<Dispatch, ApplicationError> {
        let Some(engine) = self.engine() else {
            return Ok(Dispatch::Immediate);
        };
        engine
            .deactivate()
            .map_err(|e| e.into_fault(OperationKind::Deactivate))?;
        Ok(Dispatch::AwaitEvent)
    }

    /// Hand a synthesis request to the engine
    pub fn synthesize(
        &self,
        request: &SynthesisRequest,
        operation: OperationKind,
    ) -> Result<Dispatch, ApplicationError> {
        let engine = self.engine().ok_or(ApplicationError::NotInitialized)?;
        engine
            .synthesize(request)
            .map_err(|e| e.into_fault(operation))?;
        Ok(Dispatch::AwaitEvent)
    }

    /// Hand an utterance to the NLU; requires NLU to have been built
    pub fn classify(&self, utterance: &str) -> Result<Dispatch, ApplicationError> {
        let engine = {
            let state = self.state.lock();
            match &state.engine {
                Some(engine) if state.features.nlu => Arc::clone(engine),
                _ => return Err(ApplicationError::NotInitialized),
            }
        };
        engine
            .classify(utterance)
            .map_err(|e| e.into_fault(OperationKind::Classify))?;
        Ok(Dispatch::AwaitEvent)
    }

    /// Stop and release the engine
    pub fn shutdown(&self) {
        let engine = {
            let mut state = self.state.lock();
            if state.phase.is_built() {
                state.phase = PipelinePhase::Uninitialized;
                state.features = FeatureSet::default();
            }
            state.engine.take()
        };
        if let Some(engine) = engine {
            if let Err(e) = engine.stop() {
                warn!(error = %e, "Failed to stop speech engine during shutdown");
            }
        }
    }

    fn engine(&self) -> Option<Arc<dyn SpeechEnginePort>> {
        self.state.lock().engine.clone()
    }
}

#[cfg(test)]
mod tests {
    use domain::value_objects::{AssetSlot, Credentials};

    use super::*;
    use crate::ports::{EngineError, MockEngineFactoryPort, MockSpeechEnginePort};

    fn configuration() -> EngineConfiguration {
        EngineConfiguration::new(Credentials::new("id", "secret").unwrap())
    }

    fn factory_with(engine: MockSpeechEnginePort) -> MockEngineFactoryPort {
        let engine: Arc<dyn SpeechEnginePort> = Arc::new(engine);
        let mut factory = MockEngineFactoryPort::new();
        factory
            .expect_build()
            .times(1)
            .returning(move |_, _, _| Ok(Arc::clone(&engine)));
        factory
    }

    fn built(engine: MockSpeechEnginePort) -> PipelineController {
        let controller = PipelineController::new(Arc::new(factory_with(engine)));
        assert_eq!(controller.begin_initialization(), InitializationGate::Begin);
        let (sink, _receiver) = EngineEventSink::channel();
        controller
            .build(&configuration(), FeatureSet::default(), sink)
            .unwrap();
        controller
    }

    #[test]
    fn initialization_gate_admits_one_caller() {
        let controller = PipelineController::new(Arc::new(MockEngineFactoryPort::new()));
        assert_eq!(controller.begin_initialization(), InitializationGate::Begin);
        assert_eq!(
            controller.begin_initialization(),
            InitializationGate::InProgress
        );
        assert_eq!(controller.phase(), PipelinePhase::Provisioning);
    }

    #[test]
    fn build_is_idempotent() {
        let controller = built(MockSpeechEnginePort::new());
        let (sink, _receiver) = EngineEventSink::channel();
        let rebuilt = controller
            .build(&configuration(), FeatureSet::default(), sink)
            .unwrap();
        assert!(!rebuilt);
        assert_eq!(controller.phase(), PipelinePhase::Ready);
        assert_eq!(
            controller.begin_initialization(),
            InitializationGate::AlreadyBuilt
        );
    }

    #[test]
    fn factory_failure_is_terminal() {
        let mut factory = MockEngineFactoryPort::new();
        factory
            .expect_build()
            .returning(|_, _, _| Err(EngineError::new("no microphone permission")));
        let controller = PipelineController::new(Arc::new(factory));
        controller.begin_initialization();
        let (sink, _receiver) = EngineEventSink::channel();

        let err = controller
            .build(&configuration(), FeatureSet::default(), sink)
            .unwrap_err();
        assert_eq!(err.code(), "initialize_error");
        assert_eq!(controller.phase(), PipelinePhase::Failed);
        assert_eq!(
            controller.begin_initialization(),
            InitializationGate::Failed("no microphone permission".to_string())
        );
    }

    #[test]
    fn unresolved_models_disable_feature() {
        let mut factory = MockEngineFactoryPort::new();
        factory
            .expect_build()
            .withf(|_, features, _| !features.wakeword && features.nlu)
            .returning(|_, _, _| Ok(Arc::new(MockSpeechEnginePort::new())));
        let controller = PipelineController::new(Arc::new(factory));
        controller.begin_initialization();

        let mut configuration = configuration();
        for slot in Feature::Nlu.slots() {
            configuration.set_model_path(slot, format!("/cache/{}", slot.file_name()));
        }
        configuration.set_model_path(AssetSlot::WakewordFilter, "/cache/filter.tflite");
        let requested = FeatureSet {
            wakeword: true,
            nlu: true,
        };
        let (sink, _receiver) = EngineEventSink::channel();
        controller.build(&configuration, requested, sink).unwrap();
        assert!(controller.features().nlu);
    }

    #[test]
    fn start_before_build_is_not_initialized() {
        let controller = PipelineController::new(Arc::new(MockEngineFactoryPort::new()));
        assert_eq!(controller.start(), Err(ApplicationError::NotInitialized));
        controller.begin_initialization();
        assert_eq!(controller.start(), Err(ApplicationError::NotInitialized));
    }

    #[test]
    fn activate_requires_running_pipeline() {
        let mut engine = MockSpeechEnginePort::new();
        engine.expect_start().times(1).returning(|| Ok(()));
        engine.expect_activate().times(1).returning(|| Ok(()));
        let controller = built(engine);

        assert_eq!(controller.activate(), Err(ApplicationError::NotStarted));
        assert_eq!(controller.start(), Ok(Dispatch::AwaitEvent));
        // The call alone does not change the phase
        assert_eq!(controller.activate(), Err(ApplicationError::NotStarted));

        controller.observe(&EngineEvent::Started);
        assert_eq!(controller.phase(), PipelinePhase::Running);
        assert_eq!(controller.activate(), Ok(Dispatch::AwaitEvent));
    }

    #[test]
    fn activate_without_engine_is_not_started() {
        let controller = PipelineController::new(Arc::new(MockEngineFactoryPort::new()));
        assert_eq!(controller.activate(), Err(ApplicationError::NotStarted));
        controller.begin_initialization();
        assert_eq!(controller.activate(), Err(ApplicationError::NotStarted));
        controller.fail("download failed");
        assert_eq!(controller.activate(), Err(ApplicationError::NotStarted));
    }

    #[test]
    fn stop_and_deactivate_without_engine_are_noops() {
        let controller = PipelineController::new(Arc::new(MockEngineFactoryPort::new()));
        assert_eq!(controller.stop(), Ok(Dispatch::Immediate));
        assert_eq!(controller.deactivate(), Ok(Dispatch::Immediate));
    }

    #[test]
    fn events_drive_phase_transitions() {
        let controller = built(MockSpeechEnginePort::new());
        controller.observe(&EngineEvent::Started);
        controller.observe(&EngineEvent::Activated);
        assert_eq!(controller.phase(), PipelinePhase::Activated);
        controller.observe(&EngineEvent::Deactivated);
        assert_eq!(controller.phase(), PipelinePhase::Running);
        controller.observe(&EngineEvent::Stopped);
        assert_eq!(controller.phase(), PipelinePhase::Ready);
        controller.observe(&EngineEvent::Deactivated);
        assert_eq!(controller.phase(), PipelinePhase::Ready);
    }

    #[test]
    fn events_before_build_are_ignored() {
        let controller = PipelineController::new(Arc::new(MockEngineFactoryPort::new()));
        controller.observe(&EngineEvent::Started);
        assert_eq!(controller.phase(), PipelinePhase::Uninitialized);
    }

    #[test]
    fn engine_refusal_is_attributed_to_operation() {
        let mut engine = MockSpeechEnginePort::new();
        engine
            .expect_stop()
            .returning(|| Err(EngineError::new("already stopped")));
        let controller = built(engine);
        let err = controller.stop().unwrap_err();
        assert_eq!(err.code(), "stop_error");
    }

    #[test]
    fn classify_requires_nlu() {
        let controller = built(MockSpeechEnginePort::new());
        assert_eq!(
            controller.classify("turn on the lights"),
            Err(ApplicationError::NotInitialized)
        );
    }

    #[test]
    fn fail_does_not_touch_built_engine() {
        let controller = built(MockSpeechEnginePort::new());
        controller.fail("late download failure");
        assert_eq!(controller.phase(), PipelinePhase::Ready);
    }

    #[test]
    fn shutdown_stops_engine() {
        let mut engine = MockSpeechEnginePort::new();
        engine.expect_stop().times(1).returning(|| Ok(()));
        let controller = built(engine);
        controller.shutdown();
        assert_eq!(controller.phase(), PipelinePhase::Uninitialized);
        assert_eq!(controller.stop(), Ok(Dispatch::Immediate));
    }
}
