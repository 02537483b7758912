//! Discrete-event simulation of request arrivals and departures.

use std::collections::BTreeMap;

use log::Level::Trace;
use log::log_enabled;
use serde_json::json;

use vne_embedding::{RequestResult, Strategy};
use vne_network::{Embedding, RequestId, SubstrateNetwork, VirtualNetworkRequest};

use crate::config::{ConfigError, SimulationConfig};
use crate::context::SimulationContext;
use crate::events::{EventKind, EventQueue, SimulationEvent, TieBreak};
use crate::metrics::UtilizationSnapshot;
use crate::{log_debug, log_info, log_trace, log_warn};

struct ActiveRequest {
    request: VirtualNetworkRequest,
    embedding: Embedding,
}

/// Runs an embedding strategy over a stream of virtual network requests.
///
/// Online strategies are driven event by event: an arrival is embedded against the current
/// substrate state and holds its resources until the matching departure. Batch strategies get
/// all submitted requests in a single step and manage departures on their own.
pub struct VneSimulation {
    ctx: SimulationContext,
    substrate: SubstrateNetwork,
    strategy: Strategy,
    events: EventQueue,
    pending: Vec<VirtualNetworkRequest>,
    active: BTreeMap<RequestId, ActiveRequest>,
    results: Vec<RequestResult>,
    utilization: Vec<UtilizationSnapshot>,
}

impl VneSimulation {
    /// Creates a simulation with departures processed before arrivals at equal times.
    ///
    /// The substrate starts with all its capacity available.
    pub fn new(substrate: SubstrateNetwork, strategy: Strategy) -> Self {
        Self::with_tie_break(substrate, strategy, TieBreak::default())
    }

    pub fn with_tie_break(mut substrate: SubstrateNetwork, strategy: Strategy, tie_break: TieBreak) -> Self {
        substrate.reset_available();
        Self {
            ctx: SimulationContext::new("simulation"),
            substrate,
            strategy,
            events: EventQueue::new(tie_break),
            pending: Vec::new(),
            active: BTreeMap::new(),
            results: Vec::new(),
            utilization: Vec::new(),
        }
    }

    /// Creates a simulation from config with its inline substrate and requests.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let substrate = config
            .build_substrate()?
            .ok_or_else(|| ConfigError::InvalidValue("substrate is not set".to_string()))?;
        let strategy = config.build_strategy()?;
        let mut sim = Self::with_tie_break(substrate, strategy, config.tie_break);
        sim.submit_all(config.build_requests()?);
        Ok(sim)
    }

    /// Adds a request to be processed at its arrival time.
    pub fn submit(&mut self, request: VirtualNetworkRequest) {
        assert!(
            request.arrival_time >= self.ctx.time(),
            "request {} arrives at {} which is in the past",
            request.id,
            request.arrival_time
        );
        match self.strategy {
            Strategy::Online(_) => {
                self.events.push(request.arrival_time, EventKind::Arrival(Box::new(request)));
            }
            Strategy::Batch(_) => self.pending.push(request),
        }
    }

    pub fn submit_all<I: IntoIterator<Item = VirtualNetworkRequest>>(&mut self, requests: I) {
        for request in requests {
            self.submit(request);
        }
    }

    /// Performs a single step through the simulation.
    ///
    /// Processes the next event or, for batch strategies, all pending requests.
    /// Returns `true` if anything was processed and `false` otherwise.
    pub fn step(&mut self) -> bool {
        if let Strategy::Batch(_) = self.strategy {
            return self.embed_pending_batch();
        }
        let Some(event) = self.events.pop() else {
            return false;
        };
        self.ctx.advance(event.time);
        if log_enabled!(Trace) {
            log_trace!(self.ctx, "{}", event_json(&event));
        }
        match event.kind {
            EventKind::Arrival(request) => self.on_arrival(*request),
            EventKind::Departure(id) => self.on_departure(id),
        }
        self.record_utilization();
        true
    }

    /// Performs the specified number of steps through the simulation.
    ///
    /// Returns `true` if there could be more pending events and `false` otherwise.
    pub fn steps(&mut self, step_count: u64) -> bool {
        for _ in 0..step_count {
            if !self.step() {
                return false;
            }
        }
        true
    }

    /// Steps through the simulation until there are no pending events left.
    pub fn step_until_no_events(&mut self) {
        while self.step() {}
    }

    /// Processes the events scheduled up to `time` inclusively.
    ///
    /// Returns `true` if there are pending events left. Batch strategies process all pending
    /// requests regardless of `time`.
    pub fn step_until_time(&mut self, time: f64) -> bool {
        if let Strategy::Batch(_) = self.strategy {
            if !self.pending.is_empty() {
                log_warn!(
                    self.ctx,
                    "{} embeds whole batches, requests after {:.3} are processed too",
                    self.strategy.name(),
                    time
                );
            }
            self.embed_pending_batch();
            return false;
        }
        while let Some(next_time) = self.events.next_time() {
            if next_time > time {
                return true;
            }
            self.step();
        }
        false
    }

    /// Runs the simulation to the end and returns the results in processing order.
    pub fn run(&mut self) -> &[RequestResult] {
        log_info!(self.ctx, "running {}", self.strategy.name());
        self.step_until_no_events();
        let accepted = self.results.iter().filter(|r| r.success).count();
        log_info!(self.ctx, "finished: {} of {} requests embedded", accepted, self.results.len());
        &self.results
    }

    fn on_arrival(&mut self, request: VirtualNetworkRequest) {
        assert!(
            !self.active.contains_key(&request.id),
            "request {} arrives while already active",
            request.id
        );
        let outcome = match &self.strategy {
            Strategy::Online(algorithm) => algorithm.embed(&request, &self.substrate),
            Strategy::Batch(algorithm) => panic!("{} does not process single arrivals", algorithm.name()),
        };
        let time = self.ctx.time();
        let result = match outcome {
            Ok(embedding) => {
                self.substrate.allocate(&embedding, &request);
                let departure_time = request.departure_time(time);
                self.events.push(departure_time, EventKind::Departure(request.id));
                log_debug!(
                    self.ctx,
                    "request {} embedded at {:?}, departs at {:.3}",
                    request.id,
                    embedding.node_mapping,
                    departure_time
                );
                let result = RequestResult::embedded(&request, embedding.clone(), time, self.active.len() + 1);
                self.active.insert(request.id, ActiveRequest { request, embedding });
                result
            }
            Err(failure) => {
                log_debug!(self.ctx, "request {} rejected: {}", request.id, failure);
                RequestResult::rejected(&request, failure, time, self.active.len())
            }
        };
        self.results.push(result);
    }

    fn on_departure(&mut self, id: RequestId) {
        let active = self
            .active
            .remove(&id)
            .unwrap_or_else(|| panic!("request {} departs without being active", id));
        self.substrate.deallocate(&active.embedding, &active.request);
        log_debug!(self.ctx, "request {} departed", id);
    }

    fn embed_pending_batch(&mut self) -> bool {
        let Strategy::Batch(algorithm) = &self.strategy else {
            return false;
        };
        if self.pending.is_empty() {
            return false;
        }
        let requests = std::mem::take(&mut self.pending);
        log_debug!(self.ctx, "embedding a batch of {} requests", requests.len());
        let results = algorithm.embed_batch(&requests, &mut self.substrate);
        if let Some(last) = results.iter().map(|r| r.decision_time).reduce(f64::max) {
            self.ctx.advance(last.max(self.ctx.time()));
        }
        self.results.extend(results);
        self.record_utilization();
        true
    }

    fn record_utilization(&mut self) {
        self.utilization
            .push(UtilizationSnapshot::of(&self.substrate, self.ctx.time()));
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.ctx.time()
    }

    pub fn substrate(&self) -> &SubstrateNetwork {
        &self.substrate
    }

    /// Order of an arrival and a departure at the same time.
    pub fn tie_break(&self) -> TieBreak {
        self.events.tie_break()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Results of processed requests in processing order.
    pub fn results(&self) -> &[RequestResult] {
        &self.results
    }

    /// Substrate utilization after every processed step.
    pub fn utilization_history(&self) -> &[UtilizationSnapshot] {
        &self.utilization
    }

    /// Number of embedded requests holding substrate resources.
    ///
    /// Batch strategies track their own embeddings, so this counts online ones only.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, id: RequestId) -> bool {
        self.active.contains_key(&id)
    }

    /// Embedding of an active request.
    pub fn active_embedding(&self, id: RequestId) -> Option<&Embedding> {
        self.active.get(&id).map(|active| &active.embedding)
    }

    /// Number of scheduled events and requests waiting for a batch step.
    pub fn pending_count(&self) -> usize {
        self.events.len() + self.pending.len()
    }
}

fn event_json(event: &SimulationEvent) -> serde_json::Value {
    match &event.kind {
        EventKind::Arrival(request) => json!({
            "event": "arrival",
            "id": event.id,
            "request": request.id,
            "nodes": request.node_count(),
            "links": request.link_count(),
            "lifetime": request.lifetime,
        }),
        EventKind::Departure(id) => json!({
            "event": "departure",
            "id": event.id,
            "request": id,
        }),
    }
}
