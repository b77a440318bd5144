//! Inspectable reference engine with no DSP.
//!
//! [`OfflineEngine`] records everything a controller asks of it: the node table, the
//! patch list, the last value of every node parameter, and the transport state. It
//! renders nothing except master gain, which makes it useful in two places:
//!
//! - tests, which assert on exactly what reached the engine;
//! - offline CLI runs, where the post-chain signal only needs to reflect master
//!   volume for level metering and capture.

use crate::engine::{
    AudioEngine, Endpoint, EngineError, NodeId, NodeKind, NodeParam, WaveshapeCurve,
};

/// One parameter write, in call order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamWrite {
    /// Target node.
    pub node: NodeId,
    /// Target parameter.
    pub param: NodeParam,
    /// Written value.
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct NodeState {
    kind: NodeKind,
    params: [Option<f32>; NodeParam::COUNT],
    curve: Option<WaveshapeCurve>,
}

/// Parameter state of every node plus master gain. Comparable across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    nodes: Vec<NodeState>,
    master_gain: f32,
}

/// Reference [`AudioEngine`] that stores state instead of processing audio.
#[derive(Debug, Clone)]
pub struct OfflineEngine {
    sample_rate: u32,
    activated: bool,
    source: Option<String>,
    playing: bool,
    nodes: Vec<NodeState>,
    connections: Vec<(Endpoint, Endpoint)>,
    master_gain: f32,
    writes: Vec<ParamWrite>,
    curve_writes: usize,
    log_writes: bool,
    node_limit: Option<usize>,
}

impl OfflineEngine {
    /// Creates an engine at `sample_rate` Hz with unity master gain.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            activated: false,
            source: None,
            playing: false,
            nodes: Vec::new(),
            connections: Vec::new(),
            master_gain: 1.0,
            writes: Vec::new(),
            curve_writes: 0,
            log_writes: false,
            node_limit: None,
        }
    }

    /// Refuses to create more than `limit` nodes.
    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Records every parameter write, retrievable through [`writes`](Self::writes).
    pub fn with_write_log(mut self) -> Self {
        self.log_writes = true;
        self
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Name of the loaded source, if any.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Node type of `node`.
    pub fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.node(node).map(|n| n.kind)
    }

    /// Number of nodes created.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Last value written to `param` on `node`.
    pub fn param(&self, node: NodeId, param: NodeParam) -> Option<f32> {
        self.node(node).and_then(|n| n.params[param.index()])
    }

    /// Waveshaping curve of `node`, if one was set.
    pub fn curve(&self, node: NodeId) -> Option<WaveshapeCurve> {
        self.node(node).and_then(|n| n.curve)
    }

    /// Current master gain.
    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    /// Connections in the order they were made.
    pub fn connections(&self) -> &[(Endpoint, Endpoint)] {
        &self.connections
    }

    /// Every `(param, value)` currently set on `node`.
    pub fn params(&self, node: NodeId) -> Vec<(NodeParam, f32)> {
        let Some(state) = self.node(node) else {
            return Vec::new();
        };
        NodeParam::ALL
            .into_iter()
            .filter_map(|p| state.params[p.index()].map(|v| (p, v)))
            .collect()
    }

    /// Logged writes, if logging is enabled.
    pub fn writes(&self) -> &[ParamWrite] {
        &self.writes
    }

    /// Logged curve writes, if logging is enabled.
    pub fn curve_writes(&self) -> usize {
        self.curve_writes
    }

    /// Clears the write log.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
        self.curve_writes = 0;
    }

    /// Captures the current parameter state for comparison.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            nodes: self.nodes.clone(),
            master_gain: self.master_gain,
        }
    }

    /// Renders the post-chain signal for a block of pre-chain input.
    ///
    /// Only master gain is applied. Silence while stopped.
    pub fn render(&self, input: &[f32], output: &mut [f32]) {
        let gain = if self.playing { self.master_gain } else { 0.0 };
        for (out, &x) in output.iter_mut().zip(input) {
            *out = x * gain;
        }
    }

    fn node(&self, node: NodeId) -> Option<&NodeState> {
        self.nodes.get(node.0 as usize)
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut NodeState> {
        self.nodes.get_mut(node.0 as usize)
    }

    fn check_endpoint(&self, endpoint: Endpoint) -> Result<(), EngineError> {
        match endpoint {
            Endpoint::Node(id) if self.node(id).is_none() => Err(EngineError::UnknownNode(id)),
            _ => Ok(()),
        }
    }
}

impl AudioEngine for OfflineEngine {
    fn activate(&mut self) -> Result<(), EngineError> {
        self.activated = true;
        Ok(())
    }

    fn is_activated(&self) -> bool {
        self.activated
    }

    fn load_source(&mut self, name: &str) -> Result<(), EngineError> {
        self.source = Some(name.to_string());
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        if !self.activated {
            return Err(EngineError::NotActivated);
        }
        if self.source.is_none() {
            return Err(EngineError::Graph("no source loaded".to_string()));
        }
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn create_node(&mut self, kind: NodeKind) -> Result<NodeId, EngineError> {
        if self.node_limit.is_some_and(|limit| self.nodes.len() >= limit) {
            return Err(EngineError::Graph(format!(
                "node limit reached creating {}",
                kind.as_str()
            )));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeState {
            kind,
            params: [None; NodeParam::COUNT],
            curve: None,
        });
        Ok(id)
    }

    fn connect(&mut self, from: Endpoint, to: Endpoint) -> Result<(), EngineError> {
        self.check_endpoint(from)?;
        self.check_endpoint(to)?;
        if to == Endpoint::Source || from == Endpoint::Master {
            return Err(EngineError::Graph(format!(
                "invalid direction {from:?} -> {to:?}"
            )));
        }
        if !self.connections.contains(&(from, to)) {
            self.connections.push((from, to));
        }
        Ok(())
    }

    fn disconnect(&mut self, node: NodeId) {
        let target = Endpoint::Node(node);
        self.connections
            .retain(|&(from, to)| from != target && to != target);
    }

    fn set_param(&mut self, node: NodeId, param: NodeParam, value: f32) {
        let Some(state) = self.node_mut(node) else {
            return;
        };
        state.params[param.index()] = Some(value);
        if self.log_writes {
            self.writes.push(ParamWrite { node, param, value });
        }
    }

    fn set_curve(&mut self, node: NodeId, curve: WaveshapeCurve) {
        let Some(state) = self.node_mut(node) else {
            return;
        };
        state.curve = Some(curve);
        if self.log_writes {
            self.curve_writes += 1;
        }
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.master_gain = gain;
    }
}
